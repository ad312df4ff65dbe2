//! Per-frame simulation loop
//!
//! Owns the run state and drives the components in a fixed order:
//! player, world, obstacles, then collision against the player's new
//! position. Long frames run that order once per collision substep.

use super::collision::CollisionDetector;
use super::obstacles::ObstacleSpawner;
use super::player::PlayerLocomotion;
use super::state::{
    AssetReadiness, EntityId, GameOver, HudSnapshot, Lane, LaneDirection, ObstacleKind, RunState,
    RunStatus, SimEvent, Throttle,
};
use super::world::WorldScroller;
use crate::config::{ConfigError, SimConfig};
use crate::sanitize_delta;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Lane change pressed this frame
    pub lane_change: Option<LaneDirection>,
    /// Throttle held this frame
    pub throttle: Throttle,
    /// Which templates the asset provider has finished loading
    pub assets: AssetReadiness,
}

/// The whole simulation for one player
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    run: RunState,
    player: PlayerLocomotion,
    world: WorldScroller,
    obstacles: ObstacleSpawner,
    collision: CollisionDetector,
    events: Vec<SimEvent>,
    /// Events pushed by `restart`/`insert_obstacle` survive the next frame
    carry_events: bool,
    /// Lookahead copies skip lifecycle logging
    quiet: bool,
    frames: u64,
}

impl Simulation {
    /// Build a simulation from a validated config
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!("Simulation created with seed {}", config.seed);
        Ok(Self {
            run: RunState::new(config.initial_speed),
            player: PlayerLocomotion::new(&config),
            world: WorldScroller::new(&config),
            obstacles: ObstacleSpawner::new(&config),
            collision: CollisionDetector::new(&config),
            events: Vec::new(),
            carry_events: false,
            quiet: false,
            frames: 0,
            config,
        })
    }

    /// Silent copy of the current state for trying inputs ahead of time
    pub fn fork(&self) -> Self {
        let mut fork = self.clone();
        fork.events.clear();
        fork.carry_events = false;
        fork.quiet = true;
        fork
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    pub fn player(&self) -> &PlayerLocomotion {
        &self.player
    }

    pub fn world(&self) -> &WorldScroller {
        &self.world
    }

    pub fn obstacles(&self) -> &ObstacleSpawner {
        &self.obstacles
    }

    /// Place an obstacle directly (scripted scenarios). Emits `ObstacleSpawned`.
    pub fn insert_obstacle(&mut self, lane: Lane, kind: ObstacleKind, z: f32) -> EntityId {
        self.carry_events = true;
        self.obstacles.insert(lane, kind, z, &mut self.events)
    }

    /// Frames advanced during the current run
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame. Does nothing once the run has ended.
    ///
    /// A frame longer than [`SimConfig::max_safe_step`] is split into equal
    /// substeps, each checked for collision, so fast obstacles cannot skip
    /// past the player between two checks.
    pub fn advance(&mut self, delta: f32, input: &FrameInput) {
        if self.run.status == RunStatus::Ended {
            return;
        }
        if !std::mem::take(&mut self.carry_events) {
            self.events.clear();
        }

        let delta = sanitize_delta(delta, self.config.max_frame_delta);
        self.frames += 1;

        if let Some(direction) = input.lane_change {
            self.player.apply_lane_change(direction);
        }
        self.player.apply_throttle(input.throttle);

        let substeps = self.config.substeps_for(delta);
        let step = delta / substeps as f32;
        for _ in 0..substeps {
            self.step(step, input.assets);
            if self.run.status == RunStatus::Ended {
                break;
            }
        }
    }

    /// One collision-safe slice of a frame
    fn step(&mut self, delta: f32, assets: AssetReadiness) {
        let speed = self.player.current_speed();
        self.run.speed = speed;
        self.run.distance += speed * delta * self.config.distance_scale;

        if assets.player {
            self.player.advance(delta);
        }
        self.world.advance(delta, speed, &mut self.events);
        self.obstacles.advance(
            delta,
            speed,
            self.player.current_lane(),
            assets.moving_obstacle,
            &mut self.events,
        );

        if !assets.player {
            return;
        }
        if let Some(hit) = self
            .collision
            .first_hit(self.player.position(), self.obstacles.obstacles())
        {
            let distance = self.display_distance();
            if !self.quiet {
                log::info!(
                    "Run ended at distance {} after {} frames (obstacle {} {:?} at {:?})",
                    distance,
                    self.frames,
                    hit.id,
                    hit.kind,
                    hit.position
                );
            }
            self.run.status = RunStatus::Ended;
            self.events.push(SimEvent::RunEnded { distance });
        }
    }

    /// Start a fresh run
    pub fn restart(&mut self) {
        let previous = self.display_distance();
        self.run = RunState::new(self.config.initial_speed);
        self.frames = 0;
        self.player.reset();
        self.world.reset(&mut self.events);
        for obstacle in self.obstacles.obstacles() {
            self.events.push(SimEvent::ObstacleRemoved { id: obstacle.id });
        }
        self.obstacles.reset();
        self.events.push(SimEvent::RunRestarted);
        self.carry_events = true;
        if !self.quiet {
            log::info!("Run restarted (previous distance {})", previous);
        }
    }

    /// Events from the most recent frame, plus any `restart` or
    /// `insert_obstacle` since the frame before it.
    ///
    /// Drain once per frame; whatever is left is dropped by the next `advance`.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    fn display_distance(&self) -> u32 {
        self.run.distance.floor() as u32
    }

    /// HUD values for the current frame
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            distance: self.display_distance(),
            speed_percent: (self.run.speed * 100.0).floor() as u32,
            status: self.run.status,
        }
    }

    /// Final distance once the run has ended
    pub fn game_over(&self) -> Option<GameOver> {
        (self.run.status == RunStatus::Ended).then(|| GameOver {
            final_distance: self.display_distance(),
        })
    }
}
