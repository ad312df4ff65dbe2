//! Obstacle spawning, motion and recycling
//!
//! Spawn timing runs on game-speed-scaled time, so running faster also
//! spawns faster. Every spawn tick tightens the interval a little, down to
//! a floor; that is the whole difficulty ramp.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{component_rng, EntityId, Lane, Obstacle, ObstacleKind, SimEvent};
use crate::config::SimConfig;
use crate::consts::{LANE_COUNT, STATIC_OBSTACLE_Y};

/// RNG stream for obstacle choices
const OBSTACLE_RNG_STREAM: u64 = 1;

/// Speed-scaled time since the last spawn tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub elapsed: f32,
    pub interval: f32,
}

/// What a spawn tick decided
#[derive(Debug, Clone, Copy, PartialEq)]
enum SpawnChoice {
    Static(Lane),
    Moving(Lane, f32),
}

/// Owns the live obstacle set
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    obstacles: Vec<Obstacle>,
    timer: SpawnTimer,
    rng: Pcg32,
    next_id: EntityId,
    spawn_ticks: u32,
    lane_offsets: [f32; LANE_COUNT],
    interval_initial: f32,
    interval_floor: f32,
    interval_step: f32,
    moving_chance: f64,
    spawn_z: f32,
    oscillation_speed: f32,
    oscillation_bound: f32,
    removal_z: f32,
    world_scroll_rate: f32,
}

impl ObstacleSpawner {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            obstacles: Vec::new(),
            timer: SpawnTimer {
                elapsed: 0.0,
                interval: config.spawn_interval_initial,
            },
            rng: component_rng(config.seed, OBSTACLE_RNG_STREAM),
            next_id: 1,
            spawn_ticks: 0,
            lane_offsets: config.lane_offsets,
            interval_initial: config.spawn_interval_initial,
            interval_floor: config.spawn_interval_floor,
            interval_step: config.spawn_interval_step,
            moving_chance: f64::from(config.moving_obstacle_chance).clamp(0.0, 1.0),
            spawn_z: config.obstacle_spawn_z,
            oscillation_speed: config.oscillation_speed,
            oscillation_bound: config.oscillation_bound,
            removal_z: config.obstacle_removal_z,
            world_scroll_rate: config.world_scroll_rate,
        }
    }

    /// Live obstacles, oldest first
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn timer(&self) -> SpawnTimer {
        self.timer
    }

    /// Spawn ticks since the last reset, including skipped spawns
    pub fn spawn_ticks(&self) -> u32 {
        self.spawn_ticks
    }

    /// Run one frame: maybe spawn, then move and recycle every obstacle.
    ///
    /// `moving_template_ready` reports whether the moving-obstacle model has
    /// loaded; until it has, moving spawns are skipped.
    pub fn advance(
        &mut self,
        delta: f32,
        speed: f32,
        player_lane: Lane,
        moving_template_ready: bool,
        events: &mut Vec<SimEvent>,
    ) {
        self.timer.elapsed += delta * speed;

        if self.timer.elapsed > self.timer.interval {
            self.spawn_tick(player_lane, moving_template_ready, events);
        }

        let travel = speed * delta * self.world_scroll_rate;
        let lateral_step = delta * self.oscillation_speed;
        let bound = self.oscillation_bound;
        for obstacle in &mut self.obstacles {
            if let ObstacleKind::Moving { direction } = &mut obstacle.kind {
                obstacle.position.x += *direction * lateral_step;
                if obstacle.position.x.abs() > bound {
                    *direction = -*direction;
                }
            }
            obstacle.position.z += travel;
        }

        let removal_z = self.removal_z;
        self.obstacles.retain(|obstacle| {
            let keep = obstacle.position.z <= removal_z;
            if !keep {
                events.push(SimEvent::ObstacleRemoved { id: obstacle.id });
            }
            keep
        });
    }

    /// Apply one spawn tick: roll a spawn, reset the timer, ramp difficulty
    fn spawn_tick(
        &mut self,
        player_lane: Lane,
        moving_template_ready: bool,
        events: &mut Vec<SimEvent>,
    ) {
        self.spawn_ticks += 1;
        match self.roll_spawn() {
            SpawnChoice::Static(lane) => {
                let position = Vec3::new(lane.offset(&self.lane_offsets), STATIC_OBSTACLE_Y, self.spawn_z);
                self.push(lane, ObstacleKind::Static, position, events);
            }
            SpawnChoice::Moving(lane, direction) if moving_template_ready => {
                let position = Vec3::new(lane.offset(&self.lane_offsets), 0.0, self.spawn_z);
                self.push(lane, ObstacleKind::Moving { direction }, position, events);
            }
            SpawnChoice::Moving(lane, _) => {
                log::debug!("Moving obstacle template not loaded, skipping spawn in {:?}", lane);
            }
        }

        self.timer.elapsed = 0.0;
        self.timer.interval = (self.timer.interval - self.interval_step).max(self.interval_floor);
        log::debug!(
            "Spawn tick {} (player in {:?}), next interval {:.2}",
            self.spawn_ticks,
            player_lane,
            self.timer.interval
        );
    }

    fn roll_spawn(&mut self) -> SpawnChoice {
        let moving = self.rng.random_bool(self.moving_chance);
        let lane = Lane::ALL[self.rng.random_range(0..LANE_COUNT)];
        if moving {
            let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            SpawnChoice::Moving(lane, direction)
        } else {
            SpawnChoice::Static(lane)
        }
    }

    fn push(&mut self, lane: Lane, kind: ObstacleKind, position: Vec3, events: &mut Vec<SimEvent>) {
        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            position,
            lane,
            kind,
        });
        events.push(SimEvent::ObstacleSpawned {
            id,
            kind,
            lane,
            position,
        });
    }

    /// Place an obstacle directly (scripted scenarios and tests)
    pub fn insert(
        &mut self,
        lane: Lane,
        kind: ObstacleKind,
        z: f32,
        events: &mut Vec<SimEvent>,
    ) -> EntityId {
        let y = match kind {
            ObstacleKind::Static => STATIC_OBSTACLE_Y,
            ObstacleKind::Moving { .. } => 0.0,
        };
        let position = Vec3::new(lane.offset(&self.lane_offsets), y, z);
        self.push(lane, kind, position, events);
        self.next_id - 1
    }

    /// Drop every obstacle and restore the initial spawn interval
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.timer = SpawnTimer {
            elapsed: 0.0,
            interval: self.interval_initial,
        };
        self.spawn_ticks = 0;
    }
}
