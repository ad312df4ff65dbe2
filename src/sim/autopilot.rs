//! Demo/idle mode: the simulation plays itself
//!
//! Every frame the autopilot forks the simulation and plays each candidate
//! lane input a second ahead, keeping whichever survives longest. Holding
//! the current course wins ties, so it only steers when it has to. Because
//! candidates run through the real simulation, obstacles already beside the
//! player and moving obstacles crossing a slide path are accounted for, and
//! a slide in progress is re-checked every frame.

use super::state::{Lane, LaneDirection, ObstacleKind, RunStatus, Throttle};
use super::tick::{FrameInput, Simulation};
use crate::consts::FRAME_DT;

/// Frames each candidate input is played ahead
const HORIZON_FRAMES: u32 = 60;
/// How far ahead (units along the road) an obstacle stops the autopilot accelerating
const LOOKAHEAD: f32 = 60.0;
/// Extra lateral slack when deciding whether an obstacle blocks a lane
const LATERAL_MARGIN: f32 = 0.75;

/// Distance to the nearest obstacle ahead in `lane`, if any.
///
/// Moving obstacles block every lane they sweep across before reaching the
/// player (ignoring bounces off the road edge).
fn nearest_threat(sim: &Simulation, lane: Lane) -> Option<f32> {
    let config = sim.config();
    let lane_x = lane.offset(&config.lane_offsets);
    let reach = config.collision_lateral_threshold + LATERAL_MARGIN;
    let closing_speed = (sim.run().speed * config.world_scroll_rate).max(f32::EPSILON);
    sim.obstacles()
        .obstacles()
        .iter()
        .filter(|o| {
            let (lo, hi) = match o.kind {
                ObstacleKind::Static => (o.position.x, o.position.x),
                ObstacleKind::Moving { direction } => {
                    let eta = (-o.position.z).max(0.0) / closing_speed;
                    let arrival_x = o.position.x + direction * config.oscillation_speed * eta;
                    (o.position.x.min(arrival_x), o.position.x.max(arrival_x))
                }
            };
            lane_x > lo - reach && lane_x < hi + reach
        })
        .map(|o| -o.position.z)
        .filter(|ahead| *ahead > -config.collision_longitudinal_threshold && *ahead < LOOKAHEAD)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

/// Frames a forked run lasts after pressing `lane_change` once and then
/// holding course
fn frames_survived(sim: &Simulation, lane_change: Option<LaneDirection>) -> u32 {
    let mut rollout = sim.fork();
    let mut input = FrameInput {
        lane_change,
        ..Default::default()
    };
    for frame in 0..HORIZON_FRAMES {
        rollout.advance(FRAME_DT, &input);
        if rollout.status() == RunStatus::Ended {
            return frame;
        }
        input.lane_change = None;
    }
    HORIZON_FRAMES
}

/// Choose this frame's input from the current state
pub fn plan(sim: &Simulation) -> FrameInput {
    let mut input = FrameInput::default();
    if sim.status() == RunStatus::Ended {
        return input;
    }

    let player = sim.player();
    let mut best = (None, frames_survived(sim, None));
    for direction in [LaneDirection::Left, LaneDirection::Right] {
        if best.1 == HORIZON_FRAMES {
            break;
        }
        // Pressing toward the lane already targeted changes nothing
        if player.current_lane().step(direction) == player.target_lane() {
            continue;
        }
        let survived = frames_survived(sim, Some(direction));
        if survived > best.1 {
            best = (Some(direction), survived);
        }
    }

    let (lane_change, survived) = best;
    let lane = match lane_change {
        Some(direction) => player.current_lane().step(direction),
        None => player.target_lane(),
    };
    input.lane_change = lane_change;
    input.throttle = if survived < HORIZON_FRAMES {
        // Boxed in: slow down and buy time for the lanes to clear
        Throttle::Decelerate
    } else if nearest_threat(sim, lane).is_none() {
        Throttle::Accelerate
    } else {
        Throttle::None
    };

    log::trace!(
        "Autopilot {:?} -> {:?}, survives {} frames: {:?}",
        player.current_lane(),
        lane,
        survived,
        input
    );
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn quiet_sim() -> Simulation {
        Simulation::new(SimConfig {
            spawn_interval_initial: 1.0e9,
            spawn_interval_floor: 1.0e9,
            ..Default::default()
        })
        .unwrap()
    }

    /// Drive the player into the right lane and let the slide finish
    fn settle_right(sim: &mut Simulation) {
        let press = FrameInput {
            lane_change: Some(LaneDirection::Right),
            ..Default::default()
        };
        sim.advance(FRAME_DT, &press);
        for _ in 0..120 {
            sim.advance(FRAME_DT, &FrameInput::default());
        }
        assert_eq!(sim.player().current_lane(), Lane::Right);
    }

    #[test]
    fn test_clear_road_accelerates() {
        let sim = quiet_sim();
        let input = plan(&sim);
        assert_eq!(input.lane_change, None);
        assert_eq!(input.throttle, Throttle::Accelerate);
    }

    #[test]
    fn test_dodges_blocked_lane() {
        let mut sim = quiet_sim();
        sim.insert_obstacle(Lane::Center, ObstacleKind::Static, -20.0);
        sim.insert_obstacle(Lane::Left, ObstacleKind::Static, -25.0);
        let input = plan(&sim);
        assert_eq!(input.lane_change, Some(LaneDirection::Right));
    }

    #[test]
    fn test_boxed_in_decelerates() {
        let mut sim = quiet_sim();
        for lane in Lane::ALL {
            sim.insert_obstacle(lane, ObstacleKind::Static, -10.0);
        }
        let input = plan(&sim);
        assert_eq!(input.lane_change, None);
        assert_eq!(input.throttle, Throttle::Decelerate);
    }

    #[test]
    fn test_planning_leaves_state_untouched() {
        let mut sim = quiet_sim();
        sim.insert_obstacle(Lane::Center, ObstacleKind::Static, -20.0);
        let before = sim.clone();
        plan(&sim);
        assert_eq!(sim.run(), before.run());
        assert_eq!(sim.frames(), before.frames());
        assert_eq!(sim.obstacles().obstacles(), before.obstacles().obstacles());
        assert_eq!(sim.player().state(), before.player().state());
    }

    #[test]
    fn test_survives_scripted_wall_with_gap() {
        let mut sim = quiet_sim();
        sim.insert_obstacle(Lane::Center, ObstacleKind::Static, -70.0);
        sim.insert_obstacle(Lane::Right, ObstacleKind::Static, -70.0);
        for _ in 0..400 {
            let input = plan(&sim);
            sim.advance(FRAME_DT, &input);
        }
        assert_eq!(sim.status(), RunStatus::Playing);
        assert_eq!(sim.player().current_lane(), Lane::Left);
    }

    #[test]
    fn test_turns_back_when_slide_target_fills() {
        let mut sim = quiet_sim();
        settle_right(&mut sim);

        // Start sliding toward the center, then an obstacle appears there
        let press = FrameInput {
            lane_change: Some(LaneDirection::Left),
            ..Default::default()
        };
        sim.advance(FRAME_DT, &press);
        assert_eq!(sim.player().target_lane(), Lane::Center);
        sim.insert_obstacle(Lane::Center, ObstacleKind::Static, -8.0);

        let input = plan(&sim);
        assert_eq!(input.lane_change, Some(LaneDirection::Right));

        sim.advance(FRAME_DT, &input);
        for _ in 0..120 {
            let input = plan(&sim);
            sim.advance(FRAME_DT, &input);
        }
        assert_eq!(sim.status(), RunStatus::Playing);
        assert_eq!(sim.player().current_lane(), Lane::Right);
    }

    #[test]
    fn test_waits_for_crossing_obstacle_before_sliding() {
        let mut sim = quiet_sim();
        settle_right(&mut sim);

        // The right lane is blocked further down, but a moving obstacle is
        // drifting right through the center lane just ahead of the player
        sim.insert_obstacle(Lane::Right, ObstacleKind::Static, -40.0);
        sim.insert_obstacle(Lane::Center, ObstacleKind::Moving { direction: 1.0 }, -3.0);
        let input = plan(&sim);
        assert_eq!(input.lane_change, None);

        for _ in 0..200 {
            let input = plan(&sim);
            sim.advance(FRAME_DT, &input);
        }
        assert_eq!(sim.status(), RunStatus::Playing);
        assert_ne!(sim.player().current_lane(), Lane::Right);
    }

    #[test]
    fn test_outlasts_idle_player() {
        let seed = 5;
        let mut idle = Simulation::new(SimConfig::default().with_seed(seed)).unwrap();
        let mut auto = Simulation::new(SimConfig::default().with_seed(seed)).unwrap();
        for _ in 0..12_000 {
            idle.advance(FRAME_DT, &FrameInput::default());
            let input = plan(&auto);
            auto.advance(FRAME_DT, &input);
        }
        assert_eq!(idle.status(), RunStatus::Ended);
        assert!(
            auto.run().distance > idle.run().distance,
            "auto {} vs idle {}",
            auto.run().distance,
            idle.run().distance
        );
    }
}
