//! Player lane and speed control
//!
//! Lane changes and speed changes are both smoothed: a lane change only
//! counts (for collision and spawning) once the lateral slide has finished.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Lane, LaneDirection, Throttle};
use crate::config::SimConfig;
use crate::consts::LANE_COUNT;
use crate::smooth_toward;

/// Snapshot of the player's locomotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Lane the player is committed to
    pub current_lane: Lane,
    /// Lane the player is sliding toward
    pub target_lane: Lane,
    /// World x
    pub lateral_position: f32,
    pub current_speed: f32,
    pub target_speed: f32,
}

/// Owns [`PlayerState`] and applies input to it
#[derive(Debug, Clone)]
pub struct PlayerLocomotion {
    state: PlayerState,
    throttle: Throttle,
    lane_offsets: [f32; LANE_COUNT],
    speed_smoothing_rate: f32,
    lane_smoothing_rate: f32,
    snap_epsilon: f32,
    min_speed: f32,
    max_speed: f32,
    initial_speed: f32,
    throttle_rate: f32,
}

impl PlayerLocomotion {
    pub fn new(config: &SimConfig) -> Self {
        let mut player = Self {
            state: PlayerState {
                current_lane: Lane::Center,
                target_lane: Lane::Center,
                lateral_position: 0.0,
                current_speed: config.initial_speed,
                target_speed: config.initial_speed,
            },
            throttle: Throttle::None,
            lane_offsets: config.lane_offsets,
            speed_smoothing_rate: config.speed_smoothing_rate,
            lane_smoothing_rate: config.lane_smoothing_rate,
            snap_epsilon: config.snap_epsilon,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            initial_speed: config.initial_speed,
            throttle_rate: config.throttle_rate,
        };
        player.reset();
        player
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn current_lane(&self) -> Lane {
        self.state.current_lane
    }

    pub fn target_lane(&self) -> Lane {
        self.state.target_lane
    }

    pub fn current_speed(&self) -> f32 {
        self.state.current_speed
    }

    pub fn throttle(&self) -> Throttle {
        self.throttle
    }

    /// Player position on the road (the player never leaves z = 0)
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.state.lateral_position, 0.0, 0.0)
    }

    /// Retarget one lane over from the committed lane. Stepping off the
    /// road edge leaves the target where it is.
    pub fn apply_lane_change(&mut self, direction: LaneDirection) {
        self.state.target_lane = self.state.current_lane.step(direction);
    }

    /// Record the throttle held this frame; applied during [`Self::advance`]
    pub fn apply_throttle(&mut self, signal: Throttle) {
        self.throttle = signal;
    }

    /// Advance speed and lateral position by `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        let state = &mut self.state;

        let throttle_step = self.throttle_rate * delta;
        match self.throttle {
            Throttle::Accelerate => {
                state.target_speed = (state.target_speed + throttle_step).min(self.max_speed);
            }
            Throttle::Decelerate => {
                state.target_speed = (state.target_speed - throttle_step).max(self.min_speed);
            }
            Throttle::None => {}
        }

        state.current_speed = smooth_toward(
            state.current_speed,
            state.target_speed,
            delta,
            self.speed_smoothing_rate,
        )
        .clamp(self.min_speed, self.max_speed);

        let target_x = state.target_lane.offset(&self.lane_offsets);
        state.lateral_position =
            smooth_toward(state.lateral_position, target_x, delta, self.lane_smoothing_rate);

        if (state.lateral_position - target_x).abs() < self.snap_epsilon {
            state.current_lane = state.target_lane;
        }
    }

    /// Back to the center lane at the initial speed
    pub fn reset(&mut self) {
        self.state = PlayerState {
            current_lane: Lane::Center,
            target_lane: Lane::Center,
            lateral_position: Lane::Center.offset(&self.lane_offsets),
            current_speed: self.initial_speed,
            target_speed: self.initial_speed,
        };
        self.throttle = Throttle::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use proptest::prelude::*;

    fn player() -> PlayerLocomotion {
        PlayerLocomotion::new(&SimConfig::default())
    }

    fn run(player: &mut PlayerLocomotion, frames: usize) {
        for _ in 0..frames {
            player.advance(FRAME_DT);
        }
    }

    #[test]
    fn test_lane_change_commits_after_slide() {
        let mut p = player();
        p.apply_lane_change(LaneDirection::Right);
        assert_eq!(p.target_lane(), Lane::Right);
        assert_eq!(p.current_lane(), Lane::Center);

        // A few frames in: still sliding, lane not committed yet
        run(&mut p, 3);
        assert!(p.state().lateral_position > 0.0);
        assert_eq!(p.current_lane(), Lane::Center);

        run(&mut p, 60);
        assert_eq!(p.current_lane(), Lane::Right);
        assert!((p.state().lateral_position - 3.0).abs() < 0.1);
    }

    #[test]
    fn test_lane_change_at_edge_is_noop() {
        let mut p = player();
        p.apply_lane_change(LaneDirection::Left);
        run(&mut p, 120);
        assert_eq!(p.current_lane(), Lane::Left);

        p.apply_lane_change(LaneDirection::Left);
        assert_eq!(p.target_lane(), Lane::Left);
    }

    #[test]
    fn test_second_press_mid_slide_is_relative_to_committed_lane() {
        let mut p = player();
        p.apply_lane_change(LaneDirection::Right);
        p.advance(FRAME_DT);
        p.apply_lane_change(LaneDirection::Right);
        // Still measured from Center, so the target stays Right
        assert_eq!(p.target_lane(), Lane::Right);
    }

    #[test]
    fn test_throttle_ramps_target_within_bounds() {
        let mut p = player();
        p.apply_throttle(Throttle::Accelerate);
        run(&mut p, 30);
        assert!((p.state().target_speed - 2.0).abs() < 1e-4);
        assert!(p.current_speed() > 1.0 && p.current_speed() < 2.0);

        run(&mut p, 300);
        assert!(p.current_speed() <= 2.0);
        assert!(p.current_speed() > 1.99);

        p.apply_throttle(Throttle::Decelerate);
        run(&mut p, 600);
        assert_eq!(p.state().target_speed, 0.5);
        assert!(p.current_speed() >= 0.5);
        assert!(p.current_speed() < 0.51);
    }

    #[test]
    fn test_speed_smoothing_is_gradual() {
        let mut p = player();
        p.apply_throttle(Throttle::Accelerate);
        p.advance(0.1);
        // target 1.2, current 1 + 0.2 * 0.5
        assert!((p.state().target_speed - 1.2).abs() < 1e-6);
        assert!((p.current_speed() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut p = player();
        p.apply_lane_change(LaneDirection::Left);
        p.apply_throttle(Throttle::Accelerate);
        run(&mut p, 2);
        let before = p.state().clone();
        p.advance(0.0);
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn test_reset() {
        let mut p = player();
        p.apply_lane_change(LaneDirection::Right);
        p.apply_throttle(Throttle::Decelerate);
        run(&mut p, 120);
        p.reset();
        assert_eq!(p.current_lane(), Lane::Center);
        assert_eq!(p.target_lane(), Lane::Center);
        assert_eq!(p.current_speed(), 1.0);
        assert_eq!(p.position(), Vec3::ZERO);
        assert_eq!(p.throttle(), Throttle::None);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Change(LaneDirection),
        Advance(f32),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Change(LaneDirection::Left)),
            Just(Step::Change(LaneDirection::Right)),
            (0.0f32..0.1).prop_map(Step::Advance),
        ]
    }

    proptest! {
        #[test]
        fn prop_lanes_and_speed_stay_in_bounds(steps in prop::collection::vec(step_strategy(), 0..200)) {
            let mut p = player();
            p.apply_throttle(Throttle::Accelerate);
            for step in steps {
                match step {
                    Step::Change(dir) => p.apply_lane_change(dir),
                    Step::Advance(dt) => p.advance(dt),
                }
                prop_assert!(p.current_lane().index() < LANE_COUNT);
                prop_assert!(p.target_lane().index() < LANE_COUNT);
                prop_assert!((0.5..=2.0).contains(&p.current_speed()));
                prop_assert!(p.state().lateral_position.abs() <= 3.0 + 1e-4);
            }
        }
    }
}
