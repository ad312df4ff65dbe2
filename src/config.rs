//! Simulation tuning
//!
//! Every speed, threshold and spacing the simulation uses lives in
//! [`SimConfig`]. Components receive a copy at construction and never
//! mutate it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading or validating a [`SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Immutable tuning for one simulation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for all procedural choices (spawn kind/lane, building shapes)
    pub seed: u64,

    // === Player ===
    /// World x offset of each lane, left to right
    pub lane_offsets: [f32; LANE_COUNT],
    /// Rate at which current speed chases target speed (1/s)
    pub speed_smoothing_rate: f32,
    /// Rate at which lateral position chases the target lane (1/s)
    pub lane_smoothing_rate: f32,
    /// Lateral distance under which a lane change counts as finished
    pub snap_epsilon: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed at the start of every run
    pub initial_speed: f32,
    /// Target speed change per second while throttle is held
    pub throttle_rate: f32,

    // === Obstacles ===
    pub spawn_interval_initial: f32,
    pub spawn_interval_floor: f32,
    /// Interval reduction applied on every spawn tick
    pub spawn_interval_step: f32,
    /// Probability that a spawn tick picks the moving variant
    pub moving_obstacle_chance: f32,
    /// Travel-axis position where obstacles appear
    pub obstacle_spawn_z: f32,
    /// Lateral speed of moving obstacles (units/s, independent of game speed)
    pub oscillation_speed: f32,
    /// |x| beyond which a moving obstacle turns around
    pub oscillation_bound: f32,
    /// Obstacles with z beyond this are recycled
    pub obstacle_removal_z: f32,

    // === Collision ===
    pub collision_longitudinal_threshold: f32,
    pub collision_lateral_threshold: f32,

    // === World ===
    /// World units scrolled per second at speed 1.0
    pub world_scroll_rate: f32,
    /// Distance units accumulated per second at speed 1.0
    pub distance_scale: f32,
    /// Lane marking offset wraps to zero past this
    pub marking_period: f32,
    /// Travel-axis gap between consecutive building pairs
    pub building_spacing: f32,
    /// How far ahead of the player buildings are generated
    pub building_lookahead: f32,
    /// Buildings with z beyond this are recycled
    pub building_removal_z: f32,
    /// |x| of the building rows on either side of the road
    pub building_x_offset: f32,
    /// Pairs generated on reset
    pub initial_building_pairs: u32,

    // === Frame ===
    /// Upper bound on a single frame's delta (seconds)
    pub max_frame_delta: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            lane_offsets: DEFAULT_LANE_OFFSETS,
            speed_smoothing_rate: 5.0,
            lane_smoothing_rate: 10.0,
            snap_epsilon: 0.1,
            min_speed: 0.5,
            max_speed: 2.0,
            initial_speed: 1.0,
            throttle_rate: 2.0,

            spawn_interval_initial: 2.0,
            spawn_interval_floor: 1.2,
            spawn_interval_step: 0.01,
            moving_obstacle_chance: 0.4,
            obstacle_spawn_z: -80.0,
            oscillation_speed: 3.0,
            oscillation_bound: 6.0,
            obstacle_removal_z: 15.0,

            collision_longitudinal_threshold: 2.0,
            collision_lateral_threshold: 1.5,

            world_scroll_rate: 50.0,
            distance_scale: 10.0,
            marking_period: 50.0,
            building_spacing: 15.0,
            building_lookahead: 150.0,
            building_removal_z: 30.0,
            building_x_offset: 12.0,
            initial_building_pairs: 10,

            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl SimConfig {
    /// Same tuning with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`from_json`](Self::from_json), but a document without a `seed`
    /// key runs on `fallback_seed` instead of the serde default of 0.
    pub fn from_json_or_seed(json: &str, fallback_seed: u64) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let has_seed = value.get("seed").is_some();
        let mut config: Self = serde_json::from_value(value)?;
        if !has_seed {
            config.seed = fallback_seed;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON config from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from disk, falling back to defaults on any error
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Longest step that moves an obstacle at most one longitudinal
    /// threshold, so it cannot jump over the `2 * threshold` hit window
    pub fn max_safe_step(&self) -> f32 {
        self.collision_longitudinal_threshold / (self.max_speed * self.world_scroll_rate)
    }

    /// Number of collision substeps needed to cover `delta`
    pub fn substeps_for(&self, delta: f32) -> u32 {
        let needed = (delta / self.max_safe_step()).ceil();
        if needed.is_finite() && needed > 1.0 {
            (needed as u32).min(MAX_SUBSTEPS)
        } else {
            1
        }
    }

    /// Reject tunings the simulation cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        let positive = [
            ("speed_smoothing_rate", self.speed_smoothing_rate),
            ("lane_smoothing_rate", self.lane_smoothing_rate),
            ("snap_epsilon", self.snap_epsilon),
            ("min_speed", self.min_speed),
            ("throttle_rate", self.throttle_rate),
            ("spawn_interval_floor", self.spawn_interval_floor),
            ("oscillation_bound", self.oscillation_bound),
            ("collision_longitudinal_threshold", self.collision_longitudinal_threshold),
            ("collision_lateral_threshold", self.collision_lateral_threshold),
            ("world_scroll_rate", self.world_scroll_rate),
            ("marking_period", self.marking_period),
            ("building_spacing", self.building_spacing),
            ("building_lookahead", self.building_lookahead),
            ("building_x_offset", self.building_x_offset),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return invalid(field, "must be a positive number");
            }
        }

        let non_negative = [
            ("distance_scale", self.distance_scale),
            ("oscillation_speed", self.oscillation_speed),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(field, "must not be negative");
            }
        }

        if !(self.max_speed.is_finite() && self.max_speed >= self.min_speed) {
            return invalid("max_speed", "must not be below min_speed");
        }
        if !(self.min_speed..=self.max_speed).contains(&self.initial_speed) {
            return invalid("initial_speed", "must lie within [min_speed, max_speed]");
        }
        if self.spawn_interval_initial < self.spawn_interval_floor {
            return invalid("spawn_interval_initial", "must not be below spawn_interval_floor");
        }
        if !(self.spawn_interval_step >= 0.0) {
            return invalid("spawn_interval_step", "must not be negative");
        }
        if !(0.0..=1.0).contains(&self.moving_obstacle_chance) {
            return invalid("moving_obstacle_chance", "must be a probability in [0, 1]");
        }
        if !self.lane_offsets.windows(2).all(|w| w[0] < w[1]) {
            return invalid("lane_offsets", "must be strictly increasing left to right");
        }
        if self.obstacle_removal_z <= 0.0 || self.building_removal_z <= 0.0 {
            return invalid("removal_z", "recycling must happen behind the player");
        }
        if !(self.obstacle_spawn_z < 0.0) {
            return invalid("obstacle_spawn_z", "obstacles must spawn ahead of the player");
        }
        let road_edge = self.lane_offsets[0].abs().max(self.lane_offsets[LANE_COUNT - 1].abs());
        if self.building_x_offset <= road_edge + self.collision_lateral_threshold {
            return invalid("building_x_offset", "buildings must stand clear of the lanes");
        }
        if (self.max_frame_delta / self.max_safe_step()).ceil() > MAX_SUBSTEPS as f32 {
            return invalid(
                "max_frame_delta",
                "a clamped frame would need too many collision substeps at max_speed",
            );
        }
        Ok(())
    }
}
