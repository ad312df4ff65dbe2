//! Lane Runner - simulation core for a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Per-frame simulation (player, world, obstacles, collision, run state)
//! - `config`: Data-driven tuning shared by every component
//! - `wasm`: Browser bindings (wasm32 only)
//!
//! Rendering, asset loading and input plumbing live outside this crate. A
//! presentation layer calls [`sim::Simulation::advance`] once per frame and
//! mirrors the entity collections and [`sim::SimEvent`]s into its scene.

pub mod config;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{ConfigError, SimConfig};

/// Game configuration constants
pub mod consts {
    /// Number of lanes (left, center, right)
    pub const LANE_COUNT: usize = 3;
    /// World x of each lane, left to right
    pub const DEFAULT_LANE_OFFSETS: [f32; LANE_COUNT] = [-3.0, 0.0, 3.0];

    /// Nominal frame time used by headless drivers and tests
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest delta a single frame may apply (tab switch, debugger pause, ...)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Most collision substeps a single frame may be split into
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Static obstacles rest half their height above the road
    pub const STATIC_OBSTACLE_Y: f32 = 0.5;
    /// Number of building color slots the presentation layer provides
    pub const BUILDING_PALETTE_SIZE: u8 = 6;
}

/// Exponential approach of `current` toward `target`.
///
/// The blend factor `delta * rate` is capped at 1 so a long frame lands on
/// the target instead of overshooting it.
#[inline]
pub fn smooth_toward(current: f32, target: f32, delta: f32, rate: f32) -> f32 {
    let t = (delta * rate).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Clamp an externally supplied frame delta into `[0, max]`.
///
/// NaN and negative values (clock hiccups) become zero.
#[inline]
pub fn sanitize_delta(delta: f32, max: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta.min(max)
    } else {
        0.0
    }
}
