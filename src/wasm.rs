//! Browser bindings
//!
//! The page owns the render loop, the scene graph and input listeners. Each
//! animation frame it forwards input, calls `advance(delta)`, then mirrors
//! the drained events and entity positions into its scene.

use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SimConfig};
use crate::sim::{AssetReadiness, FrameInput, LaneDirection, RunStatus, Simulation, Throttle};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Lane Runner starting...");
    }
}

fn to_js(e: ConfigError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS-facing handle to one simulation
#[wasm_bindgen]
pub struct LaneRunner {
    sim: Simulation,
    input: FrameInput,
}

#[wasm_bindgen]
impl LaneRunner {
    /// Create a simulation from an optional JSON config; seeds from the clock
    /// when the config has no `seed` key.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<LaneRunner, JsValue> {
        let clock_seed = js_sys::Date::now() as u64;
        let config = match config_json {
            Some(json) => SimConfig::from_json_or_seed(&json, clock_seed).map_err(to_js)?,
            None => SimConfig::default().with_seed(clock_seed),
        };
        Ok(Self {
            sim: Simulation::new(config).map_err(to_js)?,
            input: FrameInput {
                assets: AssetReadiness::NONE_READY,
                ..Default::default()
            },
        })
    }

    /// Advance one frame by `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.sim.advance(delta, &self.input);
        // Lane changes are one-shot; throttle and assets persist
        self.input.lane_change = None;
    }

    pub fn lane_left(&mut self) {
        self.input.lane_change = Some(LaneDirection::Left);
    }

    pub fn lane_right(&mut self) {
        self.input.lane_change = Some(LaneDirection::Right);
    }

    /// Positive accelerates, negative decelerates, zero releases
    pub fn set_throttle(&mut self, value: i32) {
        self.input.throttle = match value.signum() {
            1 => Throttle::Accelerate,
            -1 => Throttle::Decelerate,
            _ => Throttle::None,
        };
    }

    /// Report which models have finished loading
    pub fn set_assets(&mut self, player: bool, moving_obstacle: bool) {
        self.input.assets = AssetReadiness {
            player,
            moving_obstacle,
        };
    }

    pub fn restart(&mut self) {
        self.sim.restart();
        self.input.lane_change = None;
        self.input.throttle = Throttle::None;
    }

    pub fn distance(&self) -> u32 {
        self.sim.hud().distance
    }

    pub fn speed_percent(&self) -> u32 {
        self.sim.hud().speed_percent
    }

    pub fn is_ended(&self) -> bool {
        self.sim.status() == RunStatus::Ended
    }

    pub fn player_x(&self) -> f32 {
        self.sim.player().position().x
    }

    pub fn marking_offset(&self) -> f32 {
        self.sim.world().markings().offset
    }

    /// Spawn/remove/run events of the last frame, as a JSON array
    pub fn take_events_json(&mut self) -> String {
        serde_json::to_string(&self.sim.take_events()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Live obstacles as a JSON array
    pub fn obstacles_json(&self) -> String {
        serde_json::to_string(self.sim.obstacles().obstacles()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Live buildings as a JSON array
    pub fn buildings_json(&self) -> String {
        serde_json::to_string(self.sim.world().buildings()).unwrap_or_else(|_| "[]".to_string())
    }
}
