//! Per-frame simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform code:
//! - Variable timestep, clamped at the loop boundary
//! - Seeded RNG only
//! - Each component owns its entities; the presentation layer only reads them

pub mod autopilot;
pub mod collision;
pub mod obstacles;
pub mod player;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::CollisionDetector;
pub use obstacles::{ObstacleSpawner, SpawnTimer};
pub use player::{PlayerLocomotion, PlayerState};
pub use state::{
    AssetReadiness, Building, BuildingSide, EntityId, GameOver, HudSnapshot, Lane, LaneDirection,
    Obstacle, ObstacleKind, RunState, RunStatus, SimEvent, Throttle,
};
pub use tick::{FrameInput, Simulation};
pub use world::{LaneMarkings, WorldScroller};
