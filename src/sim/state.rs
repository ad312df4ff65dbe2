//! Run state and core simulation types
//!
//! Plain data shared between the components and the presentation layer.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::LANE_COUNT;

/// Identifier the presentation layer uses to key scene nodes
pub type EntityId = u32;

/// One of the three travel corridors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Center, Lane::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Center => 1,
            Lane::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Neighbouring lane in `direction`, clamped at the road edge
    pub fn step(self, direction: LaneDirection) -> Self {
        let index = match direction {
            LaneDirection::Left => self.index().saturating_sub(1),
            LaneDirection::Right => (self.index() + 1).min(LANE_COUNT - 1),
        };
        Self::ALL[index]
    }

    /// World x of this lane
    #[inline]
    pub fn offset(self, lane_offsets: &[f32; LANE_COUNT]) -> f32 {
        lane_offsets[self.index()]
    }
}

/// Discrete lane-change intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

/// Continuous speed intent, held for the whole frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Throttle {
    Accelerate,
    Decelerate,
    #[default]
    None,
}

/// Whether the current run is still going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Playing,
    /// Terminal until restart
    Ended,
}

/// Per-run bookkeeping owned by the simulation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub status: RunStatus,
    /// Distance traveled this run (display units)
    pub distance: f32,
    /// Shared game speed for the current frame
    pub speed: f32,
}

impl RunState {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            status: RunStatus::Playing,
            distance: 0.0,
            speed: initial_speed,
        }
    }
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Box sitting in its lane
    Static,
    /// Vehicle sweeping sideways across the road; `direction` is -1 or +1
    Moving { direction: f32 },
}

/// An obstacle on the road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Vec3,
    /// Lane it spawned in (moving obstacles drift out of it)
    pub lane: Lane,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn is_moving(&self) -> bool {
        matches!(self.kind, ObstacleKind::Moving { .. })
    }
}

/// Which side of the road a building stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingSide {
    Left,
    Right,
}

/// A roadside building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: EntityId,
    /// Center of the box (y is half the height)
    pub position: Vec3,
    /// Width, height, depth
    pub dimensions: Vec3,
    pub side: BuildingSide,
    /// Index into the presentation layer's building colors
    pub palette_index: u8,
}

/// Entity lifecycle and run transitions produced during a frame.
///
/// Per-frame movement is not evented: the presentation layer reads
/// positions straight from the live collections after each advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ObstacleSpawned {
        id: EntityId,
        kind: ObstacleKind,
        lane: Lane,
        position: Vec3,
    },
    ObstacleRemoved { id: EntityId },
    BuildingSpawned {
        id: EntityId,
        position: Vec3,
        dimensions: Vec3,
        palette_index: u8,
    },
    BuildingRemoved { id: EntityId },
    RunEnded { distance: u32 },
    RunRestarted,
}

/// Which asynchronously loaded templates are available this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReadiness {
    pub player: bool,
    pub moving_obstacle: bool,
}

impl AssetReadiness {
    pub const ALL_READY: Self = Self {
        player: true,
        moving_obstacle: true,
    };
    pub const NONE_READY: Self = Self {
        player: false,
        moving_obstacle: false,
    };
}

impl Default for AssetReadiness {
    fn default() -> Self {
        Self::ALL_READY
    }
}

/// Values the HUD shows every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Floored distance
    pub distance: u32,
    /// Floored speed as a percentage of 1.0
    pub speed_percent: u32,
    pub status: RunStatus,
}

/// Shown once a run has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub final_distance: u32,
}

/// Independent RNG stream per component, derived from the run seed
pub fn component_rng(seed: u64, stream: u64) -> Pcg32 {
    let mixed = seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(stream.wrapping_mul(2654435761));
    Pcg32::seed_from_u64(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_step_clamps_at_edges() {
        assert_eq!(Lane::Left.step(LaneDirection::Left), Lane::Left);
        assert_eq!(Lane::Left.step(LaneDirection::Right), Lane::Center);
        assert_eq!(Lane::Center.step(LaneDirection::Right), Lane::Right);
        assert_eq!(Lane::Right.step(LaneDirection::Right), Lane::Right);
    }

    #[test]
    fn test_lane_index_round_trip() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_index(lane.index()), Some(lane));
        }
        assert_eq!(Lane::from_index(3), None);
        assert_eq!(Lane::Right.offset(&[-3.0, 0.0, 3.0]), 3.0);
    }

    #[test]
    fn test_component_streams_differ() {
        use rand::Rng;
        let a: u32 = component_rng(7, 1).random();
        let b: u32 = component_rng(7, 2).random();
        let c: u32 = component_rng(7, 1).random();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
