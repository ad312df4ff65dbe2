//! Scrolling world: lane markings and roadside buildings
//!
//! Lane markings are a fixed strip whose offset loops, so the road never
//! runs out. Buildings are generated in left/right pairs ahead of the
//! player and recycled once they pass behind.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{component_rng, Building, BuildingSide, EntityId, SimEvent};
use crate::config::SimConfig;
use crate::consts::BUILDING_PALETTE_SIZE;

/// RNG stream for building shapes
const WORLD_RNG_STREAM: u64 = 2;

/// Lane-divider dashes sit between the lanes
const MARKING_X: f32 = 1.5;
/// Gap between dashes along the road
const MARKING_SPACING: f32 = 4.0;
/// Length of the marking strip
const MARKING_STRIP_LENGTH: f32 = 100.0;

/// Building size ranges: (min, max) for width, height, depth
const BUILDING_WIDTH: (f32, f32) = (5.0, 8.0);
const BUILDING_HEIGHT: (f32, f32) = (10.0, 30.0);
const BUILDING_DEPTH: (f32, f32) = (8.0, 16.0);

/// The looping strip of lane-divider dashes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaneMarkings {
    /// Travel-axis offset of the whole strip
    pub offset: f32,
}

impl LaneMarkings {
    /// Local (x, z) of every dash in the strip; add `offset` to z for world space
    pub fn layout() -> impl Iterator<Item = Vec2> {
        let count = (MARKING_STRIP_LENGTH / MARKING_SPACING) as usize;
        (0..count).flat_map(|i| {
            let z = -(i as f32) * MARKING_SPACING;
            [Vec2::new(-MARKING_X, z), Vec2::new(MARKING_X, z)]
        })
    }
}

/// Owns the lane markings and building set
#[derive(Debug, Clone)]
pub struct WorldScroller {
    markings: LaneMarkings,
    buildings: Vec<Building>,
    /// z of the most distant generated pair; moves with the world
    frontier: f32,
    rng: Pcg32,
    next_id: EntityId,
    world_scroll_rate: f32,
    marking_period: f32,
    building_spacing: f32,
    building_lookahead: f32,
    removal_z: f32,
    building_x: f32,
    initial_pairs: u32,
}

impl WorldScroller {
    pub fn new(config: &SimConfig) -> Self {
        let mut world = Self {
            markings: LaneMarkings::default(),
            buildings: Vec::new(),
            frontier: 0.0,
            rng: component_rng(config.seed, WORLD_RNG_STREAM),
            next_id: 1,
            world_scroll_rate: config.world_scroll_rate,
            marking_period: config.marking_period,
            building_spacing: config.building_spacing,
            building_lookahead: config.building_lookahead,
            removal_z: config.building_removal_z,
            building_x: config.building_x_offset,
            initial_pairs: config.initial_building_pairs,
        };
        world.populate(&mut Vec::new());
        world
    }

    pub fn markings(&self) -> LaneMarkings {
        self.markings
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn frontier(&self) -> f32 {
        self.frontier
    }

    /// Scroll everything toward the player and keep the building rows filled
    pub fn advance(&mut self, delta: f32, speed: f32, events: &mut Vec<SimEvent>) {
        let scroll = speed * delta * self.world_scroll_rate;

        self.markings.offset += scroll;
        if self.markings.offset > self.marking_period {
            self.markings.offset = 0.0;
        }

        for building in &mut self.buildings {
            building.position.z += scroll;
        }
        let removal_z = self.removal_z;
        self.buildings.retain(|building| {
            let keep = building.position.z <= removal_z;
            if !keep {
                events.push(SimEvent::BuildingRemoved { id: building.id });
            }
            keep
        });

        self.frontier += scroll;
        while self.frontier - self.building_spacing > -self.building_lookahead {
            self.frontier -= self.building_spacing;
            self.spawn_pair(self.frontier, events);
        }
    }

    /// Clear the world and lay down the opening stretch again
    pub fn reset(&mut self, events: &mut Vec<SimEvent>) {
        for building in self.buildings.drain(..) {
            events.push(SimEvent::BuildingRemoved { id: building.id });
        }
        self.markings = LaneMarkings::default();
        self.populate(events);
    }

    fn populate(&mut self, events: &mut Vec<SimEvent>) {
        self.frontier = 0.0;
        for i in 0..self.initial_pairs {
            self.frontier = -(i as f32) * self.building_spacing;
            self.spawn_pair(self.frontier, events);
        }
        log::debug!(
            "World populated: {} buildings, frontier {}",
            self.buildings.len(),
            self.frontier
        );
    }

    fn spawn_pair(&mut self, z: f32, events: &mut Vec<SimEvent>) {
        for side in [BuildingSide::Left, BuildingSide::Right] {
            let x = match side {
                BuildingSide::Left => -self.building_x,
                BuildingSide::Right => self.building_x,
            };
            let building = self.random_building(side, x, z);
            events.push(SimEvent::BuildingSpawned {
                id: building.id,
                position: building.position,
                dimensions: building.dimensions,
                palette_index: building.palette_index,
            });
            self.buildings.push(building);
        }
    }

    fn random_building(&mut self, side: BuildingSide, x: f32, z: f32) -> Building {
        let width = self.rng.random_range(BUILDING_WIDTH.0..BUILDING_WIDTH.1);
        let height = self.rng.random_range(BUILDING_HEIGHT.0..BUILDING_HEIGHT.1);
        let depth = self.rng.random_range(BUILDING_DEPTH.0..BUILDING_DEPTH.1);
        let palette_index = self.rng.random_range(0..BUILDING_PALETTE_SIZE);

        let id = self.next_id;
        self.next_id += 1;
        Building {
            id,
            position: Vec3::new(x, height / 2.0, z),
            dimensions: Vec3::new(width, height, depth),
            side,
            palette_index,
        }
    }
}
