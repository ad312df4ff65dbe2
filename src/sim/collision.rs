//! Player vs obstacle collision
//!
//! An axis-aligned proximity box rather than a mesh test: an obstacle hits
//! when it is close on the travel axis AND close laterally. The two axes use
//! independent thresholds.

use glam::Vec3;

use super::state::Obstacle;
use crate::config::SimConfig;

/// Per-axis hit thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionDetector {
    /// Max |dz| for a hit
    pub longitudinal: f32,
    /// Max |dx| for a hit
    pub lateral: f32,
}

impl CollisionDetector {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            longitudinal: config.collision_longitudinal_threshold,
            lateral: config.collision_lateral_threshold,
        }
    }

    /// Whether a single obstacle overlaps the player
    #[inline]
    pub fn overlaps(&self, player_position: Vec3, obstacle: &Obstacle) -> bool {
        let dz = (obstacle.position.z - player_position.z).abs();
        let dx = (obstacle.position.x - player_position.x).abs();
        dz < self.longitudinal && dx < self.lateral
    }

    /// First obstacle overlapping the player, if any
    pub fn first_hit<'a>(&self, player_position: Vec3, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
        obstacles.iter().find(|o| self.overlaps(player_position, o))
    }

    /// Whether any obstacle overlaps the player
    pub fn detect(&self, player_position: Vec3, obstacles: &[Obstacle]) -> bool {
        obstacles.iter().any(|o| self.overlaps(player_position, o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Lane, ObstacleKind};

    fn detector() -> CollisionDetector {
        CollisionDetector::new(&SimConfig::default())
    }

    fn obstacle_at(x: f32, z: f32) -> Obstacle {
        Obstacle {
            id: 1,
            position: Vec3::new(x, 0.5, z),
            lane: Lane::Center,
            kind: ObstacleKind::Static,
        }
    }

    #[test]
    fn test_hit_at_same_position() {
        let d = detector();
        let player = Vec3::new(3.0, 0.0, 0.0);
        assert!(d.detect(player, &[obstacle_at(3.0, 0.0)]));
    }

    #[test]
    fn test_miss_beyond_either_threshold() {
        let d = detector();
        let player = Vec3::ZERO;
        // Too far along the road
        assert!(!d.detect(player, &[obstacle_at(0.0, -2.5)]));
        // Adjacent lane
        assert!(!d.detect(player, &[obstacle_at(3.0, 0.0)]));
        // Both
        assert!(!d.detect(player, &[obstacle_at(3.0, 5.0)]));
        assert!(!d.detect(player, &[]));
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let d = detector();
        let player = Vec3::ZERO;
        assert!(!d.detect(player, &[obstacle_at(0.0, 2.0)]));
        assert!(!d.detect(player, &[obstacle_at(1.5, 0.0)]));
        assert!(d.detect(player, &[obstacle_at(1.49, 1.99)]));
    }

    #[test]
    fn test_behind_player_still_hits() {
        let d = detector();
        assert!(d.detect(Vec3::ZERO, &[obstacle_at(0.0, 1.5)]));
    }

    #[test]
    fn test_midpoint_between_lanes_clips_neither() {
        // Halfway between lanes neither lane's obstacle is within 1.5
        let d = detector();
        let player = Vec3::new(1.5, 0.0, 0.0);
        assert!(!d.detect(player, &[obstacle_at(0.0, 0.0), obstacle_at(3.0, 0.0)]));
        let player = Vec3::new(1.4, 0.0, 0.0);
        assert!(d.detect(player, &[obstacle_at(3.0, 0.0), obstacle_at(0.0, 0.0)]));
    }

    #[test]
    fn test_first_hit_finds_offender() {
        let d = detector();
        let mut hit = obstacle_at(-3.0, -1.0);
        hit.id = 7;
        let obstacles = [obstacle_at(0.0, -40.0), hit];
        let found = d.first_hit(Vec3::new(-3.0, 0.0, 0.0), &obstacles);
        assert_eq!(found.map(|o| o.id), Some(7));
    }
}
