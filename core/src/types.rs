//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// Simulated real time in milliseconds since the engine was created.
pub type Millis = u64;

/// A stable, unique identifier for a placed building.
pub type BuildingId = String;

/// A point on the screen, as reported by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A point on the island's ground plane, before grid snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub x: f64,
    pub z: f64,
}

/// An integer grid cell on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Snap a ground point to the nearest cell. Halves round toward
    /// positive infinity, so -2.5 lands on -2 and 2.5 on 3.
    pub fn snap(point: GroundPoint) -> Self {
        Self {
            x: round_half_up(point.x),
            z: round_half_up(point.z),
        }
    }
}

pub(crate) fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
