//! Hand landmark data as delivered by the external landmark source.
//!
//! Coordinates are normalized image space (x right, y down) plus relative depth.

use serde::{Deserialize, Serialize};

use crate::Handedness;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// One tracked point. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar (x, y) distance.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Planar distance, positive when `self` sits above `other` in the image.
    pub fn signed_distance(&self, other: &Landmark) -> f32 {
        let sign = if self.y < other.y { 1.0 } else { -1.0 };
        self.distance(other) * sign
    }

    /// Absolute depth difference.
    pub fn depth_gap(&self, other: &Landmark) -> f32 {
        (self.z - other.z).abs()
    }
}

impl From<[f32; 3]> for Landmark {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(l: Landmark) -> Self {
        [l.x, l.y, l.z]
    }
}

/// The 21 landmarks of one detected hand plus its reported handedness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    pub landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(handedness: Handedness, landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }

    /// Landmark by index. Indices come from the constants in this module.
    pub fn point(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    /// Planar distance between two landmarks.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.landmarks[a].distance(&self.landmarks[b])
    }
}

/// Everything the landmark source reported for one video frame (0, 1 or 2 hands).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl Frame {
    pub fn new(hands: Vec<HandLandmarks>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}
