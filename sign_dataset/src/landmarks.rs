//! Hand landmark geometry.
//!
//! A detector reports one hand as 21 keypoints in its own fixed order
//! (wrist first, then four joints per finger from thumb to pinky).  The
//! coordinates are normalised to the frame: `x`/`y` in 0.0–1.0 of the image
//! width/height, `z` a relative depth with the wrist near zero.

use crate::error::LandmarkError;

/// Keypoints per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Length of a flattened landmark vector (`x, y, z` per keypoint).
pub const FEATURE_LEN: usize = LANDMARK_COUNT * 3;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Bones drawn by the skeleton overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),   (THUMB_CMC, THUMB_MCP),   (THUMB_MCP, THUMB_IP),    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),   (INDEX_MCP, INDEX_PIP),   (INDEX_PIP, INDEX_DIP),   (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP),  (RING_MCP, RING_PIP),     (RING_PIP, RING_DIP),     (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP),   (WRIST, PINKY_MCP),       (PINKY_MCP, PINKY_PIP),   (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
];

// ════════════════════════════════════════════════════════════════════════════
// Point3
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Point3 { x, y, z }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// Exactly [`LANDMARK_COUNT`] points for one detected hand.
///
/// The fixed-size array makes "a hand with 20 points" unrepresentable; the
/// only fallible path in is [`LandmarkSet::from_points`].
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Point3; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Point3; LANDMARK_COUNT]) -> Self {
        LandmarkSet { points }
    }

    /// Build from a detector's variable-length output.
    pub fn from_points(points: Vec<Point3>) -> Result<Self, LandmarkError> {
        let got = points.len();
        let points: [Point3; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount { expected: LANDMARK_COUNT, got })?;
        Ok(LandmarkSet { points })
    }

    pub fn points(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.points
    }

    /// `x0, y0, z0, x1, y1, z1, …, z20`, in point order.
    pub fn flatten(&self) -> [f32; FEATURE_LEN] {
        let mut out = [0.0f32; FEATURE_LEN];
        for (i, p) in self.points.iter().enumerate() {
            out[i * 3]     = p.x;
            out[i * 3 + 1] = p.y;
            out[i * 3 + 2] = p.z;
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
