// Renderable skeleton primitives: the draw instructions the pipeline emits
// instead of touching a canvas itself

use serde::{Deserialize, Serialize};

use crate::models::pose::Keypoint;

/// Keypoint dots: small and red.
pub const KEYPOINT_RADIUS: f32 = 5.0;
pub const KEYPOINT_COLOR: Rgb = Rgb::new(255, 0, 0);

/// Bone lines: green, two pixels wide.
pub const BONE_COLOR: Rgb = Rgb::new(0, 255, 0);
pub const BONE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One renderer-agnostic draw instruction. The renderer collaborator
/// rasterizes these in emit order; the pipeline never sees pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Point {
        x: f32,
        y: f32,
        radius: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
}

impl DrawOp {
    /// Dot for one confident keypoint, in the fixed overlay style.
    pub fn keypoint(kp: &Keypoint) -> Self {
        DrawOp::Point {
            x: kp.x,
            y: kp.y,
            radius: KEYPOINT_RADIUS,
            color: KEYPOINT_COLOR,
        }
    }

    /// Line for one bone whose endpoints are both confident.
    pub fn bone(a: &Keypoint, b: &Keypoint) -> Self {
        DrawOp::Line {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            width: BONE_WIDTH,
            color: BONE_COLOR,
        }
    }
}
