// Frame processor: turns one projected snapshot into angle readings and
// draw instructions

use serde::{Deserialize, Serialize};

use crate::core::geometry::{absolute_angle, directional_angle};
use crate::core::skeleton::{PoseSnapshot, BONES};
use crate::models::draw::DrawOp;
use crate::models::pose::{AngleKind, AngleSet, SCORE_THRESHOLD};

/// Which angle convention an evaluation uses.
///
/// `Loop` is the continuous-overlay path: direction-insensitive flexion
/// angles in [0, 180]. `Snapshot` is the capture/export path: bearing
/// differences in [0, 360). Downstream consumers are calibrated to one
/// convention or the other; they are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    Loop,
    Snapshot,
}

/// The immutable product of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub angles: AngleSet,
    pub draw_ops: Vec<DrawOp>,
}

/// Evaluate one snapshot: all four angle triples under the mode's
/// convention, plus draw instructions for every confident keypoint and
/// every bone with both endpoints confident.
///
/// Missing keypoints, gated scores, and degenerate triples degrade by
/// omission; this function never fails. Both drivers route through here so
/// the gate and the conventions cannot drift apart.
pub fn evaluate(snapshot: &PoseSnapshot, mode: EvalMode) -> FrameOutput {
    let mut angles = AngleSet::default();
    for kind in AngleKind::all() {
        let (first, vertex, second) = kind.joints();
        let (Some(a), Some(b), Some(c)) = (
            snapshot.confident(first),
            snapshot.confident(vertex),
            snapshot.confident(second),
        ) else {
            continue;
        };

        let degrees = match mode {
            EvalMode::Loop => absolute_angle(a, b, c),
            EvalMode::Snapshot => directional_angle(a, b, c),
        };
        if let Some(degrees) = degrees {
            angles.set(kind, degrees);
        }
    }

    let mut draw_ops = Vec::new();
    for (_, kp) in snapshot.iter() {
        if kp.is_confident(SCORE_THRESHOLD) {
            draw_ops.push(DrawOp::keypoint(kp));
        }
    }
    for (start, end) in BONES {
        if let (Some(a), Some(b)) = (snapshot.confident(start), snapshot.confident(end)) {
            draw_ops.push(DrawOp::bone(a, b));
        }
    }

    FrameOutput { angles, draw_ops }
}
