// Skeleton topology and per-frame keypoint projection

use std::collections::BTreeMap;

use crate::models::pose::{Joint, Keypoint, RawKeypoint, SCORE_THRESHOLD};

/// The fixed ten-bone topology: arms, legs, and the two cross-body
/// connections. Order is draw order.
pub const BONES: [(Joint, Joint); 10] = [
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::RightHip, Joint::RightKnee),
    (Joint::RightKnee, Joint::RightAnkle),
    (Joint::LeftShoulder, Joint::RightShoulder),
    (Joint::LeftHip, Joint::RightHip),
];

/// One frame's keypoints reorganized by joint.
///
/// Built fresh per frame or pause event and discarded after evaluation;
/// nothing in it survives across cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSnapshot {
    slots: [Option<Keypoint>; Joint::COUNT],
}

impl PoseSnapshot {
    pub fn get(&self, joint: Joint) -> Option<&Keypoint> {
        self.slots[joint as usize].as_ref()
    }

    /// The keypoint for `joint` only when it clears the confidence gate.
    pub fn confident(&self, joint: Joint) -> Option<&Keypoint> {
        self.get(joint).filter(|kp| kp.is_confident(SCORE_THRESHOLD))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Present joints in landmark-index order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &Keypoint)> + '_ {
        Joint::all()
            .into_iter()
            .filter_map(move |joint| self.get(joint).map(|kp| (joint, kp)))
    }

    /// Every present keypoint keyed by joint name, for export records.
    /// Deliberately ungated: downstream tools apply their own cutoff.
    pub fn coordinates(&self) -> BTreeMap<String, Keypoint> {
        self.iter()
            .map(|(joint, kp)| (joint.name().to_string(), *kp))
            .collect()
    }
}

/// Reorganize a detector keypoint list by joint: single pass over the
/// input, unknown landmark names skipped, later duplicates overwriting
/// earlier ones.
pub fn project(keypoints: &[RawKeypoint]) -> PoseSnapshot {
    let mut snapshot = PoseSnapshot::default();
    for raw in keypoints {
        let Some(joint) = Joint::from_name(&raw.name) else {
            continue;
        };
        snapshot.slots[joint as usize] = Some(Keypoint::new(raw.x, raw.y, raw.score));
    }
    snapshot
}
