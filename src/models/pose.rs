// Data models for the keypoint-to-angle pipeline: joints, keypoints, angle
// readings, configuration, and error types

use serde::{Deserialize, Serialize};

// ==============================================================================
// Confidence Gate
// ==============================================================================

/// Fixed confidence cutoff at or below which a keypoint is treated as
/// undetected. Scores are detection confidences, not calibrated
/// probabilities; the pipeline only ever compares them against this gate
/// (strictly greater), it never weights by them.
pub const SCORE_THRESHOLD: f32 = 0.3;

// ==============================================================================
// Joints (17 MoveNet/COCO landmarks)
// ==============================================================================

/// MoveNet body landmark indices (17 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Joint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Joint {
    pub const COUNT: usize = 17;

    /// All joints in landmark-index order.
    pub fn all() -> [Joint; Self::COUNT] {
        [
            Joint::Nose,
            Joint::LeftEye,
            Joint::RightEye,
            Joint::LeftEar,
            Joint::RightEar,
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftElbow,
            Joint::RightElbow,
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftKnee,
            Joint::RightKnee,
            Joint::LeftAnkle,
            Joint::RightAnkle,
        ]
    }

    /// Parse a detector-reported landmark name (e.g. "left_elbow").
    /// Unknown names yield `None` so callers can skip them.
    pub fn from_name(name: &str) -> Option<Joint> {
        match name {
            "nose" => Some(Joint::Nose),
            "left_eye" => Some(Joint::LeftEye),
            "right_eye" => Some(Joint::RightEye),
            "left_ear" => Some(Joint::LeftEar),
            "right_ear" => Some(Joint::RightEar),
            "left_shoulder" => Some(Joint::LeftShoulder),
            "right_shoulder" => Some(Joint::RightShoulder),
            "left_elbow" => Some(Joint::LeftElbow),
            "right_elbow" => Some(Joint::RightElbow),
            "left_wrist" => Some(Joint::LeftWrist),
            "right_wrist" => Some(Joint::RightWrist),
            "left_hip" => Some(Joint::LeftHip),
            "right_hip" => Some(Joint::RightHip),
            "left_knee" => Some(Joint::LeftKnee),
            "right_knee" => Some(Joint::RightKnee),
            "left_ankle" => Some(Joint::LeftAnkle),
            "right_ankle" => Some(Joint::RightAnkle),
            _ => None,
        }
    }

    /// The detector-facing snake_case name, also used as the key in
    /// exported coordinate maps.
    pub fn name(self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "left_eye",
            Joint::RightEye => "right_eye",
            Joint::LeftEar => "left_ear",
            Joint::RightEar => "right_ear",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        }
    }
}

// ==============================================================================
// Keypoints
// ==============================================================================

/// A detected landmark exactly as the external model reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub name: String, // Model-reported landmark name, e.g. "left_shoulder"
    pub x: f32,
    pub y: f32,
    pub score: f32, // Detection confidence [0, 1]
}

impl RawKeypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }
}

/// A projected, name-free landmark stored per joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub score: f32, // Detection confidence [0, 1]
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    /// Strictly-greater gate: a score exactly at the threshold is still
    /// treated as undetected.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// One detected person's keypoints for a single frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<RawKeypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<RawKeypoint>) -> Self {
        Self { keypoints }
    }
}

// ==============================================================================
// Angle Readings
// ==============================================================================

/// The four measured joint angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleKind {
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
}

impl AngleKind {
    pub fn all() -> [AngleKind; 4] {
        [
            AngleKind::LeftElbow,
            AngleKind::RightElbow,
            AngleKind::LeftKnee,
            AngleKind::RightKnee,
        ]
    }

    /// The (first, vertex, second) joints whose angle this reading
    /// measures. Elbows measure shoulder-elbow-wrist, knees measure
    /// hip-knee-ankle; the angle is taken at the middle joint.
    pub fn joints(self) -> (Joint, Joint, Joint) {
        match self {
            AngleKind::LeftElbow => (Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
            AngleKind::RightElbow => (Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
            AngleKind::LeftKnee => (Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
            AngleKind::RightKnee => (Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
        }
    }

    /// The key this reading serializes under in exported records.
    pub fn json_key(self) -> &'static str {
        match self {
            AngleKind::LeftElbow => "leftElbowAngle",
            AngleKind::RightElbow => "rightElbowAngle",
            AngleKind::LeftKnee => "leftKneeAngle",
            AngleKind::RightKnee => "rightKneeAngle",
        }
    }
}

/// One evaluation cycle's angle readings in degrees.
///
/// An absent slot means the triple was gated out (missing or low-confidence
/// keypoint) or geometrically undefined. Absent slots serialize as missing
/// keys, never as a sentinel value, and the whole set is rebuilt from
/// scratch every evaluation rather than merged into previous readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    #[serde(rename = "leftElbowAngle", skip_serializing_if = "Option::is_none")]
    pub left_elbow: Option<f32>,
    #[serde(rename = "rightElbowAngle", skip_serializing_if = "Option::is_none")]
    pub right_elbow: Option<f32>,
    #[serde(rename = "leftKneeAngle", skip_serializing_if = "Option::is_none")]
    pub left_knee: Option<f32>,
    #[serde(rename = "rightKneeAngle", skip_serializing_if = "Option::is_none")]
    pub right_knee: Option<f32>,
}

impl AngleSet {
    pub fn get(&self, kind: AngleKind) -> Option<f32> {
        match kind {
            AngleKind::LeftElbow => self.left_elbow,
            AngleKind::RightElbow => self.right_elbow,
            AngleKind::LeftKnee => self.left_knee,
            AngleKind::RightKnee => self.right_knee,
        }
    }

    pub fn set(&mut self, kind: AngleKind, degrees: f32) {
        match kind {
            AngleKind::LeftElbow => self.left_elbow = Some(degrees),
            AngleKind::RightElbow => self.right_elbow = Some(degrees),
            AngleKind::LeftKnee => self.left_knee = Some(degrees),
            AngleKind::RightKnee => self.right_knee = Some(degrees),
        }
    }

    /// Present readings, in `AngleKind::all()` order.
    pub fn iter(&self) -> impl Iterator<Item = (AngleKind, f32)> + '_ {
        AngleKind::all()
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|degrees| (kind, degrees)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

// ==============================================================================
// Configuration
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub target_fps: u32,                // Evaluation cadence of the continuous loop (default: 60)
    pub stop_on_estimation_error: bool, // Halt the loop on estimator failure instead of skipping the tick
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            stop_on_estimation_error: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> TrackerResult<()> {
        if self.target_fps == 0 || self.target_fps > 240 {
            return Err(TrackerError::InvalidConfig(format!(
                "target_fps must be between 1 and 240, got {}",
                self.target_fps
            )));
        }
        Ok(())
    }

    /// Interval between continuous-loop ticks. A zero `target_fps` (which
    /// `validate` rejects) is clamped to one tick per second rather than
    /// dividing by zero.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Pose estimator not initialized")]
    NotInitialized,

    #[error("Tracking already running")]
    AlreadyRunning,

    #[error("Media source already closed")]
    SourceClosed,

    #[error("Pose estimation failed: {0}")]
    Estimation(String),

    #[error("Detection loop failed: {0}")]
    LoopFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
