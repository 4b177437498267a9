// Keypoint-to-angle pipeline: confidence gating, joint-angle geometry, the
// fixed skeleton topology, and the two execution modes (continuous live
// tracking and pause-driven snapshot capture). Model inference, media
// playback, and rendering stay behind the bridge traits; this crate consumes
// keypoint lists and emits angle readings, draw instructions, and capture
// records.

pub mod bridge;
pub mod core;
pub mod models;

pub use crate::bridge::estimator::PoseEstimator;
pub use crate::bridge::media::MediaSource;
pub use crate::bridge::sink::{ExportSink, FrameSink};
pub use crate::core::frame_processor::{evaluate, EvalMode, FrameOutput};
pub use crate::core::geometry::{absolute_angle, directional_angle};
pub use crate::core::live_tracker::{LiveTracker, LoopMetrics, LoopState};
pub use crate::core::skeleton::{project, PoseSnapshot, BONES};
pub use crate::core::snapshot_capture::SnapshotCapture;
pub use crate::models::capture::CaptureRecord;
pub use crate::models::draw::{DrawOp, Rgb};
pub use crate::models::pose::{
    AngleKind, AngleSet, Joint, Keypoint, PipelineConfig, Pose, RawKeypoint, TrackerError,
    TrackerResult, SCORE_THRESHOLD,
};
