// Snapshot capture records: the one-per-pause angle and coordinate export

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::pose::{AngleSet, Keypoint, TrackerError, TrackerResult};

/// The angle and coordinate record captured from one paused frame.
///
/// Exactly one record is live at a time: each pause fully replaces the
/// previous one, even when the new frame has fewer confident joints.
/// Angles are confidence-gated; coordinates carry every projected keypoint
/// regardless of score, so downstream tools can apply their own cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub timestamp: f64, // Media playback position in seconds
    pub angles: AngleSet,
    pub coordinates: BTreeMap<String, Keypoint>,
}

impl CaptureRecord {
    pub fn new(timestamp: f64, angles: AngleSet, coordinates: BTreeMap<String, Keypoint>) -> Self {
        Self {
            timestamp,
            angles,
            coordinates,
        }
    }

    /// Default download filename, keyed by playback position.
    pub fn export_filename(&self) -> String {
        format!("pose_data_{:.2}.json", self.timestamp)
    }

    pub fn to_json(&self) -> TrackerResult<String> {
        serde_json::to_string(self).map_err(|e| TrackerError::Export(e.to_string()))
    }

    /// Pretty-printed serialization used by file exports.
    pub fn to_json_pretty(&self) -> TrackerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TrackerError::Export(e.to_string()))
    }
}
