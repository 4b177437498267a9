// Snapshot capture: pause-driven single-frame evaluation and export

use std::sync::Arc;

use log::{debug, info};

use crate::bridge::estimator::PoseEstimator;
use crate::bridge::media::MediaSource;
use crate::bridge::sink::ExportSink;
use crate::core::frame_processor::{evaluate, EvalMode};
use crate::core::skeleton::project;
use crate::models::capture::CaptureRecord;
use crate::models::pose::{TrackerError, TrackerResult};

/// Event-driven capture over a paused recorded video: one estimate per
/// pause signal, one live record at a time.
pub struct SnapshotCapture {
    estimator: Arc<dyn PoseEstimator>,
    source: Option<Box<dyn MediaSource>>,
    current: Option<CaptureRecord>,
}

impl SnapshotCapture {
    /// Take exclusive ownership of the paused-video source. Errors when
    /// the estimator is not ready; the rejected source is still released.
    pub fn new(
        estimator: Arc<dyn PoseEstimator>,
        mut source: Box<dyn MediaSource>,
    ) -> TrackerResult<Self> {
        if !estimator.is_initialized() {
            source.stop_tracks();
            return Err(TrackerError::NotInitialized);
        }
        Ok(Self {
            estimator,
            source: Some(source),
            current: None,
        })
    }

    /// Handle one pause signal: estimate against the current frame and, if
    /// a pose came back, replace the live record wholesale (even when the
    /// new frame has fewer confident joints). Returns whether a new record
    /// was captured. An empty estimate leaves the previous record in
    /// place, as does an estimation error, which is surfaced to the
    /// caller.
    pub async fn on_pause(&mut self) -> TrackerResult<bool> {
        let source = self.source.as_ref().ok_or(TrackerError::SourceClosed)?;

        let poses = self.estimator.estimate_poses().await?;
        let Some(pose) = poses.first() else {
            debug!(
                "Pause at {:.2}s: no pose detected, keeping previous record",
                source.position_secs()
            );
            return Ok(false);
        };

        let snapshot = project(&pose.keypoints);
        let output = evaluate(&snapshot, EvalMode::Snapshot);
        let timestamp = source.position_secs();
        let record = CaptureRecord::new(timestamp, output.angles, snapshot.coordinates());
        info!(
            "Captured pose at {:.2}s ({} keypoints, {} angles)",
            timestamp,
            record.coordinates.len(),
            record.angles.iter().count()
        );
        self.current = Some(record);
        Ok(true)
    }

    /// The record from the most recent successful pause, if any.
    pub fn current_record(&self) -> Option<&CaptureRecord> {
        self.current.as_ref()
    }

    /// Hand the live record to `sink`. Returns `false` without touching
    /// the sink while no record exists; export stays disabled until the
    /// first capture.
    pub fn export_current(&self, sink: &mut dyn ExportSink) -> TrackerResult<bool> {
        match &self.current {
            None => Ok(false),
            Some(record) => {
                sink.export(record)?;
                info!("Exported capture {}", record.export_filename());
                Ok(true)
            }
        }
    }

    /// Release the source's tracks; only the first close reaches the
    /// source. Pause handling is rejected from here on, but the captured
    /// record stays readable and exportable.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop_tracks();
            info!("Snapshot capture closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }
}
