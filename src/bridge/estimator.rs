// Pose estimator bridge
// Abstraction over the external pose-estimation backend; the pipeline only
// ever sees the keypoint lists an implementation returns

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::pose::{Pose, TrackerError, TrackerResult};

/// Pose estimator trait
/// Implement this for whatever model backend produces keypoints
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    /// Estimate poses for the source's current frame.
    /// An empty list means no detection; that is not an error.
    async fn estimate_poses(&self) -> TrackerResult<Vec<Pose>>;

    /// Check whether the backend's model is loaded and ready
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn model_info(&self) -> String;
}

// ==============================================================================
// Scripted Implementation (deterministic, for tests and demos)
// ==============================================================================

/// Plays back a fixed script of estimation results. Sequenced frames are
/// consumed one per call; once the script is exhausted (or when built with
/// `repeating`) every further call returns the fallback result.
pub struct ScriptedEstimator {
    script: Mutex<VecDeque<Vec<Pose>>>,
    fallback: Vec<Pose>,
    calls: AtomicUsize,
}

impl ScriptedEstimator {
    /// One scripted result per call, then empty results forever.
    pub fn sequence(frames: Vec<Vec<Pose>>) -> Self {
        Self {
            script: Mutex::new(frames.into()),
            fallback: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// The same single-pose result on every call.
    pub fn repeating(pose: Pose) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: vec![pose],
            calls: AtomicUsize::new(0),
        }
    }

    /// How many estimates have been requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoseEstimator for ScriptedEstimator {
    async fn estimate_poses(&self) -> TrackerResult<Vec<Pose>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn model_info(&self) -> String {
        "Scripted estimator (deterministic playback)".to_string()
    }
}

// ==============================================================================
// Failure Implementations (error paths)
// ==============================================================================

/// Fails every estimation with the given message.
pub struct FailingEstimator {
    message: String,
}

impl FailingEstimator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl PoseEstimator for FailingEstimator {
    async fn estimate_poses(&self) -> TrackerResult<Vec<Pose>> {
        Err(TrackerError::Estimation(self.message.clone()))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn model_info(&self) -> String {
        "Failing estimator".to_string()
    }
}

/// Reports itself unready; drivers refuse to start against it.
pub struct OfflineEstimator;

#[async_trait]
impl PoseEstimator for OfflineEstimator {
    async fn estimate_poses(&self) -> TrackerResult<Vec<Pose>> {
        Err(TrackerError::NotInitialized)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn model_info(&self) -> String {
        "Offline estimator (no model loaded)".to_string()
    }
}
