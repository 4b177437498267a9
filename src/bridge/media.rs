// Media source bridge
// The camera stream or recorded video a driver reads readiness and playback
// position from; pixel frames go straight to the estimator backend instead

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Media source trait
pub trait MediaSource: Send {
    /// Whether enough data is buffered to evaluate the current frame
    fn is_ready(&self) -> bool;

    /// Current playback position in seconds
    fn position_secs(&self) -> f64;

    /// Release the underlying tracks. The owning driver calls this exactly
    /// once, on teardown.
    fn stop_tracks(&mut self);
}

// ==============================================================================
// Synthetic Implementation (deterministic, for tests and demos)
// ==============================================================================

/// Clone-shared synthetic source: every clone sees the same readiness,
/// position, and release state, so a test can hand one clone to a driver
/// and steer or inspect it through another.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    ready: Arc<AtomicBool>,
    position: Arc<Mutex<f64>>,
    releases: Arc<AtomicUsize>,
}

impl SyntheticSource {
    /// Ready from the start, positioned at zero.
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
            position: Arc::new(Mutex::new(0.0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Not ready until `set_ready(true)`; models a stream still buffering.
    pub fn buffering() -> Self {
        let source = Self::new();
        source.ready.store(false, Ordering::SeqCst);
        source
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn seek(&self, secs: f64) {
        *self.position.lock().unwrap() = secs;
    }

    /// How many times `stop_tracks` has run across all clones.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.release_count() > 0
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for SyntheticSource {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn position_secs(&self) -> f64 {
        *self.position.lock().unwrap()
    }

    fn stop_tracks(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
