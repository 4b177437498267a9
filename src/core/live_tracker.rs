// Continuous detection loop: drives the estimator and frame processor at a
// fixed cadence against a live media source

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bridge::estimator::PoseEstimator;
use crate::bridge::media::MediaSource;
use crate::bridge::sink::FrameSink;
use crate::core::frame_processor::{evaluate, EvalMode};
use crate::core::skeleton::project;
use crate::models::pose::{PipelineConfig, TrackerError, TrackerResult};

/// Where the loop currently is. `Idle` covers both "not started" and
/// "started but the source is still buffering"; evaluation only happens in
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Running,
}

/// Counters for one loop lifetime; reset on every `start`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LoopMetrics {
    pub ticks: u64,
    pub frames_evaluated: u64,
    pub empty_results: u64,
    pub estimation_failures: u64,
}

/// Owns the continuous-mode lifecycle: spawns the detection loop on
/// `start`, cancels and joins it on `stop`.
pub struct LiveTracker {
    config: PipelineConfig,
    estimator: Arc<dyn PoseEstimator>,
    sink: Arc<dyn FrameSink>,
    state: Arc<RwLock<LoopState>>,
    metrics: Arc<RwLock<LoopMetrics>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl LiveTracker {
    pub fn new(
        config: PipelineConfig,
        estimator: Arc<dyn PoseEstimator>,
        sink: Arc<dyn FrameSink>,
    ) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            estimator,
            sink,
            state: Arc::new(RwLock::new(LoopState::Idle)),
            metrics: Arc::new(RwLock::new(LoopMetrics::default())),
            handle: None,
            cancel_token: None,
        })
    }

    /// Start the loop against `source`. The tracker owns the source from
    /// here on and releases its tracks exactly once, even when startup
    /// fails.
    pub async fn start(&mut self, mut source: Box<dyn MediaSource>) -> TrackerResult<()> {
        if self.handle.is_some() {
            source.stop_tracks();
            return Err(TrackerError::AlreadyRunning);
        }
        if !self.estimator.is_initialized() {
            source.stop_tracks();
            return Err(TrackerError::NotInitialized);
        }

        *self.metrics.write().await = LoopMetrics::default();

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(detection_loop(
            self.config.clone(),
            source,
            self.estimator.clone(),
            self.sink.clone(),
            self.state.clone(),
            self.metrics.clone(),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!(
            "Started continuous detection at {} fps",
            self.config.target_fps
        );
        Ok(())
    }

    /// Stop the loop and wait for it to wind down. Once this returns, no
    /// further frame reaches the sink, no further estimate is requested,
    /// and the source has been released. Stopping an idle tracker is a
    /// no-op.
    pub async fn stop(&mut self) -> TrackerResult<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| TrackerError::LoopFailed(e.to_string()))?;
            info!("Stopped continuous detection");
        }
        Ok(())
    }

    pub async fn state(&self) -> LoopState {
        *self.state.read().await
    }

    pub async fn is_running(&self) -> bool {
        self.state().await == LoopState::Running
    }

    pub async fn metrics(&self) -> LoopMetrics {
        *self.metrics.read().await
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

async fn detection_loop(
    config: PipelineConfig,
    mut source: Box<dyn MediaSource>,
    estimator: Arc<dyn PoseEstimator>,
    sink: Arc<dyn FrameSink>,
    state: Arc<RwLock<LoopState>>,
    metrics: Arc<RwLock<LoopMetrics>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.tick_interval());
    // Skipping missed ticks keeps estimation at-most-one-in-flight even
    // when a single estimate overruns the tick interval.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Detection loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                metrics.write().await.ticks += 1;

                // Re-arm until the source has a frame to read.
                if !source.is_ready() {
                    let mut current = state.write().await;
                    if *current == LoopState::Running {
                        debug!("Media source stalled, loop idling");
                        *current = LoopState::Idle;
                    }
                    continue;
                }
                {
                    let mut current = state.write().await;
                    if *current != LoopState::Running {
                        info!("Media source ready, detection running");
                        *current = LoopState::Running;
                    }
                }

                let poses = tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    result = estimator.estimate_poses() => match result {
                        Ok(poses) => poses,
                        Err(e) => {
                            metrics.write().await.estimation_failures += 1;
                            if config.stop_on_estimation_error {
                                warn!("Estimation failed, stopping loop: {}", e);
                                break;
                            }
                            warn!("Estimation failed, skipping tick: {}", e);
                            continue;
                        }
                    }
                };

                let Some(pose) = poses.first() else {
                    metrics.write().await.empty_results += 1;
                    continue;
                };

                let snapshot = project(&pose.keypoints);
                let output = evaluate(&snapshot, EvalMode::Loop);
                metrics.write().await.frames_evaluated += 1;
                sink.on_frame(output);
            }
        }
    }

    // Teardown: tracks released exactly once, state back to Idle before
    // the join handle resolves.
    source.stop_tracks();
    *state.write().await = LoopState::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::estimator::{FailingEstimator, OfflineEstimator, ScriptedEstimator};
    use crate::bridge::media::SyntheticSource;
    use crate::bridge::sink::MemorySink;
    use crate::models::pose::{AngleKind, Pose, RawKeypoint};
    use tokio::time::{sleep, Duration};

    fn right_angle_pose() -> Pose {
        Pose::new(vec![
            RawKeypoint::new("left_shoulder", 0.0, 0.0, 0.9),
            RawKeypoint::new("left_elbow", 1.0, 0.0, 0.9),
            RawKeypoint::new("left_wrist", 1.0, 1.0, 0.9),
        ])
    }

    fn tracker_with(
        config: PipelineConfig,
        estimator: Arc<dyn PoseEstimator>,
    ) -> (LiveTracker, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let tracker = LiveTracker::new(config, estimator, sink.clone()).unwrap();
        (tracker, sink)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PipelineConfig {
            target_fps: 0,
            ..Default::default()
        };
        let result = LiveTracker::new(
            config,
            Arc::new(ScriptedEstimator::sequence(vec![])),
            Arc::new(MemorySink::new()),
        );
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_evaluates_and_publishes() {
        let estimator = Arc::new(ScriptedEstimator::repeating(right_angle_pose()));
        let (mut tracker, sink) =
            tracker_with(PipelineConfig::default(), estimator.clone());
        let source = SyntheticSource::new();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert!(tracker.is_running().await);
        tracker.stop().await.unwrap();

        assert!(sink.count() > 0, "ready source must produce frames");
        let last = sink.last().unwrap();
        let angle = last.angles.get(AngleKind::LeftElbow).unwrap();
        assert!((angle - 90.0).abs() < 1e-3, "left elbow read {}", angle);

        let metrics = tracker.metrics().await;
        assert_eq!(metrics.frames_evaluated as usize, sink.count());
        assert_eq!(metrics.estimation_failures, 0);
        assert_eq!(source.release_count(), 1);
        assert_eq!(tracker.state().await, LoopState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unready_source_keeps_loop_idle() {
        let estimator = Arc::new(ScriptedEstimator::repeating(right_angle_pose()));
        let (mut tracker, sink) =
            tracker_with(PipelineConfig::default(), estimator.clone());
        let source = SyntheticSource::buffering();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(tracker.state().await, LoopState::Idle);
        assert_eq!(sink.count(), 0);
        assert_eq!(estimator.calls(), 0, "no estimation before readiness");
        assert!(tracker.metrics().await.ticks > 0, "the loop must keep re-arming");

        source.set_ready(true);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(tracker.state().await, LoopState::Running);
        assert!(sink.count() > 0);

        tracker.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_deterministic() {
        let estimator = Arc::new(ScriptedEstimator::repeating(right_angle_pose()));
        let (mut tracker, sink) =
            tracker_with(PipelineConfig::default(), estimator.clone());
        let source = SyntheticSource::new();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        tracker.stop().await.unwrap();

        let calls_at_stop = estimator.calls();
        let frames_at_stop = sink.count();
        assert_eq!(source.release_count(), 1);

        // Plenty of would-be ticks later, nothing has moved.
        sleep(Duration::from_millis(500)).await;
        assert_eq!(estimator.calls(), calls_at_stop);
        assert_eq!(sink.count(), frames_at_stop);
        assert_eq!(tracker.state().await, LoopState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_errors_and_releases_the_new_source() {
        let estimator = Arc::new(ScriptedEstimator::repeating(right_angle_pose()));
        let (mut tracker, _sink) =
            tracker_with(PipelineConfig::default(), estimator.clone());
        let first = SyntheticSource::new();
        let second = SyntheticSource::new();

        tracker.start(Box::new(first.clone())).await.unwrap();
        let result = tracker.start(Box::new(second.clone())).await;
        assert!(matches!(result, Err(TrackerError::AlreadyRunning)));
        assert_eq!(second.release_count(), 1, "rejected source must still be released");
        assert_eq!(first.release_count(), 0, "running source must be untouched");

        tracker.stop().await.unwrap();
        assert_eq!(first.release_count(), 1);

        // Stopped trackers can be started again.
        let third = SyntheticSource::new();
        tracker.start(Box::new(third.clone())).await.unwrap();
        tracker.stop().await.unwrap();
        assert_eq!(third.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_uninitialized_estimator() {
        let (mut tracker, sink) =
            tracker_with(PipelineConfig::default(), Arc::new(OfflineEstimator));
        let source = SyntheticSource::new();

        let result = tracker.start(Box::new(source.clone())).await;
        assert!(matches!(result, Err(TrackerError::NotInitialized)));
        assert_eq!(source.release_count(), 1);
        assert_eq!(tracker.state().await, LoopState::Idle);
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimation_failure_skips_the_tick_by_default() {
        let estimator = Arc::new(FailingEstimator::new("model detached"));
        let (mut tracker, sink) = tracker_with(PipelineConfig::default(), estimator);
        let source = SyntheticSource::new();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(100)).await;

        let metrics = tracker.metrics().await;
        assert!(metrics.estimation_failures > 1, "the loop must keep going");
        assert_eq!(sink.count(), 0);
        assert_eq!(tracker.state().await, LoopState::Running);

        tracker.stop().await.unwrap();
        assert_eq!(source.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_on_estimation_error_halts_the_loop() {
        let config = PipelineConfig {
            stop_on_estimation_error: true,
            ..Default::default()
        };
        let estimator = Arc::new(FailingEstimator::new("model detached"));
        let (mut tracker, sink) = tracker_with(config, estimator);
        let source = SyntheticSource::new();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(100)).await;

        let metrics = tracker.metrics().await;
        assert_eq!(metrics.estimation_failures, 1, "loop must halt after the first failure");
        assert_eq!(source.release_count(), 1, "self-halted loop still releases the source");
        assert_eq!(tracker.state().await, LoopState::Idle);
        assert_eq!(sink.count(), 0);

        tracker.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_estimates_publish_nothing() {
        let estimator = Arc::new(ScriptedEstimator::sequence(vec![]));
        let (mut tracker, sink) = tracker_with(PipelineConfig::default(), estimator.clone());
        let source = SyntheticSource::new();

        tracker.start(Box::new(source.clone())).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        tracker.stop().await.unwrap();

        assert!(estimator.calls() > 0);
        assert_eq!(sink.count(), 0, "no detection means no output, not an empty frame");
        let metrics = tracker.metrics().await;
        assert!(metrics.empty_results > 0);
        assert_eq!(metrics.frames_evaluated, 0);
    }
}
