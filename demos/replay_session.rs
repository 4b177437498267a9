// Walk the whole pipeline end to end with scripted components: continuous
// tracking against a synthetic source, then pause-driven capture and JSON
// export of the frozen frame.

use std::sync::Arc;

use posemetrics::bridge::estimator::ScriptedEstimator;
use posemetrics::bridge::media::SyntheticSource;
use posemetrics::bridge::sink::{ChannelSink, WriterExporter};
use posemetrics::models::draw::DrawOp;
use posemetrics::{
    LiveTracker, PipelineConfig, Pose, PoseEstimator, RawKeypoint, SnapshotCapture,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    println!("=== Pose Pipeline Replay ===\n");

    let estimator = Arc::new(ScriptedEstimator::repeating(demo_pose()));

    // Test 1: Estimator readiness
    println!("Test 1: Checking estimator...");
    println!("✓ Model: {}", estimator.model_info());
    println!("  Initialized: {}\n", estimator.is_initialized());

    // Test 2: Continuous tracking
    println!("Test 2: Running continuous detection for 250ms...");
    let (tx, mut rx) = tokio::sync::mpsc::channel(256);
    let mut tracker = match LiveTracker::new(
        PipelineConfig::default(),
        estimator.clone(),
        Arc::new(ChannelSink::new(tx)),
    ) {
        Ok(tracker) => tracker,
        Err(e) => {
            println!("✗ Failed to create tracker: {}", e);
            return;
        }
    };

    let live_source = SyntheticSource::new();
    match tracker.start(Box::new(live_source.clone())).await {
        Ok(_) => println!("✓ Started at {} fps", tracker.config().target_fps),
        Err(e) => {
            println!("✗ Failed to start: {}", e);
            return;
        }
    }

    tokio::time::sleep(std::time::Duration::from_millis(250)).await;

    if let Err(e) = tracker.stop().await {
        println!("✗ Failed to stop: {}", e);
        return;
    }
    println!("✓ Stopped cleanly");
    println!("  Metrics: {:?}", tracker.metrics().await);
    println!("  Source released: {}", live_source.released());

    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    println!("✓ Received {} frame(s)", frames.len());
    if let Some(last) = frames.last() {
        for (kind, degrees) in last.angles.iter() {
            println!("    {}: {:.1}°", kind.json_key(), degrees);
        }
        let points = last
            .draw_ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Point { .. }))
            .count();
        println!(
            "    Draw ops: {} ({} points, {} lines)",
            last.draw_ops.len(),
            points,
            last.draw_ops.len() - points
        );
    }

    // Test 3: Pause-driven capture
    println!("\nTest 3: Capturing a paused frame...");
    let paused_source = SyntheticSource::new();
    paused_source.seek(12.34);
    let mut capture = match SnapshotCapture::new(estimator.clone(), Box::new(paused_source.clone()))
    {
        Ok(capture) => capture,
        Err(e) => {
            println!("✗ Failed to create capture: {}", e);
            return;
        }
    };

    match capture.on_pause().await {
        Ok(true) => {
            let record = capture.current_record().unwrap();
            println!("✓ Captured frame at {:.2}s", record.timestamp);
            for (kind, degrees) in record.angles.iter() {
                println!("    {}: {:.1}°", kind.json_key(), degrees);
            }
            println!("    Coordinates: {} joint(s)", record.coordinates.len());
        }
        Ok(false) => println!("✗ No pose detected in the paused frame"),
        Err(e) => {
            println!("✗ Capture failed: {}", e);
            return;
        }
    }

    // Test 4: JSON export
    println!("\nTest 4: Exporting the capture...");
    if let Some(record) = capture.current_record() {
        let filename = record.export_filename();
        match std::fs::File::create(&filename) {
            Ok(file) => {
                let mut exporter = WriterExporter::new(file);
                match capture.export_current(&mut exporter) {
                    Ok(true) => println!("✓ Saved to {}", filename),
                    Ok(false) => println!("✗ Nothing to export"),
                    Err(e) => println!("✗ Export failed: {}", e),
                }
            }
            Err(e) => println!("✗ Failed to create {}: {}", filename, e),
        }
    }

    // Test 5: Teardown
    println!("\nTest 5: Closing the capture session...");
    capture.close();
    println!("✓ Closed (source released: {})", paused_source.released());
    match capture.on_pause().await {
        Err(e) => println!("✓ Further pauses rejected: {}", e),
        Ok(_) => println!("✗ Closed session still captured a frame"),
    }

    println!("\n=== Replay Complete ===");
}

/// A standing figure on a 640x480 frame, left arm bent at the elbow. Every
/// joint clears the confidence threshold except the right ankle, so the
/// right knee angle is withheld while the rest read normally.
fn demo_pose() -> Pose {
    Pose::new(vec![
        RawKeypoint::new("nose", 320.0, 80.0, 0.97),
        RawKeypoint::new("left_eye", 305.0, 70.0, 0.95),
        RawKeypoint::new("right_eye", 335.0, 70.0, 0.95),
        RawKeypoint::new("left_ear", 290.0, 76.0, 0.88),
        RawKeypoint::new("right_ear", 350.0, 76.0, 0.87),
        RawKeypoint::new("left_shoulder", 270.0, 140.0, 0.93),
        RawKeypoint::new("right_shoulder", 370.0, 140.0, 0.92),
        RawKeypoint::new("left_elbow", 250.0, 210.0, 0.90),
        RawKeypoint::new("right_elbow", 390.0, 210.0, 0.89),
        RawKeypoint::new("left_wrist", 300.0, 190.0, 0.86),
        RawKeypoint::new("right_wrist", 400.0, 280.0, 0.85),
        RawKeypoint::new("left_hip", 285.0, 300.0, 0.91),
        RawKeypoint::new("right_hip", 355.0, 300.0, 0.90),
        RawKeypoint::new("left_knee", 280.0, 380.0, 0.84),
        RawKeypoint::new("right_knee", 360.0, 380.0, 0.82),
        RawKeypoint::new("left_ankle", 278.0, 460.0, 0.80),
        RawKeypoint::new("right_ankle", 362.0, 460.0, 0.21),
    ])
}
