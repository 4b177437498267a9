// Frame and export sinks
// Where evaluated frames and capture records leave the pipeline

use std::io::Write;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::core::frame_processor::FrameOutput;
use crate::models::capture::CaptureRecord;
use crate::models::pose::{TrackerError, TrackerResult};

/// Renderer-facing sink for evaluated frames
pub trait FrameSink: Send + Sync {
    /// Receive one fully-evaluated frame. Only ever called after an
    /// evaluation has completed; never with partial results.
    fn on_frame(&self, frame: FrameOutput);
}

/// Export destination for capture records
pub trait ExportSink: Send {
    fn export(&mut self, record: &CaptureRecord) -> TrackerResult<()>;
}

// ==============================================================================
// Frame Sinks
// ==============================================================================

/// Forwards frames into a tokio channel. Uses `try_send`: a stalled
/// consumer drops frames rather than stalling the detection loop.
pub struct ChannelSink {
    tx: mpsc::Sender<FrameOutput>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<FrameOutput>) -> Self {
        Self { tx }
    }
}

impl FrameSink for ChannelSink {
    fn on_frame(&self, frame: FrameOutput) {
        let _ = self.tx.try_send(frame);
    }
}

/// Accumulates every frame in memory, for tests and demos.
#[derive(Default)]
pub struct MemorySink {
    frames: Mutex<Vec<FrameOutput>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<FrameOutput> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl FrameSink for MemorySink {
    fn on_frame(&self, frame: FrameOutput) {
        self.frames.lock().unwrap().push(frame);
    }
}

// ==============================================================================
// Export Sinks
// ==============================================================================

/// Writes each exported record as pretty-printed JSON followed by a
/// newline.
pub struct WriterExporter<W: Write> {
    writer: W,
}

impl<W: Write> WriterExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ExportSink for WriterExporter<W> {
    fn export(&mut self, record: &CaptureRecord) -> TrackerResult<()> {
        let json = record.to_json_pretty()?;
        self.writer
            .write_all(json.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| TrackerError::Export(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::{AngleKind, AngleSet};
    use std::collections::BTreeMap;

    fn empty_frame() -> FrameOutput {
        FrameOutput {
            angles: AngleSet::default(),
            draw_ops: Vec::new(),
        }
    }

    #[test]
    fn test_memory_sink_accumulates() {
        let sink = MemorySink::new();
        assert_eq!(sink.count(), 0);
        assert!(sink.last().is_none());

        sink.on_frame(empty_frame());
        sink.on_frame(empty_frame());
        assert_eq!(sink.count(), 2);
        assert!(sink.last().is_some());
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ChannelSink::new(tx);

        sink.on_frame(empty_frame());
        sink.on_frame(empty_frame());

        assert!(rx.recv().await.is_some());
        assert!(
            rx.try_recv().is_err(),
            "second frame should have been dropped, not queued"
        );
    }

    #[test]
    fn test_writer_exporter_emits_parseable_json() {
        let mut angles = AngleSet::default();
        angles.set(AngleKind::RightKnee, 150.0);
        let record = CaptureRecord::new(4.5, angles, BTreeMap::new());

        let mut exporter = WriterExporter::new(Vec::new());
        exporter.export(&record).unwrap();
        let bytes = exporter.into_inner();

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with('\n'));
        let back: CaptureRecord = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(back, record);
    }
}
