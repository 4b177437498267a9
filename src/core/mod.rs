// Pipeline stages and the two drivers that run them

pub mod geometry;
pub mod skeleton;
pub mod frame_processor;

// Mode drivers
pub mod live_tracker;
pub mod snapshot_capture;
