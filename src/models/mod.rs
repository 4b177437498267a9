// Data models for keypoints, angle readings, draw instructions, and capture
// records

pub mod capture;
pub mod draw;
pub mod pose;
