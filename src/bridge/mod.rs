// Collaborator seams: the estimator backend, the media source, and the
// sinks that frames and capture records leave through

pub mod estimator;
pub mod media;
pub mod sink;
