// THEORY:
// Every failure the motion pipeline can surface lives here. Frame allocation is
// recoverable (the caller decides whether to skip the frame), layout mismatches are
// rejected before any comparison runs, and presence failures never reach the motion
// path at all: the service absorbs them and reports "no person".

use crate::core_modules::frame::FrameLayout;
use std::collections::TryReserveError;
use thiserror::Error;

/// Errors produced while building frames or scoring them.
#[derive(Debug, Error)]
pub enum MotionError {
    /// A frame buffer could not be allocated. `bytes` is `None` when the frame size
    /// does not fit in `usize` at all; `source` is set when the allocator refused.
    #[error("failed to allocate a {width}x{height} frame ({})", describe_bytes(.bytes))]
    FrameAllocation {
        width: u32,
        height: u32,
        bytes: Option<usize>,
        #[source]
        source: Option<TryReserveError>,
    },

    /// The submitted frame does not share the retained frame's dimensions or format.
    #[error("frame layout mismatch: previous frame is {previous}, current frame is {current}")]
    FormatMismatch {
        previous: FrameLayout,
        current: FrameLayout,
    },

    /// A raw buffer's length does not match its declared dimensions.
    #[error("{width}x{height} frame needs {expected} bytes, buffer holds {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("motion threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),
}

fn describe_bytes(bytes: &Option<usize>) -> String {
    match bytes {
        Some(bytes) => format!("{bytes} bytes"),
        None => "size overflows usize".to_string(),
    }
}

/// Errors reported by a presence-detection backend.
#[derive(Debug, Clone, Error)]
pub enum PresenceError {
    #[error("presence backend failed: {0}")]
    Backend(String),
    #[error("presence backend is unavailable")]
    Unavailable,
}

/// Errors seen by callers talking to a [`crate::worker::MotionWorker`].
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("motion worker has shut down")]
    Closed,
    #[error("motion worker is busy, frame dropped")]
    Busy,
    #[error(transparent)]
    Motion(#[from] MotionError),
}
