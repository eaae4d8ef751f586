// THEORY:
// The `FrameDifferenceScorer` is the stateful heart of motion detection. It retains
// exactly one frame, the most recent one it has seen, and scores every new frame
// against it before replacing it.
//
// Key principles:
// 1.  **First frame is silent**: with nothing to compare against, the first frame only
//     establishes the baseline and never reports motion.
// 2.  **Strictly sequential**: frames are compared in submission order; the baseline
//     shifts on every call, so repeating a submission is not idempotent.
// 3.  **Checked input**: a threshold outside [0, 1] is rejected before state changes,
//     and a frame whose layout differs from the baseline is rejected instead of being
//     compared. The rejected frame still becomes the baseline, so a genuine change of
//     camera resolution recovers on the next frame.
// 4.  **Single writer**: `submit` takes `&mut self`; sharing a scorer between threads
//     requires the caller to serialise access (see `MotionWorker`).

use crate::core_modules::difference::compute_magnitude;
use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::WorkingSpace;
use crate::core_modules::sensitivity::Threshold;
use crate::error::MotionError;
use tracing::{debug, warn};

/// The outcome of scoring one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionDecision {
    /// Whether the magnitude exceeded the threshold.
    pub detected: bool,
    /// The computed magnitude, or `None` when the frame only set the baseline.
    pub magnitude: Option<f32>,
}

/// Scores each submitted frame against the one before it.
#[derive(Debug, Default)]
pub struct FrameDifferenceScorer {
    previous_frame: Option<Frame>,
    working_space: WorkingSpace,
}

impl FrameDifferenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_space(working_space: WorkingSpace) -> Self {
        Self {
            previous_frame: None,
            working_space,
        }
    }

    pub fn working_space(&self) -> WorkingSpace {
        self.working_space
    }

    pub fn has_previous_frame(&self) -> bool {
        self.previous_frame.is_some()
    }

    pub fn submit(&mut self, frame: Frame, threshold: Threshold) -> Result<MotionDecision, MotionError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MotionError::InvalidThreshold(threshold));
        }

        let Some(previous) = self.previous_frame.as_ref() else {
            debug!(layout = %frame.layout(), "baseline frame stored");
            self.previous_frame = Some(frame);
            return Ok(MotionDecision::default());
        };

        let scored = compute_magnitude(&frame, previous, self.working_space);
        // The old baseline is dropped here whether or not the comparison succeeded.
        self.previous_frame = Some(frame);

        let magnitude = scored.inspect_err(|e| warn!(error = %e, "frame rejected"))?;
        let detected = magnitude > threshold;
        debug!(magnitude, threshold, detected, "motion scored");

        Ok(MotionDecision {
            detected,
            magnitude: Some(magnitude),
        })
    }
}
