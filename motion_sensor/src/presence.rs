// THEORY:
// Human presence detection is delegated to an external vision backend. The motion
// pipeline only needs a yes/no answer per frame, so the backend is modelled as an
// injectable capability. This keeps the scorer testable without any real model and
// lets a host plug in whatever detector its platform provides.

use crate::core_modules::frame::Frame;
use crate::error::PresenceError;

/// A backend that reports whether a person is visible in a frame.
pub trait PresenceDetector: Send {
    fn detect_presence(&mut self, frame: &Frame) -> Result<bool, PresenceError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<F> PresenceDetector for F
where
    F: FnMut(&Frame) -> Result<bool, PresenceError> + Send,
{
    fn detect_presence(&mut self, frame: &Frame) -> Result<bool, PresenceError> {
        self(frame)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// A detector that never sees anyone. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPresence;

impl PresenceDetector for DisabledPresence {
    fn detect_presence(&mut self, _frame: &Frame) -> Result<bool, PresenceError> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
