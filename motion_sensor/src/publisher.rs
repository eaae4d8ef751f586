// THEORY:
// The publisher is the thin adapter between the motion service and whatever
// presentation layer observes it. The service returns a `DetectionReport` by value;
// the publisher pushes the two observable booleans into a `watch` channel so any
// number of subscribers always see the latest state, and are only woken when a
// value actually changes.

use crate::service::DetectionReport;
use tokio::sync::watch;

/// The externally observable detection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectionState {
    pub motion_detected: bool,
    pub person_detected: bool,
}

impl From<&DetectionReport> for DetectionState {
    fn from(report: &DetectionReport) -> Self {
        Self {
            motion_detected: report.motion_detected(),
            person_detected: report.person_detected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectionPublisher {
    state_tx: watch::Sender<DetectionState>,
}

impl DetectionPublisher {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(DetectionState::default());
        Self { state_tx }
    }

    /// Pushes a report. Returns `true` if the observable state changed.
    pub fn publish(&self, report: &DetectionReport) -> bool {
        let next = DetectionState::from(report);
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<DetectionState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> DetectionState {
        *self.state_tx.borrow()
    }
}

impl Default for DetectionPublisher {
    fn default() -> Self {
        Self::new()
    }
}
