// THEORY:
// This file is the entry point for the `motion_sensor` library crate.
//
// The core is the frame-difference motion scorer in `core_modules`: it keeps the
// previous camera frame, reduces the difference between it and each new frame to a
// single magnitude, and compares that magnitude with the threshold of the selected
// sensitivity level. Everything around it is an adapter:
//
// - `service` bundles the scorer with the sensitivity selector and an injectable
//   presence detector, returning a `DetectionReport` per frame.
// - `worker` gives the service a single owner task fed through a one-slot queue.
// - `publisher` exposes the observable `motion_detected` / `person_detected` flags.
// - `config` loads the TOML configuration.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod presence;
pub mod publisher;
pub mod service;
pub mod worker;

pub use crate::core_modules::frame::{Frame, FrameLayout, PixelFormat};
pub use crate::core_modules::pixel::pixel::{Pixel, WorkingSpace};
pub use crate::core_modules::scorer::{FrameDifferenceScorer, MotionDecision};
pub use crate::core_modules::sensitivity::{SensitivityLevel, threshold_for};
pub use crate::error::{MotionError, PresenceError, WorkerError};
pub use crate::presence::{DisabledPresence, PresenceDetector};
pub use crate::publisher::{DetectionPublisher, DetectionState};
pub use crate::service::{DetectionReport, MotionDetectionService};
pub use crate::worker::{MotionHandle, MotionWorker, sensitivity_control};
