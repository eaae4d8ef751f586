// THEORY:
// The `service` module is the host-facing API of the motion sensor. It bundles the
// frame-difference scorer, the current sensitivity selector and an optional presence
// detector behind one call, `process_frame`, and returns a plain `DetectionReport`.
//
// It does not publish anything. Pushing results into an observable store is the
// job of the adapter layer (`publisher`, `worker`).

use crate::config::DetectionConfig;
use crate::core_modules::frame::Frame;
use crate::core_modules::scorer::{FrameDifferenceScorer, MotionDecision};
use crate::core_modules::sensitivity::SensitivityLevel;
use crate::error::MotionError;
use crate::presence::PresenceDetector;
use tracing::warn;

/// Everything the service learned from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectionReport {
    pub motion: MotionDecision,
    pub person_detected: bool,
}

impl DetectionReport {
    pub fn motion_detected(&self) -> bool {
        self.motion.detected
    }
}

/// Scores frames for motion and, when a detector is attached, for human presence.
pub struct MotionDetectionService {
    scorer: FrameDifferenceScorer,
    sensitivity: SensitivityLevel,
    presence: Option<Box<dyn PresenceDetector>>,
}

impl MotionDetectionService {
    pub fn new(sensitivity: SensitivityLevel) -> Self {
        Self {
            scorer: FrameDifferenceScorer::new(),
            sensitivity,
            presence: None,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            scorer: FrameDifferenceScorer::with_working_space(config.working_space),
            sensitivity: config.sensitivity,
            presence: None,
        }
    }

    pub fn with_presence_detector(mut self, detector: impl PresenceDetector + 'static) -> Self {
        self.presence = Some(Box::new(detector));
        self
    }

    pub fn sensitivity(&self) -> SensitivityLevel {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, level: SensitivityLevel) {
        self.sensitivity = level;
    }

    pub fn process_frame(&mut self, frame: Frame) -> Result<DetectionReport, MotionError> {
        let person_detected = self.detect_person(&frame);
        let motion = self.scorer.submit(frame, self.sensitivity.threshold())?;
        Ok(DetectionReport {
            motion,
            person_detected,
        })
    }

    /// Presence failures are absorbed here and never reach the motion path.
    fn detect_person(&mut self, frame: &Frame) -> bool {
        let Some(detector) = self.presence.as_mut() else {
            return false;
        };
        match detector.detect_presence(frame) {
            Ok(present) => present,
            Err(e) => {
                warn!(detector = detector.name(), error = %e, "presence detection failed");
                false
            }
        }
    }
}

impl Default for MotionDetectionService {
    fn default() -> Self {
        Self::new(SensitivityLevel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::{Pixel, WorkingSpace};
    use crate::error::PresenceError;
    use crate::presence::DisabledPresence;
    use image::RgbaImage;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn block_at(offset: u32) -> Frame {
        let mut image = RgbaImage::from_pixel(100, 100, Pixel::BLACK.into());
        for y in offset..offset + 30 {
            for x in offset..offset + 30 {
                image.put_pixel(x, y, Pixel::RED.into());
            }
        }
        Frame::from(image)
    }

    #[test]
    fn initial_state_is_medium_without_motion() {
        let mut service = MotionDetectionService::default();
        assert_eq!(service.sensitivity(), SensitivityLevel::Medium);
        let report = service.process_frame(block_at(0)).unwrap();
        assert_eq!(report, DetectionReport::default());
    }

    #[test]
    fn uses_the_current_sensitivity_for_each_frame() {
        let mut service = MotionDetectionService::new(SensitivityLevel::Low);
        service.process_frame(block_at(0)).unwrap();
        assert!(!service.process_frame(block_at(20)).unwrap().motion_detected());

        service.set_sensitivity(SensitivityLevel::High);
        service.process_frame(block_at(0)).unwrap();
        assert!(service.process_frame(block_at(20)).unwrap().motion_detected());
    }

    #[test]
    fn presence_result_is_reported_alongside_motion() {
        let mut service = MotionDetectionService::default()
            .with_presence_detector(|frame: &Frame| -> Result<bool, PresenceError> {
                Ok(frame.pixels().any(|p| p == Pixel::RED))
            });

        let report = service.process_frame(block_at(0)).unwrap();
        assert!(report.person_detected);

        let empty = Frame::filled(100, 100, Pixel::BLACK).unwrap();
        assert!(!service.process_frame(empty).unwrap().person_detected);
    }

    #[test]
    fn presence_failure_is_absorbed_as_false() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut service = MotionDetectionService::new(SensitivityLevel::High).with_presence_detector(
            move |_: &Frame| -> Result<bool, PresenceError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(PresenceError::Backend("model not loaded".into()))
            },
        );

        service.process_frame(block_at(0)).unwrap();
        let report = service.process_frame(block_at(50)).unwrap();
        assert!(report.motion_detected());
        assert!(!report.person_detected);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_detector_never_reports_a_person() {
        let mut service = MotionDetectionService::default().with_presence_detector(DisabledPresence);
        assert!(!service.process_frame(block_at(0)).unwrap().person_detected);
    }

    #[test]
    fn config_selects_sensitivity_and_working_space() {
        let config = DetectionConfig {
            sensitivity: SensitivityLevel::High,
            working_space: WorkingSpace::Encoded,
        };
        let mut service = MotionDetectionService::from_config(&config);
        assert_eq!(service.sensitivity(), SensitivityLevel::High);

        // The encoded space scores a 30x30 jump at ~0.045, under High's 0.1.
        service.process_frame(block_at(0)).unwrap();
        assert!(!service.process_frame(block_at(50)).unwrap().motion_detected());
    }

    #[test]
    fn format_mismatch_propagates_to_the_caller() {
        let mut service = MotionDetectionService::default();
        service.process_frame(block_at(0)).unwrap();
        let small = Frame::filled(10, 10, Pixel::BLACK).unwrap();
        assert!(matches!(
            service.process_frame(small),
            Err(MotionError::FormatMismatch { .. })
        ));
    }
}
