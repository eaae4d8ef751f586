// THEORY:
// The motion scorer is stateful and must never be mutated from two places at once.
// `MotionWorker` turns that rule into structure: one tokio task owns the
// `MotionDetectionService` outright, and every other party talks to it through a
// `MotionHandle`.
//
// Key principles:
// 1.  **Single writer**: only the worker task ever calls `process_frame`, so frames
//     are scored strictly in the order they are accepted.
// 2.  **Single slot**: the task queue holds at most one pending frame. A capture loop
//     uses `try_submit` and drops frames while the worker is busy instead of
//     building up latency; callers that need every result use `process`.
// 3.  **Live sensitivity**: the selector is a `watch` channel, read before each frame,
//     so a UI can change it at any time without touching the worker.
// 4.  **Publish at the edge**: successful reports are pushed to the
//     `DetectionPublisher`; the service itself never publishes.

use crate::core_modules::frame::Frame;
use crate::core_modules::sensitivity::SensitivityLevel;
use crate::error::{MotionError, WorkerError};
use crate::publisher::DetectionPublisher;
use crate::service::{DetectionReport, MotionDetectionService};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const QUEUE_SLOTS: usize = 1;

type ReportSender = oneshot::Sender<Result<DetectionReport, MotionError>>;

struct FrameTask {
    frame: Frame,
    reply: Option<ReportSender>,
}

/// Creates the sensitivity selector, starting at the default level.
pub fn sensitivity_control() -> (watch::Sender<SensitivityLevel>, watch::Receiver<SensitivityLevel>) {
    watch::channel(SensitivityLevel::default())
}

/// A cheap, cloneable entry point to a running [`MotionWorker`].
#[derive(Clone)]
pub struct MotionHandle {
    task_sender: mpsc::Sender<FrameTask>,
}

impl MotionHandle {
    /// Queues a frame, waiting for the slot to free up, and returns its report.
    pub async fn process(&self, frame: Frame) -> Result<DetectionReport, WorkerError> {
        let (reply, result_receiver) = oneshot::channel();
        let task = FrameTask {
            frame,
            reply: Some(reply),
        };

        self.task_sender
            .send(task)
            .await
            .map_err(|_| WorkerError::Closed)?;

        let report = result_receiver.await.map_err(|_| WorkerError::Closed)??;
        Ok(report)
    }

    /// Offers a frame without waiting. The frame is dropped if the slot is taken.
    pub fn try_submit(&self, frame: Frame) -> Result<(), WorkerError> {
        self.task_sender
            .try_send(FrameTask { frame, reply: None })
            .map_err(|e| match e {
                TrySendError::Full(_) => WorkerError::Busy,
                TrySendError::Closed(_) => WorkerError::Closed,
            })
    }
}

pub struct MotionWorker;

impl MotionWorker {
    /// Spawns the worker task on the current tokio runtime. The task ends once every
    /// `MotionHandle` has been dropped; its `JoinHandle` lets the caller wait for that.
    pub fn spawn(
        service: MotionDetectionService,
        sensitivity: watch::Receiver<SensitivityLevel>,
        publisher: DetectionPublisher,
    ) -> (MotionHandle, JoinHandle<()>) {
        let (task_sender, task_receiver) = mpsc::channel::<FrameTask>(QUEUE_SLOTS);
        let worker = tokio::spawn(Self::run(service, task_receiver, sensitivity, publisher));
        (MotionHandle { task_sender }, worker)
    }

    async fn run(
        mut service: MotionDetectionService,
        mut task_receiver: mpsc::Receiver<FrameTask>,
        sensitivity: watch::Receiver<SensitivityLevel>,
        publisher: DetectionPublisher,
    ) {
        info!(sensitivity = %service.sensitivity(), "motion worker started");
        let mut processed = 0u64;

        while let Some(task) = task_receiver.recv().await {
            let level = *sensitivity.borrow();
            if level != service.sensitivity() {
                debug!(from = %service.sensitivity(), to = %level, "sensitivity changed");
                service.set_sensitivity(level);
            }

            let result = service.process_frame(task.frame);
            processed += 1;

            match &result {
                Ok(report) => {
                    publisher.publish(report);
                }
                Err(e) => warn!(error = %e, frame = processed, "frame not scored"),
            }

            if let Some(reply) = task.reply {
                let _ = reply.send(result);
            }
        }

        info!(processed, "motion worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::publisher::DetectionState;
    use image::RgbaImage;

    fn block_at(offset: u32) -> Frame {
        let mut image = RgbaImage::from_pixel(100, 100, Pixel::BLACK.into());
        for y in offset..offset + 30 {
            for x in offset..offset + 30 {
                image.put_pixel(x, y, Pixel::RED.into());
            }
        }
        Frame::from(image)
    }

    #[tokio::test]
    async fn processes_frames_in_order_and_publishes() {
        let publisher = DetectionPublisher::new();
        let mut state = publisher.subscribe();
        let (level_tx, level_rx) = sensitivity_control();
        level_tx.send(SensitivityLevel::High).unwrap();

        let (handle, worker) = MotionWorker::spawn(MotionDetectionService::default(), level_rx, publisher);

        let first = handle.process(block_at(0)).await.unwrap();
        assert!(!first.motion_detected());
        assert_eq!(first.motion.magnitude, None);

        let second = handle.process(block_at(50)).await.unwrap();
        assert!(second.motion_detected());

        state.changed().await.unwrap();
        assert_eq!(
            *state.borrow(),
            DetectionState {
                motion_detected: true,
                person_detected: false
            }
        );

        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn worker_finishes_once_every_handle_is_dropped() {
        let (_level_tx, level_rx) = sensitivity_control();
        let (handle, worker) =
            MotionWorker::spawn(MotionDetectionService::default(), level_rx, DetectionPublisher::new());
        let second = handle.clone();

        second.process(block_at(0)).await.unwrap();
        drop(handle);
        // A surviving clone keeps the worker alive.
        assert!(second.process(block_at(0)).await.is_ok());

        drop(second);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn picks_up_sensitivity_changes_between_frames() {
        let (level_tx, level_rx) = sensitivity_control();
        let (handle, _worker) =
            MotionWorker::spawn(MotionDetectionService::default(), level_rx, DetectionPublisher::new());

        level_tx.send(SensitivityLevel::Low).unwrap();
        handle.process(block_at(0)).await.unwrap();
        assert!(!handle.process(block_at(20)).await.unwrap().motion_detected());

        level_tx.send(SensitivityLevel::High).unwrap();
        assert!(handle.process(block_at(0)).await.unwrap().motion_detected());
    }

    #[tokio::test]
    async fn motion_errors_reach_the_caller() {
        let (_level_tx, level_rx) = sensitivity_control();
        let (handle, _worker) =
            MotionWorker::spawn(MotionDetectionService::default(), level_rx, DetectionPublisher::new());

        handle.process(block_at(0)).await.unwrap();
        let small = Frame::filled(10, 10, Pixel::BLACK).unwrap();
        let err = handle.process(small).await.unwrap_err();
        assert!(matches!(err, WorkerError::Motion(MotionError::FormatMismatch { .. })));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn try_submit_drops_frames_while_the_slot_is_full() {
        let (_level_tx, level_rx) = sensitivity_control();
        let (handle, _worker) =
            MotionWorker::spawn(MotionDetectionService::default(), level_rx, DetectionPublisher::new());

        // On a current-thread runtime the worker cannot drain the slot until we yield.
        handle.try_submit(block_at(0)).unwrap();
        assert!(matches!(handle.try_submit(block_at(50)), Err(WorkerError::Busy)));

        // The accepted frame became the baseline; identical input scores zero.
        let report = handle.process(block_at(0)).await.unwrap();
        assert_eq!(report.motion.magnitude, Some(0.0));
    }

    #[tokio::test]
    async fn closed_worker_reports_closed() {
        let (_level_tx, level_rx) = sensitivity_control();
        let (handle, worker) =
            MotionWorker::spawn(MotionDetectionService::default(), level_rx, DetectionPublisher::new());
        worker.abort();
        let _ = worker.await;

        let err = handle.process(block_at(0)).await.unwrap_err();
        assert!(matches!(err, WorkerError::Closed));
        assert!(matches!(handle.try_submit(block_at(0)), Err(WorkerError::Closed)));
    }
}
