//! Serialized device command dispatch.
//!
//! HTTP handlers must not wait on the bulb, and two patterns must never
//! interleave on the device. Handlers therefore [`Dispatcher::submit`] a
//! [`DeviceCommand`] into a bounded queue; a single worker task owns the
//! driver and plays commands one at a time, in submission order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use flowlight_core::BulbColor;

use crate::config::DispatchTimings;
use crate::driver::BulbDriver;
use crate::{BulbError, Result};

/// Commands waiting beyond this are dropped.
pub const QUEUE_CAPACITY: usize = 32;

/// A unit of device work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Blink and hold a colour, or switch off for [`BulbColor::Black`].
    Show(BulbColor),
    /// Cycle through every coded colour, then switch off.
    TestSequence,
}

/// Handle for submitting commands to the device worker.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<DeviceCommand>,
}

impl Dispatcher {
    /// Start the worker task.
    ///
    /// The worker exits once every `Dispatcher` clone is dropped and the
    /// queue is drained.
    #[must_use]
    pub fn spawn(driver: Arc<dyn BulbDriver>, timings: DispatchTimings) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(rx, driver, timings));
        (Self { tx }, handle)
    }

    /// Queue a command without waiting for it to run.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::QueueFull`] when the queue is at capacity and
    /// [`BulbError::QueueClosed`] when the worker has stopped.
    pub fn submit(&self, command: DeviceCommand) -> Result<()> {
        self.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(dropped) => {
                tracing::warn!(command = ?dropped, "Device queue full, dropping command");
                BulbError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => BulbError::QueueClosed,
        })
    }
}

/// Wait for a worker whose dispatchers have all been dropped.
///
/// A worker still busy after `grace` (for example stuck on a device that
/// stopped answering) is aborted. Returns `true` if it finished on its own.
pub async fn join_worker(mut worker: JoinHandle<()>, grace: Duration) -> bool {
    match timeout(grace, &mut worker).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Device worker panicked");
            true
        }
        Err(_) => {
            tracing::warn!(grace = ?grace, "Device worker did not stop in time, aborting");
            worker.abort();
            false
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<DeviceCommand>,
    driver: Arc<dyn BulbDriver>,
    timings: DispatchTimings,
) {
    tracing::debug!("Device worker started");

    while let Some(command) = rx.recv().await {
        tracing::debug!(command = ?command, "Running device command");
        if let Err(e) = execute(driver.as_ref(), command, timings).await {
            tracing::error!(command = ?command, error = %e, "Device command failed");
        }
    }

    tracing::debug!("Device worker stopped");
}

/// Play one command on the driver.
///
/// # Errors
///
/// Stops at the first driver error and returns it.
pub async fn execute(
    driver: &dyn BulbDriver,
    command: DeviceCommand,
    timings: DispatchTimings,
) -> Result<()> {
    match command {
        DeviceCommand::Show(color) if color.blinks() => {
            driver.set_color(color).await?;
            sleep(timings.blink_flash).await;
            driver.turn_off().await?;
            sleep(timings.blink_flash).await;
            driver.set_color(color).await
        }
        DeviceCommand::Show(_) => driver.turn_off().await,
        DeviceCommand::TestSequence => {
            for color in BulbColor::SEQUENCE {
                driver.set_color(color).await?;
                sleep(timings.test_step).await;
            }
            driver.turn_off().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BulbAction, RecordingBulb};

    fn fast() -> DispatchTimings {
        DispatchTimings {
            blink_flash: Duration::from_millis(1),
            test_step: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn show_blinks_then_holds() {
        let bulb = RecordingBulb::new();
        execute(&bulb, DeviceCommand::Show(BulbColor::Green), fast())
            .await
            .unwrap();
        assert_eq!(
            bulb.actions(),
            vec![
                BulbAction::Color(BulbColor::Green),
                BulbAction::Off,
                BulbAction::Color(BulbColor::Green),
            ]
        );
    }

    #[tokio::test]
    async fn black_turns_off_without_blink() {
        let bulb = RecordingBulb::new();
        execute(&bulb, DeviceCommand::Show(BulbColor::Black), fast())
            .await
            .unwrap();
        assert_eq!(bulb.actions(), vec![BulbAction::Off]);
    }

    #[tokio::test]
    async fn test_sequence_order() {
        let bulb = RecordingBulb::new();
        execute(&bulb, DeviceCommand::TestSequence, fast()).await.unwrap();
        assert_eq!(
            bulb.actions(),
            vec![
                BulbAction::Color(BulbColor::Green),
                BulbAction::Color(BulbColor::Red),
                BulbAction::Color(BulbColor::Blue),
                BulbAction::Color(BulbColor::White),
                BulbAction::Off,
            ]
        );
    }

    #[tokio::test]
    async fn driver_error_stops_pattern() {
        let bulb = RecordingBulb::failing();
        let err = execute(&bulb, DeviceCommand::Show(BulbColor::Red), fast())
            .await
            .unwrap_err();
        assert!(matches!(err, BulbError::Protocol(_)));
        assert_eq!(bulb.actions(), vec![BulbAction::Color(BulbColor::Red)]);
    }

    #[tokio::test]
    async fn worker_runs_commands_in_order() {
        let bulb = Arc::new(RecordingBulb::new());
        let (dispatcher, handle) = Dispatcher::spawn(bulb.clone(), fast());

        dispatcher
            .submit(DeviceCommand::Show(BulbColor::Blue))
            .unwrap();
        dispatcher
            .submit(DeviceCommand::Show(BulbColor::Black))
            .unwrap();
        drop(dispatcher);
        handle.await.unwrap();

        assert_eq!(
            bulb.actions(),
            vec![
                BulbAction::Color(BulbColor::Blue),
                BulbAction::Off,
                BulbAction::Color(BulbColor::Blue),
                BulbAction::Off,
            ]
        );
    }

    #[tokio::test]
    async fn worker_survives_driver_errors() {
        let bulb = Arc::new(RecordingBulb::failing());
        let (dispatcher, handle) = Dispatcher::spawn(bulb.clone(), fast());

        dispatcher.submit(DeviceCommand::TestSequence).unwrap();
        dispatcher
            .submit(DeviceCommand::Show(BulbColor::Black))
            .unwrap();
        drop(dispatcher);
        handle.await.unwrap();

        assert_eq!(
            bulb.actions(),
            vec![BulbAction::Color(BulbColor::Green), BulbAction::Off]
        );
    }

    /// A driver whose calls never complete.
    struct HungBulb;

    #[async_trait::async_trait]
    impl BulbDriver for HungBulb {
        async fn set_color(&self, _color: BulbColor) -> Result<()> {
            std::future::pending().await
        }

        async fn turn_off(&self) -> Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn join_aborts_stuck_worker() {
        let (dispatcher, handle) = Dispatcher::spawn(Arc::new(HungBulb), fast());
        dispatcher.submit(DeviceCommand::Show(BulbColor::Black)).unwrap();
        drop(dispatcher);

        let finished = tokio::time::timeout(
            Duration::from_secs(3),
            join_worker(handle, Duration::from_millis(50)),
        )
        .await
        .expect("join should not hang");
        assert!(!finished);
    }

    #[tokio::test]
    async fn join_idle_worker() {
        let (dispatcher, handle) = Dispatcher::spawn(Arc::new(RecordingBulb::new()), fast());
        drop(dispatcher);
        assert!(join_worker(handle, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn full_queue_drops() {
        let (tx, _rx) = mpsc::channel(1);
        let dispatcher = Dispatcher { tx };

        dispatcher.submit(DeviceCommand::TestSequence).unwrap();
        assert!(matches!(
            dispatcher.submit(DeviceCommand::TestSequence),
            Err(BulbError::QueueFull)
        ));
    }

    #[tokio::test]
    async fn closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let dispatcher = Dispatcher { tx };
        assert!(matches!(
            dispatcher.submit(DeviceCommand::TestSequence),
            Err(BulbError::QueueClosed)
        ));
    }
}
