//! The device controller interface.

use async_trait::async_trait;

use flowlight_core::BulbColor;

use crate::Result;

/// The `BulbDriver` trait is the interface the dispatcher uses to control a
/// colour bulb.
///
/// Construction is the "connect" step: a value implementing this trait is
/// expected to be ready to accept commands.
#[async_trait]
pub trait BulbDriver: Send + Sync {
    /// Switch the bulb on and show a steady colour.
    ///
    /// [`BulbColor::Black`] is equivalent to [`BulbDriver::turn_off`].
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached or rejects the command.
    async fn set_color(&self, color: BulbColor) -> Result<()>;

    /// Switch the bulb off.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached or rejects the command.
    async fn turn_off(&self) -> Result<()>;
}
