//! Tuya local protocol 3.3 driver.
//!
//! Commands are sent as `CONTROL` frames whose payload is the protocol
//! version, twelve zero bytes and the AES-ECB encrypted JSON body:
//!
//! ```text
//! {"devId": "...", "uid": "...", "t": "<unix seconds>", "dps": {...}}
//! ```
//!
//! The driver keeps one TCP connection open. A socket or framing failure, or
//! a command left unacknowledged for `ack_timeout`, drops it; the next
//! attempt reconnects, and a command that fails that way is retried once on
//! a fresh connection.

pub mod cipher;
pub mod frame;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use flowlight_core::BulbColor;

use crate::config::TuyaConfig;
use crate::driver::BulbDriver;
use crate::{BulbError, Result};

use self::cipher::EcbCipher;
use self::frame::{read_frame, Frame, CMD_CONTROL, CMD_HEART_BEAT};

/// Protocol version tag at the start of every 3.3 payload.
pub const PROTOCOL_VERSION: &[u8; 3] = b"3.3";

/// Zero padding between the version tag and the ciphertext.
const VERSION_PADDING: [u8; 12] = [0; 12];

/// Data point ids used by colour bulbs.
pub mod dps {
    /// Power switch (bool).
    pub const POWER: &str = "20";
    /// Work mode, `"white"` or `"colour"`.
    pub const MODE: &str = "21";
    /// White brightness, 10..=1000.
    pub const BRIGHTNESS: &str = "22";
    /// White colour temperature, 0..=1000.
    pub const TEMPERATURE: &str = "23";
    /// Colour as `HHHHSSSSVVVV` hex.
    pub const COLOUR: &str = "24";
}

/// Full saturation and value on the 0..=1000 scale.
const FULL: u16 = 1000;

/// Hue in degrees for a coloured (non-white) bulb colour.
#[must_use]
pub const fn hue(color: BulbColor) -> Option<u16> {
    match color {
        BulbColor::Green => Some(120),
        BulbColor::Red => Some(0),
        BulbColor::Blue => Some(240),
        BulbColor::White | BulbColor::Black => None,
    }
}

/// Encode an HSV triple as the 12 hex digits of data point 24.
#[must_use]
pub fn colour_hex(h: u16, s: u16, v: u16) -> String {
    format!("{h:04x}{s:04x}{v:04x}")
}

/// The data points that make the bulb show `color`.
#[must_use]
pub fn dps_for(color: BulbColor) -> Value {
    match color {
        BulbColor::Black => json!({ dps::POWER: false }),
        BulbColor::White => json!({
            dps::POWER: true,
            dps::MODE: "white",
            dps::BRIGHTNESS: FULL,
            dps::TEMPERATURE: FULL,
        }),
        coloured => {
            let h = hue(coloured).unwrap_or_default();
            json!({
                dps::POWER: true,
                dps::MODE: "colour",
                dps::COLOUR: colour_hex(h, FULL, FULL),
            })
        }
    }
}

/// A Tuya colour bulb reached over the local network.
#[derive(Debug)]
pub struct TuyaBulb {
    config: TuyaConfig,
    cipher: EcbCipher,
    stream: Mutex<Option<TcpStream>>,
    seq: AtomicU32,
}

impl TuyaBulb {
    /// Validate the config and open the device connection.
    ///
    /// # Errors
    ///
    /// Returns a config or key error for bad settings, or an I/O error if the
    /// device does not accept the connection.
    pub async fn connect(config: TuyaConfig) -> Result<Self> {
        config.validate()?;
        let cipher = EcbCipher::new(config.local_key.as_bytes())?;
        let stream = open(&config).await?;

        tracing::info!(
            device_id = %config.device_id,
            address = %config.address(),
            "Connected to Tuya device"
        );

        Ok(Self {
            config,
            cipher,
            stream: Mutex::new(Some(stream)),
            seq: AtomicU32::new(1),
        })
    }

    /// The device configuration.
    #[must_use]
    pub fn config(&self) -> &TuyaConfig {
        &self.config
    }

    /// Send a set of data points and wait for the device to acknowledge.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Rejected`] for a non-zero return code, or the
    /// I/O or protocol error of the retry attempt.
    pub async fn send_dps(&self, dps: &Value) -> Result<()> {
        let body = self.control_body(dps);
        let mut slot = self.stream.lock().await;

        match self.exchange(&mut slot, &body).await {
            Err(e) if e.is_retriable() => {
                tracing::warn!(
                    device_id = %self.config.device_id,
                    error = %e,
                    "Device exchange failed, reconnecting"
                );
                *slot = None;
                let result = self.exchange(&mut slot, &body).await;
                if matches!(&result, Err(e) if e.is_retriable()) {
                    *slot = None;
                }
                result
            }
            other => other,
        }
    }

    /// Build the encrypted `CONTROL` payload for `dps`.
    fn control_body(&self, dps: &Value) -> Vec<u8> {
        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let message = json!({
            "devId": self.config.device_id,
            "uid": self.config.device_id,
            "t": t.to_string(),
            "dps": dps,
        });
        tracing::debug!(dps = %dps, "Sending data points");

        let sealed = self.cipher.encrypt(message.to_string().as_bytes());
        let mut body = Vec::with_capacity(PROTOCOL_VERSION.len() + VERSION_PADDING.len() + sealed.len());
        body.extend_from_slice(PROTOCOL_VERSION);
        body.extend_from_slice(&VERSION_PADDING);
        body.extend_from_slice(&sealed);
        body
    }

    /// One request/acknowledge round trip, connecting first if needed.
    async fn exchange(&self, slot: &mut Option<TcpStream>, body: &[u8]) -> Result<()> {
        if slot.is_none() {
            *slot = Some(open(&self.config).await?);
        }
        let stream = slot
            .as_mut()
            .ok_or_else(|| BulbError::Protocol("connection unavailable".to_string()))?;

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let request = Frame::new(seq, CMD_CONTROL, body.to_vec()).encode();
        stream.write_all(&request).await?;

        let ack_timeout = self.config.ack_timeout;
        timeout(ack_timeout, await_ack(stream))
            .await
            .map_err(|_| BulbError::Timeout(ack_timeout))?
    }
}

/// Read frames until the `CONTROL` reply and check its return code.
async fn await_ack(stream: &mut TcpStream) -> Result<()> {
    loop {
        let reply = read_frame(stream).await?;
        if reply.cmd != CMD_CONTROL {
            if reply.cmd != CMD_HEART_BEAT {
                tracing::trace!(cmd = reply.cmd, seq = reply.seq, "Skipping unsolicited frame");
            }
            continue;
        }

        return match reply.split_return_code() {
            (Some(0) | None, _) => Ok(()),
            (Some(code), _) => Err(BulbError::Rejected(code)),
        };
    }
}

async fn open(config: &TuyaConfig) -> Result<TcpStream> {
    let stream = TcpStream::connect(config.address()).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

#[async_trait]
impl BulbDriver for TuyaBulb {
    async fn set_color(&self, color: BulbColor) -> Result<()> {
        if color.is_off() {
            return self.turn_off().await;
        }
        self.send_dps(&dps_for(color)).await
    }

    async fn turn_off(&self) -> Result<()> {
        self.send_dps(&dps_for(BulbColor::Black)).await
    }
}
