//! Tuya local protocol framing.
//!
//! Every message on the wire is a big-endian frame:
//!
//! ```text
//! 000055AA | seq u32 | cmd u32 | len u32 | data ... | crc32 u32 | 0000AA55
//! ```
//!
//! `len` counts `data` plus the trailing CRC and suffix. The CRC covers
//! everything from the prefix to the end of `data`. Frames sent by a device
//! usually start `data` with a 4-byte return code.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{BulbError, Result};

/// Frame start marker.
pub const PREFIX: u32 = 0x0000_55AA;
/// Frame end marker.
pub const SUFFIX: u32 = 0x0000_AA55;
/// Bytes before `data`: prefix, seq, cmd, len.
pub const HEADER_LEN: usize = 16;
/// Bytes after `data`: crc, suffix.
pub const TRAILER_LEN: usize = 8;
/// Refuse frames claiming more than this many bytes.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Set data points.
pub const CMD_CONTROL: u32 = 0x07;
/// Unsolicited status push.
pub const CMD_STATUS: u32 = 0x08;
/// Keep-alive.
pub const CMD_HEART_BEAT: u32 = 0x09;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence number.
    pub seq: u32,
    /// Command code.
    pub cmd: u32,
    /// Everything between the header and the CRC.
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub fn new(seq: u32, cmd: u32, data: Vec<u8>) -> Self {
        Self { seq, cmd, data }
    }

    /// Serialize the frame for the wire.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let len = u32::try_from(self.data.len() + TRAILER_LEN).unwrap_or(u32::MAX);

        let mut buf = Vec::with_capacity(HEADER_LEN + self.data.len() + TRAILER_LEN);
        buf.extend_from_slice(&PREFIX.to_be_bytes());
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(&self.cmd.to_be_bytes());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&self.data);

        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_be_bytes());
        buf.extend_from_slice(&SUFFIX.to_be_bytes());
        buf
    }

    /// Decode a complete frame.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Protocol`] on a bad marker, length or checksum.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + TRAILER_LEN {
            return Err(BulbError::Protocol(format!(
                "frame too short: {} bytes",
                bytes.len()
            )));
        }

        let header = parse_header(&bytes[..HEADER_LEN])?;
        if bytes.len() != HEADER_LEN + header.len {
            return Err(BulbError::Protocol(format!(
                "frame length mismatch: header says {}, got {}",
                header.len,
                bytes.len() - HEADER_LEN
            )));
        }

        let body_end = bytes.len() - TRAILER_LEN;
        let crc = read_u32(&bytes[body_end..body_end + 4]);
        let suffix = read_u32(&bytes[body_end + 4..]);

        if suffix != SUFFIX {
            return Err(BulbError::Protocol(format!("bad suffix {suffix:#010x}")));
        }
        let expected = crc32fast::hash(&bytes[..body_end]);
        if crc != expected {
            return Err(BulbError::Protocol(format!(
                "checksum mismatch: {crc:#010x} != {expected:#010x}"
            )));
        }

        Ok(Self {
            seq: header.seq,
            cmd: header.cmd,
            data: bytes[HEADER_LEN..body_end].to_vec(),
        })
    }

    /// Split a device frame into its return code and payload.
    ///
    /// Devices prefix most replies with a small return code; status pushes
    /// sometimes omit it. A leading word whose upper three bytes are zero is
    /// treated as the return code.
    #[must_use]
    pub fn split_return_code(&self) -> (Option<u32>, &[u8]) {
        if self.data.len() >= 4 {
            let word = read_u32(&self.data[..4]);
            if word & 0xFFFF_FF00 == 0 {
                return (Some(word), &self.data[4..]);
            }
        }
        (None, &self.data)
    }
}

struct Header {
    seq: u32,
    cmd: u32,
    len: usize,
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    let prefix = read_u32(&bytes[0..4]);
    if prefix != PREFIX {
        return Err(BulbError::Protocol(format!("bad prefix {prefix:#010x}")));
    }

    let len = read_u32(&bytes[12..16]) as usize;
    if !(TRAILER_LEN..=MAX_FRAME_LEN).contains(&len) {
        return Err(BulbError::Protocol(format!("invalid frame length {len}")));
    }

    Ok(Header {
        seq: read_u32(&bytes[4..8]),
        cmd: read_u32(&bytes[8..12]),
        len,
    })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(word)
}

/// Read exactly one frame from a stream.
///
/// # Errors
///
/// Returns [`BulbError::Io`] on socket errors (including EOF) and
/// [`BulbError::Protocol`] on malformed frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    let parsed = parse_header(&header)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + parsed.len);
    bytes.extend_from_slice(&header);
    bytes.resize(HEADER_LEN + parsed.len, 0);
    reader.read_exact(&mut bytes[HEADER_LEN..]).await?;

    Frame::decode(&bytes)
}
