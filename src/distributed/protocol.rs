//! Wire protocol for coordinator/worker communication
//!
//! This module defines the message types and framing used between the
//! coordinator and its workers. The conversation is strictly half-duplex
//! and coordinator-driven:
//!
//! ```text
//! Coordinator                         Worker
//!      |                                |
//!      |<--------- TCP connect ---------|
//!      |---------- Config ------------->|   (once)
//!      |                                |
//!      |---------- Iteration(0) ------->|   (per iteration)
//!      |<--------- Result(0) -----------|
//!      |---------- Iteration(1) ------->|
//!      |<--------- Result(1) -----------|
//!      |             ...                |
//!      |---------- Stop --------------->|   (once)
//! ```
//!
//! # Message Framing
//!
//! Each message is prefixed with an 8-byte length field (big-endian u64):
//!
//! ```text
//! [8 bytes: payload length][N bytes: MessagePack-serialized message]
//! ```
//!
//! The payload is MessagePack (rmp-serde), which round-trips every f64
//! bit-for-bit. Frames above [`FRAME_CAP`] are rejected before allocation.

use crate::error::HeatError;
use crate::stencil::Chunk;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Sanity cap on a single frame's payload size (100 MB)
///
/// A 200x200 grid's iteration message is ~320 KB; even generous grids stay
/// far below this. A prefix above the cap means a corrupt or hostile peer.
pub const FRAME_CAP: u64 = 100 * 1024 * 1024;

/// Messages exchanged between the coordinator and workers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Coordinator -> Worker: one-time run parameters and row assignment
    Config {
        /// Grid width; every chunk the worker sees must be this wide
        ny: usize,
        /// Total iteration count for the run
        iterations: usize,
        /// First interior row this worker owns (inclusive)
        row_start: usize,
        /// Last interior row this worker owns (inclusive)
        row_end: usize,
    },

    /// Coordinator -> Worker: one iteration's rows plus halo rows
    Iteration {
        /// Iteration index, echoed back in the matching [`Message::Result`]
        iter: usize,
        /// The rows this worker owns, current values
        chunk: Chunk,
        /// The row directly above the chunk
        top: Vec<f64>,
        /// The row directly below the chunk
        bottom: Vec<f64>,
    },

    /// Worker -> Coordinator: the updated rows for one iteration
    Result {
        /// Iteration index this chunk answers
        iter: usize,
        /// The worker's rows after one Jacobi step
        chunk: Chunk,
    },

    /// Coordinator -> Worker: the run is over, exit cleanly
    Stop,
}

impl Message {
    /// Variant name for logs and protocol errors
    ///
    /// Kept separate from `Debug` because an `Iteration` message drags a
    /// whole chunk of cells into any formatted output.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Config { .. } => "Config",
            Message::Iteration { .. } => "Iteration",
            Message::Result { .. } => "Result",
            Message::Stop => "Stop",
        }
    }
}

/// Serialize a message into a framed byte buffer (prefix + payload)
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    let payload = rmp_serde::to_vec(msg).context("Failed to serialize message")?;

    let mut buffer = Vec::with_capacity(8 + payload.len());
    buffer.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

/// Deserialize one framed message from a byte buffer
///
/// Returns the message and the number of bytes consumed (prefix included).
pub fn deserialize_message(data: &[u8]) -> Result<(Message, usize)> {
    if data.len() < 8 {
        anyhow::bail!(
            "Buffer too small for length prefix: {} bytes (need 8)",
            data.len()
        );
    }

    let length = u64::from_be_bytes(data[..8].try_into().unwrap());
    if length > FRAME_CAP {
        return Err(HeatError::FrameTooLarge {
            got: length,
            cap: FRAME_CAP,
        }
        .into());
    }
    let length = length as usize;

    if data.len() < 8 + length {
        anyhow::bail!(
            "Buffer truncated: prefix says {} payload bytes, {} available",
            length,
            data.len() - 8
        );
    }

    let msg = rmp_serde::from_slice(&data[8..8 + length])
        .context("Failed to deserialize message payload")?;
    Ok((msg, 8 + length))
}

/// Read one complete message from the stream
///
/// Loops on partial reads until the prefix and payload are complete. A peer
/// that closes the socket mid-frame surfaces as
/// [`HeatError::ConnectionClosed`].
pub async fn read_message(stream: &mut TcpStream) -> Result<Message> {
    let mut prefix = [0u8; 8];
    read_exact_or_closed(stream, &mut prefix, "length prefix").await?;

    let length = u64::from_be_bytes(prefix);
    if length > FRAME_CAP {
        return Err(HeatError::FrameTooLarge {
            got: length,
            cap: FRAME_CAP,
        }
        .into());
    }

    let mut payload = vec![0u8; length as usize];
    read_exact_or_closed(stream, &mut payload, "payload").await?;

    rmp_serde::from_slice(&payload).context("Failed to deserialize message payload")
}

/// Write one framed message to the stream and flush it
pub async fn write_message(stream: &mut TcpStream, msg: &Message) -> Result<()> {
    let frame = serialize_message(msg)?;
    stream
        .write_all(&frame)
        .await
        .context("Failed to write message")?;
    stream.flush().await.context("Failed to flush message")?;
    Ok(())
}

/// `read_exact` that maps a mid-frame EOF to [`HeatError::ConnectionClosed`]
async fn read_exact_or_closed(stream: &mut TcpStream, buf: &mut [u8], what: &str) -> Result<()> {
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(HeatError::ConnectionClosed(format!("while reading {}", what)).into())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", what))),
    }
}
