//! Distributed solver built on TCP sockets
//!
//! This module implements the master/worker execution strategy. A single
//! coordinator owns the full grid and the clock; workers own nothing but a
//! connection and a stencil kernel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  Config, Iteration, Stop  ┌──────────┐
//! │ Coordinator │ ────────────────────────▶ │ Worker 0 │
//! │  (owns grid │ ◀──────────────────────── │          │
//! │  and timer) │         Result            └──────────┘
//! │             │ ◀───────────────────────▶ ...
//! └─────────────┘
//! ```
//!
//! Each connection is strictly half-duplex: the coordinator writes, the
//! worker answers, and neither side ever has more than one message in
//! flight. That keeps the protocol trivial to reason about at the cost of
//! lock-step synchronization per iteration.
//!
//! # Modules
//!
//! - `protocol`: message definitions and the length-prefixed wire codec
//! - `coordinator`: accepts workers, scatters row blocks, gathers results
//! - `worker`: connects with retry and serves iterations until told to stop

pub mod coordinator;
pub mod protocol;
pub mod worker;

// Re-export key types
pub use coordinator::Coordinator;
pub use protocol::Message;
pub use worker::WorkerAgent;
