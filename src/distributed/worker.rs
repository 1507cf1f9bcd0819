//! Worker agent for the distributed solver
//!
//! A worker is the passive side of the protocol. It:
//! - Dials the coordinator with a bounded retry loop
//! - Receives exactly one `Config` naming its row block
//! - Answers each `Iteration` with a `Result` for the same index
//! - Exits cleanly on `Stop`
//!
//! The worker keeps no grid state between iterations. Every `Iteration`
//! message carries the full row block plus halo rows, so a worker that
//! crashed and was replaced mid-run would compute the same answer.

use crate::config::WorkerConfig;
use crate::distributed::protocol::{read_message, write_message, Message};
use crate::error::HeatError;
use crate::stencil::step;
use crate::Result;
use tokio::net::TcpStream;
use tokio::time::sleep;

/// Worker agent
///
/// Connects to a coordinator and serves stencil updates until stopped.
pub struct WorkerAgent {
    config: WorkerConfig,
}

impl WorkerAgent {
    /// Create a worker agent from its connection settings
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Run the worker to completion
    ///
    /// Returns `Ok(())` after a clean `Stop`. Any protocol violation or
    /// connection failure is fatal; the worker never reconnects mid-run.
    pub async fn run(&self) -> Result<()> {
        let mut stream = self.connect().await?;

        // The run opens with exactly one Config message.
        let (ny, iterations, row_start, row_end) = match read_message(&mut stream).await? {
            Message::Config {
                ny,
                iterations,
                row_start,
                row_end,
            } => (ny, iterations, row_start, row_end),
            other => {
                return Err(HeatError::Protocol(format!(
                    "expected Config to open the run, got {}",
                    other.kind()
                ))
                .into())
            }
        };
        println!(
            "Worker assigned rows {}..={} ({} columns, {} iterations)",
            row_start, row_end, ny, iterations
        );

        loop {
            match read_message(&mut stream).await? {
                Message::Stop => break,
                Message::Iteration {
                    iter,
                    chunk,
                    top,
                    bottom,
                } => {
                    if chunk.cols() != ny {
                        return Err(HeatError::ShapeMismatch {
                            expected: ny,
                            actual: chunk.cols(),
                        }
                        .into());
                    }
                    if !chunk.is_well_formed() {
                        return Err(HeatError::Protocol(format!(
                            "iteration {} chunk cell count does not match its {}x{} shape",
                            iter,
                            chunk.rows(),
                            chunk.cols()
                        ))
                        .into());
                    }
                    if top.len() != ny || bottom.len() != ny {
                        return Err(HeatError::Protocol(format!(
                            "iteration {} halo rows have {}/{} cells, expected {}",
                            iter,
                            top.len(),
                            bottom.len(),
                            ny
                        ))
                        .into());
                    }

                    let updated = step(&chunk, &top, &bottom);
                    write_message(&mut stream, &Message::Result { iter, chunk: updated }).await?;
                }
                other => {
                    return Err(HeatError::Protocol(format!(
                        "unexpected {} message while processing iterations",
                        other.kind()
                    ))
                    .into())
                }
            }
        }

        println!("Worker finished cleanly");
        Ok(())
    }

    /// Dial the coordinator, retrying on refusal
    ///
    /// The coordinator may not be listening yet when workers launch, so
    /// refused connections are retried up to the configured attempt count
    /// with a fixed delay between tries.
    async fn connect(&self) -> Result<TcpStream> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let retry = self.config.retry;
        let mut last_err = None;

        for attempt in 1..=retry.attempts {
            match TcpStream::connect(&addr).await {
                Ok(stream) => {
                    println!("Connected to coordinator at {} (attempt {})", addr, attempt);
                    return Ok(stream);
                }
                Err(e) => {
                    last_err = Some(e);
                    if attempt < retry.attempts {
                        sleep(retry.delay).await;
                    }
                }
            }
        }

        let cause = last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no connection attempt was made".to_string());
        Err(HeatError::Connection(format!(
            "could not reach coordinator at {} after {} attempts: {}",
            addr, retry.attempts, cause
        ))
        .into())
    }
}
