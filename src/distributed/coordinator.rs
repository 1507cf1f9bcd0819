//! Run coordinator for the distributed solver
//!
//! The coordinator owns the authoritative grid and the benchmark clock. It:
//! - Accepts exactly as many workers as the run was configured for
//! - Assigns each worker a contiguous block of interior rows
//! - Scatters row blocks with halo rows, gathers updated blocks, each iteration
//! - Applies the double-buffer swap that keeps reads and writes separated
//!
//! Connection order is assignment order: the i-th worker to connect owns the
//! i-th row range. Workers are interchangeable processes, so no identity
//! handshake is needed.

use crate::config::CoordinatorConfig;
use crate::distributed::protocol::{read_message, write_message, Message};
use crate::error::HeatError;
use crate::grid::Grid;
use crate::partition::split_rows;
use crate::stencil::Chunk;
use crate::util::time::Stopwatch;
use crate::Result;
use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Distributed run coordinator
///
/// Binding and running are split so callers can bind port 0 and read the
/// ephemeral port back before any worker dials in.
#[derive(Debug)]
pub struct Coordinator {
    config: CoordinatorConfig,
    ranges: Vec<(usize, usize)>,
    listener: TcpListener,
}

impl Coordinator {
    /// Validate the configuration and bind the listening socket
    ///
    /// Fails before binding if the grid is degenerate, the worker count is
    /// zero, or there are fewer interior rows than workers.
    pub async fn bind(config: CoordinatorConfig) -> Result<Self> {
        config.validate()?;

        let interior_rows = config.run.nx - 2;
        let ranges = split_rows(1, config.run.nx - 2, config.workers);
        if ranges.len() < config.workers {
            return Err(HeatError::InsufficientWork {
                rows: interior_rows,
                workers: config.workers,
            }
            .into());
        }

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind coordinator on {}", addr))?;

        Ok(Self {
            config,
            ranges,
            listener,
        })
    }

    /// Address the listener actually bound to
    ///
    /// Differs from the configured address when port 0 was requested.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let addr = self
            .listener
            .local_addr()
            .context("Failed to read coordinator listen address")?;
        Ok(addr)
    }

    /// Accept workers and drive the run to completion
    ///
    /// Returns the runtime of the iteration phase (connection setup and
    /// config dispatch are excluded) together with the final grid.
    pub async fn run(self) -> Result<(Duration, Grid)> {
        let Self {
            config,
            ranges,
            listener,
        } = self;
        let run = &config.run;

        println!(
            "Waiting for {} workers on {} ...",
            config.workers,
            listener.local_addr()?
        );
        let mut streams: Vec<TcpStream> = Vec::with_capacity(config.workers);
        for i in 0..config.workers {
            let (stream, addr) = listener
                .accept()
                .await
                .with_context(|| format!("Failed to accept worker {}", i))?;
            println!("  ✅ Worker {} connected from {}", i, addr);
            streams.push(stream);
        }
        // The roster is full; stop accepting.
        drop(listener);

        for (i, (stream, &(row_start, row_end))) in
            streams.iter_mut().zip(&ranges).enumerate()
        {
            let msg = Message::Config {
                ny: run.ny,
                iterations: run.iterations,
                row_start,
                row_end,
            };
            write_message(stream, &msg)
                .await
                .with_context(|| format!("Failed to send Config to worker {}", i))?;
        }
        println!(
            "All {} workers connected; running {} iterations",
            config.workers, run.iterations
        );

        let mut grid = run.build_grid();
        let mut staging = grid.clone();

        let timer = Stopwatch::start();
        for iter in 0..run.iterations {
            // Boundary rows belong to no worker and must survive the swap,
            // so staging starts each iteration as a full copy.
            staging.copy_cells_from(&grid);

            for (i, (stream, &(row_start, row_end))) in
                streams.iter_mut().zip(&ranges).enumerate()
            {
                let chunk = Chunk::from_cells(
                    row_end - row_start + 1,
                    run.ny,
                    grid.rows(row_start, row_end).to_vec(),
                )?;
                let msg = Message::Iteration {
                    iter,
                    chunk,
                    top: grid.row(row_start - 1).to_vec(),
                    bottom: grid.row(row_end + 1).to_vec(),
                };
                write_message(stream, &msg)
                    .await
                    .with_context(|| format!("Failed to send iteration {} to worker {}", iter, i))?;
            }

            for (i, (stream, &(row_start, row_end))) in
                streams.iter_mut().zip(&ranges).enumerate()
            {
                let msg = read_message(stream).await.with_context(|| {
                    format!("Failed to read result of iteration {} from worker {}", iter, i)
                })?;
                let (got, chunk) = match msg {
                    Message::Result { iter: got, chunk } => (got, chunk),
                    other => {
                        return Err(HeatError::Protocol(format!(
                            "expected Result from worker {}, got {}",
                            i,
                            other.kind()
                        ))
                        .into())
                    }
                };
                if got != iter {
                    return Err(HeatError::Protocol(format!(
                        "worker {} answered iteration {} while {} was in flight",
                        i, got, iter
                    ))
                    .into());
                }
                if chunk.cols() != run.ny {
                    return Err(HeatError::ShapeMismatch {
                        expected: run.ny,
                        actual: chunk.cols(),
                    }
                    .into());
                }
                if chunk.rows() != row_end - row_start + 1 || !chunk.is_well_formed() {
                    return Err(HeatError::Protocol(format!(
                        "worker {} returned a {}x{} chunk for rows {}..={}",
                        i,
                        chunk.rows(),
                        chunk.cols(),
                        row_start,
                        row_end
                    ))
                    .into());
                }
                staging.write_rows(row_start, chunk.cells())?;
            }

            std::mem::swap(&mut grid, &mut staging);
        }
        let runtime = timer.elapsed();

        // Stop is best effort: the run already finished, and a worker that
        // died after its last Result must not discard the grid.
        for (i, stream) in streams.iter_mut().enumerate() {
            if let Err(e) = write_message(stream, &Message::Stop).await {
                eprintln!("  ⚠️  Worker {} did not take the stop message: {:#}", i, e);
            }
        }

        Ok((runtime, grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RetryPolicy, RunConfig, WorkerConfig};
    use crate::distributed::worker::WorkerAgent;
    use crate::grid::HotRegion;
    use crate::solver::sequential;

    fn coordinator_config(run: RunConfig, workers: usize) -> CoordinatorConfig {
        CoordinatorConfig {
            run,
            workers,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    fn spawn_workers(port: u16, n: usize) -> Vec<tokio::task::JoinHandle<crate::Result<()>>> {
        (0..n)
            .map(|_| {
                let agent = WorkerAgent::new(WorkerConfig {
                    host: "127.0.0.1".to_string(),
                    port,
                    retry: RetryPolicy {
                        attempts: 10,
                        delay: Duration::from_millis(20),
                    },
                });
                tokio::spawn(async move { agent.run().await })
            })
            .collect()
    }

    async fn distributed_run(run: RunConfig, workers: usize) -> Grid {
        let coordinator = Coordinator::bind(coordinator_config(run, workers))
            .await
            .unwrap();
        let port = coordinator.local_addr().unwrap().port();
        let handles = spawn_workers(port, workers);
        let (_, grid) = coordinator.run().await.unwrap();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        grid
    }

    fn hot_run_config() -> RunConfig {
        RunConfig {
            nx: 12,
            ny: 10,
            iterations: 6,
            hot: Some(HotRegion {
                row0: 4,
                row1: 6,
                col0: 3,
                col1: 5,
                value: 80.0,
            }),
        }
    }

    #[tokio::test]
    async fn matches_sequential_solver_cell_for_cell() {
        for workers in 1..=3 {
            let run = hot_run_config();
            let (_, expected) = sequential::run(&run);
            let actual = distributed_run(run, workers).await;
            assert_eq!(actual, expected, "diverged with {} workers", workers);
        }
    }

    #[tokio::test]
    async fn cold_grid_stays_identically_zero() {
        let run = RunConfig {
            nx: 6,
            ny: 6,
            iterations: 5,
            hot: None,
        };
        let grid = distributed_run(run, 2).await;
        assert!(grid.cells().iter().all(|&v| v == 0.0));
    }

    #[tokio::test]
    async fn rejects_more_workers_than_interior_rows() {
        // nx = 5 leaves three interior rows; a fourth worker would idle.
        let run = RunConfig {
            nx: 5,
            ny: 5,
            iterations: 1,
            hot: None,
        };
        let err = Coordinator::bind(coordinator_config(run, 4))
            .await
            .unwrap_err();
        match err.downcast_ref::<HeatError>() {
            Some(HeatError::InsufficientWork { rows, workers }) => {
                assert_eq!(*rows, 3);
                assert_eq!(*workers, 4);
            }
            other => panic!("expected InsufficientWork, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejects_degenerate_grid_before_binding() {
        let run = RunConfig {
            nx: 2,
            ny: 8,
            iterations: 1,
            hot: None,
        };
        let err = Coordinator::bind(coordinator_config(run, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HeatError>(),
            Some(HeatError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn rejects_zero_workers() {
        let run = RunConfig {
            nx: 8,
            ny: 8,
            iterations: 1,
            hot: None,
        };
        let err = Coordinator::bind(coordinator_config(run, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HeatError>(),
            Some(HeatError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn aborts_when_a_worker_answers_the_wrong_iteration() {
        let run = RunConfig {
            nx: 6,
            ny: 4,
            iterations: 3,
            hot: None,
        };
        let coordinator = Coordinator::bind(coordinator_config(run, 1)).await.unwrap();
        let port = coordinator.local_addr().unwrap().port();

        // A worker that echoes a stale iteration index.
        let rogue = tokio::spawn(async move {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
            let _config = read_message(&mut stream).await.unwrap();
            match read_message(&mut stream).await.unwrap() {
                Message::Iteration { chunk, .. } => {
                    write_message(&mut stream, &Message::Result { iter: 7, chunk })
                        .await
                        .unwrap();
                }
                other => panic!("expected Iteration, got {}", other.kind()),
            }
            // Hold the socket open until the coordinator hangs up.
            let _ = read_message(&mut stream).await;
        });

        let err = coordinator.run().await.unwrap_err();
        assert!(
            matches!(err.downcast_ref::<HeatError>(), Some(HeatError::Protocol(_))),
            "expected Protocol error, got {:?}",
            err
        );
        rogue.await.unwrap();
    }

    #[tokio::test]
    async fn worker_death_mid_run_surfaces_as_closed_connection() {
        let run = RunConfig {
            nx: 6,
            ny: 4,
            iterations: 2,
            hot: None,
        };
        let coordinator = Coordinator::bind(coordinator_config(run, 1)).await.unwrap();
        let port = coordinator.local_addr().unwrap().port();

        // Reads its assignment and the first block of work, then dies.
        let quitter = tokio::spawn(async move {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
            let _config = read_message(&mut stream).await.unwrap();
            let _work = read_message(&mut stream).await.unwrap();
        });

        let err = coordinator.run().await.unwrap_err();
        quitter.await.unwrap();
        assert!(
            matches!(
                err.downcast_ref::<HeatError>(),
                Some(HeatError::ConnectionClosed(_))
            ),
            "expected ConnectionClosed, got {:?}",
            err
        );
    }
}
