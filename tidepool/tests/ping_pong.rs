//! End-to-end ping/pong workload: monitor, pingers and supervised workers.
//!
//! # What's Tested
//!
//! - A monitor fans out pingers, each driving request/response round trips
//!   through its own worker child
//! - Totals reported by the monitor match the configured workload
//! - With deterministic worker failures the workload still completes,
//!   through timeouts, supervised restarts and retries

use tidepool::prelude::*;
use tokio::sync::oneshot;

// ============================================================================
// Workload actors
// ============================================================================

struct Run {
    pingers: usize,
    pings: u64,
    fail_every: u64,
    report: oneshot::Sender<Report>,
}

struct Start {
    pings: u64,
    fail_every: u64,
}

struct Ping;
struct Pong {
    count: u64,
}

struct PingerDone {
    pings: u64,
    retries: u64,
}

struct Report {
    total_pings: u64,
    total_retries: u64,
}

/// Replies `Pong` to every `Ping`; fails deterministically every
/// `fail_every`-th message when nonzero.
struct Worker {
    fail_every: u64,
    seen: u64,
    count: u64,
}

#[async_trait]
impl Actor for Worker {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Ping>().is_some() {
            self.seen += 1;
            if self.fail_every > 0 && self.seen % self.fail_every == 0 {
                return Err(ActorError::HandlerFailed("scheduled failure".to_string()));
            }
            self.count += 1;
            ctx.respond(Pong { count: self.count });
        }
        Ok(())
    }
}

/// Drives the request loop against one supervised worker child.
struct Pinger;

#[async_trait]
impl Actor for Pinger {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        let Ok(start) = msg.downcast::<Start>() else {
            return Ok(());
        };
        let Some(monitor) = ctx.sender() else {
            return Ok(());
        };

        let fail_every = start.fail_every;
        let worker = ctx.spawn(
            Props::from_producer(move || Worker {
                fail_every,
                seen: 0,
                count: 0,
            })
            .with_supervisor_strategy(SupervisorStrategy::restart(u32::MAX, None)),
        );

        let mut retries = 0u64;
        for _ in 0..start.pings {
            loop {
                match ctx
                    .request_with_timeout::<Pong, _>(worker, Ping, Duration::from_millis(200))
                    .await
                {
                    Ok(_) => break,
                    Err(_) => retries += 1,
                }
            }
        }

        ctx.stop(worker);
        ctx.send(
            monitor,
            PingerDone {
                pings: start.pings,
                retries,
            },
        );
        Ok(())
    }
}

/// Collects completions and reports totals once every pinger is done.
struct Monitor {
    running: usize,
    total_pings: u64,
    total_retries: u64,
    report: Option<oneshot::Sender<Report>>,
}

#[async_trait]
impl Actor for Monitor {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        let msg = match msg.downcast::<Run>() {
            Ok(run) => {
                self.running = run.pingers;
                self.report = Some(run.report);
                for _ in 0..run.pingers {
                    let pid = ctx.spawn(Props::from_producer(|| Pinger));
                    ctx.send(
                        pid,
                        Start {
                            pings: run.pings,
                            fail_every: run.fail_every,
                        },
                    );
                }
                return Ok(());
            }
            Err(msg) => msg,
        };

        if let Ok(done) = msg.downcast::<PingerDone>() {
            self.total_pings += done.pings;
            self.total_retries += done.retries;
            self.running -= 1;
            if self.running == 0 {
                if let Some(report) = self.report.take() {
                    let _ = report.send(Report {
                        total_pings: self.total_pings,
                        total_retries: self.total_retries,
                    });
                }
            }
        }
        Ok(())
    }
}

async fn run_workload(pingers: usize, pings: u64, fail_every: u64) -> Report {
    let system = ActorSystem::new(SystemConfig::default());
    let monitor = system.spawn(Props::from_producer(|| Monitor {
        running: 0,
        total_pings: 0,
        total_retries: 0,
        report: None,
    }));

    let (tx, rx) = oneshot::channel();
    system.send(
        monitor,
        Run {
            pingers,
            pings,
            fail_every,
            report: tx,
        },
    );

    tokio::time::timeout(Duration::from_secs(30), rx)
        .await
        .expect("workload timed out")
        .expect("monitor dropped the report channel")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_workload_completes_without_failures() {
    let report = run_workload(2, 1000, 0).await;
    assert_eq!(report.total_pings, 2000);
    assert_eq!(report.total_retries, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_pinger_counts_every_round_trip() {
    let report = run_workload(1, 500, 0).await;
    assert_eq!(report.total_pings, 500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_workload_survives_deterministic_worker_failures() {
    // Every 250th ping fails, times out and is retried against the
    // restarted worker.
    let report = run_workload(2, 1000, 250).await;
    assert_eq!(report.total_pings, 2000);
    assert!(report.total_retries > 0, "expected at least one retry");
}
