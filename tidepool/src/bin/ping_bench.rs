//! Ping-Pong Benchmark: request/response throughput over the actor runtime.
//!
//! A monitor actor spawns a set of pingers. Each pinger spawns one worker
//! child and drives a fixed number of correlated ping requests through it,
//! awaiting each pong before issuing the next. Workers can be configured to
//! fail with a given probability, which exercises supervised restart under
//! load: a pinger's request times out, the worker is rebuilt from its
//! `Props`, and the pinger retries.
//!
//! ```bash
//! # 8 pingers x 10000 pings, no failure injection
//! cargo run --release --bin ping_bench
//!
//! # 16 pingers x 50000 pings, 0.01% worker failure rate
//! cargo run --release --bin ping_bench -- 16 50000 0.0001
//! ```

use rand::Rng;
use std::env;
use std::time::{Duration, Instant};
use tidepool::prelude::*;
use tokio::sync::oneshot;

// ============================================================================
// Message Types
// ============================================================================

/// Kick off a benchmark run. Carries the channel the final report goes to.
struct Run {
    pingers: usize,
    pings: u64,
    fail_probability: f64,
    report: oneshot::Sender<Report>,
}

/// Monitor -> pinger: start your ping loop.
struct Start {
    pings: u64,
    fail_probability: f64,
}

/// Pinger -> worker request.
struct Ping;

/// Worker -> pinger reply. `count` is the worker instance's message count.
struct Pong {
    count: u64,
}

/// Pinger -> monitor: finished.
struct PingerDone {
    pings: u64,
    retries: u64,
    elapsed: Duration,
}

/// Aggregated results for one run.
struct Report {
    pingers: usize,
    total_pings: u64,
    total_retries: u64,
    elapsed: Duration,
}

// ============================================================================
// Worker
// ============================================================================

/// Replies `Pong` to every `Ping`, with optional injected failures.
struct Worker {
    fail_probability: f64,
    count: u64,
}

#[async_trait]
impl Actor for Worker {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Ping>().is_some() {
            if self.fail_probability > 0.0
                && rand::thread_rng().gen_bool(self.fail_probability)
            {
                return Err(ActorError::HandlerFailed(
                    "injected worker failure".to_string(),
                ));
            }
            self.count += 1;
            ctx.respond(Pong { count: self.count });
        }
        Ok(())
    }
}

// ============================================================================
// Pinger
// ============================================================================

/// Drives the request loop against one supervised worker.
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

        let fail_probability = start.fail_probability;
        let worker = ctx.spawn(
            Props::from_producer(move || Worker {
                fail_probability,
                count: 0,
            })
            .with_supervisor_strategy(SupervisorStrategy::restart(u32::MAX, None)),
        );

        let began = Instant::now();
        let mut retries = 0u64;
        let mut last_count = 0u64;
        for _ in 0..start.pings {
            // A failed worker drops the request on the floor; the timeout
            // fires, the supervisor rebuilds the worker, and we retry.
            loop {
                match ctx
                    .request_with_timeout::<Pong, _>(worker, Ping, Duration::from_secs(1))
                    .await
                {
                    Ok(pong) => {
                        last_count = pong.count;
                        break;
                    }
                    Err(_) => retries += 1,
                }
            }
        }

        tracing::debug!(worker = %worker, last_count, "ping loop complete");
        ctx.stop(worker);
        ctx.send(
            monitor,
            PingerDone {
                pings: start.pings,
                retries,
                elapsed: began.elapsed(),
            },
        );
        Ok(())
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Fans out pingers, collects completions and reports the totals.
struct Monitor {
    running: usize,
    pingers: Vec<Pid>,
    total_pings: u64,
    total_retries: u64,
    began: Option<Instant>,
    report: Option<oneshot::Sender<Report>>,
}

impl Monitor {
    fn new() -> Self {
        Self {
            running: 0,
            pingers: Vec::new(),
            total_pings: 0,
            total_retries: 0,
            began: None,
            report: None,
        }
    }
}

#[async_trait]
impl Actor for Monitor {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        let msg = match msg.downcast::<Run>() {
            Ok(run) => {
                self.running = run.pingers;
                self.began = Some(Instant::now());
                self.report = Some(run.report);
                for _ in 0..run.pingers {
                    let pid = ctx.spawn(Props::from_producer(|| Pinger));
                    self.pingers.push(pid);
                    ctx.send(
                        pid,
                        Start {
                            pings: run.pings,
                            fail_probability: run.fail_probability,
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
            tracing::info!(
                remaining = self.running,
                pings = done.pings,
                elapsed_ms = done.elapsed.as_millis() as u64,
                "pinger finished"
            );
            if self.running == 0 {
                let elapsed = self.began.map(|t| t.elapsed()).unwrap_or_default();
                let pinger_count = self.pingers.len();
                for pid in self.pingers.drain(..) {
                    ctx.stop(pid);
                }
                if let Some(report) = self.report.take() {
                    let _ = report.send(Report {
                        pingers: pinger_count,
                        total_pings: self.total_pings,
                        total_retries: self.total_retries,
                        elapsed,
                    });
                }
                ctx.stop(ctx.pid());
            }
        }
        Ok(())
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    tracing_subscriber::fmt::init();

    // Parse command line args: [pingers] [pings-per-pinger] [fail-probability]
    let args: Vec<String> = env::args().collect();
    let pingers: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    let pings: u64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);
    let fail_probability: f64 = args
        .get(3)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("failed to create tokio runtime");

    println!("=== Ping-Pong Benchmark ===\n");
    println!(
        "{} pingers x {} pings, worker failure probability {}\n",
        pingers, pings, fail_probability
    );

    let report = runtime.block_on(async {
        let system = ActorSystem::new(SystemConfig::default());
        let monitor = system.spawn(Props::from_producer(Monitor::new));

        let (tx, rx) = oneshot::channel();
        system.send(
            monitor,
            Run {
                pingers,
                pings,
                fail_probability,
                report: tx,
            },
        );

        rx.await.expect("monitor dropped the report channel")
    });

    let secs = report.elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        report.total_pings as f64 / secs
    } else {
        0.0
    };

    println!("=== Results ===");
    println!("pingers:      {}", report.pingers);
    println!("round trips:  {}", report.total_pings);
    println!("retries:      {}", report.total_retries);
    println!("elapsed:      {:.3}s", secs);
    println!("throughput:   {:.0} req/s", throughput);
}
