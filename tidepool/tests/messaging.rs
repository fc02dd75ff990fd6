//! Integration tests for sends, requests and dead letters.
//!
//! # What's Tested
//!
//! - FIFO delivery of fire-and-forget sends
//! - One-message-at-a-time processing under concurrent senders
//! - Correlated request/response, including exactly-once replies
//! - Timeouts and the orphaned-reply dead letter
//! - Sender identity as seen from the receiving handler
//! - Dead letters for unknown pids and for backlogs discarded at stop

use tidepool::prelude::*;
use tokio::sync::mpsc;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// ============================================================================
// Test actors
// ============================================================================

struct Record(u32);
struct Snapshot;

/// Appends every `Record` payload; replies with the full log on `Snapshot`.
struct Recorder {
    log: Vec<u32>,
}

#[async_trait]
impl Actor for Recorder {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if let Some(record) = msg.downcast_ref::<Record>() {
            self.log.push(record.0);
        } else if msg.downcast_ref::<Snapshot>().is_some() {
            ctx.respond(self.log.clone());
        }
        Ok(())
    }
}

struct Work;
struct Violations;

/// Flags overlapping handler executions, which must never happen.
struct Overlap {
    busy: Arc<AtomicBool>,
    violations: Arc<AtomicU64>,
}

#[async_trait]
impl Actor for Overlap {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Work>().is_some() {
            if self.busy.swap(true, Ordering::SeqCst) {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
            tokio::task::yield_now().await;
            self.busy.store(false, Ordering::SeqCst);
        } else if msg.downcast_ref::<Violations>().is_some() {
            ctx.respond(self.violations.load(Ordering::SeqCst));
        }
        Ok(())
    }
}

struct Ping;
struct Pong {
    count: u64,
}

/// Counts pings and replies with the running total.
struct Counter {
    count: u64,
}

#[async_trait]
impl Actor for Counter {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Ping>().is_some() {
            self.count += 1;
            ctx.respond(Pong { count: self.count });
        }
        Ok(())
    }
}

async fn next_letter(rx: &mut mpsc::UnboundedReceiver<DeadLetter>) -> DeadLetter {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a dead letter")
        .expect("dead letter channel closed")
}

// ============================================================================
// Delivery
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sends_from_one_sender_arrive_in_order() {
    let system = ActorSystem::new(SystemConfig::default());
    let pid = system.spawn(Props::from_producer(|| Recorder { log: Vec::new() }));

    for i in 0..1000u32 {
        system.send(pid, Record(i));
    }

    // The snapshot request is enqueued behind every send, so the reply
    // covers the whole sequence.
    let log: Vec<u32> = system
        .request(pid, Snapshot, Duration::from_secs(5))
        .await
        .expect("snapshot request should succeed");

    assert_eq!(log.len(), 1000);
    assert!(log.windows(2).all(|w| w[0] < w[1]), "log out of order");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handlers_never_overlap_under_concurrent_senders() {
    let system = ActorSystem::new(SystemConfig::default());
    let busy = Arc::new(AtomicBool::new(false));
    let violations = Arc::new(AtomicU64::new(0));

    let pid = {
        let busy = busy.clone();
        let violations = violations.clone();
        system.spawn(Props::from_producer(move || Overlap {
            busy: busy.clone(),
            violations: violations.clone(),
        }))
    };

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let system = system.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..100 {
                system.send(pid, Work);
            }
        }));
    }
    for task in tasks {
        task.await.expect("sender task panicked");
    }

    let observed: u64 = system
        .request(pid, Violations, Duration::from_secs(5))
        .await
        .expect("violations request should succeed");
    assert_eq!(observed, 0, "handler executed concurrently");
}

// ============================================================================
// Request / response
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_gets_matching_reply() {
    let system = ActorSystem::new(SystemConfig::default());
    let pid = system.spawn(Props::from_producer(|| Counter { count: 0 }));

    let first: Pong = system
        .request(pid, Ping, Duration::from_secs(1))
        .await
        .expect("first request should succeed");
    let second: Pong = system
        .request(pid, Ping, Duration::from_secs(1))
        .await
        .expect("second request should succeed");

    assert_eq!(first.count, 1);
    assert_eq!(second.count, 2);
}

struct DoubleRespond;

#[async_trait]
impl Actor for DoubleRespond {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Ping>().is_some() {
            ctx.respond(Pong { count: 1 });
            // The reply token was consumed; this is an inert no-op.
            ctx.respond(Pong { count: 2 });
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_second_respond_is_inert() {
    let system = ActorSystem::new(SystemConfig::default());
    let pid = system.spawn(Props::from_producer(|| DoubleRespond));

    let pong: Pong = system
        .request(pid, Ping, Duration::from_secs(1))
        .await
        .expect("request should succeed");
    assert_eq!(pong.count, 1, "first respond should win");

    // The runtime stays healthy after the misuse.
    let pong: Pong = system
        .request(pid, Ping, Duration::from_secs(1))
        .await
        .expect("follow-up request should succeed");
    assert_eq!(pong.count, 1);
}

struct AlwaysRespond;

#[async_trait]
impl Actor for AlwaysRespond {
    async fn handle(&mut self, ctx: &mut Context, _msg: DynMessage) -> Result<()> {
        // Responding to a plain send has no token to consume.
        ctx.respond(Pong { count: 0 });
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_respond_to_plain_send_is_a_noop() {
    let system = ActorSystem::new(SystemConfig::default());
    let mut letters = system.dead_letters();
    let pid = system.spawn(Props::from_producer(|| AlwaysRespond));

    system.send(pid, Ping);

    // Requests still work afterwards.
    let pong: Pong = system
        .request(pid, Ping, Duration::from_secs(1))
        .await
        .expect("request should succeed");
    assert_eq!(pong.count, 0);

    // No orphaned-reply dead letter was produced for the tokenless respond.
    assert!(letters.try_recv().is_err());
}

struct SlowResponder {
    delay: Duration,
}

#[async_trait]
impl Actor for SlowResponder {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Ping>().is_some() {
            tokio::time::sleep(self.delay).await;
            ctx.respond(Pong { count: 1 });
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timeout_then_late_reply_is_orphaned() {
    let system = ActorSystem::new(SystemConfig::default());
    let mut letters = system.dead_letters();
    let pid = system.spawn(Props::from_producer(|| SlowResponder {
        delay: Duration::from_millis(200),
    }));

    let outcome = system
        .request::<Pong, _>(pid, Ping, Duration::from_millis(50))
        .await;
    assert!(matches!(outcome, Err(ActorError::Timeout)));

    // The reply fires ~150ms after the timeout and finds no pending entry.
    let letter = next_letter(&mut letters).await;
    assert_eq!(letter.reason, DeadLetterReason::OrphanedReply);
    assert_eq!(letter.sender, Some(pid));
}

// ============================================================================
// Sender identity
// ============================================================================

struct Relay {
    to: Pid,
}
struct Probe;
struct SeenSender;

/// Forwards a `Probe` to a peer when asked.
struct Forwarder;

#[async_trait]
impl Actor for Forwarder {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if let Some(relay) = msg.downcast_ref::<Relay>() {
            ctx.send(relay.to, Probe);
            ctx.respond(());
        }
        Ok(())
    }
}

/// Remembers the sender of the last `Probe` it saw.
struct SenderWatcher {
    seen: Option<Pid>,
}

#[async_trait]
impl Actor for SenderWatcher {
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
        if msg.downcast_ref::<Probe>().is_some() {
            self.seen = ctx.sender();
        } else if msg.downcast_ref::<SeenSender>().is_some() {
            ctx.respond(self.seen);
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_receiver_observes_sender_pid() {
    let system = ActorSystem::new(SystemConfig::default());
    let watcher = system.spawn(Props::from_producer(|| SenderWatcher { seen: None }));
    let forwarder = system.spawn(Props::from_producer(|| Forwarder));

    // External sends carry no sender.
    system.send(watcher, Probe);
    let seen: Option<Pid> = system
        .request(watcher, SeenSender, Duration::from_secs(1))
        .await
        .expect("seen-sender request should succeed");
    assert_eq!(seen, None);

    // Actor-to-actor sends carry the sending pid.
    system
        .request::<(), _>(forwarder, Relay { to: watcher }, Duration::from_secs(1))
        .await
        .expect("relay request should succeed");

    let mut seen = None;
    for _ in 0..50 {
        seen = system
            .request(watcher, SeenSender, Duration::from_secs(1))
            .await
            .expect("seen-sender request should succeed");
        if seen.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(seen, Some(forwarder));
}

// ============================================================================
// Stop and dead letters
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_send_to_stopped_pid_dead_letters() {
    let system = ActorSystem::new(SystemConfig::default());
    let mut letters = system.dead_letters();
    let pid = system.spawn(Props::from_producer(|| Counter { count: 0 }));

    system.stop(pid);
    // Stop is idempotent.
    system.stop(pid);

    system.send(pid, Ping);
    let letter = next_letter(&mut letters).await;
    assert_eq!(letter.reason, DeadLetterReason::UnknownPid);
    assert_eq!(letter.target, Some(pid));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_to_stopped_pid_times_out() {
    let system = ActorSystem::new(SystemConfig::default());
    let pid = system.spawn(Props::from_producer(|| Counter { count: 0 }));
    system.stop(pid);

    let outcome = system
        .request::<Pong, _>(pid, Ping, Duration::from_millis(50))
        .await;
    assert!(matches!(outcome, Err(ActorError::Timeout)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_discards_queued_backlog() {
    let system = ActorSystem::new(SystemConfig::default());
    let mut letters = system.dead_letters();
    let pid = system.spawn(Props::from_producer(|| SlowResponder {
        delay: Duration::from_millis(300),
    }));

    // The first message parks the actor in its handler; the rest queue up.
    system.send(pid, Ping);
    tokio::time::sleep(Duration::from_millis(50)).await;
    for _ in 0..3 {
        system.send(pid, Probe);
    }

    system.stop(pid);

    for _ in 0..3 {
        let letter = next_letter(&mut letters).await;
        assert_eq!(letter.reason, DeadLetterReason::Discarded);
        assert_eq!(letter.target, Some(pid));
    }
}
