//! End-to-end check cycle properties, driven over in-memory doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use outage_notify_bot::fetch::{RetryPolicy, ScheduleSource};
use outage_notify_bot::notify::{Broadcaster, Messenger};
use outage_notify_bot::scheduler::{CycleOutcome, ShutdownMonitor};
use outage_notify_bot::state::StateStore;

const DEFAULT_CHAT: i64 = 1000;

const SCHEDULE_PAGE: &str = "<html><body>\
    <table class=\"table-shutdowns\"><tbody>\
    <tr><td>Ремонтні роботи</td><td>ГПВ</td><td>1.1</td><td>-</td>\
    <td>2026-08-03 08:00</td><td>2026-08-03 20:00</td></tr>\
    </tbody></table></body></html>";

const ALL_CLEAR_PAGE: &str = "<html><body><div class=\"alert alert-info\">\
    Відключення не зареєстровані</div></body></html>";

/// Upstream double serving a swappable body.
struct StubSource {
    body: Mutex<String>,
}

impl StubSource {
    fn new(body: &str) -> Self {
        Self {
            body: Mutex::new(body.to_owned()),
        }
    }

    fn set_body(&self, body: &str) {
        *self.body.lock().unwrap() = body.to_owned();
    }
}

#[async_trait]
impl ScheduleSource for StubSource {
    async fn fetch_schedule(&self) -> anyhow::Result<String> {
        Ok(self.body.lock().unwrap().clone())
    }
}

/// Upstream double that always fails.
struct BrokenSource;

#[async_trait]
impl ScheduleSource for BrokenSource {
    async fn fetch_schedule(&self) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }
}

/// Messenger double recording every delivery.
#[derive(Default)]
struct CountingMessenger {
    sends: Mutex<Vec<(i64, String)>>,
}

impl CountingMessenger {
    fn sends(&self) -> Vec<(i64, String)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for CountingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.sends.lock().unwrap().push((chat_id, text.to_owned()));
        Ok(())
    }
}

struct Harness {
    // Keeps the state file alive for the monitor's lifetime.
    _dir: tempfile::TempDir,
    source: Arc<StubSource>,
    messenger: Arc<CountingMessenger>,
    store: Arc<StateStore>,
    monitor: ShutdownMonitor,
}

fn harness(body: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StubSource::new(body));
    let messenger = Arc::new(CountingMessenger::default());
    let store = Arc::new(StateStore::new(dir.path().join("state.json")));

    let broadcaster = Broadcaster::new(
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        DEFAULT_CHAT,
        RetryPolicy::new(2, Duration::from_millis(1)),
    );
    let monitor = ShutdownMonitor::new(
        Arc::clone(&source) as Arc<dyn ScheduleSource>,
        Arc::clone(&store),
        broadcaster,
    );

    Harness {
        _dir: dir,
        source,
        messenger,
        store,
        monitor,
    }
}

#[tokio::test]
async fn identical_cycles_notify_once() {
    let h = harness(SCHEDULE_PAGE);

    let first = h.monitor.run_cycle(false).await.unwrap();
    assert!(matches!(
        first,
        CycleOutcome::Notified {
            events: 1,
            sent: 1,
            failed: 0
        }
    ));

    let second = h.monitor.run_cycle(false).await.unwrap();
    assert_eq!(second, CycleOutcome::Unchanged);

    assert_eq!(h.messenger.sends().len(), 1);
}

#[tokio::test]
async fn forced_cycle_notifies_despite_unchanged_hash() {
    let h = harness(SCHEDULE_PAGE);

    h.monitor.run_cycle(false).await.unwrap();
    let forced = h.monitor.run_cycle(true).await.unwrap();

    assert!(matches!(forced, CycleOutcome::Notified { .. }));
    assert_eq!(h.messenger.sends().len(), 2);
}

#[tokio::test]
async fn changed_schedule_notifies_again() {
    let h = harness(SCHEDULE_PAGE);

    h.monitor.run_cycle(false).await.unwrap();
    h.source.set_body(ALL_CLEAR_PAGE);
    let outcome = h.monitor.run_cycle(false).await.unwrap();

    assert!(matches!(
        outcome,
        CycleOutcome::Notified { events: 0, .. }
    ));

    let sends = h.messenger.sends();
    assert_eq!(sends.len(), 2);
    assert!(sends[1].1.contains("Power is available"));
}

#[tokio::test]
async fn subscribers_receive_alongside_default_chat() {
    let h = harness(SCHEDULE_PAGE);

    h.store.add_subscriber(7).await.unwrap();
    h.store.add_subscriber(8).await.unwrap();
    // The default chat subscribing itself must not double-send.
    h.store.add_subscriber(DEFAULT_CHAT).await.unwrap();

    let outcome = h.monitor.run_cycle(false).await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Notified { sent: 3, .. }));

    let mut chats: Vec<i64> = h.messenger.sends().iter().map(|(chat, _)| *chat).collect();
    chats.sort_unstable();
    assert_eq!(chats, vec![7, 8, DEFAULT_CHAT]);
}

#[tokio::test]
async fn persisted_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let messenger = Arc::new(CountingMessenger::default());

    let build = |messenger: &Arc<CountingMessenger>| {
        let broadcaster = Broadcaster::new(
            Arc::clone(messenger) as Arc<dyn Messenger>,
            DEFAULT_CHAT,
            RetryPolicy::new(1, Duration::from_millis(1)),
        );
        ShutdownMonitor::new(
            Arc::new(StubSource::new(SCHEDULE_PAGE)) as Arc<dyn ScheduleSource>,
            Arc::new(StateStore::new(&state_path)),
            broadcaster,
        )
    };

    build(&messenger).run_cycle(false).await.unwrap();

    // A fresh monitor over the same snapshot sees the stored fingerprint.
    let outcome = build(&messenger).run_cycle(false).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Unchanged);
    assert_eq!(messenger.sends().len(), 1);
}

#[tokio::test]
async fn fetch_failure_propagates_without_notifying() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = Arc::new(CountingMessenger::default());
    let broadcaster = Broadcaster::new(
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        DEFAULT_CHAT,
        RetryPolicy::new(1, Duration::from_millis(1)),
    );
    let monitor = ShutdownMonitor::new(
        Arc::new(BrokenSource) as Arc<dyn ScheduleSource>,
        Arc::new(StateStore::new(dir.path().join("state.json"))),
        broadcaster,
    );

    assert!(monitor.run_cycle(false).await.is_err());
    assert!(messenger.sends().is_empty());
}

#[tokio::test]
async fn failed_cycle_reports_to_default_chat() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = Arc::new(CountingMessenger::default());
    let broadcaster = Broadcaster::new(
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        DEFAULT_CHAT,
        RetryPolicy::new(1, Duration::from_millis(1)),
    );
    let monitor = ShutdownMonitor::new(
        Arc::new(BrokenSource) as Arc<dyn ScheduleSource>,
        Arc::new(StateStore::new(dir.path().join("state.json"))),
        broadcaster,
    );

    monitor.check_and_report(false).await;

    let sends = messenger.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].0, DEFAULT_CHAT);
    assert!(sends[0].1.contains("Outage check failed"));
}
