use std::sync::{Arc, Mutex};
use std::time::Duration;

use epochpeek_core::{
    DisplaySink, ManualScheduler, SelectionWatcher, Settings, StatusBar, TokioScheduler,
    WatchState,
};

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<Option<String>>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingSink {
    fn display(&self, result: Option<&str>) {
        self.calls.lock().unwrap().push(result.map(str::to_string));
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn watcher_with(
    settings: Settings,
) -> (
    ManualScheduler,
    Arc<RecordingSink>,
    SelectionWatcher<ManualScheduler>,
) {
    let scheduler = ManualScheduler::new();
    let sink = Arc::new(RecordingSink::default());
    let watcher = SelectionWatcher::new(scheduler.clone(), sink.clone(), settings);
    (scheduler, sink, watcher)
}

fn watcher() -> (
    ManualScheduler,
    Arc<RecordingSink>,
    SelectionWatcher<ManualScheduler>,
) {
    watcher_with(Settings::default())
}

#[test]
fn selection_is_displayed_after_debounce() {
    let (scheduler, sink, watcher) = watcher();
    assert_eq!(watcher.state(), WatchState::Idle);

    watcher.on_selection_changed("timestamp: 1734796800");
    assert_eq!(watcher.state(), WatchState::Pending);

    scheduler.advance(ms(299));
    assert!(sink.calls().is_empty());
    assert_eq!(watcher.state(), WatchState::Pending);

    scheduler.advance(ms(1));
    assert_eq!(sink.calls(), vec![Some("2024-12-21T16:00:00Z".to_string())]);
    assert_eq!(
        watcher.state(),
        WatchState::Displayed("2024-12-21T16:00:00Z".to_string())
    );
}

#[test]
fn rapid_selection_changes_parse_only_the_last_one() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("17");
    scheduler.advance(ms(100));
    watcher.on_selection_changed("1734");
    scheduler.advance(ms(100));
    watcher.on_selection_changed(r#""s_at_ms": 1755599313784"#);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance(ms(299));
    assert!(sink.calls().is_empty());
    scheduler.advance(ms(1));

    assert_eq!(sink.calls(), vec![Some("2025-08-19T10:28:33Z".to_string())]);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn pointer_up_settles_quickly_and_independently() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("1734796800");
    watcher.on_pointer_up("1734796800");
    assert_eq!(scheduler.pending(), 2);

    scheduler.advance(ms(10));
    assert_eq!(sink.calls(), vec![Some("2024-12-21T16:00:00Z".to_string())]);
    // the selection debounce is still running
    assert_eq!(watcher.state(), WatchState::Pending);

    scheduler.advance(ms(290));
    assert_eq!(sink.calls().len(), 2);
    assert_eq!(
        watcher.state(),
        WatchState::Displayed("2024-12-21T16:00:00Z".to_string())
    );
}

#[test]
fn settled_timer_reads_the_latest_selection() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_pointer_up("nothing here");
    watcher.on_selection_changed("at 1734796800");
    scheduler.advance(ms(10));

    assert_eq!(sink.calls(), vec![Some("2024-12-21T16:00:00Z".to_string())]);
}

#[test]
fn non_timestamp_selection_clears_the_display() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("1734796800");
    scheduler.advance(ms(300));
    watcher.on_selection_changed("hello world");
    scheduler.advance(ms(300));

    assert_eq!(
        sink.calls(),
        vec![Some("2024-12-21T16:00:00Z".to_string()), None]
    );
    assert_eq!(watcher.state(), WatchState::Idle);
}

#[test]
fn blank_selection_leaves_the_display_alone() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("1734796800");
    scheduler.advance(ms(300));
    watcher.on_selection_changed("   \n\t");
    assert_eq!(watcher.state(), WatchState::Pending);
    scheduler.advance(ms(300));

    assert_eq!(sink.calls().len(), 1);
    assert_eq!(
        watcher.state(),
        WatchState::Displayed("2024-12-21T16:00:00Z".to_string())
    );
}

#[test]
fn configured_delays_are_used() {
    let settings = Settings {
        selection_debounce_ms: 50,
        pointer_settle_ms: 5,
        ..Settings::default()
    };
    let (scheduler, sink, watcher) = watcher_with(settings);

    watcher.on_selection_changed("4102444800");
    scheduler.advance(ms(50));
    assert_eq!(sink.calls(), vec![Some("2100-01-01T00:00:00Z".to_string())]);

    watcher.on_pointer_up("5000000000");
    scheduler.advance(ms(5));
    assert_eq!(sink.calls().last(), Some(&None));
}

#[test]
fn shutdown_cancels_pending_timers() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("1734796800");
    watcher.on_pointer_up("1734796800");
    watcher.shutdown();

    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(ms(1_000));
    assert!(sink.calls().is_empty());
    assert_eq!(watcher.state(), WatchState::Idle);
}

#[test]
fn dropping_the_watcher_cancels_timers() {
    let (scheduler, sink, watcher) = watcher();

    watcher.on_selection_changed("1734796800");
    drop(watcher);

    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(ms(1_000));
    assert!(sink.calls().is_empty());
}

#[test]
fn debug_setting_does_not_change_results() {
    let settings = Settings {
        debug: true,
        ..Settings::default()
    };
    let (scheduler, sink, watcher) = watcher_with(settings);

    watcher.on_selection_changed("timestamp: 1734796800");
    scheduler.advance(ms(300));

    assert_eq!(sink.calls(), vec![Some("2024-12-21T16:00:00Z".to_string())]);
}

#[test]
fn status_bar_follows_the_watcher() {
    let scheduler = ManualScheduler::new();
    let status = Arc::new(StatusBar::new());
    let watcher = SelectionWatcher::new(scheduler.clone(), status.clone(), Settings::default());

    watcher.on_selection_changed("1755599313784");
    scheduler.advance(ms(300));
    assert_eq!(status.text(), "2025-08-19T10:28:33Z");

    watcher.on_selection_changed("123");
    scheduler.advance(ms(300));
    assert_eq!(status.text(), "");
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_debounces_with_real_timers() {
    let sink = Arc::new(RecordingSink::default());
    let watcher =
        SelectionWatcher::new(TokioScheduler::current(), sink.clone(), Settings::default());

    watcher.on_selection_changed("5000000000");
    tokio::time::sleep(ms(100)).await;
    watcher.on_selection_changed("timestamp: 1734796800");

    tokio::time::sleep(ms(250)).await;
    tokio::task::yield_now().await;
    assert!(sink.calls().is_empty());

    tokio::time::sleep(ms(100)).await;
    tokio::task::yield_now().await;
    assert_eq!(sink.calls(), vec![Some("2024-12-21T16:00:00Z".to_string())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn display_stays_in_step_with_state_across_threads() {
    let settings = Settings {
        selection_debounce_ms: 0,
        pointer_settle_ms: 0,
        ..Settings::default()
    };
    let status = Arc::new(StatusBar::new());
    let watcher = SelectionWatcher::new(TokioScheduler::current(), status.clone(), settings);

    for round in 0..50 {
        for i in 0..20 {
            let text = if (round + i) % 2 == 0 {
                "timestamp: 1734796800"
            } else {
                "no timestamp here"
            };
            watcher.on_selection_changed(text);
            watcher.on_pointer_up(text);
        }

        let mut settled = false;
        for _ in 0..200 {
            if watcher.state() != WatchState::Pending {
                settled = true;
                break;
            }
            tokio::time::sleep(ms(1)).await;
        }
        assert!(settled, "round {round} never settled");

        let expected = match watcher.state() {
            WatchState::Displayed(text) => text,
            _ => String::new(),
        };
        assert_eq!(status.text(), expected, "round {round}");
    }
}
