//! Integration tests for signals, janitors and the manual scheduler working
//! together the way an icon uses them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_topbar_core::{IconState, Janitor, ManualScheduler, Scheduler, Signal};
use parking_lot::Mutex;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn janitor_releases_subscriptions_on_several_signals() {
    init_logging();
    let selected = Arc::new(Signal::<()>::new());
    let toggled = Arc::new(Signal::<bool>::new());
    let hits = Arc::new(AtomicUsize::new(0));

    let mut janitor = Janitor::new();
    let hits_clone = hits.clone();
    janitor.add_subscription(selected.subscribe(move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    }));
    let hits_clone = hits.clone();
    janitor.add_subscription(toggled.subscribe(move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    }));

    selected.emit(());
    toggled.emit(true);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    drop(janitor);
    selected.emit(());
    toggled.emit(false);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(selected.connection_count(), 0);
    assert_eq!(toggled.connection_count(), 0);
}

#[test]
fn once_subscription_acts_as_a_clear_signal() {
    init_logging();
    let clear = Arc::new(Signal::<()>::new());
    let count = Arc::new(AtomicUsize::new(3));

    let count_clone = count.clone();
    let subscription = clear.subscribe_once(move |_| count_clone.store(0, Ordering::SeqCst));

    clear.emit(());
    assert_eq!(count.load(Ordering::SeqCst), 0);

    count.store(5, Ordering::SeqCst);
    clear.emit(());
    assert_eq!(count.load(Ordering::SeqCst), 5);
    assert_eq!(clear.connection_count(), 0);
    drop(subscription);
}

#[test]
fn scheduled_release_through_a_slot() {
    init_logging();
    let scheduler = Arc::new(ManualScheduler::new());
    let state_changed = Arc::new(Signal::<IconState>::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    // A slot that schedules follow-up work, as a debounce does.
    let scheduler_clone = scheduler.clone();
    let log_clone = log.clone();
    state_changed.connect(move |&state| {
        log_clone.lock().push(format!("changed to {state}"));
        let log_inner = log_clone.clone();
        scheduler_clone.schedule(
            Duration::from_millis(250),
            Box::new(move || log_inner.lock().push("released".to_string())),
        );
    });

    state_changed.emit(IconState::Selected);
    assert_eq!(scheduler.pending_count(), 1);
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(log.lock().len(), 1);

    scheduler.advance(Duration::from_millis(150));
    assert_eq!(
        *log.lock(),
        vec!["changed to Selected".to_string(), "released".to_string()]
    );
}

#[test]
fn cancelled_schedule_inside_janitor() {
    init_logging();
    let scheduler = Arc::new(ManualScheduler::new());
    let ran = Arc::new(AtomicUsize::new(0));

    let ran_clone = ran.clone();
    let id = scheduler.schedule(
        Duration::from_secs(1),
        Box::new(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let mut janitor = Janitor::new();
    let scheduler_clone = scheduler.clone();
    janitor.add(move || {
        let _ = scheduler_clone.cancel(id);
    });
    janitor.clean();

    scheduler.advance(Duration::from_secs(2));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}
