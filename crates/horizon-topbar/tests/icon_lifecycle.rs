//! Integration tests for icons: state transitions, grouping, notices,
//! theming and destruction driven through the public surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_topbar::prelude::*;
use horizon_topbar::{DEFAULT_DISPLAY_ORDER, IconTreeDebug};
use parking_lot::Mutex;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Record every named event an icon fires, prefixed with its name.
fn record_events(icon: &Icon, log: &Arc<Mutex<Vec<String>>>) {
    let name = icon.name().unwrap();
    for event in IconEvent::ALL {
        let log = log.clone();
        let entry = format!("{name}:{event}");
        icon.bind_event(event, move |_, _| log.lock().push(entry.clone()))
            .unwrap();
    }
}

#[test]
fn select_deselect_from_any_state_ends_deselected() {
    init_logging();
    let context = IconContext::new();
    let plain = context.create_named("plain");
    let parent = context.create_named("parent");
    let child = context.create_named("child");
    child.join_dropdown(&parent).unwrap();

    for icon in [&plain, &parent] {
        let log = Arc::new(Mutex::new(Vec::new()));
        record_events(icon, &log);
        let name = icon.name().unwrap();

        icon.select().unwrap().deselect().unwrap();
        assert_eq!(icon.state().unwrap(), IconState::Deselected);

        let log = log.lock();
        let position = |event: &str| {
            log.iter()
                .position(|entry| *entry == format!("{name}:{event}"))
                .unwrap()
        };
        assert!(position("selected") < position("toggled"));
        assert!(position("toggled") < position("deselected"));
        assert_eq!(
            log.iter().filter(|entry| entry.ends_with(":toggled")).count(),
            2
        );
    }
}

#[test]
fn viewing_transitions_emit_in_order() {
    init_logging();
    let context = IconContext::new();
    let parent = context.create_named("p");
    let child = context.create_named("c");
    child.join_menu(&parent).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    record_events(&parent, &log);

    parent.select().unwrap();
    assert!(parent.is_viewing().unwrap());
    parent.deselect().unwrap();
    assert_eq!(
        *log.lock(),
        vec![
            "p:selected",
            "p:toggled",
            "p:viewingStarted",
            "p:viewingEnded",
            "p:deselected",
            "p:toggled",
        ]
    );
}

#[test]
fn only_one_auto_deselect_icon_is_selected() {
    init_logging();
    let context = IconContext::new();
    let icons: Vec<Icon> = (0..4).map(|i| context.create_named(&format!("icon{i}"))).collect();

    for icon in &icons {
        icon.select().unwrap();
        let selected = icons
            .iter()
            .filter(|other| other.is_selected().unwrap())
            .count();
        assert_eq!(selected, 1);
        assert!(icon.is_selected().unwrap());
    }
}

#[test]
fn previous_icon_is_deselected_before_selected_fires() {
    init_logging();
    let context = IconContext::new();
    let a = context.create_named("a");
    let b = context.create_named("b");
    a.select().unwrap();

    let a_when_b_selected = Arc::new(Mutex::new(None));
    let seen = a_when_b_selected.clone();
    let a_handle = a.clone();
    b.bind_event(IconEvent::Selected, move |_, _| {
        *seen.lock() = Some(a_handle.state().unwrap());
    })
    .unwrap();

    b.select().unwrap();
    assert_eq!(*a_when_b_selected.lock(), Some(IconState::Deselected));
}

#[test]
fn set_dropdown_detaches_then_replaces() {
    init_logging();
    let context = IconContext::new();
    let parent = context.create_icon();
    let children: Vec<Icon> = (0..3).map(|_| context.create_icon()).collect();
    parent.set_dropdown(&children).unwrap();

    parent.set_dropdown(Vec::<Icon>::new()).unwrap();
    for child in &children {
        assert!(!child.is_destroyed());
        assert_eq!(child.parent().unwrap(), None);
    }

    let c = context.create_icon();
    parent.set_dropdown([&c]).unwrap();
    assert_eq!(parent.dropdown_children().unwrap(), vec![c.clone()]);
    assert_eq!(c.dropdown_parent().unwrap(), Some(parent.clone()));
}

#[test]
fn theme_precedence_across_states() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let (element, property) = (ThemeElement::IconButton, ThemeProperty::BackgroundTransparency);

    context
        .modify_base_theme([
            Modification::new(element, property, 0.0),
            Modification::new(element, property, 0.1).in_state(IconState::Selected),
        ])
        .unwrap();
    icon.modify_theme([
        Modification::new(element, property, 0.2),
        Modification::new(element, property, 0.3).in_state(IconState::Selected),
    ])
    .unwrap();

    assert_eq!(icon.resolved(element, property).unwrap(), ThemeValue::Number(0.2));
    icon.select().unwrap();
    assert_eq!(icon.resolved(element, property).unwrap(), ThemeValue::Number(0.3));
    assert_eq!(
        icon.snapshot().unwrap().theme.get(element, property),
        Some(&ThemeValue::Number(0.3))
    );
}

#[test]
fn parsed_modifications_report_configuration_errors() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let batch: ModificationBatch = [
        Modification::parse("IconLabel", "Text", "Shop", None),
        Modification::parse("IconLabel", "Text", "Close", Some("Selected")),
    ]
    .into_iter()
    .collect::<Result<_, _>>()
    .unwrap();
    icon.modify_theme(batch).unwrap();

    assert!(matches!(
        Modification::parse("Sparkle", "Text", "x", None),
        Err(ThemeError::UnknownElement(_))
    ));
    let bad = Modification::new(ThemeElement::IconLabel, ThemeProperty::TextSize, "big");
    assert!(matches!(
        icon.modify_theme(bad),
        Err(IconError::Configuration(_))
    ));
    assert_eq!(icon.theme().unwrap().len(), 2);
}

#[test]
fn notices_count_and_reset() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let sig = Arc::new(Signal::<()>::new());

    for _ in 0..3 {
        icon.notify_until(&sig).unwrap();
    }
    assert_eq!(icon.notice_count().unwrap(), 3);
    sig.emit(());
    assert_eq!(icon.notice_count().unwrap(), 0);
    icon.notify_until(&sig).unwrap();
    assert_eq!(icon.notice_count().unwrap(), 1);
}

#[test]
fn nested_notices_roll_up_to_hidden_ancestors() {
    init_logging();
    let context = IconContext::new();
    let top = context.create_icon();
    let middle = context.create_icon();
    let leaf = context.create_icon();
    middle.join_dropdown(&top).unwrap();
    leaf.join_menu(&middle).unwrap();

    leaf.notify().unwrap().notify().unwrap();
    middle.notify().unwrap();
    assert_eq!(top.displayed_notice_count().unwrap(), 3);

    top.select().unwrap();
    assert_eq!(top.displayed_notice_count().unwrap(), 0);
    assert_eq!(middle.displayed_notice_count().unwrap(), 3);
}

#[test]
fn destroying_parent_applies_destroy_policy() {
    init_logging();
    let context = IconContext::new();
    let parent = context.create_icon();
    let first = context.create_icon();
    let second = context.create_icon();
    let shared = context.create_icon();
    parent.set_dropdown([&first, &second]).unwrap();
    parent.set_menu([&shared]).unwrap();

    parent.destroy().unwrap();
    assert!(first.is_destroyed());
    assert!(second.is_destroyed());
    assert!(!shared.is_destroyed());
    assert_eq!(shared.parent().unwrap(), None);
    assert!(!context.contains(parent.id()));
    assert_eq!(context.icon_count(), 1);
}

#[test]
fn destroy_policy_is_configurable() {
    init_logging();
    let context = IconContext::with_config(
        ContextConfig::default().with_destroy_policy(DestroyPolicy::destroy_all()),
    );
    let parent = context.create_icon();
    let child = context.create_icon();
    let grandchild = context.create_icon();
    child.join_menu(&parent).unwrap();
    grandchild.join_dropdown(&child).unwrap();

    parent.destroy().unwrap();
    assert_eq!(context.icon_count(), 0);
    assert!(grandchild.is_destroyed());

    let context = IconContext::with_config(
        ContextConfig::default().with_destroy_policy(DestroyPolicy::detach_all()),
    );
    let parent = context.create_icon();
    let child = context.create_icon();
    child.join_dropdown(&parent).unwrap();
    parent.destroy().unwrap();
    assert!(!child.is_destroyed());
}

#[test]
fn destroy_releases_everything_once() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let external = Arc::new(Signal::<()>::new());
    let released = Arc::new(AtomicUsize::new(0));

    let released_clone = released.clone();
    icon.add_cleanup(move || {
        released_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    icon.notify_until(&external).unwrap();
    icon.bind_event(IconEvent::Deselected, |_, _| {}).unwrap();
    let signals = icon.signals().unwrap();

    icon.destroy().unwrap();
    context.destroy_all();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(external.connection_count(), 0);
    assert_eq!(signals.deselected.connection_count(), 0);
    assert_eq!(icon.select().err(), Some(IconError::Destroyed(icon.id())));
}

#[test]
fn destroy_all_tolerates_cascades() {
    init_logging();
    let context = IconContext::with_config(
        ContextConfig::default().with_destroy_policy(DestroyPolicy::destroy_all()),
    );
    let root = context.create_icon();
    for _ in 0..3 {
        context.create_icon().join_dropdown(&root).unwrap();
    }
    let removed = Arc::new(AtomicUsize::new(0));
    let removed_clone = removed.clone();
    context.signals().icon_removed.connect(move |_| {
        removed_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(context.destroy_all(), 4);
    assert_eq!(removed.load(Ordering::SeqCst), 4);
}

#[test]
fn callback_destroying_its_icon_is_safe() {
    init_logging();
    let context = IconContext::new();
    let parent = context.create_icon();
    let child = context.create_icon();
    child.join_dropdown(&parent).unwrap();
    let after = Arc::new(AtomicUsize::new(0));

    parent
        .bind_event(IconEvent::Selected, |icon, _| {
            icon.destroy().unwrap();
        })
        .unwrap();
    let after_clone = after.clone();
    parent
        .bind_event(IconEvent::Toggled, move |_, _| {
            after_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    parent.select().unwrap();
    assert!(parent.is_destroyed());
    assert!(child.is_destroyed());
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[test]
fn bound_callbacks_see_payloads_in_transition_order() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let payloads = Arc::new(Mutex::new(Vec::new()));

    icon.bind_event(IconEvent::Selected, |icon, _| {
        icon.deselect().unwrap();
    })
    .unwrap();
    for event in [IconEvent::Toggled, IconEvent::Notified] {
        let payloads = payloads.clone();
        icon.bind_event(event, move |_, args| payloads.lock().push(args))
            .unwrap();
    }

    icon.select().unwrap();
    icon.notify().unwrap();
    assert!(!icon.is_selected().unwrap());
    assert_eq!(
        *payloads.lock(),
        vec![
            IconEventArgs::Toggled(true),
            IconEventArgs::Toggled(false),
            IconEventArgs::Notified(1),
        ]
    );
}

#[test]
fn panicking_subscriber_does_not_break_transitions() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let later = Arc::new(AtomicUsize::new(0));

    icon.bind_event(IconEvent::Selected, |_, _| panic!("subscriber failure"))
        .unwrap();
    let later_clone = later.clone();
    icon.bind_event(IconEvent::Selected, move |_, _| {
        later_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    icon.select().unwrap();
    assert!(icon.is_selected().unwrap());
    assert_eq!(later.load(Ordering::SeqCst), 1);
}

#[test]
fn unbind_event_removes_all_callbacks_for_that_event() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_icon();
    let hits = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let hits = hits.clone();
        icon.bind_event_named("toggled", move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    let direct = icon.signals().unwrap().toggled.connect(|_| {});

    icon.toggle().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    icon.unbind_event_named("toggled")
        .unwrap()
        .unbind_event_named("noSuchEvent")
        .unwrap();
    icon.toggle().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(icon.signals().unwrap().toggled.is_connected(direct));
    assert!(matches!(
        icon.bind_event_named("noSuchEvent", |_, _| {}),
        Err(IconError::Lookup(_))
    ));
}

#[test]
fn debounced_input_is_ignored_until_released() {
    init_logging();
    let scheduler = Arc::new(ManualScheduler::new());
    let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
    let icon = context.create_icon();
    icon.bind_toggle_key(Key::Q).unwrap();

    assert_eq!(context.handle_key_press(Key::Q), 1);
    icon.debounce(Duration::from_millis(300)).unwrap();
    assert_eq!(context.handle_key_press(Key::Q), 0);
    assert_eq!(context.handle_click(icon.id()), Ok(false));
    assert!(icon.is_selected().unwrap());

    scheduler.advance(Duration::from_millis(300));
    assert_eq!(context.handle_click(icon.id()), Ok(true));
    assert!(!icon.is_selected().unwrap());
}

#[test]
fn debounce_continuation_models_resumed_flow() {
    init_logging();
    let scheduler = Arc::new(ManualScheduler::new());
    let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
    let icon = context.create_icon();
    let resumed = Arc::new(AtomicUsize::new(0));

    let resumed_clone = resumed.clone();
    icon.debounce_then(Duration::from_secs(1), move |icon| {
        assert!(!icon.is_locked().unwrap());
        resumed_clone.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    assert_eq!(scheduler.time_until_next(), Some(Duration::from_secs(1)));
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(resumed.load(Ordering::SeqCst), 1);
}

#[test]
fn lookup_by_name_then_id_and_rename() {
    init_logging();
    let context = IconContext::new();
    let icon = context.create_named("inventory");
    let id = icon.id();

    icon.set_name("bag").unwrap();
    assert!(context.find("inventory").is_none());
    assert_eq!(context.find("bag").map(|found| found.id()), Some(id));
    assert_eq!(context.find(&id.as_raw().to_string()).map(|found| found.id()), Some(id));
    assert_eq!(context.icons().len(), 1);
    assert!(context.icons().contains_key(&id));
}

#[test]
fn global_display_settings() {
    init_logging();
    let context = IconContext::with_config(ContextConfig::default().with_display_order(3));
    let orders = Arc::new(Mutex::new(Vec::new()));
    let orders_clone = orders.clone();
    context.signals().display_order_changed.connect(move |&order| {
        orders_clone.lock().push(order);
    });

    assert_eq!(context.display_order(), 3);
    context.set_display_order(7);
    context.set_topbar_enabled(false);
    assert!(!context.topbar_enabled());

    context.reset();
    assert_eq!(context.display_order(), 3);
    assert!(context.topbar_enabled());
    assert_eq!(*orders.lock(), vec![7, 3]);
    assert_ne!(DEFAULT_DISPLAY_ORDER, 3);
}

#[test]
fn tree_dump_lists_hierarchy() {
    init_logging();
    let context = IconContext::new();
    let shop = context.create_named("shop");
    let coins = context.create_named("coins");
    coins.join_dropdown(&shop).unwrap();
    shop.select().unwrap();

    let dump = IconTreeDebug::new(&context).format_all();
    tracing::debug!("\n{dump}");
    assert!(dump.contains("2 total icons"));
    assert!(dump.contains("(Viewing)"));
    assert!(dump.contains("coins"));
}
