//! Selection state transitions, lock and debounce.
//!
//! ```text
//!              select (no group)          select (non-empty group)
//! Deselected ────────────────────▶ Selected ◀──────────────▶ Viewing
//!      ▲                              │   group filled / emptied   │
//!      └──────────── deselect ────────┴────────────────────────────┘
//! ```
//!
//! Programmatic [`Icon::select`] and [`Icon::deselect`] ignore the lock; the
//! lock only gates host input through [`IconContext::handle_click`] and
//! [`IconContext::handle_key_press`]. A disabled icon cannot be selected at
//! all.
//!
//! A transition's events are delivered through the icon's dispatch queue: a
//! callback that selects or deselects the icon again takes effect at once,
//! but its events are delivered after the events of the transition that
//! triggered it.

use std::sync::Arc;
use std::time::Duration;

use horizon_topbar_core::logging::targets;
use horizon_topbar_core::{IconState, ScheduledTaskId};
use parking_lot::Mutex;

use crate::bindings;
use crate::context::{ContextInner, IconContext};
use crate::error::{IconError, Result};
use crate::icon::Icon;
use crate::registry::IconId;

/// Ignore errors for icons destroyed by a callback mid-cascade.
fn tolerate_destroyed(result: Result<bool>) -> Result<()> {
    match result {
        Ok(_) | Err(IconError::Destroyed(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

impl ContextInner {
    /// Select an icon. Returns whether the icon changed state.
    pub(crate) fn select(self: &Arc<Self>, id: IconId) -> Result<bool> {
        let peers = {
            let registry = self.registry.lock();
            let data = registry.get(id)?;
            if !data.enabled || data.state.is_selected() {
                return Ok(false);
            }
            if registry.config.auto_deselect && data.auto_deselect {
                registry
                    .ids()
                    .into_iter()
                    .filter(|other| *other != id)
                    .filter(|other| {
                        registry
                            .icons
                            .get(*other)
                            .is_some_and(|peer| peer.auto_deselect && peer.state.is_selected())
                    })
                    .collect()
            } else {
                Vec::new()
            }
        };

        for peer in peers {
            tracing::trace!(target: targets::ICON, %id, %peer, "auto-deselecting peer");
            tolerate_destroyed(self.deselect(peer))?;
        }

        let (state, signals, items, one_click) = {
            let mut registry = self.registry.lock();
            let data = registry.get_mut(id)?;
            // A peer's callbacks may have selected or disabled this icon.
            if !data.enabled || data.state.is_selected() {
                return Ok(false);
            }
            data.state = if data.has_group() {
                IconState::Viewing
            } else {
                IconState::Selected
            };
            (
                data.state,
                data.signals.clone(),
                data.toggle_items.clone(),
                data.one_click,
            )
        };
        tracing::debug!(target: targets::ICON, %id, %state, "icon selected");

        self.dispatch(
            id,
            Box::new(move || {
                bindings::set_items_visible(&items, true);
                signals.selected.emit(());
                signals.toggled.emit(true);
                if state == IconState::Viewing {
                    signals.viewing_started.emit(());
                }
            }),
        );
        self.emit_appearance(&[id]);

        if one_click {
            tolerate_destroyed(self.deselect(id))?;
        }
        Ok(true)
    }

    /// Deselect an icon, then every child that was viewing its own group.
    /// Returns whether the icon changed state.
    pub(crate) fn deselect(self: &Arc<Self>, id: IconId) -> Result<bool> {
        let (was_viewing, signals, items, viewing_children) = {
            let mut registry = self.registry.lock();
            let data = registry.get(id)?;
            if !data.state.is_selected() {
                return Ok(false);
            }
            let viewing_children: Vec<IconId> = data
                .all_children()
                .into_iter()
                .filter(|child| {
                    registry
                        .icons
                        .get(*child)
                        .is_some_and(|child_data| child_data.state == IconState::Viewing)
                })
                .collect();
            let data = registry.get_mut(id)?;
            let was_viewing = data.state == IconState::Viewing;
            data.state = IconState::Deselected;
            (
                was_viewing,
                data.signals.clone(),
                data.toggle_items.clone(),
                viewing_children,
            )
        };
        tracing::debug!(target: targets::ICON, %id, was_viewing, "icon deselected");

        self.dispatch(
            id,
            Box::new(move || {
                bindings::set_items_visible(&items, false);
                if was_viewing {
                    signals.viewing_ended.emit(());
                }
                signals.deselected.emit(());
                signals.toggled.emit(false);
            }),
        );
        self.emit_appearance(&[id]);

        for child in viewing_children {
            tolerate_destroyed(self.deselect(child))?;
        }
        Ok(true)
    }

    pub(crate) fn toggle(self: &Arc<Self>, id: IconId) -> Result<bool> {
        if self.read(id, |data| data.state.is_selected())? {
            self.deselect(id)
        } else {
            self.select(id)
        }
    }

    fn set_manual_lock(&self, id: IconId, locked: bool) -> Result<()> {
        self.update_appearance(id, |data| {
            let before = data.is_locked();
            data.manual_lock = locked;
            before != data.is_locked()
        })
    }

    /// Lock for `duration`, then run `continuation`.
    pub(crate) fn debounce_then<F>(self: &Arc<Self>, id: IconId, duration: Duration, continuation: F) -> Result<()>
    where
        F: FnOnce(&Icon) + Send + 'static,
    {
        let locked_now = self.update(id, |data| {
            let before = data.is_locked();
            data.debounce_holds += 1;
            !before
        })?;
        if locked_now {
            self.emit_appearance(&[id]);
        }

        let slot: Arc<Mutex<Option<ScheduledTaskId>>> = Arc::default();
        let task_slot = slot.clone();
        let context = Arc::downgrade(self);
        let task = self.scheduler.schedule(
            duration,
            Box::new(move || {
                let Some(context) = context.upgrade() else {
                    return;
                };
                let task = task_slot.lock().take();
                if context.release_debounce(id, task).is_ok() {
                    continuation(&Icon::from_parts(id, context));
                }
            }),
        );
        *slot.lock() = Some(task);

        self.update(id, |data| data.debounce_tasks.push(task))?;
        tracing::trace!(target: targets::ICON, %id, ?duration, "debounce started");
        Ok(())
    }

    fn release_debounce(&self, id: IconId, task: Option<ScheduledTaskId>) -> Result<()> {
        self.update_appearance(id, |data| {
            data.debounce_holds = data.debounce_holds.saturating_sub(1);
            if let Some(task) = task {
                data.debounce_tasks.retain(|pending| *pending != task);
            }
            tracing::trace!(target: targets::ICON, %id, holds = data.debounce_holds, "debounce released");
            !data.is_locked()
        })
    }
}

impl Icon {
    /// Select the icon.
    ///
    /// Does nothing if the icon is disabled or already selected. If
    /// auto-deselect applies, every other selected auto-deselect icon is
    /// deselected before this icon's `selected` fires. An icon with a
    /// non-empty dropdown or menu goes straight to viewing.
    pub fn select(&self) -> Result<&Self> {
        self.context_inner().select(self.id())?;
        Ok(self)
    }

    /// Deselect the icon. Does nothing if it is already deselected.
    pub fn deselect(&self) -> Result<&Self> {
        self.context_inner().deselect(self.id())?;
        Ok(self)
    }

    /// Select if deselected, deselect otherwise.
    pub fn toggle(&self) -> Result<&Self> {
        self.context_inner().toggle(self.id())?;
        Ok(self)
    }

    /// Stop host input from toggling the icon until [`unlock`](Self::unlock).
    pub fn lock(&self) -> Result<&Self> {
        self.context_inner().set_manual_lock(self.id(), true)?;
        Ok(self)
    }

    /// Release a manual lock. Outstanding debounce holds keep the icon locked.
    pub fn unlock(&self) -> Result<&Self> {
        self.context_inner().set_manual_lock(self.id(), false)?;
        Ok(self)
    }

    pub fn is_locked(&self) -> Result<bool> {
        self.context_inner().read(self.id(), |data| data.is_locked())
    }

    /// Lock the icon for `duration`.
    ///
    /// Holds are counted: overlapping debounces keep the icon locked until
    /// the last of them expires.
    pub fn debounce(&self, duration: Duration) -> Result<&Self> {
        self.debounce_then(duration, |_| {})
    }

    /// Lock the icon for `duration`, then run `continuation` once the hold is
    /// released. The continuation is dropped without running if the icon is
    /// destroyed first.
    ///
    /// ```
    /// use horizon_topbar::{IconContext, ManualScheduler, ContextConfig};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let scheduler = Arc::new(ManualScheduler::new());
    /// let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
    /// let icon = context.create_icon();
    ///
    /// icon.debounce_then(Duration::from_millis(500), |icon| {
    ///     icon.deselect().unwrap();
    /// })?;
    /// icon.select()?;
    /// assert!(icon.is_locked()?);
    ///
    /// scheduler.advance(Duration::from_millis(500));
    /// assert!(!icon.is_locked()?);
    /// assert!(!icon.is_selected()?);
    /// # Ok::<(), horizon_topbar::IconError>(())
    /// ```
    pub fn debounce_then<F>(&self, duration: Duration, continuation: F) -> Result<&Self>
    where
        F: FnOnce(&Icon) + Send + 'static,
    {
        self.context_inner().debounce_then(self.id(), duration, continuation)?;
        Ok(self)
    }
}

impl IconContext {
    /// Feed a click on an icon from the host.
    ///
    /// Toggles the icon unless it is locked or disabled. Returns whether the
    /// icon changed state.
    pub fn handle_click(&self, id: IconId) -> Result<bool> {
        let accepts = self.inner().read(id, |data| data.enabled && !data.is_locked())?;
        if !accepts {
            tracing::trace!(target: targets::ICON, %id, "click ignored");
            return Ok(false);
        }
        self.inner().toggle(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;
    use crate::events::IconEvent;
    use horizon_topbar_core::ManualScheduler;

    fn record(icon: &Icon, log: &Arc<Mutex<Vec<String>>>) {
        let signals = icon.signals().unwrap();
        let name = icon.name().unwrap();
        let push = |log: &Arc<Mutex<Vec<String>>>, name: &str, event: &str| {
            let log = log.clone();
            let entry = format!("{name}:{event}");
            move || log.lock().push(entry.clone())
        };
        let selected = push(log, &name, "selected");
        signals.selected.connect(move |_| selected());
        let deselected = push(log, &name, "deselected");
        signals.deselected.connect(move |_| deselected());
        let started = push(log, &name, "viewingStarted");
        signals.viewing_started.connect(move |_| started());
        let ended = push(log, &name, "viewingEnded");
        signals.viewing_ended.connect(move |_| ended());
        let log = log.clone();
        signals
            .toggled
            .connect(move |&on| log.lock().push(format!("{name}:toggled({on})")));
    }

    #[test]
    fn select_then_deselect_order() {
        let context = IconContext::new();
        let icon = context.create_named("a");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&icon, &log);

        icon.select().unwrap().deselect().unwrap();
        assert_eq!(icon.state().unwrap(), IconState::Deselected);
        assert_eq!(
            *log.lock(),
            vec!["a:selected", "a:toggled(true)", "a:deselected", "a:toggled(false)"]
        );
    }

    #[test]
    fn select_is_idempotent() {
        let context = IconContext::new();
        let icon = context.create_named("a");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&icon, &log);

        icon.select().unwrap().select().unwrap();
        assert_eq!(log.lock().len(), 2);
        icon.deselect().unwrap().deselect().unwrap();
        assert_eq!(log.lock().len(), 4);
    }

    #[test]
    fn auto_deselect_runs_before_selected() {
        let context = IconContext::new();
        let a = context.create_named("a");
        let b = context.create_named("b");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&a, &log);
        record(&b, &log);

        a.select().unwrap();
        b.select().unwrap();
        assert!(!a.is_selected().unwrap());
        assert!(b.is_selected().unwrap());
        assert_eq!(
            log.lock()[2..],
            ["a:deselected", "a:toggled(false)", "b:selected", "b:toggled(true)"]
        );
    }

    #[test]
    fn auto_deselect_needs_both_icons_and_the_switch() {
        let context = IconContext::new();
        let a = context.create_icon();
        let b = context.create_icon();
        a.set_auto_deselect(false).unwrap();

        a.select().unwrap();
        b.select().unwrap();
        assert!(a.is_selected().unwrap());

        let context = IconContext::with_config(ContextConfig::default().with_auto_deselect(false));
        let a = context.create_icon();
        let b = context.create_icon();
        a.select().unwrap();
        b.select().unwrap();
        assert!(a.is_selected().unwrap() && b.is_selected().unwrap());
    }

    #[test]
    fn disabled_icon_cannot_be_selected() {
        let context = IconContext::new();
        let icon = context.create_icon();
        icon.set_enabled(false).unwrap().select().unwrap();
        assert!(!icon.is_selected().unwrap());
        assert_eq!(context.handle_click(icon.id()), Ok(false));
    }

    #[test]
    fn lock_gates_only_input() {
        let context = IconContext::new();
        let icon = context.create_icon();
        icon.lock().unwrap();

        assert_eq!(context.handle_click(icon.id()), Ok(false));
        assert!(!icon.is_selected().unwrap());
        icon.select().unwrap();
        assert!(icon.is_selected().unwrap());

        icon.unlock().unwrap();
        assert_eq!(context.handle_click(icon.id()), Ok(true));
        assert!(!icon.is_selected().unwrap());
    }

    #[test]
    fn one_click_emits_both_pairs() {
        let context = IconContext::new();
        let icon = context.create_named("a");
        icon.set_one_click(true).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&icon, &log);

        icon.select().unwrap();
        assert_eq!(icon.state().unwrap(), IconState::Deselected);
        assert_eq!(
            *log.lock(),
            vec!["a:selected", "a:toggled(true)", "a:deselected", "a:toggled(false)"]
        );
    }

    #[test]
    fn overlapping_debounces_hold_until_the_last() {
        let scheduler = Arc::new(ManualScheduler::new());
        let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
        let icon = context.create_icon();

        icon.debounce(Duration::from_secs(1)).unwrap();
        scheduler.advance(Duration::from_millis(500));
        icon.debounce(Duration::from_secs(1)).unwrap();

        scheduler.advance(Duration::from_millis(500));
        assert!(icon.is_locked().unwrap());
        scheduler.advance(Duration::from_millis(500));
        assert!(!icon.is_locked().unwrap());
    }

    #[test]
    fn debounce_keeps_manual_lock() {
        let scheduler = Arc::new(ManualScheduler::new());
        let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
        let icon = context.create_icon();

        icon.lock().unwrap().debounce(Duration::from_secs(1)).unwrap();
        scheduler.advance(Duration::from_secs(1));
        assert!(icon.is_locked().unwrap());
        icon.unlock().unwrap();
        assert!(!icon.is_locked().unwrap());
    }

    #[test]
    fn destroy_cancels_debounce() {
        let scheduler = Arc::new(ManualScheduler::new());
        let context = IconContext::with_scheduler(ContextConfig::default(), scheduler.clone());
        let icon = context.create_icon();
        let ran = Arc::new(Mutex::new(false));
        let ran_clone = ran.clone();

        icon.debounce_then(Duration::from_secs(1), move |_| *ran_clone.lock() = true)
            .unwrap();
        assert_eq!(scheduler.pending_count(), 1);
        icon.destroy().unwrap();
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(Duration::from_secs(2));
        assert!(!*ran.lock());
    }

    #[test]
    fn reentrant_transitions_are_delivered_in_order() {
        let context = IconContext::new();
        let icon = context.create_named("a");
        let log = Arc::new(Mutex::new(Vec::new()));
        icon.bind_event(IconEvent::Selected, |icon, _| {
            icon.deselect().unwrap();
        })
        .unwrap();
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let toggles_clone = toggles.clone();
        icon.bind_event(IconEvent::Toggled, move |_, args| {
            toggles_clone.lock().push(args.selected());
        })
        .unwrap();
        record(&icon, &log);

        icon.select().unwrap();
        assert_eq!(icon.state().unwrap(), IconState::Deselected);
        assert_eq!(*toggles.lock(), vec![Some(true), Some(false)]);
        assert_eq!(
            *log.lock(),
            vec!["a:selected", "a:toggled(true)", "a:deselected", "a:toggled(false)"]
        );
    }

    #[test]
    fn callbacks_can_reenter_the_state_machine() {
        let context = IconContext::new();
        let icon = context.create_icon();
        let handle = icon.clone();
        icon.signals().unwrap().selected.connect(move |_| {
            handle.deselect().unwrap();
        });

        icon.select().unwrap();
        assert_eq!(icon.state().unwrap(), IconState::Deselected);
    }
}
