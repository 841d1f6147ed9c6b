//! The owning context: registry, base theme, scheduler and global toggles.
//!
//! All icon state lives inside an [`IconContext`]. There are no ambient
//! globals, so independent contexts (for example one per test) never see
//! each other's icons.
//!
//! Internally every operation follows the same shape: lock the registry,
//! mutate and collect what needs announcing, release the lock, then emit
//! signals and call out to user code. User callbacks therefore always run
//! with the registry unlocked and may freely call back into the context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_topbar_core::logging::targets;
use horizon_topbar_core::{ManualScheduler, Scheduler, Signal};
use horizon_topbar_style::schema;
use parking_lot::Mutex;

use crate::bindings;
use crate::config::{ChildPolicy, ContextConfig, DestroyPolicy};
use crate::error::{IconError, Result};
use crate::icon::Icon;
use crate::registry::{GroupKind, IconData, IconId, IconRegistry, PendingEmit};

/// Context-wide signals.
#[derive(Default)]
pub struct ContextSignals {
    /// An icon was created.
    pub icon_added: Signal<IconId>,
    /// An icon was destroyed.
    pub icon_removed: Signal<IconId>,
    /// The topbar was shown or hidden.
    pub topbar_enabled_changed: Signal<bool>,
    /// The topbar's display order changed.
    pub display_order_changed: Signal<i32>,
}

impl fmt::Debug for ContextSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSignals").finish_non_exhaustive()
    }
}

pub(crate) struct ContextInner {
    pub(crate) registry: Mutex<IconRegistry>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) signals: ContextSignals,
}

impl ContextInner {
    /// Read one icon's data under the registry lock.
    pub(crate) fn read<R>(&self, id: IconId, f: impl FnOnce(&IconData) -> R) -> Result<R> {
        let registry = self.registry.lock();
        registry.get(id).map(f)
    }

    /// Mutate one icon's data under the registry lock.
    pub(crate) fn update<R>(&self, id: IconId, f: impl FnOnce(&mut IconData) -> R) -> Result<R> {
        let mut registry = self.registry.lock();
        registry.get_mut(id).map(f)
    }

    /// Mutate one icon and announce an appearance change if `f` reports one.
    pub(crate) fn update_appearance(
        &self,
        id: IconId,
        f: impl FnOnce(&mut IconData) -> bool,
    ) -> Result<()> {
        let signals = self.update(id, |data| f(data).then(|| data.signals.clone()))?;
        if let Some(signals) = signals {
            signals.appearance_changed.emit(());
        }
        Ok(())
    }

    /// Announce an appearance change on `ids` and everything above them.
    pub(crate) fn emit_appearance(&self, ids: &[IconId]) {
        let targets = self.registry.lock().appearance_targets(ids);
        for signals in targets {
            signals.appearance_changed.emit(());
        }
    }

    /// Deliver one transition's events for `id`.
    ///
    /// If the icon is already delivering events, `emit` is queued and runs
    /// after the transitions ahead of it, so callbacks see events in the
    /// order the transitions happened even when they change the state again.
    pub(crate) fn dispatch(&self, id: IconId, emit: PendingEmit) {
        {
            let mut registry = self.registry.lock();
            if let Some(data) = registry.icons.get_mut(id) {
                if data.dispatching {
                    data.queued_emits.push_back(emit);
                    return;
                }
                data.dispatching = true;
            }
        }

        let mut next = Some(emit);
        while let Some(emit) = next {
            emit();
            let mut registry = self.registry.lock();
            next = registry.icons.get_mut(id).and_then(|data| {
                let queued = data.queued_emits.pop_front();
                if queued.is_none() {
                    data.dispatching = false;
                }
                queued
            });
        }
    }

    pub(crate) fn create_icon(self: &Arc<Self>) -> IconId {
        let id = self.registry.lock().insert();
        tracing::debug!(target: targets::ICON, %id, "icon created");
        self.signals.icon_added.emit(id);
        id
    }

    /// Destroy an icon.
    ///
    /// The entry leaves the arena first, in one step, so nothing can reach
    /// it afterwards. Its janitor then runs, and finally its children are
    /// destroyed or detached according to the destroy policy.
    #[tracing::instrument(skip(self), target = "horizon_topbar::icon", level = "trace")]
    pub(crate) fn destroy(self: &Arc<Self>, id: IconId) -> Result<()> {
        let (data, parents, doomed) = {
            let mut registry = self.registry.lock();
            let data = registry.icons.remove(id).ok_or(IconError::Destroyed(id))?;
            let parents = registry.unlink_from_parents(id, &data);
            let policy = registry.config.destroy_policy;

            let mut doomed = Vec::new();
            for kind in GroupKind::ALL {
                for &child in data.children(kind) {
                    registry.clear_parent(child, kind);
                    if policy.for_kind(kind) == ChildPolicy::Destroy && !doomed.contains(&child) {
                        doomed.push(child);
                    }
                }
            }
            (data, parents, doomed)
        };

        let IconData {
            name,
            state,
            janitor,
            signals,
            notice_subscriptions,
            debounce_tasks,
            toggle_items,
            ..
        } = data;
        tracing::debug!(
            target: targets::ICON,
            %id,
            name = %name,
            destroyed_children = doomed.len(),
            "icon destroyed"
        );

        for task in debounce_tasks {
            if let Err(err) = self.scheduler.cancel(task) {
                tracing::trace!(target: targets::SCHEDULER, %id, ?task, %err, "debounce task already gone");
            }
        }
        drop(notice_subscriptions);
        signals.disconnect_all();
        if state.is_selected() {
            bindings::set_items_visible(&toggle_items, false);
        }
        let mut janitor = janitor;
        janitor.clean();

        self.signals.icon_removed.emit(id);

        for parent in &parents {
            self.refresh_viewing(*parent);
        }
        self.emit_appearance(&parents);

        for child in doomed {
            match self.destroy(child) {
                Ok(()) | Err(IconError::Destroyed(_)) => {}
                Err(err) => {
                    tracing::warn!(target: targets::ICON, %child, %err, "child destroy failed");
                }
            }
        }
        Ok(())
    }
}

/// The owning context for a set of icons.
///
/// Cloning an `IconContext` produces another handle to the same context.
///
/// # Example
///
/// ```
/// use horizon_topbar::IconContext;
///
/// let context = IconContext::new();
/// let icon = context.create_icon();
/// icon.set_name("shop").unwrap();
///
/// assert_eq!(context.find("shop").map(|found| found.id()), Some(icon.id()));
/// icon.destroy().unwrap();
/// assert!(context.find("shop").is_none());
/// ```
#[derive(Clone)]
pub struct IconContext {
    inner: Arc<ContextInner>,
}

impl IconContext {
    /// Create a context with the default configuration and a
    /// [`ManualScheduler`].
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Create a context with the given configuration and a [`ManualScheduler`].
    pub fn with_config(config: ContextConfig) -> Self {
        Self::with_scheduler(config, Arc::new(ManualScheduler::new()))
    }

    /// Create a context driven by the host's scheduler.
    pub fn with_scheduler(config: ContextConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                registry: Mutex::new(IconRegistry::new(config)),
                scheduler,
                signals: ContextSignals::default(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ContextInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<ContextInner> {
        &self.inner
    }

    /// Create and register a new icon.
    pub fn create_icon(&self) -> Icon {
        let id = self.inner.create_icon();
        Icon::from_parts(id, self.inner.clone())
    }

    /// Create a new icon with a name.
    pub fn create_named(&self, name: &str) -> Icon {
        let icon = self.create_icon();
        if let Err(err) = icon.set_name(name) {
            // Only reachable if a creation callback destroyed the icon.
            tracing::debug!(target: targets::ICON, %err, "icon destroyed before it was named");
        }
        icon
    }

    /// A handle to a live icon.
    pub fn icon(&self, id: IconId) -> Result<Icon> {
        self.inner.read(id, |_| ())?;
        Ok(Icon::from_parts(id, self.inner.clone()))
    }

    /// Look an icon up by name, then by numeric id.
    ///
    /// When several icons share a name the oldest wins. An empty query
    /// matches nothing, even though new icons start unnamed.
    pub fn find(&self, name_or_id: &str) -> Option<Icon> {
        if name_or_id.is_empty() {
            return None;
        }
        let id = {
            let registry = self.inner.registry.lock();
            registry.find_by_name(name_or_id).or_else(|| {
                name_or_id
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .map(IconId::from_raw)
                    .filter(|id| registry.icons.contains_key(*id))
            })
        }?;
        Some(Icon::from_parts(id, self.inner.clone()))
    }

    /// A snapshot of every live icon.
    pub fn icons(&self) -> HashMap<IconId, Icon> {
        self.icon_ids()
            .into_iter()
            .map(|id| (id, Icon::from_parts(id, self.inner.clone())))
            .collect()
    }

    /// Every live icon id, oldest first.
    pub fn icon_ids(&self) -> Vec<IconId> {
        self.inner.registry.lock().ids()
    }

    pub fn icon_count(&self) -> usize {
        self.inner.registry.lock().icons.len()
    }

    pub fn contains(&self, id: IconId) -> bool {
        self.inner.registry.lock().icons.contains_key(id)
    }

    /// Destroy every icon. Returns how many were destroyed by this call,
    /// including children destroyed in cascade.
    pub fn destroy_all(&self) -> usize {
        let before = self.icon_count();
        for id in self.icon_ids() {
            match self.inner.destroy(id) {
                Ok(()) | Err(IconError::Destroyed(_)) => {}
                Err(err) => tracing::warn!(target: targets::ICON, %id, %err, "destroy failed"),
            }
        }
        before.saturating_sub(self.icon_count())
    }

    /// Destroy every icon and restore the base theme and display settings.
    pub fn reset(&self) {
        let destroyed = self.destroy_all();
        {
            let mut registry = self.inner.registry.lock();
            registry.base_theme = schema::default_base_theme();
        }
        let config = self.config();
        self.set_topbar_enabled(config.topbar_enabled);
        self.set_display_order(config.display_order);
        tracing::debug!(target: targets::ICON, destroyed, "context reset");
    }

    /// Context-wide signals.
    pub fn signals(&self) -> &ContextSignals {
        &self.inner.signals
    }

    /// The scheduler driving timed behavior.
    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        self.inner.scheduler.clone()
    }

    /// The current configuration.
    pub fn config(&self) -> ContextConfig {
        self.inner.registry.lock().config.clone()
    }

    /// Turn the process-wide auto-deselect switch on or off.
    pub fn set_auto_deselect(&self, enabled: bool) {
        self.inner.registry.lock().config.auto_deselect = enabled;
    }

    pub fn set_destroy_policy(&self, policy: DestroyPolicy) {
        self.inner.registry.lock().config.destroy_policy = policy;
    }

    /// Show or hide the whole topbar.
    pub fn set_topbar_enabled(&self, enabled: bool) {
        let changed = {
            let mut registry = self.inner.registry.lock();
            std::mem::replace(&mut registry.topbar_enabled, enabled) != enabled
        };
        if changed {
            tracing::debug!(target: targets::ICON, enabled, "topbar visibility changed");
            self.inner.signals.topbar_enabled_changed.emit(enabled);
        }
    }

    pub fn topbar_enabled(&self) -> bool {
        self.inner.registry.lock().topbar_enabled
    }

    /// Set the display order the renderer layers the topbar with.
    pub fn set_display_order(&self, order: i32) {
        let changed = {
            let mut registry = self.inner.registry.lock();
            std::mem::replace(&mut registry.display_order, order) != order
        };
        if changed {
            self.inner.signals.display_order_changed.emit(order);
        }
    }

    pub fn display_order(&self) -> i32 {
        self.inner.registry.lock().display_order
    }
}

impl Default for IconContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IconContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.lock();
        f.debug_struct("IconContext")
            .field("icons", &registry.icons.len())
            .field("topbar_enabled", &registry.topbar_enabled)
            .field("display_order", &registry.display_order)
            .finish()
    }
}

impl PartialEq for IconContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

static_assertions::assert_impl_all!(IconContext: Send, Sync);
