//! Notice badges.
//!
//! Each notice is tied to a clear signal. When any pending clear signal
//! fires, the icon's whole count drops to zero and every other pending clear
//! subscription is cancelled.
//!
//! A child's notices also show on its parent's badge while the child is
//! hidden, that is while the parent is not viewing its groups.

use std::sync::{Arc, Weak};

use horizon_topbar_core::logging::targets;
use horizon_topbar_core::{Signal, Subscription};

use crate::context::ContextInner;
use crate::error::Result;
use crate::icon::Icon;
use crate::registry::IconId;

fn clear_on_fire(context: Weak<ContextInner>, id: IconId) -> impl Fn() + Send + Sync + 'static {
    move || {
        if let Some(context) = context.upgrade() {
            // The icon may be gone already; nothing to clear then.
            let _ = context.clear_notices(id);
        }
    }
}

impl ContextInner {
    fn push_notice(&self, id: IconId, subscription: Subscription) -> Result<u32> {
        let (count, signals) = self.update(id, |data| {
            data.notices = data.notices.saturating_add(1);
            data.notice_subscriptions.push(subscription);
            (data.notices, data.signals.clone())
        })?;
        tracing::debug!(target: targets::NOTICE, %id, count, "notice added");

        signals.notified.emit(count);
        self.emit_appearance(&[id]);
        Ok(count)
    }

    pub(crate) fn notify(self: &Arc<Self>, id: IconId) -> Result<u32> {
        let deselected = self.read(id, |data| data.signals.deselected.clone())?;
        self.notify_until(id, &deselected)
    }

    pub(crate) fn notify_until<Args: 'static>(self: &Arc<Self>, id: IconId, clear: &Arc<Signal<Args>>) -> Result<u32> {
        let on_fire = clear_on_fire(Arc::downgrade(self), id);
        let subscription = clear.subscribe_once(move |_| on_fire());
        self.push_notice(id, subscription)
    }

    pub(crate) fn clear_notices(&self, id: IconId) -> Result<()> {
        let (cleared, subscriptions) = self.update(id, |data| {
            (
                std::mem::take(&mut data.notices),
                std::mem::take(&mut data.notice_subscriptions),
            )
        })?;
        // Cancelling unlocks the clear signals, so do it outside the registry lock.
        drop(subscriptions);
        if cleared > 0 {
            tracing::debug!(target: targets::NOTICE, %id, cleared, "notices cleared");
            self.emit_appearance(&[id]);
        }
        Ok(())
    }
}

impl Icon {
    /// Add a notice that clears the next time this icon is deselected.
    pub fn notify(&self) -> Result<&Self> {
        self.context_inner().notify(self.id())?;
        Ok(self)
    }

    /// Add a notice that clears when `clear` next fires.
    ///
    /// ```
    /// use horizon_topbar::{IconContext, Signal};
    /// use std::sync::Arc;
    ///
    /// let context = IconContext::new();
    /// let icon = context.create_icon();
    /// let inbox_read = Arc::new(Signal::<()>::new());
    ///
    /// icon.notify_until(&inbox_read)?.notify_until(&inbox_read)?;
    /// assert_eq!(icon.notice_count()?, 2);
    ///
    /// inbox_read.emit(());
    /// assert_eq!(icon.notice_count()?, 0);
    /// # Ok::<(), horizon_topbar::IconError>(())
    /// ```
    pub fn notify_until<Args: 'static>(&self, clear: &Arc<Signal<Args>>) -> Result<&Self> {
        self.context_inner().notify_until(self.id(), clear)?;
        Ok(self)
    }

    /// Drop every notice now and stop listening to their clear signals.
    pub fn clear_notices(&self) -> Result<&Self> {
        self.context_inner().clear_notices(self.id())?;
        Ok(self)
    }

    /// This icon's own notices.
    pub fn notice_count(&self) -> Result<u32> {
        self.context_inner().read(self.id(), |data| data.notices)
    }

    /// The number on this icon's badge: its own notices plus those of
    /// hidden children.
    pub fn displayed_notice_count(&self) -> Result<u32> {
        let registry = self.context_inner().registry.lock();
        registry.get(self.id())?;
        Ok(registry.displayed_notices(self.id()))
    }
}
