//! The per-icon event channels.
//!
//! Every icon owns an [`IconSignals`] bundle. Typed access goes through
//! [`Icon::signals`]; the name-based [`Icon::bind_event`] surface registers
//! callbacks that receive the icon handle and can later be removed all at
//! once with [`Icon::unbind_event`].
//!
//! State transitions emit in a fixed order: `selected` or `deselected`
//! first, then `toggled`, then the viewing event if the transition entered
//! or left the viewing state. Leaving the viewing state is the exception:
//! `viewing_ended` comes first, since the icon stops viewing before it stops
//! being selected.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use horizon_topbar_core::logging::targets;
use horizon_topbar_core::{ConnectionId, Signal};

use crate::context::ContextInner;
use crate::error::{IconError, Result};
use crate::icon::Icon;
use crate::registry::IconId;

/// The six semantic events an icon publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconEvent {
    Selected,
    Deselected,
    Toggled,
    ViewingStarted,
    ViewingEnded,
    Notified,
}

impl IconEvent {
    pub const ALL: [IconEvent; 6] = [
        IconEvent::Selected,
        IconEvent::Deselected,
        IconEvent::Toggled,
        IconEvent::ViewingStarted,
        IconEvent::ViewingEnded,
        IconEvent::Notified,
    ];

    /// The canonical event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Deselected => "deselected",
            Self::Toggled => "toggled",
            Self::ViewingStarted => "viewingStarted",
            Self::ViewingEnded => "viewingEnded",
            Self::Notified => "notified",
        }
    }
}

impl fmt::Display for IconEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IconEvent {
    type Err = IconError;

    /// Parse an event name. Case and underscores are ignored, so
    /// `"viewingStarted"` and `"viewing_started"` both match.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| IconError::Lookup(s.to_string()))
    }
}

/// The payload delivered with an icon event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconEventArgs {
    /// The event carries nothing.
    Empty,
    /// `toggled`: the selected flag after the transition.
    Toggled(bool),
    /// `notified`: the notice count after the new notice.
    Notified(u32),
}

impl IconEventArgs {
    /// The selected flag of a `toggled` event.
    pub fn selected(self) -> Option<bool> {
        match self {
            Self::Toggled(selected) => Some(selected),
            _ => None,
        }
    }

    /// The notice count of a `notified` event.
    pub fn count(self) -> Option<u32> {
        match self {
            Self::Notified(count) => Some(count),
            _ => None,
        }
    }
}

/// The signals of one icon.
///
/// Cloning the bundle clones the handles, not the signals.
#[derive(Clone, Default)]
pub struct IconSignals {
    /// The icon became selected.
    pub selected: Arc<Signal<()>>,
    /// The icon became deselected.
    pub deselected: Arc<Signal<()>>,
    /// The icon's selection flipped; carries the new selected flag.
    pub toggled: Arc<Signal<bool>>,
    /// The icon's dropdown or menu opened.
    pub viewing_started: Arc<Signal<()>>,
    /// The icon's dropdown or menu closed.
    pub viewing_ended: Arc<Signal<()>>,
    /// A notice arrived; carries the new notice count.
    pub notified: Arc<Signal<u32>>,
    /// Anything a renderer draws changed: state, theme, notices, flags.
    pub appearance_changed: Arc<Signal<()>>,
}

impl IconSignals {
    /// Connect a slot to the channel for `event`, handing it the payload.
    pub(crate) fn connect_event<F>(&self, event: IconEvent, slot: F) -> ConnectionId
    where
        F: Fn(IconEventArgs) + Send + Sync + 'static,
    {
        match event {
            IconEvent::Selected => self.selected.connect(move |_| slot(IconEventArgs::Empty)),
            IconEvent::Deselected => self.deselected.connect(move |_| slot(IconEventArgs::Empty)),
            IconEvent::Toggled => self.toggled.connect(move |&on| slot(IconEventArgs::Toggled(on))),
            IconEvent::ViewingStarted => self.viewing_started.connect(move |_| slot(IconEventArgs::Empty)),
            IconEvent::ViewingEnded => self.viewing_ended.connect(move |_| slot(IconEventArgs::Empty)),
            IconEvent::Notified => self.notified.connect(move |&count| slot(IconEventArgs::Notified(count))),
        }
    }

    pub(crate) fn disconnect_event(&self, event: IconEvent, id: ConnectionId) -> bool {
        match event {
            IconEvent::Selected => self.selected.disconnect(id),
            IconEvent::Deselected => self.deselected.disconnect(id),
            IconEvent::Toggled => self.toggled.disconnect(id),
            IconEvent::ViewingStarted => self.viewing_started.disconnect(id),
            IconEvent::ViewingEnded => self.viewing_ended.disconnect(id),
            IconEvent::Notified => self.notified.disconnect(id),
        }
    }

    /// Drop every connection on every channel.
    pub(crate) fn disconnect_all(&self) {
        self.selected.disconnect_all();
        self.deselected.disconnect_all();
        self.toggled.disconnect_all();
        self.viewing_started.disconnect_all();
        self.viewing_ended.disconnect_all();
        self.notified.disconnect_all();
        self.appearance_changed.disconnect_all();
    }
}

impl fmt::Debug for IconSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IconSignals")
            .field("selected", &self.selected.connection_count())
            .field("deselected", &self.deselected.connection_count())
            .field("toggled", &self.toggled.connection_count())
            .field("viewing_started", &self.viewing_started.connection_count())
            .field("viewing_ended", &self.viewing_ended.connection_count())
            .field("notified", &self.notified.connection_count())
            .finish()
    }
}

impl ContextInner {
    pub(crate) fn bind_event<F>(self: &Arc<Self>, id: IconId, event: IconEvent, callback: F) -> Result<ConnectionId>
    where
        F: Fn(&Icon, IconEventArgs) + Send + Sync + 'static,
    {
        let signals = self.read(id, |data| data.signals.clone())?;
        let context = Arc::downgrade(self);
        let connection = signals.connect_event(event, move |args| {
            if let Some(context) = context.upgrade() {
                callback(&Icon::from_parts(id, context), args);
            }
        });

        let stored = self.update(id, |data| {
            data.bound_events.entry(event).or_default().push(connection);
        });
        if let Err(err) = stored {
            signals.disconnect_event(event, connection);
            return Err(err);
        }
        tracing::trace!(target: targets::ICON, %id, %event, "event bound");
        Ok(connection)
    }

    /// Remove every callback bound to `event` through [`bind_event`](Self::bind_event).
    pub(crate) fn unbind_event(&self, id: IconId, event: IconEvent) -> Result<usize> {
        let (signals, connections) = self.update(id, |data| {
            (
                data.signals.clone(),
                data.bound_events.remove(&event).unwrap_or_default(),
            )
        })?;
        let removed = connections
            .into_iter()
            .filter(|connection| signals.disconnect_event(event, *connection))
            .count();
        tracing::trace!(target: targets::ICON, %id, %event, removed, "event unbound");
        Ok(removed)
    }
}

impl Icon {
    /// Call `callback` every time `event` fires.
    ///
    /// The callback receives the icon and the event's payload: the selected
    /// flag for `toggled`, the notice count for `notified`. Payloads arrive in
    /// transition order even when an earlier callback changes the icon's
    /// state again. An event can be bound any number of times.
    pub fn bind_event<F>(&self, event: IconEvent, callback: F) -> Result<&Self>
    where
        F: Fn(&Icon, IconEventArgs) + Send + Sync + 'static,
    {
        self.context_inner().bind_event(self.id(), event, callback)?;
        Ok(self)
    }

    /// Like [`bind_event`](Self::bind_event), with the event given by name.
    pub fn bind_event_named<F>(&self, name: &str, callback: F) -> Result<&Self>
    where
        F: Fn(&Icon, IconEventArgs) + Send + Sync + 'static,
    {
        let event: IconEvent = name.parse()?;
        self.bind_event(event, callback)
    }

    /// Remove every callback bound to `event` with [`bind_event`](Self::bind_event).
    ///
    /// Connections made directly on [`signals`](Self::signals) are untouched.
    /// Unbinding an event with no callbacks does nothing.
    pub fn unbind_event(&self, event: IconEvent) -> Result<&Self> {
        self.context_inner().unbind_event(self.id(), event)?;
        Ok(self)
    }

    /// Like [`unbind_event`](Self::unbind_event), with the event given by name.
    ///
    /// An unknown name is ignored so chained calls keep going.
    pub fn unbind_event_named(&self, name: &str) -> Result<&Self> {
        match name.parse::<IconEvent>() {
            Ok(event) => self.unbind_event(event),
            Err(err) => {
                tracing::debug!(target: targets::ICON, id = %self.id(), %err, "ignoring unbind of unknown event");
                self.context_inner().read(self.id(), |_| ())?;
                Ok(self)
            }
        }
    }

    /// The icon's signals, for typed connections.
    pub fn signals(&self) -> Result<IconSignals> {
        self.context_inner().read(self.id(), |data| data.signals.clone())
    }
}
