//! Signal/slot system for Horizon Topbar.
//!
//! This module provides the typed publish/subscribe channels every icon
//! exposes. Signals are emitted by the state machine when an icon's state
//! changes, and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`Subscription`] - RAII handle that disconnects when dropped or cancelled
//!
//! # Delivery Rules
//!
//! - Slots are invoked synchronously, in connection order, on the emitting thread.
//! - The connection list is snapshotted before delivery, so a slot may connect
//!   or disconnect (on this or any other signal) without corrupting the emit.
//! - A slot disconnected while an emit is in progress is not invoked afterwards,
//!   even if it was part of the snapshot.
//! - A panicking slot is isolated: the panic is caught and logged, and the
//!   remaining slots still run.
//!
//! # Example
//!
//! ```
//! use horizon_topbar_core::Signal;
//!
//! // Create a signal that passes a bool argument
//! let toggled = Signal::<bool>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = toggled.connect(|selected| {
//!     println!("Selected: {}", selected);
//! });
//!
//! // Emit the signal
//! toggled.emit(true);
//!
//! // Disconnect when done
//! toggled.disconnect(conn_id);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected,
    /// a one-shot connection fires, or the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Slot<Args>,
    /// Whether the connection is removed after its first delivery.
    once: bool,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect), used to disconnect
/// - [`Subscription`] - RAII-style connection that auto-disconnects on drop
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), false)
    }

    /// Connect a slot that is disconnected automatically after its first delivery.
    pub fn connect_once<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), true)
    }

    fn insert(&self, slot: Slot<Args>, once: bool) -> ConnectionId {
        let id = self.connections.lock().insert(Connection { slot, once });
        tracing::trace!(target: targets::SIGNAL, ?id, once, "slot connected");
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Check whether a connection is still live.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Returns the number of slots that completed without panicking.
    #[tracing::instrument(skip_all, target = "horizon_topbar_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return 0;
        }

        // Snapshot so slots can freely connect/disconnect while we deliver.
        let snapshot: Vec<(ConnectionId, Slot<Args>, bool)> = self
            .connections
            .lock()
            .iter()
            .map(|(id, conn)| (id, conn.slot.clone(), conn.once))
            .collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        let mut delivered = 0;
        for (id, slot, once) in snapshot {
            let live = {
                let mut connections = self.connections.lock();
                if once {
                    connections.remove(id).is_some()
                } else {
                    connections.contains_key(id)
                }
            };
            if !live {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| slot(&args))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        target: targets::SIGNAL,
                        ?id,
                        message = panic_message(payload.as_ref()),
                        "slot panicked, continuing with remaining slots"
                    );
                }
            }
        }
        delivered
    }
}

impl<Args: 'static> Signal<Args> {
    /// Connect a slot and return a [`Subscription`] that disconnects it when
    /// cancelled or dropped.
    ///
    /// The subscription only holds a weak reference to the signal, so it never
    /// keeps the signal alive.
    pub fn subscribe<F>(self: &Arc<Self>, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        Subscription::for_connection(Arc::downgrade(self), id)
    }

    /// Like [`subscribe`](Self::subscribe), but the slot fires at most once.
    pub fn subscribe_once<F>(self: &Arc<Self>, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect_once(slot);
        Subscription::for_connection(Arc::downgrade(self), id)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// A connection handle that disconnects when cancelled or dropped.
///
/// Created via [`Signal::subscribe`] or [`Signal::subscribe_once`]. A
/// subscription can be handed to a [`Janitor`](crate::Janitor) through
/// [`into_cleanup`](Self::into_cleanup) so it is released with its owner.
///
/// # Example
///
/// ```
/// use horizon_topbar_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Arc::new(Signal::<i32>::new());
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _sub = signal.subscribe(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);  // counter = 42
/// }
/// signal.emit(43);  // Nothing happens - subscription was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
#[must_use = "dropping a Subscription disconnects it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn for_connection<Args: 'static>(signal: Weak<Signal<Args>>, id: ConnectionId) -> Self {
        Self {
            cancel: Some(Box::new(move || {
                if let Some(signal) = signal.upgrade() {
                    signal.disconnect(id);
                }
            })),
        }
    }

    /// Whether the subscription has not been cancelled yet.
    ///
    /// A one-shot subscription that already fired still reports `true`;
    /// cancelling it afterwards is a no-op.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Disconnect now. Calling this more than once has no further effect.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Convert into a cleanup closure suitable for a [`Janitor`](crate::Janitor).
    pub fn into_cleanup(mut self) -> impl FnOnce() + Send + Sync + 'static {
        let cancel = self.cancel.take();
        move || {
            if let Some(cancel) = cancel {
                cancel();
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

static_assertions::assert_impl_all!(Signal<bool>: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);
