//! Core systems for Horizon Topbar.
//!
//! This crate provides the foundational pieces the icon engine is built on:
//!
//! - **Signal/Slot System**: Typed channels with per-subscriber fault isolation
//! - **Subscriptions**: RAII handles that disconnect on drop
//! - **Janitor**: Release-exactly-once cleanup lists
//! - **Scheduler**: The "run after a duration" seam and a virtual-clock implementation
//! - **Icon State**: The selection state shared by the state machine and the theme system
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_topbar_core::Signal;
//!
//! let selected = Signal::<()>::new();
//! let conn_id = selected.connect(|_| println!("selected"));
//! selected.emit(());
//! selected.disconnect(conn_id);
//! ```
//!
//! # Janitor Example
//!
//! ```
//! use horizon_topbar_core::{Janitor, Signal};
//! use std::sync::Arc;
//!
//! let clear = Arc::new(Signal::<()>::new());
//! let mut janitor = Janitor::new();
//! janitor.add_subscription(clear.subscribe(|_| {}));
//! janitor.add(|| println!("released"));
//!
//! janitor.clean();
//! assert_eq!(clear.connection_count(), 0);
//! ```

mod error;
pub mod janitor;
pub mod logging;
pub mod scheduler;
pub mod signal;
pub mod state;

pub use error::SchedulerError;
pub use janitor::{CleanupId, Janitor};
pub use scheduler::{ManualScheduler, ScheduledTask, ScheduledTaskId, Scheduler};
pub use signal::{ConnectionId, Signal, Subscription};
pub use state::{IconState, UnknownStateError};
