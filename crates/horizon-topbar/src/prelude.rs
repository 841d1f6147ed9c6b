//! Prelude module for Horizon Topbar.
//!
//! ```ignore
//! use horizon_topbar::prelude::*;
//! ```

// ============================================================================
// Context and Icons
// ============================================================================

pub use crate::{
    Alignment, ChildPolicy, ContextConfig, DestroyPolicy, GroupKind, Icon, IconContext, IconError,
    IconId, IconSnapshot,
};

// ============================================================================
// Events and Bindings
// ============================================================================

pub use crate::{IconEvent, IconEventArgs, IconSignals, Key, ToggleItem};

// ============================================================================
// Core Primitives
// ============================================================================

pub use horizon_topbar_core::{IconState, Janitor, ManualScheduler, Scheduler, Signal, Subscription};

// ============================================================================
// Theme System
// ============================================================================

pub use horizon_topbar_style::prelude::*;
