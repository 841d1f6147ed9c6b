//! Logging facilities for Horizon Topbar.
//!
//! Horizon Topbar uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_topbar=debug,horizon_topbar_core::signal=trace")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`] below, so each can be
//! filtered independently. The icon hierarchy can be dumped with
//! `horizon_topbar::IconTreeDebug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_topbar_core::signal";
    /// Scheduler target.
    pub const SCHEDULER: &str = "horizon_topbar_core::scheduler";
    /// Janitor (resource cleanup) target.
    pub const JANITOR: &str = "horizon_topbar_core::janitor";
    /// Icon lifecycle and state machine target.
    pub const ICON: &str = "horizon_topbar::icon";
    /// Theme modification and resolution target.
    pub const THEME: &str = "horizon_topbar::theme";
    /// Dropdown/menu grouping target.
    pub const GROUP: &str = "horizon_topbar::group";
    /// Notice accumulation target.
    pub const NOTICE: &str = "horizon_topbar::notice";
    /// Key and item binding target.
    pub const BINDING: &str = "horizon_topbar::binding";
}

