//! Logging helpers on top of `tracing`.

/// Target used for positive outcomes, rendered with its own symbol by the cli formatter.
pub const SUCCESS_TARGET: &str = "fleetcap::success";

/// Logs a successful outcome at `INFO` level on the [`SUCCESS_TARGET`] target.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "fleetcap::success", $($arg)*)
    };
}
