//! In-process notifications: an event bus that decouples producers (stores,
//! session logic) from the toast list that a front end renders.

pub mod dispatcher;
pub mod toasts;

use std::time::Duration;

use pulse_types::api::DEFAULT_TOAST_DURATION_MS;

pub use dispatcher::Dispatcher;
pub use toasts::{ToastCenter, ToastUpdate};

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Used when a toast request carries no duration.
    pub default_toast_duration: Duration,
    /// Events buffered per subscriber before it starts lagging.
    pub bus_capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            default_toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            bus_capacity: 256,
        }
    }
}
