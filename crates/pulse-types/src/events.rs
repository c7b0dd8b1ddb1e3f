use serde::{Deserialize, Serialize};

use crate::api::ToastRequest;
use crate::models::ActionRecord;

/// Events published on the notification bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NotifyEvent {
    /// Ask any attached notifier to show a toast
    Toast(ToastRequest),

    /// A swipe decision was written to the action log
    ActionSaved { record: ActionRecord },

    /// The action log was wiped
    HistoryCleared,
}

impl NotifyEvent {
    /// Returns the toast request if this event should put something on screen.
    pub fn toast(&self) -> Option<&ToastRequest> {
        match self {
            Self::Toast(req) => Some(req),
            _ => None,
        }
    }
}
