use serde::{Deserialize, Serialize};

use crate::models::{ActionKind, ProfileId, ToastKind};

// -- Actions --

/// Input to a swipe save. The timestamp is assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveActionRequest {
    pub profile_id: ProfileId,
    pub profile_name: String,
    pub action: ActionKind,
    pub photo_index: u32,
}

/// Aggregate counts over the whole action history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStats {
    pub total: usize,
    pub passes: usize,
    pub favorites: usize,
    pub connects: usize,
    pub today_count: usize,
}

// -- Toasts --

/// Default on-screen time of a toast, in milliseconds.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// A toast to be shown. `duration` falls back to the notifier default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastRequest {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub duration: Option<u64>,
    pub profile_name: Option<String>,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: None,
            profile_name: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn for_profile(mut self, name: impl Into<String>) -> Self {
        self.profile_name = Some(name.into());
        self
    }
}
