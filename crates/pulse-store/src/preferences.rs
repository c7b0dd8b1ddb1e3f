use std::sync::Arc;

use tracing::{error, warn};

use pulse_types::models::ColorMode;

use crate::LocalStorage;

pub const COLOR_THEME_KEY: &str = "ui_color_theme";
pub const COLOR_MODE_KEY: &str = "ui_color_mode";

/// UI preference values. Stored as plain strings, not JSON.
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Arc<LocalStorage>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn color_theme(&self) -> Option<String> {
        self.storage.get_item(COLOR_THEME_KEY).unwrap_or_else(|e| {
            warn!("Color theme unreadable: {}", e);
            None
        })
    }

    pub fn set_color_theme(&self, theme_id: &str) -> bool {
        self.set(COLOR_THEME_KEY, theme_id)
    }

    /// Stored mode, or `light` when absent or unrecognised.
    pub fn color_mode(&self) -> ColorMode {
        match self.storage.get_item(COLOR_MODE_KEY) {
            Ok(Some(raw)) => raw.parse::<ColorMode>().unwrap_or_else(|e| {
                warn!("{}, using default", e);
                ColorMode::default()
            }),
            Ok(None) => ColorMode::default(),
            Err(e) => {
                warn!("Color mode unreadable: {}", e);
                ColorMode::default()
            }
        }
    }

    pub fn set_color_mode(&self, mode: ColorMode) -> bool {
        self.set(COLOR_MODE_KEY, mode.as_str())
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.storage.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<LocalStorage>, PreferenceStore) {
        let storage = Arc::new(LocalStorage::open_in_memory().unwrap());
        (storage.clone(), PreferenceStore::new(storage))
    }

    #[test]
    fn theme_round_trip() {
        let (storage, prefs) = store();
        assert_eq!(prefs.color_theme(), None);
        assert!(prefs.set_color_theme("ocean"));
        assert_eq!(prefs.color_theme().as_deref(), Some("ocean"));
        assert_eq!(storage.get_item(COLOR_THEME_KEY).unwrap().as_deref(), Some("ocean"));
    }

    #[test]
    fn mode_defaults_to_light() {
        let (_, prefs) = store();
        assert_eq!(prefs.color_mode(), ColorMode::Light);
        assert!(prefs.set_color_mode(ColorMode::Dark));
        assert_eq!(prefs.color_mode(), ColorMode::Dark);
    }

    #[test]
    fn unknown_mode_falls_back() {
        let (storage, prefs) = store();
        storage.set_item(COLOR_MODE_KEY, "sepia").unwrap();
        assert_eq!(prefs.color_mode(), ColorMode::Light);
    }
}
