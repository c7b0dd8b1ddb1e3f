use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use pulse_types::api::{ActionStats, SaveActionRequest};
use pulse_types::models::{ActionKind, ActionRecord, ProfileId};

use crate::error::Result;
use crate::{DEFAULT_HISTORY_LIMIT, LocalStorage};

/// Storage key holding the JSON array of action records.
pub const ACTION_HISTORY_KEY: &str = "discovery_action_history";

/// Most-recent-first log of swipe decisions, capped at `max_entries`.
///
/// Nothing here returns an error to the caller: unreadable history reads as
/// empty and failed writes come back as `false`, with the cause logged.
#[derive(Clone)]
pub struct ActionStore {
    storage: Arc<LocalStorage>,
    max_entries: usize,
}

impl ActionStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self::with_limit(storage, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(storage: Arc<LocalStorage>, max_entries: usize) -> Self {
        Self {
            storage,
            max_entries,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Log a decision. Returns `false` if the write did not happen.
    pub fn save_action(&self, req: SaveActionRequest) -> bool {
        self.record_action(req).is_some()
    }

    /// Like `save_action`, but hands back the record that was written.
    pub fn record_action(&self, req: SaveActionRequest) -> Option<ActionRecord> {
        self.record_action_at(req, Utc::now())
    }

    pub(crate) fn record_action_at(
        &self,
        req: SaveActionRequest,
        timestamp: DateTime<Utc>,
    ) -> Option<ActionRecord> {
        let record = ActionRecord {
            profile_id: req.profile_id,
            profile_name: req.profile_name,
            action: req.action,
            photo_index: req.photo_index,
            timestamp,
        };

        match self.prepend(&record) {
            Ok(len) => {
                debug!(
                    "Saved {} on profile {} ({} records)",
                    record.action, record.profile_id, len
                );
                Some(record)
            }
            Err(e) => {
                error!("Failed to save {} action: {}", record.action, e);
                None
            }
        }
    }

    fn prepend(&self, record: &ActionRecord) -> Result<usize> {
        self.storage
            .update_json(ACTION_HISTORY_KEY, |current: Result<Option<Vec<ActionRecord>>>| {
                let mut history = current?.unwrap_or_default();
                history.insert(0, record.clone());
                history.truncate(self.max_entries);
                let len = history.len();
                Ok((history, len))
            })
    }

    fn load(&self) -> Result<Vec<ActionRecord>> {
        Ok(self
            .storage
            .read_json::<Vec<ActionRecord>>(ACTION_HISTORY_KEY)?
            .unwrap_or_default())
    }

    /// Full history, most recent first, optionally narrowed to one kind.
    pub fn get_action_history(&self, filter: Option<ActionKind>) -> Vec<ActionRecord> {
        let history = match self.load() {
            Ok(history) => history,
            Err(e) => {
                warn!("Action history unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match filter {
            Some(kind) => history.into_iter().filter(|r| r.action == kind).collect(),
            None => history,
        }
    }

    /// Counts over the whole history, with `today_count` for the local date.
    pub fn get_action_stats(&self) -> ActionStats {
        self.get_action_stats_on(Local::now().date_naive())
    }

    pub fn get_action_stats_on(&self, day: NaiveDate) -> ActionStats {
        let mut stats = ActionStats::default();

        for record in self.get_action_history(None) {
            stats.total += 1;
            match record.action {
                ActionKind::Pass => stats.passes += 1,
                ActionKind::Favorite => stats.favorites += 1,
                ActionKind::Connect => stats.connects += 1,
            }
            if record.timestamp.with_timezone(&Local).date_naive() == day {
                stats.today_count += 1;
            }
        }

        stats
    }

    pub fn clear_history(&self) -> bool {
        match self.storage.remove_item(ACTION_HISTORY_KEY) {
            Ok(()) => {
                info!("Action history cleared");
                true
            }
            Err(e) => {
                error!("Failed to clear action history: {}", e);
                false
            }
        }
    }

    /// Most recent decision on `profile_id`, if any.
    pub fn get_previous_action(&self, profile_id: &ProfileId) -> Option<ActionRecord> {
        self.get_action_history(None)
            .into_iter()
            .find(|r| &r.profile_id == profile_id)
    }

    /// Every profile with at least one logged decision.
    pub fn decided_profile_ids(&self) -> HashSet<ProfileId> {
        self.get_action_history(None)
            .into_iter()
            .map(|r| r.profile_id)
            .collect()
    }
}
