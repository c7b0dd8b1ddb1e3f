use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use pulse_types::models::{ProfileId, PulseAnswer};

use crate::LocalStorage;
use crate::error::Result;

/// Answers for one profile, keyed by position in its question list.
pub type PulseAnswers = BTreeMap<usize, PulseAnswer>;

pub fn pulse_key(profile_id: &ProfileId) -> String {
    format!("pulse_answers_{}", profile_id)
}

/// Per-profile pulse check answers. Re-answering a question overwrites it.
#[derive(Clone)]
pub struct PulseAnswerStore {
    storage: Arc<LocalStorage>,
}

impl PulseAnswerStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn save_pulse_answer(
        &self,
        profile_id: &ProfileId,
        question_index: usize,
        answer: PulseAnswer,
    ) -> bool {
        let key = pulse_key(profile_id);
        let saved = self
            .storage
            .update_json(&key, |current: Result<Option<PulseAnswers>>| {
                let mut answers = current
                    .unwrap_or_else(|e| {
                        warn!("Pulse answers unreadable, starting over: {}", e);
                        None
                    })
                    .unwrap_or_default();
                answers.insert(question_index, answer);
                Ok((answers, ()))
            });

        match saved {
            Ok(()) => {
                debug!(
                    "Saved pulse answer {} for profile {}",
                    question_index, profile_id
                );
                true
            }
            Err(e) => {
                error!("Failed to save pulse answer for {}: {}", profile_id, e);
                false
            }
        }
    }

    pub fn load_pulse_answers(&self, profile_id: &ProfileId) -> PulseAnswers {
        self.read_or_empty(&pulse_key(profile_id))
    }

    pub fn clear_pulse_answers(&self, profile_id: &ProfileId) -> bool {
        match self.storage.remove_item(&pulse_key(profile_id)) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to clear pulse answers for {}: {}", profile_id, e);
                false
            }
        }
    }

    fn read_or_empty(&self, key: &str) -> PulseAnswers {
        let read: Result<Option<PulseAnswers>> = self.storage.read_json(key);
        match read {
            Ok(answers) => answers.unwrap_or_default(),
            Err(e) => {
                warn!("Pulse answers unreadable, treating as empty: {}", e);
                PulseAnswers::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<LocalStorage>, PulseAnswerStore) {
        let storage = Arc::new(LocalStorage::open_in_memory().unwrap());
        (storage.clone(), PulseAnswerStore::new(storage))
    }

    fn answer(value: bool, result: &str) -> PulseAnswer {
        PulseAnswer {
            value,
            result: result.to_string(),
            revealed: true,
        }
    }

    #[test]
    fn save_then_load() {
        let (_, store) = store();
        let pid = ProfileId::Int(12);
        assert!(store.save_pulse_answer(&pid, 0, answer(true, "match")));

        let answers = store.load_pulse_answers(&pid);
        assert_eq!(answers.len(), 1);
        assert!(answers[&0].value);
        assert_eq!(answers[&0].result, "match");
    }

    #[test]
    fn unknown_profile_is_empty_map() {
        let (_, store) = store();
        assert!(store.load_pulse_answers(&ProfileId::Int(404)).is_empty());
    }

    #[test]
    fn re_answer_overwrites_in_place() {
        let (_, store) = store();
        let pid = ProfileId::Text("dr-ng".into());
        store.save_pulse_answer(&pid, 2, answer(true, "match"));
        store.save_pulse_answer(&pid, 0, answer(false, "miss"));
        store.save_pulse_answer(&pid, 2, answer(false, "miss"));

        let answers = store.load_pulse_answers(&pid);
        assert_eq!(answers.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert!(!answers[&2].value);
    }

    #[test]
    fn profiles_are_isolated() {
        let (_, store) = store();
        store.save_pulse_answer(&ProfileId::Int(1), 0, answer(true, "match"));
        assert!(store.load_pulse_answers(&ProfileId::Int(2)).is_empty());
    }

    #[test]
    fn stored_as_object_keyed_by_index() {
        let (storage, store) = store();
        let pid = ProfileId::Int(5);
        store.save_pulse_answer(&pid, 3, answer(true, "match"));

        let raw = storage.get_item(&pulse_key(&pid)).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["3"]["value"], true);
        assert_eq!(json["3"]["revealed"], true);
    }

    #[test]
    fn corrupt_map_is_replaced_on_save() {
        let (storage, store) = store();
        let pid = ProfileId::Int(8);
        storage.set_item(&pulse_key(&pid), "oops").unwrap();

        assert!(store.load_pulse_answers(&pid).is_empty());
        assert!(store.save_pulse_answer(&pid, 1, answer(true, "match")));
        assert_eq!(store.load_pulse_answers(&pid).len(), 1);
    }

    #[test]
    fn concurrent_answers_to_one_profile_all_land() {
        let (_, store) = store();
        let pid = ProfileId::Int(21);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let pid = pid.clone();
                std::thread::spawn(move || {
                    assert!(store.save_pulse_answer(&pid, i, answer(i % 2 == 0, "match")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load_pulse_answers(&pid).len(), 8);
    }

    #[test]
    fn clear_removes_profile_answers() {
        let (_, store) = store();
        let pid = ProfileId::Int(3);
        store.save_pulse_answer(&pid, 0, answer(true, "match"));
        assert!(store.clear_pulse_answers(&pid));
        assert!(store.load_pulse_answers(&pid).is_empty());
    }
}
