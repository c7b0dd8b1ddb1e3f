use std::sync::Arc;

use tracing::info;

use pulse_notify::Dispatcher;
use pulse_store::{ActionStore, LocalStorage, PulseAnswerStore};
use pulse_types::api::{SaveActionRequest, ToastRequest};
use pulse_types::events::NotifyEvent;
use pulse_types::models::{ActionKind, ProfileId, PulseAnswer, ToastKind};

/// Discovery screen logic: writes decisions and answers, and tells the bus
/// what happened. Never holds a reference to whatever renders the toasts.
pub struct DiscoverySession {
    actions: ActionStore,
    pulse: PulseAnswerStore,
    dispatcher: Dispatcher,
}

impl DiscoverySession {
    pub fn new(storage: Arc<LocalStorage>, history_limit: usize, dispatcher: Dispatcher) -> Self {
        Self {
            actions: ActionStore::with_limit(storage.clone(), history_limit),
            pulse: PulseAnswerStore::new(storage),
            dispatcher,
        }
    }

    pub fn actions(&self) -> &ActionStore {
        &self.actions
    }

    pub fn pulse(&self) -> &PulseAnswerStore {
        &self.pulse
    }

    /// Log a swipe and announce it. A failed save publishes nothing; the
    /// user sees no error.
    pub fn record_swipe(
        &self,
        profile_id: ProfileId,
        profile_name: &str,
        action: ActionKind,
        photo_index: u32,
    ) -> bool {
        let Some(record) = self.actions.record_action(SaveActionRequest {
            profile_id,
            profile_name: profile_name.to_string(),
            action,
            photo_index,
        }) else {
            return false;
        };

        let toast = match action {
            ActionKind::Connect => Some(
                ToastRequest::new(ToastKind::Match, format!("It's a match with {}!", profile_name))
                    .for_profile(profile_name),
            ),
            ActionKind::Favorite => Some(
                ToastRequest::new(
                    ToastKind::Success,
                    format!("{} saved to favorites", profile_name),
                )
                .for_profile(profile_name),
            ),
            ActionKind::Pass => None,
        };

        self.dispatcher.publish(NotifyEvent::ActionSaved { record });
        if let Some(toast) = toast {
            self.dispatcher.toast(toast);
        }
        true
    }

    /// Store a revealed answer to one of a profile's pulse questions.
    pub fn answer_pulse(
        &self,
        profile_id: &ProfileId,
        question_index: usize,
        value: bool,
        result: &str,
    ) -> bool {
        self.pulse.save_pulse_answer(
            profile_id,
            question_index,
            PulseAnswer {
                value,
                result: result.to_string(),
                revealed: true,
            },
        )
    }

    pub fn clear_history(&self) -> bool {
        if !self.actions.clear_history() {
            return false;
        }
        info!("Discovery history reset");
        self.dispatcher.publish(NotifyEvent::HistoryCleared);
        self.dispatcher
            .toast(ToastRequest::new(ToastKind::Info, "Swipe history cleared"));
        true
    }
}
