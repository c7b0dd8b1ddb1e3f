use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use pulse_types::api::ToastRequest;
use pulse_types::events::NotifyEvent;

/// Event bus between producers and whatever renders notifications.
///
/// Producers hold a clone and call `publish`; consumers call `subscribe` once
/// at startup. Nothing is global.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Every subscriber receives every event
    broadcast_tx: broadcast::Sender<NotifyEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(DispatcherInner { broadcast_tx }),
        }
    }

    /// Subscribe to notification events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<NotifyEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcast_tx.receiver_count()
    }

    /// Publish an event. With nobody subscribed yet the event is dropped with
    /// a warning and `false` is returned.
    pub fn publish(&self, event: NotifyEvent) -> bool {
        match self.inner.broadcast_tx.send(event) {
            Ok(receivers) => {
                debug!("Published notify event to {} subscriber(s)", receivers);
                true
            }
            Err(broadcast::error::SendError(event)) => {
                warn!(
                    "Notification system not initialized, dropping event: {:?}",
                    event
                );
                false
            }
        }
    }

    /// Shorthand for publishing a toast request.
    pub fn toast(&self, req: ToastRequest) -> bool {
        self.publish(NotifyEvent::Toast(req))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
