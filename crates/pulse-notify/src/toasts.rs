use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};
use uuid::Uuid;

use pulse_types::api::ToastRequest;
use pulse_types::events::NotifyEvent;
use pulse_types::models::Toast;

use crate::dispatcher::Dispatcher;

/// Change to the visible toast list, for whatever renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastUpdate {
    Shown(Toast),
    Expired(Uuid),
    Dismissed(Uuid),
}

/// Ordered list of on-screen toasts with per-toast auto-dismiss timers.
///
/// `show` and `dismiss` are synchronous; expiry runs on a tokio task per
/// toast, which is aborted if the toast is dismissed first.
#[derive(Clone)]
pub struct ToastCenter {
    inner: Arc<ToastInner>,
}

struct ToastInner {
    /// Creation order
    toasts: Mutex<Vec<ActiveToast>>,
    default_duration: Duration,
    updates_tx: broadcast::Sender<ToastUpdate>,
}

struct ActiveToast {
    toast: Toast,
    timer: Option<JoinHandle<()>>,
}

impl ToastInner {
    fn lock(&self) -> MutexGuard<'_, Vec<ActiveToast>> {
        // A panic mid-update cannot leave the Vec half-written
        self.toasts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn expire(&self, id: Uuid) {
        let removed = {
            let mut toasts = self.lock();
            match toasts.iter().position(|t| t.toast.id == id) {
                Some(pos) => {
                    toasts.remove(pos);
                    true
                }
                None => false,
            }
        };

        if removed {
            debug!("Toast {} expired", id);
            let _ = self.updates_tx.send(ToastUpdate::Expired(id));
        }
    }
}

impl ToastCenter {
    pub fn new(default_duration: Duration) -> Self {
        let (updates_tx, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(ToastInner {
                toasts: Mutex::new(Vec::new()),
                default_duration,
                updates_tx,
            }),
        }
    }

    /// Add a toast to the end of the list and schedule its removal.
    ///
    /// Outside a tokio runtime the toast is still shown but stays until
    /// dismissed.
    pub fn show(&self, req: ToastRequest) -> Uuid {
        let duration = req
            .duration
            .map(Duration::from_millis)
            .unwrap_or(self.inner.default_duration);

        let toast = Toast {
            id: Uuid::new_v4(),
            message: req.message,
            kind: req.kind,
            duration: duration.as_millis() as u64,
            profile_name: req.profile_name,
        };
        let id = toast.id;

        {
            // Timer is spawned under the lock so it cannot fire before the push
            let mut toasts = self.inner.lock();
            let timer = self.spawn_timer(id, duration);
            toasts.push(ActiveToast {
                toast: toast.clone(),
                timer,
            });
        }

        debug!("Toast {} shown for {:?}: {}", id, duration, toast.message);
        let _ = self.inner.updates_tx.send(ToastUpdate::Shown(toast));
        id
    }

    fn spawn_timer(&self, id: Uuid, duration: Duration) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, toast {} will not auto-dismiss", id);
            return None;
        };

        let deadline = Instant::now() + duration;
        let inner: Weak<ToastInner> = Arc::downgrade(&self.inner);
        Some(handle.spawn(async move {
            sleep_until(deadline).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire(id);
            }
        }))
    }

    /// Remove a toast before it expires. Returns `false` if it is already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let removed = {
            let mut toasts = self.inner.lock();
            let pos = toasts.iter().position(|t| t.toast.id == id);
            pos.map(|pos| toasts.remove(pos))
        };

        match removed {
            Some(active) => {
                if let Some(timer) = active.timer {
                    timer.abort();
                }
                debug!("Toast {} dismissed", id);
                let _ = self.inner.updates_tx.send(ToastUpdate::Dismissed(id));
                true
            }
            None => false,
        }
    }

    /// Toasts currently on screen, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        self.inner.lock().iter().map(|t| t.toast.clone()).collect()
    }

    pub fn updates(&self) -> broadcast::Receiver<ToastUpdate> {
        self.inner.updates_tx.subscribe()
    }

    /// Subscribe to the bus and show every toast event published on it.
    ///
    /// The subscription exists once this returns, so events published
    /// afterwards are never missed. Outside a tokio runtime nothing is
    /// subscribed and `None` is returned.
    pub fn attach(&self, dispatcher: &Dispatcher) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, toast listener not attached");
            return None;
        };
        let mut rx = dispatcher.subscribe();
        let center = self.clone();

        Some(handle.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(NotifyEvent::Toast(req)) => {
                        center.show(req);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Toast listener lagged, {} events dropped", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Toast listener stopped");
        }))
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(crate::NotifyConfig::default().default_toast_duration)
    }
}
