//! # Notification Queue
//!
//! Ordered, capped list of ephemeral alerts with auto-expiry.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Notification Lifecycle                               │
//! │                                                                         │
//! │                         post()                                          │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                     ┌──────────┐   dismiss() / clear()  ┌───────────┐   │
//! │                     │ created  │───────────────────────►│ dismissed │   │
//! │                     │ (listed) │                        └───────────┘   │
//! │                     └────┬─────┘   over capacity        ┌───────────┐   │
//! │                          ├─────────────────────────────►│  evicted  │   │
//! │                          │                              └───────────┘   │
//! │                          │ timer fires                  ┌───────────┐   │
//! │                          └─────────────────────────────►│  expired  │   │
//! │                                                         └───────────┘   │
//! │  All end states are terminal.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timers
//! Each notification with an expiry gets one spawned task that sleeps and
//! then removes it. Dismissal aborts the task. The task also re-checks,
//! under the lock, that its id is still registered before touching the
//! list, so a timer that loses the race against `dismiss` is a no-op.
//! Timer tasks hold only a weak reference to the queue.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use mesa_core::{Notification, NotificationAction, NotificationKind};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::NotifyConfig;
use crate::error::{NotifyError, NotifyResult};

/// Buffered queue events per subscriber before lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Draft
// =============================================================================

/// Everything a producer supplies; the queue adds id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub expires_after: Option<Duration>,
    pub actions: Vec<NotificationAction>,
}

impl NotificationDraft {
    /// A persistent notification with no actions.
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        NotificationDraft {
            kind,
            title: title.into(),
            message: message.into(),
            expires_after: None,
            actions: Vec::new(),
        }
    }

    pub fn expires_after(mut self, delay: Duration) -> Self {
        self.expires_after = Some(delay);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.expires_after = None;
        self
    }

    pub fn action(mut self, label: impl Into<String>, effect: impl Into<String>) -> Self {
        self.actions.push(NotificationAction::new(label, effect));
        self
    }
}

// =============================================================================
// Events
// =============================================================================

/// Change feed for renderers and tests.
///
/// Every terminal transition emits exactly one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    Posted(Uuid),
    Dismissed(Uuid),
    Expired(Uuid),
    /// Dropped to stay within capacity.
    Evicted(Uuid),
    Cleared { count: usize },
}

// =============================================================================
// Queue
// =============================================================================

#[derive(Default)]
struct QueueState {
    /// Newest at the front.
    entries: VecDeque<Notification>,
    /// Armed expiry timers, keyed by notification id.
    timers: HashMap<Uuid, JoinHandle<()>>,
}

impl QueueState {
    fn remove_entry(&mut self, id: Uuid) -> bool {
        match self.entries.iter().position(|n| n.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    fn cancel_timer(&mut self, id: Uuid) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
    }
}

struct Shared {
    state: Mutex<QueueState>,
    events: broadcast::Sender<QueueEvent>,
    runtime: Handle,
    config: NotifyConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timer callback. Acts only if the id is still armed.
    fn expire(&self, id: Uuid) {
        let expired = {
            let mut state = self.lock();
            state.timers.remove(&id).is_some() && state.remove_entry(id)
        };

        if expired {
            debug!(id = %id, "Notification expired");
            let _ = self.events.send(QueueEvent::Expired(id));
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in state.timers.drain() {
            handle.abort();
        }
    }
}

/// Handle to a session's notification queue.
///
/// Cloning is cheap; all clones share one list.
#[derive(Clone)]
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("NotificationQueue")
            .field("len", &state.entries.len())
            .field("armed_timers", &state.timers.len())
            .field("capacity", &self.shared.config.capacity)
            .finish()
    }
}

impl NotificationQueue {
    /// Creates a queue bound to the current tokio runtime.
    ///
    /// ## Errors
    /// - `NoRuntime` when called outside a runtime
    /// - `InvalidConfig` when the config does not validate
    pub fn new(config: NotifyConfig) -> NotifyResult<Self> {
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    /// Creates a queue whose timers run on the given runtime.
    pub fn with_runtime(config: NotifyConfig, runtime: Handle) -> NotifyResult<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!(capacity = ?config.capacity, "Notification queue created");

        Ok(NotificationQueue {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                events,
                runtime,
                config,
            }),
        })
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.shared.config
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Posts a notification at the front of the list.
    ///
    /// Assigns a fresh id and timestamp, evicts the oldest entries if the
    /// queue is over capacity, and arms an expiry timer when the draft has
    /// one.
    pub fn post(&self, draft: NotificationDraft) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            created_at: Utc::now(),
            expires_after_ms: draft
                .expires_after
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            actions: draft.actions,
        };
        let id = notification.id;

        let mut evicted = Vec::new();
        {
            let mut state = self.shared.lock();
            state.entries.push_front(notification.clone());

            if let Some(capacity) = self.shared.config.capacity {
                while state.entries.len() > capacity {
                    if let Some(oldest) = state.entries.pop_back() {
                        state.cancel_timer(oldest.id);
                        evicted.push(oldest.id);
                    }
                }
            }

            // Armed under the lock so the timer can never observe the
            // entry without its registration.
            if let Some(delay) = draft.expires_after {
                let handle = self.spawn_expiry(id, delay);
                state.timers.insert(id, handle);
            }
        }

        debug!(
            id = %id,
            kind = %notification.kind,
            title = %notification.title,
            expires_after_ms = ?notification.expires_after_ms,
            "Notification posted"
        );
        let _ = self.shared.events.send(QueueEvent::Posted(id));

        for old in evicted {
            debug!(id = %old, "Notification evicted over capacity");
            let _ = self.shared.events.send(QueueEvent::Evicted(old));
        }

        notification
    }

    /// Posts using the configured default expiry for `kind`.
    pub fn post_with_defaults(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let mut draft = NotificationDraft::new(kind, title, message);
        draft.expires_after = self.shared.config.expiry.for_kind(kind);
        self.post(draft)
    }

    /// Removes a notification and cancels its timer.
    ///
    /// Returns `false` (and does nothing) if the id is not listed.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let removed = {
            let mut state = self.shared.lock();
            state.cancel_timer(id);
            state.remove_entry(id)
        };

        if removed {
            debug!(id = %id, "Notification dismissed");
            let _ = self.shared.events.send(QueueEvent::Dismissed(id));
        }
        removed
    }

    /// Removes every notification and cancels every pending timer.
    ///
    /// Returns how many were removed.
    pub fn clear(&self) -> usize {
        let count = {
            let mut state = self.shared.lock();
            for (_, handle) in state.timers.drain() {
                handle.abort();
            }
            let count = state.entries.len();
            state.entries.clear();
            count
        };

        debug!(count, "Notifications cleared");
        let _ = self.shared.events.send(QueueEvent::Cleared { count });
        count
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Active notifications, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.shared.lock().entries.iter().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<Notification> {
        self.shared
            .lock()
            .entries
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().entries.is_empty()
    }

    /// Number of expiry timers still armed.
    pub fn pending_timers(&self) -> usize {
        self.shared.lock().timers.len()
    }

    /// Subscribes to queue events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn spawn_expiry(&self, id: Uuid, delay: Duration) -> JoinHandle<()> {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        self.shared.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(id);
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::sleep;

    fn queue() -> NotificationQueue {
        NotificationQueue::new(NotifyConfig::unbounded()).unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<QueueEvent>) -> Vec<QueueEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    fn low_stock() -> NotificationDraft {
        NotificationDraft::new(NotificationKind::Warning, "Low Stock", "Tomatoes low")
            .expires_after(Duration::from_millis(8000))
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let err = NotificationQueue::new(NotifyConfig::default()).unwrap_err();
        assert_eq!(err, NotifyError::NoRuntime);
    }

    #[tokio::test]
    async fn test_new_rejects_zero_capacity() {
        let err = NotificationQueue::new(NotifyConfig::with_capacity(0)).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidConfig(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_assigns_id_and_prepends() {
        let queue = queue();
        let first = queue.post(NotificationDraft::new(NotificationKind::Info, "Order #1", "Table 4"));
        let second = queue.post(low_stock());

        assert_ne!(first.id, second.id);
        assert_eq!(second.expires_after_ms, Some(8000));
        assert!(first.is_persistent());

        let ids: Vec<Uuid> = queue.snapshot().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(queue.pending_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_no_later_than_deadline() {
        let queue = queue();
        let mut rx = queue.subscribe();
        let n = queue.post(
            NotificationDraft::new(NotificationKind::Success, "Order ready", "Table 2")
                .expires_after(Duration::from_millis(5000)),
        );

        sleep(Duration::from_millis(4999)).await;
        assert!(queue.get(n.id).is_some());

        sleep(Duration::from_millis(2)).await;
        assert!(queue.get(n.id).is_none());
        assert_eq!(queue.pending_timers(), 0);
        assert_eq!(
            drain(&mut rx),
            vec![QueueEvent::Posted(n.id), QueueEvent::Expired(n.id)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_before_expiry_prevents_timer_effect() {
        let queue = queue();
        let mut rx = queue.subscribe();
        let n = queue.post(
            NotificationDraft::new(NotificationKind::Warning, "Low Stock", "Basil low")
                .expires_after(Duration::from_millis(5000)),
        );

        sleep(Duration::from_millis(1000)).await;
        assert!(queue.dismiss(n.id));
        assert_eq!(queue.pending_timers(), 0);

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(
            drain(&mut rx),
            vec![QueueEvent::Posted(n.id), QueueEvent::Dismissed(n.id)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_idempotent() {
        let queue = queue();
        let mut rx = queue.subscribe();
        let n = queue.post(NotificationDraft::new(NotificationKind::Urgent, "Waiter", "Table 9"));

        assert!(queue.dismiss(n.id));
        assert!(!queue.dismiss(n.id));
        assert!(!queue.dismiss(Uuid::new_v4()));
        assert_eq!(
            drain(&mut rx),
            vec![QueueEvent::Posted(n.id), QueueEvent::Dismissed(n.id)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_timers() {
        let queue = queue();
        let mut rx = queue.subscribe();
        let n = queue.post(low_stock());
        queue.post(NotificationDraft::new(NotificationKind::Urgent, "Waiter", "Table 3"));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.pending_timers(), 0);

        sleep(Duration::from_millis(9000)).await;
        let events = drain(&mut rx);
        assert!(!events.contains(&QueueEvent::Expired(n.id)));
        assert_eq!(events.last(), Some(&QueueEvent::Cleared { count: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_only_removes_its_own_entry() {
        let queue = queue();
        let short = queue.post(
            NotificationDraft::new(NotificationKind::Info, "Order placed", "Table 1")
                .expires_after(Duration::from_millis(1000)),
        );
        let sticky = queue.post(NotificationDraft::new(NotificationKind::Urgent, "Waiter", "Table 5"));

        sleep(Duration::from_millis(1500)).await;
        let ids: Vec<Uuid> = queue.snapshot().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![sticky.id]);
        assert!(queue.get(short.id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest_and_its_timer() {
        let queue = NotificationQueue::new(NotifyConfig::with_capacity(2)).unwrap();
        let mut rx = queue.subscribe();

        let a = queue.post(low_stock());
        let b = queue.post(low_stock());
        let c = queue.post(low_stock());

        let ids: Vec<Uuid> = queue.snapshot().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![c.id, b.id]);
        assert_eq!(queue.pending_timers(), 2);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                QueueEvent::Posted(a.id),
                QueueEvent::Posted(b.id),
                QueueEvent::Posted(c.id),
                QueueEvent::Evicted(a.id),
            ]
        );

        sleep(Duration::from_millis(8001)).await;
        let events = drain(&mut rx);
        assert!(!events.contains(&QueueEvent::Expired(a.id)));
        assert!(events.contains(&QueueEvent::Expired(b.id)));
        assert!(events.contains(&QueueEvent::Expired(c.id)));
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_with_defaults_uses_kind_expiry() {
        let queue = queue();
        let urgent = queue.post_with_defaults(NotificationKind::Urgent, "Kitchen", "Delay on #12");
        let warning = queue.post_with_defaults(NotificationKind::Warning, "Low Stock", "Tomatoes low");

        assert!(urgent.is_persistent());
        assert_eq!(warning.expires_after_ms, Some(8000));
        assert_eq!(queue.pending_timers(), 1);

        sleep(Duration::from_millis(8001)).await;
        assert_eq!(queue.len(), 1);
        assert!(queue.get(urgent.id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let queue = queue();
        let other = queue.clone();
        let n = queue.post(NotificationDraft::new(NotificationKind::Info, "Hi", "there").action("Open", "open:menu"));

        assert_eq!(other.len(), 1);
        assert_eq!(other.get(n.id).unwrap().actions[0].effect, "open:menu");
        assert!(other.dismiss(n.id));
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_queue_with_armed_timers_is_quiet() {
        let queue = queue();
        queue.post(low_stock());
        drop(queue);

        sleep(Duration::from_millis(9000)).await;
    }
}
