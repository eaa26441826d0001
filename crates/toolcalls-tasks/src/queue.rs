//! In-process, visibility-timeout-based work queue backing the PhaseManager.
//!
//! The local analogue of an SQS-style queue: `Enqueue` pushes a key onto
//! the pending list; `Dequeue` hands it to exactly one caller at a time by
//! stamping it with a receipt handle and a visibility deadline recorded in
//! a delivery table; `ExtendTime` pushes the deadline out for a lease still
//! held; `Delete` finalizes it. A background sweeper requeues deliveries
//! whose deadline has elapsed and drops (logging as poison) any delivery
//! that has been redelivered past [`PhaseQueue::poison_threshold`].

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Identifies the ToolCall a queued phase message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolCallKey {
    pub tenant: String,
    pub tool_name: String,
    pub id: String,
}

impl ToolCallKey {
    pub fn new(tenant: impl Into<String>, tool_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            tool_name: tool_name.into(),
            id: id.into(),
        }
    }
}

struct Delivery {
    key: ToolCallKey,
    attempt: u32,
    deadline: Instant,
}

/// Default visibility timeout applied to a freshly dequeued message.
pub const DEFAULT_VISIBILITY: Duration = Duration::from_secs(30);

/// Messages redelivered this many times are considered poison.
pub const POISON_THRESHOLD: u32 = 3;

/// An in-memory visibility-timeout queue.
pub struct PhaseQueue {
    pending: Mutex<VecDeque<ToolCallKey>>,
    inflight: Mutex<HashMap<String, Delivery>>,
    notify: Notify,
    visibility_timeout: Duration,
    poison_threshold: u32,
}

impl Default for PhaseQueue {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY, POISON_THRESHOLD)
    }
}

impl PhaseQueue {
    pub fn new(visibility_timeout: Duration, poison_threshold: u32) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            inflight: Mutex::new(HashMap::new()),
            notify: Notify::new(),
            visibility_timeout,
            poison_threshold,
        }
    }

    /// Pushes `key` onto the pending list, waking one waiting dequeuer.
    pub fn enqueue(&self, key: ToolCallKey) {
        self.pending.lock().push_back(key);
        self.notify.notify_one();
    }

    /// Pops the next message, stamping it with a fresh receipt handle and a
    /// visibility deadline. Returns `None` if the queue is empty right now;
    /// callers that want to block should await [`Self::notified`] and retry.
    pub fn try_dequeue(&self) -> Option<(String, ToolCallKey)> {
        let key = self.pending.lock().pop_front()?;
        let receipt = uuid::Uuid::new_v4().to_string();
        self.inflight.lock().insert(
            receipt.clone(),
            Delivery {
                key: key.clone(),
                attempt: 0,
                deadline: Instant::now() + self.visibility_timeout,
            },
        );
        Some((receipt, key))
    }

    /// Resolves once a message may be available; callers should still
    /// retry [`Self::try_dequeue`] in a loop (spurious wakeups are fine).
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Extends the visibility deadline for `receipt`, if still owned.
    /// Returns `false` if the receipt has already expired or been deleted.
    pub fn extend_time(&self, receipt: &str, duration: Duration) -> bool {
        let mut inflight = self.inflight.lock();
        match inflight.get_mut(receipt) {
            Some(delivery) => {
                delivery.deadline = Instant::now() + duration;
                true
            }
            None => false,
        }
    }

    /// Finalizes `receipt`, removing it from the delivery table.
    pub fn delete(&self, receipt: &str) -> bool {
        self.inflight.lock().remove(receipt).is_some()
    }

    /// Scans for deliveries whose deadline has elapsed. Requeues them
    /// (bumping `attempt`) unless they have reached the poison threshold,
    /// in which case they are dropped and their keys returned for logging.
    pub fn sweep(&self) -> Vec<ToolCallKey> {
        let now = Instant::now();
        let mut expired_receipts = Vec::new();
        {
            let inflight = self.inflight.lock();
            for (receipt, delivery) in inflight.iter() {
                if delivery.deadline <= now {
                    expired_receipts.push(receipt.clone());
                }
            }
        }

        let mut poisoned = Vec::new();
        let mut inflight = self.inflight.lock();
        let mut pending = self.pending.lock();
        for receipt in expired_receipts {
            if let Some(delivery) = inflight.remove(&receipt) {
                if delivery.attempt >= self.poison_threshold {
                    poisoned.push(delivery.key);
                } else {
                    pending.push_back(delivery.key.clone());
                    inflight.insert(
                        uuid::Uuid::new_v4().to_string(),
                        Delivery {
                            key: delivery.key,
                            attempt: delivery.attempt + 1,
                            deadline: now + self.visibility_timeout,
                        },
                    );
                }
            }
        }
        drop(inflight);
        drop(pending);
        self.notify.notify_waiters();
        poisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> ToolCallKey {
        ToolCallKey::new("t1", "count", id)
    }

    #[test]
    fn enqueue_then_dequeue_returns_the_key() {
        let queue = PhaseQueue::default();
        queue.enqueue(key("a"));
        let (_, dequeued) = queue.try_dequeue().unwrap();
        assert_eq!(dequeued.id, "a");
    }

    #[test]
    fn dequeue_on_empty_queue_returns_none() {
        let queue = PhaseQueue::default();
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn same_message_cannot_be_dequeued_twice_concurrently() {
        let queue = PhaseQueue::default();
        queue.enqueue(key("a"));
        assert!(queue.try_dequeue().is_some());
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn delete_finalizes_a_delivery() {
        let queue = PhaseQueue::default();
        queue.enqueue(key("a"));
        let (receipt, _) = queue.try_dequeue().unwrap();
        assert!(queue.delete(&receipt));
        assert!(!queue.delete(&receipt));
    }

    #[test]
    fn extend_time_fails_for_unknown_receipt() {
        let queue = PhaseQueue::default();
        assert!(!queue.extend_time("nonexistent", Duration::from_secs(5)));
    }

    #[test]
    fn extend_time_succeeds_for_live_receipt() {
        let queue = PhaseQueue::default();
        queue.enqueue(key("a"));
        let (receipt, _) = queue.try_dequeue().unwrap();
        assert!(queue.extend_time(&receipt, Duration::from_secs(60)));
    }

    #[test]
    fn sweep_requeues_expired_delivery() {
        let queue = PhaseQueue::new(Duration::from_millis(0), POISON_THRESHOLD);
        queue.enqueue(key("a"));
        queue.try_dequeue().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let poisoned = queue.sweep();
        assert!(poisoned.is_empty());
        assert!(queue.try_dequeue().is_some());
    }

    #[test]
    fn sweep_drops_message_past_poison_threshold() {
        // threshold=1 allows one redelivery (attempt 0 -> requeued as attempt 1)
        // before the second expiry poisons it.
        let queue = PhaseQueue::new(Duration::from_millis(0), 1);
        queue.enqueue(key("a"));
        queue.try_dequeue().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let first_sweep = queue.sweep();
        assert!(first_sweep.is_empty());

        queue.try_dequeue().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let poisoned = queue.sweep();
        assert_eq!(poisoned.len(), 1);
        assert_eq!(poisoned[0].id, "a");
        assert!(queue.try_dequeue().is_none());
    }
}
