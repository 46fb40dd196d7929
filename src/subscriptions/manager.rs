//! Subscription manager for broadcasting model events.

use crate::field::FieldValue;
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{DropReason, ModelEvent, SubscriptionFilter, SubscriptionHandle, SubscriptionId};

/// Default per-subscriber buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

struct Subscription {
    filter: SubscriptionFilter,
    sender: Sender<ModelEvent>,
}

impl Subscription {
    /// Returns false if the buffer is full or the receiver is gone.
    fn try_send(&self, event: ModelEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    next_id: AtomicU64,
    buffer_size: usize,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a manager whose subscribers buffer `buffer_size` events (at least one).
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.buffer_size);

        self.subscriptions
            .write()
            .insert(id, Subscription { filter, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and notify the receiver (best effort).
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscriptions.write().remove(&id) {
            let _ = sub.sender.try_send(ModelEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Broadcast a field change to subscribers watching that field.
    pub fn broadcast_field_changed(&self, field: &str, value: FieldValue) {
        let event = ModelEvent::FieldChanged {
            field: field.to_string(),
            value,
        };

        self.broadcast(|sub| sub.filter.matches_field(field), event);
    }

    /// Broadcast a full reset to every subscriber.
    pub fn broadcast_cleared(&self) {
        self.broadcast(|_| true, ModelEvent::Cleared);
    }

    /// Drops subscribers that fail to receive.
    fn broadcast<F>(&self, filter: F, event: ModelEvent)
    where
        F: Fn(&Subscription) -> bool,
    {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if filter(sub) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    tracing::debug!(subscription = id.0, "dropping slow subscriber");
                    let _ = sub.sender.try_send(ModelEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
