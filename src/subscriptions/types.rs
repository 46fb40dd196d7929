//! Subscription types for model change events.

use crate::field::FieldValue;
use serde::{Deserialize, Serialize};

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Restrict to these field names (None = all fields).
    pub fields: Option<Vec<String>>,
}

impl SubscriptionFilter {
    /// Subscribe to every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Subscribe to specific fields.
    pub fn fields(names: Vec<String>) -> Self {
        Self {
            fields: Some(names),
        }
    }

    pub(crate) fn matches_field(&self, name: &str) -> bool {
        match self.fields {
            Some(ref names) => names.iter().any(|n| n == name),
            None => true,
        }
    }
}

/// Events emitted to subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEvent {
    /// A field now holds a different value.
    FieldChanged { field: String, value: FieldValue },

    /// Every field was reset.
    Cleared,

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to receive events for one subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    pub receiver: crossbeam_channel::Receiver<ModelEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ModelEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ModelEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain every event currently buffered.
    pub fn drain(&self) -> Vec<ModelEvent> {
        self.receiver.try_iter().collect()
    }
}
