//! Change feed for model mutations.
//!
//! Subscribers receive a [`ModelEvent`] whenever a field's value actually
//! changes. Each subscriber has a bounded buffer; a subscriber that falls
//! behind is dropped rather than blocking the writer.
//!
//! # Example
//!
//! ```ignore
//! let handle = model.subscribe(SubscriptionFilter::fields(vec!["regions".into()]));
//! model.append("regions", "north")?;
//!
//! match handle.try_recv() {
//!     Ok(ModelEvent::FieldChanged { field, value }) => println!("{field} = {value}"),
//!     _ => {}
//! }
//! ```

mod manager;
mod types;

pub use manager::{SubscriptionManager, DEFAULT_BUFFER_SIZE};
pub use types::{DropReason, ModelEvent, SubscriptionFilter, SubscriptionHandle, SubscriptionId};
