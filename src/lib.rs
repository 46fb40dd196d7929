//! # Code-Set State
//!
//! A fixed-key state container for view models. Each field is either a
//! scalar string or a code set: an ordered, duplicate-free list of
//! hierarchical codes such as `"region"` or `"region_north"`.
//!
//! ## Core Concepts
//!
//! - **Fields**: immutable values, replaced wholesale on every mutation
//! - **Code sets**: a bare parent and any of its qualified children never coexist
//! - **Model**: a frozen key set with `append`, `remove`, `clear_field`, `clear_state`
//! - **Snapshots**: point-in-time copies detached from the model
//! - **Form export**: one hidden input per field for submission
//!
//! ## Example
//!
//! ```ignore
//! use codeset_state::{InitialStateBuilder, Model};
//!
//! let initial = InitialStateBuilder::new()
//!     .with("query", "")
//!     .with("regions", vec!["north_1", "north_2"])
//!     .build();
//! let mut model = Model::new(initial)?;
//!
//! // Selecting the parent collapses its children
//! model.append("regions", "north")?;
//! assert_eq!(model.get("regions")?.to_string(), "north");
//! ```

pub mod builder;
pub mod code;
pub mod error;
pub mod export;
pub mod field;
pub mod model;
pub mod shared;
pub mod subscriptions;

// Re-exports
pub use builder::{InitialState, InitialStateBuilder};
pub use code::{Code, Delimiter, DEFAULT_DELIMITER};
pub use error::{Result, StateError};
pub use export::{FormExport, FormSink, HiddenInput, HtmlFormSink};
pub use field::{CodeSet, Field, FieldKind, FieldValue, RawValue, EXPORT_SEPARATOR};
pub use model::{Model, ModelConfig, StateSnapshot};
pub use shared::SharedModel;
pub use subscriptions::{
    DropReason, ModelEvent, SubscriptionFilter, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
