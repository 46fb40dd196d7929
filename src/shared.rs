//! Thread-safe handle to a model.
//!
//! Each mutation reads the current field and writes its replacement under
//! one write lock, so two appends never interleave between read and write.

use crate::error::Result;
use crate::export::FormExport;
use crate::field::FieldValue;
use crate::model::{Model, StateSnapshot};
use crate::subscriptions::{SubscriptionFilter, SubscriptionHandle, SubscriptionId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, single-writer handle to a [`Model`].
#[derive(Clone)]
pub struct SharedModel {
    inner: Arc<RwLock<Model>>,
}

impl SharedModel {
    pub fn new(model: Model) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    pub fn append(&self, name: &str, code: &str) -> Result<()> {
        self.inner.write().append(name, code)
    }

    pub fn remove(&self, name: &str, code: &str) -> Result<()> {
        self.inner.write().remove(name, code)
    }

    pub fn clear_field(&self, name: &str) -> Result<()> {
        self.inner.write().clear_field(name)
    }

    pub fn clear_state(&self) {
        self.inner.write().clear_state()
    }

    /// Run several mutations as one step; no other writer sees the
    /// intermediate state.
    pub fn update<T>(&self, f: impl FnOnce(&mut Model) -> Result<T>) -> Result<T> {
        f(&mut *self.inner.write())
    }

    pub fn state(&self) -> StateSnapshot {
        self.inner.read().state()
    }

    pub fn get(&self, name: &str) -> Result<FieldValue> {
        self.inner.read().get(name)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().to_vec()
    }

    pub fn export_form(&self) -> FormExport {
        self.inner.read().export_form()
    }

    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        self.inner.read().subscribe(filter)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.read().unsubscribe(id)
    }
}

impl From<Model> for SharedModel {
    fn from(model: Model) -> Self {
        Self::new(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InitialStateBuilder;
    use std::thread;

    #[test]
    fn test_concurrent_appends_keep_exclusivity() {
        let model = Model::new(
            InitialStateBuilder::new()
                .with("regions", Vec::<&str>::new())
                .build(),
        )
        .unwrap();
        let shared = SharedModel::new(model);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let code = if (i + t) % 5 == 0 {
                            "a".to_string()
                        } else {
                            format!("a_{}", i % 7)
                        };
                        shared.append("regions", &code).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let value = shared.get("regions").unwrap();
        let codes = value.as_codes().unwrap();
        let has_bare = codes.iter().any(|c| c == "a");
        let has_child = codes.iter().any(|c| c.starts_with("a_"));
        assert!(!(has_bare && has_child), "bare and child coexist: {:?}", codes);
    }

    #[test]
    fn test_update_is_atomic_batch() {
        let model = Model::new(InitialStateBuilder::new().with("q", "x").build()).unwrap();
        let shared = SharedModel::from(model);

        shared
            .update(|m| {
                m.append("q", "y")?;
                m.append("q", "z")
            })
            .unwrap();

        assert_eq!(shared.get("q").unwrap(), FieldValue::Scalar("z".into()));
    }
}
