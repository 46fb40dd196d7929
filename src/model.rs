//! The fixed-key model and its mutation API.

use crate::builder::InitialState;
use crate::code::{Delimiter, DEFAULT_DELIMITER};
use crate::error::{Result, StateError};
use crate::export::FormExport;
use crate::field::{Field, FieldValue, RawValue};
use crate::subscriptions::{
    SubscriptionFilter, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Model configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Separator between a parent code and its child.
    pub delimiter: String,

    /// Events buffered per subscriber before it is dropped.
    pub event_buffer_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            event_buffer_size: crate::subscriptions::DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Fixed-key container of fields.
///
/// The key set is frozen at construction and a field never changes kind.
/// Fields are only replaced through [`append`](Self::append),
/// [`remove`](Self::remove), [`clear_field`](Self::clear_field) and
/// [`clear_state`](Self::clear_state).
pub struct Model {
    keys: Vec<String>,
    fields: HashMap<String, Field>,
    delimiter: Delimiter,
    subscriptions: SubscriptionManager,
}

impl Model {
    /// Create a model with the default configuration.
    pub fn new(initial: InitialState) -> Result<Self> {
        Self::with_config(initial, ModelConfig::default())
    }

    pub fn with_config(initial: InitialState, config: ModelConfig) -> Result<Self> {
        let delimiter = Delimiter::new(config.delimiter)?;

        let entries = initial.into_fields();
        let mut keys = Vec::with_capacity(entries.len());
        let mut fields = HashMap::with_capacity(entries.len());
        for (name, field) in entries {
            if fields.contains_key(&name) {
                return Err(StateError::InvalidInitialState(format!(
                    "duplicate field name: {}",
                    name
                )));
            }
            keys.push(name.clone());
            fields.insert(name, field);
        }

        Ok(Self {
            keys,
            fields,
            delimiter,
            subscriptions: SubscriptionManager::with_buffer_size(config.event_buffer_size),
        })
    }

    /// Create a model from a JSON object of strings and string arrays.
    ///
    /// Array entries may be `null`; they are dropped like empty strings.
    pub fn from_json(value: &serde_json::Value, config: ModelConfig) -> Result<Self> {
        let obj = match value {
            serde_json::Value::Object(obj) => obj,
            serde_json::Value::Null => {
                return Err(StateError::InvalidInitialState(
                    "initial state is missing".to_string(),
                ))
            }
            other => {
                return Err(StateError::InvalidInitialState(format!(
                    "initial state is not an object: {}",
                    other
                )))
            }
        };

        let fields = obj
            .iter()
            .map(|(name, raw)| {
                RawValue::try_from(raw)
                    .map(|raw| (name.clone(), Field::create(raw)))
                    .map_err(|e| match e {
                        StateError::InvalidInitialState(msg) => {
                            StateError::InvalidInitialState(format!("{}: {}", name, msg))
                        }
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::with_config(InitialState::from_fields(fields), config)
    }

    // --- Reads ---

    /// Field names in construction order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields.get(name).ok_or_else(|| invalid_name(name))
    }

    /// Owned copy of one field's value.
    pub fn get(&self, name: &str) -> Result<FieldValue> {
        self.field(name).map(Field::value)
    }

    /// Point-in-time copy of every field's value.
    pub fn state(&self) -> StateSnapshot {
        StateSnapshot {
            entries: self
                .ordered_fields()
                .map(|(name, field)| (name.to_string(), field.value()))
                .collect(),
        }
    }

    /// One hidden input per field, in key order.
    pub fn export_form(&self) -> FormExport {
        FormExport::from_fields(self.ordered_fields())
    }

    fn ordered_fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.keys
            .iter()
            .filter_map(|k| self.fields.get(k).map(|f| (k.as_str(), f)))
    }

    // --- Mutations ---

    /// Add a code to a code set, or replace a scalar's value.
    ///
    /// In a code set, a qualified code (`parent_child`) evicts a bare
    /// `parent` entry, and a bare `parent` evicts every `parent_*` entry.
    /// Appending a code already present is a no-op.
    pub fn append(&mut self, name: &str, code: &str) -> Result<()> {
        let next = self.field(name)?.with_code(code, &self.delimiter);
        self.replace(name, next, "append");
        Ok(())
    }

    /// Remove an exact code from a code set. On a scalar this clears the
    /// value regardless of `code`.
    pub fn remove(&mut self, name: &str, code: &str) -> Result<()> {
        let next = self.field(name)?.without_code(code);
        self.replace(name, next, "remove");
        Ok(())
    }

    /// Reset one field to `""` or an empty code set.
    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        let next = self.field(name)?.cleared();
        self.replace(name, next, "clear");
        Ok(())
    }

    /// Reset every field, in key order.
    pub fn clear_state(&mut self) {
        let keys = self.keys.clone();
        for name in &keys {
            if let Some(next) = self.fields.get(name).map(Field::cleared) {
                self.replace(name, next, "clear");
            }
        }
        self.subscriptions.broadcast_cleared();
    }

    fn replace(&mut self, name: &str, next: Field, op: &'static str) {
        let Some(slot) = self.fields.get_mut(name) else {
            return;
        };
        if *slot == next {
            tracing::trace!(field = name, op, "no change");
            return;
        }

        let value = next.value();
        *slot = next;
        tracing::debug!(field = name, op, value = %value, "field updated");
        self.subscriptions.broadcast_field_changed(name, value);
    }

    // --- Subscriptions ---

    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        self.subscriptions.subscribe(filter)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

fn invalid_name(name: &str) -> StateError {
    tracing::debug!(field = name, "rejected unknown field name");
    StateError::InvalidFieldName(name.to_string())
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("delimiter", &self.delimiter)
            .field("state", &self.state())
            .finish()
    }
}

/// Immutable point-in-time copy of a model's values, in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    entries: Vec<(String, FieldValue)>,
}

impl StateSnapshot {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for StateSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InitialStateBuilder;
    use crate::subscriptions::ModelEvent;

    fn test_model() -> Model {
        Model::new(
            InitialStateBuilder::new()
                .with("query", "x")
                .with("regions", Vec::<&str>::new())
                .build(),
        )
        .unwrap()
    }

    fn codes(model: &Model, name: &str) -> Vec<String> {
        model.get(name).unwrap().as_codes().unwrap().to_vec()
    }

    #[test]
    fn test_parent_overrides_children() {
        let mut model = test_model();
        model.append("regions", "a_1").unwrap();
        model.append("regions", "a_2").unwrap();
        model.append("regions", "a").unwrap();
        assert_eq!(codes(&model, "regions"), vec!["a"]);
    }

    #[test]
    fn test_child_overrides_bare_parent() {
        let mut model = test_model();
        model.append("regions", "a").unwrap();
        model.append("regions", "a_1").unwrap();
        assert_eq!(codes(&model, "regions"), vec!["a_1"]);
    }

    #[test]
    fn test_sibling_accumulation() {
        let mut model = test_model();
        model.append("regions", "a_1").unwrap();
        model.append("regions", "a_2").unwrap();
        assert_eq!(codes(&model, "regions"), vec!["a_1", "a_2"]);
    }

    #[test]
    fn test_idempotent_append() {
        let mut model = test_model();
        model.append("regions", "b").unwrap();
        model.append("regions", "a_1").unwrap();
        let once = model.state();
        model.append("regions", "a_1").unwrap();
        assert_eq!(model.state(), once);
    }

    #[test]
    fn test_scalar_append_replaces() {
        let mut model = test_model();
        model.append("query", "y").unwrap();
        assert_eq!(model.get("query").unwrap(), FieldValue::Scalar("y".into()));
        model.append("query", "").unwrap();
        assert_eq!(model.get("query").unwrap(), FieldValue::Scalar(String::new()));
    }

    #[test]
    fn test_custom_delimiter() {
        let config = ModelConfig {
            delimiter: "/".to_string(),
            ..Default::default()
        };
        let initial = InitialStateBuilder::new()
            .with("paths", vec!["a_1", "a/1"])
            .build();
        let mut model = Model::with_config(initial, config).unwrap();

        model.append("paths", "a").unwrap();
        assert_eq!(codes(&model, "paths"), vec!["a_1", "a"]);
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let config = ModelConfig {
            delimiter: String::new(),
            ..Default::default()
        };
        let result = Model::with_config(InitialState::default(), config);
        assert!(matches!(result, Err(StateError::InvalidInitialState(_))));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let initial = InitialState::from_fields(vec![
            ("a", Field::create("1")),
            ("a", Field::create("2")),
        ]);
        assert!(matches!(
            Model::new(initial),
            Err(StateError::InvalidInitialState(_))
        ));
    }

    #[test]
    fn test_events_only_on_change() {
        let mut model = test_model();
        let handle = model.subscribe(SubscriptionFilter::all());

        model.append("regions", "a").unwrap();
        model.append("regions", "a").unwrap();
        model.remove("regions", "missing").unwrap();

        let events = handle.drain();
        assert_eq!(
            events,
            vec![ModelEvent::FieldChanged {
                field: "regions".to_string(),
                value: FieldValue::CodeSet(vec!["a".to_string()]),
            }]
        );
    }

    #[test]
    fn test_clear_state_emits_cleared() {
        let mut model = test_model();
        let handle = model.subscribe(SubscriptionFilter::fields(vec!["query".to_string()]));

        model.clear_state();

        let events = handle.drain();
        assert_eq!(
            events,
            vec![
                ModelEvent::FieldChanged {
                    field: "query".to_string(),
                    value: FieldValue::Scalar(String::new()),
                },
                ModelEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes_in_key_order() {
        let mut model = test_model();
        model.append("regions", "a_1").unwrap();
        let json = serde_json::to_string(&model.state()).unwrap();
        assert_eq!(json, r#"{"query":"x","regions":["a_1"]}"#);
    }
}
