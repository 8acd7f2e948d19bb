use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::errors::{IntakeError, Result};
use crate::form::schema::{FieldDescriptor, FieldKind, FormSchema};
use crate::form::value::FieldValue;

/// Snapshot of every field value keyed by field identifier.
pub type FieldValues = BTreeMap<String, FieldValue>;

type ObserverCallback = dyn Fn(&str, &FieldValue) + Send + Sync;

/// Holds the values of every field declared by a [`FormSchema`].
///
/// The store never validates content. It only guarantees that each declared
/// field always has a value of the declared shape, and notifies observers
/// after every change.
#[derive(Clone)]
pub struct FieldStore {
    schema: Arc<FormSchema>,
    values: FieldValues,
    observers: Vec<Arc<ObserverCallback>>,
}

impl FieldStore {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let values = schema.initial_values();
        Self {
            schema,
            values,
            observers: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Registers a callback invoked with `(key, new_value)` after each change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&str, &FieldValue) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<()> {
        let descriptor = self.descriptor(key)?;
        if !descriptor.kind.accepts(&value) {
            return Err(IntakeError::FieldKindMismatch {
                key: key.to_string(),
                expected: descriptor.kind.expected_name(),
            });
        }
        self.store(key, value);
        Ok(())
    }

    /// Sets a text or choice field from a raw string.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = match &self.descriptor(key)?.kind {
            FieldKind::Text => FieldValue::Text(value.into()),
            FieldKind::Choice(_) => FieldValue::Choice(value.into()),
            other => {
                return Err(IntakeError::FieldKindMismatch {
                    key: key.to_string(),
                    expected: other.expected_name(),
                })
            }
        };
        self.store(key, value);
        Ok(())
    }

    /// Overwrites one slot of a fixed-size list field.
    pub fn set_list_slot(&mut self, key: &str, index: usize, value: impl Into<String>) -> Result<()> {
        let slots = match self.descriptor(key)?.kind {
            FieldKind::List { slots } => slots,
            _ => {
                return Err(IntakeError::FieldKindMismatch {
                    key: key.to_string(),
                    expected: "list",
                })
            }
        };
        if index >= slots {
            return Err(IntakeError::SlotOutOfRange {
                key: key.to_string(),
                index,
            });
        }

        let mut items = self.list(key).to_vec();
        items.resize(slots, String::new());
        items[index] = value.into();
        self.store(key, FieldValue::List(items));
        Ok(())
    }

    /// Adds `item` to a multi-select field, or removes it when already
    /// selected. Returns whether the item is selected afterwards.
    pub fn toggle_item(&mut self, key: &str, item: &str) -> Result<bool> {
        if !matches!(self.descriptor(key)?.kind, FieldKind::MultiSelect(_)) {
            return Err(IntakeError::FieldKindMismatch {
                key: key.to_string(),
                expected: "multi-select",
            });
        }

        let mut items = self.list(key).to_vec();
        let selected = if let Some(position) = items.iter().position(|existing| existing == item) {
            items.remove(position);
            false
        } else {
            items.push(item.to_string());
            true
        };
        self.store(key, FieldValue::List(items));
        Ok(selected)
    }

    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Text of a text or choice field; empty for anything else.
    pub fn text(&self, key: &str) -> &str {
        self.values
            .get(key)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    /// Entries of a list field; empty for anything else.
    pub fn list(&self, key: &str) -> &[String] {
        self.values
            .get(key)
            .and_then(FieldValue::as_list)
            .unwrap_or(&[])
    }

    pub fn all_fields(&self) -> &FieldValues {
        &self.values
    }

    /// Restores every field to its declared initial value.
    pub fn reset(&mut self) {
        self.values = self.schema.initial_values();
        trace!(form = self.schema.name(), "field store reset");
        for (key, value) in &self.values {
            for observer in &self.observers {
                observer(key, value);
            }
        }
    }

    pub fn is_pristine(&self) -> bool {
        self.values == self.schema.initial_values()
    }

    fn descriptor(&self, key: &str) -> Result<&FieldDescriptor> {
        self.schema
            .field(key)
            .ok_or_else(|| IntakeError::UnknownField(key.to_string()))
    }

    fn store(&mut self, key: &str, value: FieldValue) {
        trace!(field = key, kind = value.kind_name(), "field updated");
        self.values.insert(key.to_string(), value);
        if let Some(stored) = self.values.get(key) {
            for observer in &self.observers {
                observer(key, stored);
            }
        }
    }
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldStore")
            .field("form", &self.schema.name())
            .field("values", &self.values)
            .field("observers", &self.observers.len())
            .finish()
    }
}
