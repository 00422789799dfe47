use std::{cell::RefCell, rc::Rc};

use ahash::{HashMap, HashMapExt};
use cb_client::payload::RecordPayload;
use cb_error::Error;
use cb_geometry::{decode, decode_value, encode, Layer};
use cb_schema::Definition;
use serde_json::Value;

struct RecordState {
    id: Option<String>,
    values: HashMap<String, Value>,
    /// Lazily decoded from the geometry field, dropped when that field is
    /// written directly.
    layer: Option<Layer>,
}

/// One data record conforming to a definition. Cloneable handle; the
/// definition back-reference is shared, not owned.
#[derive(Clone)]
pub struct Record {
    definition: Definition,
    state: Rc<RefCell<RecordState>>,
}

impl Record {
    pub fn new(definition: &Definition) -> Self {
        Self {
            definition: definition.clone(),
            state: Rc::new(RefCell::new(RecordState {
                id: None,
                values: HashMap::new(),
                layer: None,
            })),
        }
    }

    pub fn from_payload(definition: &Definition, payload: &RecordPayload) -> Self {
        let record = Self::new(definition);
        {
            let mut state = record.state.borrow_mut();
            for (key, value) in payload {
                if key == "id" {
                    state.id = value.as_str().map(|id| id.to_owned());
                } else {
                    state.values.insert(key.to_owned(), value.clone());
                }
            }
        }
        record
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn id(&self) -> Option<String> {
        self.state.borrow().id.to_owned()
    }

    pub(crate) fn set_id(&self, id: &str) {
        self.state.borrow_mut().id = Some(id.to_owned());
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.state.borrow().values.get(name).cloned()
    }

    pub fn set(&self, name: &str, value: &Value) {
        let mut state = self.state.borrow_mut();
        state.values.insert(name.to_owned(), value.clone());
        drop(state);
        if self
            .definition
            .geometry_field()
            .is_some_and(|field| field.name() == name)
        {
            self.state.borrow_mut().layer = None;
        }
    }

    /// The map layer decoded from this record's geometry field. Decoded at
    /// most once; `None` when the definition has no geometry field or the
    /// field has no value yet. The stored value may be either the
    /// serialized string or an already-parsed coordinate array.
    pub fn layer(&self) -> Result<Option<Layer>, Error> {
        if let Some(layer) = &self.state.borrow().layer {
            return Ok(Some(layer.clone()));
        }
        let Some(field) = self.definition.geometry_field() else {
            return Ok(None);
        };
        let Some(kind) = field.field_type().geometry_kind() else {
            return Ok(None);
        };
        let Some(value) = self.get(field.name()) else {
            return Ok(None);
        };
        let layer = match &value {
            Value::String(raw) => decode(&kind, raw)?,
            other => decode_value(&kind, other)?,
        };
        self.state.borrow_mut().layer = Some(layer.clone());
        Ok(Some(layer))
    }

    /// Stores a drawn or edited layer into the geometry field. No-op
    /// without a geometry field; a layer of the wrong kind for the declared
    /// field type is rejected.
    pub fn set_layer(&self, layer: &Layer) -> Result<(), Error> {
        let Some(field) = self.definition.geometry_field() else {
            return Ok(());
        };
        let Some(kind) = field.field_type().geometry_kind() else {
            return Ok(());
        };
        if layer.kind() != kind {
            return Err(Error::UnsupportedGeometry(format!(
                "field '{}' holds a {:?}, got a {:?}",
                field.name(),
                kind,
                layer.kind()
            )));
        }
        let mut state = self.state.borrow_mut();
        state
            .values
            .insert(field.name().to_owned(), Value::String(encode(layer)));
        state.layer = Some(layer.clone());
        Ok(())
    }

    /// Attribute values projected in `main_fields` order, for table rows.
    pub fn display_values(&self) -> Vec<String> {
        self.definition
            .main_fields()
            .iter()
            .map(|field| self.display_value(field.name()))
            .collect()
    }

    /// Name/value pairs of the main fields, one per line, for the map
    /// popup.
    pub fn popup_content(&self) -> String {
        self.definition
            .main_fields()
            .iter()
            .map(|field| {
                let label = match field.label() {
                    Some(label) => label.to_owned(),
                    None => field.name().to_owned(),
                };
                format!("{}: {}", label, self.display_value(field.name()))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn display_value(&self, name: &str) -> String {
        match self.get(name) {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn to_payload(&self) -> RecordPayload {
        let state = self.state.borrow();
        let mut payload = RecordPayload::new();
        if let Some(id) = &state.id {
            payload.insert("id".to_owned(), Value::String(id.to_owned()));
        }
        for (key, value) in &state.values {
            payload.insert(key.to_owned(), value.clone());
        }
        payload
    }

    pub fn ptr_eq(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
