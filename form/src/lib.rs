use ahash::{HashMap, HashMapExt};
use cb_client::store::RecordStore;
use cb_error::{Error, FieldError};
use cb_geometry::{Layer, LayerStyle};
use cb_record::{Record, RecordCollection};
use cb_schema::{Definition, FieldInput};
use serde_json::Value;

mod validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    Creating,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Unbound,
    Bound(BindMode),
    Submitting(BindMode),
    Failed(BindMode),
}

/// Typed outbound signal of a form transition.
pub enum FormEvent {
    Created(Record),
    Saved(Record),
    ValidationFailed,
    RemoteFailed(String),
    Cancelled,
}

/// Binds one record (new or existing) to the form derived from its
/// definition, owns the in-progress drawn layer, and drives submission.
///
/// `Unbound → Bound(Creating|Editing) → Submitting → Bound | Failed`; a
/// failed submission keeps the binding and its contents so the user can
/// retry.
pub struct FormController {
    definition: Definition,
    collection: RecordCollection,
    state: FormState,
    bound: Option<Record>,
    staged: HashMap<String, Value>,
    pending_layer: Option<Layer>,
    inline_errors: Vec<FieldError>,
    generic_error: Option<String>,
    default_style: LayerStyle,
}

impl FormController {
    pub fn new(collection: &RecordCollection, default_style: &LayerStyle) -> Self {
        Self {
            definition: collection.definition().clone(),
            collection: collection.clone(),
            state: FormState::Unbound,
            bound: None,
            staged: HashMap::new(),
            pending_layer: None,
            inline_errors: Vec::new(),
            generic_error: None,
            default_style: default_style.clone(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn mode(&self) -> Option<BindMode> {
        match self.state {
            FormState::Unbound => None,
            FormState::Bound(mode) | FormState::Submitting(mode) | FormState::Failed(mode) => {
                Some(mode)
            }
        }
    }

    pub fn bound(&self) -> Option<&Record> {
        self.bound.as_ref()
    }

    pub fn inline_errors(&self) -> &[FieldError] {
        &self.inline_errors
    }

    pub fn generic_error(&self) -> Option<&str> {
        self.generic_error.as_deref()
    }

    pub fn pending_layer(&self) -> Option<&Layer> {
        self.pending_layer.as_ref()
    }

    /// Hands the in-progress drawn layer back so the caller can remove it
    /// from the map (an unsaved drawing must never outlive its form).
    pub fn take_pending_layer(&mut self) -> Option<Layer> {
        self.pending_layer.take()
    }

    /// Binds a record, or a fresh one on the active definition when `None`.
    /// Any previous binding's staged values, pending layer, and errors are
    /// discarded first.
    pub fn bind(&mut self, record: Option<Record>) {
        self.staged.clear();
        self.pending_layer = None;
        self.inline_errors.clear();
        self.generic_error = None;
        let record = record.unwrap_or_else(|| Record::new(&self.definition));
        let mode = match record.id() {
            None => BindMode::Creating,
            Some(_) => BindMode::Editing,
        };
        self.bound = Some(record);
        self.state = FormState::Bound(mode);
    }

    /// One input descriptor per definition field. Fails with
    /// [`Error::NotReady`] until the definition is fetched.
    pub fn render_inputs(&self) -> Result<Vec<FieldInput>, Error> {
        self.definition.derive_form_schema()
    }

    /// The form widget commits one field's current value.
    pub fn stage(&mut self, name: &str, value: &Value) {
        self.staged.insert(name.to_owned(), value.clone());
    }

    /// Style for the in-progress drawing: the configured default, overridden
    /// by the currently staged (or bound) color and icon meta-field values,
    /// so the drawing previews its final appearance before submission.
    pub fn pending_style(&self) -> LayerStyle {
        let mut style = self.default_style.clone();
        if let Some(field) = self.definition.color_field() {
            if let Some(color) = self.current_text(field.name()) {
                style.set_color(&color);
            }
        }
        if let Some(field) = self.definition.icon_field() {
            if let Some(icon) = self.current_text(field.name()) {
                style.set_icon(&icon);
            }
        }
        style
    }

    /// A layer was drawn on (or edited via) the map. Syncs the bound
    /// record's geometry field and returns the style to apply to the
    /// pending layer. `None` when the definition has no geometry field.
    pub fn layer_drawn(&mut self, layer: &Layer) -> Result<Option<LayerStyle>, Error> {
        if self.definition.geometry_field().is_none() {
            return Ok(None);
        }
        let record = self.bound.as_ref().ok_or(Error::NotReady)?;
        record.set_layer(layer)?;
        self.pending_layer = Some(layer.clone());
        Ok(Some(self.pending_style()))
    }

    pub fn layer_edited(&mut self, layer: &Layer) -> Result<Option<LayerStyle>, Error> {
        self.layer_drawn(layer)
    }

    /// Commits staged values, validates locally, persists (create when the
    /// bound record has no id, update otherwise).
    ///
    /// Remote failures come back as events, not errors: structured
    /// validation payloads attach one inline error per named field,
    /// anything else degrades to a single generic message, and the binding
    /// survives for retry. `Err` is reserved for programming errors
    /// (submitting while unbound or before the definition is ready).
    pub fn submit(&mut self, store: &dyn RecordStore) -> Result<FormEvent, Error> {
        let mode = self.mode().ok_or(Error::NotReady)?;
        let record = self.bound.clone().ok_or(Error::NotReady)?;
        let inputs = self.definition.derive_form_schema()?;

        self.state = FormState::Submitting(mode);
        self.inline_errors.clear();
        self.generic_error = None;

        for (name, value) in &self.staged {
            if name == "id" {
                continue;
            }
            record.set(name, value);
        }

        let errors = validate::run(&inputs, &record);
        if !errors.is_empty() {
            self.inline_errors = errors;
            self.state = FormState::Failed(mode);
            return Ok(FormEvent::ValidationFailed);
        }

        match self.collection.save(store, &record) {
            Ok(()) => {
                self.pending_layer = None;
                self.state = FormState::Bound(BindMode::Editing);
                match mode {
                    BindMode::Creating => Ok(FormEvent::Created(record)),
                    BindMode::Editing => Ok(FormEvent::Saved(record)),
                }
            }
            Err(Error::Validation(errors)) => {
                self.inline_errors = errors;
                self.state = FormState::Failed(mode);
                Ok(FormEvent::ValidationFailed)
            }
            Err(err) => {
                let message = err.to_string();
                cb_log::warn(Some("📝"), format!("FormController: save failed: {message}"));
                self.generic_error = Some(message.to_owned());
                self.state = FormState::Failed(mode);
                Ok(FormEvent::RemoteFailed(message))
            }
        }
    }

    /// Releases the binding. The pending layer is discarded; callers that
    /// rendered it grab it through [`Self::take_pending_layer`] first.
    pub fn cancel(&mut self) -> FormEvent {
        self.staged.clear();
        self.pending_layer = None;
        self.inline_errors.clear();
        self.generic_error = None;
        self.bound = None;
        self.state = FormState::Unbound;
        FormEvent::Cancelled
    }

    fn current_text(&self, name: &str) -> Option<String> {
        let staged = self.staged.get(name).cloned();
        let value = match staged {
            Some(value) => Some(value),
            None => self.bound.as_ref().and_then(|record| record.get(name)),
        };
        match value {
            Some(Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}
