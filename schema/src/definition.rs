use std::{cell::RefCell, rc::Rc};

use cb_client::{
    payload::{DefinitionPayload, FieldPayload},
    store::DefinitionStore,
};
use cb_error::Error;

use crate::{
    field::FieldSpec,
    form::{field_input, FieldInput},
};

struct DefinitionState {
    id: String,
    title: String,
    description: String,
    fields: Vec<FieldSpec>,
}

type ReadyWaiter = Box<dyn FnOnce()>;
type FetchErrorHandler = Box<dyn Fn(u16)>;

/// Cloneable single-threaded handle on one remote schema definition.
///
/// Created client-side with just an id; becomes ready once a fetch (or an
/// explicit update) populates a non-empty field list. Derived-schema
/// operations return [`Error::NotReady`] until then.
#[derive(Clone)]
pub struct Definition {
    state: Rc<RefCell<DefinitionState>>,
    waiters: Rc<RefCell<Vec<ReadyWaiter>>>,
    fetch_error: Rc<RefCell<Option<FetchErrorHandler>>>,
}

impl Definition {
    pub fn new(id: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(DefinitionState {
                id: id.to_owned(),
                title: String::new(),
                description: String::new(),
                fields: Vec::new(),
            })),
            waiters: Rc::new(RefCell::new(Vec::new())),
            fetch_error: Rc::new(RefCell::new(None)),
        }
    }

    pub fn id(&self) -> String {
        self.state.borrow().id.to_owned()
    }

    pub fn title(&self) -> String {
        self.state.borrow().title.to_owned()
    }

    pub fn description(&self) -> String {
        self.state.borrow().description.to_owned()
    }

    pub fn set_title(&self, title: &str) {
        self.state.borrow_mut().title = title.to_owned();
    }

    pub fn set_description(&self, description: &str) {
        self.state.borrow_mut().description = description.to_owned();
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        self.state.borrow().fields.to_vec()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .fields
            .iter()
            .map(|field| field.name().to_owned())
            .collect()
    }

    /// Replaces the field list. Fires pending ready waiters when this is
    /// the update that makes the definition ready.
    pub fn set_fields(&self, fields: &Vec<FieldSpec>) {
        self.state.borrow_mut().fields = fields.to_vec();
        self.fire_waiters_if_ready();
    }

    pub fn push_field(&self, field: &FieldSpec) {
        self.state.borrow_mut().fields.push(field.to_owned());
        self.fire_waiters_if_ready();
    }

    pub fn is_ready(&self) -> bool {
        !self.state.borrow().fields.is_empty()
    }

    /// Invokes `callback` synchronously if the definition is ready, else
    /// registers it to fire exactly once after the first update that makes
    /// it ready.
    pub fn when_ready(&self, callback: impl FnOnce() + 'static) {
        if self.is_ready() {
            callback();
        } else {
            self.waiters.borrow_mut().push(Box::new(callback));
        }
    }

    /// Registers a handler receiving the raw status of a failed fetch. The
    /// surrounding application uses the 404 case to redirect to its
    /// create flow.
    pub fn on_fetch_error(&self, handler: impl Fn(u16) + 'static) {
        *self.fetch_error.borrow_mut() = Some(Box::new(handler));
    }

    /// Applies a fetched payload, then fires pending ready waiters.
    pub fn update(&self, payload: &DefinitionPayload) -> Result<(), Error> {
        let fields = payload
            .fields()
            .iter()
            .map(FieldSpec::from_payload)
            .collect::<Result<Vec<_>, _>>()?;
        {
            let mut state = self.state.borrow_mut();
            state.id = payload.id().to_owned();
            state.title = payload.title().to_owned();
            state.description = payload.description().to_owned();
            state.fields = fields;
        }
        self.fire_waiters_if_ready();
        Ok(())
    }

    /// One remote read. A 404 maps to [`Error::RemoteNotFound`]; any
    /// failure is also reported to the registered fetch-error handler.
    pub fn fetch(&self, store: &dyn DefinitionStore) -> Result<(), Error> {
        let id = self.id();
        match store.fetch_definition(&id) {
            Ok(payload) => self.update(&payload),
            Err(err) => {
                cb_log::warn(
                    Some("🗂️"),
                    format!("Definition: fetching '{id}' failed: {err}"),
                );
                // Taken out for the call so the handler can re-register; a
                // replacement registered during the call wins.
                let handler = self.fetch_error.borrow_mut().take();
                if let Some(handler) = &handler {
                    handler(*err.status());
                }
                {
                    let mut slot = self.fetch_error.borrow_mut();
                    if slot.is_none() {
                        *slot = handler;
                    }
                }
                if err.is_not_found() {
                    Err(Error::RemoteNotFound)
                } else {
                    Err(Error::Remote {
                        status: *err.status(),
                        message: err.message().to_owned(),
                    })
                }
            }
        }
    }

    /// Persists the definition. Meta types are substituted with their
    /// storage types right before transmission, exactly once per field.
    pub fn save(&self, store: &dyn DefinitionStore) -> Result<Option<String>, Error> {
        self.apply_type_substitution();
        let payload = self.to_payload();
        match store.save_definition(&payload) {
            Ok(saved) => Ok(saved.token().to_owned()),
            Err(err) => Err(Error::Remote {
                status: *err.status(),
                message: err.message().to_owned(),
            }),
        }
    }

    pub fn apply_type_substitution(&self) {
        for field in self.state.borrow_mut().fields.iter_mut() {
            field.substitute_meta_type();
        }
    }

    /// The first declared field holding a geometry, if any. Deterministic
    /// by declaration order.
    pub fn geometry_field(&self) -> Option<FieldSpec> {
        self.state
            .borrow()
            .fields
            .iter()
            .find(|field| field.is_geometry())
            .cloned()
    }

    /// Fields shown as table columns: everything but the geometry field.
    /// Meta-typed fields are consumed by layer rendering instead whenever a
    /// geometry field exists; without one they stay in as columns.
    pub fn main_fields(&self) -> Vec<FieldSpec> {
        let has_geometry = self.geometry_field().is_some();
        self.state
            .borrow()
            .fields
            .iter()
            .filter(|field| !field.is_geometry())
            .filter(|field| !has_geometry || field.meta().is_none())
            .cloned()
            .collect()
    }

    /// First field whose recorded meta type is `color`.
    pub fn color_field(&self) -> Option<FieldSpec> {
        self.meta_field(crate::FieldType::Color)
    }

    /// First field whose recorded meta type is `icon`.
    pub fn icon_field(&self) -> Option<FieldSpec> {
        self.meta_field(crate::FieldType::Icon)
    }

    fn meta_field(&self, meta: crate::FieldType) -> Option<FieldSpec> {
        self.state
            .borrow()
            .fields
            .iter()
            .find(|field| *field.meta() == Some(meta) || *field.field_type() == meta)
            .cloned()
    }

    /// Derives one input descriptor per field, in declaration order.
    pub fn derive_form_schema(&self) -> Result<Vec<FieldInput>, Error> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }
        Ok(self
            .state
            .borrow()
            .fields
            .iter()
            .map(field_input)
            .collect())
    }

    pub fn to_payload(&self) -> DefinitionPayload {
        let state = self.state.borrow();
        let fields = state
            .fields
            .iter()
            .map(FieldSpec::to_payload)
            .collect::<Vec<FieldPayload>>();
        DefinitionPayload::new(&state.id, &state.title, &state.description, &fields)
    }

    /// Waiters are moved out before invocation so a callback can reenter
    /// this handle (derive a schema, start a collection fetch) without a
    /// double borrow.
    fn fire_waiters_if_ready(&self) {
        if !self.is_ready() {
            return;
        }
        let waiters = self.waiters.borrow_mut().split_off(0);
        for waiter in waiters {
            waiter();
        }
    }

    /// Two handles are the same definition when they share state.
    pub fn ptr_eq(&self, other: &Definition) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
