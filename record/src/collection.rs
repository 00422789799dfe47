use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use cb_client::store::RecordStore;
use cb_error::Error;
use cb_geometry::Bounds;
use cb_schema::Definition;

use crate::{classify_store_error, Record};

type ErrorHandler = Box<dyn Fn(u16)>;

/// Ordered, fetchable set of records scoped to one definition. Cloneable
/// handle; insertion order is preserved, id uniqueness belongs to the
/// remote store.
#[derive(Clone)]
pub struct RecordCollection {
    definition: Definition,
    records: Rc<RefCell<Vec<Record>>>,
    fetched: Rc<Cell<bool>>,
    error_handler: Rc<RefCell<Option<ErrorHandler>>>,
}

impl RecordCollection {
    pub fn new(definition: &Definition) -> Self {
        Self {
            definition: definition.clone(),
            records: Rc::new(RefCell::new(Vec::new())),
            fetched: Rc::new(Cell::new(false)),
            error_handler: Rc::new(RefCell::new(None)),
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Registers a handler receiving the raw status of a failed deferred
    /// fetch.
    pub fn on_error(&self, handler: impl Fn(u16) + 'static) {
        *self.error_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Fetches the record list, deferring until the definition is ready.
    /// Each call issues at most one list read; concurrent in-flight
    /// requests are not deduplicated, last response wins.
    pub fn fetch(&self, store: &Rc<dyn RecordStore>) {
        let this = self.clone();
        let store = store.clone();
        self.definition.when_ready(move || {
            if this.fetched.get() {
                return;
            }
            this.fetched.set(true);
            let id = this.definition.id();
            match store.list_records(&id) {
                Ok(list) => {
                    let records = list
                        .data()
                        .iter()
                        .map(|payload| Record::from_payload(&this.definition, payload))
                        .collect();
                    *this.records.borrow_mut() = records;
                }
                Err(err) => {
                    cb_log::warn(
                        Some("🧾"),
                        format!("RecordCollection: listing '{id}' failed: {err}"),
                    );
                    // Taken out for the call so the handler can re-register;
                    // a replacement registered during the call wins.
                    let handler = this.error_handler.borrow_mut().take();
                    if let Some(handler) = &handler {
                        handler(*err.status());
                    }
                    let mut slot = this.error_handler.borrow_mut();
                    if slot.is_none() {
                        *slot = handler;
                    }
                }
            }
        });
    }

    /// Resets the fetch latch and fetches again.
    pub fn refetch(&self, store: &Rc<dyn RecordStore>) {
        self.fetched.set(false);
        self.fetch(store);
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().to_vec()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn add(&self, record: &Record) {
        self.records.borrow_mut().push(record.clone());
    }

    pub fn remove(&self, record: &Record) {
        self.records.borrow_mut().retain(|row| !row.ptr_eq(record));
    }

    /// Persists a record: create when it has no id yet (the server assigns
    /// one), update otherwise. Created records join the collection.
    pub fn save(&self, store: &dyn RecordStore, record: &Record) -> Result<(), Error> {
        let id = self.definition.id();
        match record.id() {
            None => {
                let stored = store
                    .create_record(&id, &record.to_payload())
                    .map_err(|err| classify_store_error(&err))?;
                if let Some(assigned) = stored.get("id").and_then(|value| value.as_str()) {
                    record.set_id(assigned);
                }
                self.add(record);
                Ok(())
            }
            Some(record_id) => {
                store
                    .update_record(&id, &record_id, &record.to_payload())
                    .map_err(|err| classify_store_error(&err))?;
                Ok(())
            }
        }
    }

    /// Deletes the record remotely and detaches it from the collection.
    /// The caller removes its layer from the map.
    pub fn delete(&self, store: &dyn RecordStore, record: &Record) -> Result<(), Error> {
        if let Some(record_id) = record.id() {
            store
                .delete_record(&self.definition.id(), &record_id)
                .map_err(|err| classify_store_error(&err))?;
        }
        self.remove(record);
        Ok(())
    }

    /// Union of member layer bounds, for fitting the map viewport.
    /// Records without a decodable layer are skipped.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for record in self.records.borrow().iter() {
            if let Ok(Some(layer)) = record.layer() {
                bounds.extend_bounds(&layer.bounds());
            }
        }
        bounds
    }
}
