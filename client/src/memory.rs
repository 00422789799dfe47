use std::cell::RefCell;

use ahash::{HashMap, HashMapExt};
use uuid::Uuid;

use crate::{
    payload::{DefinitionPayload, RecordListPayload, RecordPayload, SavedPayload},
    store::{DefinitionStore, RecordStore},
    StoreError,
};

/// In-memory implementation of both store traits. Backs the demo binary and
/// the test suites; record ids are assigned the way a server would.
pub struct MemoryStore {
    definitions: RefCell<HashMap<String, DefinitionPayload>>,
    records: RefCell<HashMap<String, Vec<RecordPayload>>>,
    fail_next: RefCell<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            definitions: RefCell::new(HashMap::new()),
            records: RefCell::new(HashMap::new()),
            fail_next: RefCell::new(None),
        }
    }

    /// Makes the next store call fail with the given status and body.
    pub fn fail_next(&self, status: &u16, body: &str) {
        *self.fail_next.borrow_mut() = Some(StoreError::new(status, body));
    }

    fn take_failure(&self) -> Option<StoreError> {
        self.fail_next.borrow_mut().take()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore for MemoryStore {
    fn fetch_definition(&self, id: &str) -> Result<DefinitionPayload, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        match self.definitions.borrow().get(id) {
            Some(payload) => Ok(payload.clone()),
            None => Err(StoreError::new(
                &404,
                &format!("Definition '{id}' not found"),
            )),
        }
    }

    fn save_definition(&self, payload: &DefinitionPayload) -> Result<SavedPayload, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.definitions
            .borrow_mut()
            .insert(payload.id().to_owned(), payload.clone());
        Ok(SavedPayload::new(&Some(Uuid::new_v4().to_string())))
    }
}

impl RecordStore for MemoryStore {
    fn list_records(&self, definition_id: &str) -> Result<RecordListPayload, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let records = self.records.borrow();
        Ok(RecordListPayload::new(
            records.get(definition_id).unwrap_or(&Vec::new()),
        ))
    }

    fn create_record(
        &self,
        definition_id: &str,
        record: &RecordPayload,
    ) -> Result<RecordPayload, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut stored = record.clone();
        stored.insert(
            "id".to_owned(),
            serde_json::Value::String(Uuid::new_v4().to_string()),
        );
        self.records
            .borrow_mut()
            .entry(definition_id.to_owned())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    fn update_record(
        &self,
        definition_id: &str,
        record_id: &str,
        record: &RecordPayload,
    ) -> Result<RecordPayload, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut records = self.records.borrow_mut();
        let rows = records
            .get_mut(definition_id)
            .ok_or_else(|| StoreError::new(&404, &format!("No data for '{definition_id}'")))?;
        let row = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(|id| id.as_str()) == Some(record_id))
            .ok_or_else(|| StoreError::new(&404, &format!("Record '{record_id}' not found")))?;
        let mut stored = record.clone();
        stored.insert(
            "id".to_owned(),
            serde_json::Value::String(record_id.to_owned()),
        );
        *row = stored.clone();
        Ok(stored)
    }

    fn delete_record(&self, definition_id: &str, record_id: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut records = self.records.borrow_mut();
        let rows = records
            .get_mut(definition_id)
            .ok_or_else(|| StoreError::new(&404, &format!("No data for '{definition_id}'")))?;
        let before = rows.len();
        rows.retain(|row| row.get("id").and_then(|id| id.as_str()) != Some(record_id));
        if rows.len() == before {
            return Err(StoreError::new(
                &404,
                &format!("Record '{record_id}' not found"),
            ));
        }
        Ok(())
    }
}
