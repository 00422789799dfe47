use crate::{
    payload::{DefinitionPayload, RecordListPayload, RecordPayload, SavedPayload},
    StoreError,
};

/// Remote source of definitions. `GET/PUT {server}/definitions/{id}` in the
/// HTTP transport; the transport itself (verbs, headers, request signing)
/// lives outside this core.
pub trait DefinitionStore {
    fn fetch_definition(&self, id: &str) -> Result<DefinitionPayload, StoreError>;

    fn save_definition(&self, payload: &DefinitionPayload) -> Result<SavedPayload, StoreError>;
}

/// Remote source of records scoped to one definition.
/// `GET/POST/PUT/DELETE {server}/data/{id}[/{record_id}]` in the transport.
pub trait RecordStore {
    fn list_records(&self, definition_id: &str) -> Result<RecordListPayload, StoreError>;

    fn create_record(
        &self,
        definition_id: &str,
        record: &RecordPayload,
    ) -> Result<RecordPayload, StoreError>;

    fn update_record(
        &self,
        definition_id: &str,
        record_id: &str,
        record: &RecordPayload,
    ) -> Result<RecordPayload, StoreError>;

    fn delete_record(&self, definition_id: &str, record_id: &str) -> Result<(), StoreError>;
}
