use cb_client::StoreError;
use cb_error::Error;

pub use collection::RecordCollection;
pub use record::Record;

mod collection;
mod record;

/// Classifies a raw store failure: structured validation payloads become
/// per-field errors, 404 becomes the not-found case, anything else stays a
/// displayable remote error.
pub(crate) fn classify_store_error(err: &StoreError) -> Error {
    if let Some(errors) = cb_client::payload::parse_validation_errors(err.message()) {
        return Error::Validation(errors);
    }
    if err.is_not_found() {
        return Error::RemoteNotFound;
    }
    Error::Remote {
        status: *err.status(),
        message: err.message().to_owned(),
    }
}
