use std::fmt;

pub mod memory;
pub mod payload;
pub mod store;

/// Raw failure reported by the remote store, before this core classifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    status: u16,
    message: String,
}

impl StoreError {
    pub fn new(status: &u16, message: &str) -> Self {
        Self {
            status: *status,
            message: message.to_owned(),
        }
    }

    pub fn status(&self) -> &u16 {
        &self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for StoreError {}
