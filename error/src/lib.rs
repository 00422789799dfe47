use std::fmt;

/// One inline error attached to a named form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    name: String,
    description: String,
}

impl FieldError {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A derived-schema operation ran before the definition was fetched.
    /// Programming error, never shown to the user.
    NotReady,
    /// Stored geometry value is not valid JSON or its arity does not match
    /// the declared geometry type.
    Decode(String),
    /// A layer geometry that the declared field type cannot hold.
    UnsupportedGeometry(String),
    /// The remote store has no definition under the requested name.
    RemoteNotFound,
    /// Per-field errors returned by the remote store on save.
    Validation(Vec<FieldError>),
    /// Any other remote failure, kept displayable for retry.
    Remote { status: u16, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "Definition is not ready. Fetch it first"),
            Self::Decode(msg) => write!(f, "Geometry decode failed: {msg}"),
            Self::UnsupportedGeometry(msg) => write!(f, "Unsupported geometry: {msg}"),
            Self::RemoteNotFound => write!(f, "Definition does not exist on the remote store"),
            Self::Validation(errors) => {
                write!(f, "Validation failed on {} field(s)", errors.len())
            }
            Self::Remote { status, message } => write!(f, "Remote error ({status}): {message}"),
        }
    }
}

impl std::error::Error for Error {}
