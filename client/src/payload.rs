use cb_error::FieldError;
use serde::{Deserialize, Serialize};

/// One record row as sent and received on the wire. The `id` key is assigned
/// by the server on creation.
pub type RecordPayload = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefinitionPayload {
    id: String,
    title: String,
    description: String,
    fields: Vec<FieldPayload>,
}

impl DefinitionPayload {
    pub fn new(id: &str, title: &str, description: &str, fields: &Vec<FieldPayload>) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            description: description.to_owned(),
            fields: fields.to_vec(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &Vec<FieldPayload> {
        &self.fields
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldPayload {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<String>,
}

impl FieldPayload {
    pub fn new(
        name: &str,
        kind: &str,
        label: &Option<String>,
        hint: &Option<String>,
        required: &bool,
        meta: &Option<String>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            kind: kind.to_owned(),
            label: label.to_owned(),
            hint: hint.to_owned(),
            required: *required,
            meta: meta.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn label(&self) -> &Option<String> {
        &self.label
    }

    pub fn hint(&self) -> &Option<String> {
        &self.hint
    }

    pub fn required(&self) -> &bool {
        &self.required
    }

    pub fn meta(&self) -> &Option<String> {
        &self.meta
    }
}

#[derive(Deserialize, Serialize)]
pub struct RecordListPayload {
    data: Vec<RecordPayload>,
}

impl RecordListPayload {
    pub fn new(data: &Vec<RecordPayload>) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn data(&self) -> &Vec<RecordPayload> {
        &self.data
    }
}

#[derive(Deserialize, Serialize)]
pub struct SavedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl SavedPayload {
    pub fn new(token: &Option<String>) -> Self {
        Self {
            token: token.to_owned(),
        }
    }

    pub fn token(&self) -> &Option<String> {
        &self.token
    }
}

#[derive(Deserialize, Serialize)]
struct ErrorListPayload {
    errors: Vec<RemoteFieldError>,
}

#[derive(Deserialize, Serialize)]
struct RemoteFieldError {
    name: String,
    description: String,
}

/// Parses the remote store's structured validation payload
/// `{"errors": [{"name", "description"}, ...]}`. Field names are truncated
/// at the first `.` so sub-field errors attach to the top-level input.
/// Returns `None` when the payload is not structured.
pub fn parse_validation_errors(raw: &str) -> Option<Vec<FieldError>> {
    let payload = serde_json::from_str::<ErrorListPayload>(raw).ok()?;
    Some(
        payload
            .errors
            .iter()
            .map(|err| {
                let name = match err.name.split_once('.') {
                    Some((head, _)) => head,
                    None => err.name.as_str(),
                };
                FieldError::new(name, &err.description)
            })
            .collect(),
    )
}

/// Serializes field errors back into the wire shape. Used by test doubles
/// standing in for the remote store.
pub fn validation_errors_body(errors: &[(&str, &str)]) -> String {
    let payload = ErrorListPayload {
        errors: errors
            .iter()
            .map(|(name, description)| RemoteFieldError {
                name: (*name).to_owned(),
                description: (*description).to_owned(),
            })
            .collect(),
    };
    serde_json::to_string(&payload).unwrap_or_default()
}
