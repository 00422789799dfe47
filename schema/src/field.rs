use std::str::FromStr;

use cb_client::payload::FieldPayload;
use cb_error::Error;
use cb_geometry::GeometryKind;
use strum_macros::{Display, EnumIter, EnumString};

/// Field types as the remote store names them, plus the presentation-only
/// meta types (`text`, `color`, `icon`) that are substituted with a storage
/// type before persisting.
#[derive(EnumString, Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Int,
    String,
    Decimal,
    Boolean,
    Email,
    Url,
    Point,
    Line,
    Polygon,
    Text,
    Color,
    Icon,
}

impl FieldType {
    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match self {
            Self::Point => Some(GeometryKind::Point),
            Self::Line => Some(GeometryKind::Line),
            Self::Polygon => Some(GeometryKind::Polygon),
            _ => None,
        }
    }

    /// For meta types, the storage type transmitted in their place.
    pub fn meta_storage_type(&self) -> Option<FieldType> {
        match self {
            Self::Text | Self::Color | Self::Icon => Some(Self::String),
            _ => None,
        }
    }

    pub fn is_meta(&self) -> bool {
        self.meta_storage_type().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    field_type: FieldType,
    label: Option<String>,
    hint: Option<String>,
    required: bool,
    meta: Option<FieldType>,
}

impl FieldSpec {
    pub fn new(name: &str, field_type: &FieldType, required: &bool) -> Self {
        Self {
            name: name.to_owned(),
            field_type: *field_type,
            label: None,
            hint: None,
            required: *required,
            meta: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
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

    pub fn meta(&self) -> &Option<FieldType> {
        &self.meta
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = Some(label.to_owned());
    }

    pub fn set_hint(&mut self, hint: &str) {
        self.hint = Some(hint.to_owned());
    }

    /// The type driving presentation: the recorded meta type when present,
    /// the declared type otherwise.
    pub fn presentation_type(&self) -> FieldType {
        match self.meta {
            Some(meta) => meta,
            None => self.field_type,
        }
    }

    pub fn is_geometry(&self) -> bool {
        self.field_type.geometry_kind().is_some()
    }

    /// Replaces a meta type with its storage type, recording the original.
    /// Already-substituted fields are left untouched, so a failed save can
    /// be retried safely.
    pub fn substitute_meta_type(&mut self) {
        if self.meta.is_some() {
            return;
        }
        if let Some(storage) = self.field_type.meta_storage_type() {
            self.meta = Some(self.field_type);
            self.field_type = storage;
        }
    }

    pub fn from_payload(payload: &FieldPayload) -> Result<Self, Error> {
        let field_type = FieldType::from_str(payload.kind())
            .map_err(|_| Error::Decode(format!("unknown field type '{}'", payload.kind())))?;
        let meta = match payload.meta() {
            Some(meta) => Some(
                FieldType::from_str(meta)
                    .map_err(|_| Error::Decode(format!("unknown meta type '{meta}'")))?,
            ),
            None => None,
        };
        Ok(Self {
            name: payload.name().to_owned(),
            field_type,
            label: payload.label().to_owned(),
            hint: payload.hint().to_owned(),
            required: *payload.required(),
            meta,
        })
    }

    pub fn to_payload(&self) -> FieldPayload {
        FieldPayload::new(
            &self.name,
            &self.field_type.to_string(),
            &self.label,
            &self.hint,
            &self.required,
            &self.meta.map(|meta| meta.to_string()),
        )
    }
}
