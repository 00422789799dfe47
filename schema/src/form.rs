use strum::IntoEnumIterator;

use crate::field::{FieldSpec, FieldType};

pub const DECIMAL_PATTERN: &str = r"[-+]?[0-9]*\.?[0-9]+";
pub const GEOMETRY_HINT: &str = "Click on the map";

/// One rendered input of a record form, derived from a field's type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInput {
    name: String,
    kind: InputKind,
    hint: Option<String>,
    required: bool,
    validators: Vec<ValidatorSpec>,
}

impl FieldInput {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn hint(&self) -> &Option<String> {
        &self.hint
    }

    pub fn required(&self) -> &bool {
        &self.required
    }

    pub fn validators(&self) -> &Vec<ValidatorSpec> {
        &self.validators
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Number,
    Text,
    TextArea,
    Checkbox,
    Select(Vec<String>),
    GroupedSelect(Vec<SelectGroup>),
    /// Hidden input carrying a server-side value, never typed into.
    Hidden,
    /// Hidden text area populated by map interaction, never typed into.
    HiddenGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectGroup {
    group: String,
    options: Vec<String>,
}

impl SelectGroup {
    pub fn new(group: &str, options: &[&str]) -> Self {
        Self {
            group: group.to_owned(),
            options: options.iter().map(|option| (*option).to_owned()).collect(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn options(&self) -> &Vec<String> {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorSpec {
    Required,
    Email,
    Url,
    Pattern(String),
}

pub fn color_choices() -> Vec<String> {
    [
        "red",
        "blue",
        "orange",
        "green",
        "purple",
        "darkred",
        "darkgreen",
        "darkblue",
        "darkpurple",
        "cadetblue",
    ]
    .iter()
    .map(|color| (*color).to_owned())
    .collect()
}

pub fn icon_groups() -> Vec<SelectGroup> {
    vec![
        SelectGroup::new(
            "Location",
            &[
                "home",
                "music",
                "medkit",
                "camera-retro",
                "info-sign",
                "plane",
                "shopping-cart",
            ],
        ),
        SelectGroup::new("Food & Drink", &["food", "glass", "coffee"]),
        SelectGroup::new("Symbols", &["flag", "star", "suitcase", "comments"]),
    ]
}

/// Builds the input descriptor for one field. The recorded meta type wins
/// over the storage type, so a `string`+`meta:color` field still renders as
/// a palette select.
pub fn field_input(field: &FieldSpec) -> FieldInput {
    let mut validators = Vec::new();
    if *field.required() {
        validators.push(ValidatorSpec::Required);
    }

    let kind = match field.presentation_type() {
        FieldType::Int => InputKind::Number,
        FieldType::String => InputKind::Text,
        FieldType::Boolean => InputKind::Checkbox,
        FieldType::Decimal => {
            validators.push(ValidatorSpec::Pattern(DECIMAL_PATTERN.to_owned()));
            InputKind::Text
        }
        FieldType::Email => {
            if !validators.contains(&ValidatorSpec::Required) {
                validators.push(ValidatorSpec::Required);
            }
            validators.push(ValidatorSpec::Email);
            InputKind::Text
        }
        FieldType::Url => {
            if !validators.contains(&ValidatorSpec::Required) {
                validators.push(ValidatorSpec::Required);
            }
            validators.push(ValidatorSpec::Url);
            InputKind::Text
        }
        FieldType::Point | FieldType::Line | FieldType::Polygon => InputKind::HiddenGeometry,
        FieldType::Text => InputKind::TextArea,
        FieldType::Color => InputKind::Select(color_choices()),
        FieldType::Icon => InputKind::GroupedSelect(icon_groups()),
    };

    let hint = match &kind {
        InputKind::HiddenGeometry => Some(
            field
                .hint()
                .to_owned()
                .unwrap_or_else(|| GEOMETRY_HINT.to_owned()),
        ),
        _ => field.hint().to_owned(),
    };

    FieldInput {
        name: field.name().to_owned(),
        kind,
        hint,
        required: *field.required(),
        validators,
    }
}

/// Static form schema for authoring a definition itself: hidden id, title
/// and description inputs, and the per-field subschema. The type select
/// enumerates every field type, meta types included.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFormSchema {
    id: InputKind,
    title: InputKind,
    description: InputKind,
    field_subschema: FieldSubschema,
}

impl DefinitionFormSchema {
    pub fn id(&self) -> &InputKind {
        &self.id
    }

    pub fn title(&self) -> &InputKind {
        &self.title
    }

    pub fn description(&self) -> &InputKind {
        &self.description
    }

    pub fn field_subschema(&self) -> &FieldSubschema {
        &self.field_subschema
    }
}

/// Subschema repeated once per authored field: required name, free-text
/// description, required checkbox, and the type select.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSubschema {
    name_required: bool,
    description: InputKind,
    required: InputKind,
    type_options: Vec<String>,
}

impl FieldSubschema {
    pub fn name_required(&self) -> &bool {
        &self.name_required
    }

    pub fn description(&self) -> &InputKind {
        &self.description
    }

    pub fn required(&self) -> &InputKind {
        &self.required
    }

    pub fn type_options(&self) -> &Vec<String> {
        &self.type_options
    }
}

pub fn definition_form_schema() -> DefinitionFormSchema {
    DefinitionFormSchema {
        id: InputKind::Hidden,
        title: InputKind::Text,
        description: InputKind::Text,
        field_subschema: FieldSubschema {
            name_required: true,
            description: InputKind::Text,
            required: InputKind::Checkbox,
            type_options: FieldType::iter()
                .map(|field_type| field_type.to_string())
                .collect(),
        },
    }
}
