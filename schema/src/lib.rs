pub use definition::Definition;
pub use field::{FieldSpec, FieldType};
pub use form::{
    color_choices, definition_form_schema, icon_groups, DefinitionFormSchema, FieldInput,
    FieldSubschema, InputKind, SelectGroup, ValidatorSpec, DECIMAL_PATTERN, GEOMETRY_HINT,
};

mod definition;
mod field;
mod form;
