use std::{cell::Cell, rc::Rc};

use cb_client::{
    memory::MemoryStore,
    payload::{DefinitionPayload, FieldPayload},
    store::DefinitionStore,
};
use cb_error::Error;
use cb_schema::{Definition, FieldSpec, FieldType, InputKind, ValidatorSpec};

fn field(name: &str, kind: &str) -> FieldPayload {
    FieldPayload::new(name, kind, &None, &None, &false, &None)
}

fn map_payload() -> DefinitionPayload {
    DefinitionPayload::new(
        "mushroom-spots",
        "Mushroom spots",
        "Where they grow",
        &vec![field("mushroom", "string"), field("area", "point")],
    )
}

#[test]
fn new_definition_is_not_ready() {
    let definition = Definition::new("mushroom-spots");
    assert!(!definition.is_ready());
    assert!(matches!(
        definition.derive_form_schema(),
        Err(Error::NotReady)
    ));
}

#[test]
fn empty_fields_update_keeps_definition_not_ready() {
    // A fetch returning no fields does not unblock anything.
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new("m", "", "", &Vec::new()))
        .unwrap();
    assert!(!definition.is_ready());
    assert!(matches!(
        definition.derive_form_schema(),
        Err(Error::NotReady)
    ));

    definition.update(&map_payload()).unwrap();
    assert!(definition.is_ready());
    assert!(definition.derive_form_schema().is_ok());
}

#[test]
fn when_ready_fires_exactly_once_after_readiness() {
    let definition = Definition::new("m");
    let fired = Rc::new(Cell::new(0));

    let counter = fired.clone();
    definition.when_ready(move || counter.set(counter.get() + 1));
    assert_eq!(fired.get(), 0);

    definition.update(&map_payload()).unwrap();
    assert_eq!(fired.get(), 1);

    // A later update does not re-fire the drained waiter.
    definition.update(&map_payload()).unwrap();
    assert_eq!(fired.get(), 1);
}

#[test]
fn when_ready_is_synchronous_once_ready() {
    let definition = Definition::new("m");
    definition.update(&map_payload()).unwrap();

    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    definition.when_ready(move || flag.set(true));
    assert!(fired.get());
}

#[test]
fn ready_waiter_may_reenter_the_definition() {
    let definition = Definition::new("m");
    let seen = Rc::new(Cell::new(0));

    let handle = definition.clone();
    let count = seen.clone();
    definition.when_ready(move || count.set(handle.derive_form_schema().unwrap().len()));

    definition.update(&map_payload()).unwrap();
    assert_eq!(seen.get(), 2);
}

#[test]
fn geometry_field_is_first_declared_geometry() {
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![
                field("title", "string"),
                field("route", "line"),
                field("zone", "polygon"),
            ],
        ))
        .unwrap();
    assert_eq!(definition.geometry_field().unwrap().name(), "route");
}

#[test]
fn geometry_field_is_none_without_geometry() {
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![field("title", "string")],
        ))
        .unwrap();
    assert!(definition.geometry_field().is_none());
}

#[test]
fn main_fields_exclude_geometry_and_meta_fields() {
    // A color meta field next to a point field.
    let color = FieldPayload::new(
        "color",
        "string",
        &None,
        &None,
        &false,
        &Some("color".to_owned()),
    );
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![field("mushroom", "string"), color, field("area", "point")],
        ))
        .unwrap();

    let names = definition
        .main_fields()
        .iter()
        .map(|f| f.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["mushroom"]);
}

#[test]
fn meta_fields_stay_in_main_fields_without_geometry() {
    let color = FieldPayload::new(
        "color",
        "string",
        &None,
        &None,
        &false,
        &Some("color".to_owned()),
    );
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![field("mushroom", "string"), color],
        ))
        .unwrap();

    let names = definition
        .main_fields()
        .iter()
        .map(|f| f.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["mushroom", "color"]);
}

#[test]
fn form_schema_maps_types_to_inputs() {
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![
                field("count", "int"),
                field("name", "string"),
                field("weight", "decimal"),
                field("edible", "boolean"),
                field("contact", "email"),
                field("website", "url"),
                field("area", "point"),
            ],
        ))
        .unwrap();

    let inputs = definition.derive_form_schema().unwrap();
    assert_eq!(inputs.len(), 7);
    assert_eq!(*inputs[0].kind(), InputKind::Number);
    assert_eq!(*inputs[1].kind(), InputKind::Text);
    assert_eq!(*inputs[2].kind(), InputKind::Text);
    assert!(inputs[2]
        .validators()
        .iter()
        .any(|v| matches!(v, ValidatorSpec::Pattern(_))));
    assert_eq!(*inputs[3].kind(), InputKind::Checkbox);
    assert!(inputs[4].validators().contains(&ValidatorSpec::Required));
    assert!(inputs[4].validators().contains(&ValidatorSpec::Email));
    assert!(inputs[5].validators().contains(&ValidatorSpec::Url));
    assert_eq!(*inputs[6].kind(), InputKind::HiddenGeometry);
    assert!(inputs[6].hint().is_some());
}

#[test]
fn color_meta_field_renders_as_palette_select() {
    // The meta type wins over the storage type.
    let color = FieldPayload::new(
        "color",
        "string",
        &None,
        &None,
        &false,
        &Some("color".to_owned()),
    );
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![color, field("area", "point")],
        ))
        .unwrap();

    let inputs = definition.derive_form_schema().unwrap();
    match inputs[0].kind() {
        InputKind::Select(options) => {
            assert_eq!(options.len(), 10);
            assert!(options.contains(&"cadetblue".to_owned()));
        }
        other => panic!("expected a select, got {other:?}"),
    }
}

#[test]
fn icon_meta_field_renders_as_grouped_select() {
    let icon = FieldPayload::new(
        "icon",
        "string",
        &None,
        &None,
        &false,
        &Some("icon".to_owned()),
    );
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new("m", "", "", &vec![icon]))
        .unwrap();

    let inputs = definition.derive_form_schema().unwrap();
    match inputs[0].kind() {
        InputKind::GroupedSelect(groups) => {
            assert_eq!(groups.len(), 3);
            assert_eq!(groups[0].group(), "Location");
        }
        other => panic!("expected a grouped select, got {other:?}"),
    }
}

#[test]
fn type_substitution_records_meta_and_is_idempotent() {
    // A `text` field is transmitted as `string` with meta.
    let definition = Definition::new("m");
    definition.push_field(&FieldSpec::new("notes", &FieldType::Text, &false));

    definition.apply_type_substitution();
    let fields = definition.fields();
    assert_eq!(*fields[0].field_type(), FieldType::String);
    assert_eq!(*fields[0].meta(), Some(FieldType::Text));

    // Retrying a save must not substitute twice.
    definition.apply_type_substitution();
    let fields = definition.fields();
    assert_eq!(*fields[0].field_type(), FieldType::String);
    assert_eq!(*fields[0].meta(), Some(FieldType::Text));
}

#[test]
fn save_substitutes_and_round_trips_through_the_store() {
    let store = MemoryStore::new();
    let authored = Definition::new("m");
    authored.set_title("Map");
    authored.push_field(&FieldSpec::new("notes", &FieldType::Text, &false));
    authored.push_field(&FieldSpec::new("area", &FieldType::Point, &true));
    let token = authored.save(&store).unwrap();
    assert!(token.is_some());

    let payload = store.fetch_definition("m").unwrap();
    assert_eq!(payload.fields()[0].kind(), "string");
    assert_eq!(*payload.fields()[0].meta(), Some("text".to_owned()));

    let fetched = Definition::new("m");
    fetched.fetch(&store).unwrap();
    assert!(fetched.is_ready());
    assert_eq!(
        fetched.fields()[0].presentation_type(),
        FieldType::Text
    );
}

#[test]
fn fetch_maps_missing_definition_to_not_found() {
    let store = MemoryStore::new();
    let definition = Definition::new("absent");

    let status = Rc::new(Cell::new(0u16));
    let seen = status.clone();
    definition.on_fetch_error(move |code| seen.set(code));

    let err = definition.fetch(&store).unwrap_err();
    assert!(matches!(err, Error::RemoteNotFound));
    assert_eq!(status.get(), 404);
}

#[test]
fn fetch_error_handler_may_reregister_itself() {
    let store = MemoryStore::new();
    let definition = Definition::new("absent");

    let count = Rc::new(Cell::new(0u32));
    let handle = definition.clone();
    let seen = count.clone();
    definition.on_fetch_error(move |_| {
        seen.set(seen.get() + 1);
        let inner = seen.clone();
        handle.on_fetch_error(move |_| inner.set(inner.get() + 10));
    });

    definition.fetch(&store).unwrap_err();
    assert_eq!(count.get(), 1);

    // The handler registered during the call took the slot.
    definition.fetch(&store).unwrap_err();
    assert_eq!(count.get(), 11);
}

#[test]
fn fetch_surfaces_other_remote_errors() {
    let store = MemoryStore::new();
    store.fail_next(&500, "boom");
    let definition = Definition::new("m");
    let err = definition.fetch(&store).unwrap_err();
    assert!(matches!(err, Error::Remote { status: 500, .. }));
}

#[test]
fn unknown_wire_type_is_a_decode_error() {
    let definition = Definition::new("m");
    let err = definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![field("x", "blob")],
        ))
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[test]
fn definition_form_schema_carries_id_and_field_controls() {
    let schema = cb_schema::definition_form_schema();
    assert_eq!(*schema.id(), InputKind::Hidden);
    assert_eq!(*schema.title(), InputKind::Text);
    assert_eq!(*schema.description(), InputKind::Text);

    let subschema = schema.field_subschema();
    assert!(*subschema.name_required());
    assert_eq!(*subschema.description(), InputKind::Text);
    assert_eq!(*subschema.required(), InputKind::Checkbox);
}

#[test]
fn definition_form_schema_offers_meta_types() {
    let schema = cb_schema::definition_form_schema();
    let options = schema.field_subschema().type_options();
    assert!(options.contains(&"string".to_owned()));
    assert!(options.contains(&"text".to_owned()));
    assert!(options.contains(&"color".to_owned()));
    assert!(options.contains(&"icon".to_owned()));
    assert!(options.contains(&"polygon".to_owned()));
}
