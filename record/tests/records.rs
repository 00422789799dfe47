use std::{cell::Cell, rc::Rc};

use cb_client::{
    memory::MemoryStore,
    payload::{DefinitionPayload, FieldPayload, RecordPayload},
    store::RecordStore,
};
use cb_error::Error;
use cb_geometry::{Layer, Position};
use cb_record::{Record, RecordCollection};
use cb_schema::Definition;
use serde_json::{json, Value};

fn field(name: &str, kind: &str) -> FieldPayload {
    FieldPayload::new(name, kind, &None, &None, &false, &None)
}

fn map_definition() -> Definition {
    let definition = Definition::new("mushroom-spots");
    definition
        .update(&DefinitionPayload::new(
            "mushroom-spots",
            "Mushroom spots",
            "",
            &vec![field("mushroom", "string"), field("area", "point")],
        ))
        .unwrap();
    definition
}

fn record_payload(entries: &[(&str, Value)]) -> RecordPayload {
    let mut payload = RecordPayload::new();
    for (key, value) in entries {
        payload.insert((*key).to_owned(), value.clone());
    }
    payload
}

#[test]
fn layer_decodes_stored_point_value() {
    // Stored as [lng, lat]: "[2.3,48.8]" is a marker at lat 48.8, lng 2.3.
    let record = Record::from_payload(
        &map_definition(),
        &record_payload(&[("mushroom", json!("Chanterelle")), ("area", json!("[2.3,48.8]"))]),
    );

    let layer = record.layer().unwrap().unwrap();
    let marker = layer.as_marker().unwrap();
    assert_eq!(*marker.lat(), 48.8);
    assert_eq!(*marker.lng(), 2.3);
}

#[test]
fn set_layer_writes_the_geometry_field() {
    // Writing a layer stores the encoded [lng, lat] string.
    let record = Record::new(&map_definition());
    record
        .set_layer(&Layer::Marker(Position::new(&2.4, &48.9)))
        .unwrap();
    assert_eq!(record.get("area"), Some(json!("[2.4,48.9]")));
}

#[test]
fn layer_is_memoized_until_the_field_changes() {
    let record = Record::from_payload(
        &map_definition(),
        &record_payload(&[("area", json!("[2.3,48.8]"))]),
    );
    let first = record.layer().unwrap().unwrap();
    assert_eq!(record.layer().unwrap().unwrap(), first);

    record.set("area", &json!("[10.0,20.0]"));
    let second = record.layer().unwrap().unwrap();
    assert_eq!(*second.as_marker().unwrap().lng(), 10.0);
}

#[test]
fn layer_accepts_already_parsed_coordinates() {
    let record = Record::from_payload(
        &map_definition(),
        &record_payload(&[("area", json!([2.3, 48.8]))]),
    );
    assert!(record.layer().unwrap().is_some());
}

#[test]
fn layer_is_none_without_geometry_field_or_value() {
    let plain = Definition::new("plain");
    plain
        .update(&DefinitionPayload::new(
            "plain",
            "",
            "",
            &vec![field("title", "string")],
        ))
        .unwrap();
    let record = Record::new(&plain);
    assert!(record.layer().unwrap().is_none());
    record
        .set_layer(&Layer::Marker(Position::new(&0.0, &0.0)))
        .unwrap();
    assert!(record.get("area").is_none());

    // Geometry field declared but no value stored yet.
    let empty = Record::new(&map_definition());
    assert!(empty.layer().unwrap().is_none());
}

#[test]
fn set_layer_rejects_the_wrong_geometry_kind() {
    let record = Record::new(&map_definition());
    let err = record
        .set_layer(&Layer::Polyline(vec![Position::new(&0.0, &0.0)]))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedGeometry(_)));
}

#[test]
fn display_values_follow_main_fields_order() {
    let definition = Definition::new("m");
    definition
        .update(&DefinitionPayload::new(
            "m",
            "",
            "",
            &vec![
                field("mushroom", "string"),
                field("count", "int"),
                field("area", "point"),
            ],
        ))
        .unwrap();
    let record = Record::from_payload(
        &definition,
        &record_payload(&[
            ("count", json!(3)),
            ("mushroom", json!("Chanterelle")),
            ("area", json!("[2.3,48.8]")),
        ]),
    );
    assert_eq!(record.display_values(), vec!["Chanterelle", "3"]);
}

#[test]
fn popup_content_lists_main_fields() {
    let record = Record::from_payload(
        &map_definition(),
        &record_payload(&[("mushroom", json!("Chanterelle"))]),
    );
    assert_eq!(record.popup_content(), "mushroom: Chanterelle");
}

#[test]
fn fetch_defers_until_definition_is_ready() {
    let store = Rc::new(MemoryStore::new());
    store
        .create_record(
            "mushroom-spots",
            &record_payload(&[("mushroom", json!("Morel")), ("area", json!("[1.0,2.0]"))]),
        )
        .unwrap();

    let saved = map_definition();
    saved.save(store.as_ref()).unwrap();

    let definition = Definition::new("mushroom-spots");
    let collection = RecordCollection::new(&definition);
    let record_store: Rc<dyn RecordStore> = store.clone();
    collection.fetch(&record_store);

    // Nothing fetched yet: the definition is not ready.
    assert!(collection.is_empty());

    definition.fetch(store.as_ref()).unwrap();
    assert_eq!(collection.len(), 1);
    assert!(collection.records()[0].id().is_some());
}

#[test]
fn fetch_issues_one_read_per_call() {
    let store = Rc::new(MemoryStore::new());
    let definition = map_definition();
    definition.save(store.as_ref()).unwrap();

    let collection = RecordCollection::new(&definition);
    let record_store: Rc<dyn RecordStore> = store.clone();
    collection.fetch(&record_store);

    store
        .create_record("mushroom-spots", &record_payload(&[("mushroom", json!("Cep"))]))
        .unwrap();

    // A second fetch of the same handle reads again (explicit retry).
    collection.refetch(&record_store);
    assert_eq!(collection.len(), 1);
}

#[test]
fn deferred_fetch_failure_reaches_the_error_handler() {
    let store = Rc::new(MemoryStore::new());
    let definition = map_definition();

    let collection = RecordCollection::new(&definition);
    let status = Rc::new(Cell::new(0u16));
    let seen = status.clone();
    collection.on_error(move |code| seen.set(code));

    store.fail_next(&503, "unavailable");
    let record_store: Rc<dyn RecordStore> = store.clone();
    collection.fetch(&record_store);

    assert_eq!(status.get(), 503);
    assert!(collection.is_empty());
}

#[test]
fn fetch_error_handler_may_reregister_itself() {
    let store = Rc::new(MemoryStore::new());
    let definition = map_definition();
    let collection = RecordCollection::new(&definition);

    let status = Rc::new(Cell::new(0u16));
    let handle = collection.clone();
    let seen = status.clone();
    collection.on_error(move |code| {
        seen.set(code);
        let inner = seen.clone();
        handle.on_error(move |code| inner.set(code + 1));
    });

    store.fail_next(&503, "unavailable");
    let record_store: Rc<dyn RecordStore> = store.clone();
    collection.fetch(&record_store);
    assert_eq!(status.get(), 503);

    // The handler registered during the call took the slot.
    store.fail_next(&500, "boom");
    collection.refetch(&record_store);
    assert_eq!(status.get(), 501);
}

#[test]
fn save_creates_then_updates() {
    let store = MemoryStore::new();
    let definition = map_definition();
    let collection = RecordCollection::new(&definition);

    let record = Record::new(&definition);
    record.set("mushroom", &json!("Chanterelle"));
    collection.save(&store, &record).unwrap();

    let id = record.id().expect("server assigns an id on create");
    assert_eq!(collection.len(), 1);

    record.set("mushroom", &json!("Girolle"));
    collection.save(&store, &record).unwrap();
    assert_eq!(record.id(), Some(id.clone()));

    let listed = store.list_records("mushroom-spots").unwrap();
    assert_eq!(listed.data().len(), 1);
    assert_eq!(listed.data()[0].get("mushroom"), Some(&json!("Girolle")));
}

#[test]
fn save_classifies_structured_validation_failures() {
    let store = MemoryStore::new();
    let definition = map_definition();
    let collection = RecordCollection::new(&definition);

    let record = Record::new(&definition);
    store.fail_next(
        &400,
        &cb_client::payload::validation_errors_body(&[("mushroom.sub", "Required")]),
    );
    let err = collection.save(&store, &record).unwrap_err();
    match err {
        Error::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            // The name is truncated at the first dot.
            assert_eq!(errors[0].name(), "mushroom");
            assert_eq!(errors[0].description(), "Required");
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn delete_detaches_the_record() {
    let store = MemoryStore::new();
    let definition = map_definition();
    let collection = RecordCollection::new(&definition);

    let record = Record::new(&definition);
    record.set("mushroom", &json!("Chanterelle"));
    collection.save(&store, &record).unwrap();
    collection.delete(&store, &record).unwrap();

    assert!(collection.is_empty());
    assert!(store.list_records("mushroom-spots").unwrap().data().is_empty());
}

#[test]
fn collection_bounds_union_member_layers() {
    let definition = map_definition();
    let collection = RecordCollection::new(&definition);

    let near = Record::new(&definition);
    near.set("area", &json!("[1.0,2.0]"));
    collection.add(&near);
    let far = Record::new(&definition);
    far.set("area", &json!("[5.0,8.0]"));
    collection.add(&far);

    let bounds = collection.bounds();
    assert!(bounds.is_valid());
    assert_eq!(*bounds.south_west().lng(), 1.0);
    assert_eq!(*bounds.north_east().lat(), 8.0);
}
