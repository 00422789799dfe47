use std::rc::Rc;

use anyhow::Result;
use cb_client::{memory::MemoryStore, store::RecordStore};
use cb_form::{FormController, FormEvent};
use cb_geometry::{Layer, LayerStyle, Position};
use cb_record::RecordCollection;
use cb_schema::{Definition, FieldSpec, FieldType};
use serde_json::json;

mod config_path;

fn main() -> Result<()> {
    let config_path = config_path::get();
    let config = cb_config::from_path(&config_path);

    cb_log::init(config.log().display_level(), config.log().level_filter());

    cb_log::info(Some("🗺️"), "[Cartabase] Starting");
    cb_log::info(
        Some("🗺️"),
        format!("[Cartabase] Remote store: {}", config.server().url()),
    );
    if let Some(credential) = config.credential() {
        cb_log::info(
            Some("🔑"),
            format!(
                "[Cartabase] Requests will be signed as '{}' ({})",
                credential.id(),
                credential.algorithm()
            ),
        );
    }

    // Demo collaborator standing in for the HTTP transport.
    let store = Rc::new(MemoryStore::new());

    // Author a definition the way the create flow would.
    let authored = Definition::new("mushroom-spots");
    authored.set_title("Mushroom spots");
    authored.set_description("Where the chanterelles actually are");
    let mut mushroom = FieldSpec::new("mushroom", &FieldType::String, &true);
    mushroom.set_label("Mushroom");
    authored.push_field(&mushroom);
    authored.push_field(&FieldSpec::new("color", &FieldType::Color, &false));
    authored.push_field(&FieldSpec::new("area", &FieldType::Point, &true));
    let token = authored.save(store.as_ref())?;
    cb_log::info(
        Some("🗂️"),
        format!(
            "[Cartabase] Definition '{}' saved (token: {})",
            authored.id(),
            token.unwrap_or_default()
        ),
    );

    // Navigating to that model: fresh instance, record list gated on the
    // definition fetch.
    let definition = Definition::new("mushroom-spots");
    definition.on_fetch_error(|status| {
        if status == 404 {
            cb_log::warn(
                Some("🗂️"),
                "[Cartabase] Definition missing, the app would redirect to its create flow",
            );
        }
    });
    let collection = RecordCollection::new(&definition);
    let record_store: Rc<dyn RecordStore> = store.clone();
    collection.fetch(&record_store);
    definition.fetch(store.as_ref())?;
    cb_log::info(
        Some("🧾"),
        format!(
            "[Cartabase] '{}' ready, {} record(s) fetched",
            definition.title(),
            collection.len()
        ),
    );

    let default = config.style().default_style();
    let default_style = LayerStyle::new(default.color(), default.fill_color(), default.opacity());

    let mut form = FormController::new(&collection, &default_style);
    form.bind(None);
    for input in form.render_inputs()? {
        cb_log::debug(
            Some("📝"),
            format!("[Cartabase] Input '{}': {:?}", input.name(), input.kind()),
        );
    }

    form.stage("mushroom", &json!("Chanterelle"));
    form.stage("color", &json!("darkred"));
    if let Some(style) = form.layer_drawn(&Layer::Marker(Position::new(&2.3, &48.8)))? {
        cb_log::info(
            Some("📍"),
            format!("[Cartabase] Pending layer drawn in '{}'", style.color()),
        );
    }

    match form.submit(record_store.as_ref())? {
        FormEvent::Created(record) => {
            cb_log::info(
                Some("📝"),
                format!(
                    "[Cartabase] Record '{}' created",
                    record.id().unwrap_or_default()
                ),
            );
            cb_log::info(
                Some("📍"),
                format!("[Cartabase] Popup content: {:?}", record.popup_content()),
            );
        }
        FormEvent::ValidationFailed => {
            for err in form.inline_errors() {
                cb_log::warn(Some("📝"), format!("[Cartabase] {err}"));
            }
        }
        FormEvent::RemoteFailed(message) => {
            cb_log::warn(Some("📝"), format!("[Cartabase] Save failed: {message}"));
        }
        FormEvent::Saved(_) | FormEvent::Cancelled => {}
    }

    let bounds = collection.bounds();
    if bounds.is_valid() {
        cb_log::info(
            Some("🗺️"),
            format!(
                "[Cartabase] Fit viewport to ({}, {}) - ({}, {})",
                bounds.south_west().lat(),
                bounds.south_west().lng(),
                bounds.north_east().lat(),
                bounds.north_east().lng()
            ),
        );
    }

    cb_log::info(Some("👋"), "[Cartabase] Done");
    Ok(())
}
