use cb_error::Error;
use serde_json::{json, Value};

use crate::{GeometryKind, Layer, Position};

/// Decodes a stored geometry field value into a map layer. The value is a
/// JSON-encoded coordinate structure whose arity depends on the field's
/// geometry kind: `[lng, lat]` for points, a vertex list for lines, an
/// array of rings for polygons (first ring only).
pub fn decode(kind: &GeometryKind, raw: &str) -> Result<Layer, Error> {
    let value = serde_json::from_str::<Value>(raw)
        .map_err(|err| Error::Decode(format!("invalid JSON: {err}")))?;
    decode_value(kind, &value)
}

/// Same as [`decode`], for a value the transport already parsed.
pub fn decode_value(kind: &GeometryKind, value: &Value) -> Result<Layer, Error> {
    match kind {
        GeometryKind::Point => Ok(Layer::Marker(position(value)?)),
        GeometryKind::Line => Ok(Layer::Polyline(positions(value)?)),
        GeometryKind::Polygon => {
            let rings = value
                .as_array()
                .ok_or_else(|| Error::Decode("polygon expects an array of rings".to_owned()))?;
            let outer = rings
                .first()
                .ok_or_else(|| Error::Decode("polygon has no outer ring".to_owned()))?;
            Ok(Layer::Polygon(positions(outer)?))
        }
    }
}

/// Encodes a layer back into the stored string form. Exact inverse of
/// [`decode`] on coordinates.
pub fn encode(layer: &Layer) -> String {
    match layer {
        Layer::Marker(position) => json!([position.lng(), position.lat()]).to_string(),
        Layer::Polyline(positions) => json!(coordinates(positions)).to_string(),
        Layer::Polygon(positions) => json!([coordinates(positions)]).to_string(),
    }
}

fn coordinates(positions: &[Position]) -> Vec<[f64; 2]> {
    positions
        .iter()
        .map(|position| [*position.lng(), *position.lat()])
        .collect()
}

fn position(value: &Value) -> Result<Position, Error> {
    let pair = value
        .as_array()
        .ok_or_else(|| Error::Decode("coordinate is not an array".to_owned()))?;
    if pair.len() != 2 {
        return Err(Error::Decode(format!(
            "coordinate arity is {}, expected 2",
            pair.len()
        )));
    }
    let lng = number(&pair[0])?;
    let lat = number(&pair[1])?;
    Ok(Position::new(&lng, &lat))
}

fn positions(value: &Value) -> Result<Vec<Position>, Error> {
    value
        .as_array()
        .ok_or_else(|| Error::Decode("vertex list is not an array".to_owned()))?
        .iter()
        .map(position)
        .collect()
}

fn number(value: &Value) -> Result<f64, Error> {
    value
        .as_f64()
        .ok_or_else(|| Error::Decode(format!("'{value}' is not a number")))
}
