pub use codec::{decode, decode_value, encode};
pub use layer::{Bounds, Layer, Position};
pub use style::LayerStyle;

mod codec;
mod layer;
mod style;

/// The three geometry kinds a record field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}
