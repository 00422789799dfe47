use crate::GeometryKind;

/// One coordinate, canonically ordered `[lng, lat]` on the wire (GeoJSON
/// order). Never swapped, whichever geometry kind carries it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    lng: f64,
    lat: f64,
}

impl Position {
    pub fn new(lng: &f64, lat: &f64) -> Self {
        Self {
            lng: *lng,
            lat: *lat,
        }
    }

    pub fn lng(&self) -> &f64 {
        &self.lng
    }

    pub fn lat(&self) -> &f64 {
        &self.lat
    }
}

/// A map-widget geometry object. A marker pins a single position, a
/// polyline is open, a polygon holds its outer ring only (holes
/// unsupported).
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker(Position),
    Polyline(Vec<Position>),
    Polygon(Vec<Position>),
}

impl Layer {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Marker(_) => GeometryKind::Point,
            Self::Polyline(_) => GeometryKind::Line,
            Self::Polygon(_) => GeometryKind::Polygon,
        }
    }

    pub fn as_marker(&self) -> Option<&Position> {
        match self {
            Self::Marker(position) => Some(position),
            _ => None,
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        match self {
            Self::Marker(position) => vec![*position],
            Self::Polyline(positions) | Self::Polygon(positions) => positions.to_vec(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for position in self.positions() {
            bounds.extend(&position);
        }
        bounds
    }
}

/// Axis-aligned box used to fit the map viewport around layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_lng: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn extend(&mut self, position: &Position) {
        self.min_lng = self.min_lng.min(*position.lng());
        self.min_lat = self.min_lat.min(*position.lat());
        self.max_lng = self.max_lng.max(*position.lng());
        self.max_lat = self.max_lat.max(*position.lat());
    }

    pub fn extend_bounds(&mut self, other: &Bounds) {
        if !other.is_valid() {
            return;
        }
        self.extend(&Position::new(&other.min_lng, &other.min_lat));
        self.extend(&Position::new(&other.max_lng, &other.max_lat));
    }

    pub fn is_valid(&self) -> bool {
        self.min_lng <= self.max_lng && self.min_lat <= self.max_lat
    }

    pub fn south_west(&self) -> Position {
        Position::new(&self.min_lng, &self.min_lat)
    }

    pub fn north_east(&self) -> Position {
        Position::new(&self.max_lng, &self.max_lat)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}
