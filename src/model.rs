//! Core data models for the land-cover explorer.
//! Regions, drawn geometries and the classification palette live here; all of them
//! are plain values with no knowledge of the UI or the imagery service.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Rectangular extent in degrees (west, south, east, north).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// Build bounds from any two opposite corners.
    pub fn from_corners(a: LonLat, b: LonLat) -> Self {
        Self {
            west: a.lon.min(b.lon),
            south: a.lat.min(b.lat),
            east: a.lon.max(b.lon),
            north: a.lat.max(b.lat),
        }
    }

    pub fn center(&self) -> LonLat {
        LonLat::new((self.west + self.east) * 0.5, (self.south + self.north) * 0.5)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Corners in counter-clockwise order starting at south-west.
    pub fn corners(&self) -> [LonLat; 4] {
        [
            LonLat::new(self.west, self.south),
            LonLat::new(self.east, self.south),
            LonLat::new(self.east, self.north),
            LonLat::new(self.west, self.north),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Polygon,
    Rectangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Polygon, ShapeKind::Rectangle];

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Rectangle => "Rectangle",
        }
    }
}

/// A user-drawn shape in geographic coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Rectangle(Bounds),
    /// Open ring; the closing vertex is implied.
    Polygon(Vec<LonLat>),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rectangle(_) => ShapeKind::Rectangle,
            Geometry::Polygon(_) => ShapeKind::Polygon,
        }
    }

    pub fn vertices(&self) -> Vec<LonLat> {
        match self {
            Geometry::Rectangle(b) => b.corners().to_vec(),
            Geometry::Polygon(v) => v.clone(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Geometry::Rectangle(b) => *b,
            Geometry::Polygon(v) => {
                let mut b = Bounds::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
                for p in v {
                    b.west = b.west.min(p.lon);
                    b.south = b.south.min(p.lat);
                    b.east = b.east.max(p.lon);
                    b.north = b.north.max(p.lat);
                }
                if v.is_empty() { Bounds::new(0.0, 0.0, 0.0, 0.0) } else { b }
            }
        }
    }

    /// A shape that encloses no area cannot be clipped or rendered.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Geometry::Rectangle(b) => b.is_empty(),
            Geometry::Polygon(v) => v.len() < 3 || shoelace_area(v) == 0.0,
        }
    }

    /// GeoJSON `Polygon` value with an explicitly closed ring.
    pub fn to_geojson(&self) -> Value {
        let mut ring: Vec<[f64; 2]> = self.vertices().iter().map(|p| [p.lon, p.lat]).collect();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        json!({ "type": "Polygon", "coordinates": [ring] })
    }
}

fn shoelace_area(v: &[LonLat]) -> f64 {
    let mut sum = 0.0;
    for (i, a) in v.iter().enumerate() {
        let b = v[(i + 1) % v.len()];
        sum += a.lon * b.lat - b.lon * a.lat;
    }
    (sum * 0.5).abs()
}

// ---------------- Region registry -----------------
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub name: &'static str,
    pub bounds: Bounds,
}

pub const REGIONS: [Region; 5] = [
    Region { name: "Penang", bounds: Bounds::new(100.15, 5.20, 100.50, 5.50) },
    Region { name: "Selangor", bounds: Bounds::new(101.15, 2.70, 101.90, 3.40) },
    Region { name: "Johor", bounds: Bounds::new(103.10, 1.15, 104.10, 2.10) },
    Region { name: "Sabah", bounds: Bounds::new(115.90, 5.00, 118.00, 6.30) },
    Region { name: "Sarawak", bounds: Bounds::new(110.00, 1.20, 112.00, 2.50) },
];

pub const DEFAULT_REGION: &str = "Penang";

pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|r| r.name)
}

pub fn find_region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == name)
}

// ---------------- Palette & visualisation -----------------
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub value: u8,
    pub color: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
}

impl Default for Palette {
    /// Dynamic World label colours; slot 7 reuses the bare-ground red.
    fn default() -> Self {
        let raw: [(&str, &str); 9] = [
            ("#419BDF", "Water"),
            ("#397D49", "Trees"),
            ("#88B053", "Grass"),
            ("#7A8737", "Crops"),
            ("#E49635", "Shrub & Scrub"),
            ("#DFC35A", "Built-up"),
            ("#C4281B", "Bare ground"),
            ("#C4281B", "Bare ground (snow/ice slot)"),
            ("#B39FE1", "Clouds"),
        ];
        let entries = raw
            .iter()
            .enumerate()
            .map(|(i, (color, label))| PaletteEntry {
                value: i as u8,
                color: (*color).to_string(),
                label: (*label).to_string(),
            })
            .collect();
        Self { entries }
    }
}

impl Palette {
    pub fn colors(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.color.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VisError {
    #[error("min {min} is greater than max {max}")]
    InvertedRange { min: i32, max: i32 },
    #[error("palette has {actual} colours, range needs {expected}")]
    PaletteLength { expected: u64, actual: usize },
    #[error("palette colour {0:?} is not #RRGGBB")]
    BadColor(String),
}

/// Display parameters for the label band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub band: String,
    pub min: i32,
    pub max: i32,
    pub palette: Palette,
}

impl Default for VisParams {
    fn default() -> Self {
        Self { band: "label".to_string(), min: 0, max: 8, palette: Palette::default() }
    }
}

impl VisParams {
    pub fn validate(&self) -> Result<(), VisError> {
        if self.min > self.max {
            return Err(VisError::InvertedRange { min: self.min, max: self.max });
        }
        let expected = (i64::from(self.max) - i64::from(self.min) + 1) as u64;
        if self.palette.len() as u64 != expected {
            return Err(VisError::PaletteLength { expected, actual: self.palette.len() });
        }
        if let Some(bad) = self.palette.entries.iter().find(|e| !is_hex_color(&e.color)) {
            return Err(VisError::BadColor(bad.color.clone()));
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_holds_five_regions_in_order() {
        let names: Vec<_> = region_names().collect();
        assert_eq!(names, ["Penang", "Selangor", "Johor", "Sabah", "Sarawak"]);
        assert!(find_region(DEFAULT_REGION).is_some());
        assert!(find_region("Kedah").is_none());
    }

    #[test]
    fn johor_bounds_match_registry() {
        let johor = find_region("Johor").unwrap();
        assert_eq!(johor.bounds.as_array(), [103.10, 1.15, 104.10, 2.10]);
        let c = johor.bounds.center();
        assert!((c.lon - 103.60).abs() < 1e-9);
        assert!((c.lat - 1.625).abs() < 1e-9);
    }

    #[test]
    fn bounds_from_any_corners() {
        let b = Bounds::from_corners(LonLat::new(2.0, 1.0), LonLat::new(1.0, 3.0));
        assert_eq!(b, Bounds::new(1.0, 1.0, 2.0, 3.0));
        assert_eq!(b.corners()[2], LonLat::new(2.0, 3.0));
    }

    #[test]
    fn degenerate_shapes() {
        assert!(Geometry::Rectangle(Bounds::new(1.0, 1.0, 1.0, 2.0)).is_degenerate());
        let line = vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0), LonLat::new(2.0, 2.0)];
        assert!(Geometry::Polygon(line).is_degenerate());
        let tri = vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0), LonLat::new(0.0, 1.0)];
        assert!(!Geometry::Polygon(tri).is_degenerate());
    }

    #[test]
    fn geojson_ring_is_closed() {
        let g = Geometry::Rectangle(Bounds::new(0.0, 0.0, 1.0, 1.0));
        let v = g.to_geojson();
        assert_eq!(v["type"], "Polygon");
        let ring = v["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn polygon_bounds_cover_vertices() {
        let g = Geometry::Polygon(vec![
            LonLat::new(101.0, 3.0),
            LonLat::new(101.5, 2.8),
            LonLat::new(101.2, 3.3),
        ]);
        assert_eq!(g.bounds(), Bounds::new(101.0, 2.8, 101.5, 3.3));
    }

    #[test]
    fn default_palette_covers_label_range() {
        let vis = VisParams::default();
        assert_eq!(vis.band, "label");
        assert_eq!(vis.palette.len(), 9);
        let colors = vis.palette.colors();
        assert_eq!(colors[0], "#419BDF");
        assert_eq!(colors[7], colors[6]);
        assert!(vis.palette.entries.iter().enumerate().all(|(i, e)| e.value as usize == i));
        assert_eq!(vis.validate(), Ok(()));
    }

    #[test]
    fn vis_validation_rejects_bad_config() {
        let mut vis = VisParams::default();
        vis.max = 9;
        assert_eq!(vis.validate(), Err(VisError::PaletteLength { expected: 10, actual: 9 }));

        let mut vis = VisParams::default();
        vis.min = 9;
        assert!(matches!(vis.validate(), Err(VisError::InvertedRange { .. })));

        let mut vis = VisParams::default();
        vis.palette.entries[3].color = "olive".into();
        assert_eq!(vis.validate(), Err(VisError::BadColor("olive".into())));
    }
}
