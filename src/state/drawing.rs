// Drawing tool state: finished shapes plus the shape currently being sketched.
use crate::model::{Bounds, Geometry, LonLat, ShapeKind};

/// Shapes drawn on the map. Only the most recent one is authoritative.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawingTools {
    modes: Vec<ShapeKind>,
    active_mode: Option<ShapeKind>,
    layers: Vec<Geometry>,
}

impl Default for DrawingTools {
    fn default() -> Self {
        Self::new(&ShapeKind::ALL)
    }
}

impl DrawingTools {
    pub fn new(modes: &[ShapeKind]) -> Self {
        Self { modes: modes.to_vec(), active_mode: None, layers: Vec::new() }
    }

    pub fn modes(&self) -> &[ShapeKind] {
        &self.modes
    }

    pub fn active_mode(&self) -> Option<ShapeKind> {
        self.active_mode
    }

    /// Switch draw mode. Modes that were not enabled are ignored.
    pub fn set_mode(&mut self, mode: Option<ShapeKind>) -> bool {
        match mode {
            Some(m) if !self.modes.contains(&m) => false,
            _ => {
                self.active_mode = mode;
                true
            }
        }
    }

    pub fn add_layer(&mut self, geometry: Geometry) {
        self.layers.push(geometry);
    }

    pub fn layers(&self) -> &[Geometry] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn last_drawn_geometry(&self) -> Option<&Geometry> {
        self.layers.last()
    }

    /// Remove every drawn layer, not only the last one.
    pub fn clear(&mut self) -> usize {
        let removed = self.layers.len();
        self.layers.clear();
        removed
    }
}

/// In-progress shape fed by pointer events.
///
/// Rectangles are press-drag-release. Polygons take one click per vertex and close on
/// double-click or on a click near the first vertex once three vertices exist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sketch {
    pub kind: Option<ShapeKind>,
    pub vertices: Vec<LonLat>,
    pub cursor: Option<LonLat>,
    dragging: bool,
    /// Point whose click closed the previous polygon.
    closed_at: Option<LonLat>,
}

impl Sketch {
    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    pub fn press(&mut self, mode: ShapeKind, at: LonLat, near_first: bool) -> Option<Geometry> {
        match mode {
            ShapeKind::Rectangle => {
                *self = Sketch {
                    kind: Some(ShapeKind::Rectangle),
                    vertices: vec![at],
                    cursor: Some(at),
                    dragging: true,
                    closed_at: None,
                };
                None
            }
            ShapeKind::Polygon => {
                if self.kind != Some(ShapeKind::Polygon) {
                    // second click of a double-click that closed the ring
                    if self.closed_at.take() == Some(at) {
                        return None;
                    }
                    *self = Sketch { kind: Some(ShapeKind::Polygon), ..Sketch::default() };
                }
                if near_first && self.vertices.len() >= 3 {
                    let closed = self.finish();
                    self.closed_at = Some(at);
                    return closed;
                }
                // the two clicks of a double-click land on the same spot
                if self.vertices.last() != Some(&at) {
                    self.vertices.push(at);
                }
                self.cursor = Some(at);
                None
            }
        }
    }

    pub fn move_to(&mut self, at: LonLat) {
        if self.is_active() {
            self.cursor = Some(at);
        }
    }

    pub fn release(&mut self, at: LonLat) -> Option<Geometry> {
        if self.kind != Some(ShapeKind::Rectangle) || !self.dragging {
            return None;
        }
        let anchor = self.vertices.first().copied()?;
        self.cancel();
        let g = Geometry::Rectangle(Bounds::from_corners(anchor, at));
        (!g.is_degenerate()).then_some(g)
    }

    /// Close the polygon being sketched.
    pub fn finish(&mut self) -> Option<Geometry> {
        if self.kind != Some(ShapeKind::Polygon) || self.vertices.len() < 3 {
            return None;
        }
        let g = Geometry::Polygon(std::mem::take(&mut self.vertices));
        self.cancel();
        (!g.is_degenerate()).then_some(g)
    }

    pub fn cancel(&mut self) {
        *self = Sketch::default();
    }

    /// Outline to draw for the current sketch, including the rubber-band cursor.
    pub fn outline(&self) -> Vec<LonLat> {
        match (self.kind, self.cursor) {
            (Some(ShapeKind::Rectangle), Some(c)) => match self.vertices.first() {
                Some(a) => Bounds::from_corners(*a, c).corners().to_vec(),
                None => Vec::new(),
            },
            (Some(ShapeKind::Polygon), c) => {
                let mut v = self.vertices.clone();
                if let Some(c) = c {
                    if v.last() != Some(&c) {
                        v.push(c);
                    }
                }
                v
            }
            _ => Vec::new(),
        }
    }
}
