// Map viewport in Web Mercator: center, zoom and the displayed layer stack.
use std::f64::consts::PI;

use crate::model::{Bounds, LonLat};

pub const TILE_PX: f64 = 256.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 18.0;
const MAX_LAT: f64 = 85.051_128_78;

/// A rendered composite shown on the map, stretched over `bounds`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub bounds: Bounds,
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
    pub center: LonLat,
    pub zoom: f64,
    pub layers: Vec<MapLayer>,
}

impl Default for MapView {
    fn default() -> Self {
        Self { center: LonLat::new(0.0, 0.0), zoom: MIN_ZOOM, layers: Vec::new() }
    }
}

fn world_px(p: LonLat, zoom: f64) -> (f64, f64) {
    let scale = TILE_PX * 2f64.powf(zoom);
    let lat = p.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (p.lon + 180.0) / 360.0 * scale;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * scale;
    (x, y)
}

fn world_to_lonlat(x: f64, y: f64, zoom: f64) -> LonLat {
    let scale = TILE_PX * 2f64.powf(zoom);
    let lon = x / scale * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    LonLat::new(lon, lat)
}

impl MapView {
    pub fn center_on(&mut self, bounds: Bounds, zoom: f64) {
        self.center = bounds.center();
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Replace the whole layer stack.
    pub fn reset_layers(&mut self, layers: Vec<MapLayer>) {
        self.layers = layers;
    }

    /// Geographic point to canvas pixels for a canvas of `size` (width, height).
    pub fn project(&self, p: LonLat, size: (f64, f64)) -> (f64, f64) {
        let (cx, cy) = world_px(self.center, self.zoom);
        let (x, y) = world_px(p, self.zoom);
        (x - cx + size.0 * 0.5, y - cy + size.1 * 0.5)
    }

    pub fn unproject(&self, sx: f64, sy: f64, size: (f64, f64)) -> LonLat {
        let (cx, cy) = world_px(self.center, self.zoom);
        world_to_lonlat(sx - size.0 * 0.5 + cx, sy - size.1 * 0.5 + cy, self.zoom)
    }

    /// Move the map content by a screen delta (drag direction).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = world_px(self.center, self.zoom);
        self.center = world_to_lonlat(cx - dx, cy - dy, self.zoom);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom keeping the point under `anchor` (canvas pixels) fixed.
    pub fn zoom_at(&mut self, delta: f64, anchor: (f64, f64), size: (f64, f64)) {
        let before = self.unproject(anchor.0, anchor.1, size);
        self.zoom_by(delta);
        let (ax, ay) = self.project(before, size);
        self.pan_by(anchor.0 - ax, anchor.1 - ay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: (f64, f64) = (800.0, 600.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn center_projects_to_canvas_middle() {
        let mut view = MapView::default();
        view.center_on(Bounds::new(103.10, 1.15, 104.10, 2.10), 9.0);
        let (x, y) = view.project(view.center, SIZE);
        assert!(close(x, 400.0) && close(y, 300.0));
    }

    #[test]
    fn unproject_inverts_project() {
        let view = MapView { center: LonLat::new(101.5, 3.0), zoom: 9.0, layers: Vec::new() };
        let p = LonLat::new(101.7, 2.9);
        let (x, y) = view.project(p, SIZE);
        let back = view.unproject(x, y, SIZE);
        assert!(close(back.lon, p.lon) && close(back.lat, p.lat));
    }

    #[test]
    fn north_is_up() {
        let view = MapView { center: LonLat::new(0.0, 0.0), zoom: 4.0, layers: Vec::new() };
        let (_, y_north) = view.project(LonLat::new(0.0, 10.0), SIZE);
        let (_, y_south) = view.project(LonLat::new(0.0, -10.0), SIZE);
        assert!(y_north < y_south);
    }

    #[test]
    fn pan_moves_content_with_drag() {
        let mut view = MapView { center: LonLat::new(100.3, 5.3), zoom: 9.0, layers: Vec::new() };
        let p = LonLat::new(100.3, 5.3);
        view.pan_by(50.0, -20.0);
        let (x, y) = view.project(p, SIZE);
        assert!(close(x, 450.0) && close(y, 280.0));
    }

    #[test]
    fn zoom_is_clamped_and_anchored() {
        let mut view = MapView { center: LonLat::new(110.0, 2.0), zoom: 9.0, layers: Vec::new() };
        let anchor = (600.0, 150.0);
        let under = view.unproject(anchor.0, anchor.1, SIZE);
        view.zoom_at(1.0, anchor, SIZE);
        assert!(close(view.zoom, 10.0));
        let (x, y) = view.project(under, SIZE);
        assert!((x - anchor.0).abs() < 1e-3 && (y - anchor.1).abs() < 1e-3);

        view.zoom_by(100.0);
        assert!(close(view.zoom, MAX_ZOOM));
        view.zoom_by(-100.0);
        assert!(close(view.zoom, MIN_ZOOM));
    }
}
