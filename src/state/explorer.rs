//! Interaction controller.
//!
//! Tracks the selected region, the drawn shapes and the preview, and derives which
//! panel widgets are visible. The UI only dispatches [`ExplorerAction`]s and renders
//! [`ExplorerState::widgets`]; it never toggles widgets itself.

use std::rc::Rc;

use yew::Reducible;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::imagery::{ImageRequest, ImageryService, ThumbParams};
use crate::model::{Geometry, Region, ShapeKind, find_region};
use crate::state::drawing::DrawingTools;
use crate::state::viewport::{MapLayer, MapView};
use crate::util::format_bounds;

pub const SAVE_LINK_LABEL: &str = "Save JPG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No shape, no preview.
    Idle,
    /// A shape exists and the download button is offered.
    ShapeDrawn,
    /// Preview and export link are shown; the download button is hidden.
    PreviewShown,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub thumbnail_url: String,
    pub download_url: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkWidget {
    pub label: String,
    pub url: Option<String>,
}

/// Visible panel widgets, derived from state on every render.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelWidgets {
    pub download_button_visible: bool,
    pub thumbnail_url: Option<String>,
    pub link: LinkWidget,
}

#[derive(Clone)]
pub struct ExplorerState {
    pub config: Rc<AppConfig>,
    service: Rc<dyn ImageryService>,
    pub region: Option<&'static Region>,
    pub map: MapView,
    pub drawing: DrawingTools,
    pub preview: Option<Preview>,
    /// Last user-facing error message, if any.
    pub diagnostic: Option<String>,
    /// Bumped on every reduce so canvas effects can redraw.
    pub version: u64,
    /// Bumped by every clear; the canvas drops its in-progress sketch when it changes.
    pub clear_count: u64,
}

impl PartialEq for ExplorerState {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && Rc::ptr_eq(&self.service, &other.service)
            && self.config == other.config
            && self.region == other.region
            && self.map == other.map
            && self.drawing == other.drawing
            && self.preview == other.preview
            && self.diagnostic == other.diagnostic
            && self.clear_count == other.clear_count
    }
}

impl ExplorerState {
    pub fn new(config: Rc<AppConfig>, service: Rc<dyn ImageryService>) -> Self {
        Self {
            config,
            service,
            region: None,
            map: MapView::default(),
            drawing: DrawingTools::new(&ShapeKind::ALL),
            preview: None,
            diagnostic: None,
            version: 0,
            clear_count: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.preview.is_some() {
            Phase::PreviewShown
        } else if self.drawing.last_drawn_geometry().is_some() {
            Phase::ShapeDrawn
        } else {
            Phase::Idle
        }
    }

    pub fn widgets(&self) -> PanelWidgets {
        match &self.preview {
            Some(p) => PanelWidgets {
                download_button_visible: false,
                thumbnail_url: Some(p.thumbnail_url.clone()),
                link: LinkWidget {
                    label: SAVE_LINK_LABEL.to_string(),
                    url: Some(p.download_url.clone()),
                },
            },
            None => PanelWidgets {
                download_button_visible: true,
                thumbnail_url: None,
                link: LinkWidget::default(),
            },
        }
    }

    /// Recenter on a registered region and show its composite as the only layer.
    pub fn select_region(&mut self, name: &str) -> Result<()> {
        let region = find_region(name).ok_or_else(|| AppError::UnknownRegion(name.to_string()))?;
        let request = ImageRequest::region_composite(&self.config, region);
        let image_url = self.service.layer_url(&request)?;
        self.map.center_on(region.bounds, self.config.region_zoom as f64);
        self.map.reset_layers(vec![MapLayer {
            name: request.name,
            bounds: region.bounds,
            image_url,
        }]);
        self.region = Some(region);
        Ok(())
    }

    pub fn recenter(&mut self) {
        if let Some(region) = self.region {
            self.map.center_on(region.bounds, self.config.region_zoom as f64);
        }
    }

    pub fn add_shape(&mut self, geometry: Geometry) {
        self.drawing.add_layer(geometry);
    }

    /// Render the last drawn shape and publish its preview and export URL.
    ///
    /// Without a drawn shape this fails with [`AppError::NoShapeDrawn`] and leaves the
    /// state untouched.
    pub fn download(&mut self) -> Result<()> {
        let geometry = self.drawing.last_drawn_geometry().cloned().ok_or(AppError::NoShapeDrawn)?;
        let request = ImageRequest::drawn_composite(&self.config, &geometry);
        let download_url = self.service.thumbnail_url(
            &request,
            &ThumbParams {
                region: geometry.clone(),
                dimensions: self.config.download_dimensions,
                format: self.config.format,
            },
        )?;
        let thumbnail_url = self.service.thumbnail_url(
            &request,
            &ThumbParams {
                region: geometry,
                dimensions: self.config.preview_dimensions,
                format: self.config.format,
            },
        )?;
        self.preview = Some(Preview { thumbnail_url, download_url });
        Ok(())
    }

    /// Remove all shapes and the preview. Safe to call from any phase.
    pub fn clear(&mut self) -> usize {
        self.preview = None;
        self.clear_count = self.clear_count.wrapping_add(1);
        self.drawing.clear()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExplorerAction {
    SelectRegion(String),
    SetDrawMode(Option<ShapeKind>),
    ShapeCompleted(Geometry),
    Download,
    Clear,
    Pan { dx: f64, dy: f64 },
    ZoomAt { delta: f64, anchor: (f64, f64), size: (f64, f64) },
    ZoomBy(f64),
    Recenter,
    DismissDiagnostic,
}

impl Reducible for ExplorerState {
    type Action = ExplorerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use ExplorerAction::*;
        let before = self.phase();
        let mut new = (*self).clone();
        let result = match action {
            SelectRegion(name) => new.select_region(&name).map(|()| {
                log::info!("region -> {}", name);
                new.diagnostic = None;
            }),
            SetDrawMode(mode) => {
                if !new.drawing.set_mode(mode) {
                    log::warn!("draw mode {:?} is not enabled", mode);
                }
                Ok(())
            }
            ShapeCompleted(geometry) => {
                log::debug!("{:?} drawn over {}", geometry.kind(), format_bounds(&geometry.bounds()));
                new.add_shape(geometry);
                log::debug!("{} drawn layer(s)", new.drawing.layer_count());
                new.diagnostic = None;
                Ok(())
            }
            Download => new.download().map(|()| {
                log::info!("preview ready");
                new.diagnostic = None;
            }),
            Clear => {
                let removed = new.clear();
                log::debug!("cleared {} drawn layer(s)", removed);
                new.diagnostic = None;
                Ok(())
            }
            Pan { dx, dy } => {
                new.map.pan_by(dx, dy);
                Ok(())
            }
            ZoomAt { delta, anchor, size } => {
                new.map.zoom_at(delta, anchor, size);
                Ok(())
            }
            ZoomBy(delta) => {
                new.map.zoom_by(delta);
                Ok(())
            }
            Recenter => {
                new.recenter();
                Ok(())
            }
            DismissDiagnostic => {
                new.diagnostic = None;
                Ok(())
            }
        };
        if let Err(e) = result {
            match e {
                AppError::NoShapeDrawn => log::warn!("{}", e),
                _ => log::error!("{}", e),
            }
            new.diagnostic = Some(e.to_string());
        }
        let after = new.phase();
        if before != after {
            log::info!("{:?} -> {:?}", before, after);
        }
        new.version = new.version.wrapping_add(1);
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{self, ImageryError};
    use crate::model::{Bounds, LonLat, REGIONS};

    struct StubImagery;

    impl ImageryService for StubImagery {
        fn layer_url(&self, request: &ImageRequest) -> imagery::Result<String> {
            Ok(format!("stub://layer/{}", request.name))
        }

        fn thumbnail_url(
            &self,
            request: &ImageRequest,
            params: &ThumbParams,
        ) -> imagery::Result<String> {
            Ok(format!("stub://thumb/{}/{}.{}", request.name, params.dimensions, params.format.as_str()))
        }
    }

    struct DownImagery;

    impl ImageryService for DownImagery {
        fn layer_url(&self, _: &ImageRequest) -> imagery::Result<String> {
            Err(ImageryError::ZeroDimensions)
        }

        fn thumbnail_url(&self, _: &ImageRequest, _: &ThumbParams) -> imagery::Result<String> {
            Err(ImageryError::EmptyGeometry)
        }
    }

    fn state() -> ExplorerState {
        ExplorerState::new(Rc::new(AppConfig::default()), Rc::new(StubImagery))
    }

    fn johor_rect() -> Geometry {
        Geometry::Rectangle(Bounds::new(103.40, 1.40, 103.70, 1.70))
    }

    #[test]
    fn every_region_becomes_the_single_layer_with_its_bounds() {
        let mut s = state();
        for region in REGIONS.iter() {
            s.select_region(region.name).unwrap();
            assert_eq!(s.map.layers.len(), 1);
            assert_eq!(s.map.layers[0].bounds, region.bounds);
            assert_eq!(s.map.layers[0].name, format!("Dynamic World {}", region.name));
            assert_eq!(s.map.center, region.bounds.center());
            assert_eq!(s.map.zoom, 9.0);
        }
    }

    #[test]
    fn region_change_keeps_drawn_shapes() {
        let mut s = state();
        s.select_region("Penang").unwrap();
        s.add_shape(johor_rect());
        s.select_region("Sabah").unwrap();
        assert_eq!(s.drawing.layer_count(), 1);
        assert_eq!(s.phase(), Phase::ShapeDrawn);
    }

    #[test]
    fn unknown_region_is_rejected_without_change() {
        let mut s = state();
        s.select_region("Johor").unwrap();
        let before = s.map.clone();
        assert!(matches!(s.select_region("Kedah"), Err(AppError::UnknownRegion(_))));
        assert_eq!(s.map, before);
    }

    #[test]
    fn download_without_shape_reports_and_keeps_state() {
        let mut s = state();
        let before = s.widgets();
        assert!(matches!(s.download(), Err(AppError::NoShapeDrawn)));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.widgets(), before);
        assert!(s.widgets().download_button_visible);
        assert!(s.widgets().thumbnail_url.is_none());
    }

    #[test]
    fn download_with_shape_shows_preview() {
        let mut s = state();
        s.add_shape(johor_rect());
        assert_eq!(s.phase(), Phase::ShapeDrawn);
        s.download().unwrap();
        assert_eq!(s.phase(), Phase::PreviewShown);
        let w = s.widgets();
        assert!(!w.download_button_visible);
        assert_eq!(w.thumbnail_url.as_deref(), Some("stub://thumb/Drawn rectangle/512.jpg"));
        assert_eq!(w.link.label, SAVE_LINK_LABEL);
        assert_eq!(w.link.url.as_deref(), Some("stub://thumb/Drawn rectangle/1024.jpg"));
    }

    #[test]
    fn download_uses_newest_shape() {
        let mut s = state();
        s.add_shape(johor_rect());
        let tri = Geometry::Polygon(vec![
            LonLat::new(103.5, 1.5),
            LonLat::new(103.8, 1.5),
            LonLat::new(103.6, 1.9),
        ]);
        s.add_shape(tri.clone());
        assert_eq!(s.drawing.last_drawn_geometry(), Some(&tri));
        s.download().unwrap();
        assert!(s.preview.unwrap().download_url.contains("Drawn polygon"));
    }

    #[test]
    fn clear_returns_to_idle_from_every_phase() {
        let mut s = state();
        assert_eq!(s.clear(), 0);
        assert_eq!(s.phase(), Phase::Idle);

        s.add_shape(johor_rect());
        s.clear();
        assert_eq!(s.phase(), Phase::Idle);

        s.add_shape(johor_rect());
        s.add_shape(johor_rect());
        s.download().unwrap();
        assert_eq!(s.clear(), 2);
        assert_eq!(s.phase(), Phase::Idle);
        let w = s.widgets();
        assert!(w.download_button_visible);
        assert!(w.thumbnail_url.is_none());
        assert_eq!(w.link, LinkWidget::default());
        assert_eq!(s.drawing.layer_count(), 0);

        // again, while already idle
        s.clear();
        assert_eq!(s.widgets(), w);
    }

    #[test]
    fn button_and_preview_are_never_both_visible() {
        let mut s = state();
        let check = |s: &ExplorerState| {
            let w = s.widgets();
            assert!(w.download_button_visible ^ w.thumbnail_url.is_some());
        };
        check(&s);
        s.add_shape(johor_rect());
        check(&s);
        s.download().unwrap();
        check(&s);
        s.add_shape(johor_rect());
        check(&s);
        s.clear();
        check(&s);
    }

    #[test]
    fn service_failure_leaves_state_untouched() {
        let mut s = ExplorerState::new(Rc::new(AppConfig::default()), Rc::new(DownImagery));
        assert!(matches!(s.select_region("Johor"), Err(AppError::Imagery(_))));
        assert!(s.map.layers.is_empty());
        s.add_shape(johor_rect());
        assert!(matches!(s.download(), Err(AppError::Imagery(_))));
        assert_eq!(s.phase(), Phase::ShapeDrawn);
    }

    #[test]
    fn reducer_records_diagnostic_and_bumps_version() {
        let s = Rc::new(state());
        let s = s.reduce(ExplorerAction::Download);
        assert_eq!(
            s.diagnostic.as_deref(),
            Some("Error: No shape drawn. Please draw a polygon or rectangle first.")
        );
        assert_eq!(s.version, 1);
        assert_eq!(s.phase(), Phase::Idle);

        let s = s.reduce(ExplorerAction::ShapeCompleted(johor_rect()));
        assert!(s.diagnostic.is_none());
        let s = s.reduce(ExplorerAction::Download);
        assert_eq!(s.phase(), Phase::PreviewShown);
        assert_eq!(s.version, 3);
    }

    #[test]
    fn clear_bumps_clear_count_even_when_idle() {
        let s = Rc::new(state());
        let s = s.reduce(ExplorerAction::Clear);
        assert_eq!(s.clear_count, 1);
        let s = s.reduce(ExplorerAction::ShapeCompleted(johor_rect()));
        assert_eq!(s.clear_count, 1);
        let s = s.reduce(ExplorerAction::Clear);
        assert_eq!(s.clear_count, 2);
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn reducer_draw_mode_and_recenter() {
        let s = Rc::new(state());
        let s = s.reduce(ExplorerAction::SetDrawMode(Some(ShapeKind::Rectangle)));
        assert_eq!(s.drawing.active_mode(), Some(ShapeKind::Rectangle));
        let s = s.reduce(ExplorerAction::SelectRegion("Selangor".into()));
        let s = s.reduce(ExplorerAction::Pan { dx: 120.0, dy: 40.0 });
        let s = s.reduce(ExplorerAction::ZoomBy(2.0));
        assert_eq!(s.map.zoom, 11.0);
        let s = s.reduce(ExplorerAction::Recenter);
        assert_eq!(s.map.center, s.region.unwrap().bounds.center());
        assert_eq!(s.map.zoom, 9.0);
    }

    #[test]
    fn johor_scenario() {
        let s = Rc::new(state());
        let s = s.reduce(ExplorerAction::SelectRegion("Johor".into()));
        assert_eq!(s.map.layers.len(), 1);
        assert_eq!(s.map.layers[0].bounds.as_array(), [103.10, 1.15, 104.10, 2.10]);
        assert!((s.map.center.lon - 103.60).abs() < 1e-9);
        assert!((s.map.center.lat - 1.625).abs() < 1e-9);
        assert_eq!(s.map.zoom, 9.0);

        let s = s.reduce(ExplorerAction::ShapeCompleted(johor_rect()));
        let s = s.reduce(ExplorerAction::Download);
        let w = s.widgets();
        assert!(!w.download_button_visible);
        assert!(w.thumbnail_url.is_some());
        assert!(w.link.url.as_deref().is_some_and(|u| !u.is_empty()));

        let s = s.reduce(ExplorerAction::Clear);
        let w = s.widgets();
        assert!(w.download_button_visible);
        assert!(w.thumbnail_url.is_none());
        assert_eq!(s.drawing.layer_count(), 0);
    }
}
