//! Binding to the hosted imagery platform.
//!
//! Mosaicking, clipping and rendering all happen server-side. This module only
//! describes *what* to render as an [`ImageRequest`] and turns it into a URL the
//! browser can load directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::AppConfig;
use crate::model::{Bounds, Geometry, Region, VisParams};

#[derive(Debug, thiserror::Error)]
pub enum ImageryError {
    #[error("invalid render endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("could not encode image request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("geometry encloses no area")]
    EmptyGeometry,
    #[error("thumbnail dimensions must be non-zero")]
    ZeroDimensions,
}

pub type Result<T> = std::result::Result<T, ImageryError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Visualize {
    pub min: i32,
    pub max: i32,
    pub palette: Vec<String>,
}

/// Server-side image expression: filter → mosaic → clip → select → visualize.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageRequest {
    pub collection: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_bounds: Option<Bounds>,
    pub mosaic: bool,
    pub clip: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    pub visualize: Visualize,
    #[serde(skip)]
    pub name: String,
}

impl ImageRequest {
    /// Composite of the dated collection over a registered region, clipped to it.
    pub fn region_composite(config: &AppConfig, region: &Region) -> Self {
        Self {
            collection: config.collection.clone(),
            start_date: config.start_date.clone(),
            end_date: config.end_date.clone(),
            filter_bounds: Some(region.bounds),
            mosaic: true,
            clip: Geometry::Rectangle(region.bounds).to_geojson(),
            select: Some(config.vis.band.clone()),
            visualize: visualize(&config.vis),
            name: format!("Dynamic World {}", region.name),
        }
    }

    /// Label band of the dated mosaic clipped to a drawn shape, rendered to RGB.
    pub fn drawn_composite(config: &AppConfig, geometry: &Geometry) -> Self {
        Self {
            collection: config.collection.clone(),
            start_date: config.start_date.clone(),
            end_date: config.end_date.clone(),
            filter_bounds: None,
            mosaic: true,
            clip: geometry.to_geojson(),
            select: Some(config.vis.band.clone()),
            visualize: visualize(&config.vis),
            name: format!("Drawn {}", geometry.kind().label().to_lowercase()),
        }
    }
}

fn visualize(vis: &VisParams) -> Visualize {
    Visualize { min: vis.min, max: vis.max, palette: vis.palette.colors() }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThumbParams {
    pub region: Geometry,
    pub dimensions: u32,
    pub format: ImageFormat,
}

/// The hosted rendering service. Calls block until a URL is produced.
pub trait ImageryService {
    /// URL of the rendered composite, used as a map overlay.
    fn layer_url(&self, request: &ImageRequest) -> Result<String>;

    /// URL of a downloadable thumbnail covering `params.region`.
    fn thumbnail_url(&self, request: &ImageRequest, params: &ThumbParams) -> Result<String>;
}

/// Renders through an HTTP endpoint that takes the request as a query parameter.
#[derive(Clone, Debug)]
pub struct RenderProxy {
    endpoint: String,
}

impl RenderProxy {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    fn base_url(&self, request: &ImageRequest) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)?;
        let expr = serde_json::to_string(request)?;
        url.query_pairs_mut().append_pair("expr", &expr);
        Ok(url)
    }
}

impl ImageryService for RenderProxy {
    fn layer_url(&self, request: &ImageRequest) -> Result<String> {
        Ok(self.base_url(request)?.into())
    }

    fn thumbnail_url(&self, request: &ImageRequest, params: &ThumbParams) -> Result<String> {
        if params.region.is_degenerate() {
            return Err(ImageryError::EmptyGeometry);
        }
        if params.dimensions == 0 {
            return Err(ImageryError::ZeroDimensions);
        }
        let region = serde_json::to_string(&params.region.to_geojson())?;
        let mut url = self.base_url(request)?;
        url.query_pairs_mut()
            .append_pair("region", &region)
            .append_pair("dimensions", &params.dimensions.to_string())
            .append_pair("format", params.format.as_str());
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LonLat, find_region};

    fn query(url: &str) -> Vec<(String, String)> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn region_request_filters_and_clips_to_region() {
        let config = AppConfig::default();
        let johor = find_region("Johor").unwrap();
        let req = ImageRequest::region_composite(&config, johor);
        assert_eq!(req.filter_bounds, Some(johor.bounds));
        assert_eq!(req.clip, Geometry::Rectangle(johor.bounds).to_geojson());
        assert_eq!(req.name, "Dynamic World Johor");
        assert_eq!(req.visualize.palette.len(), 9);
    }

    #[test]
    fn drawn_request_has_no_bounds_filter() {
        let config = AppConfig::default();
        let g = Geometry::Rectangle(Bounds::new(103.3, 1.4, 103.5, 1.6));
        let req = ImageRequest::drawn_composite(&config, &g);
        assert_eq!(req.filter_bounds, None);
        assert_eq!(req.select.as_deref(), Some("label"));
        assert_eq!((req.visualize.min, req.visualize.max), (0, 8));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("filter_bounds").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn thumbnail_url_carries_region_size_and_format() {
        let proxy = RenderProxy::new("https://render.example.org/v1/thumb");
        let g = Geometry::Rectangle(Bounds::new(103.3, 1.4, 103.5, 1.6));
        let req = ImageRequest::drawn_composite(&AppConfig::default(), &g);
        let params = ThumbParams { region: g.clone(), dimensions: 1024, format: ImageFormat::Jpg };
        let url = proxy.thumbnail_url(&req, &params).unwrap();
        assert!(url.starts_with("https://render.example.org/v1/thumb?"));
        let q = query(&url);
        let get = |k: &str| q.iter().find(|(key, _)| key == k).map(|(_, v)| v.clone()).unwrap();
        assert_eq!(get("dimensions"), "1024");
        assert_eq!(get("format"), "jpg");
        let region: Value = serde_json::from_str(&get("region")).unwrap();
        assert_eq!(region, g.to_geojson());
        let expr: Value = serde_json::from_str(&get("expr")).unwrap();
        assert_eq!(expr["collection"], "GOOGLE/DYNAMICWORLD/V1");
    }

    #[test]
    fn thumbnail_rejects_unrenderable_input() {
        let proxy = RenderProxy::new("https://render.example.org/thumb");
        let line = Geometry::Polygon(vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]);
        let req = ImageRequest::drawn_composite(&AppConfig::default(), &line);
        let params = ThumbParams { region: line, dimensions: 512, format: ImageFormat::Png };
        assert!(matches!(proxy.thumbnail_url(&req, &params), Err(ImageryError::EmptyGeometry)));

        let g = Geometry::Rectangle(Bounds::new(0.0, 0.0, 1.0, 1.0));
        let params = ThumbParams { region: g, dimensions: 0, format: ImageFormat::Png };
        assert!(matches!(proxy.thumbnail_url(&req, &params), Err(ImageryError::ZeroDimensions)));
    }

    #[test]
    fn bad_endpoint_is_reported_on_use() {
        let proxy = RenderProxy::new("not a url");
        let req = ImageRequest::region_composite(&AppConfig::default(), find_region("Sabah").unwrap());
        assert!(matches!(proxy.layer_url(&req), Err(ImageryError::Endpoint(_))));
    }
}
