//! Application settings.
//!
//! Settings are stored as JSON in the browser's `localStorage`. Every field has a
//! default, so a partial or missing document still yields a usable config.

use serde::{Deserialize, Serialize};

use crate::imagery::{ImageFormat, RenderProxy};
use crate::model::{DEFAULT_REGION, VisError, VisParams, find_region};

pub const CONFIG_STORAGE_KEY: &str = "lc_config";
pub const REGION_STORAGE_KEY: &str = "lc_region";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn to_level(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown initial region {0:?}")]
    UnknownRegion(String),
    #[error("date {0:?} is not YYYY-MM-DD")]
    DateFormat(String),
    #[error("date range {start}..{end} is empty")]
    DateRange { start: String, end: String },
    #[error("{0} dimensions must be non-zero")]
    ZeroDimensions(&'static str),
    #[error("region zoom {0} is outside 2..=18")]
    Zoom(u8),
    #[error("invalid render endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("visualisation: {0}")]
    Vis(#[from] VisError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rendering endpoint that accepts a serialised image request.
    pub endpoint: String,
    pub collection: String,
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Exclusive end date, `YYYY-MM-DD`.
    pub end_date: String,
    pub region_zoom: u8,
    pub download_dimensions: u32,
    pub preview_dimensions: u32,
    pub format: ImageFormat,
    pub initial_region: String,
    pub vis: VisParams,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/render".to_string(),
            collection: "GOOGLE/DYNAMICWORLD/V1".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2025-05-01".to_string(),
            region_zoom: 9,
            download_dimensions: 1024,
            preview_dimensions: 512,
            format: ImageFormat::Jpg,
            initial_region: DEFAULT_REGION.to_string(),
            vis: VisParams::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.endpoint)?;
        if find_region(&self.initial_region).is_none() {
            return Err(ConfigError::UnknownRegion(self.initial_region.clone()));
        }
        for date in [&self.start_date, &self.end_date] {
            if !is_iso_date(date) {
                return Err(ConfigError::DateFormat(date.clone()));
            }
        }
        // ISO dates compare correctly as strings
        if self.start_date >= self.end_date {
            return Err(ConfigError::DateRange {
                start: self.start_date.clone(),
                end: self.end_date.clone(),
            });
        }
        if self.download_dimensions == 0 {
            return Err(ConfigError::ZeroDimensions("download"));
        }
        if self.preview_dimensions == 0 {
            return Err(ConfigError::ZeroDimensions("preview"));
        }
        if !(2..=18).contains(&self.region_zoom) {
            return Err(ConfigError::Zoom(self.region_zoom));
        }
        self.vis.validate()?;
        Ok(())
    }

    /// Read the stored config. A missing entry yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match read_storage(CONFIG_STORAGE_KEY) {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    pub fn render_proxy(&self) -> RenderProxy {
        RenderProxy::new(self.endpoint.clone())
    }
}

pub fn read_storage(key: &str) -> Option<String> {
    let store = web_sys::window()?.local_storage().ok()??;
    store.get_item(key).ok()?
}

pub fn write_storage(key: &str, value: &str) {
    if let Some(win) = web_sys::window() {
        if let Ok(Some(store)) = win.local_storage() {
            if store.set_item(key, value).is_err() {
                log::warn!("could not persist {}", key);
            }
        }
    }
}

fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}
