use std::rc::Rc;

mod components;
mod config;
mod error;
mod imagery;
mod model;
mod state;
mod util;

use components::{App, AppProps};
use config::AppConfig;

fn main() {
    let loaded = AppConfig::load();
    util::init_logging(loaded.as_ref().map(|c| c.log_level).unwrap_or_default());
    let config = loaded.unwrap_or_else(|e| {
        log::warn!("ignoring stored config: {}", e);
        AppConfig::default()
    });
    log::info!("land-cover explorer starting, initial region {}", config.initial_region);
    yew::Renderer::<App>::with_props(AppProps { config: Rc::new(config) }).render();
}
