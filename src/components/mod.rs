pub mod app;
pub mod control_panel;
pub mod draw_toolbar;
pub mod legend;
pub mod legend_panel;
pub mod map_canvas;
pub mod map_controls;

pub use app::{App, AppProps};
