// Small helpers shared by components.

use crate::config::LogLevel;
use crate::model::Bounds;

/// Install the browser console logger and panic hook.
#[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
pub fn init_logging(level: LogLevel) {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(level.to_level()).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
    }
}

pub fn format_bounds(b: &Bounds) -> String {
    let [w, s, e, n] = b.as_array();
    format!("[{:.2}, {:.2}, {:.2}, {:.2}]", w, s, e, n)
}
