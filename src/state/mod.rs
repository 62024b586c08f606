pub mod drawing;
pub mod explorer;
pub mod viewport;

pub use drawing::Sketch;
pub use explorer::{ExplorerAction, ExplorerState};
pub use viewport::MapView;
