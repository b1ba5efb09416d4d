pub mod model;
pub mod error;
pub mod config;
pub mod hierarchy;
pub mod treemap;
pub mod color;
pub mod legend;
pub mod interaction;
pub mod view;
pub mod export;
pub mod manifest;
pub mod human;


pub use model::*;
pub use error::{Error, Result};
pub use config::*;
pub use view::{compute_view, LeafTile, View};
pub use interaction::{HoverState, HoverUpdate, InteractionController, TooltipState};
