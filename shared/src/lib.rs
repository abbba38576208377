pub mod area;
pub mod colors;
pub mod events;
pub mod join;
pub mod state;
pub mod statistic;
pub mod stats;
pub mod surface;
pub mod tooltip;
pub mod user;

pub use area::*;
pub use colors::area_fill_color;
pub use events::*;
pub use join::{AreaIndex, EnrichedArea, join};
pub use state::MapState;
pub use statistic::*;
pub use stats::*;
pub use surface::*;
pub use user::*;
