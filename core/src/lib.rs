//! Core of the daily image puzzle: the quadtree reveal engine, the session
//! record, the game state machine and the final wipe. Rendering and storage
//! are reached through the [`Surface`] and [`KeyValueStore`] ports.

pub use controller::*;
pub use engine::*;
pub use error::*;
pub use puzzle::*;
pub use raster::*;
pub use region::*;
pub use rules::*;
pub use session::*;
pub use snapshot::*;
pub use storage::*;
pub use types::*;
pub use wipe::*;

mod controller;
mod engine;
mod error;
mod puzzle;
mod raster;
mod region;
mod rules;
mod session;
mod snapshot;
mod storage;
mod types;
mod wipe;
