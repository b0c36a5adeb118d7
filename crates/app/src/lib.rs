//! The hamlet town demo.
//!
//! - [`config`]: JSON configuration with defaults for every field
//! - [`time_of_day`]: keyframed day/night lighting
//! - [`town`]: procedural town built from one cube
//! - [`player`]: first-person walker with sphere colliders
//! - [`hamlet`]: everything above tied to one [`hamlet_scene::Scene`]

pub mod config;
pub mod hamlet;
pub mod player;
pub mod time_of_day;
pub mod town;

pub use config::{HamletConfig, TimeState};
pub use hamlet::Hamlet;
pub use player::{Player, PlayerInput};
pub use time_of_day::{TimeOfDay, TimeSample};
pub use town::{Collider, TextureUnits, Town};
