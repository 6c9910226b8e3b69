//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only, so a seed plus an input script replays exactly
//! - Time arrives as real frame deltas scaled by the nominal frame time
//! - Devices are reached only through the `platform` traits

pub mod autopilot;
pub mod character;
pub mod collision;
pub mod field;
pub mod hitbox;
pub mod meter;
pub mod obstacle;
pub mod session;
pub mod tick;

pub use autopilot::Autopilot;
pub use character::{Character, CharacterStatus};
pub use collision::{CollisionResult, check_collision};
pub use field::{Cloud, Ground, ObstacleField};
pub use hitbox::{Hitbox, intersects};
pub use meter::DistanceMeter;
pub use obstacle::{Obstacle, ObstacleKind, ObstacleType};
pub use session::{GamePhase, Session};
