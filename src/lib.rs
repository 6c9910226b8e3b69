//! Nomad Run - A side-scrolling obstacle-dodging runner
//!
//! Core modules:
//! - `sim`: Simulation (character physics, obstacle field, collisions, session loop)
//! - `renderer`: Sprite atlas layout and per-frame draw intents
//! - `platform`: Renderer/audio/clock/input collaborators and their adapters
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use platform::{Clock, Cue, CuePlayer, FrameId, Host, InputEvent};
pub use renderer::{Rect, Renderer};
pub use sim::{
    Autopilot, Character, CharacterStatus, DistanceMeter, GamePhase, Hitbox, Obstacle, ObstacleField, ObstacleKind, Session,
};
pub use tuning::Tuning;

/// Fixed geometry of the game world (sprite sizes, hitbox layouts).
///
/// Gameplay numbers that are worth tweaking live in [`Tuning`] instead.
pub mod consts {
    /// Character sprite width (standing)
    pub const CHARACTER_WIDTH: f64 = 44.0;
    /// Character sprite width while ducking
    pub const CHARACTER_WIDTH_DUCK: f64 = 59.0;
    /// Character sprite height
    pub const CHARACTER_HEIGHT: f64 = 47.0;

    /// Upper bound for the random idle blink delay (ms)
    pub const BLINK_TIMING_MS: f64 = 7000.0;

    /// Upper bound of the gap range relative to the minimum gap
    pub const MAX_GAP_COEFFICIENT: f64 = 1.5;

    /// Cloud sprite size
    pub const CLOUD_WIDTH: f64 = 46.0;
    pub const CLOUD_HEIGHT: f64 = 14.0;
    /// Vertical band clouds are placed in (top-most, bottom-most)
    pub const CLOUD_MAX_SKY_LEVEL: u32 = 30;
    pub const CLOUD_MIN_SKY_LEVEL: u32 = 71;
    /// Horizontal spacing range between consecutive clouds
    pub const CLOUD_MIN_GAP: u32 = 100;
    pub const CLOUD_MAX_GAP: u32 = 400;

    /// Ground strip segment size and screen row
    pub const GROUND_WIDTH: f64 = 600.0;
    pub const GROUND_HEIGHT: f64 = 12.0;
    pub const GROUND_Y: f64 = 127.0;
    /// Probability threshold for picking the bumpy ground variant
    pub const GROUND_BUMP_THRESHOLD: f64 = 0.5;

    /// Score digits shown by the distance meter
    pub const METER_DIGITS: usize = 5;
    /// Raw distance to displayed score conversion
    pub const METER_COEFFICIENT: f64 = 0.025;
    /// Displayed score interval that triggers a milestone
    pub const METER_ACHIEVEMENT_DISTANCE: u64 = 100;
    /// Milestone flash timing
    pub const METER_FLASH_DURATION_MS: f64 = 1000.0 / 4.0;
    pub const METER_FLASH_ITERATIONS: u32 = 3;
}
