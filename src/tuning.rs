//! Game balance tuning
//!
//! Every gameplay constant that shapes a run lives here so a session can be
//! built from a JSON file. Missing fields fall back to the stock values.

use serde::{Deserialize, Serialize};

/// Widest obstacle group the sprite atlas has art for
pub const MAX_OBSTACLE_GROUP: u32 = 3;

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Canvas ===
    /// Logical canvas width (obstacles spawn just past this edge)
    pub canvas_width: f64,
    /// Logical canvas height
    pub canvas_height: f64,
    /// Space between the character's feet and the canvas bottom
    pub bottom_pad: f64,
    /// Nominal frame rate the physics constants are expressed in
    pub fps: f64,

    // === Speed ramp ===
    /// Starting scroll speed
    pub speed: f64,
    /// Speed gained per tick while running
    pub acceleration: f64,
    /// Scroll speed cap
    pub max_speed: f64,

    // === Obstacles ===
    /// Time after start before obstacles appear (ms)
    pub clear_time_ms: f64,
    /// Scales the minimum spacing enforced between obstacles
    pub gap_coefficient: f64,
    /// Largest multi-unit obstacle group
    pub max_obstacle_length: u32,
    /// Maximum consecutive spawns of the same obstacle kind
    pub max_obstacle_duplication: usize,

    // === Scenery ===
    /// Cloud scroll speed relative to the ground
    pub bg_cloud_speed: f64,
    /// Chance per tick of a new cloud once the gap allows one
    pub cloud_frequency: f64,
    /// Cloud pool cap
    pub max_clouds: usize,

    // === Character ===
    pub gravity: f64,
    /// Upward velocity at jump start (negative is up)
    pub initial_jump_velocity: f64,
    /// Velocity a released jump is cut to
    pub drop_velocity: f64,
    /// Height above ground before a jump may be cut short
    pub min_jump_height: f64,
    /// Screen row above which the jump is forced to end
    pub max_jump_height: f64,
    /// Descent multiplier during a speed drop
    pub speed_drop_coefficient: f64,
    /// Resting x position after the intro slide
    pub start_x: f64,
    /// Time the intro slide-in takes (ms)
    pub intro_duration_ms: f64,

    // === Session ===
    /// Idle blinks before the waiting animation stops
    pub max_blink_count: u32,
    /// Delay after a crash before the jump key restarts (ms)
    pub gameover_clear_time_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: 600.0,
            canvas_height: 150.0,
            bottom_pad: 10.0,
            fps: 60.0,

            speed: 6.0,
            acceleration: 0.001,
            max_speed: 13.0,

            clear_time_ms: 3000.0,
            gap_coefficient: 0.6,
            max_obstacle_length: 3,
            max_obstacle_duplication: 2,

            bg_cloud_speed: 0.2,
            cloud_frequency: 0.5,
            max_clouds: 6,

            gravity: 0.6,
            initial_jump_velocity: -10.0,
            drop_velocity: -5.0,
            min_jump_height: 30.0,
            max_jump_height: 30.0,
            speed_drop_coefficient: 3.0,
            start_x: 50.0,
            intro_duration_ms: 1500.0,

            max_blink_count: 3,
            gameover_clear_time_ms: 750.0,
        }
    }
}

impl Tuning {
    /// Duration of one nominal frame (ms)
    pub fn ms_per_frame(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Parse tuning from JSON. Unknown fields are ignored, missing ones default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Parse tuning if given, falling back to defaults on any error
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Invalid tuning ({}), using defaults", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Clamp out-of-range values to the nearest playable setting
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let fix = |name: &str, bad: bool, value: &mut f64, replacement: f64| {
            if bad {
                log::warn!("Tuning {} = {} is invalid, using {}", name, value, replacement);
                *value = replacement;
            }
        };

        fix("canvas_width", !(self.canvas_width > 0.0), &mut self.canvas_width, defaults.canvas_width);
        fix("canvas_height", !(self.canvas_height > 0.0), &mut self.canvas_height, defaults.canvas_height);
        fix("fps", !(self.fps > 0.0), &mut self.fps, defaults.fps);
        fix("speed", !(self.speed > 0.0), &mut self.speed, defaults.speed);
        fix("acceleration", !(self.acceleration >= 0.0), &mut self.acceleration, 0.0);
        let speed = self.speed;
        fix("max_speed", !(self.max_speed >= speed), &mut self.max_speed, speed);
        fix("gap_coefficient", !(self.gap_coefficient >= 0.0), &mut self.gap_coefficient, 0.0);
        fix("clear_time_ms", !(self.clear_time_ms >= 0.0), &mut self.clear_time_ms, 0.0);
        fix("cloud_frequency", !(0.0..=1.0).contains(&self.cloud_frequency), &mut self.cloud_frequency, defaults.cloud_frequency);
        fix("speed_drop_coefficient", !(self.speed_drop_coefficient >= 1.0), &mut self.speed_drop_coefficient, 1.0);
        fix("intro_duration_ms", !(self.intro_duration_ms > 0.0), &mut self.intro_duration_ms, defaults.intro_duration_ms);

        // A jump has to rise and then come back down
        fix("gravity", !(self.gravity > 0.0), &mut self.gravity, defaults.gravity);
        fix(
            "initial_jump_velocity",
            !(self.initial_jump_velocity < 0.0),
            &mut self.initial_jump_velocity,
            defaults.initial_jump_velocity,
        );
        let initial = self.initial_jump_velocity;
        fix(
            "drop_velocity",
            !(self.drop_velocity >= initial && self.drop_velocity < 0.0),
            &mut self.drop_velocity,
            initial / 2.0,
        );
        fix("min_jump_height", !(self.min_jump_height >= 0.0), &mut self.min_jump_height, defaults.min_jump_height);
        fix("max_jump_height", !(self.max_jump_height >= 0.0), &mut self.max_jump_height, defaults.max_jump_height);

        if !(1..=MAX_OBSTACLE_GROUP).contains(&self.max_obstacle_length) {
            let clamped = self.max_obstacle_length.clamp(1, MAX_OBSTACLE_GROUP);
            log::warn!(
                "Tuning max_obstacle_length = {} is invalid, using {}",
                self.max_obstacle_length,
                clamped
            );
            self.max_obstacle_length = clamped;
        }
        if self.max_obstacle_duplication == 0 {
            log::warn!("Tuning max_obstacle_duplication = 0 is invalid, using 1");
            self.max_obstacle_duplication = 1;
        }

        self
    }

    /// Y position of the character's top edge while grounded
    pub fn ground_y(&self) -> f64 {
        self.canvas_height - crate::consts::CHARACTER_HEIGHT - self.bottom_pad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_game() {
        let t = Tuning::default();
        assert_eq!(t.speed, 6.0);
        assert_eq!(t.max_speed, 13.0);
        assert_eq!(t.max_obstacle_duplication, 2);
        assert_eq!(t.ground_y(), 93.0);
        assert!((t.ms_per_frame() - 16.666_666).abs() < 0.001);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "speed": 8.0, "max_clouds": 2 }"#).unwrap();
        assert_eq!(t.speed, 8.0);
        assert_eq!(t.max_clouds, 2);
        assert_eq!(t.gravity, Tuning::default().gravity);
    }

    #[test]
    fn test_invalid_values_are_clamped() {
        let t = Tuning::from_json(
            r#"{ "speed": -3.0, "max_speed": 1.0, "gap_coefficient": -1.0, "max_obstacle_duplication": 0 }"#,
        )
        .unwrap();
        assert_eq!(t.speed, 6.0);
        assert_eq!(t.max_speed, 6.0);
        assert_eq!(t.gap_coefficient, 0.0);
        assert_eq!(t.max_obstacle_duplication, 1);
    }

    #[test]
    fn test_jump_physics_clamped() {
        let t = Tuning::from_json(
            r#"{ "gravity": 0.0, "initial_jump_velocity": 4.0, "drop_velocity": -20.0, "max_obstacle_length": 7 }"#,
        )
        .unwrap();
        assert_eq!(t.gravity, 0.6);
        assert_eq!(t.initial_jump_velocity, -10.0);
        assert_eq!(t.drop_velocity, -5.0);
        assert_eq!(t.max_obstacle_length, MAX_OBSTACLE_GROUP);

        let t = Tuning::from_json(r#"{ "initial_jump_velocity": -4.0, "drop_velocity": 0.0, "min_jump_height": -1.0 }"#)
            .unwrap();
        assert_eq!(t.drop_velocity, -2.0);
        assert_eq!(t.min_jump_height, 30.0);
    }

    #[test]
    fn test_weightless_tuning_still_lands() {
        use crate::sim::Character;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        let t = Tuning::from_json(r#"{ "gravity": 0.0 }"#).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut c = Character::new(&t, &mut rng);
        c.start_jump(t.speed, &mut rng);
        for _ in 0..200 {
            if !c.jumping {
                break;
            }
            c.update_jump(t.ms_per_frame(), &mut rng);
        }
        assert!(!c.jumping);
        assert_eq!(c.jump_count, 1);
        assert_eq!(c.y, t.ground_y());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        assert_eq!(Tuning::load_or_default(Some("not json")), Tuning::default());
        assert_eq!(Tuning::load_or_default(None), Tuning::default());
    }
}
