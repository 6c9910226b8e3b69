//! Player character: motion state machine, jump physics, idle blink

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;
use crate::consts::*;
use crate::tuning::Tuning;

/// Character status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    /// Idle before the first input, blinking now and then
    Waiting,
    Running,
    Jumping,
    Ducking,
    /// Terminal until `reset`
    Crashed,
}

/// Sprite animation for a status: x offsets into the character strip and frame time
#[derive(Debug, Clone, Copy)]
pub struct AnimFrames {
    pub frames: &'static [f64],
    pub ms_per_frame: f64,
}

impl CharacterStatus {
    pub fn anim(self) -> AnimFrames {
        match self {
            CharacterStatus::Waiting => AnimFrames {
                frames: &[44.0, 0.0],
                ms_per_frame: 1000.0 / 3.0,
            },
            CharacterStatus::Running => AnimFrames {
                frames: &[88.0, 132.0],
                ms_per_frame: 1000.0 / 12.0,
            },
            CharacterStatus::Crashed => AnimFrames {
                frames: &[220.0],
                ms_per_frame: 1000.0 / 60.0,
            },
            CharacterStatus::Jumping => AnimFrames {
                frames: &[0.0],
                ms_per_frame: 1000.0 / 60.0,
            },
            CharacterStatus::Ducking => AnimFrames {
                frames: &[262.0, 321.0],
                ms_per_frame: 1000.0 / 8.0,
            },
        }
    }
}

/// Fine collision boxes while ducking
pub const DUCKING_HITBOXES: &[Hitbox] = &[Hitbox::new(1.0, 18.0, 55.0, 25.0)];

/// Fine collision boxes approximating the running silhouette
pub const RUNNING_HITBOXES: &[Hitbox] = &[
    Hitbox::new(22.0, 0.0, 17.0, 16.0),
    Hitbox::new(1.0, 18.0, 30.0, 9.0),
    Hitbox::new(10.0, 35.0, 14.0, 8.0),
    Hitbox::new(1.0, 24.0, 29.0, 5.0),
    Hitbox::new(5.0, 30.0, 21.0, 4.0),
    Hitbox::new(9.0, 34.0, 15.0, 4.0),
];

/// Physics constants copied out of [`Tuning`] at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JumpConfig {
    gravity: f64,
    initial_jump_velocity: f64,
    drop_velocity: f64,
    max_jump_height: f64,
    speed_drop_coefficient: f64,
    start_x: f64,
    intro_duration_ms: f64,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub x: f64,
    pub y: f64,
    /// Top edge while standing on the ground
    pub ground_y: f64,
    /// A jump may only be cut short above this row
    pub min_jump_height: f64,
    pub status: CharacterStatus,
    pub jumping: bool,
    pub ducking: bool,
    pub jump_velocity: f64,
    pub reached_min_height: bool,
    pub speed_drop: bool,
    /// Completed jumps since the last reset
    pub jump_count: u32,
    /// Sliding in from the left edge
    pub intro: bool,

    pub blink_delay: f64,
    pub blink_count: u32,
    /// The waiting frame is only shown once the blink delay has passed
    pub blink_visible: bool,
    anim_start: f64,
    /// Time accumulated through `update` (ms)
    elapsed: f64,

    pub current_frame: usize,
    timer: f64,
    ms_per_frame: f64,

    config: JumpConfig,
}

impl Character {
    pub fn new<R: Rng>(tuning: &Tuning, rng: &mut R) -> Self {
        let ground_y = tuning.ground_y();
        let mut character = Self {
            x: 0.0,
            y: ground_y,
            ground_y,
            min_jump_height: ground_y - tuning.min_jump_height,
            status: CharacterStatus::Waiting,
            jumping: false,
            ducking: false,
            jump_velocity: 0.0,
            reached_min_height: false,
            speed_drop: false,
            jump_count: 0,
            intro: false,
            blink_delay: 0.0,
            blink_count: 0,
            blink_visible: false,
            anim_start: 0.0,
            elapsed: 0.0,
            current_frame: 0,
            timer: 0.0,
            ms_per_frame: CharacterStatus::Waiting.anim().ms_per_frame,
            config: JumpConfig {
                gravity: tuning.gravity,
                initial_jump_velocity: tuning.initial_jump_velocity,
                drop_velocity: tuning.drop_velocity,
                max_jump_height: tuning.max_jump_height,
                speed_drop_coefficient: tuning.speed_drop_coefficient,
                start_x: tuning.start_x,
                intro_duration_ms: tuning.intro_duration_ms,
            },
        };
        character.set_status(CharacterStatus::Waiting, rng);
        character
    }

    /// Switch status and restart its animation
    pub fn set_status<R: Rng>(&mut self, status: CharacterStatus, rng: &mut R) {
        self.status = status;
        self.current_frame = 0;
        self.ms_per_frame = status.anim().ms_per_frame;
        if status == CharacterStatus::Waiting {
            self.anim_start = self.elapsed;
            self.blink_delay = random_blink_delay(rng);
        }
    }

    /// Advance animation timers, the intro slide and the idle blink
    pub fn update<R: Rng>(&mut self, dt: f64, rng: &mut R) {
        self.timer += dt;
        self.elapsed += dt;

        if self.intro && self.x < self.config.start_x {
            self.x += (self.config.start_x / self.config.intro_duration_ms * dt).round();
            self.x = self.x.min(self.config.start_x);
        }

        if self.status == CharacterStatus::Waiting {
            self.blink(rng);
        } else {
            self.blink_visible = true;
        }

        if self.timer >= self.ms_per_frame {
            let frames = self.status.anim().frames.len();
            self.current_frame = if self.current_frame + 1 >= frames {
                0
            } else {
                self.current_frame + 1
            };
            self.timer = 0.0;
        }

        // A speed drop that lands with duck still held turns into a duck
        if self.speed_drop && self.y == self.ground_y {
            self.speed_drop = false;
            self.set_duck(true, rng);
        }
    }

    fn blink<R: Rng>(&mut self, rng: &mut R) {
        self.blink_visible = self.elapsed - self.anim_start >= self.blink_delay;
        if self.blink_visible && self.current_frame == 1 {
            self.blink_delay = random_blink_delay(rng);
            self.anim_start = self.elapsed;
            self.blink_count += 1;
        }
    }

    /// Begin a jump; ignored while already airborne
    pub fn start_jump<R: Rng>(&mut self, speed: f64, rng: &mut R) {
        if self.jumping {
            return;
        }
        self.set_status(CharacterStatus::Jumping, rng);
        // Faster runs jump slightly less explosively
        self.jump_velocity = self.config.initial_jump_velocity - speed / 10.0;
        self.jumping = true;
        self.reached_min_height = false;
        self.speed_drop = false;
    }

    /// Request to stop ascending; honoured only past the minimum height
    pub fn end_jump(&mut self) {
        if self.reached_min_height && self.jump_velocity < self.config.drop_velocity {
            self.jump_velocity = self.config.drop_velocity;
        }
    }

    /// Integrate one jump step. `dt` is scaled by the nominal frame time.
    pub fn update_jump<R: Rng>(&mut self, dt: f64, rng: &mut R) {
        let frames_elapsed = dt / self.status.anim().ms_per_frame;

        if self.speed_drop {
            self.y += (self.jump_velocity * self.config.speed_drop_coefficient * frames_elapsed).round();
        } else {
            self.y += (self.jump_velocity * frames_elapsed).round();
        }
        self.jump_velocity += self.config.gravity * frames_elapsed;

        if self.y < self.min_jump_height || self.speed_drop {
            self.reached_min_height = true;
        }

        if self.y < self.config.max_jump_height || self.speed_drop {
            self.end_jump();
        }

        // Back on the ground
        if self.y >= self.ground_y {
            self.land(rng);
        }

        self.update(dt, rng);
    }

    fn land<R: Rng>(&mut self, rng: &mut R) {
        self.y = self.ground_y;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.set_status(CharacterStatus::Running, rng);
        self.jump_count += 1;
    }

    /// Fall fast and allow the jump to be cut immediately
    pub fn set_drop_speed(&mut self) {
        self.speed_drop = true;
        self.jump_velocity = 1.0;
    }

    pub fn set_duck<R: Rng>(&mut self, ducking: bool, rng: &mut R) {
        if ducking && self.status != CharacterStatus::Ducking {
            self.set_status(CharacterStatus::Ducking, rng);
            self.ducking = true;
        } else if !ducking && self.status == CharacterStatus::Ducking {
            self.set_status(CharacterStatus::Running, rng);
            self.ducking = false;
        }
    }

    /// Freeze on the crash frame
    pub fn crash<R: Rng>(&mut self, rng: &mut R) {
        self.speed_drop = false;
        self.set_status(CharacterStatus::Crashed, rng);
        self.update(100.0, rng);
    }

    /// Back to grounded running
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.y = self.ground_y;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.jump_count = 0;
        self.set_status(CharacterStatus::Running, rng);
    }

    /// Still sliding in from the left
    pub fn is_sliding_in(&self) -> bool {
        self.intro && self.x < self.config.start_x
    }

    /// Full sprite bounds in world space
    pub fn bounds(&self) -> Hitbox {
        Hitbox::new(self.x, self.y, CHARACTER_WIDTH, CHARACTER_HEIGHT)
    }

    /// Fine collision boxes for the current pose
    pub fn hitboxes(&self) -> &'static [Hitbox] {
        if self.ducking {
            DUCKING_HITBOXES
        } else {
            RUNNING_HITBOXES
        }
    }

    /// Sprite strip offset of the frame currently shown
    pub fn frame_offset(&self) -> f64 {
        let frames = self.status.anim().frames;
        frames[self.current_frame.min(frames.len() - 1)]
    }
}

fn random_blink_delay<R: Rng>(rng: &mut R) -> f64 {
    (rng.random::<f64>() * BLINK_TIMING_MS).ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f64 = 1000.0 / 60.0;

    fn character() -> (Character, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(42);
        let c = Character::new(&Tuning::default(), &mut rng);
        (c, rng)
    }

    #[test]
    fn test_starts_waiting_on_ground() {
        let (c, _) = character();
        assert_eq!(c.status, CharacterStatus::Waiting);
        assert_eq!(c.y, 93.0);
        assert_eq!(c.min_jump_height, 63.0);
        assert!(c.blink_delay > 0.0 && c.blink_delay <= BLINK_TIMING_MS);
    }

    #[test]
    fn test_jump_velocity_depends_on_speed() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        assert_eq!(c.status, CharacterStatus::Jumping);
        assert!((c.jump_velocity - (-10.6)).abs() < 1e-9);

        // Second start while airborne is ignored
        c.jump_velocity = -3.0;
        c.start_jump(6.0, &mut rng);
        assert_eq!(c.jump_velocity, -3.0);
    }

    #[test]
    fn test_end_jump_ignored_below_min_height() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        c.update_jump(FRAME, &mut rng);
        assert!(c.y > c.min_jump_height);
        let v = c.jump_velocity;
        c.end_jump();
        assert_eq!(c.jump_velocity, v);
    }

    #[test]
    fn test_end_jump_after_min_height_caps_velocity() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        while !c.reached_min_height {
            c.update_jump(FRAME, &mut rng);
        }
        // Still rising faster than the drop velocity
        assert!(c.jump_velocity < -5.0, "velocity {}", c.jump_velocity);
        c.end_jump();
        assert_eq!(c.jump_velocity, -5.0);
    }

    #[test]
    fn test_full_jump_lands_and_counts() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        let mut peak = c.y;
        for _ in 0..200 {
            if !c.jumping {
                break;
            }
            c.update_jump(FRAME, &mut rng);
            peak = peak.min(c.y);
        }
        assert!(!c.jumping);
        assert_eq!(c.y, c.ground_y);
        assert_eq!(c.jump_count, 1);
        assert_eq!(c.status, CharacterStatus::Running);
        assert!(peak < c.min_jump_height);
    }

    #[test]
    fn test_one_pixel_above_ground_lands_next_tick() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        c.y = c.ground_y - 1.0;
        c.jump_velocity = 1.0;
        c.speed_drop = false;
        c.update_jump(FRAME, &mut rng);
        assert_eq!(c.y, c.ground_y);
        assert!(!c.jumping);
        assert_eq!(c.jump_count, 1);
    }

    #[test]
    fn test_speed_drop_turns_into_duck_on_landing() {
        let (mut c, mut rng) = character();
        c.start_jump(6.0, &mut rng);
        c.update_jump(FRAME, &mut rng);
        c.set_drop_speed();
        for _ in 0..100 {
            if !c.jumping {
                break;
            }
            c.update_jump(FRAME, &mut rng);
        }
        assert!(c.ducking);
        assert_eq!(c.status, CharacterStatus::Ducking);
        assert!(!c.speed_drop);
    }

    #[test]
    fn test_duck_toggle() {
        let (mut c, mut rng) = character();
        c.reset(&mut rng);
        c.set_duck(true, &mut rng);
        assert!(c.ducking);
        assert_eq!(c.hitboxes().len(), 1);
        c.set_duck(true, &mut rng);
        assert!(c.ducking, "pressing duck again keeps ducking");
        c.set_duck(false, &mut rng);
        assert!(!c.ducking);
        assert_eq!(c.hitboxes().len(), 6);
    }

    #[test]
    fn test_blink_counts_cycles() {
        let (mut c, mut rng) = character();
        for _ in 0..10_000 {
            c.update(FRAME, &mut rng);
            if c.blink_count >= 2 {
                break;
            }
        }
        assert!(c.blink_count >= 2);
    }

    #[test]
    fn test_intro_slides_to_start_x() {
        let (mut c, mut rng) = character();
        c.reset(&mut rng);
        c.intro = true;
        assert!(c.is_sliding_in());
        for _ in 0..200 {
            c.update(FRAME, &mut rng);
        }
        assert_eq!(c.x, 50.0);
        assert!(!c.is_sliding_in());
    }
}
