//! Session state and lifecycle transitions
//!
//! A session owns one run's world (character, obstacle field, meter) plus the
//! flags that drive the loop. Frame scheduling is tracked here: at most one
//! frame request is outstanding at any time.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::character::{Character, CharacterStatus};
use super::field::ObstacleField;
use super::meter::DistanceMeter;
use crate::platform::{Clock, Cue, FrameId, Host};
use crate::tuning::Tuning;

/// Coarse phase derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle before the first jump
    Waiting,
    /// Character sliding in after the first jump
    Intro,
    /// Active run
    Playing,
    /// Stopped while the page is hidden
    Paused,
    /// Run ended by a collision
    Crashed,
}

/// One game session
#[derive(Debug, Clone)]
pub struct Session {
    pub tuning: Tuning,
    /// Seed for reproducibility
    pub seed: u64,
    pub(super) rng: Pcg32,

    pub character: Character,
    pub field: ObstacleField,
    pub meter: DistanceMeter,

    /// The first jump has started the game
    pub activated: bool,
    pub playing: bool,
    pub crashed: bool,
    pub paused: bool,
    /// Intro slide in progress
    pub intro: bool,

    /// Timestamp of the previous update (ms)
    pub last_time: Option<f64>,
    /// Time played since the intro ended (ms)
    pub running_time: f64,
    /// Raw distance covered this run
    pub distance_ran: f64,
    pub current_speed: f64,
    /// Best raw distance this session (already rounded up)
    pub high_score: f64,
    /// Runs started
    pub play_count: u32,

    pub(super) pending_frame: Option<FrameId>,
}

impl Session {
    /// Create a new session with the given seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let character = Character::new(&tuning, &mut rng);
        let field = ObstacleField::new(&tuning, &mut rng);
        let current_speed = tuning.speed;
        log::info!("New session with seed: {}", seed);

        Self {
            tuning,
            seed,
            rng,
            character,
            field,
            meter: DistanceMeter::new(),
            activated: false,
            playing: false,
            crashed: false,
            paused: false,
            intro: false,
            last_time: None,
            running_time: 0.0,
            distance_ran: 0.0,
            current_speed,
            high_score: 0.0,
            play_count: 0,
            pending_frame: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.crashed {
            GamePhase::Crashed
        } else if self.paused {
            GamePhase::Paused
        } else if self.intro {
            GamePhase::Intro
        } else if self.playing && self.activated {
            GamePhase::Playing
        } else {
            GamePhase::Waiting
        }
    }

    /// A frame request is outstanding
    pub fn is_running(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Score shown on the meter for the current distance
    pub fn score(&self) -> u64 {
        DistanceMeter::displayed(self.distance_ran.ceil())
    }

    /// Draw the first frame and start the idle animation
    pub fn start(&mut self, host: &mut Host<'_>) {
        self.update(host);
    }

    pub(super) fn schedule(&mut self, clock: &mut dyn Clock) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(clock.request_frame());
        }
    }

    // === Lifecycle ===

    /// First landing: begin the intro, or restart after a crash
    pub(super) fn game_intro(&mut self, host: &mut Host<'_>) {
        if !self.activated && !self.crashed {
            self.intro = true;
            self.character.intro = true;
            self.playing = true;
            self.activated = true;
            log::info!("Intro started");
        } else if self.crashed {
            self.restart(host);
        }
    }

    /// Intro finished; real play starts now
    pub(super) fn start_game(&mut self) {
        self.running_time = 0.0;
        self.intro = false;
        self.character.intro = false;
        self.play_count += 1;
        log::info!("Run {} started", self.play_count);
    }

    pub(super) fn game_over(&mut self, host: &mut Host<'_>) {
        host.audio.play(Cue::Hit);
        self.stop(host);
        self.crashed = true;
        self.meter.achievement = false;
        self.character.crash(&mut self.rng);

        if self.distance_ran > self.high_score {
            self.high_score = self.distance_ran.ceil();
            self.meter.set_high_score(self.high_score);
        }

        self.last_time = Some(host.clock.now_ms());
        log::info!(
            "Game over at distance {} (score {}, best {})",
            self.distance_ran.ceil(),
            self.score(),
            DistanceMeter::displayed(self.high_score)
        );
    }

    /// Halt the loop and cancel the outstanding frame
    pub fn stop(&mut self, host: &mut Host<'_>) {
        self.playing = false;
        self.paused = true;
        if let Some(id) = self.pending_frame.take() {
            host.clock.cancel_frame(id);
        }
    }

    /// Resume from a pause; a crashed run stays crashed
    pub fn play(&mut self, host: &mut Host<'_>) {
        if self.crashed {
            return;
        }
        self.playing = true;
        self.paused = false;
        self.character.set_status(CharacterStatus::Running, &mut self.rng);
        self.last_time = Some(host.clock.now_ms());
        if self.pending_frame.is_none() {
            self.update(host);
        }
    }

    /// Start a fresh run. Ignored while a frame is already scheduled.
    pub fn restart(&mut self, host: &mut Host<'_>) {
        if self.pending_frame.is_some() {
            log::debug!("Restart ignored, frame already pending");
            return;
        }

        self.play_count += 1;
        self.running_time = 0.0;
        self.playing = true;
        self.crashed = false;
        self.paused = false;
        self.distance_ran = 0.0;
        self.current_speed = self.tuning.speed;
        self.last_time = Some(host.clock.now_ms());

        self.meter.reset();
        self.field.reset();
        self.character.reset(&mut self.rng);
        host.audio.play(Cue::Button);
        log::info!("Game restarted with seed: {} (run {})", self.seed, self.play_count);

        self.update(host);
    }

    /// Page visibility changed
    pub fn set_visible(&mut self, visible: bool, host: &mut Host<'_>) {
        // Before the first run there is nothing to pause
        if !self.activated {
            return;
        }
        if !visible {
            self.stop(host);
        } else if self.paused && !self.crashed {
            self.character.reset(&mut self.rng);
            self.play(host);
        }
    }
}
