//! Per-frame session update and input handling
//!
//! `update` is what the clock calls back on each display frame. It measures
//! the real delta since the previous call, so the simulation runs on variable
//! timesteps scaled against the nominal frame time.

use super::collision::check_collision;
use super::session::Session;
use crate::platform::{Cue, Host, InputEvent};
use crate::renderer;

impl Session {
    /// Advance one frame, draw it and schedule the next one if still live
    pub fn update(&mut self, host: &mut Host<'_>) {
        self.pending_frame = None;

        let now = host.clock.now_ms();
        let mut dt = (now - self.last_time.unwrap_or(now)).max(0.0);
        self.last_time = Some(now);

        if self.playing {
            if self.character.jumping {
                self.character.update_jump(dt, &mut self.rng);
            }

            self.running_time += dt;
            let has_obstacles = self.running_time > self.tuning.clear_time_ms;

            // First landing starts the intro
            if self.character.jump_count == 1 && !self.intro {
                self.game_intro(host);
            }

            // The world holds still until the intro has begun
            if self.intro {
                self.field.update(0.0, self.current_speed, has_obstacles, &mut self.rng);
            } else {
                if !self.activated {
                    dt = 0.0;
                }
                self.field.update(dt, self.current_speed, has_obstacles, &mut self.rng);
            }

            let collision = has_obstacles
                && self
                    .field
                    .lead()
                    .is_some_and(|obstacle| check_collision(obstacle, &self.character).hit());

            if !collision {
                self.distance_ran += self.current_speed * dt / self.tuning.ms_per_frame();
                if self.current_speed < self.tuning.max_speed {
                    self.current_speed = (self.current_speed + self.tuning.acceleration).min(self.tuning.max_speed);
                }
            } else {
                self.game_over(host);
            }

            if self.meter.update(dt, self.distance_ran.ceil()) {
                host.audio.play(Cue::ScoreMilestone);
            }
        }

        if self.playing || (!self.activated && self.character.blink_count < self.tuning.max_blink_count) {
            self.character.update(dt, &mut self.rng);
            if self.intro && !self.character.is_sliding_in() {
                self.start_game();
            }
            self.schedule(host.clock);
        }

        renderer::draw_frame(self, host.renderer);
    }

    /// Apply one player input
    pub fn handle_input(&mut self, event: InputEvent, host: &mut Host<'_>) {
        match event {
            InputEvent::JumpPressed => {
                if self.crashed {
                    return;
                }
                if !self.playing {
                    self.playing = true;
                    self.paused = false;
                    self.last_time = Some(host.clock.now_ms());
                    self.schedule(host.clock);
                }
                if !self.character.jumping && !self.character.ducking {
                    host.audio.play(Cue::Button);
                    self.character.start_jump(self.current_speed, &mut self.rng);
                }
            }
            InputEvent::DuckPressed => {
                if self.playing && !self.crashed {
                    if self.character.jumping {
                        self.character.set_drop_speed();
                    } else if !self.character.ducking {
                        self.character.set_duck(true, &mut self.rng);
                    }
                }
            }
            InputEvent::JumpReleased => {
                if self.is_running() {
                    self.character.end_jump();
                } else if self.crashed {
                    let since_crash = host.clock.now_ms() - self.last_time.unwrap_or(0.0);
                    if since_crash >= self.tuning.gameover_clear_time_ms {
                        self.restart(host);
                    }
                } else if self.paused {
                    self.character.reset(&mut self.rng);
                    self.play(host);
                }
            }
            InputEvent::DuckReleased => {
                self.character.speed_drop = false;
                self.character.set_duck(false, &mut self.rng);
            }
            InputEvent::RestartRequested => {
                if self.crashed {
                    self.restart(host);
                }
            }
        }
    }
}
