//! Demo autopilot: turns the current session state into player inputs
//!
//! Used by attract mode in the browser and by headless runs. It only reads
//! the session; everything it does goes through ordinary `InputEvent`s.

use super::obstacle::{Obstacle, ObstacleKind};
use super::session::Session;
use crate::consts::CHARACTER_WIDTH;
use crate::platform::InputEvent;

/// Lookahead in frames of travel before a jump is started
const JUMP_LEAD_FRAMES: f64 = 6.0;
/// Lookahead in frames of travel before ducking
const DUCK_LEAD_FRAMES: f64 = 4.0;

/// How to get past an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dodge {
    Jump,
    Duck,
    /// Passes overhead
    Ignore,
}

fn dodge_for(obstacle: &Obstacle) -> Dodge {
    match obstacle.kind {
        ObstacleKind::Small | ObstacleKind::Large => Dodge::Jump,
        ObstacleKind::Flyer if obstacle.y >= 90.0 => Dodge::Jump,
        ObstacleKind::Flyer if obstacle.y >= 70.0 => Dodge::Duck,
        ObstacleKind::Flyer => Dodge::Ignore,
    }
}

/// Autopilot state (whether it is holding duck)
#[derive(Debug, Default, Clone)]
pub struct Autopilot {
    holding_duck: bool,
}

impl Autopilot {
    /// Inputs to send before the next frame
    pub fn inputs(&mut self, session: &Session) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if session.crashed {
            self.holding_duck = false;
            return events;
        }

        // Kick off the first run
        if !session.activated && !session.playing {
            events.push(InputEvent::JumpPressed);
            events.push(InputEvent::JumpReleased);
            return events;
        }

        let character = &session.character;
        let front = character.x + CHARACTER_WIDTH;
        let threat = session
            .field
            .obstacles
            .iter()
            .find(|o| o.x + o.width > character.x);

        let Some(obstacle) = threat else {
            self.release_duck(&mut events);
            return events;
        };

        let gap = obstacle.x - front;
        match dodge_for(obstacle) {
            Dodge::Jump => {
                self.release_duck(&mut events);
                if !character.jumping && gap < session.current_speed * JUMP_LEAD_FRAMES {
                    events.push(InputEvent::JumpPressed);
                    events.push(InputEvent::JumpReleased);
                }
            }
            Dodge::Duck => {
                if !self.holding_duck && !character.jumping && gap < session.current_speed * DUCK_LEAD_FRAMES {
                    events.push(InputEvent::DuckPressed);
                    self.holding_duck = true;
                }
            }
            Dodge::Ignore => self.release_duck(&mut events),
        }

        events
    }

    fn release_duck(&mut self, events: &mut Vec<InputEvent>) {
        if self.holding_duck {
            events.push(InputEvent::DuckReleased);
            self.holding_duck = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessHost;
    use crate::tuning::Tuning;

    fn play(seed: u64, frames: u32) -> (Session, HeadlessHost) {
        let mut host = HeadlessHost::default();
        let mut session = Session::new(Tuning::default(), seed);
        session.start(&mut host.host());
        let mut pilot = Autopilot::default();
        for _ in 0..frames {
            for event in pilot.inputs(&session) {
                host.send(&mut session, event);
            }
            host.step_frame(&mut session);
        }
        (session, host)
    }

    #[test]
    fn test_autopilot_starts_the_game() {
        let (session, _) = play(1, 200);
        assert!(session.activated);
    }

    #[test]
    fn test_autopilot_covers_distance() {
        let (session, host) = play(7, 1200);
        assert!(session.distance_ran > 0.0);
        assert!(host.audio.played.contains(&crate::platform::Cue::Button));
    }

    #[test]
    fn test_dodge_choice_by_height() {
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(3);
        let mut flyer = Obstacle::new(ObstacleKind::Flyer, 10.0, 0.6, 1, 600.0, &mut rng);
        flyer.y = 50.0;
        assert_eq!(dodge_for(&flyer), Dodge::Ignore);
        flyer.y = 75.0;
        assert_eq!(dodge_for(&flyer), Dodge::Duck);
        flyer.y = 100.0;
        assert_eq!(dodge_for(&flyer), Dodge::Jump);
    }
}
