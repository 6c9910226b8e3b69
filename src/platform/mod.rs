//! Platform abstraction layer
//!
//! The simulation never touches a device directly. It talks to:
//! - a [`Renderer`] for draw intents
//! - a [`CuePlayer`] for fire-and-forget sound cues
//! - a [`Clock`] for timestamps and next-frame scheduling
//!
//! and receives [`InputEvent`]s from whatever maps keys/pointers.
//!
//! `headless` implements these for tests and the native binary; `web`
//! implements them on top of the browser.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use crate::renderer::Renderer;

/// Discrete player inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    JumpPressed,
    JumpReleased,
    DuckPressed,
    DuckReleased,
    RestartRequested,
}

impl InputEvent {
    /// Map a keyboard `code` to an input; `down` is true on key press
    pub fn from_key(code: &str, down: bool) -> Option<InputEvent> {
        match (code, down) {
            ("Space" | "ArrowUp", true) => Some(InputEvent::JumpPressed),
            ("Space" | "ArrowUp", false) => Some(InputEvent::JumpReleased),
            ("ArrowDown", true) => Some(InputEvent::DuckPressed),
            ("ArrowDown", false) => Some(InputEvent::DuckReleased),
            ("Enter", true) => Some(InputEvent::RestartRequested),
            _ => None,
        }
    }
}

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Jump / start / restart
    Button,
    /// Collision
    Hit,
    /// Score milestone reached
    ScoreMilestone,
}

/// Plays cues. Missing or muted audio is a silent no-op.
pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

/// Handle of a scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Monotonic time and display-synced frame scheduling
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> f64;
    /// Ask for `Session::update` to be called on the next display frame
    fn request_frame(&mut self) -> FrameId;
    /// Withdraw a frame request
    fn cancel_frame(&mut self, id: FrameId);
}

/// Collaborators handed to the session for one call
pub struct Host<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub audio: &'a mut dyn CuePlayer,
    pub clock: &'a mut dyn Clock,
}

/// Single pending-frame slot shared by the clock adapters
#[derive(Debug, Default, Clone)]
pub struct FrameSlot {
    next_id: u64,
    pending: Option<FrameId>,
}

impl FrameSlot {
    pub fn request(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(id);
        id
    }

    pub fn cancel(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    /// Consume the pending request, if any
    pub fn take(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
