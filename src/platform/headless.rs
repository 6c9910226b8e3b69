//! Headless collaborators: a manual clock, recording renderer and cue log.
//!
//! Drives a session at a fixed frame interval without any display.

use super::{Clock, Cue, CuePlayer, FrameId, FrameSlot, Host, InputEvent};
use crate::renderer::{Rect, Renderer};
use crate::sim::Session;

/// Clock advanced by hand
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    pub now: f64,
    frames: FrameSlot,
}

impl ManualClock {
    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.frames.take()
    }

    pub fn is_pending(&self) -> bool {
        self.frames.is_pending()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now
    }

    fn request_frame(&mut self) -> FrameId {
        self.frames.request()
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.cancel(id);
    }
}

/// One blit intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    pub src: Rect,
    pub dst: Rect,
    pub opacity: f64,
}

/// Keeps the draw intents of the most recent frame
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub clears: u64,
    pub blits: Vec<Blit>,
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, _area: Rect) {
        self.clears += 1;
        self.blits.clear();
    }

    fn blit(&mut self, src: Rect, dst: Rect, opacity: f64) {
        self.blits.push(Blit { src, dst, opacity });
    }
}

/// Records every cue played
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    pub played: Vec<Cue>,
}

impl CuePlayer for CueLog {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}

/// All headless collaborators plus a fixed-step driver
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub clock: ManualClock,
    pub renderer: RecordingRenderer,
    pub audio: CueLog,
    /// Interval between display frames (ms)
    pub frame_ms: f64,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl HeadlessHost {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            clock: ManualClock::default(),
            renderer: RecordingRenderer::default(),
            audio: CueLog::default(),
            frame_ms,
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host {
            renderer: &mut self.renderer,
            audio: &mut self.audio,
            clock: &mut self.clock,
        }
    }

    /// Deliver an input event
    pub fn send(&mut self, session: &mut Session, event: InputEvent) {
        session.handle_input(event, &mut self.host());
    }

    /// Advance one display frame; runs the session if it asked for one
    pub fn step_frame(&mut self, session: &mut Session) -> bool {
        self.clock.advance(self.frame_ms);
        if self.clock.take_pending().is_some() {
            session.update(&mut self.host());
            true
        } else {
            false
        }
    }

    /// Step until the session stops asking for frames or `max_frames` pass
    pub fn run_until_idle(&mut self, session: &mut Session, max_frames: u32) -> u32 {
        let mut frames = 0;
        while frames < max_frames && self.clock.is_pending() {
            self.step_frame(session);
            frames += 1;
        }
        frames
    }
}
