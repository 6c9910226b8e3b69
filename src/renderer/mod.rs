//! Rendering module
//!
//! Drawing is expressed as blits from a sprite atlas onto the canvas. The
//! [`Renderer`] trait is the only device seam; `draw` turns a session into
//! blit intents and `sprites` knows where everything lives in the atlas.

pub mod draw;
pub mod sprites;

pub use draw::draw_frame;
pub use sprites::{SpriteLayout, SpritePos};

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Receives draw intents for one frame
pub trait Renderer {
    /// Atlas layout the renderer's sprite image follows
    fn layout(&self) -> &'static SpriteLayout {
        &sprites::LDPI
    }

    /// Clear an area of the canvas
    fn clear(&mut self, area: Rect);

    /// Copy `src` from the atlas into `dst` on the canvas
    fn blit(&mut self, src: Rect, dst: Rect, opacity: f64);
}
