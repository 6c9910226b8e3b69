//! Browser collaborators: canvas 2D drawing and an animation-frame clock

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Performance};

use super::{Clock, FrameId, FrameSlot};
use crate::renderer::{Rect, Renderer, SpriteLayout};

/// Draws blits from the sprite image onto a 2D canvas
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    sprite: HtmlImageElement,
    layout: &'static SpriteLayout,
}

impl CanvasRenderer {
    /// Size the canvas for the pixel ratio and pick the matching atlas
    pub fn new(
        canvas: &HtmlCanvasElement,
        sprite: HtmlImageElement,
        width: f64,
        height: f64,
        pixel_ratio: f64,
    ) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let layout = SpriteLayout::for_pixel_ratio(pixel_ratio);
        if layout.scale > 1.0 {
            // Larger backing store, same CSS size
            canvas.set_width((width * layout.scale) as u32);
            canvas.set_height((height * layout.scale) as u32);
            canvas.set_attribute("style", &format!("width:{}px;height:{}px", width, height))?;
            ctx.scale(layout.scale, layout.scale)?;
        } else {
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
        }

        Ok(Self { ctx, sprite, layout })
    }
}

impl Renderer for CanvasRenderer {
    fn layout(&self) -> &'static SpriteLayout {
        self.layout
    }

    fn clear(&mut self, area: Rect) {
        self.ctx.clear_rect(area.x, area.y, area.w, area.h);
    }

    fn blit(&mut self, src: Rect, dst: Rect, opacity: f64) {
        if opacity < 1.0 {
            self.ctx.save();
            self.ctx.set_global_alpha(opacity);
        }
        if let Err(e) = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.sprite,
                src.x,
                src.y,
                src.w,
                src.h,
                dst.x,
                dst.y,
                dst.w,
                dst.h,
            )
        {
            log::debug!("drawImage failed: {:?}", e);
        }
        if opacity < 1.0 {
            self.ctx.restore();
        }
    }
}

/// `performance.now()` time; frame requests are serviced by the page's
/// animation-frame loop
pub struct AnimationFrameClock {
    performance: Option<Performance>,
    frames: FrameSlot,
}

impl AnimationFrameClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        if performance.is_none() {
            log::warn!("performance API unavailable, falling back to Date.now()");
        }
        Self {
            performance,
            frames: FrameSlot::default(),
        }
    }

    /// Consume the pending frame request, if any
    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.frames.take()
    }
}

impl Default for AnimationFrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for AnimationFrameClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }

    fn request_frame(&mut self) -> FrameId {
        self.frames.request()
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.cancel(id);
    }
}
