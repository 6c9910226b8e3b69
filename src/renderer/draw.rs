//! Per-frame draw intents
//!
//! Back to front: clouds, ground, obstacles, meter, character, then the
//! game-over panel when the run has ended.

use super::sprites::SpriteLayout;
use super::{Rect, Renderer};
use crate::consts::*;
use crate::sim::{Character, CharacterStatus, DistanceMeter, ObstacleField, Session};

/// Digit glyph size in the text sprite and the pitch between slots
const DIGIT_WIDTH: f64 = 10.0;
const DIGIT_HEIGHT: f64 = 13.0;
const DIGIT_DEST_WIDTH: f64 = 11.0;
/// Meter origin row plus the row offset inside it
const METER_TOP: f64 = 5.0 * 2.0;
const HIGH_SCORE_OPACITY: f64 = 0.8;

/// Game-over text and restart icon sizes
const TEXT_WIDTH: f64 = 191.0;
const TEXT_HEIGHT: f64 = 11.0;
const RESTART_WIDTH: f64 = 36.0;
const RESTART_HEIGHT: f64 = 32.0;

/// Issue every draw for the session's current state
pub fn draw_frame(session: &Session, renderer: &mut dyn Renderer) {
    let layout = renderer.layout();
    let width = session.tuning.canvas_width;
    let height = session.tuning.canvas_height;

    renderer.clear(Rect::new(0.0, 0.0, width, height));

    draw_field(&session.field, layout, renderer);
    draw_meter(&session.meter, width, layout, renderer);
    draw_character(&session.character, layout, renderer);

    if session.crashed {
        draw_game_over(width, height, layout, renderer);
    }
}

fn draw_field(field: &ObstacleField, layout: &SpriteLayout, renderer: &mut dyn Renderer) {
    let s = layout.scale;

    for cloud in &field.clouds {
        renderer.blit(
            Rect::new(layout.cloud.x, layout.cloud.y, CLOUD_WIDTH * s, CLOUD_HEIGHT * s),
            Rect::new(cloud.x, cloud.y, CLOUD_WIDTH, CLOUD_HEIGHT),
            1.0,
        );
    }

    for (x, bumpy) in field.ground.x.iter().zip(field.ground.bumpy) {
        let variant = if bumpy { GROUND_WIDTH * s } else { 0.0 };
        renderer.blit(
            Rect::new(layout.horizon.x + variant, layout.horizon.y, GROUND_WIDTH * s, GROUND_HEIGHT * s),
            Rect::new(*x, GROUND_Y, GROUND_WIDTH, GROUND_HEIGHT),
            1.0,
        );
    }

    for obstacle in &field.obstacles {
        let def = obstacle.def();
        let pos = layout.obstacle(obstacle.kind);
        let size = obstacle.size as f64;
        let source_width = def.width * s;

        // Groups of each size sit side by side in the atlas
        let mut source_x = source_width * size * (0.5 * (size - 1.0)) + pos.x;
        if obstacle.current_frame > 0 {
            source_x += source_width * obstacle.current_frame as f64;
        }

        renderer.blit(
            Rect::new(source_x, pos.y, source_width * size, def.height * s),
            Rect::new(obstacle.x, obstacle.y, def.width * size, def.height),
            1.0,
        );
    }
}

fn draw_meter(meter: &DistanceMeter, canvas_width: f64, layout: &SpriteLayout, renderer: &mut dyn Renderer) {
    let x = canvas_width - DIGIT_DEST_WIDTH * (meter.max_score_units as f64 + 1.0);

    if meter.paint {
        for (slot, &digit) in meter.digits.iter().enumerate() {
            draw_glyph(slot, digit, x, 1.0, layout, renderer);
        }
    }

    let high_x = x - (meter.max_score_units as f64 * 2.0) * DIGIT_WIDTH;
    for (slot, glyph) in meter.high_score.iter().enumerate() {
        if let Some(glyph) = glyph {
            draw_glyph(slot, *glyph, high_x, HIGH_SCORE_OPACITY, layout, renderer);
        }
    }
}

fn draw_glyph(slot: usize, glyph: u8, origin_x: f64, opacity: f64, layout: &SpriteLayout, renderer: &mut dyn Renderer) {
    let s = layout.scale;
    renderer.blit(
        Rect::new(
            layout.text.x + DIGIT_WIDTH * glyph as f64 * s,
            layout.text.y,
            DIGIT_WIDTH * s,
            DIGIT_HEIGHT * s,
        ),
        Rect::new(origin_x + slot as f64 * DIGIT_DEST_WIDTH, METER_TOP, DIGIT_WIDTH, DIGIT_HEIGHT),
        opacity,
    );
}

fn draw_character(character: &Character, layout: &SpriteLayout, renderer: &mut dyn Renderer) {
    let s = layout.scale;
    let crashed = character.status == CharacterStatus::Crashed;

    // Eyes stay open between blinks
    let frame_x = if character.status == CharacterStatus::Waiting && !character.blink_visible {
        CharacterStatus::Waiting.anim().frames[0]
    } else {
        character.frame_offset()
    };

    let (width, dst_x) = if character.ducking && !crashed {
        (CHARACTER_WIDTH_DUCK, character.x)
    } else if character.ducking {
        // Crashed while ducking: the standing pose sits one pixel over
        (CHARACTER_WIDTH, character.x + 1.0)
    } else {
        (CHARACTER_WIDTH, character.x)
    };

    renderer.blit(
        Rect::new(
            frame_x * s + layout.character.x,
            layout.character.y,
            width * s,
            CHARACTER_HEIGHT * s,
        ),
        Rect::new(dst_x, character.y, width, CHARACTER_HEIGHT),
        1.0,
    );
}

fn draw_game_over(width: f64, height: f64, layout: &SpriteLayout, renderer: &mut dyn Renderer) {
    let s = layout.scale;
    let center_x = width / 2.0;

    renderer.blit(
        Rect::new(
            layout.text.x,
            layout.text.y + DIGIT_HEIGHT * s,
            TEXT_WIDTH * s,
            TEXT_HEIGHT * s,
        ),
        Rect::new(
            (center_x - TEXT_WIDTH / 2.0).round(),
            ((height - 25.0) / 3.0).round(),
            TEXT_WIDTH,
            TEXT_HEIGHT,
        ),
        1.0,
    );

    renderer.blit(
        Rect::new(layout.restart.x, layout.restart.y, RESTART_WIDTH * s, RESTART_HEIGHT * s),
        Rect::new(center_x - RESTART_WIDTH / 2.0, height / 2.0, RESTART_WIDTH, RESTART_HEIGHT),
        1.0,
    );
}
