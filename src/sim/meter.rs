//! Distance meter: displayed score, milestone flash and high-score digits

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Glyph indices past the digits in the text sprite
pub const GLYPH_H: u8 = 10;
pub const GLYPH_I: u8 = 11;

/// Score display state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMeter {
    /// Digits currently shown (most significant first)
    pub digits: Vec<u8>,
    /// High score glyphs: `H`, `I`, a blank, then digits
    pub high_score: Vec<Option<u8>>,
    /// Number of digit slots
    pub max_score_units: usize,
    /// Largest value the slots can show
    pub max_score: u64,
    /// A milestone was reached and the digits are flashing
    pub achievement: bool,
    /// Digits visible this frame (false during the off half of a flash)
    pub paint: bool,
    flash_timer: f64,
    flash_iterations: u32,
}

impl Default for DistanceMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceMeter {
    pub fn new() -> Self {
        Self {
            digits: vec![0; METER_DIGITS],
            high_score: Vec::new(),
            max_score_units: METER_DIGITS,
            max_score: 10u64.pow(METER_DIGITS as u32) - 1,
            achievement: false,
            paint: true,
            flash_timer: 0.0,
            flash_iterations: 0,
        }
    }

    /// Raw distance to displayed units
    pub fn displayed(distance: f64) -> u64 {
        if distance > 0.0 {
            (distance * METER_COEFFICIENT).round() as u64
        } else {
            0
        }
    }

    /// Update for a frame; returns true when a milestone cue should play
    pub fn update(&mut self, dt: f64, distance: f64) -> bool {
        self.paint = true;
        let mut play_sound = false;

        if !self.achievement {
            let shown = Self::displayed(distance);

            // One extra slot is allowed before the counter wraps
            if shown > self.max_score && self.max_score_units == METER_DIGITS {
                self.max_score_units += 1;
                self.max_score = self.max_score * 10 + 9;
            }

            if shown > 0 {
                if shown % METER_ACHIEVEMENT_DISTANCE == 0 {
                    self.achievement = true;
                    self.flash_timer = 0.0;
                    play_sound = true;
                }
                self.digits = padded_digits(shown, self.max_score_units);
            } else {
                self.digits = vec![0; self.max_score_units];
            }
        } else if self.flash_iterations <= METER_FLASH_ITERATIONS {
            self.flash_timer += dt;
            if self.flash_timer < METER_FLASH_DURATION_MS {
                self.paint = false;
            } else if self.flash_timer > METER_FLASH_DURATION_MS * 2.0 {
                self.flash_timer = 0.0;
                self.flash_iterations += 1;
            }
        } else {
            self.achievement = false;
            self.flash_iterations = 0;
            self.flash_timer = 0.0;
        }

        play_sound
    }

    /// Store the high score glyphs for a raw distance
    pub fn set_high_score(&mut self, distance: f64) {
        let shown = Self::displayed(distance);
        let mut glyphs = vec![Some(GLYPH_H), Some(GLYPH_I), None];
        glyphs.extend(padded_digits(shown, self.max_score_units).into_iter().map(Some));
        self.high_score = glyphs;
    }

    /// Back to zero; the high score is kept
    pub fn reset(&mut self) {
        self.achievement = false;
        self.flash_iterations = 0;
        self.flash_timer = 0.0;
        self.update(0.0, 0.0);
    }
}

/// Last `width` decimal digits of `value`, zero padded
fn padded_digits(value: u64, width: usize) -> Vec<u8> {
    let text = format!("{:0width$}", value, width = width);
    text[text.len() - width..]
        .bytes()
        .map(|b| b - b'0')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_follow_distance() {
        let mut m = DistanceMeter::new();
        m.update(16.0, 1234.0 / METER_COEFFICIENT);
        assert_eq!(m.digits, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_milestone_plays_once_then_flashes() {
        let mut m = DistanceMeter::new();
        assert!(m.update(16.0, 100.0 / METER_COEFFICIENT));
        assert!(m.achievement);
        // Flashing suppresses further milestones
        assert!(!m.update(16.0, 100.0 / METER_COEFFICIENT));
        assert!(!m.paint);

        let mut frames = 0;
        while m.achievement && frames < 1000 {
            m.update(16.0, 110.0 / METER_COEFFICIENT);
            frames += 1;
        }
        assert!(!m.achievement);
        assert!(frames > 60, "flash lasts a few iterations");
    }

    #[test]
    fn test_extra_digit_once() {
        let mut m = DistanceMeter::new();
        m.update(16.0, 123_456.0 / METER_COEFFICIENT);
        assert_eq!(m.max_score_units, 6);
        assert_eq!(m.digits, vec![1, 2, 3, 4, 5, 6]);
        m.update(16.0, 1_234_567.0 / METER_COEFFICIENT);
        assert_eq!(m.max_score_units, 6);
        assert_eq!(m.digits, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_high_score_glyphs() {
        let mut m = DistanceMeter::new();
        m.set_high_score(2000.0);
        assert_eq!(
            m.high_score,
            vec![Some(GLYPH_H), Some(GLYPH_I), None, Some(0), Some(0), Some(0), Some(5), Some(0)]
        );
    }

    #[test]
    fn test_reset_zeroes_digits() {
        let mut m = DistanceMeter::new();
        m.update(16.0, 4000.0);
        m.reset();
        assert_eq!(m.digits, vec![0; 5]);
        assert!(!m.achievement);
    }
}
