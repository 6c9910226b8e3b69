//! Obstacle kinds and instances
//!
//! Each kind has a static definition (size, candidate heights, hitbox
//! template). Instances derive their own hitboxes from the template, so
//! widening a multi-unit group never touches the shared table.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;
use crate::consts::MAX_GAP_COEFFICIENT;

/// Obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Short ground obstacle, can be grouped early
    Small,
    /// Tall ground obstacle
    Large,
    /// Airborne obstacle at one of several heights, only at high speed
    Flyer,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Small, ObstacleKind::Large, ObstacleKind::Flyer];

    pub fn def(self) -> &'static ObstacleType {
        match self {
            ObstacleKind::Small => &SMALL,
            ObstacleKind::Large => &LARGE,
            ObstacleKind::Flyer => &FLYER,
        }
    }
}

/// Static per-kind definition
#[derive(Debug)]
pub struct ObstacleType {
    pub kind: ObstacleKind,
    pub width: f64,
    pub height: f64,
    /// Candidate top edges; one is picked per instance
    pub y_positions: &'static [f64],
    /// Below this speed the instance is always a single unit
    pub multiple_speed: f64,
    /// Base spacing before speed scaling
    pub min_gap: f64,
    /// Kind never spawns below this speed
    pub min_speed: f64,
    /// Collision geometry in local space
    pub hitboxes: &'static [Hitbox],
    /// Animation frame count (0 = static)
    pub num_frames: u32,
    /// Time per animation frame (ms)
    pub frame_rate: f64,
    /// Extra speed relative to the ground (sign picked per instance)
    pub speed_offset: f64,
}

static SMALL: ObstacleType = ObstacleType {
    kind: ObstacleKind::Small,
    width: 17.0,
    height: 35.0,
    y_positions: &[105.0],
    multiple_speed: 4.0,
    min_gap: 120.0,
    min_speed: 0.0,
    hitboxes: &[
        Hitbox::new(0.0, 7.0, 5.0, 27.0),
        Hitbox::new(4.0, 0.0, 6.0, 34.0),
        Hitbox::new(10.0, 4.0, 7.0, 14.0),
    ],
    num_frames: 0,
    frame_rate: 0.0,
    speed_offset: 0.0,
};

static LARGE: ObstacleType = ObstacleType {
    kind: ObstacleKind::Large,
    width: 25.0,
    height: 50.0,
    y_positions: &[90.0],
    multiple_speed: 7.0,
    min_gap: 120.0,
    min_speed: 0.0,
    hitboxes: &[
        Hitbox::new(0.0, 12.0, 7.0, 38.0),
        Hitbox::new(8.0, 0.0, 7.0, 49.0),
        Hitbox::new(13.0, 10.0, 10.0, 38.0),
    ],
    num_frames: 0,
    frame_rate: 0.0,
    speed_offset: 0.0,
};

static FLYER: ObstacleType = ObstacleType {
    kind: ObstacleKind::Flyer,
    width: 46.0,
    height: 40.0,
    y_positions: &[100.0, 75.0, 50.0],
    multiple_speed: 999.0,
    min_gap: 150.0,
    min_speed: 8.5,
    hitboxes: &[
        Hitbox::new(15.0, 15.0, 16.0, 5.0),
        Hitbox::new(18.0, 21.0, 24.0, 6.0),
        Hitbox::new(2.0, 14.0, 4.0, 3.0),
        Hitbox::new(6.0, 10.0, 4.0, 7.0),
        Hitbox::new(10.0, 8.0, 6.0, 9.0),
    ],
    num_frames: 2,
    frame_rate: 1000.0 / 6.0,
    speed_offset: 0.8,
};

/// Instance hitboxes for a group of `size` units.
///
/// The middle box stretches to cover the extra width and the trailing box
/// moves to the new right edge.
pub fn derive_hitboxes(template: &[Hitbox], size: u32, width: f64) -> Vec<Hitbox> {
    let mut boxes = template.to_vec();
    if size > 1 && boxes.len() >= 3 {
        let head = boxes[0].width;
        let tail = boxes[2].width;
        boxes[1] = Hitbox::new(boxes[1].x, boxes[1].y, width - head - tail, boxes[1].height);
        boxes[2] = Hitbox::new(width - tail, boxes[2].y, tail, boxes[2].height);
    }
    boxes
}

/// Smallest allowed spacing after an obstacle of `width` at `speed`
pub fn min_gap(width: f64, speed: f64, type_min_gap: f64, gap_coefficient: f64) -> i64 {
    (width * speed + type_min_gap * gap_coefficient).round() as i64
}

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Units in the group (1..=max length)
    pub size: u32,
    /// Total width (kind width * size)
    pub width: f64,
    pub x: f64,
    pub y: f64,
    /// Hitboxes in obstacle-local space
    pub hitboxes: Vec<Hitbox>,
    /// Distance required before the next obstacle
    pub gap: f64,
    /// Signed speed relative to the ground
    pub speed_offset: f64,
    pub current_frame: u32,
    pub timer: f64,
    /// Scrolled off the left edge
    pub remove: bool,
    /// The obstacle queued behind this one already exists
    pub following_spawned: bool,
}

impl Obstacle {
    /// Create an obstacle just past the right edge of the canvas
    pub fn new<R: Rng>(
        kind: ObstacleKind,
        speed: f64,
        gap_coefficient: f64,
        max_length: u32,
        canvas_width: f64,
        rng: &mut R,
    ) -> Self {
        let def = kind.def();

        let mut size = rng.random_range(1..=max_length.max(1));
        // Groups only once the run is fast enough
        if size > 1 && def.multiple_speed > speed {
            size = 1;
        }
        let width = def.width * size as f64;

        let y = if def.y_positions.len() > 1 {
            def.y_positions[rng.random_range(0..def.y_positions.len())]
        } else {
            def.y_positions[0]
        };

        let speed_offset = if def.speed_offset != 0.0 {
            if rng.random_bool(0.5) {
                def.speed_offset
            } else {
                -def.speed_offset
            }
        } else {
            0.0
        };

        let mut obstacle = Self {
            kind,
            size,
            width,
            x: canvas_width + def.width,
            y,
            hitboxes: derive_hitboxes(def.hitboxes, size, width),
            gap: 0.0,
            speed_offset,
            current_frame: 0,
            timer: 0.0,
            remove: false,
            following_spawned: false,
        };
        obstacle.gap = obstacle.random_gap(gap_coefficient, speed, rng);
        obstacle
    }

    pub fn def(&self) -> &'static ObstacleType {
        self.kind.def()
    }

    /// Pick a gap in [min gap, 1.5 * min gap]
    fn random_gap<R: Rng>(&self, gap_coefficient: f64, speed: f64, rng: &mut R) -> f64 {
        let min = min_gap(self.width, speed, self.def().min_gap, gap_coefficient);
        debug_assert!(min >= 0, "negative obstacle gap {}", min);
        let min = min.max(0);
        let max = (min as f64 * MAX_GAP_COEFFICIENT).round() as i64;
        rng.random_range(min..=max) as f64
    }

    /// Scroll left and animate. `fps` converts per-frame speed to per-ms.
    pub fn update(&mut self, dt: f64, speed: f64, fps: f64) {
        if self.remove {
            return;
        }

        let speed = speed + self.speed_offset;
        self.x -= (speed * fps / 1000.0 * dt).floor();

        let def = self.def();
        if def.num_frames > 0 {
            self.timer += dt;
            if self.timer >= def.frame_rate {
                self.current_frame = if self.current_frame == def.num_frames - 1 {
                    0
                } else {
                    self.current_frame + 1
                };
                self.timer = 0.0;
            }
        }

        if !self.is_visible() {
            self.remove = true;
        }
    }

    /// Any part still on screen
    pub fn is_visible(&self) -> bool {
        self.x + self.width > 0.0
    }

    /// Whole-obstacle bounds in world space
    pub fn bounds(&self) -> Hitbox {
        Hitbox::new(self.x, self.y, self.width, self.def().height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_gap_scenario() {
        // width 17, min gap 120, coefficient 0.6, speed 6
        let min = min_gap(17.0, 6.0, 120.0, 0.6);
        assert_eq!(min, 174);
        assert_eq!((min as f64 * MAX_GAP_COEFFICIENT).round() as i64, 261);

        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let o = Obstacle::new(ObstacleKind::Small, 6.0, 0.6, 1, 600.0, &mut rng);
            assert!((174.0..=261.0).contains(&o.gap), "gap {}", o.gap);
        }
    }

    #[test]
    fn test_size_clamped_below_multiple_speed() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let o = Obstacle::new(ObstacleKind::Large, 6.0, 0.6, 3, 600.0, &mut rng);
            assert_eq!(o.size, 1);
            assert_eq!(o.width, 25.0);
        }
    }

    #[test]
    fn test_group_hitboxes_cover_width() {
        let boxes = derive_hitboxes(SMALL.hitboxes, 3, 51.0);
        assert_eq!(boxes[1].width, 51.0 - 5.0 - 7.0);
        assert_eq!(boxes[2].x, 51.0 - 7.0);
        // Template untouched
        assert_eq!(SMALL.hitboxes[2].x, 10.0);
    }

    #[test]
    fn test_single_unit_keeps_template() {
        assert_eq!(derive_hitboxes(LARGE.hitboxes, 1, 25.0), LARGE.hitboxes.to_vec());
    }

    #[test]
    fn test_spawns_off_screen_and_scrolls() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(ObstacleKind::Small, 6.0, 0.6, 3, 600.0, &mut rng);
        assert_eq!(o.x, 617.0);
        // 6 * 60 / 1000 * 16 = 5.76 -> 5
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x, 612.0);
        assert!(!o.remove);
    }

    #[test]
    fn test_retired_once_off_left_edge() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(ObstacleKind::Small, 6.0, 0.6, 1, 600.0, &mut rng);
        assert_eq!(o.width, 17.0);

        // Each step moves 5; right edge at 2 is still on screen
        o.x = -10.0;
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x + o.width, 2.0);
        assert!(!o.remove);

        // Next step takes it fully off screen
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x + o.width, -3.0);
        assert!(o.remove);
        let x = o.x;
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x, x, "retired obstacles are not advanced");
    }

    #[test]
    fn test_right_edge_on_zero_is_retired() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(ObstacleKind::Small, 6.0, 0.6, 1, 600.0, &mut rng);
        o.x = -12.0;
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x + o.width, 0.0);
        assert!(!o.is_visible());
        assert!(o.remove);
        let x = o.x;
        o.update(16.0, 6.0, 60.0);
        assert_eq!(o.x, x, "retired obstacles are not advanced");
    }

    #[test]
    fn test_flyer_animates_and_offsets_speed() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut o = Obstacle::new(ObstacleKind::Flyer, 10.0, 0.6, 3, 600.0, &mut rng);
        assert_eq!(o.size, 1);
        assert_eq!(o.speed_offset.abs(), 0.8);
        assert!(FLYER.y_positions.contains(&o.y));
        o.update(200.0, 10.0, 60.0);
        assert_eq!(o.current_frame, 1);
        o.update(200.0, 10.0, 60.0);
        assert_eq!(o.current_frame, 0);
    }

    proptest! {
        #[test]
        fn prop_gap_within_bounds(seed in any::<u64>(), speed in 6.0..13.0f64, kind_idx in 0usize..3) {
            let kind = ObstacleKind::ALL[kind_idx];
            let mut rng = Pcg32::seed_from_u64(seed);
            let o = Obstacle::new(kind, speed, 0.6, 3, 600.0, &mut rng);
            let min = min_gap(o.width, speed, kind.def().min_gap, 0.6) as f64;
            prop_assert!(o.gap >= min);
            prop_assert!(o.gap <= (min * MAX_GAP_COEFFICIENT).round());
        }
    }
}
