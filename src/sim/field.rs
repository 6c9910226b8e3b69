//! Obstacle field: spawning, scrolling and retiring obstacles, plus the
//! decorative ground strip and clouds.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, ObstacleKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Scrolling ground made of two tiling segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ground {
    /// Left edge of each segment
    pub x: [f64; 2],
    /// Texture variant of each segment
    pub bumpy: [bool; 2],
}

impl Default for Ground {
    fn default() -> Self {
        Self {
            x: [0.0, GROUND_WIDTH],
            bumpy: [false, true],
        }
    }
}

impl Ground {
    pub fn update<R: Rng>(&mut self, dt: f64, speed: f64, fps: f64, rng: &mut R) {
        let increment = (speed * (fps / 1000.0) * dt).floor();
        if self.x[0] <= 0.0 {
            self.advance(0, increment, rng);
        } else {
            self.advance(1, increment, rng);
        }
    }

    fn advance<R: Rng>(&mut self, lead: usize, increment: f64, rng: &mut R) {
        let trail = 1 - lead;
        self.x[lead] -= increment;
        self.x[trail] = self.x[lead] + GROUND_WIDTH;

        // Lead segment fully off screen: wrap it behind the other one
        if self.x[lead] <= -GROUND_WIDTH {
            self.x[lead] += GROUND_WIDTH * 2.0;
            self.x[trail] = self.x[lead] - GROUND_WIDTH;
            self.bumpy[lead] = rng.random::<f64>() > GROUND_BUMP_THRESHOLD;
        }
    }

    pub fn reset(&mut self) {
        self.x = [0.0, GROUND_WIDTH];
    }
}

/// A background cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    /// Space to leave before the next cloud
    pub gap: f64,
    pub remove: bool,
}

impl Cloud {
    pub fn new<R: Rng>(canvas_width: f64, rng: &mut R) -> Self {
        Self {
            x: canvas_width,
            y: rng.random_range(CLOUD_MAX_SKY_LEVEL..=CLOUD_MIN_SKY_LEVEL) as f64,
            gap: rng.random_range(CLOUD_MIN_GAP..=CLOUD_MAX_GAP) as f64,
            remove: false,
        }
    }

    pub fn update(&mut self, speed: f64) {
        if self.remove {
            return;
        }
        self.x -= speed.ceil();
        if self.x + CLOUD_WIDTH <= 0.0 {
            self.remove = true;
        }
    }
}

/// Everything that scrolls past the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    /// Live obstacles, oldest (leftmost) first
    pub obstacles: VecDeque<Obstacle>,
    /// Recently spawned kinds, newest first
    pub history: VecDeque<ObstacleKind>,
    pub ground: Ground,
    pub clouds: Vec<Cloud>,

    canvas_width: f64,
    fps: f64,
    gap_coefficient: f64,
    max_obstacle_length: u32,
    max_duplication: usize,
    bg_cloud_speed: f64,
    cloud_frequency: f64,
    max_clouds: usize,
}

impl ObstacleField {
    pub fn new<R: Rng>(tuning: &Tuning, rng: &mut R) -> Self {
        let mut field = Self {
            obstacles: VecDeque::new(),
            history: VecDeque::with_capacity(tuning.max_obstacle_duplication),
            ground: Ground::default(),
            clouds: Vec::new(),
            canvas_width: tuning.canvas_width,
            fps: tuning.fps,
            gap_coefficient: tuning.gap_coefficient,
            max_obstacle_length: tuning.max_obstacle_length,
            max_duplication: tuning.max_obstacle_duplication.max(1),
            bg_cloud_speed: tuning.bg_cloud_speed,
            cloud_frequency: tuning.cloud_frequency,
            max_clouds: tuning.max_clouds,
        };
        field.add_cloud(rng);
        field
    }

    /// Oldest live obstacle, the only one that can reach the character next
    pub fn lead(&self) -> Option<&Obstacle> {
        self.obstacles.front()
    }

    /// Advance scenery and, when `obstacles_active`, the obstacles
    pub fn update<R: Rng>(&mut self, dt: f64, speed: f64, obstacles_active: bool, rng: &mut R) {
        self.ground.update(dt, speed, self.fps, rng);
        self.update_clouds(dt, speed, rng);
        if obstacles_active {
            self.update_obstacles(dt, speed, rng);
        }
    }

    fn update_clouds<R: Rng>(&mut self, dt: f64, speed: f64, rng: &mut R) {
        let cloud_speed = self.bg_cloud_speed / 1000.0 * dt * speed;

        if self.clouds.is_empty() {
            self.add_cloud(rng);
            return;
        }

        for cloud in self.clouds.iter_mut().rev() {
            cloud.update(cloud_speed);
        }

        let canvas_width = self.canvas_width;
        let spawn_room = self
            .clouds
            .last()
            .is_some_and(|last| canvas_width - last.x > last.gap);

        if self.clouds.len() < self.max_clouds && spawn_room && self.cloud_frequency > rng.random::<f64>() {
            self.add_cloud(rng);
        }

        self.clouds.retain(|c| !c.remove);
    }

    fn update_obstacles<R: Rng>(&mut self, dt: f64, speed: f64, rng: &mut R) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.update(dt, speed, self.fps);
        }

        // Obstacles retire in spawn order, so only the head needs checking
        if self.obstacles.front().is_some_and(|o| o.remove) {
            self.obstacles.pop_front();
        }

        let canvas_width = self.canvas_width;
        let needs_spawn = match self.obstacles.back_mut() {
            Some(last) => {
                let room = !last.following_spawned
                    && last.is_visible()
                    && last.x + last.width + last.gap < canvas_width;
                if room {
                    last.following_spawned = true;
                }
                room
            }
            None => true,
        };
        if needs_spawn {
            self.spawn_next(speed, rng);
        }
    }

    /// Spawn a random kind that respects the duplication limit and minimum speed
    pub fn spawn_next<R: Rng>(&mut self, speed: f64, rng: &mut R) {
        let eligible: Vec<ObstacleKind> = ObstacleKind::ALL
            .iter()
            .copied()
            .filter(|&kind| !self.is_duplicate(kind) && speed >= kind.def().min_speed)
            .collect();

        let kind = if eligible.is_empty() {
            // Only reachable with a duplication limit of 1 and a single slow kind
            log::warn!("No obstacle kind eligible at speed {:.2}, relaxing duplication", speed);
            ObstacleKind::ALL
                .iter()
                .copied()
                .find(|kind| speed >= kind.def().min_speed)
                .unwrap_or(ObstacleKind::Small)
        } else {
            eligible[rng.random_range(0..eligible.len())]
        };

        let obstacle = Obstacle::new(
            kind,
            speed,
            self.gap_coefficient,
            self.max_obstacle_length,
            self.canvas_width,
            rng,
        );
        log::debug!(
            "Spawned {:?} x{} at y={} gap={}",
            obstacle.kind,
            obstacle.size,
            obstacle.y,
            obstacle.gap
        );
        self.obstacles.push_back(obstacle);

        self.history.push_front(kind);
        self.history.truncate(self.max_duplication);
    }

    /// Spawning `kind` would exceed the consecutive-duplicate limit
    pub fn is_duplicate(&self, kind: ObstacleKind) -> bool {
        let run = self.history.iter().take_while(|&&k| k == kind).count();
        run >= self.max_duplication
    }

    fn add_cloud<R: Rng>(&mut self, rng: &mut R) {
        self.clouds.push(Cloud::new(self.canvas_width, rng));
    }

    /// Drop all obstacles and realign the ground
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.ground.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f64 = 1000.0 / 60.0;

    fn field(seed: u64) -> (ObstacleField, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let f = ObstacleField::new(&Tuning::default(), &mut rng);
        (f, rng)
    }

    #[test]
    fn test_empty_field_spawns_immediately() {
        let (mut f, mut rng) = field(1);
        assert!(f.obstacles.is_empty());
        f.update(FRAME, 6.0, true, &mut rng);
        assert_eq!(f.obstacles.len(), 1);
    }

    #[test]
    fn test_inactive_field_has_no_obstacles() {
        let (mut f, mut rng) = field(1);
        for _ in 0..100 {
            f.update(FRAME, 6.0, false, &mut rng);
        }
        assert!(f.obstacles.is_empty());
        assert!(!f.clouds.is_empty());
    }

    #[test]
    fn test_flyers_need_speed() {
        let (mut f, mut rng) = field(2);
        for _ in 0..200 {
            f.spawn_next(6.0, &mut rng);
        }
        assert!(f.obstacles.iter().all(|o| o.kind != ObstacleKind::Flyer));
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut f, mut rng) = field(3);
        for _ in 0..20 {
            f.spawn_next(10.0, &mut rng);
            assert!(f.history.len() <= 2);
        }
    }

    #[test]
    fn test_duplicate_rule() {
        let (mut f, _) = field(4);
        f.history = VecDeque::from(vec![ObstacleKind::Large, ObstacleKind::Large]);
        assert!(f.is_duplicate(ObstacleKind::Large));
        assert!(!f.is_duplicate(ObstacleKind::Small));
        f.history = VecDeque::from(vec![ObstacleKind::Large, ObstacleKind::Small]);
        assert!(!f.is_duplicate(ObstacleKind::Large));
    }

    #[test]
    fn test_field_keeps_obstacles_and_x_decreases() {
        let (mut f, mut rng) = field(5);
        f.update(FRAME, 6.0, true, &mut rng);
        let mut last_lead_x = f.lead().map(|o| o.x).unwrap();
        let mut retired = 0;
        for _ in 0..3000 {
            let before = f.obstacles.len();
            f.update(FRAME, 6.0, true, &mut rng);
            assert!(!f.obstacles.is_empty());
            let lead_x = f.lead().map(|o| o.x).unwrap();
            if f.obstacles.len() < before || lead_x > last_lead_x {
                retired += 1;
            } else {
                assert!(lead_x <= last_lead_x);
            }
            last_lead_x = lead_x;
        }
        assert!(retired > 0);
    }

    #[test]
    fn test_queue_ahead_respects_gap() {
        let (mut f, mut rng) = field(6);
        for _ in 0..2000 {
            f.update(FRAME, 6.0, true, &mut rng);
            for pair in f.obstacles.iter().collect::<Vec<_>>().windows(2) {
                let (a, b) = (pair[0], pair[1]);
                // Followers spawn once there is room for the leader's gap
                assert!(b.x >= a.x + a.width);
            }
        }
    }

    #[test]
    fn test_ground_wraps() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut g = Ground::default();
        for _ in 0..1000 {
            g.update(FRAME, 10.0, 60.0, &mut rng);
            assert!((g.x[0] - g.x[1]).abs() == GROUND_WIDTH);
            assert!(g.x[0].min(g.x[1]) <= 0.0);
            assert!(g.x[0].min(g.x[1]) > -GROUND_WIDTH);
        }
    }

    #[test]
    fn test_clouds_capped() {
        let (mut f, mut rng) = field(8);
        for _ in 0..20_000 {
            f.update(FRAME, 13.0, false, &mut rng);
            assert!(f.clouds.len() <= 6);
            for c in &f.clouds {
                assert!((30.0..=71.0).contains(&c.y));
            }
        }
    }

    #[test]
    fn test_reset_clears_obstacles() {
        let (mut f, mut rng) = field(9);
        f.update(FRAME, 6.0, true, &mut rng);
        f.reset();
        assert!(f.obstacles.is_empty());
        assert_eq!(f.ground.x, [0.0, GROUND_WIDTH]);
    }

    proptest! {
        #[test]
        fn prop_no_three_consecutive_kinds(seed in any::<u64>(), speed in 6.0..13.0f64) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut f = ObstacleField::new(&Tuning::default(), &mut rng);
            let mut kinds = Vec::new();
            for _ in 0..30 {
                f.spawn_next(speed, &mut rng);
                kinds.push(f.obstacles.back().map(|o| o.kind).unwrap());
            }
            for w in kinds.windows(3) {
                prop_assert!(!(w[0] == w[1] && w[1] == w[2]), "{:?}", w);
            }
        }
    }
}
