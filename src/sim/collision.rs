//! Collision detection between the character and the lead obstacle
//!
//! Two phases: a cheap whole-sprite overlap test rejects almost every frame,
//! and only when it passes are the per-limb boxes compared pairwise.

use super::character::Character;
use super::hitbox::{Hitbox, intersects};
use super::obstacle::Obstacle;

/// Result of a collision check
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Overlapping (character, obstacle) boxes in world space, if any
    pub contact: Option<(Hitbox, Hitbox)>,
    /// Fine box pairs compared (0 when the coarse test rejected)
    pub fine_checks: u32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            contact: None,
            fine_checks: 0,
        }
    }

    pub fn hit(&self) -> bool {
        self.contact.is_some()
    }
}

/// Coarse character box; sprites carry a 1px transparent border
pub fn character_coarse_box(character: &Character) -> Hitbox {
    character.bounds().inset(1.0)
}

/// Coarse obstacle box covering the whole group
pub fn obstacle_coarse_box(obstacle: &Obstacle) -> Hitbox {
    obstacle.bounds().inset(1.0)
}

/// Test the character against an obstacle
pub fn check_collision(obstacle: &Obstacle, character: &Character) -> CollisionResult {
    let character_box = character_coarse_box(character);
    let obstacle_box = obstacle_coarse_box(obstacle);

    if !intersects(&character_box, &obstacle_box) {
        return CollisionResult::miss();
    }

    let mut fine_checks = 0;
    for character_fine in character.hitboxes() {
        let adjusted_character = character_fine.translated(&character_box);
        for obstacle_fine in &obstacle.hitboxes {
            let adjusted_obstacle = obstacle_fine.translated(&obstacle_box);
            fine_checks += 1;
            if intersects(&adjusted_character, &adjusted_obstacle) {
                return CollisionResult {
                    contact: Some((adjusted_character, adjusted_obstacle)),
                    fine_checks,
                };
            }
        }
    }

    CollisionResult {
        contact: None,
        fine_checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ObstacleKind;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(kind: ObstacleKind) -> (Character, Obstacle) {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut character = Character::new(&Tuning::default(), &mut rng);
        character.reset(&mut rng);
        character.x = 50.0;
        let obstacle = Obstacle::new(kind, 6.0, 0.6, 1, 600.0, &mut rng);
        (character, obstacle)
    }

    #[test]
    fn test_far_obstacle_skips_fine_checks() {
        let (character, obstacle) = setup(ObstacleKind::Small);
        let result = check_collision(&obstacle, &character);
        assert!(!result.hit());
        assert_eq!(result.fine_checks, 0);
    }

    #[test]
    fn test_overlapping_obstacle_hits() {
        let (character, mut obstacle) = setup(ObstacleKind::Large);
        obstacle.x = 60.0;
        let result = check_collision(&obstacle, &character);
        assert!(result.hit());
        assert!(result.fine_checks >= 1);
    }

    #[test]
    fn test_jump_clears_ground_obstacle() {
        let (mut character, mut obstacle) = setup(ObstacleKind::Small);
        obstacle.x = 60.0;
        character.y = 40.0;
        assert!(!check_collision(&obstacle, &character).hit());
    }

    #[test]
    fn test_ducking_passes_under_mid_flyer() {
        let mut rng = Pcg32::seed_from_u64(9);
        let (mut character, mut obstacle) = setup(ObstacleKind::Flyer);
        obstacle.x = 55.0;
        obstacle.y = 75.0;
        assert!(check_collision(&obstacle, &character).hit());

        character.set_duck(true, &mut rng);
        let result = check_collision(&obstacle, &character);
        assert!(!result.hit());
        assert!(result.fine_checks > 0, "coarse boxes still overlap while ducking");
    }

    #[test]
    fn test_coarse_overlap_without_fine_contact() {
        let (character, mut obstacle) = setup(ObstacleKind::Small);
        // Obstacle corner grazes the empty space in front of the character's head
        obstacle.x = character.x + 40.0;
        obstacle.y = character.y - 31.0;
        let result = check_collision(&obstacle, &character);
        assert!(!result.hit());
        assert_eq!(result.fine_checks, 6 * 3);
    }
}
