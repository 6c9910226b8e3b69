//! Axis-aligned hitbox primitive

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in local or world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hitbox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (x + width)
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (y + height)
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Move a local box into the space whose origin is `origin`'s top-left corner
    pub fn translated(&self, origin: &Hitbox) -> Hitbox {
        Hitbox::new(self.x + origin.x, self.y + origin.y, self.width, self.height)
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f64) -> Hitbox {
        Hitbox::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }

    /// Strict overlap test; boxes sharing only an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Hitbox) -> bool {
        intersects(self, other)
    }
}

/// Axis-aligned bounding box overlap
#[inline]
pub fn intersects(a: &Hitbox, b: &Hitbox) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let right = Hitbox::new(10.0, 0.0, 10.0, 10.0);
        let below = Hitbox::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn test_translate_and_inset() {
        let origin = Hitbox::new(100.0, 50.0, 0.0, 0.0);
        let local = Hitbox::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(local.translated(&origin), Hitbox::new(102.0, 53.0, 4.0, 5.0));
        assert_eq!(
            Hitbox::new(10.0, 10.0, 44.0, 47.0).inset(1.0),
            Hitbox::new(11.0, 11.0, 42.0, 45.0)
        );
    }

    fn hitbox() -> impl Strategy<Value = Hitbox> {
        (-200.0..200.0f64, -200.0..200.0f64, 0.0..100.0f64, 0.0..100.0f64)
            .prop_map(|(x, y, w, h)| Hitbox::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_intersection_is_symmetric(a in hitbox(), b in hitbox()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }
    }
}
