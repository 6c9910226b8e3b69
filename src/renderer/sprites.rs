//! Sprite atlas coordinates
//!
//! Two atlases exist: the standard one and a double-resolution one for
//! high-density displays. Destination sizes are always in standard pixels;
//! only source rectangles scale.

use crate::sim::ObstacleKind;

/// Top-left corner of a sprite group in the atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpritePos {
    pub x: f64,
    pub y: f64,
}

const fn pos(x: f64, y: f64) -> SpritePos {
    SpritePos { x, y }
}

/// Where each sprite group lives in one atlas
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteLayout {
    /// Source pixels per destination pixel
    pub scale: f64,
    pub obstacle_large: SpritePos,
    pub obstacle_small: SpritePos,
    pub cloud: SpritePos,
    pub horizon: SpritePos,
    pub flyer: SpritePos,
    pub restart: SpritePos,
    pub text: SpritePos,
    pub character: SpritePos,
}

pub static LDPI: SpriteLayout = SpriteLayout {
    scale: 1.0,
    obstacle_large: pos(332.0, 2.0),
    obstacle_small: pos(228.0, 2.0),
    cloud: pos(86.0, 2.0),
    horizon: pos(2.0, 54.0),
    flyer: pos(134.0, 2.0),
    restart: pos(2.0, 2.0),
    text: pos(655.0, 2.0),
    character: pos(848.0, 2.0),
};

pub static HDPI: SpriteLayout = SpriteLayout {
    scale: 2.0,
    obstacle_large: pos(652.0, 2.0),
    obstacle_small: pos(446.0, 2.0),
    cloud: pos(166.0, 2.0),
    horizon: pos(2.0, 104.0),
    flyer: pos(260.0, 2.0),
    restart: pos(2.0, 2.0),
    text: pos(1294.0, 2.0),
    character: pos(1678.0, 2.0),
};

impl SpriteLayout {
    /// Pick the atlas for a device pixel ratio
    pub fn for_pixel_ratio(ratio: f64) -> &'static SpriteLayout {
        if ratio > 1.0 { &HDPI } else { &LDPI }
    }

    pub fn obstacle(&self, kind: ObstacleKind) -> SpritePos {
        match kind {
            ObstacleKind::Small => self.obstacle_small,
            ObstacleKind::Large => self.obstacle_large,
            ObstacleKind::Flyer => self.flyer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_pixel_ratio() {
        assert_eq!(SpriteLayout::for_pixel_ratio(1.0).scale, 1.0);
        assert_eq!(SpriteLayout::for_pixel_ratio(2.0).scale, 2.0);
        assert_eq!(SpriteLayout::for_pixel_ratio(1.5), &HDPI);
    }
}
