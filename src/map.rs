//! Static sea map: world bounds plus impassable islands.

use rand::Rng;

use crate::config::MapTuning;
use crate::geometry::Rect;

/// Static-geometry predicate used by the collision passes.
pub trait CollisionMap {
    fn is_colliding(&self, rect: &Rect) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub struct IslandMap {
    pub width: f32,
    pub height: f32,
    pub islands: Vec<Rect>,
}

impl IslandMap {
    /// Open sea with no islands.
    pub fn open(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            islands: Vec::new(),
        }
    }

    pub fn with_islands(width: f32, height: f32, islands: Vec<Rect>) -> Self {
        Self {
            width,
            height,
            islands,
        }
    }

    /// Scatter islands at random, never overlapping anything in `keep_clear`.
    /// Placement gives up on an island after a bounded number of attempts, so
    /// crowded maps end up with fewer islands rather than looping forever.
    pub fn generate(cfg: &MapTuning, keep_clear: &[Rect], rng: &mut impl Rng) -> Self {
        const ATTEMPTS: usize = 40;

        let mut islands: Vec<Rect> = Vec::with_capacity(cfg.island_count);
        let min = cfg.island_min_size.min(cfg.island_max_size);
        let max = cfg.island_max_size.max(min + 1.0);

        for _ in 0..cfg.island_count {
            for _ in 0..ATTEMPTS {
                let w = rng.gen_range(min..max);
                let h = rng.gen_range(min..max);
                if w >= cfg.width || h >= cfg.height {
                    break;
                }
                let candidate = Rect::new(
                    rng.gen_range(0.0..cfg.width - w),
                    rng.gen_range(0.0..cfg.height - h),
                    w,
                    h,
                );
                let padded = candidate.inflate(min / 2.0);
                let blocked = keep_clear.iter().any(|r| padded.overlaps(r))
                    || islands.iter().any(|r| padded.overlaps(r));
                if !blocked {
                    islands.push(candidate);
                    break;
                }
            }
        }

        Self {
            width: cfg.width,
            height: cfg.height,
            islands,
        }
    }

    pub fn in_bounds(&self, rect: &Rect) -> bool {
        rect.x >= 0.0
            && rect.y >= 0.0
            && rect.x + rect.width <= self.width
            && rect.y + rect.height <= self.height
    }
}

impl CollisionMap for IslandMap {
    /// Leaving the map counts as running aground.
    fn is_colliding(&self, rect: &Rect) -> bool {
        !self.in_bounds(rect) || self.islands.iter().any(|island| island.overlaps(rect))
    }
}
