use rand::Rng;
use serde::Serialize;

/// Cells kept free around every fixed cell inside the region
pub const REGION_MARGIN: usize = 10;

/// Axis-aligned box that confines particle spawn and movement.
///
/// Bounds are inclusive and only ever grow. The box always covers every fixed
/// cell plus [`REGION_MARGIN`], clamped to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingRegion {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    #[serde(skip)]
    grid_width: usize,
    #[serde(skip)]
    grid_height: usize,
}

impl BoundingRegion {
    /// Region covering the margin around a seed cell
    pub fn around_seed(seed: (usize, usize), grid_width: usize, grid_height: usize) -> Self {
        let mut region = Self {
            min_x: seed.0,
            min_y: seed.1,
            max_x: seed.0,
            max_y: seed.1,
            grid_width,
            grid_height,
        };
        region.expand(seed.0, seed.1);
        region
    }

    #[cfg(test)]
    pub(crate) fn from_bounds(
        (min_x, min_y): (usize, usize),
        (max_x, max_y): (usize, usize),
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            grid_width,
            grid_height,
        }
    }

    /// Grow the bounds to keep the margin around a newly fixed cell
    pub fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x.saturating_sub(REGION_MARGIN));
        self.min_y = self.min_y.min(y.saturating_sub(REGION_MARGIN));
        self.max_x = self.max_x.max(x + REGION_MARGIN).min(self.grid_width - 1);
        self.max_y = self.max_y.max(y + REGION_MARGIN).min(self.grid_height - 1);
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Clamp a (possibly off-grid) position into the region
    pub fn clamp(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.clamp(self.min_x as i64, self.max_x as i64) as usize,
            y.clamp(self.min_y as i64, self.max_y as i64) as usize,
        )
    }

    /// Radius of the radial spawn circle: half the larger region side
    pub fn reach(&self) -> f64 {
        let half_w = (self.max_x - self.min_x) as f64 / 2.0;
        let half_h = (self.max_y - self.min_y) as f64 / 2.0;
        half_w.max(half_h)
    }

    /// Independent uniform draw on each axis, inclusive bounds
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        let x = rng.gen_range(self.min_x..=self.max_x);
        let y = rng.gen_range(self.min_y..=self.max_y);
        (x, y)
    }

    /// Point on the circle of radius [`reach`](Self::reach) around `center`,
    /// rounded and clamped to the grid (not to the region).
    pub fn sample_radial<R: Rng + ?Sized>(&self, center: (usize, usize), rng: &mut R) -> (usize, usize) {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let reach = self.reach();
        let x = (center.0 as f64 + reach * angle.cos()).round() as i64;
        let y = (center.1 as f64 + reach * angle.sin()).round() as i64;
        (
            x.clamp(0, self.grid_width as i64 - 1) as usize,
            y.clamp(0, self.grid_height as i64 - 1) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_region_is_margin_around_seed_clamped() {
        let region = BoundingRegion::around_seed((10, 10), 20, 20);
        assert_eq!((region.min_x, region.min_y), (0, 0));
        assert_eq!((region.max_x, region.max_y), (19, 19));

        let wide = BoundingRegion::around_seed((50, 40), 100, 80);
        assert_eq!((wide.min_x, wide.min_y, wide.max_x, wide.max_y), (40, 30, 60, 50));
    }

    #[test]
    fn test_expand_covers_margin_box_and_never_shrinks() {
        let mut region = BoundingRegion::around_seed((100, 100), 200, 200);
        let freezes = [(95, 104), (112, 90), (100, 100), (190, 3), (101, 101)];
        let mut previous = region;
        for (x, y) in freezes {
            region.expand(x, y);
            assert!(region.min_x <= x.saturating_sub(10));
            assert!(region.min_y <= y.saturating_sub(10));
            assert!(region.max_x >= (x + 10).min(199));
            assert!(region.max_y >= (y + 10).min(199));

            assert!(region.min_x <= previous.min_x && region.min_y <= previous.min_y);
            assert!(region.max_x >= previous.max_x && region.max_y >= previous.max_y);
            previous = region;
        }
        assert_eq!((region.min_x, region.min_y, region.max_x, region.max_y), (85, 0, 199, 114));
    }

    #[test]
    fn test_uniform_samples_stay_inside_inclusive_bounds() {
        let region = BoundingRegion::from_bounds((3, 7), (5, 8), 20, 20);
        let mut rng = StdRng::seed_from_u64(7);
        let mut hit_max = false;
        for _ in 0..500 {
            let (x, y) = region.sample_uniform(&mut rng);
            assert!(region.contains(x, y));
            hit_max |= x == 5 && y == 8;
        }
        assert!(hit_max, "upper bounds are inclusive");
    }

    #[test]
    fn test_radial_samples_lie_on_the_reach_circle() {
        let region = BoundingRegion::around_seed((50, 50), 101, 101);
        assert_eq!(region.reach(), 10.0);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let (x, y) = region.sample_radial((50, 50), &mut rng);
            let dist = ((x as f64 - 50.0).powi(2) + (y as f64 - 50.0).powi(2)).sqrt();
            assert!((dist - 10.0).abs() <= 1.0, "distance {dist}");
        }
    }

    #[test]
    fn test_radial_samples_are_clamped_to_grid() {
        let region = BoundingRegion::from_bounds((0, 0), (39, 9), 40, 10);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let (x, y) = region.sample_radial((20, 5), &mut rng);
            assert!(x < 40 && y < 10);
        }
    }

    #[test]
    fn test_clamp_pulls_positions_into_region() {
        let region = BoundingRegion::from_bounds((4, 4), (8, 8), 20, 20);
        assert_eq!(region.clamp(3, 9), (4, 8));
        assert_eq!(region.clamp(-1, 5), (4, 5));
        assert_eq!(region.clamp(6, 6), (6, 6));
    }
}
