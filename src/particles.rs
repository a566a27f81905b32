use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::region::BoundingRegion;
use crate::settings::RespawnStrategy;
use rand::Rng;
use serde::Serialize;

/// Respawn draws allowed before the region counts as saturated
pub const MAX_RESPAWN_ATTEMPTS: usize = 100;

/// A diffusing point. It carries nothing but its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Particle {
    pub x: usize,
    pub y: usize,
}

impl RespawnStrategy {
    /// Draw one candidate spawn position
    pub fn sample<R: Rng + ?Sized>(
        &self,
        region: &BoundingRegion,
        seed: (usize, usize),
        rng: &mut R,
    ) -> (usize, usize) {
        match self {
            RespawnStrategy::Boxy => region.sample_uniform(rng),
            RespawnStrategy::Radial => region.sample_radial(seed, rng),
        }
    }
}

/// Place a fresh particle at a cell that would not freeze on the spot
pub fn respawn<R: Rng + ?Sized>(
    strategy: RespawnStrategy,
    grid: &Grid,
    region: &BoundingRegion,
    rng: &mut R,
) -> Result<Particle> {
    for _ in 0..MAX_RESPAWN_ATTEMPTS {
        let (x, y) = strategy.sample(region, grid.seed(), rng);
        if !grid.is_near_occupied(x, y) {
            return Ok(Particle { x, y });
        }
    }
    Err(Error::SaturationExhausted {
        attempts: MAX_RESPAWN_ATTEMPTS,
    })
}

/// Move one particle a single lattice step and apply the freeze rule.
///
/// Returns `true` when the particle froze and was replaced. On a failed
/// respawn the freeze has already been applied to `grid` and `region`.
pub fn step_one<R: Rng + ?Sized>(
    particle: &mut Particle,
    grid: &mut Grid,
    region: &mut BoundingRegion,
    strategy: RespawnStrategy,
    rng: &mut R,
) -> Result<bool> {
    let dx: i64 = rng.gen_range(-1..=1);
    let dy: i64 = rng.gen_range(-1..=1);
    let (x, y) = region.clamp(particle.x as i64 + dx, particle.y as i64 + dy);
    particle.x = x;
    particle.y = y;

    if !grid.is_near_occupied(x, y) {
        return Ok(false);
    }

    grid.fix(x, y);
    region.expand(x, y);
    *particle = respawn(strategy, grid, region, rng)?;
    Ok(true)
}

/// Fixed-size set of diffusing particles, processed in slot order
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    /// Spawn `count` particles with the respawn rule
    pub fn spawn<R: Rng + ?Sized>(
        count: usize,
        strategy: RespawnStrategy,
        grid: &Grid,
        region: &BoundingRegion,
        rng: &mut R,
    ) -> Result<Self> {
        let particles = (0..count)
            .map(|_| respawn(strategy, grid, region, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { particles })
    }

    /// Build a set from explicit positions
    pub fn from_positions(positions: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            particles: positions.into_iter().map(|(x, y)| Particle { x, y }).collect(),
        }
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance every particle once. A freeze is visible to later slots in the
    /// same sweep. Returns the number of freezes.
    pub fn sweep<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        region: &mut BoundingRegion,
        strategy: RespawnStrategy,
        rng: &mut R,
    ) -> Result<usize> {
        let mut frozen = 0;
        for particle in self.particles.iter_mut() {
            if step_one(particle, grid, region, strategy, rng)? {
                frozen += 1;
            }
        }
        Ok(frozen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Grid with every cell fixed except `free`
    fn filled_except(width: usize, height: usize, free: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if !free.contains(&(x, y)) {
                    grid.fix(x, y);
                }
            }
        }
        grid
    }

    #[test]
    fn test_walk_stays_in_region_and_moves_at_most_one_cell() {
        let mut grid = Grid::new(200, 200);
        let mut region = BoundingRegion::around_seed(grid.seed(), 200, 200);
        let mut rng = StdRng::seed_from_u64(5);
        let mut particle = Particle { x: 90, y: 90 };

        for _ in 0..2_000 {
            let before = particle;
            let froze =
                step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Boxy, &mut rng).unwrap();
            assert!(region.contains(particle.x, particle.y));
            if !froze {
                assert!(before.x.abs_diff(particle.x) <= 1);
                assert!(before.y.abs_diff(particle.y) <= 1);
            }
        }
    }

    #[test]
    fn test_freeze_fixes_cell_expands_region_and_respawns_clear() {
        // One-cell region pins the walk to (0, 0), which touches (1, 1)
        let mut grid = Grid::new(30, 30);
        grid.fix(1, 1);
        let mut region = BoundingRegion::from_bounds((0, 0), (0, 0), 30, 30);
        let mut rng = StdRng::seed_from_u64(21);
        let mut particle = Particle { x: 0, y: 0 };

        let froze =
            step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Boxy, &mut rng).unwrap();

        assert!(froze);
        assert!(grid.occupied(0, 0));
        assert_eq!(grid.fixed_count(), 3);
        assert_eq!((region.min_x, region.min_y, region.max_x, region.max_y), (0, 0, 10, 10));
        assert!(region.contains(particle.x, particle.y));
        assert!(!grid.is_near_occupied(particle.x, particle.y));
    }

    #[test]
    fn test_particle_next_to_seed_either_freezes_or_stays_close() {
        let grid = Grid::new(20, 20);
        let region = BoundingRegion::around_seed(grid.seed(), 20, 20);
        assert_eq!((region.min_x, region.min_y, region.max_x, region.max_y), (0, 0, 19, 19));

        for seed in 0..20 {
            let mut grid = grid.clone();
            let mut region = region;
            let mut rng = StdRng::seed_from_u64(seed);
            let mut particle = Particle { x: 11, y: 11 };

            let froze =
                step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Boxy, &mut rng).unwrap();
            if froze {
                assert_eq!(grid.fixed_count(), 2);
                assert!(!grid.is_near_occupied(particle.x, particle.y));
            } else {
                assert_eq!(grid.fixed_count(), 1);
                assert!(particle.x.abs_diff(11) <= 1 && particle.y.abs_diff(11) <= 1);
            }
        }
    }

    #[test]
    fn test_respawn_finds_the_last_free_cell() {
        // Region [0,1]x[0,1]: only (0,0) has no fixed neighbor
        let grid = filled_except(5, 5, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let region = BoundingRegion::from_bounds((0, 0), (1, 1), 5, 5);
        let mut rng = StdRng::seed_from_u64(9);

        let particle = respawn(RespawnStrategy::Boxy, &grid, &region, &mut rng).unwrap();
        assert_eq!(particle, Particle { x: 0, y: 0 });
    }

    #[test]
    fn test_respawn_exhausts_after_last_free_cell_is_consumed() {
        let mut grid = filled_except(5, 5, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let region = BoundingRegion::from_bounds((0, 0), (1, 1), 5, 5);
        let mut rng = StdRng::seed_from_u64(9);

        grid.fix(0, 0);
        let err = respawn(RespawnStrategy::Boxy, &grid, &region, &mut rng).unwrap_err();
        assert!(matches!(err, Error::SaturationExhausted { attempts: 100 }));
    }

    #[test]
    fn test_exhausted_respawn_draws_exactly_the_attempt_bound() {
        let grid = filled_except(5, 5, &[]);
        let region = BoundingRegion::around_seed(grid.seed(), 5, 5);
        let mut rng = StdRng::seed_from_u64(13);
        let mut expected = rng.clone();

        assert!(respawn(RespawnStrategy::Boxy, &grid, &region, &mut rng).is_err());
        for _ in 0..MAX_RESPAWN_ATTEMPTS {
            region.sample_uniform(&mut expected);
        }
        assert_eq!(rng.gen::<u64>(), expected.gen::<u64>());
    }

    #[test]
    fn test_freeze_after_last_free_cell_is_taken_exhausts_respawn() {
        // 4x4 grid, seed (2, 2), plus (2, 0) and (0, 2): (0, 0) is the only
        // cell clear of the structure, and every move out of it touches it
        let mut completed = 0;
        for seed in 0..8 {
            let mut grid = Grid::new(4, 4);
            grid.fix(2, 0);
            grid.fix(0, 2);
            let mut region = BoundingRegion::around_seed(grid.seed(), 4, 4);
            let mut rng = StdRng::seed_from_u64(seed);

            // First freeze: next to the seed, respawns onto the last free cell
            let mut particle = Particle { x: 3, y: 3 };
            match step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Boxy, &mut rng) {
                Ok(froze) => assert!(froze),
                // 1-in-16 draws missed (0, 0) a hundred times
                Err(_) => continue,
            }
            assert_eq!(particle, Particle { x: 0, y: 0 });
            assert!(!grid.is_near_occupied(0, 0));

            // Second freeze: consumes that cell, and its respawn has nowhere to go
            let mut result = Ok(false);
            for _ in 0..200 {
                result = step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Boxy, &mut rng);
                if !matches!(result, Ok(false)) {
                    break;
                }
            }
            assert!(matches!(result, Err(Error::SaturationExhausted { attempts: 100 })));
            assert!(grid.occupied(particle.x, particle.y));
            assert!(particle.x <= 1 && particle.y <= 1 && (particle.x, particle.y) != (0, 0));
            assert!(grid.is_near_occupied(0, 0));
            completed += 1;
        }
        assert!(completed > 0);
    }

    #[test]
    fn test_saturated_freeze_keeps_the_fixed_cell() {
        // Every cell of a 3x3 grid touches the center seed
        let mut grid = filled_except(3, 3, &[(0, 0)]);
        let mut region = BoundingRegion::around_seed(grid.seed(), 3, 3);
        let mut rng = StdRng::seed_from_u64(1);
        let mut particle = Particle { x: 0, y: 0 };

        let result = step_one(&mut particle, &mut grid, &mut region, RespawnStrategy::Radial, &mut rng);

        assert!(matches!(result, Err(Error::SaturationExhausted { .. })));
        assert!(grid.occupied(particle.x, particle.y));
    }

    #[test]
    fn test_spawned_particles_start_clear_of_structure() {
        let grid = Grid::new(60, 60);
        let region = BoundingRegion::around_seed(grid.seed(), 60, 60);
        let mut rng = StdRng::seed_from_u64(2);

        for strategy in [RespawnStrategy::Boxy, RespawnStrategy::Radial] {
            let set = ParticleSet::spawn(50, strategy, &grid, &region, &mut rng).unwrap();
            assert_eq!(set.len(), 50);
            for p in set.as_slice() {
                assert!(!grid.is_near_occupied(p.x, p.y));
            }
        }
    }

    #[test]
    fn test_sweep_steps_slots_in_order_on_shared_state() {
        let grid = Grid::new(40, 40);
        let region = BoundingRegion::around_seed(grid.seed(), 40, 40);
        let set = ParticleSet::from_positions([(19, 19), (21, 21), (20, 22)]);

        let mut swept_grid = grid.clone();
        let mut swept_region = region;
        let mut swept = set.clone();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            swept
                .sweep(&mut swept_grid, &mut swept_region, RespawnStrategy::Boxy, &mut rng)
                .unwrap();
        }

        let mut manual_grid = grid;
        let mut manual_region = region;
        let mut manual = set.particles;
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            for particle in manual.iter_mut() {
                step_one(particle, &mut manual_grid, &mut manual_region, RespawnStrategy::Boxy, &mut rng)
                    .unwrap();
            }
        }

        assert_eq!(swept.as_slice(), manual.as_slice());
        assert_eq!(swept_grid, manual_grid);
        assert_eq!(swept_region, manual_region);
        assert!(swept_grid.fixed_count() > 1);
    }
}
