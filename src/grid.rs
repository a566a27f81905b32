/// Moore neighborhood offsets, self included
const NEAR_OFFSETS: [(i64, i64); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),  (0, 0),  (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Fixed-size occupancy map of the growing structure.
///
/// Cells are stored row-major (`y * width + x`). A cell only ever goes from
/// empty to fixed; nothing unfixes it short of building a new grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    seed: (usize, usize),
    fixed_count: usize,
}

impl Grid {
    /// Create a grid with a single fixed seed at `(width / 2, height / 2)`
    pub fn new(width: usize, height: usize) -> Self {
        let seed = (width / 2, height / 2);
        let mut grid = Self {
            width,
            height,
            cells: vec![false; width * height],
            seed,
            fixed_count: 0,
        };
        grid.fix(seed.0, seed.1);
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Seed cell the structure grows from
    pub fn seed(&self) -> (usize, usize) {
        self.seed
    }

    /// Number of fixed cells, seed included
    pub fn fixed_count(&self) -> usize {
        self.fixed_count
    }

    /// Full occupancy buffer, row-major
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Read occupancy. Coordinates must be inside the grid.
    pub fn occupied(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Mark a cell as part of the structure. Fixing a fixed cell does nothing.
    pub fn fix(&mut self, x: usize, y: usize) {
        let idx = y * self.width + x;
        if !self.cells[idx] {
            self.cells[idx] = true;
            self.fixed_count += 1;
        }
    }

    /// Freeze trigger: the cell or any of its 8 neighbors is fixed.
    ///
    /// Each neighbor coordinate is clamped to the grid on its own, so along an
    /// edge the border row/column is looked up more than once instead of being
    /// skipped.
    pub fn is_near_occupied(&self, x: usize, y: usize) -> bool {
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        NEAR_OFFSETS.iter().any(|&(dx, dy)| {
            let nx = (x as i64 + dx).clamp(0, max_x) as usize;
            let ny = (y as i64 + dy).clamp(0, max_y) as usize;
            self.occupied(nx, ny)
        })
    }

    /// Coordinates of every fixed cell in row-major order
    pub fn fixed_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &fixed)| fixed)
            .map(|(idx, _)| (idx % self.width, idx / self.width))
            .collect()
    }
}
