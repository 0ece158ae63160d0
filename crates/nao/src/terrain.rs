//! Stepped heightfield the robot walks on.

use crate::error::EnvError;

const CELL_SIZE: f32 = 0.1;
const CELLS_PER_SIDE: usize = 160;
const EXTENT: f32 = CELL_SIZE * CELLS_PER_SIDE as f32;
/// Spacing of the random lattice that is interpolated into the field.
const LATTICE_SPACING: f32 = 0.8;
/// Radius around the spawn point that is always kept flat.
const SPAWN_RADIUS: f32 = 0.75;

/// Square heightfield centred on the world origin. Queries outside the field
/// return ground level.
#[derive(Clone, Debug)]
pub struct Terrain {
    heights: Vec<f32>,
    max_height: f32,
    step_height: f32,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::flat()
    }
}

impl Terrain {
    #[must_use]
    pub fn flat() -> Self {
        Self {
            heights: vec![0.0; CELLS_PER_SIDE * CELLS_PER_SIDE],
            max_height: 0.0,
            step_height: 0.0,
        }
    }

    /// Generates random stepped terrain.
    ///
    /// Heights are multiples of `step_height` in `[0, max_height]`, and the
    /// area around the origin is left flat so the robot spawns on level
    /// ground.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidTerrain`] when `step_height` is not
    /// positive, `max_height` is negative, or either is not finite.
    pub fn generate(max_height: f32, step_height: f32, rng: &mut fastrand::Rng) -> Result<Self, EnvError> {
        let valid = max_height.is_finite()
            && step_height.is_finite()
            && max_height >= 0.0
            && step_height > 0.0;
        if !valid {
            return Err(EnvError::InvalidTerrain { max_height, step_height });
        }

        let lattice_size = (EXTENT / LATTICE_SPACING).ceil() as usize + 2;
        let lattice: Vec<f32> = (0..lattice_size * lattice_size)
            .map(|_| rng.f32() * max_height)
            .collect();

        let mut heights = Vec::with_capacity(CELLS_PER_SIDE * CELLS_PER_SIDE);
        for row in 0..CELLS_PER_SIDE {
            for column in 0..CELLS_PER_SIDE {
                let (x, y) = cell_center(row, column);
                if x.hypot(y) < SPAWN_RADIUS {
                    heights.push(0.0);
                    continue;
                }
                let smooth = sample_lattice(&lattice, lattice_size, x + EXTENT / 2.0, y + EXTENT / 2.0);
                let stepped = (smooth / step_height).floor() * step_height;
                heights.push(stepped.clamp(0.0, max_height));
            }
        }

        tracing::debug!(max_height, step_height, "generated stepped terrain");
        Ok(Self { heights, max_height, step_height })
    }

    /// Ground height at world position `(x, y)`.
    #[must_use]
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        let column = ((x + EXTENT / 2.0) / CELL_SIZE).floor();
        let row = ((y + EXTENT / 2.0) / CELL_SIZE).floor();
        let size = CELLS_PER_SIDE as f32;
        if !(0.0..size).contains(&column) || !(0.0..size).contains(&row) {
            return 0.0;
        }
        self.heights[row as usize * CELLS_PER_SIDE + column as usize]
    }

    #[must_use]
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    #[must_use]
    pub fn step_height(&self) -> f32 {
        self.step_height
    }

    /// Half the side length of the generated area.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        EXTENT / 2.0
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        CELL_SIZE
    }
}

fn cell_center(row: usize, column: usize) -> (f32, f32) {
    (
        (column as f32 + 0.5) * CELL_SIZE - EXTENT / 2.0,
        (row as f32 + 0.5) * CELL_SIZE - EXTENT / 2.0,
    )
}

/// Bilinear interpolation of the random lattice at field coordinates.
fn sample_lattice(lattice: &[f32], size: usize, u: f32, v: f32) -> f32 {
    let gx = u / LATTICE_SPACING;
    let gy = v / LATTICE_SPACING;
    let x0 = (gx.floor() as usize).min(size - 2);
    let y0 = (gy.floor() as usize).min(size - 2);
    let tx = (gx - x0 as f32).clamp(0.0, 1.0);
    let ty = (gy - y0 as f32).clamp(0.0, 1.0);
    let at = |x: usize, y: usize| lattice[y * size + x];
    let bottom = at(x0, y0) * (1.0 - tx) + at(x0 + 1, y0) * tx;
    let top = at(x0, y0 + 1) * (1.0 - tx) + at(x0 + 1, y0 + 1) * tx;
    bottom * (1.0 - ty) + top * ty
}
