//! LinearMapper: piecewise-linear interpolation between mismatched grids
//! (C7).
//!
//! Used only when two coupled solvers advertise different interface grids;
//! in the baseline case both solvers share the same cell centers and a
//! mapper is unnecessary. The mapper itself has no lifecycle state worth
//! tracking beyond the two grids, so it does not implement
//! `fsic_component::Lifecycle` — it is a pure function object the
//! orchestrator calls around a `Solver::calculate`.

mod error;

pub use error::{MapperError, MapperResult};

use fsic_core::Real;

/// Maps values from `input_grid` to `output_grid` by linear interpolation,
/// extrapolating linearly using the nearest segment's slope outside the
/// input grid's range.
///
/// Implemented as a plain linear scan rather than a binary search since
/// interface grids are small (tens to low hundreds of cells).
pub struct LinearMapper {
    input_grid: Vec<Real>,
    output_grid: Vec<Real>,
}

impl LinearMapper {
    pub fn new(input_grid: Vec<Real>, output_grid: Vec<Real>) -> MapperResult<Self> {
        if input_grid.len() < 2 {
            return Err(MapperError::InvalidArg {
                what: "input grid needs at least two points to interpolate",
            });
        }
        if !input_grid.windows(2).all(|w| w[0] < w[1]) {
            return Err(MapperError::InvalidArg {
                what: "input grid must be strictly increasing",
            });
        }
        Ok(Self {
            input_grid,
            output_grid,
        })
    }

    pub fn input_grid(&self) -> &[Real] {
        &self.input_grid
    }

    pub fn output_grid(&self) -> &[Real] {
        &self.output_grid
    }

    /// Interpolates (or extrapolates) `values`, defined at `self.input_grid`,
    /// onto `self.output_grid`.
    pub fn map(&self, values: &[Real]) -> MapperResult<Vec<Real>> {
        if values.len() != self.input_grid.len() {
            return Err(MapperError::InvalidArg {
                what: "value count does not match input grid length",
            });
        }

        let grid = &self.input_grid;
        let n = grid.len();
        Ok(self
            .output_grid
            .iter()
            .map(|&z| {
                // Locate the bracketing segment, clamping to the first/last
                // segment when `z` falls outside the grid's range so the
                // same linear formula both interpolates and extrapolates.
                let seg = if z <= grid[0] {
                    0
                } else if z >= grid[n - 1] {
                    n - 2
                } else {
                    grid.windows(2)
                        .position(|w| z >= w[0] && z <= w[1])
                        .unwrap_or(n - 2)
                };
                let (z0, z1) = (grid[seg], grid[seg + 1]);
                let (v0, v1) = (values[seg], values[seg + 1]);
                let t = (z - z0) / (z1 - z0);
                v0 + t * (v1 - v0)
            })
            .collect())
    }
}
