//! Layout of the lights hanging over the sculpture.

use glam::Vec3;

use crate::constants::{
    LIGHT_COLS, LIGHT_HEIGHT, LIGHT_MARGIN, LIGHT_MIN_HEIGHT, LIGHT_ROWS, LIGHT_WIDTH,
};

/// Grid of lights centred on the origin, rows running along Z.
///
/// `rows * cols` is the light count and therefore the main cost knob of the
/// accumulator.
#[derive(Clone, Debug)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub light_width: f32,
    pub light_height: f32,
    pub margin: f32,
    pub min_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: LIGHT_ROWS,
            cols: LIGHT_COLS,
            light_width: LIGHT_WIDTH,
            light_height: LIGHT_HEIGHT,
            margin: LIGHT_MARGIN,
            min_height: LIGHT_MIN_HEIGHT,
        }
    }
}

impl GridConfig {
    pub fn light_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

/// Height of the undulating surface at a grid cell: two crossed sine waves
/// so peaks don't line up diagonally.
pub fn surface_height(row: usize, col: usize, min_height: f32) -> f32 {
    let (r, c) = (row as f32, col as f32);
    (185.0 * ((r + c) * 0.53) / 360.0).sin() * 3.3
        + (210.0 * ((r + c * 2.8) * 0.45) / 360.0).sin() * 1.5
        + min_height
}

/// World positions of every light, row-major.
pub fn light_grid(config: &GridConfig) -> Vec<Vec3> {
    let step_x = config.light_width + config.margin;
    let step_z = config.light_height + config.margin;
    let left = -(config.cols as f32 * step_x) / 2.0 + config.margin;
    let far = -(config.rows as f32 * step_z) / 2.0 + config.margin;

    let mut positions = Vec::with_capacity(config.light_count());
    for row in 0..config.rows {
        for col in 0..config.cols {
            positions.push(Vec3::new(
                left + col as f32 * step_x,
                surface_height(row, col, config.min_height),
                far + row as f32 * step_z,
            ));
        }
    }
    positions
}
