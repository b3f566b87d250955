use std::ops::Index;

pub trait Mesh {
    /// Number of stored nodes, N + 1.
    fn get_length(&self) -> usize;

    /// Number of intervals N between the first and last node.
    fn get_num_intervals(&self) -> usize;

    fn grid_points(&self) -> &[f64];
}

/// Uniform node grid with both end points included, like `linspace`.
#[derive(Debug, Clone)]
pub struct Mesh1d {
    num_intervals: usize,
    grid_points: Vec<f64>,
}

impl Mesh1d {
    pub fn new(x_start: f64, x_end: f64, num_intervals: usize) -> Self {
        let dx = (x_end - x_start) / num_intervals as f64;
        let grid_points: Vec<f64> = (0..=num_intervals)
            .map(|i| x_start + i as f64 * dx)
            .collect();
        Mesh1d {
            num_intervals,
            grid_points,
        }
    }
}

impl Mesh for Mesh1d {
    fn get_length(&self) -> usize {
        self.grid_points.len()
    }

    fn get_num_intervals(&self) -> usize {
        self.num_intervals
    }

    fn grid_points(&self) -> &[f64] {
        &self.grid_points
    }
}

impl Index<usize> for Mesh1d {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.grid_points[index]
    }
}
