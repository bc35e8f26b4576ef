//! Regular grid descriptor
//!
//! A grid of `n[0] * n[1] * n[2]` cells spans `(n[0]+1) * (n[1]+1) * (n[2]+1)`
//! sample points. Sample `(x, y, z)` sits at `origin + (x, y, z) * step` in
//! world space and is stored at flat index `x + y*(nx+1) + z*(nx+1)*(ny+1)`.

use crate::{Error, Point3d, Result, Vector3d};
use serde::{Deserialize, Serialize};

/// Cell counts, origin and spacing of a regular sampling grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    n: [usize; 3],
    origin: Point3d,
    step: Vector3d,
}

impl GridDescriptor {
    /// Create a validated grid descriptor
    ///
    /// Every axis needs at least one cell and a finite, non-zero step.
    pub fn new(n: [usize; 3], origin: Point3d, step: Vector3d) -> Result<Self> {
        for (axis, &count) in n.iter().enumerate() {
            if count < 1 {
                return Err(Error::InvalidGrid(format!(
                    "axis {} has {} cells, at least 1 is required",
                    axis, count
                )));
            }
            if count.checked_add(1).and_then(|p| u32::try_from(p).ok()).is_none() {
                return Err(Error::InvalidGrid(format!(
                    "axis {} has {} cells, which exceeds the index range",
                    axis, count
                )));
            }
        }

        let samples = (n[0] + 1)
            .checked_mul(n[1] + 1)
            .and_then(|p| p.checked_mul(n[2] + 1));
        if samples.is_none() {
            return Err(Error::InvalidGrid(format!(
                "{}x{}x{} cells need more samples than can be addressed",
                n[0], n[1], n[2]
            )));
        }

        for axis in 0..3 {
            let s = step[axis];
            if !s.is_finite() || s == 0.0 {
                return Err(Error::InvalidGrid(format!(
                    "axis {} has step {}, a finite non-zero step is required",
                    axis, s
                )));
            }
            if !origin[axis].is_finite() {
                return Err(Error::InvalidGrid(format!(
                    "axis {} has non-finite origin {}",
                    axis, origin[axis]
                )));
            }
        }

        Ok(Self { n, origin, step })
    }

    /// Grid with unit spacing anchored at the world origin
    pub fn unit(n: [usize; 3]) -> Result<Self> {
        Self::new(n, Point3d::origin(), Vector3d::new(1.0, 1.0, 1.0))
    }

    /// Cell counts per axis
    pub fn cells(&self) -> [usize; 3] {
        self.n
    }

    /// Sample counts per axis (`cells + 1`)
    pub fn points(&self) -> [usize; 3] {
        [self.n[0] + 1, self.n[1] + 1, self.n[2] + 1]
    }

    /// World position of grid index (0, 0, 0)
    pub fn origin(&self) -> Point3d {
        self.origin
    }

    /// World-space spacing per axis
    pub fn step(&self) -> Vector3d {
        self.step
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.n[0] * self.n[1] * self.n[2]
    }

    /// Total number of samples a scalar field over this grid must hold
    pub fn point_count(&self) -> usize {
        let [px, py, pz] = self.points();
        px * py * pz
    }

    /// Flat index of sample `(x, y, z)`, x fastest
    #[inline]
    pub fn point_index(&self, x: usize, y: usize, z: usize) -> usize {
        let [px, py, _] = self.points();
        x + px * (y + py * z)
    }

    /// Convert grid coordinates (possibly fractional) to world coordinates
    #[inline]
    pub fn grid_to_world(&self, grid: &Point3d) -> Point3d {
        Point3d::new(
            self.origin.x + grid.x * self.step.x,
            self.origin.y + grid.y * self.step.y,
            self.origin.z + grid.z * self.step.z,
        )
    }

    /// World position of sample `(x, y, z)`
    pub fn point_position(&self, x: usize, y: usize, z: usize) -> Point3d {
        self.grid_to_world(&Point3d::new(x as f64, y as f64, z as f64))
    }

    /// World-space bounding box of the grid as `(min, max)`
    pub fn bounds(&self) -> (Point3d, Point3d) {
        let a = self.origin;
        let b = self.point_position(self.n[0], self.n[1], self.n[2]);
        (
            Point3d::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            Point3d::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    }
}
