//! Corner sampling relative to the isovalue

use crate::tables::CORNERS;
use isomesh_core::ScalarField;

/// Reads cell corners from a scalar field and offsets them by the isovalue
#[derive(Debug, Clone, Copy)]
pub struct GridSampler<'a> {
    field: ScalarField<'a>,
    iso_value: f64,
}

impl<'a> GridSampler<'a> {
    pub fn new(field: ScalarField<'a>, iso_value: f64) -> Self {
        Self { field, iso_value }
    }

    pub fn field(&self) -> &ScalarField<'a> {
        &self.field
    }

    pub fn iso_value(&self) -> f64 {
        self.iso_value
    }

    /// Raw field sample at grid point `(x, y, z)`.
    ///
    /// Indices run up to and including the cell count on each axis; anything
    /// beyond is a caller bug and panics.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, z: usize) -> f64 {
        self.field.value(x, y, z)
    }

    /// True when some sample equals the isovalue exactly
    pub fn touches_iso(&self) -> bool {
        self.field.values().iter().any(|&f| f == self.iso_value)
    }

    /// Signed corner values `iso - F(corner)` of cell `(x, y, z)`
    #[inline]
    pub fn corner_values(&self, x: usize, y: usize, z: usize) -> [f64; 8] {
        std::array::from_fn(|k| {
            let [dx, dy, dz] = CORNERS[k];
            self.iso_value - self.sample(x + dx, y + dy, z + dz)
        })
    }
}

/// Cube index with bit `k` set when corner `k` is non-negative
#[inline]
pub fn cube_index(values: &[f64; 8]) -> u8 {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v >= 0.0)
        .fold(0u8, |index, (k, _)| index | (1 << k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::{sample_field, GridDescriptor};

    #[test]
    fn test_corner_order() {
        let grid = GridDescriptor::unit([2, 2, 2]).unwrap();
        let values = sample_field(&grid, |p| p.x + 10.0 * p.y + 100.0 * p.z);
        let field = ScalarField::new(&grid, &values).unwrap();
        let sampler = GridSampler::new(field, 0.0);

        let v = sampler.corner_values(1, 0, 1);
        assert_eq!(
            v,
            [-101.0, -111.0, -211.0, -201.0, -102.0, -112.0, -212.0, -202.0]
        );
    }

    #[test]
    fn test_iso_offset() {
        let grid = GridDescriptor::unit([1, 1, 1]).unwrap();
        let values = vec![1.0; 8];
        let field = ScalarField::new(&grid, &values).unwrap();

        let v = GridSampler::new(field, 1.5).corner_values(0, 0, 0);
        assert!(v.iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_touches_iso() {
        let grid = GridDescriptor::unit([1, 1, 1]).unwrap();
        let mut values = vec![0.25; 8];
        let field = ScalarField::new(&grid, &values).unwrap();
        assert!(GridSampler::new(field, 0.25).touches_iso());
        assert!(!GridSampler::new(field, 0.0).touches_iso());

        values[3] = 0.0;
        let field = ScalarField::new(&grid, &values).unwrap();
        assert!(GridSampler::new(field, 0.0).touches_iso());
    }

    #[test]
    fn test_cube_index() {
        assert_eq!(cube_index(&[-1.0; 8]), 0);
        assert_eq!(cube_index(&[1.0; 8]), 0xFF);
        assert_eq!(
            cube_index(&[0.0, -1.0, -1.0, -1.0, -1.0, -1.0, 2.0, -1.0]),
            0b0100_0001
        );
    }

    #[test]
    #[should_panic]
    fn test_sample_outside_grid_panics() {
        let grid = GridDescriptor::unit([1, 1, 1]).unwrap();
        let values = vec![0.0; 8];
        let field = ScalarField::new(&grid, &values).unwrap();
        GridSampler::new(field, 0.0).corner_values(1, 0, 0);
    }
}
