//! Scalar field views and samplers

use crate::{Error, GridDescriptor, Point3d, Result};

/// Read-only view of a scalar field laid out over a [`GridDescriptor`]
#[derive(Debug, Clone, Copy)]
pub struct ScalarField<'a> {
    grid: &'a GridDescriptor,
    values: &'a [f64],
}

impl<'a> ScalarField<'a> {
    /// Wrap `values`, checking that it holds exactly one sample per grid point
    pub fn new(grid: &'a GridDescriptor, values: &'a [f64]) -> Result<Self> {
        let expected = grid.point_count();
        if values.len() != expected {
            return Err(Error::FieldLength {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { grid, values })
    }

    /// Grid this field is laid out over
    pub fn grid(&self) -> &'a GridDescriptor {
        self.grid
    }

    /// Raw samples, x fastest then y then z
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Sample at grid index `(x, y, z)`.
    ///
    /// Panics when the index lies outside the grid.
    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        let [px, py, pz] = self.grid.points();
        assert!(
            x < px && y < py && z < pz,
            "grid index ({}, {}, {}) outside {:?}",
            x,
            y,
            z,
            self.grid.points()
        );
        self.values[self.grid.point_index(x, y, z)]
    }
}

/// Evaluate `f` at the world position of every grid point.
///
/// The result is laid out the way [`ScalarField`] expects.
pub fn sample_field<F>(grid: &GridDescriptor, f: F) -> Vec<f64>
where
    F: Fn(Point3d) -> f64,
{
    let [px, py, pz] = grid.points();
    let mut values = Vec::with_capacity(grid.point_count());
    for z in 0..pz {
        for y in 0..py {
            for x in 0..px {
                values.push(f(grid.point_position(x, y, z)));
            }
        }
    }
    values
}

/// Field of a solid sphere: positive inside, zero on the surface.
///
/// `radius - |p - center|`, so the interior lies above an iso value of zero.
pub fn sphere_field(grid: &GridDescriptor, center: Point3d, radius: f64) -> Vec<f64> {
    sample_field(grid, |p| radius - (p - center).norm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3d;

    #[test]
    fn test_field_length_is_checked() {
        let grid = GridDescriptor::unit([2, 2, 2]).unwrap();
        let values = vec![0.0; 26];

        match ScalarField::new(&grid, &values) {
            Err(Error::FieldLength { expected, actual }) => {
                assert_eq!(expected, 27);
                assert_eq!(actual, 26);
            }
            other => panic!("expected a length error, got {:?}", other),
        }
    }

    #[test]
    fn test_value_lookup() {
        let grid = GridDescriptor::unit([1, 2, 3]).unwrap();
        let values: Vec<f64> = (0..grid.point_count()).map(|i| i as f64).collect();
        let field = ScalarField::new(&grid, &values).unwrap();

        assert_eq!(field.value(0, 0, 0), 0.0);
        assert_eq!(field.value(1, 0, 0), 1.0);
        assert_eq!(field.value(0, 1, 0), 2.0);
        assert_eq!(field.value(1, 2, 3), 23.0);
    }

    #[test]
    #[should_panic]
    fn test_value_out_of_range_panics() {
        let grid = GridDescriptor::unit([1, 1, 1]).unwrap();
        let values = vec![0.0; 8];
        let field = ScalarField::new(&grid, &values).unwrap();
        field.value(2, 0, 0);
    }

    #[test]
    fn test_sample_field_matches_layout() {
        let grid = GridDescriptor::new(
            [2, 1, 1],
            Point3d::new(10.0, 0.0, 0.0),
            Vector3d::new(0.5, 1.0, 1.0),
        )
        .unwrap();
        let values = sample_field(&grid, |p| p.x + 100.0 * p.y + 1000.0 * p.z);
        let field = ScalarField::new(&grid, &values).unwrap();

        assert_eq!(field.value(1, 0, 0), 10.5);
        assert_eq!(field.value(2, 1, 0), 111.0);
        assert_eq!(field.value(0, 1, 1), 1110.0);
    }

    #[test]
    fn test_sphere_field_sign() {
        let grid = GridDescriptor::unit([4, 4, 4]).unwrap();
        let values = sphere_field(&grid, Point3d::new(2.0, 2.0, 2.0), 1.5);
        let field = ScalarField::new(&grid, &values).unwrap();

        assert!(field.value(2, 2, 2) > 0.0);
        assert!(field.value(0, 0, 0) < 0.0);
    }
}
