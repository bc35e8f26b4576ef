//! Per-point gradient estimation and the normal sign convention

use crate::parallel::parallel_map;
use isomesh_core::{ScalarField, Vector3d};
use serde::{Deserialize, Serialize};

/// Gradients shorter than this produce the fallback normal
pub const MIN_GRADIENT_NORM: f64 = 1e-12;

/// Direction of the normals written to the output surface
///
/// `Outward` is `normalize(-grad F)`: for a blob whose interior lies above
/// the isovalue it points out of the blob. `Inward` is `normalize(grad F)`.
/// Only the normals change; triangle winding never depends on this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalSign {
    #[default]
    Outward,
    Inward,
}

/// Field gradient at every grid point, in grid units
#[derive(Debug, Clone)]
pub struct GradientField {
    points: [usize; 3],
    gradients: Vec<Vector3d>,
}

/// Difference along one axis: central inside, one-sided at both ends
#[inline]
fn axis_difference(lower: f64, center: f64, upper: f64, index: usize, last: usize) -> f64 {
    if index == 0 {
        upper - center
    } else if index == last {
        center - lower
    } else {
        0.5 * (upper - lower)
    }
}

impl GradientField {
    /// Estimate the gradient of `field` at every grid point.
    ///
    /// Z-slabs are processed through [`parallel_map`]; the result does not
    /// depend on the thread count.
    pub fn estimate(field: &ScalarField<'_>) -> Self {
        let points = field.grid().points();
        let [px, py, pz] = points;
        let slabs: Vec<usize> = (0..pz).collect();

        let per_slab = parallel_map(&slabs, |&z| {
            let mut slab = Vec::with_capacity(px * py);
            for y in 0..py {
                for x in 0..px {
                    slab.push(Self::central_difference(field, x, y, z));
                }
            }
            slab
        });

        Self {
            points,
            gradients: per_slab.into_iter().flatten().collect(),
        }
    }

    fn central_difference(field: &ScalarField<'_>, x: usize, y: usize, z: usize) -> Vector3d {
        let [px, py, pz] = field.grid().points();
        let c = field.value(x, y, z);

        // neighbour indices clamp to the grid; the one-sided branch ignores the clamped side
        let gx = axis_difference(
            field.value(x.saturating_sub(1), y, z),
            c,
            field.value((x + 1).min(px - 1), y, z),
            x,
            px - 1,
        );
        let gy = axis_difference(
            field.value(x, y.saturating_sub(1), z),
            c,
            field.value(x, (y + 1).min(py - 1), z),
            y,
            py - 1,
        );
        let gz = axis_difference(
            field.value(x, y, z.saturating_sub(1)),
            c,
            field.value(x, y, (z + 1).min(pz - 1)),
            z,
            pz - 1,
        );
        Vector3d::new(gx, gy, gz)
    }

    /// Gradient at grid point `(x, y, z)`
    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> Vector3d {
        let [px, py, _] = self.points;
        self.gradients[x + px * (y + py * z)]
    }

    /// Number of grid points covered
    pub fn len(&self) -> usize {
        self.gradients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradients.is_empty()
    }
}

/// Unit normal for a grid-space gradient.
///
/// The gradient is rescaled by `1 / step` per axis first, so anisotropic
/// grids still get normals perpendicular to the world-space surface.
pub fn surface_normal(gradient: &Vector3d, step: &Vector3d, sign: NormalSign) -> Vector3d {
    let world = gradient.component_div(step);
    let norm = world.norm();
    if !(norm >= MIN_GRADIENT_NORM) {
        return Vector3d::new(0.0, 0.0, 1.0);
    }
    match sign {
        NormalSign::Outward => -world / norm,
        NormalSign::Inward => world / norm,
    }
}
