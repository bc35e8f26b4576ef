//! Extracted isosurface in world space

use crate::{
    mesh::TriangleMesh,
    point::*,
    traits::{SurfaceWriter, DROPPED_VERTEX},
};
use serde::{Deserialize, Serialize};

/// Indexed triangle surface produced by an isosurface extractor
///
/// Positions and normals are kept in double precision. `colors` is only
/// populated for surfaces created with [`IsoSurface::with_colors`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsoSurface {
    pub positions: Vec<Point3d>,
    pub normals: Vec<Vector3d>,
    pub colors: Option<Vec<[u8; 3]>>,
    pub triangles: Vec<[u32; 3]>,
}

impl IsoSurface {
    /// Create an empty surface without colours
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty surface that records per-vertex colours
    pub fn with_colors() -> Self {
        Self {
            colors: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the surface has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// World-space bounding box of the vertices, `None` when there are none
    pub fn bounds(&self) -> Option<(Point3d, Point3d)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// True when any triangle repeats a vertex index
    pub fn has_degenerate_triangles(&self) -> bool {
        self.triangles
            .iter()
            .any(|&[a, b, c]| a == b || b == c || a == c)
    }

    /// Signed volume enclosed by the surface, positive when the winding faces outward
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let a = self.positions[t[0] as usize].coords;
                let b = self.positions[t[1] as usize].coords;
                let c = self.positions[t[2] as usize].coords;
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum()
    }

    /// Convert to a single precision [`TriangleMesh`]
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let vertices = self.positions.iter().map(|p| p.cast::<f32>()).collect();
        let faces = self
            .triangles
            .iter()
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .collect();

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.set_normals(self.normals.iter().map(|n| n.cast::<f32>()).collect());
        if let Some(colors) = &self.colors {
            mesh.set_colors(colors.clone());
        }
        mesh
    }
}

/// Index of the vertex appended after `len` others.
///
/// [`DROPPED_VERTEX`] is never a valid index, so running into it is fatal.
fn next_index(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(index) if index != DROPPED_VERTEX => index,
        _ => panic!(
            "IsoSurface holds at most {} vertices, cannot add vertex {}",
            u32::MAX,
            len
        ),
    }
}

impl SurfaceWriter for IsoSurface {
    fn add_vertex(&mut self, position: Point3d, normal: Vector3d, color: [u8; 3]) -> u32 {
        let index = next_index(self.positions.len());
        self.positions.push(position);
        self.normals.push(normal);
        if let Some(colors) = &mut self.colors {
            colors.push(color);
        }
        index
    }

    fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.triangles.push(triangle);
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
