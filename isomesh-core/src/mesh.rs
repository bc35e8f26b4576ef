//! Triangle mesh in single precision, as consumed by renderers and exporters

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

/// Edge usage summary of a mesh, see [`TriangleMesh::edge_report`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeReport {
    /// Undirected edges used by exactly one face
    pub boundary: usize,
    /// Undirected edges shared by two faces that traverse it in opposite directions
    pub manifold: usize,
    /// Everything else: more than two faces, or two faces with the same direction
    pub defective: usize,
}

impl EdgeReport {
    /// True when every edge is shared by exactly two consistently oriented faces
    pub fn is_closed(&self) -> bool {
        self.boundary == 0 && self.defective == 0
    }
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Calculate face normals from the winding, `(v1 - v0) x (v2 - v0)`
    ///
    /// Zero-area faces yield a zero vector instead of NaN.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let n = (v1 - v0).cross(&(v2 - v0));
                n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Classify every undirected edge by how many faces use it and in which direction
    pub fn edge_report(&self) -> EdgeReport {
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &self.faces {
            for k in 0..3 {
                *directed.entry((face[k], face[(k + 1) % 3])).or_insert(0) += 1;
            }
        }

        let mut report = EdgeReport::default();
        for (&(a, b), &count) in &directed {
            let reverse = directed.get(&(b, a)).copied().unwrap_or(0);
            if reverse == 0 {
                if count == 1 {
                    report.boundary += 1;
                } else {
                    report.defective += 1;
                }
            } else if a < b {
                // count each undirected pair once
                if count == 1 && reverse == 1 {
                    report.manifold += 1;
                } else {
                    report.defective += 1;
                }
            }
        }
        report
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
