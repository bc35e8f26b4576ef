//! Core traits for isomesh

use crate::point::*;

/// Index a writer returns for a vertex it could not store
pub const DROPPED_VERTEX: u32 = u32::MAX;

/// Sink for the vertices and triangles produced by an extractor
///
/// Implemented by the growable [`IsoSurface`](crate::IsoSurface) and the
/// fixed-capacity [`IndexedSurfaceBuffer`](crate::IndexedSurfaceBuffer).
pub trait SurfaceWriter {
    /// Append a vertex and return its index, or [`DROPPED_VERTEX`] when
    /// there is no room for it
    fn add_vertex(&mut self, position: Point3d, normal: Vector3d, color: [u8; 3]) -> u32;

    /// Append a triangle referencing previously added vertices. Triangles
    /// naming a dropped vertex still arrive here so the writer can count them.
    fn add_triangle(&mut self, triangle: [u32; 3]);

    /// Number of vertices written so far
    fn vertex_count(&self) -> usize;
}
