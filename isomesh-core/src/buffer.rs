//! Fixed-capacity vertex/index buffers laid out for GPU upload
//!
//! The buffer never grows past `max_triangles`. Work that does not fit is
//! counted, so a caller can resize and run the extraction again.

use crate::{point::*, traits::{SurfaceWriter, DROPPED_VERTEX}};
use bytemuck::{Pod, Zeroable};
use log::warn;

/// Vertex record of three `vec4<f32>` attributes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub color: [f32; 4],
}

impl GpuVertex {
    pub fn new(position: Point3d, normal: Vector3d, color: [u8; 3]) -> Self {
        Self {
            position: [position.x as f32, position.y as f32, position.z as f32, 1.0],
            normal: [normal.x as f32, normal.y as f32, normal.z as f32, 0.0],
            color: [
                f32::from(color[0]) / 255.0,
                f32::from(color[1]) / 255.0,
                f32::from(color[2]) / 255.0,
                1.0,
            ],
        }
    }
}

/// Arguments of an indexed indirect draw call
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

/// Bounded surface writer with `max_triangles * 3` vertex and index slots
#[derive(Debug, Clone)]
pub struct IndexedSurfaceBuffer {
    max_triangles: usize,
    vertices: Vec<GpuVertex>,
    indices: Vec<u32>,
    dropped_vertices: usize,
    dropped_triangles: usize,
}

impl IndexedSurfaceBuffer {
    /// Index returned by `add_vertex` once the vertex storage is full
    pub const INVALID_INDEX: u32 = DROPPED_VERTEX;

    pub fn new(max_triangles: usize) -> Self {
        Self {
            max_triangles,
            vertices: Vec::with_capacity(max_triangles * 3),
            indices: Vec::with_capacity(max_triangles * 3),
            dropped_vertices: 0,
            dropped_triangles: 0,
        }
    }

    pub fn max_triangles(&self) -> usize {
        self.max_triangles
    }

    /// Vertex slots, kept below [`Self::INVALID_INDEX`]
    fn vertex_capacity(&self) -> usize {
        self.max_triangles
            .saturating_mul(3)
            .min(Self::INVALID_INDEX as usize)
    }

    pub fn vertices(&self) -> &[GpuVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices that did not fit
    pub fn dropped_vertices(&self) -> usize {
        self.dropped_vertices
    }

    /// Triangles that did not fit or referenced a dropped vertex
    pub fn dropped_triangles(&self) -> usize {
        self.dropped_triangles
    }

    pub fn has_overflowed(&self) -> bool {
        self.dropped_vertices > 0 || self.dropped_triangles > 0
    }

    /// Draw arguments covering every index written so far
    pub fn indirect_args(&self) -> DrawIndexedIndirectArgs {
        DrawIndexedIndirectArgs {
            index_count: self.indices.len() as u32,
            instance_count: 1,
            first_index: 0,
            base_vertex: 0,
            first_instance: 0,
        }
    }

    /// Raw vertex bytes ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes ready for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Forget all content and overflow counts, keeping the capacity
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.dropped_vertices = 0;
        self.dropped_triangles = 0;
    }

    fn note_overflow(&self) {
        if !self.has_overflowed() {
            warn!(
                "Surface buffer full at {} triangles, further output is dropped",
                self.max_triangles
            );
        }
    }
}

impl SurfaceWriter for IndexedSurfaceBuffer {
    fn add_vertex(&mut self, position: Point3d, normal: Vector3d, color: [u8; 3]) -> u32 {
        let index = self.vertices.len();
        if index >= self.vertex_capacity() {
            self.note_overflow();
            self.dropped_vertices += 1;
            return Self::INVALID_INDEX;
        }
        self.vertices.push(GpuVertex::new(position, normal, color));
        index as u32
    }

    fn add_triangle(&mut self, triangle: [u32; 3]) {
        if self.indices.len() / 3 >= self.max_triangles
            || triangle.contains(&Self::INVALID_INDEX)
        {
            self.note_overflow();
            self.dropped_triangles += 1;
            return;
        }
        self.indices.extend_from_slice(&triangle);
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buffer: &mut IndexedSurfaceBuffer, triangles: usize) {
        let n = Vector3d::new(0.0, 0.0, 1.0);
        for t in 0..triangles {
            let x = t as f64;
            let a = buffer.add_vertex(Point3d::new(x, 0.0, 0.0), n, [255, 255, 255]);
            let b = buffer.add_vertex(Point3d::new(x + 1.0, 0.0, 0.0), n, [255, 255, 255]);
            let c = buffer.add_vertex(Point3d::new(x, 1.0, 0.0), n, [255, 255, 255]);
            buffer.add_triangle([a, b, c]);
        }
    }

    #[test]
    fn test_gpu_layout() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 48);
        assert_eq!(std::mem::size_of::<DrawIndexedIndirectArgs>(), 20);
    }

    #[test]
    fn test_within_capacity() {
        let mut buffer = IndexedSurfaceBuffer::new(4);
        fill(&mut buffer, 4);

        assert_eq!(buffer.triangle_count(), 4);
        assert!(!buffer.has_overflowed());
        assert_eq!(buffer.vertex_bytes().len(), 12 * 48);
        assert_eq!(buffer.index_bytes().len(), 12 * 4);

        let args = buffer.indirect_args();
        assert_eq!(args.index_count, 12);
        assert_eq!(args.instance_count, 1);
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut buffer = IndexedSurfaceBuffer::new(2);
        fill(&mut buffer, 5);

        assert_eq!(buffer.triangle_count(), 2);
        assert_eq!(buffer.dropped_vertices(), 9);
        assert_eq!(buffer.dropped_triangles(), 3);
        assert_eq!(buffer.indirect_args().index_count as usize, buffer.indices().len());
        assert!(buffer.indices().iter().all(|&i| (i as usize) < buffer.vertices().len()));

        buffer.clear();
        assert!(!buffer.has_overflowed());
        assert_eq!(buffer.triangle_count(), 0);
    }

    #[test]
    fn test_vertex_conversion() {
        let v = GpuVertex::new(
            Point3d::new(1.0, 2.0, 3.0),
            Vector3d::new(0.0, 1.0, 0.0),
            [255, 0, 0],
        );
        assert_eq!(v.position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(v.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
