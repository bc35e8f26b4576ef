//! Vertex creation and triangle emission for one classified cell

use crate::cache::{Slot, VertexSlots};
use crate::classify::Classification;
use crate::gradient::{surface_normal, GradientField, NormalSign};
use crate::pattern::PatternTable;
use crate::tables::{CENTER, CORNERS, EDGES};
use isomesh_core::{
    GridDescriptor, Point3d, Result, SurfaceWriter, Vector3d, DROPPED_VERTEX,
};

pub const COLOR_DEFAULT: [u8; 3] = [255, 255, 255];
/// Vertices snapped onto a grid point
pub const COLOR_SNAPPED: [u8; 3] = [0, 255, 0];
/// Vertices on the highlighted edge
pub const COLOR_HIGHLIGHT: [u8; 3] = [255, 0, 0];

/// Triangles written for one cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOutput {
    pub triangles: usize,
    /// Triangles naming one vertex twice
    pub degenerate: usize,
}

/// Turns a cell's pattern into vertices and triangles
#[derive(Debug, Clone, Copy)]
pub struct Triangulator<'a> {
    grid: &'a GridDescriptor,
    gradients: &'a GradientField,
    table: &'a PatternTable,
    normal_sign: NormalSign,
    highlight_edge: Option<u8>,
}

impl<'a> Triangulator<'a> {
    pub fn new(
        grid: &'a GridDescriptor,
        gradients: &'a GradientField,
        table: &'a PatternTable,
        normal_sign: NormalSign,
        highlight_edge: Option<u8>,
    ) -> Self {
        Self {
            grid,
            gradients,
            table,
            normal_sign,
            highlight_edge,
        }
    }

    /// Emit the triangles of cell `(x, y, z)` with corner values `v`.
    ///
    /// `slots` must already be positioned on the cell. Triangles naming a
    /// vertex the writer dropped are still passed on for it to count.
    pub fn emit<S, W>(
        &self,
        cell: [usize; 3],
        v: &[f64; 8],
        classification: &Classification,
        slots: &mut S,
        writer: &mut W,
    ) -> Result<CellOutput>
    where
        S: VertexSlots,
        W: SurfaceWriter,
    {
        let mut out = CellOutput::default();
        if classification.is_empty() {
            return Ok(out);
        }

        let start = self.table.start(&classification.key())?;
        // patterns keep the negative side on the left; the normal sign
        // never touches the winding
        let flip = !classification.complemented;

        for edges in self.table.triangles(start) {
            let ids = edges.map(|e| self.resolve(cell, v, e, slots, writer));
            let repeated = ids[0] == ids[1] || ids[1] == ids[2] || ids[0] == ids[2];
            if repeated && !ids.contains(&DROPPED_VERTEX) {
                out.degenerate += 1;
                continue;
            }
            writer.add_triangle(if flip { [ids[2], ids[1], ids[0]] } else { ids });
            out.triangles += 1;
        }

        Ok(out)
    }

    fn resolve<S, W>(&self, cell: [usize; 3], v: &[f64; 8], edge: u8, slots: &mut S, writer: &mut W) -> u32
    where
        S: VertexSlots,
        W: SurfaceWriter,
    {
        let slot = if edge == CENTER {
            Slot::Center
        } else {
            Slot::Edge(edge)
        };
        match *slots.slot(slot) {
            Some(id) => id,
            None => {
                let id = self.create_vertex(cell, v, edge, writer);
                *slots.slot(slot) = Some(id);
                id
            }
        }
    }

    fn create_vertex<W: SurfaceWriter>(
        &self,
        cell: [usize; 3],
        v: &[f64; 8],
        edge: u8,
        writer: &mut W,
    ) -> u32 {
        let [x, y, z] = cell;
        let corner_point = |c: usize| {
            let [dx, dy, dz] = CORNERS[c];
            [x + dx, y + dy, z + dz]
        };
        let gradient_at = |c: usize| {
            let [gx, gy, gz] = corner_point(c);
            self.gradients.at(gx, gy, gz)
        };
        let highlighted = if self.highlight_edge == Some(edge) {
            COLOR_HIGHLIGHT
        } else {
            COLOR_DEFAULT
        };

        let (position, gradient, color) = match (edge, snapped_corner(v, edge)) {
            (CENTER, _) => {
                let gradient = (0..8).map(gradient_at).sum::<Vector3d>() / 8.0;
                let p = Point3d::new(x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5);
                (p, gradient, highlighted)
            }
            (_, Some(c)) => {
                let [gx, gy, gz] = corner_point(c);
                let p = Point3d::new(gx as f64, gy as f64, gz as f64);
                (p, gradient_at(c), COLOR_SNAPPED)
            }
            (e, None) => {
                let [a, b] = EDGES[e as usize];
                let t = v[a] / (v[a] - v[b]);
                let pa = corner_point(a).map(|c| c as f64);
                let pb = corner_point(b).map(|c| c as f64);
                let p = Point3d::new(
                    pa[0] + t * (pb[0] - pa[0]),
                    pa[1] + t * (pb[1] - pa[1]),
                    pa[2] + t * (pb[2] - pa[2]),
                );
                let ga = gradient_at(a);
                let gradient = ga + (gradient_at(b) - ga) * t;
                (p, gradient, highlighted)
            }
        };

        let normal = surface_normal(&gradient, &self.grid.step(), self.normal_sign);
        writer.add_vertex(self.grid.grid_to_world(&position), normal, color)
    }
}

/// Corner of `edge` whose value is exactly the isovalue.
///
/// The vertex on such an edge sits on that grid point. It keeps its own
/// index per edge; coincident vertices are merged after extraction.
#[inline]
pub fn snapped_corner(v: &[f64; 8], edge: u8) -> Option<usize> {
    if edge == CENTER {
        return None;
    }
    let [a, b] = EDGES[edge as usize];
    if v[a] == 0.0 {
        Some(a)
    } else if v[b] == 0.0 {
        Some(b)
    } else {
        None
    }
}
