//! Vertex slot storage
//!
//! The triangulator asks a [`VertexSlots`] implementation where the index of
//! each surface vertex lives. [`SlabCache`] shares vertices between
//! neighbouring cells by keying them on global grid edges, [`LocalSlots`]
//! keeps them private to one cell. An empty slot holds `None`, so any index
//! a writer hands out (its overflow marker included) is remembered.

use crate::tables::{CORNERS, EDGES};

/// Where a surface vertex sits within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// On cell edge `0..12`
    Edge(u8),
    /// The cell centre
    Center,
}

/// Storage for the vertex indices of the cell being triangulated
pub trait VertexSlots {
    /// Move to cell `(x, y, z)`
    fn begin_cell(&mut self, cell: [usize; 3]);

    /// Index stored for `slot`, `None` when not created yet
    fn slot(&mut self, slot: Slot) -> &mut Option<u32>;
}

/// Rolling cache over the two grid planes bounding the current z-slab.
///
/// Cells must be visited z-slab by z-slab, calling [`SlabCache::advance`]
/// between slabs. Lower and upper plane arrays are swapped on advance and
/// the new upper plane is cleared.
#[derive(Debug, Clone)]
pub struct SlabCache {
    nx: usize,
    cell: [usize; 3],
    center: Option<u32>,
    x_edges: [Vec<Option<u32>>; 2],
    y_edges: [Vec<Option<u32>>; 2],
    z_edges: Vec<Option<u32>>,
}

impl SlabCache {
    /// Cache for a grid with `cells` cells per axis
    pub fn new(cells: [usize; 3]) -> Self {
        let [nx, ny, _] = cells;
        Self {
            nx,
            cell: [0; 3],
            center: None,
            x_edges: [vec![None; nx * (ny + 1)], vec![None; nx * (ny + 1)]],
            y_edges: [vec![None; (nx + 1) * ny], vec![None; (nx + 1) * ny]],
            z_edges: vec![None; (nx + 1) * (ny + 1)],
        }
    }

    /// Move on to the next z-slab
    pub fn advance(&mut self) {
        self.x_edges.swap(0, 1);
        self.y_edges.swap(0, 1);
        self.x_edges[1].fill(None);
        self.y_edges[1].fill(None);
        self.z_edges.fill(None);
    }
}

impl VertexSlots for SlabCache {
    fn begin_cell(&mut self, cell: [usize; 3]) {
        self.cell = cell;
        self.center = None;
    }

    fn slot(&mut self, slot: Slot) -> &mut Option<u32> {
        let [x, y, _] = self.cell;
        match slot {
            Slot::Center => &mut self.center,
            Slot::Edge(e) => {
                let [a, b] = EDGES[e as usize];
                let [dx, dy, dz] = CORNERS[a];
                let (gx, gy) = (x + dx, y + dy);
                if CORNERS[a][0] != CORNERS[b][0] {
                    &mut self.x_edges[dz][gx + self.nx * gy]
                } else if CORNERS[a][1] != CORNERS[b][1] {
                    &mut self.y_edges[dz][gx + (self.nx + 1) * gy]
                } else {
                    &mut self.z_edges[gx + (self.nx + 1) * gy]
                }
            }
        }
    }
}

/// Per-cell slots: 12 edges and the centre
#[derive(Debug, Clone)]
pub struct LocalSlots {
    slots: [Option<u32>; 13],
}

impl LocalSlots {
    pub fn new() -> Self {
        Self { slots: [None; 13] }
    }
}

impl Default for LocalSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSlots for LocalSlots {
    fn begin_cell(&mut self, _cell: [usize; 3]) {
        self.slots.fill(None);
    }

    fn slot(&mut self, slot: Slot) -> &mut Option<u32> {
        let i = match slot {
            Slot::Edge(e) => e as usize,
            Slot::Center => 12,
        };
        &mut self.slots[i]
    }
}
