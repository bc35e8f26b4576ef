//! Merging of vertices snapped onto the same grid point
//!
//! A sample exactly at the isovalue puts the vertices of all its crossing
//! edges on one position. Those vertices are created separately and merged
//! here by collapsing the zero-length mesh edges between them. A collapse is
//! only done when it passes the link condition, so two sheets touching at
//! the grid point keep their own vertex instead of being pinched together.
//! The one exception is a boundary hole whose corners all sit on the point,
//! which is closed.

use isomesh_core::{IsoSurface, Point3d};
use log::debug;
use std::collections::HashMap;

struct Welder<'a> {
    positions: &'a [Point3d],
    triangles: &'a [[u32; 3]],
    alive: Vec<bool>,
    parent: Vec<u32>,
    /// Triangles around each merge candidate, keyed by its representative
    incident: HashMap<u32, Vec<usize>>,
}

impl<'a> Welder<'a> {
    fn new(positions: &'a [Point3d], triangles: &'a [[u32; 3]], candidates: &[usize]) -> Self {
        let mut incident: HashMap<u32, Vec<usize>> = HashMap::new();
        for &t in candidates {
            for v in triangles[t] {
                incident.entry(v).or_default();
            }
        }
        for (t, triangle) in triangles.iter().enumerate() {
            for v in triangle {
                if let Some(list) = incident.get_mut(v) {
                    list.push(t);
                }
            }
        }

        Self {
            positions,
            triangles,
            alive: vec![true; triangles.len()],
            parent: (0..positions.len() as u32).collect(),
            incident,
        }
    }

    fn coincident(&self, a: u32, b: u32) -> bool {
        self.positions[a as usize] == self.positions[b as usize]
    }

    fn find(&self, mut v: u32) -> u32 {
        while self.parent[v as usize] != v {
            v = self.parent[v as usize];
        }
        v
    }

    fn corners(&self, t: usize) -> [u32; 3] {
        self.triangles[t].map(|v| self.find(v))
    }

    /// Adjacent vertices of `u` with the number of live triangles on each edge
    fn neighbours(&self, u: u32) -> Vec<(u32, usize)> {
        let mut out: Vec<(u32, usize)> = Vec::new();
        for &t in self.incident.get(&u).into_iter().flatten() {
            if !self.alive[t] {
                continue;
            }
            for v in self.corners(t) {
                if v == u {
                    continue;
                }
                match out.iter_mut().find(|(w, _)| *w == v) {
                    Some((_, count)) => *count += 1,
                    None => out.push((v, 1)),
                }
            }
        }
        out
    }

    /// Third corners of the live triangles on edge `uw`
    fn apices(&self, u: u32, w: u32) -> Vec<u32> {
        let mut out = Vec::new();
        for &t in self.incident.get(&u).into_iter().flatten() {
            if !self.alive[t] {
                continue;
            }
            let corners = self.corners(t);
            if corners.contains(&w) {
                out.extend(corners.into_iter().filter(|&v| v != u && v != w));
            }
        }
        out
    }

    /// Link condition: the only common neighbours of `u` and `w` are the
    /// apices of the triangles on edge `uw`, and an inner edge may not join
    /// two boundary vertices.
    fn can_collapse(&self, u: u32, w: u32) -> bool {
        let nu = self.neighbours(u);
        let nw = self.neighbours(w);
        let shared = edge_use(&nu, w);
        if shared == 0 || shared > 2 {
            return false;
        }

        let apices = self.apices(u, w);
        let extra: Vec<u32> = nu
            .iter()
            .map(|&(v, _)| v)
            .filter(|&v| edge_use(&nw, v) > 0 && !apices.contains(&v))
            .collect();
        match extra.as_slice() {
            [] => !(shared == 2 && on_boundary(&nu) && on_boundary(&nw)),
            // triangular hole shrunk onto one point
            &[x] => {
                shared == 1
                    && edge_use(&nu, x) == 1
                    && edge_use(&nw, x) == 1
                    && self.coincident(u, x)
            }
            _ => false,
        }
    }

    /// Merge `w` into `u`, returning the number of triangles that vanished
    fn collapse(&mut self, u: u32, w: u32) -> usize {
        let (keep, gone) = (u.min(w), u.max(w));
        self.parent[gone as usize] = keep;

        let moved = self.incident.remove(&gone).unwrap_or_default();
        let mut list = self.incident.remove(&keep).unwrap_or_default();
        list.extend(moved);

        let mut removed = 0;
        let mut live = Vec::with_capacity(list.len());
        for t in list {
            if !self.alive[t] {
                continue;
            }
            let [a, b, c] = self.corners(t);
            if a == b || b == c || a == c {
                self.alive[t] = false;
                removed += 1;
            } else {
                live.push(t);
            }
        }
        self.incident.insert(keep, live);
        removed
    }
}

/// Live triangles on the edge to `v`, from a neighbour list
fn edge_use(neighbours: &[(u32, usize)], v: u32) -> usize {
    neighbours
        .iter()
        .find(|(w, _)| *w == v)
        .map_or(0, |&(_, count)| count)
}

fn on_boundary(neighbours: &[(u32, usize)]) -> bool {
    neighbours.iter().any(|&(_, count)| count == 1)
}

/// Merge coincident vertices joined by a mesh edge wherever the result stays
/// manifold, dropping the triangles that collapse to zero area.
///
/// Vertices no longer used by a triangle are removed and the rest renumbered
/// in order. Returns the number of triangles dropped.
pub fn weld_coincident_vertices(surface: &mut IsoSurface) -> usize {
    let positions = &surface.positions;
    let coincident = |a: u32, b: u32| positions[a as usize] == positions[b as usize];
    let candidates: Vec<usize> = surface
        .triangles
        .iter()
        .enumerate()
        .filter(|(_, &[a, b, c])| coincident(a, b) || coincident(b, c) || coincident(c, a))
        .map(|(t, _)| t)
        .collect();
    if candidates.is_empty() {
        return 0;
    }

    let mut welder = Welder::new(&surface.positions, &surface.triangles, &candidates);
    let mut removed = 0;
    let mut merged = true;
    while merged {
        merged = false;
        for &t in &candidates {
            if !welder.alive[t] {
                continue;
            }
            let corners = welder.corners(t);
            for k in 0..3 {
                let (u, w) = (corners[k], corners[(k + 1) % 3]);
                if welder.coincident(u, w) && welder.can_collapse(u, w) {
                    removed += welder.collapse(u, w);
                    merged = true;
                    break;
                }
            }
        }
    }

    // keep the vertices live triangles still use, in their original order
    let vertex_count = surface.vertex_count();
    let mut used = vec![false; vertex_count];
    for t in (0..welder.triangles.len()).filter(|&t| welder.alive[t]) {
        for v in welder.corners(t) {
            used[v as usize] = true;
        }
    }
    let mut remap = vec![0u32; vertex_count];
    let mut kept = 0u32;
    for (v, _) in used.iter().enumerate().filter(|(_, &u)| u) {
        remap[v] = kept;
        kept += 1;
    }

    let triangles: Vec<[u32; 3]> = (0..welder.triangles.len())
        .filter(|&t| welder.alive[t])
        .map(|t| welder.corners(t).map(|v| remap[v as usize]))
        .collect();

    let mut flags = used.iter();
    surface.positions.retain(|_| *flags.next().unwrap_or(&false));
    let mut flags = used.iter();
    surface.normals.retain(|_| *flags.next().unwrap_or(&false));
    if let Some(colors) = &mut surface.colors {
        let mut flags = used.iter();
        colors.retain(|_| *flags.next().unwrap_or(&false));
    }
    surface.triangles = triangles;

    debug!(
        "Welded coincident vertices: {} vertices and {} triangles left, {} triangles dropped",
        kept,
        surface.triangles.len(),
        removed
    );
    removed
}
