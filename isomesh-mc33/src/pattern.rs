//! Triangulation patterns
//!
//! Patterns are derived once per process from cell topology rather than
//! transcribed by hand. For every canonical cube index, every choice of
//! joined diagonals on its ambiguous faces and every admissible tunnel, the
//! surface segments on the six faces are chained into closed loops and the
//! loops are triangulated:
//!
//! - a tunnel joins two loops with a band of `n + m` triangles;
//! - loops of up to seven vertices are split without chords that lie in a
//!   cell face;
//! - longer loops fan around the cell-centre vertex.
//!
//! Chords in a shared face would be seen by the neighbouring cell too, so
//! each face's chords belong to exactly one of the two cells. The owner is
//! decided by the face's joined diagonal, which both cells agree on.
//!
//! Triangles are packed three edge ids to a `u16`, each pattern ends with a
//! `0` entry, and all patterns live in one flat array indexed through
//! [`PatternTable::start`].

use crate::classify::{CellTopology, PatternKey, TunnelRule};
use crate::tables::{
    edge_axis, edge_between, edge_faces, face_axis, is_upper_face, BODY_DIAGONALS, CENTER,
    EDGES, FACES,
};
use isomesh_core::{Error, Result};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;
use std::sync::OnceLock;

static PATTERN_TABLE: OnceLock<std::result::Result<PatternTable, String>> = OnceLock::new();

const INF: u32 = u32::MAX;

/// Loops of at least this many vertices fan around the cell centre
const FAN_THRESHOLD: usize = 8;

/// All triangulation patterns in one flat array
#[derive(Debug, Clone)]
pub struct PatternTable {
    packed: Vec<u16>,
    starts: HashMap<PatternKey, usize>,
}

#[inline]
fn pack(triangle: [u8; 3]) -> u16 {
    triangle[0] as u16 | (triangle[1] as u16) << 4 | (triangle[2] as u16) << 8
}

#[inline]
fn unpack(word: u16) -> [u8; 3] {
    [
        (word & 0xF) as u8,
        (word >> 4 & 0xF) as u8,
        (word >> 8 & 0xF) as u8,
    ]
}

impl PatternTable {
    /// The process-wide table, built on first use
    pub fn global() -> Result<&'static PatternTable> {
        PATTERN_TABLE
            .get_or_init(|| {
                Self::build().map_err(|e| match e {
                    Error::CaseTable(msg) => msg,
                    other => other.to_string(),
                })
            })
            .as_ref()
            .map_err(|msg| Error::CaseTable(msg.clone()))
    }

    /// Derive every pattern from cell topology
    pub fn build() -> Result<Self> {
        // offset 0 holds the empty pattern
        let mut packed = vec![0u16];
        let mut starts = HashMap::new();
        starts.insert(
            PatternKey {
                canonical: 0,
                joined: 0,
                tunnel: None,
            },
            0,
        );

        for canonical in 1u8..128 {
            let ambiguous = CellTopology::new(canonical, 0).ambiguous_faces();

            // every subset of the ambiguous faces, largest first
            let mut joined = ambiguous;
            loop {
                let topology = CellTopology::new(canonical, joined);
                let mut tunnels = vec![None];
                match topology.tunnel_rule() {
                    TunnelRule::None => {}
                    TunnelRule::Diagonal(candidates) => tunnels.extend(
                        (0..4u8)
                            .filter(|&i| candidates & (1 << i) != 0)
                            .map(Some),
                    ),
                    TunnelRule::Singleton(i) => {
                        tunnels.extend([Some(i as u8), Some(BODY_DIAGONALS[i] as u8)])
                    }
                }

                for tunnel in tunnels {
                    let key = PatternKey {
                        canonical,
                        joined,
                        tunnel,
                    };
                    let triangles = triangulate_topology(&topology, tunnel).map_err(|e| {
                        Error::CaseTable(format!("{:?}: {}", key, e))
                    })?;
                    starts.insert(key, packed.len());
                    // stored with the negative side on the left
                    packed.extend(triangles.iter().map(|&[a, b, c]| pack([c, b, a])));
                    packed.push(0);
                }

                if joined == 0 {
                    break;
                }
                joined = (joined - 1) & ambiguous;
            }
        }

        debug!(
            "Built MC33 pattern table: {} patterns, {} packed triangles",
            starts.len(),
            packed.len() - starts.len()
        );

        Ok(Self { packed, starts })
    }

    /// Offset of the pattern for `key`
    pub fn start(&self, key: &PatternKey) -> Result<usize> {
        self.starts
            .get(key)
            .copied()
            .ok_or_else(|| Error::CaseTable(format!("no pattern for {:?}", key)))
    }

    /// Triangles of the pattern starting at `start`, as edge ids
    pub fn triangles(&self, start: usize) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.packed[start..]
            .iter()
            .take_while(|&&word| word != 0)
            .map(|&word| unpack(word))
    }

    /// The shared flat array, `0`-terminated per pattern
    pub fn packed(&self) -> &[u16] {
        &self.packed
    }

    /// Number of distinct patterns, including the empty one
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Closed loops of crossed edges, the positive region on the left seen
/// from outside the cell
fn surface_loops(t: &CellTopology) -> std::result::Result<Vec<Vec<u8>>, String> {
    let mut next: [Option<u8>; 12] = [None; 12];

    for (f, cs) in FACES.iter().enumerate() {
        let edges: [u8; 4] = std::array::from_fn(|k| {
            edge_between(cs[k], cs[(k + 1) % 4])
                .unwrap_or_else(|| unreachable!("face {} corners {} and {} not adjacent", f, k, k + 1))
        });
        let crossed: [bool; 4] =
            std::array::from_fn(|k| t.is_positive(cs[k]) != t.is_positive(cs[(k + 1) % 4]));

        if t.ambiguous_faces() & (1 << f) != 0 {
            // cut off the two corners not on the joined diagonal
            let diagonal = t.diagonal(f);
            for k in 0..4 {
                let c = cs[k];
                if diagonal.contains(&c) {
                    continue;
                }
                if t.is_positive(c) {
                    next[edges[k] as usize] = Some(edges[(k + 3) % 4]);
                } else {
                    next[edges[(k + 3) % 4] as usize] = Some(edges[k]);
                }
            }
        } else if crossed.iter().filter(|&&x| x).count() == 2 {
            let exit = (0..4).find(|&k| crossed[k] && t.is_positive(cs[k]));
            let entry = (0..4).find(|&k| crossed[k] && !t.is_positive(cs[k]));
            if let (Some(exit), Some(entry)) = (exit, entry) {
                next[edges[exit] as usize] = Some(edges[entry]);
            }
        }
    }

    let mut seen = [false; 12];
    let mut loops = Vec::new();
    for e in 0..12 {
        if next[e].is_none() || seen[e] {
            continue;
        }
        let mut current = Vec::new();
        let mut x = e;
        while !seen[x] {
            seen[x] = true;
            current.push(x as u8);
            x = next[x].ok_or_else(|| format!("surface loop ends at edge {}", x))? as usize;
        }
        if x != e {
            return Err(format!("surface loop through edge {} does not close", e));
        }
        loops.push(current);
    }
    Ok(loops)
}

/// Components on the positive and negative side of a loop
fn loop_sides(t: &CellTopology, lp: &[u8]) -> (u8, u8) {
    let [a, b] = EDGES[lp[0] as usize];
    let (p, n) = if t.is_positive(a) { (a, b) } else { (b, a) };
    (t.component(p), t.component(n))
}

/// Two loops bounding the same region on one side and different components
/// on the side of the tunnelled corner
fn tunnel_loops(
    t: &CellTopology,
    loops: &[Vec<u8>],
    own: u8,
    positive: bool,
    other: Option<u8>,
) -> Option<(usize, usize)> {
    let sides: Vec<[u8; 2]> = loops
        .iter()
        .map(|lp| {
            let (p, n) = loop_sides(t, lp);
            [p, n]
        })
        .collect();
    let o = if positive { 0 } else { 1 };

    for (a, sa) in sides.iter().enumerate() {
        if sa[o] != own {
            continue;
        }
        for (b, sb) in sides.iter().enumerate() {
            if a != b
                && sb[1 - o] == sa[1 - o]
                && sb[o] != own
                && other.map_or(true, |c| sb[o] == c)
            {
                return Some((a, b));
            }
        }
    }
    None
}

/// Face shared by the two edges of a chord, if any
fn chord_face(a: u8, b: u8) -> Option<usize> {
    let shared = edge_faces(a) & edge_faces(b);
    (shared != 0).then(|| 7 - shared.leading_zeros() as usize)
}

/// Whether this cell owns a chord lying in one of its faces.
///
/// The lower-face cell owns the chords when the face's fixed diagonal is
/// joined, except for chords between two edges parallel to an axis that
/// precedes the face normal, which go to the other side.
fn chord_allowed(t: &CellTopology, a: u8, b: u8) -> bool {
    let Some(f) = chord_face(a, b) else {
        return true;
    };
    let fixed = t.joined_faces() & (1 << f) != 0;
    let flip = edge_axis(a) == edge_axis(b) && edge_axis(a) < face_axis(f);
    is_upper_face(f) == (fixed != flip)
}

#[inline]
fn chord_cost(a: u8, b: u8) -> u32 {
    u32::from(chord_face(a, b).is_some())
}

#[derive(Clone, Copy)]
enum Step {
    A,
    B,
}

/// Band of triangles joining loop `a` to loop `b`, walked in opposite
/// directions, with the fewest in-face chords
fn annulus(a: &[u8], b: &[u8], t: &CellTopology) -> Option<Vec<[u8; 3]>> {
    let (n, m) = (a.len(), b.len());
    let mut best: Option<(u32, usize, usize, Vec<Vec<Option<Step>>>)> = None;

    for i0 in 0..n {
        for j0 in 0..m {
            if !chord_allowed(t, a[i0], b[j0]) {
                continue;
            }
            let mut cost = vec![vec![INF; m + 1]; n + 1];
            let mut back: Vec<Vec<Option<Step>>> = vec![vec![None; m + 1]; n + 1];
            cost[0][0] = chord_cost(a[i0], b[j0]);

            for s in 0..n + m {
                for ia in 0..=n.min(s) {
                    let ib = s - ia;
                    if ib > m || cost[ia][ib] == INF {
                        continue;
                    }
                    let c = cost[ia][ib];
                    let ai = a[(i0 + ia) % n];
                    let bj = b[(j0 + m - ib) % m];

                    if ia < n && ib < m && !(ib == 0 && ia == n - 1) {
                        let an = a[(i0 + ia + 1) % n];
                        let target = (ia + 1, ib);
                        let last = target == (n, m);
                        if last || chord_allowed(t, an, bj) {
                            let nc = c + if last { 0 } else { chord_cost(an, bj) };
                            if nc < cost[target.0][target.1] {
                                cost[target.0][target.1] = nc;
                                back[target.0][target.1] = Some(Step::A);
                            }
                        }
                    }

                    if ib < m && (ia, ib) != (0, 0) && !(ia == 0 && ib == m - 1) {
                        let bp = b[(j0 + 2 * m - ib - 1) % m];
                        let target = (ia, ib + 1);
                        let last = target == (n, m);
                        if last || chord_allowed(t, ai, bp) {
                            let nc = c + if last { 0 } else { chord_cost(ai, bp) };
                            if nc < cost[target.0][target.1] {
                                cost[target.0][target.1] = nc;
                                back[target.0][target.1] = Some(Step::B);
                            }
                        }
                    }
                }
            }

            let total = cost[n][m];
            if total < INF && best.as_ref().map_or(true, |(c, ..)| total < *c) {
                best = Some((total, i0, j0, back));
            }
        }
    }

    let (_, i0, j0, back) = best?;
    let mut triangles = Vec::with_capacity(n + m);
    let (mut ia, mut ib) = (n, m);
    while (ia, ib) != (0, 0) {
        match back[ia][ib]? {
            Step::A => {
                ia -= 1;
                triangles.push([a[(i0 + ia) % n], a[(i0 + ia + 1) % n], b[(j0 + m - ib) % m]]);
            }
            Step::B => {
                ib -= 1;
                triangles.push([
                    b[(j0 + 2 * m - ib - 1) % m],
                    b[(j0 + m - ib) % m],
                    a[(i0 + ia) % n],
                ]);
            }
        }
    }
    triangles.reverse();
    Some(triangles)
}

/// Triangulate a loop without chords between two edges of one cell face
fn polygon(lp: &[u8]) -> Option<Vec<[u8; 3]>> {
    let n = lp.len();
    let ok = |i: usize, j: usize| {
        let d = j - i;
        d == 1 || d == n - 1 || edge_faces(lp[i]) & edge_faces(lp[j]) == 0
    };

    fn split(lp: &[u8], i: usize, j: usize, ok: &dyn Fn(usize, usize) -> bool) -> Option<Vec<[u8; 3]>> {
        if j - i < 2 {
            return Some(Vec::new());
        }
        if !ok(i, j) {
            return None;
        }
        (i + 1..j).find_map(|k| {
            let left = split(lp, i, k, ok)?;
            let right = split(lp, k, j, ok)?;
            let mut out = left;
            out.push([lp[i], lp[k], lp[j]]);
            out.extend(right);
            Some(out)
        })
    }

    split(lp, 0, n - 1, &ok)
}

fn fan(lp: &[u8]) -> Vec<[u8; 3]> {
    lp.iter()
        .circular_tuple_windows()
        .map(|(&a, &b)| [CENTER, a, b])
        .collect()
}

/// Triangles for one topology, positive side on the left
fn triangulate_topology(
    t: &CellTopology,
    tunnel: Option<u8>,
) -> std::result::Result<Vec<[u8; 3]>, String> {
    let loops = surface_loops(t)?;
    let mut triangles = Vec::new();
    let mut used = [false; 12];

    if let Some(k) = tunnel {
        let k = k as usize;
        let other = match t.tunnel_rule() {
            TunnelRule::Diagonal(_) => Some(t.component(BODY_DIAGONALS[k])),
            _ => None,
        };
        let (a, b) = tunnel_loops(t, &loops, t.component(k), t.is_positive(k), other)
            .ok_or_else(|| format!("no loop pair around corner {}", k))?;
        let band = annulus(&loops[a], &loops[b], t)
            .ok_or_else(|| format!("no admissible band between loops {} and {}", a, b))?;
        triangles.extend(band);
        used[a] = true;
        used[b] = true;
    }

    for (i, lp) in loops.iter().enumerate() {
        if used[i] {
            continue;
        }
        let split = if lp.len() >= FAN_THRESHOLD {
            None
        } else {
            polygon(lp)
        };
        triangles.extend(split.unwrap_or_else(|| fan(lp)));
    }

    Ok(triangles)
}
