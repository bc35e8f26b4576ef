//! Case classification
//!
//! A cell is classified in three steps: the cube index is canonicalised
//! through [`CASE_TABLE`], ambiguous faces are resolved with the face test,
//! and for the cases that can hide a tunnel through the cell interior the
//! asymptotic decider picks between the tunnel and no-tunnel variants.
//!
//! Everything here works on the topology of the cell (which corners are
//! connected to which), so the same rules serve both runtime classification
//! and the construction of the pattern table.

use crate::sampler::cube_index;
use crate::tables::{BODY_DIAGONALS, CASE_TABLE, EDGES, FACES, FACE_DIAGONALS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// True when the fixed diagonal of face `f` is joined.
///
/// Only meaningful for faces with all four edges crossed. Ties favour the
/// fixed diagonal, which both cells sharing the face agree on.
#[inline]
pub fn face_test(f: usize, v: &[f64; 8]) -> bool {
    let [[p, q], [r, s]] = FACE_DIAGONALS[f];
    v[p] * v[q] >= v[r] * v[s]
}

/// Sign of the interior saddle joining body diagonal `i`, if there is one.
///
/// Returns `Some(true)` when the saddle connects the diagonal through
/// non-negative values, `Some(false)` for negative values and `None` when
/// the interior does not join the diagonal at all.
pub fn saddle_sign(i: usize, v: &[f64; 8]) -> Option<bool> {
    let odd = i & 1 == 1;
    let at = v[4] - v[0];
    let bt = v[5] - v[1];
    let ct = v[6] - v[2];
    let dt = v[7] - v[3];

    let a = at * ct - bt * dt;
    if (odd && !(a > 0.0)) || (!odd && !(a < 0.0)) {
        return None;
    }

    let t = 0.5 * (v[3] * bt + v[1] * dt - v[2] * at - v[0] * ct) / a;
    if !(t > 0.0 && t < 1.0) {
        return None;
    }

    let at = v[0] + at * t;
    let bt = v[1] + bt * t;
    let ct = v[2] + ct * t;
    let dt = v[3] + dt * t;

    if odd {
        (at * ct < bt * dt && (bt < 0.0) == (dt < 0.0)).then_some(bt >= 0.0)
    } else {
        (at * ct > bt * dt && (at < 0.0) == (ct < 0.0)).then_some(at >= 0.0)
    }
}

/// Asymptotic decider: true when the interior joins body diagonal `i`
/// through the sign of corner `i`
pub fn interior_test(i: usize, v: &[f64; 8]) -> bool {
    saddle_sign(i, v) == Some(v[i] >= 0.0)
}

/// How a cell may tunnel through its interior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelRule {
    /// No tunnel is possible
    None,
    /// Body diagonals that may carry a tunnel, as a bit mask over `0..4`
    Diagonal(u8),
    /// Case 13.5: diagonal `i` joins two singleton corners
    Singleton(usize),
}

/// Sign components of a cell once its ambiguous faces are resolved
#[derive(Debug, Clone)]
pub struct CellTopology {
    positive: [bool; 8],
    case: u8,
    inverted: bool,
    ambiguous: u8,
    joined: u8,
    joined_count: u8,
    components: [u8; 8],
}

impl CellTopology {
    /// Topology of cube index `index` with the faces in `joined` resolved
    /// to their fixed diagonal. Bits for faces that are not ambiguous are
    /// ignored.
    pub fn new(index: u8, joined: u8) -> Self {
        let positive: [bool; 8] = std::array::from_fn(|k| index & (1 << k) != 0);
        let complemented = index & 0x80 != 0;
        let entry = CASE_TABLE[(if complemented { index ^ 0xFF } else { index }) as usize];
        let inverted = (entry & 0x80 != 0) != complemented;

        let mut root: [u8; 8] = std::array::from_fn(|k| k as u8);
        fn find(root: &[u8; 8], mut x: usize) -> usize {
            while root[x] as usize != x {
                x = root[x] as usize;
            }
            x
        }
        fn union(root: &mut [u8; 8], a: usize, b: usize) {
            let (ra, rb) = (find(root, a), find(root, b));
            if ra != rb {
                root[ra.max(rb)] = ra.min(rb) as u8;
            }
        }

        for &[a, b] in &EDGES {
            if positive[a] == positive[b] {
                union(&mut root, a, b);
            }
        }

        let ambiguous = FACES
            .iter()
            .enumerate()
            .filter(|(_, cs)| (0..4).all(|k| positive[cs[k]] != positive[cs[(k + 1) % 4]]))
            .fold(0u8, |mask, (f, _)| mask | (1 << f));
        let joined = joined & ambiguous;

        let mut joined_count = 0;
        for f in (0..6).filter(|&f| ambiguous & (1 << f) != 0) {
            let [p, q] = FACE_DIAGONALS[f][if joined & (1 << f) != 0 { 0 } else { 1 }];
            union(&mut root, p, q);
            if positive[p] != inverted {
                joined_count += 1;
            }
        }

        let components = std::array::from_fn(|k| find(&root, k) as u8);

        Self {
            positive,
            case: entry & 0x0F,
            inverted,
            ambiguous,
            joined,
            joined_count,
            components,
        }
    }

    /// MC33 case number, 0 to 14
    pub fn case(&self) -> u8 {
        self.case
    }

    /// True when the case's class corners are the negative ones
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_positive(&self, corner: usize) -> bool {
        self.positive[corner]
    }

    /// Faces with all four edges crossed
    pub fn ambiguous_faces(&self) -> u8 {
        self.ambiguous
    }

    /// Ambiguous faces resolved to their fixed diagonal
    pub fn joined_faces(&self) -> u8 {
        self.joined
    }

    /// Ambiguous faces whose joined diagonal connects class corners
    pub fn joined_count(&self) -> u8 {
        self.joined_count
    }

    /// Component id of a corner, the smallest corner index in its component
    pub fn component(&self, corner: usize) -> u8 {
        self.components[corner]
    }

    /// The joined diagonal of ambiguous face `f`
    pub fn diagonal(&self, f: usize) -> [usize; 2] {
        FACE_DIAGONALS[f][if self.joined & (1 << f) != 0 { 0 } else { 1 }]
    }

    /// True when no other corner shares the component of `corner`
    pub fn is_singleton(&self, corner: usize) -> bool {
        let c = self.components[corner];
        self.components.iter().filter(|&&x| x == c).count() == 1
    }

    pub fn tunnel_rule(&self) -> TunnelRule {
        let nj = self.joined_count;
        let diagonal = match self.case {
            4 => true,
            6 => nj == 0,
            7 => nj == 3,
            10 | 12 => nj != 1,
            _ => false,
        };

        if diagonal {
            let candidates = (0..4)
                .filter(|&i| {
                    let j = BODY_DIAGONALS[i];
                    self.positive[i] == self.positive[j] && self.components[i] != self.components[j]
                })
                .fold(0u8, |mask, i| mask | (1 << i));
            return TunnelRule::Diagonal(candidates);
        }

        if self.case == 13 && nj == 3 {
            if let Some(i) =
                (0..4).find(|&i| self.is_singleton(i) && self.is_singleton(BODY_DIAGONALS[i]))
            {
                return TunnelRule::Singleton(i);
            }
        }

        TunnelRule::None
    }

    /// Sub-case of this topology given whether a tunnel is present
    pub fn sub_case(&self, tunnel: bool) -> SubCase {
        use SubCase::*;
        let nj = self.joined_count;
        match self.case {
            0 => Case0,
            1 => Case1,
            2 => Case2,
            3 if nj == 0 => Case3_1,
            3 => Case3_2,
            4 if tunnel => Case4_1_2,
            4 => Case4_1_1,
            5 => Case5,
            6 if nj > 0 => Case6_2,
            6 if tunnel => Case6_1_2,
            6 => Case6_1_1,
            7 => match nj {
                0 => Case7_1,
                1 => Case7_2,
                2 => Case7_3,
                _ if tunnel => Case7_4_2,
                _ => Case7_4_1,
            },
            8 => Case8,
            9 => Case9,
            10 if nj == 1 => Case10_2,
            10 if tunnel => Case10_1_2,
            10 => Case10_1_1,
            11 => Case11,
            12 if nj == 1 => Case12_2,
            12 if tunnel => Case12_1_2,
            12 => Case12_1_1,
            13 => match nj {
                0 | 6 => Case13_1,
                1 | 5 => Case13_2,
                2 | 4 => Case13_3,
                _ => match self.tunnel_rule() {
                    TunnelRule::Singleton(_) if tunnel => Case13_5_2,
                    TunnelRule::Singleton(_) => Case13_5_1,
                    _ => Case13_4,
                },
            },
            _ => Case14,
        }
    }
}

/// Every MC33 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubCase {
    Case0,
    Case1,
    Case2,
    Case3_1,
    Case3_2,
    Case4_1_1,
    Case4_1_2,
    Case5,
    Case6_1_1,
    Case6_1_2,
    Case6_2,
    Case7_1,
    Case7_2,
    Case7_3,
    Case7_4_1,
    Case7_4_2,
    Case8,
    Case9,
    Case10_1_1,
    Case10_1_2,
    Case10_2,
    Case11,
    Case12_1_1,
    Case12_1_2,
    Case12_2,
    Case13_1,
    Case13_2,
    Case13_3,
    Case13_4,
    Case13_5_1,
    Case13_5_2,
    Case14,
}

impl SubCase {
    /// Dotted MC33 name, e.g. `"13.5.2"`
    pub fn label(&self) -> &'static str {
        use SubCase::*;
        match self {
            Case0 => "0",
            Case1 => "1",
            Case2 => "2",
            Case3_1 => "3.1",
            Case3_2 => "3.2",
            Case4_1_1 => "4.1.1",
            Case4_1_2 => "4.1.2",
            Case5 => "5",
            Case6_1_1 => "6.1.1",
            Case6_1_2 => "6.1.2",
            Case6_2 => "6.2",
            Case7_1 => "7.1",
            Case7_2 => "7.2",
            Case7_3 => "7.3",
            Case7_4_1 => "7.4.1",
            Case7_4_2 => "7.4.2",
            Case8 => "8",
            Case9 => "9",
            Case10_1_1 => "10.1.1",
            Case10_1_2 => "10.1.2",
            Case10_2 => "10.2",
            Case11 => "11",
            Case12_1_1 => "12.1.1",
            Case12_1_2 => "12.1.2",
            Case12_2 => "12.2",
            Case13_1 => "13.1",
            Case13_2 => "13.2",
            Case13_3 => "13.3",
            Case13_4 => "13.4",
            Case13_5_1 => "13.5.1",
            Case13_5_2 => "13.5.2",
            Case14 => "14",
        }
    }

    /// Number of triangles MC33 emits for this configuration
    pub fn triangle_count(&self) -> usize {
        use SubCase::*;
        match self {
            Case0 => 0,
            Case1 => 1,
            Case2 | Case3_1 | Case4_1_1 | Case8 => 2,
            Case5 | Case6_1_1 | Case7_1 => 3,
            Case3_2 | Case9 | Case10_1_1 | Case11 | Case12_1_1 | Case13_1 | Case14 => 4,
            Case6_2 | Case7_2 | Case7_4_1 => 5,
            Case4_1_2 | Case13_2 | Case13_5_1 => 6,
            Case6_1_2 => 7,
            Case10_1_2 | Case10_2 | Case12_1_2 | Case12_2 => 8,
            Case7_3 | Case7_4_2 => 9,
            Case13_3 | Case13_5_2 => 10,
            Case13_4 => 12,
        }
    }
}

impl fmt::Display for SubCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one triangulation pattern.
///
/// Patterns are stored for canonical indices only (bit 7 clear); the
/// complement of a canonical cell has the same topology with every sign
/// flipped, which only changes the triangle winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    pub canonical: u8,
    pub joined: u8,
    pub tunnel: Option<u8>,
}

/// Classification of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Cube index, bit `k` set when corner `k` is non-negative
    pub index: u8,
    /// Bit 7 of the index was set and the canonical index is its complement
    pub complemented: bool,
    pub case: u8,
    pub sub_case: SubCase,
    /// Ambiguous faces resolved to their fixed diagonal
    pub joined: u8,
    /// Corner whose body diagonal carries a tunnel
    pub tunnel: Option<u8>,
}

impl Classification {
    pub fn canonical(&self) -> u8 {
        if self.complemented {
            self.index ^ 0xFF
        } else {
            self.index
        }
    }

    pub fn key(&self) -> PatternKey {
        PatternKey {
            canonical: self.canonical(),
            joined: self.joined,
            tunnel: self.tunnel,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.case == 0
    }
}

/// Classify a cell from its signed corner values `iso - F`
pub fn classify(v: &[f64; 8]) -> Classification {
    let index = cube_index(v);
    let unresolved = CellTopology::new(index, 0);
    let mask = (0..6)
        .filter(|&f| unresolved.ambiguous_faces() & (1 << f) != 0 && face_test(f, v))
        .fold(0u8, |mask, f| mask | (1 << f));
    let topology = CellTopology::new(index, mask);

    let tunnel = match topology.tunnel_rule() {
        TunnelRule::None => None,
        TunnelRule::Diagonal(candidates) => (0..4)
            .filter(|&i| candidates & (1 << i) != 0)
            .find(|&i| saddle_sign(i, v) == Some(topology.is_positive(i)))
            .map(|i| i as u8),
        TunnelRule::Singleton(i) => saddle_sign(i, v).map(|sign| {
            if sign == topology.is_positive(i) {
                i as u8
            } else {
                BODY_DIAGONALS[i] as u8
            }
        }),
    };

    Classification {
        index,
        complemented: index & 0x80 != 0,
        case: topology.case(),
        sub_case: topology.sub_case(tunnel.is_some()),
        joined: topology.joined_faces(),
        tunnel,
    }
}
