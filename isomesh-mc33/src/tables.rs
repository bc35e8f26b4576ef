//! Cube geometry and the case table
//!
//! Corner `k` of a cell sits at `CORNERS[k]` relative to the cell's minimum
//! grid point. Bit `k` of a cube index is set when corner `k` is on the
//! non-negative side of the isovalue.

/// Corner offsets `(x, y, z)`
pub const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [0, 1, 0],
    [0, 1, 1],
    [0, 0, 1],
    [1, 0, 0],
    [1, 1, 0],
    [1, 1, 1],
    [1, 0, 1],
];

/// Edge endpoints, lower grid point first
pub const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [3, 2],
    [0, 3],
    [4, 5],
    [5, 6],
    [7, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Edge id of the cell-centre vertex
pub const CENTER: u8 = 12;

/// Face corners, counter-clockwise seen from outside the cell
pub const FACES: [[usize; 4]; 6] = [
    [0, 1, 5, 4], // z0
    [1, 2, 6, 5], // y1
    [3, 7, 6, 2], // z1
    [0, 4, 7, 3], // y0
    [0, 3, 2, 1], // x0
    [4, 5, 6, 7], // x1
];

/// Per face: the fixed diagonal and the other diagonal.
///
/// Neighbouring cells share the fixed diagonal's two grid points, so the face
/// test gives the same answer from both sides.
pub const FACE_DIAGONALS: [[[usize; 2]; 2]; 6] = [
    [[0, 5], [1, 4]],
    [[1, 6], [2, 5]],
    [[3, 6], [2, 7]],
    [[0, 7], [3, 4]],
    [[0, 2], [1, 3]],
    [[4, 6], [5, 7]],
];

/// Opposite corner of body diagonal `i` for `i` in `0..4`
pub const BODY_DIAGONALS: [usize; 4] = [6, 7, 4, 5];

/// Positive corners of each case's class representative
pub const REPRESENTATIVES: [&[usize]; 15] = [
    &[],
    &[0],
    &[0, 1],
    &[0, 2],
    &[0, 6],
    &[0, 1, 4],
    &[0, 1, 7],
    &[1, 3, 4],
    &[0, 1, 2, 3],
    &[0, 1, 3, 4],
    &[0, 2, 4, 6],
    &[0, 1, 2, 4],
    &[0, 1, 2, 7],
    &[0, 2, 5, 7],
    &[0, 2, 3, 4],
];

/// Case of every cube index with bit 7 clear.
///
/// The low nibble is the case number. `0x80` marks indices whose negative
/// corners (rather than positive ones) match the case representative.
/// Indices with bit 7 set are looked up through their complement.
#[rustfmt::skip]
pub const CASE_TABLE: [u8; 128] = [
    0x00, 0x01, 0x01, 0x02, 0x01, 0x03, 0x02, 0x05, 0x01, 0x02, 0x03, 0x05, 0x02, 0x05, 0x05, 0x08,
    0x01, 0x02, 0x03, 0x05, 0x04, 0x06, 0x06, 0x0B, 0x03, 0x05, 0x07, 0x09, 0x06, 0x0E, 0x0C, 0x85,
    0x01, 0x03, 0x02, 0x05, 0x03, 0x07, 0x05, 0x09, 0x04, 0x06, 0x06, 0x0E, 0x06, 0x0C, 0x0B, 0x85,
    0x02, 0x05, 0x05, 0x08, 0x06, 0x0C, 0x0E, 0x85, 0x06, 0x0B, 0x0C, 0x85, 0x0A, 0x86, 0x86, 0x82,
    0x01, 0x04, 0x03, 0x06, 0x02, 0x06, 0x05, 0x0E, 0x03, 0x06, 0x07, 0x0C, 0x05, 0x0B, 0x09, 0x85,
    0x03, 0x06, 0x07, 0x0C, 0x06, 0x0A, 0x0C, 0x86, 0x07, 0x0C, 0x0D, 0x87, 0x0C, 0x86, 0x87, 0x83,
    0x02, 0x06, 0x05, 0x0B, 0x05, 0x0C, 0x08, 0x85, 0x06, 0x0A, 0x0C, 0x86, 0x0E, 0x86, 0x85, 0x82,
    0x05, 0x0E, 0x09, 0x85, 0x0B, 0x86, 0x85, 0x82, 0x0C, 0x86, 0x87, 0x83, 0x86, 0x84, 0x83, 0x81,
];

/// Edge joining corners `a` and `b`, in either order
pub fn edge_between(a: usize, b: usize) -> Option<u8> {
    EDGES
        .iter()
        .position(|&[p, q]| (p == a && q == b) || (p == b && q == a))
        .map(|e| e as u8)
}

/// Bit mask of the faces containing edge `e`
pub fn edge_faces(e: u8) -> u8 {
    let [a, b] = EDGES[e as usize];
    FACES
        .iter()
        .enumerate()
        .filter(|(_, corners)| corners.contains(&a) && corners.contains(&b))
        .fold(0, |mask, (f, _)| mask | (1 << f))
}

/// Axis (0 = x, 1 = y, 2 = z) that edge `e` runs along
pub fn edge_axis(e: u8) -> usize {
    let [a, b] = EDGES[e as usize];
    (0..3)
        .find(|&d| CORNERS[a][d] != CORNERS[b][d])
        .unwrap_or_else(|| unreachable!("edge {} has coincident endpoints", e))
}

/// Axis that face `f` is perpendicular to
pub fn face_axis(f: usize) -> usize {
    let [c0, c1, c2, _] = FACES[f];
    (0..3)
        .find(|&d| CORNERS[c0][d] == CORNERS[c1][d] && CORNERS[c1][d] == CORNERS[c2][d])
        .unwrap_or_else(|| unreachable!("face {} is not axis aligned", f))
}

/// True for the x1, y1 and z1 faces, which the next cell along the axis sees as its lower face
pub fn is_upper_face(f: usize) -> bool {
    CORNERS[FACES[f][0]][face_axis(f)] == 1
}

/// Index of the corner at offset `c`
fn corner_at(c: [usize; 3]) -> usize {
    CORNERS
        .iter()
        .position(|&k| k == c)
        .unwrap_or_else(|| unreachable!("not a unit cube corner: {:?}", c))
}

/// The 24 proper rotations of the cube as corner permutations.
///
/// Entry `r[k]` is where corner `k` lands under rotation `r`. The identity
/// comes first.
pub fn cube_rotations() -> Vec<[usize; 8]> {
    let rot_x = |[x, y, z]: [usize; 3]| [x, 1 - z, y];
    let rot_z = |[x, y, z]: [usize; 3]| [1 - y, x, z];
    let generators: Vec<[usize; 8]> = vec![
        std::array::from_fn(|k| corner_at(rot_x(CORNERS[k]))),
        std::array::from_fn(|k| corner_at(rot_z(CORNERS[k]))),
    ];

    let identity: [usize; 8] = std::array::from_fn(|k| k);
    let mut group = vec![identity];
    let mut frontier = vec![identity];
    while let Some(g) = frontier.pop() {
        for h in &generators {
            let next: [usize; 8] = std::array::from_fn(|k| h[g[k]]);
            if !group.contains(&next) {
                group.push(next);
                frontier.push(next);
            }
        }
    }
    group
}

/// Apply a corner permutation to a cube index
pub fn rotate_index(rotation: &[usize; 8], index: u8) -> u8 {
    (0..8)
        .filter(|&k| index & (1 << k) != 0)
        .fold(0, |acc, k| acc | (1 << rotation[k]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bits(corners: &[usize]) -> u8 {
        corners.iter().fold(0, |acc, &k| acc | (1 << k))
    }

    #[test]
    fn test_rotation_group() {
        let rotations = cube_rotations();
        assert_eq!(rotations.len(), 24);

        let distinct: HashSet<_> = rotations.iter().collect();
        assert_eq!(distinct.len(), 24);

        // rotations keep edges as edges
        for r in &rotations {
            for &[a, b] in &EDGES {
                assert!(edge_between(r[a], r[b]).is_some());
            }
        }
    }

    #[test]
    fn test_case_table_matches_rotation_classes() {
        let rotations = cube_rotations();
        let orbit = |index: u8| -> HashSet<u8> {
            rotations
                .iter()
                .map(|r| rotate_index(r, index))
                .collect()
        };

        for index in 0u8..128 {
            let direct = REPRESENTATIVES
                .iter()
                .position(|rep| orbit(bits(rep)).contains(&index));
            let complement = REPRESENTATIVES
                .iter()
                .position(|rep| orbit(bits(rep)).contains(&(index ^ 0xFF)));

            let expected = match (direct, complement) {
                (Some(case), _) => case as u8,
                (None, Some(case)) => case as u8 | 0x80,
                (None, None) => panic!("index {:#04x} has no class", index),
            };
            assert_eq!(CASE_TABLE[index as usize], expected, "index {:#04x}", index);
        }
    }

    #[test]
    fn test_edges_run_along_one_axis() {
        for &[a, b] in &EDGES {
            let delta: Vec<usize> = (0..3).map(|d| CORNERS[b][d] - CORNERS[a][d]).collect();
            assert_eq!(delta.iter().sum::<usize>(), 1);
        }
    }

    #[test]
    fn test_faces_and_diagonals_are_consistent() {
        for (f, corners) in FACES.iter().enumerate() {
            for k in 0..4 {
                let e = edge_between(corners[k], corners[(k + 1) % 4]).unwrap();
                assert_ne!(edge_faces(e) & (1 << f), 0);
            }
            for diagonal in &FACE_DIAGONALS[f] {
                assert!(corners.contains(&diagonal[0]) && corners.contains(&diagonal[1]));
                assert!(edge_between(diagonal[0], diagonal[1]).is_none());
            }
        }
        for e in 0..12 {
            assert_eq!(edge_faces(e).count_ones(), 2);
        }
    }

    #[test]
    fn test_face_axes() {
        assert_eq!(
            (0..6).map(face_axis).collect::<Vec<_>>(),
            vec![2, 1, 2, 1, 0, 0]
        );
        assert_eq!(
            (0..6).filter(|&f| is_upper_face(f)).collect::<Vec<_>>(),
            vec![1, 2, 5]
        );
        assert_eq!(edge_axis(0), 1);
        assert_eq!(edge_axis(3), 2);
        assert_eq!(edge_axis(8), 0);
    }

    #[test]
    fn test_body_diagonals_are_opposite() {
        for (i, &j) in BODY_DIAGONALS.iter().enumerate() {
            for d in 0..3 {
                assert_ne!(CORNERS[i][d], CORNERS[j][d]);
            }
        }
    }
}
