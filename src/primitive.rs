//! Primitive groups and triangle reconstruction

use crate::Triangle;

/// Topology of a [PrimitiveGroup].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Independent triangles, 3 indices each
    List,
    /// Triangle strip; odd triangles have their first two vertices swapped
    Strip,
    /// Triangle fan around the first index
    Fan,
}

/// A draw-ready index sequence tagged with its topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveGroup {
    pub kind: PrimitiveType,
    pub indices: Vec<u32>,
    /// Primitive restart index used inside a stitched strip, if any
    pub restart_index: Option<u32>,
}

impl PrimitiveGroup {
    pub fn list(indices: Vec<u32>) -> Self {
        assert!(indices.len() % 3 == 0);

        Self {
            kind: PrimitiveType::List,
            indices,
            restart_index: None,
        }
    }

    pub fn strip(indices: Vec<u32>) -> Self {
        Self {
            kind: PrimitiveType::Strip,
            indices,
            restart_index: None,
        }
    }

    pub fn fan(indices: Vec<u32>) -> Self {
        Self {
            kind: PrimitiveType::Fan,
            indices,
            restart_index: None,
        }
    }

    /// Returns the number of indices in the group.
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the number of non-degenerate triangles drawn by the group (every triangle for lists).
    pub fn triangle_count(&self) -> usize {
        match self.kind {
            PrimitiveType::List => self.indices.len() / 3,
            _ => self.triangles().len(),
        }
    }

    /// Reconstructs the triangles drawn by the group with their original winding.
    ///
    /// Strip and fan triangles with a repeated vertex are skipped; list triangles are returned verbatim.
    pub fn triangles(&self) -> Vec<Triangle> {
        match self.kind {
            PrimitiveType::List => self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
            PrimitiveType::Strip => {
                let mut list = vec![0; unstripify_bound(self.indices.len())];
                let size = unstripify(&mut list, &self.indices, self.restart_index);
                list.truncate(size);
                list.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect()
            }
            PrimitiveType::Fan => match self.indices.split_first() {
                Some((hub, rim)) => rim
                    .windows(2)
                    .map(|w| [*hub, w[0], w[1]])
                    .filter(|t| !crate::adjacency::is_degenerate(t))
                    .collect(),
                None => Vec::new(),
            },
        }
    }
}

/// Rotates a triangle so that its smallest index comes first, keeping the winding.
pub fn canonical_triangle(triangle: Triangle) -> Triangle {
    let [a, b, c] = triangle;

    if a <= b && a <= c {
        [a, b, c]
    } else if b <= a && b <= c {
        [b, c, a]
    } else {
        [c, a, b]
    }
}

/// Converts a triangle strip to a triangle list.
///
/// Returns the number of indices in the resulting list, with destination containing new index data.
///
/// # Arguments
///
/// * `destination`: must contain enough space for the target index buffer, worst case can be computed with [unstripify_bound]
/// * `restart_index`: primitive restart index separating strips, if the strip uses one
pub fn unstripify(destination: &mut [u32], indices: &[u32], restart_index: Option<u32>) -> usize {
    let mut offset = 0;
    let mut start = 0;

    for (i, index) in indices.iter().enumerate() {
        if restart_index == Some(*index) {
            start = i + 1;
        } else if i - start >= 2 {
            let mut a = indices[i - 2];
            let mut b = indices[i - 1];
            let c = indices[i];

            // flip winding for odd triangles
            if ((i - start) & 1) != 0 {
                std::mem::swap(&mut a, &mut b);
            }

            // stitching produces degenerate triangles, so skip them
            if a != b && a != c && b != c {
                destination[offset..offset + 3].copy_from_slice(&[a, b, c]);
                offset += 3;
            }
        }
    }

    offset
}

/// Returns worst case size requirement for [unstripify].
pub fn unstripify_bound(index_count: usize) -> usize {
    if index_count < 3 {
        0
    } else {
        (index_count - 2) * 3
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unstripify_winding() {
        let strip = [0, 1, 2, 3, 4];
        let mut list = vec![0; unstripify_bound(strip.len())];
        let size = unstripify(&mut list, &strip, None);

        assert_eq!(&list[..size], &[0, 1, 2, 2, 1, 3, 2, 3, 4]);
    }

    #[test]
    fn test_unstripify_skips_degenerate() {
        let strip = [0, 1, 2, 2, 5, 5, 7, 6];
        let mut list = vec![0; unstripify_bound(strip.len())];
        let size = unstripify(&mut list, &strip, None);

        assert_eq!(&list[..size], &[0, 1, 2, 7, 5, 6]);
    }

    #[test]
    fn test_unstripify_restart() {
        let strip = [0, 1, 2, 3, u32::MAX, 4, 5, 6];
        let mut list = vec![0; unstripify_bound(strip.len())];
        let size = unstripify(&mut list, &strip, Some(u32::MAX));

        assert_eq!(&list[..size], &[0, 1, 2, 2, 1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unstripify_bound() {
        assert_eq!(unstripify_bound(0), 0);
        assert_eq!(unstripify_bound(2), 0);
        assert_eq!(unstripify_bound(5), 9);
    }

    #[test]
    fn test_group_triangles() {
        let list = PrimitiveGroup::list(vec![0, 1, 2, 3, 3, 4]);
        assert_eq!(list.triangles(), vec![[0, 1, 2], [3, 3, 4]]);
        assert_eq!(list.triangle_count(), 2);
        assert_eq!(list.count(), 6);

        let strip = PrimitiveGroup::strip(vec![0, 1, 2, 3]);
        assert_eq!(strip.triangles(), vec![[0, 1, 2], [2, 1, 3]]);
        assert_eq!(strip.kind, PrimitiveType::Strip);

        let fan = PrimitiveGroup::fan(vec![0, 1, 2, 3, 4]);
        assert_eq!(fan.triangles(), vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
        assert_eq!(fan.triangle_count(), 3);

        assert!(PrimitiveGroup::fan(Vec::new()).triangles().is_empty());
    }

    #[test]
    fn test_canonical_triangle() {
        assert_eq!(canonical_triangle([4, 2, 7]), [2, 7, 4]);
        assert_eq!(canonical_triangle([7, 4, 2]), [2, 7, 4]);
        assert_eq!(canonical_triangle([2, 7, 4]), [2, 7, 4]);
        assert_ne!(canonical_triangle([2, 4, 7]), canonical_triangle([2, 7, 4]));
    }
}
