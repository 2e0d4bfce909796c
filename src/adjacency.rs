//! Triangle adjacency graph construction

use crate::config::NonManifoldPolicy;
use crate::error::{Diagnostic, Result, StripError};
use crate::hash::{BuildNoopHasher, EdgeKey};
use crate::{Triangle, INVALID_INDEX};

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

/// Classification of an input triangle, decided once while building the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriangleKind {
    Manifold,
    /// Repeats a vertex; never connected to anything.
    Degenerate,
}

/// Returns `true` if the triangle has zero area by index (a repeated vertex).
#[inline]
pub fn is_degenerate(triangle: &Triangle) -> bool {
    triangle[0] == triangle[1] || triangle[1] == triangle[2] || triangle[2] == triangle[0]
}

struct EdgeSlot {
    first: (u32, u8),
    second: Option<(u32, u8)>,
}

/// Undirected graph over the input triangles.
///
/// `neighbours[t][e]` is the triangle across edge `e` of triangle `t`, where edge `e` runs from vertex `e` to vertex
/// `(e + 1) % 3`, or [INVALID_INDEX]. Two triangles are connected only if they share exactly one edge and traverse
/// it in opposite directions.
pub struct AdjacencyGraph {
    triangles: Vec<Triangle>,
    kinds: Vec<TriangleKind>,
    neighbours: Vec<[u32; 3]>,
    diagnostics: Vec<Diagnostic>,
}

/// Connected components of an [AdjacencyGraph].
pub struct Components {
    /// Triangle indices of each component in ascending order; components are ordered by their first triangle.
    pub lists: Vec<Vec<u32>>,
    /// Position of every triangle inside its component list ([INVALID_INDEX] for degenerate triangles).
    pub slots: Vec<u32>,
}

impl AdjacencyGraph {
    /// Builds the graph from a triangle list.
    ///
    /// # Arguments
    ///
    /// * `indices`: triangle list, length must be a multiple of 3 ([StripError::InvalidInput] otherwise)
    /// * `policy`: what to do with edges shared by more than two triangles
    pub fn build(indices: &[u32], policy: NonManifoldPolicy) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(StripError::InvalidInput(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let triangles: Vec<Triangle> = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        let face_count = triangles.len();

        let mut kinds = vec![TriangleKind::Manifold; face_count];
        let mut neighbours = vec![[INVALID_INDEX; 3]; face_count];
        let mut diagnostics = Vec::new();

        let mut edges: HashMap<EdgeKey, EdgeSlot, BuildNoopHasher> =
            HashMap::with_capacity_and_hasher(face_count * 3 / 2 + 1, BuildNoopHasher::default());

        for (i, abc) in triangles.iter().enumerate() {
            let i = i as u32;

            if is_degenerate(abc) {
                kinds[i as usize] = TriangleKind::Degenerate;
                diagnostics.push(Diagnostic::DegenerateTriangle { triangle: i });
                continue;
            }

            for e in 0..3 {
                let a = abc[e];
                let b = abc[(e + 1) % 3];
                let key = EdgeKey::new(a, b);

                let slot = match edges.entry(key) {
                    Entry::Vacant(entry) => {
                        entry.insert(EdgeSlot {
                            first: (i, e as u8),
                            second: None,
                        });
                        continue;
                    }
                    Entry::Occupied(entry) => entry.into_mut(),
                };

                match slot.second {
                    None => {
                        slot.second = Some((i, e as u8));

                        // connect only if the other triangle walks the edge the opposite way
                        let (j, f) = slot.first;
                        let other = &triangles[j as usize];

                        if other[f as usize] == b && other[(f as usize + 1) % 3] == a {
                            neighbours[i as usize][e] = j;
                            neighbours[j as usize][f as usize] = i;
                        }
                    }
                    Some((second, _)) => {
                        debug!(edge = ?(key.0, key.1), triangle = i, "non-manifold edge");

                        if policy == NonManifoldPolicy::Reject {
                            return Err(StripError::NonManifoldGeometry {
                                edge: (key.0, key.1),
                                triangles: vec![slot.first.0, second, i],
                            });
                        }

                        diagnostics.push(Diagnostic::NonManifoldEdge {
                            edge: (key.0, key.1),
                            triangle: i,
                        });
                    }
                }
            }
        }

        // triangles that share more than one edge (e.g. back-to-back duplicates) are not strip neighbours
        for t in 0..face_count {
            for e in 0..3 {
                let n = neighbours[t][e];

                if n != INVALID_INDEX && neighbours[t].iter().filter(|m| **m == n).count() > 1 {
                    for m in neighbours[t].iter_mut().filter(|m| **m == n) {
                        *m = INVALID_INDEX;
                    }
                    for m in neighbours[n as usize].iter_mut().filter(|m| **m == t as u32) {
                        *m = INVALID_INDEX;
                    }
                }
            }
        }

        let non_manifold = diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::NonManifoldEdge { .. }))
            .count();

        if non_manifold > 0 {
            warn!(
                edges = non_manifold,
                "mesh has non-manifold edges; only the first two triangles on each are treated as adjacent"
            );
        }

        Ok(Self {
            triangles,
            kinds,
            neighbours,
            diagnostics,
        })
    }

    /// Returns the number of triangles (graph nodes).
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle(&self, t: u32) -> Triangle {
        self.triangles[t as usize]
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn kind(&self, t: u32) -> TriangleKind {
        self.kinds[t as usize]
    }

    pub fn neighbours(&self, t: u32) -> [u32; 3] {
        self.neighbours[t as usize]
    }

    /// Returns the number of triangles adjacent to `t`.
    pub fn degree(&self, t: u32) -> u32 {
        self.neighbours[t as usize].iter().filter(|n| **n != INVALID_INDEX).count() as u32
    }

    /// Returns the edge slot of `t` joining vertices `a` and `b` in either direction.
    pub fn edge_slot(&self, t: u32, a: u32, b: u32) -> Option<usize> {
        let abc = &self.triangles[t as usize];

        (0..3).find(|e| {
            let (x, y) = (abc[*e], abc[(*e + 1) % 3]);
            (x == a && y == b) || (x == b && y == a)
        })
    }

    /// Returns the triangle adjacent to `t` across the edge joining `a` and `b`.
    pub fn neighbour_across(&self, t: u32, a: u32, b: u32) -> Option<u32> {
        self.edge_slot(t, a, b)
            .map(|e| self.neighbours[t as usize][e])
            .filter(|n| *n != INVALID_INDEX)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Splits the non-degenerate triangles into connected components.
    pub fn components(&self) -> Components {
        let face_count = self.len();

        let mut slots = vec![INVALID_INDEX; face_count];
        let mut labelled = vec![false; face_count];
        let mut lists = Vec::new();
        let mut stack = Vec::new();

        for start in 0..face_count {
            if labelled[start] || self.kinds[start] == TriangleKind::Degenerate {
                continue;
            }

            let mut list = Vec::new();

            labelled[start] = true;
            stack.push(start as u32);

            while let Some(t) = stack.pop() {
                list.push(t);

                for n in self.neighbours[t as usize] {
                    if n != INVALID_INDEX && !labelled[n as usize] {
                        labelled[n as usize] = true;
                        stack.push(n);
                    }
                }
            }

            list.sort_unstable();

            for (slot, t) in list.iter().enumerate() {
                slots[*t as usize] = slot as u32;
            }

            lists.push(list);
        }

        Components { lists, slots }
    }
}
