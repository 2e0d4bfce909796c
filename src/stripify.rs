//! Mesh triangle list ↔ triangle strip conversion

use crate::adjacency::{AdjacencyGraph, TriangleKind};
use crate::cache::VertexCache;
use crate::config::StripConfig;
use crate::error::{Diagnostic, Result, StripError};
use crate::primitive::{PrimitiveGroup, PrimitiveType};
use crate::stitch::stitch;
use crate::{Triangle, INVALID_INDEX};

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, trace};

/// Number of triangles walked when comparing the possible directions of a strip seed.
const LOOKAHEAD_MAX: usize = 32;

/// A strip grown from one seed triangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrownStrip {
    pub indices: Vec<u32>,
    /// Input triangles consumed by the strip, in strip order
    pub triangles: Vec<u32>,
}

impl GrownStrip {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

struct Walk {
    indices: Vec<u32>,
    triangles: Vec<u32>,
    hits: u32,
}

/// Grows strips over a single connected component.
///
/// All per-triangle state is indexed by the triangle's slot inside the component, so independent components never
/// share mutable state.
struct Grower<'a> {
    graph: &'a AdjacencyGraph,
    slots: &'a [u32],
    visited: Vec<bool>,
    degree: Vec<u32>,
    /// Walk generation that last touched each triangle
    stamp: Vec<u32>,
    generation: u32,
    cache: VertexCache,
}

impl<'a> Grower<'a> {
    fn new(graph: &'a AdjacencyGraph, component: &[u32], slots: &'a [u32], cache_size: usize) -> Self {
        Self {
            graph,
            slots,
            visited: vec![false; component.len()],
            degree: component.iter().map(|t| graph.degree(*t)).collect(),
            stamp: vec![0; component.len()],
            generation: 0,
            cache: VertexCache::new(cache_size),
        }
    }

    #[inline]
    fn slot(&self, t: u32) -> usize {
        self.slots[t as usize] as usize
    }

    fn is_free(&self, t: u32) -> bool {
        t != INVALID_INDEX && !self.visited[self.slot(t)]
    }

    /// Walks forward from `seed` rotated by `rotation` until no unvisited neighbour continues the strip.
    fn walk(&mut self, seed: u32, rotation: usize, limit: Option<usize>) -> Walk {
        self.generation += 1;
        self.cache.reset();

        let abc = self.graph.triangle(seed);
        let mut indices = vec![abc[rotation], abc[(rotation + 1) % 3], abc[(rotation + 2) % 3]];
        let mut triangles = vec![seed];
        let mut hits = 0;

        for index in &indices {
            self.cache.reference(*index);
        }

        let seed_slot = self.slot(seed);
        self.stamp[seed_slot] = self.generation;

        let mut current = seed;

        while limit.map_or(true, |l| triangles.len() < l) {
            let n = indices.len();
            let (x, y) = (indices[n - 2], indices[n - 1]);

            // the next triangle has to reuse the last two strip vertices; winding is consistent by construction
            let next = match self.graph.neighbour_across(current, x, y) {
                Some(next) if self.is_free(next) && self.stamp[self.slot(next)] != self.generation => next,
                _ => break,
            };

            let Some(v) = self.graph.triangle(next).into_iter().find(|v| *v != x && *v != y) else {
                break;
            };

            if self.cache.reference(v).is_hit() {
                hits += 1;
            }

            indices.push(v);
            triangles.push(next);

            let next_slot = self.slot(next);
            self.stamp[next_slot] = self.generation;
            current = next;
        }

        Walk {
            indices,
            triangles,
            hits,
        }
    }

    /// Picks the seed rotation whose strip runs longest, then the one with more cache hits, then the lowest rotation.
    fn best_rotation(&mut self, seed: u32) -> usize {
        let neighbours = self.graph.neighbours(seed);

        let mut best = None;

        for rotation in 0..3 {
            // rotation r leaves edge (r + 1) as the outgoing strip edge
            if !self.is_free(neighbours[(rotation + 1) % 3]) {
                continue;
            }

            let walk = self.walk(seed, rotation, Some(LOOKAHEAD_MAX));
            let score = (walk.triangles.len(), walk.hits);

            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, rotation));
            }
        }

        best.map_or(0, |(_, rotation)| rotation)
    }

    fn consume(&mut self, t: u32, heap: &mut BinaryHeap<Reverse<(u32, u32)>>) {
        let slot = self.slot(t);
        self.visited[slot] = true;

        for n in self.graph.neighbours(t) {
            if self.is_free(n) {
                let n_slot = self.slot(n);
                self.degree[n_slot] -= 1;
                heap.push(Reverse((self.degree[n_slot], n)));
            }
        }
    }

    fn grow(mut self, component: &[u32]) -> Vec<GrownStrip> {
        // seeds: fewest unvisited neighbours first, then input order
        let mut heap: BinaryHeap<Reverse<(u32, u32)>> = component
            .iter()
            .enumerate()
            .map(|(slot, t)| Reverse((self.degree[slot], *t)))
            .collect();

        let mut strips = Vec::new();

        while let Some(Reverse((degree, seed))) = heap.pop() {
            let slot = self.slot(seed);

            // skip stale heap entries
            if self.visited[slot] || self.degree[slot] != degree {
                continue;
            }

            let rotation = self.best_rotation(seed);
            let walk = self.walk(seed, rotation, None);

            for t in &walk.triangles {
                self.consume(*t, &mut heap);
            }

            trace!(seed, triangles = walk.triangles.len(), hits = walk.hits, "grew strip");

            strips.push(GrownStrip {
                indices: walk.indices,
                triangles: walk.triangles,
            });
        }

        strips
    }
}

/// Grows triangle strips over every connected component of `graph`.
///
/// Components are processed independently (in parallel with the `parallel` feature) and their strips are returned
/// in component order, so the result does not depend on scheduling.
pub fn grow_strips(graph: &AdjacencyGraph, cache_size: usize) -> Vec<GrownStrip> {
    let components = graph.components();

    let grow_component = |component: &Vec<u32>| {
        Grower::new(graph, component, &components.slots, cache_size).grow(component)
    };

    #[cfg(feature = "parallel")]
    let per_component: Vec<Vec<GrownStrip>> = {
        use rayon::prelude::*;
        components.lists.par_iter().map(grow_component).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let per_component: Vec<Vec<GrownStrip>> = components.lists.iter().map(grow_component).collect();

    per_component.into_iter().flatten().collect()
}

/// Result of a [stripify] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stripification {
    pub groups: Vec<PrimitiveGroup>,
    /// Recoverable problems found in the input
    pub diagnostics: Vec<Diagnostic>,
}

impl Stripification {
    /// Returns the total number of indices over all groups.
    pub fn index_count(&self) -> usize {
        self.groups.iter().map(|g| g.count()).sum()
    }

    /// Returns the number of strip groups.
    pub fn strip_count(&self) -> usize {
        self.groups.iter().filter(|g| g.kind == PrimitiveType::Strip).count()
    }

    /// Reconstructs every drawn triangle, in group order.
    pub fn triangles(&self) -> Vec<Triangle> {
        self.groups.iter().flat_map(|g| g.triangles()).collect()
    }
}

fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(StripError::InvalidInput(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }

    if let Some((i, index)) = indices.iter().enumerate().find(|(_, v)| **v as usize >= vertex_count) {
        return Err(StripError::InvalidInput(format!(
            "index {index} at position {i} is out of range for {vertex_count} vertices"
        )));
    }

    Ok(())
}

fn validate_restart_index(restart_index: Option<u32>, vertex_count: usize) -> Result<()> {
    match restart_index {
        // every index is below vertex_count at this point, so this also rules out collisions with the input
        Some(r) if (r as usize) < vertex_count => Err(StripError::InvalidConfig(format!(
            "restart index {r} collides with a vertex index (vertex count {vertex_count})"
        ))),
        _ => Ok(()),
    }
}

/// Converts a triangle list into triangle strips.
///
/// Strips shorter than `config.min_strip_size` triangles and triangles with a repeated vertex are collected into a
/// trailing list group in input order. With `config.stitch_strips` all strips are joined into one strip group
/// (see [crate::stitch::stitch]); with `config.lists_only` the input is returned as a single list group.
///
/// Fails with [StripError::InvalidInput] if the index count is not a multiple of 3 or an index is not below
/// `vertex_count`, and with [StripError::InvalidConfig] if `config.restart_index` is below `vertex_count`; no partial
/// output is produced.
///
/// # Example
///
/// ```
/// use tristrip_rs::{stripify, PrimitiveType, StripConfig};
///
/// let indices = [0, 1, 2, 2, 1, 3, 2, 3, 4];
/// let config = StripConfig::default().with_stitch_strips(false);
///
/// let result = stripify(&indices, 5, &config).unwrap();
///
/// assert_eq!(result.groups.len(), 1);
/// assert_eq!(result.groups[0].kind, PrimitiveType::Strip);
/// assert_eq!(result.groups[0].indices, vec![0, 1, 2, 3, 4]);
/// ```
pub fn stripify(indices: &[u32], vertex_count: usize, config: &StripConfig) -> Result<Stripification> {
    config.validate()?;
    validate_indices(indices, vertex_count)?;
    validate_restart_index(config.restart_index, vertex_count)?;

    // guard for empty meshes
    if indices.is_empty() {
        return Ok(Stripification::default());
    }

    if config.lists_only {
        return Ok(Stripification {
            groups: vec![PrimitiveGroup::list(indices.to_vec())],
            diagnostics: Vec::new(),
        });
    }

    let mut graph = AdjacencyGraph::build(indices, config.non_manifold)?;
    let diagnostics = graph.take_diagnostics();

    let mut strips = Vec::new();
    let mut listed: Vec<u32> = (0..graph.len() as u32)
        .filter(|t| graph.kind(*t) == TriangleKind::Degenerate)
        .collect();

    let mut demoted = 0;

    for strip in grow_strips(&graph, config.cache_size) {
        if strip.triangle_count() < config.min_strip_size {
            demoted += 1;
            listed.extend_from_slice(&strip.triangles);
        } else {
            strips.push(PrimitiveGroup::strip(strip.indices));
        }
    }

    let strip_count = strips.len();
    let mut groups = stitch(strips, config);

    if !listed.is_empty() {
        listed.sort_unstable();

        let list = listed.iter().flat_map(|t| graph.triangle(*t)).collect();
        groups.push(PrimitiveGroup::list(list));
    }

    let result = Stripification { groups, diagnostics };

    debug!(
        triangles = graph.len(),
        strips = strip_count,
        demoted,
        listed = listed.len(),
        indices = result.index_count(),
        "stripified mesh"
    );

    Ok(result)
}

/// Returns worst case size requirement for the indices of a stitched [stripify] result.
pub fn stripify_bound(index_count: usize) -> usize {
    assert!(index_count % 3 == 0);

    // worst case is every triangle on its own with 3 stitching indices
    (index_count / 3) * 6
}
