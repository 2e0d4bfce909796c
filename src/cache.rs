//! Vertex transform cache simulation and analysis

use crate::primitive::PrimitiveGroup;

/// Result of referencing a vertex in a [VertexCache].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The vertex was resident; `position` 0 is the most recently used entry.
    Hit { position: usize },
    Miss,
}

impl CacheOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit { .. })
    }
}

/// Fixed-capacity LRU model of a post-transform vertex cache.
///
/// Only used as a scoring heuristic; results may not match actual GPU behaviour.
#[derive(Clone, Debug)]
pub struct VertexCache {
    /// Most recently used first
    entries: Vec<u32>,
    capacity: usize,
}

impl VertexCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);

        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, vertex: u32) -> bool {
        self.entries.contains(&vertex)
    }

    /// Empties the cache.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// References `vertex`, making it the most recently used entry and evicting the least recently used one if needed.
    pub fn reference(&mut self, vertex: u32) -> CacheOutcome {
        match self.entries.iter().position(|v| *v == vertex) {
            Some(position) => {
                self.entries[..=position].rotate_right(1);
                CacheOutcome::Hit { position }
            }
            None => {
                self.entries.insert(0, vertex);
                self.entries.truncate(self.capacity);
                CacheOutcome::Miss
            }
        }
    }
}

#[derive(Default, Debug)]
pub struct VertexCacheStatistics {
    pub vertices_transformed: u32,
    /// Transformed vertices / triangle count
    ///
    /// Best case 0.5, worst case 3.0, optimum depends on topology
    pub acmr: f32,
    /// Transformed vertices / vertex count
    ///
    /// Best case 1.0, worst case 6.0, optimum is 1.0 (each vertex is transformed once)
    pub atvr: f32,
}

/// Returns cache hit statistics for drawing `groups` in order through an LRU cache of `cache_size` entries.
///
/// Degenerate triangles produced by stitching are skipped, matching hardware that culls them before shading.
pub fn analyze_vertex_cache(
    groups: &[PrimitiveGroup],
    vertex_count: usize,
    cache_size: usize,
) -> VertexCacheStatistics {
    assert!(cache_size >= 3);

    let mut result = VertexCacheStatistics::default();

    let mut cache = VertexCache::new(cache_size);
    let mut seen = vec![false; vertex_count];
    let mut triangle_count = 0;

    for group in groups {
        for abc in group.triangles() {
            triangle_count += 1;

            for index in abc {
                if !cache.reference(index).is_hit() {
                    result.vertices_transformed += 1;
                }

                if let Some(s) = seen.get_mut(index as usize) {
                    *s = true;
                }
            }
        }
    }

    let unique_vertex_count = seen.iter().filter(|s| **s).count();

    result.acmr = if triangle_count == 0 {
        0.0
    } else {
        result.vertices_transformed as f32 / triangle_count as f32
    };
    result.atvr = if unique_vertex_count == 0 {
        0.0
    } else {
        result.vertices_transformed as f32 / unique_vertex_count as f32
    };

    result
}
