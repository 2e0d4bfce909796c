//! Stripification parameters

use crate::error::{Result, StripError};

/// Cache size used when none is configured.
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// How edges referenced by more than two triangles are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonManifoldPolicy {
    /// Keep the first two triangles on the edge adjacent and report the rest as diagnostics.
    #[default]
    Proceed,
    /// Fail the run with [StripError::NonManifoldGeometry].
    Reject,
}

/// Parameters of a single stripification run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripConfig {
    /// Capacity of the simulated vertex cache used to score strip candidates
    pub cache_size: usize,
    /// Skip strip generation and emit the input as a single triangle list
    pub lists_only: bool,
    /// Join all strips into one sequence
    pub stitch_strips: bool,
    /// Strips with fewer triangles are demoted to the list group
    pub min_strip_size: usize,
    /// Join strips with this primitive restart index instead of degenerate triangles
    pub restart_index: Option<u32>,
    pub non_manifold: NonManifoldPolicy,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            lists_only: false,
            stitch_strips: true,
            min_strip_size: 0,
            restart_index: None,
            non_manifold: NonManifoldPolicy::Proceed,
        }
    }
}

impl StripConfig {
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_lists_only(mut self, lists_only: bool) -> Self {
        self.lists_only = lists_only;
        self
    }

    pub fn with_stitch_strips(mut self, stitch_strips: bool) -> Self {
        self.stitch_strips = stitch_strips;
        self
    }

    pub fn with_min_strip_size(mut self, min_strip_size: usize) -> Self {
        self.min_strip_size = min_strip_size;
        self
    }

    pub fn with_restart_index(mut self, restart_index: Option<u32>) -> Self {
        self.restart_index = restart_index;
        self
    }

    pub fn with_non_manifold(mut self, policy: NonManifoldPolicy) -> Self {
        self.non_manifold = policy;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.cache_size < 3 {
            return Err(StripError::InvalidConfig(format!(
                "cache size {} cannot hold a triangle",
                self.cache_size
            )));
        }

        Ok(())
    }
}
