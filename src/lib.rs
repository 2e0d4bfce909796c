//! tristrip-rs
//!
//! Converts indexed triangle lists into vertex-cache friendly triangle strips, joins strips with degenerate
//! triangles, and stores strips compactly as 2-bit control codes.
//!
//! # Example
//!
//! ```
//! use tristrip_rs::{stripify, PrimitiveType, StripConfig};
//!
//! // two triangles sharing the 1-2 edge
//! let indices = [0, 1, 2, 2, 1, 3];
//!
//! let result = stripify(&indices, 4, &StripConfig::default()).unwrap();
//!
//! assert_eq!(result.groups.len(), 1);
//! assert_eq!(result.groups[0].kind, PrimitiveType::Strip);
//! assert_eq!(result.groups[0].indices, vec![0, 1, 2, 3]);
//! ```
//!
//! # Features
//!
//! * `parallel`: Grows the strips of independent mesh components on the rayon thread pool

pub mod adjacency;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
mod hash;
pub mod primitive;
pub mod stitch;
pub mod stripify;
mod util;

pub use crate::config::{NonManifoldPolicy, StripConfig, DEFAULT_CACHE_SIZE};
pub use crate::error::{Diagnostic, Result, StripError};
pub use crate::primitive::{PrimitiveGroup, PrimitiveType};
pub use crate::stripify::{stripify, Stripification};

pub const INVALID_INDEX: u32 = u32::MAX;

/// Vertex indices of a triangle in drawing order.
pub type Triangle = [u32; 3];
