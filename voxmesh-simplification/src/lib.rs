//! Mesh simplification for voxmesh
//!
//! Iterative pair contraction driven by the quadric error metric: each mesh
//! edge is scored by the summed plane quadrics of its endpoints, the cheapest
//! pair is contracted, and stale queue entries are discarded lazily through
//! per-vertex version counters.

pub mod quadric_error;

pub use quadric_error::*;

use voxmesh_core::{Mesh, Result};

/// Simplify a mesh in place by contracting vertex pairs
pub trait MeshSimplifier {
    /// Contract `ceil(vertex_count * ratio)` pairs, `ratio` in `(0, 1]`.
    fn simplify(&self, mesh: &mut Mesh, ratio: f32) -> Result<()>;
}
