//! Core data structures for voxmesh
//!
//! This crate provides the fundamental types shared by the extraction and
//! simplification stages: point/vector aliases, the indexed surface mesh,
//! the dense voxel grid with its discrete gradient, and the packed symmetric
//! quadric matrix used by the error metric.

pub mod error;
pub mod mesh;
pub mod point;
pub mod quadric;
pub mod voxel;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use quadric::*;
pub use voxel::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Point3, Vector3, Vector4};
