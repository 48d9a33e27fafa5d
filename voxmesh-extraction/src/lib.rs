//! # voxmesh extraction
//!
//! Isosurface extraction from dense voxel grids using the Marching Cubes
//! algorithm. Extraction is parallelized over grid planes and produces an
//! indexed mesh with vertices shared across cube edges and gradient-derived
//! normals.

pub mod marching_cubes;
pub mod parallel;

mod tables;

pub use marching_cubes::*;
