//! # voxmesh
//!
//! A pipeline that turns stacks of grayscale images (a volumetric scalar
//! field) into decimated triangle meshes: Marching Cubes isosurface
//! extraction followed by quadric-error-metric simplification.
//!
//! This is the umbrella crate that provides convenient access to all voxmesh
//! functionality. You can use this crate to get everything in one place, or
//! depend on individual member crates for more granular control.
//!
//! ## Quick Start
//!
//! ```rust
//! use voxmesh::prelude::*;
//!
//! // A small spherical density field
//! let grid = VoxelGrid::from_fn([8, 8, 8], |x, y, z| {
//!     let dx = x as f32 - 3.5;
//!     let dy = y as f32 - 3.5;
//!     let dz = z as f32 - 3.5;
//!     (1.0 - (dx * dx + dy * dy + dz * dz).sqrt() / 3.0).clamp(0.0, 1.0)
//! });
//!
//! let mut mesh = extract(&grid, 0.5).unwrap();
//! simplify(&mut mesh, 0.5).unwrap();
//! assert!(!mesh.is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: enables extraction, simplification, and io
//! - `extraction`: Marching Cubes isosurface extraction
//! - `simplification`: quadric error metric decimation
//! - `io`: OBJ mesh reading and writing

// Re-export core functionality
pub use voxmesh_core::*;

#[cfg(feature = "extraction")]
pub use voxmesh_extraction as extraction;

#[cfg(feature = "simplification")]
pub use voxmesh_simplification as simplification;

#[cfg(feature = "io")]
pub use voxmesh_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use voxmesh_core::*;

    #[cfg(feature = "extraction")]
    pub use voxmesh_extraction::*;

    #[cfg(feature = "simplification")]
    pub use voxmesh_simplification::*;

    #[cfg(feature = "io")]
    pub use voxmesh_io::*;
}
