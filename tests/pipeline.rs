//! End-to-end pipeline tests: voxel grid -> smoothing -> extraction ->
//! simplification -> OBJ roundtrip.

use std::fs;
use voxmesh::io::{MeshReader, MeshWriter, ObjReader, ObjWriter};
use voxmesh::prelude::{extract, simplify};
use voxmesh::VoxelGrid;

/// Plateau of density 1 inside radius 2, ramping to 0 at radius 4.
fn density_grid() -> VoxelGrid {
    VoxelGrid::from_fn([14, 14, 14], |x, y, z| {
        let dx = x as f32 - 6.5;
        let dy = y as f32 - 6.5;
        let dz = z as f32 - 6.5;
        let dist = (dx * dx + dy * dy + dz * dz).sqrt();
        (1.0 - (dist - 2.0) / 2.0).clamp(0.0, 1.0)
    })
}

#[test]
fn test_full_pipeline() {
    let grid = density_grid().smoothed(5).unwrap();

    let mut mesh = extract(&grid, 0.5).unwrap();
    assert!(!mesh.is_empty());
    mesh.validate().unwrap();
    let extracted_vertices = mesh.vertex_count();

    simplify(&mut mesh, 0.4).unwrap();
    assert!(mesh.vertex_count() < extracted_vertices);
    assert!(!mesh.is_empty());
    mesh.validate().unwrap();

    let temp_file = "test_pipeline_mesh.obj";
    ObjWriter::write_mesh(&mesh, temp_file).unwrap();
    let loaded = ObjReader::read_mesh(temp_file).unwrap();

    assert_eq!(mesh.vertex_count(), loaded.vertex_count());
    assert_eq!(mesh.face_count(), loaded.face_count());
    for (original, read) in mesh.vertices.iter().zip(loaded.vertices.iter()) {
        assert!((original.position - read.position).norm() < 1e-4);
    }

    let _ = fs::remove_file(temp_file);
}

#[test]
fn test_simplification_keeps_surface_near_original() {
    let grid = density_grid();
    let mut mesh = extract(&grid, 0.5).unwrap();
    simplify(&mut mesh, 0.3).unwrap();

    // Surviving vertices stay in the narrow band around the isosurface:
    // candidate positions are convex-ish combinations of surface vertices.
    for v in &mesh.vertices {
        let d = (v.position - voxmesh::Point3::new(6.5f32, 6.5, 6.5)).norm();
        assert!(d > 1.0 && d < 6.0, "vertex drifted to distance {}", d);
    }
}
