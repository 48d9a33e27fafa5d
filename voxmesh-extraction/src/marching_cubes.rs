//! Marching Cubes isosurface extraction
//!
//! Walks every unit cube of the voxel grid, classifies its corners against
//! the isovalue, and emits triangles through the canonical edge/triangle
//! tables. Vertices are shared across cube edges: each cut edge is identified
//! by its low corner and axis direction, so neighbouring cubes reuse the same
//! output vertex and the mesh is watertight.
//!
//! Extraction is parallel over the outer `x` planes. Each plane builds its
//! own edge cache; planes are then joined in ascending order with a fixup
//! pass that dedups the tuples shared between adjacent planes.

use crate::parallel;
use crate::tables::{Axis, CORNER_OFFSETS, EDGE_CONNECTION, EDGE_TABLE, TRIANGLE_TABLE};
use std::collections::HashMap;
use voxmesh_core::{
    crossing_parameter, interpolate, lerp_vector, Error, Mesh, Point3f, Result, Vertex, VoxelGrid,
};

/// A cut cube edge, identified by its low corner and axis direction.
/// Neighbouring cubes produce identical keys for their shared edges.
type EdgeKey = (usize, usize, usize, Axis);

/// Submesh produced by one `x` plane of cubes. `keys` parallels `vertices`
/// so the join pass can recognize vertices shared with the previous plane.
struct PlaneMesh {
    vertices: Vec<Vertex>,
    keys: Vec<EdgeKey>,
    faces: Vec<[usize; 3]>,
}

/// Cube corner sample: lattice coordinates plus field value and gradient.
struct Corner {
    coords: [usize; 3],
    vertex: Vertex,
}

/// Extract the isosurface of `grid` at `isovalue` as an indexed mesh.
///
/// Every grid dimension must be at least 2. A field that never crosses the
/// isovalue yields an empty mesh.
pub fn extract(grid: &VoxelGrid, isovalue: f32) -> Result<Mesh> {
    let [nx, ny, nz] = grid.dimensions;
    if nx < 2 || ny < 2 || nz < 2 {
        return Err(Error::InvalidData(format!(
            "voxel grid must be at least 2x2x2, got {:?}",
            grid.dimensions
        )));
    }

    let planes: Vec<usize> = (0..nx - 1).collect();
    let plane_meshes = parallel::parallel_map(&planes, |&x| extract_plane(grid, isovalue, x));

    // Join in ascending plane order. Only tuples on the shared grid plane
    // between adjacent slabs can collide; first writer wins.
    let mut mesh = Mesh::new();
    let mut global_index: HashMap<EdgeKey, usize> = HashMap::new();
    for plane in plane_meshes {
        let mut remap = Vec::with_capacity(plane.vertices.len());
        for (vertex, key) in plane.vertices.into_iter().zip(plane.keys) {
            let index = match global_index.get(&key) {
                Some(&existing) => existing,
                None => {
                    let index = mesh.add_vertex(vertex);
                    global_index.insert(key, index);
                    index
                }
            };
            remap.push(index);
        }

        for face in plane.faces {
            mesh.add_face([remap[face[0]], remap[face[1]], remap[face[2]]]);
        }
    }

    Ok(mesh)
}

/// Polygonize all cubes with origin `(x, *, *)`
fn extract_plane(grid: &VoxelGrid, isovalue: f32, x: usize) -> PlaneMesh {
    let [_, ny, nz] = grid.dimensions;
    let mut plane = PlaneMesh {
        vertices: Vec::new(),
        keys: Vec::new(),
        faces: Vec::new(),
    };
    let mut edge_cache: HashMap<EdgeKey, usize> = HashMap::new();

    for y in 0..ny - 1 {
        for z in 0..nz - 1 {
            polygonize_cube(grid, isovalue, [x, y, z], &mut plane, &mut edge_cache);
        }
    }

    plane
}

fn polygonize_cube(
    grid: &VoxelGrid,
    isovalue: f32,
    origin: [usize; 3],
    plane: &mut PlaneMesh,
    edge_cache: &mut HashMap<EdgeKey, usize>,
) {
    let corners = cube_corners(grid, origin);

    let mut index = 0usize;
    for (i, corner) in corners.iter().enumerate() {
        if corner.vertex.value < isovalue {
            index |= 1 << i;
        }
    }

    let edge_bits = EDGE_TABLE[index];
    if edge_bits == 0 {
        return;
    }

    // One shared vertex per cut edge, resolved through the cache.
    let mut edge_vertices = [usize::MAX; 12];
    for (e, &(a, b, axis)) in EDGE_CONNECTION.iter().enumerate() {
        if edge_bits & (1 << e) == 0 {
            continue;
        }

        let ca = &corners[a];
        let cb = &corners[b];
        let key = (
            ca.coords[0].min(cb.coords[0]),
            ca.coords[1].min(cb.coords[1]),
            ca.coords[2].min(cb.coords[2]),
            axis,
        );

        let vertex_index = match edge_cache.get(&key) {
            Some(&cached) => cached,
            None => {
                let (va, vb) = (&ca.vertex, &cb.vertex);
                let position = interpolate(isovalue, va.value, vb.value, &va.position, &vb.position);

                let t = crossing_parameter(isovalue, va.value, vb.value);
                let normal = lerp_vector(&va.normal, &vb.normal, t);
                let norm = normal.norm();
                let normal = if norm > 1e-12 { normal / norm } else { normal };

                let index = plane.vertices.len();
                plane.vertices.push(Vertex::new(isovalue, position, normal));
                plane.keys.push(key);
                edge_cache.insert(key, index);
                index
            }
        };
        edge_vertices[e] = vertex_index;
    }

    // Orientation is preserved from the table.
    let triangles = &TRIANGLE_TABLE[index];
    let mut i = 0;
    while triangles[i] != -1 {
        plane.faces.push([
            edge_vertices[triangles[i] as usize],
            edge_vertices[triangles[i + 1] as usize],
            edge_vertices[triangles[i + 2] as usize],
        ]);
        i += 3;
    }
}

/// Sample the 8 corners of the cube at `origin` with values and gradients
fn cube_corners(grid: &VoxelGrid, origin: [usize; 3]) -> [Corner; 8] {
    CORNER_OFFSETS.map(|offset| {
        let x = origin[0] + offset[0];
        let y = origin[1] + offset[1];
        let z = origin[2] + offset[2];

        Corner {
            coords: [x, y, z],
            vertex: Vertex::new(
                grid.values[x][y][z],
                Point3f::new(x as f32, y as f32, z as f32),
                grid.gradient_normal(x, y, z),
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_corner_grid() -> VoxelGrid {
        let mut grid = VoxelGrid::new([2, 2, 2]);
        grid.set_value(0, 0, 0, 1.0).unwrap();
        grid
    }

    fn rounded(p: &Point3f) -> (i64, i64, i64) {
        (
            (p.x * 1000.0).round() as i64,
            (p.y * 1000.0).round() as i64,
            (p.z * 1000.0).round() as i64,
        )
    }

    #[test]
    fn test_tables_are_consistent() {
        // Every edge referenced by the triangle table must have its bit set
        // in the edge table for the same configuration.
        for index in 0..256 {
            let row = &TRIANGLE_TABLE[index];
            let mut i = 0;
            while row[i] != -1 {
                for j in 0..3 {
                    let edge = row[i + j];
                    assert!((0..12).contains(&edge), "bad edge {} in case {}", edge, index);
                    assert_ne!(
                        EDGE_TABLE[index] & (1 << edge),
                        0,
                        "triangle edge {} missing from edge table in case {}",
                        edge,
                        index
                    );
                }
                i += 3;
            }
            assert_eq!(i % 3, 0);
        }

        // Complementary configurations cut the same edge set.
        for index in 0..256 {
            assert_eq!(EDGE_TABLE[index], EDGE_TABLE[255 - index]);
        }
    }

    #[test]
    fn test_rejects_too_small_grid() {
        let grid = VoxelGrid::new([1, 5, 5]);
        assert!(extract(&grid, 0.5).is_err());
    }

    #[test]
    fn test_empty_field_yields_empty_mesh() {
        // S3: a uniform field never crosses the isovalue.
        let grid = VoxelGrid::new([4, 4, 4]);
        let mesh = extract(&grid, 0.5).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_single_corner_triangle() {
        // S1: one hot corner produces exactly one triangle whose vertices sit
        // at the midpoints of the three incident edges.
        let mesh = extract(&single_corner_grid(), 0.5).unwrap();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);

        let mut positions: Vec<(i64, i64, i64)> =
            mesh.vertices.iter().map(|v| rounded(&v.position)).collect();
        positions.sort_unstable();
        assert_eq!(
            positions,
            vec![(0, 0, 500), (0, 500, 0), (500, 0, 0)]
        );
    }

    #[test]
    fn test_two_cube_edge_sharing() {
        // S2: two adjacent hot corners along x. The cut edges on the shared
        // grid plane must appear exactly once.
        let mut grid = VoxelGrid::new([3, 2, 2]);
        grid.set_value(0, 0, 0, 1.0).unwrap();
        grid.set_value(1, 0, 0, 1.0).unwrap();

        let mesh = extract(&grid, 0.5).unwrap();

        // Distinct cut edges: 4 in the first cube, 3 in the second, 2 shared.
        assert_eq!(mesh.vertex_count(), 5);

        let mut positions: Vec<(i64, i64, i64)> =
            mesh.vertices.iter().map(|v| rounded(&v.position)).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), 5, "duplicate vertex on a shared cube edge");
    }

    #[test]
    fn test_faces_reference_valid_vertices() {
        let mut grid = VoxelGrid::new([4, 4, 4]);
        grid.set_value(1, 1, 1, 1.0).unwrap();
        grid.set_value(2, 1, 1, 1.0).unwrap();
        grid.set_value(1, 2, 1, 1.0).unwrap();

        let mesh = extract(&grid, 0.5).unwrap();
        assert!(!mesh.is_empty());
        mesh.validate().unwrap();
    }

    #[test]
    fn test_vertex_normals_are_unit_length() {
        let grid = VoxelGrid::from_fn([8, 8, 8], |x, y, z| {
            let dx = x as f32 - 3.5;
            let dy = y as f32 - 3.5;
            let dz = z as f32 - 3.5;
            let dist = (dx * dx + dy * dy + dz * dz).sqrt();
            (1.0 - dist / 3.0).clamp(0.0, 1.0)
        });

        let mesh = extract(&grid, 0.5).unwrap();
        assert!(!mesh.is_empty());
        for vertex in &mesh.vertices {
            assert!((vertex.normal.norm() - 1.0).abs() <= 1e-4);
        }
    }
}
