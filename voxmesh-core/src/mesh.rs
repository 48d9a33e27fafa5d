//! Mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A surface vertex carrying the sampled scalar value, its position in grid
/// space, and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Scalar value of the field at this vertex (the isovalue for surface
    /// vertices produced by extraction).
    pub value: f32,
    /// Position in grid space.
    pub position: Point3f,
    /// Unit-length normal; zero only for a flat field.
    pub normal: Vector3f,
}

impl Vertex {
    pub fn new(value: f32, position: Point3f, normal: Vector3f) -> Self {
        Self {
            value,
            position,
            normal,
        }
    }

    /// Interpolate two vertices at parameter `t`, renormalizing the normal.
    ///
    /// If the interpolated normal has (near) zero length it is left
    /// unnormalized so the result stays finite.
    pub fn lerp(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
        let normal = lerp_vector(&a.normal, &b.normal, t);
        let norm = normal.norm();
        let normal = if norm > 1e-12 { normal / norm } else { normal };

        Vertex {
            value: a.value + (b.value - a.value) * t,
            position: lerp_point(&a.position, &b.position, t),
            normal,
        }
    }
}

/// An indexed triangle mesh with per-vertex attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<[usize; 3]>,
}

/// A face is degenerate iff two of its three indices are equal.
pub fn is_degenerate(face: &[usize; 3]) -> bool {
    face[0] == face[1] || face[1] == face[2] || face[2] == face[0]
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Vertex>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh, returning its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Calculate normalized face normals from the winding `(p1-p0)×(p2-p0)`.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let p0 = self.vertices[face[0]].position;
                let p1 = self.vertices[face[1]].position;
                let p2 = self.vertices[face[2]].position;
                (p1 - p0).cross(&(p2 - p0)).normalize()
            })
            .collect()
    }

    /// Verify that every face index is in range.
    pub fn validate(&self) -> crate::Result<()> {
        for (i, face) in self.faces.iter().enumerate() {
            for &v in face {
                if v >= self.vertices.len() {
                    return Err(crate::Error::InconsistentMesh(format!(
                        "face {} references vertex {} but the mesh has {} vertices",
                        i,
                        v,
                        self.vertices.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(0.0, Point3f::new(x, y, z), Vector3f::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_degenerate_faces() {
        assert!(is_degenerate(&[0, 0, 1]));
        assert!(is_degenerate(&[0, 1, 1]));
        assert!(is_degenerate(&[1, 0, 1]));
        assert!(!is_degenerate(&[0, 1, 2]));
    }

    #[test]
    fn test_vertex_lerp_renormalizes() {
        let a = Vertex::new(0.0, Point3f::origin(), Vector3f::new(1.0, 0.0, 0.0));
        let b = Vertex::new(1.0, Point3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
        let mid = Vertex::lerp(&a, &b, 0.5);

        assert!((mid.normal.norm() - 1.0).abs() < 1e-6);
        assert_eq!(mid.position, Point3f::new(1.0, 0.0, 0.0));
        assert!((mid.value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_lerp_zero_normal_stays_finite() {
        let a = Vertex::new(0.0, Point3f::origin(), Vector3f::new(1.0, 0.0, 0.0));
        let b = Vertex::new(0.0, Point3f::origin(), Vector3f::new(-1.0, 0.0, 0.0));
        let mid = Vertex::lerp(&a, &b, 0.5);
        assert!(mid.normal.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_face_normal_winding() {
        let mesh = Mesh::from_vertices_and_faces(
            vec![
                unit_vertex(0.0, 0.0, 0.0),
                unit_vertex(1.0, 0.0, 0.0),
                unit_vertex(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let normals = mesh.calculate_face_normals();
        assert_eq!(normals[0], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mesh = Mesh::from_vertices_and_faces(
            vec![unit_vertex(0.0, 0.0, 0.0), unit_vertex(1.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(mesh.validate().is_err());
    }
}
