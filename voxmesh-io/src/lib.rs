//! I/O operations for voxmesh meshes
//!
//! Reading and writing of the Wavefront OBJ subset used by the pipeline:
//! vertex positions, vertex normals, and triangular faces.

pub mod obj;

pub use obj::{ObjReader, ObjWriter};

use voxmesh_core::{Error, Mesh, Result};

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<Mesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(mesh: &Mesh, path: P) -> Result<()>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") => obj::ObjReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<std::path::Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") => obj::ObjWriter::write_mesh(mesh, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmesh_core::{Point3f, Vector3f, Vertex};

    #[test]
    fn test_unsupported_format() {
        assert!(read_mesh("mesh.stl").is_err());

        let mesh = Mesh::from_vertices_and_faces(
            vec![Vertex::new(
                0.0,
                Point3f::origin(),
                Vector3f::new(0.0, 0.0, 1.0),
            )],
            vec![],
        );
        assert!(write_mesh(&mesh, "mesh.stl").is_err());
    }
}
