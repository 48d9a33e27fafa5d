//! Wavefront OBJ format support
//!
//! Covers the subset exchanged by the pipeline: `v` position lines, `vn`
//! normal lines, and `f` faces with `v`, `v//n` or `v/t/n` tokens (1-based,
//! texture indices ignored). Quads are split into two triangles; every other
//! line is ignored.

use crate::{MeshReader, MeshWriter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use voxmesh_core::{Error, Mesh, Point3f, Result, Vector3f, Vertex};

pub struct ObjReader;
pub struct ObjWriter;

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# List of vertices")?;
        for v in &mesh.vertices {
            writeln!(
                writer,
                "v {} {} {}",
                v.position.x, v.position.y, v.position.z
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "# List of normals")?;
        for v in &mesh.vertices {
            writeln!(writer, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z)?;
        }
        writeln!(writer)?;

        writeln!(writer, "# List of faces")?;
        for f in &mesh.faces {
            writeln!(
                writer,
                "f {0}//{0} {1}//{1} {2}//{2}",
                f[0] + 1,
                f[1] + 1,
                f[2] + 1
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut positions: Vec<Point3f> = Vec::new();
        let mut normals: Vec<Vector3f> = Vec::new();
        let mut faces: Vec<[usize; 3]> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let [x, y, z] = parse_triple(&mut tokens, &line)?;
                    positions.push(Point3f::new(x, y, z));
                }
                Some("vn") => {
                    let [x, y, z] = parse_triple(&mut tokens, &line)?;
                    normals.push(Vector3f::new(x, y, z));
                }
                Some("f") => {
                    let indices: Vec<usize> = tokens
                        .map(|token| parse_face_vertex(token, &line))
                        .collect::<Result<_>>()?;
                    match indices.len() {
                        3 => faces.push([indices[0], indices[1], indices[2]]),
                        4 => {
                            faces.push([indices[0], indices[1], indices[2]]);
                            faces.push([indices[1], indices[2], indices[3]]);
                        }
                        n => {
                            return Err(Error::InvalidData(format!(
                                "face with {} vertices (only triangles and quads): '{}'",
                                n, line
                            )))
                        }
                    }
                }
                // Comments, groups, materials and everything else are ignored.
                _ => {}
            }
        }

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = normals.get(i).copied().unwrap_or_else(Vector3f::zeros);
                Vertex::new(0.0, position, normal)
            })
            .collect();

        let mesh = Mesh::from_vertices_and_faces(vertices, faces);
        mesh.validate()?;
        Ok(mesh)
    }
}

fn parse_triple<'a, I>(tokens: &mut I, line: &str) -> Result<[f32; 3]>
where
    I: Iterator<Item = &'a str>,
{
    let mut out = [0.0f32; 3];
    for slot in out.iter_mut() {
        let token = tokens
            .next()
            .ok_or_else(|| Error::InvalidData(format!("truncated line: '{}'", line)))?;
        *slot = token
            .parse()
            .map_err(|_| Error::InvalidData(format!("invalid number '{}' in '{}'", token, line)))?;
    }
    Ok(out)
}

/// Parse one face token (`v`, `v//n`, or `v/t/n`) into a zero-based vertex
/// index. Texture and normal references are ignored.
fn parse_face_vertex(token: &str, line: &str) -> Result<usize> {
    let vertex = token.split('/').next().unwrap_or(token);
    let index: usize = vertex
        .parse()
        .map_err(|_| Error::InvalidData(format!("invalid face index '{}' in '{}'", token, line)))?;
    if index == 0 {
        return Err(Error::InvalidData(format!(
            "face indices are 1-based: '{}'",
            line
        )));
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn triangle_mesh() -> Mesh {
        let vertices = vec![
            Vertex::new(0.5, Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0)),
            Vertex::new(0.5, Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0)),
            Vertex::new(0.5, Point3f::new(0.5, 1.0, 0.0), Vector3f::new(0.0, 0.0, 1.0)),
        ];
        Mesh::from_vertices_and_faces(vertices, vec![[0, 1, 2]])
    }

    #[test]
    fn test_obj_mesh_roundtrip() {
        let temp_file = "test_roundtrip_mesh.obj";
        let mesh = triangle_mesh();

        ObjWriter::write_mesh(&mesh, temp_file).unwrap();
        let loaded = ObjReader::read_mesh(temp_file).unwrap();

        assert_eq!(mesh.vertex_count(), loaded.vertex_count());
        assert_eq!(mesh.face_count(), loaded.face_count());
        for (original, read) in mesh.vertices.iter().zip(loaded.vertices.iter()) {
            assert!((original.position - read.position).norm() < 1e-6);
            assert!((original.normal - read.normal).norm() < 1e-6);
        }
        assert_eq!(mesh.faces, loaded.faces);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_writer_emits_one_based_double_slash_faces() {
        let temp_file = "test_writer_format.obj";
        ObjWriter::write_mesh(&triangle_mesh(), temp_file).unwrap();

        let content = fs::read_to_string(temp_file).unwrap();
        assert!(content.contains("v 0 0 0"));
        assert!(content.contains("vn 0 0 1"));
        assert!(content.contains("f 1//1 2//2 3//3"));

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_reader_splits_quads() {
        let temp_file = "test_quad_split.obj";
        let content = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        fs::write(temp_file, content).unwrap();

        let mesh = ObjReader::read_mesh(temp_file).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [1, 2, 3]]);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_reader_ignores_unknown_tokens() {
        let temp_file = "test_unknown_tokens.obj";
        let content = "# comment\no object\ng group\nmtllib foo.mtl\nusemtl bar\n\
                       v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1/1 2/1/1 3/1/1\n";
        fs::write(temp_file, content).unwrap();

        let mesh = ObjReader::read_mesh(temp_file).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_reader_rejects_malformed_numbers() {
        let temp_file = "test_bad_float.obj";
        fs::write(temp_file, "v 0.0 oops 1.0\n").unwrap();
        assert!(matches!(
            ObjReader::read_mesh(temp_file),
            Err(Error::InvalidData(_))
        ));
        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_reader_rejects_out_of_range_face() {
        let temp_file = "test_bad_index.obj";
        fs::write(temp_file, "v 0 0 0\nf 1 2 3\n").unwrap();
        assert!(matches!(
            ObjReader::read_mesh(temp_file),
            Err(Error::InconsistentMesh(_))
        ));
        let _ = fs::remove_file(temp_file);
    }
}
