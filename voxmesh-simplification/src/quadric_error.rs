//! Quadric error decimation
//!
//! Implements iterative pair contraction over an indexed mesh. Contraction
//! candidates are the mesh edges; each carries the quadric error of its best
//! replacement vertex and the version sum of its endpoints at enqueue time.
//! A popped pair whose version sum no longer matches is stale and dropped,
//! so the queue never needs decrease-key surgery while the vertex/face graph
//! mutates underneath it.

use crate::MeshSimplifier;
use nalgebra::{Vector3, Vector4};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::HashSet;
use voxmesh_core::{
    is_degenerate, Error, Mesh, Point3f, Result, SymmetricMatrix4, Vertex,
};

/// Version sentinel for retired vertices; no live version sum can reach it.
const INVALID: u64 = u64::MAX;

/// A candidate contraction of the edge `(v1, v2)` into `vertex`.
#[derive(Debug, Clone)]
struct Pair {
    v1: usize,
    v2: usize,
    /// `versions[v1] + versions[v2]` at enqueue time
    version: u64,
    error: f64,
    vertex: Vertex,
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Pair {}

impl PartialOrd for Pair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pair {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest error pops first; ties break on endpoint
        // indices so pop order is reproducible.
        other
            .error
            .total_cmp(&self.error)
            .then_with(|| other.v1.cmp(&self.v1))
            .then_with(|| other.v2.cmp(&self.v2))
    }
}

/// Quadric error decimation simplifier
pub struct QuadricErrorSimplifier;

impl MeshSimplifier for QuadricErrorSimplifier {
    fn simplify(&self, mesh: &mut Mesh, ratio: f32) -> Result<()> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(Error::InvalidData(format!(
                "simplification ratio must be in (0, 1], got {}",
                ratio
            )));
        }

        let mut target = (mesh.vertex_count() as f64 * ratio as f64).ceil() as usize;
        let mut state = SimplifierState::new(mesh)?;

        while target > 0 {
            let Some((_, pair)) = state.pairs.pop() else {
                break;
            };

            // Lazy invalidation: any contraction touching an endpoint bumped
            // its version, so a mismatched sum means the pair is stale.
            if state.versions[pair.v1] == INVALID || state.versions[pair.v2] == INVALID {
                continue;
            }
            if state.versions[pair.v1] + state.versions[pair.v2] != pair.version {
                continue;
            }

            state.contract_pair(pair);
            target -= 1;
        }

        let SimplifierState {
            versions,
            valid_face,
            ..
        } = state;
        tidy_mesh(mesh, &versions, &valid_face);
        Ok(())
    }
}

/// Simplify `mesh` in place, contracting `ceil(vertex_count * ratio)` pairs.
pub fn simplify(mesh: &mut Mesh, ratio: f32) -> Result<()> {
    QuadricErrorSimplifier.simplify(mesh, ratio)
}

/// Mutable graph state shared by the contraction loop
struct SimplifierState<'a> {
    mesh: &'a mut Mesh,
    /// Face ids incident to each live vertex
    vertex_faces: Vec<Vec<usize>>,
    /// Monotone per-vertex counters, `INVALID` once retired
    versions: Vec<u64>,
    /// Quadric of each face's supporting plane
    face_quadrics: Vec<SymmetricMatrix4>,
    /// Sum of incident valid face quadrics per vertex
    vertex_quadrics: Vec<SymmetricMatrix4>,
    valid_face: Vec<bool>,
    pairs: PriorityQueue<usize, Pair>,
    next_pair_id: usize,
}

impl<'a> SimplifierState<'a> {
    fn new(mesh: &'a mut Mesh) -> Result<Self> {
        mesh.validate()?;

        let vertex_count = mesh.vertex_count();
        let face_count = mesh.face_count();

        let mut state = Self {
            vertex_faces: vec![Vec::new(); vertex_count],
            versions: vec![1; vertex_count],
            face_quadrics: vec![SymmetricMatrix4::zeros(); face_count],
            vertex_quadrics: vec![SymmetricMatrix4::zeros(); vertex_count],
            valid_face: vec![false; face_count],
            pairs: PriorityQueue::new(),
            next_pair_id: 0,
            mesh,
        };

        for f in 0..face_count {
            let face = state.mesh.faces[f];
            if is_degenerate(&face) {
                continue;
            }
            let Some(plane) = face_plane(&state.mesh.vertices, &face) else {
                continue;
            };

            state.valid_face[f] = true;
            state.face_quadrics[f] = SymmetricMatrix4::from_plane(&plane);
            for &v in &face {
                state.vertex_faces[v].push(f);
            }
        }

        for v in 0..vertex_count {
            let mut q = SymmetricMatrix4::zeros();
            for &f in &state.vertex_faces[v] {
                q += state.face_quadrics[f];
            }
            state.vertex_quadrics[v] = q;
        }

        // Initial pair set: the undirected edges of the valid faces.
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::new();
        for f in 0..face_count {
            if !state.valid_face[f] {
                continue;
            }
            let face = state.mesh.faces[f];
            for j in 0..3 {
                let (a, b) = (face[j], face[(j + 1) % 3]);
                let edge = (a.min(b), a.max(b));
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        for (v1, v2) in edges {
            state.emplace_pair(v1, v2);
        }

        Ok(state)
    }

    /// Score the edge `(v1, v2)` and push it with the current version sum.
    ///
    /// Candidate positions are the two endpoints and their midpoint, plus the
    /// minimizer of the summed quadric when its leading 3x3 block is
    /// invertible. The replacement vertex interpolates scalar and normal at
    /// the winning candidate's parameter.
    fn emplace_pair(&mut self, v1: usize, v2: usize) {
        let q = self.vertex_quadrics[v1] + self.vertex_quadrics[v2];
        let va = self.mesh.vertices[v1];
        let vb = self.mesh.vertices[v2];

        let pa = va.position.coords.cast::<f64>();
        let pb = vb.position.coords.cast::<f64>();

        let mut candidates: Vec<(Vector3<f64>, f32)> =
            vec![(pa, 0.0), (pb, 1.0), ((pa + pb) * 0.5, 0.5)];

        let block = q.leading_block();
        if block.determinant().abs() > 1e-12 {
            if let Some(inverse) = block.try_inverse() {
                let optimal = -(inverse * q.linear_term());
                if optimal.iter().all(|x| x.is_finite()) {
                    candidates.push((optimal, 0.5));
                }
            }
        }

        let mut best_error = f64::INFINITY;
        let mut best_position = pa;
        let mut best_t = 0.0f32;
        for (position, t) in candidates {
            let error = q.quadric_error(&Vector4::new(position.x, position.y, position.z, 1.0));
            if error < best_error {
                best_error = error;
                best_position = position;
                best_t = t;
            }
        }

        let mut vertex = Vertex::lerp(&va, &vb, best_t);
        vertex.position = Point3f::new(
            best_position.x as f32,
            best_position.y as f32,
            best_position.z as f32,
        );

        let pair = Pair {
            v1,
            v2,
            version: self.versions[v1] + self.versions[v2],
            error: best_error,
            vertex,
        };
        self.pairs.push(self.next_pair_id, pair);
        self.next_pair_id += 1;
    }

    /// Contract `pair.v2` into `pair.v1`, rewiring incident faces and
    /// refreshing the surviving vertex's quadric.
    fn contract_pair(&mut self, pair: Pair) {
        let (v1, v2) = (pair.v1, pair.v2);

        self.mesh.vertices[v1] = pair.vertex;
        self.versions[v1] += 1;
        self.versions[v2] = INVALID;

        // Merge v2's faces into v1. A face spanning both endpoints collapses
        // to a segment and is retired.
        let v2_faces = std::mem::take(&mut self.vertex_faces[v2]);
        for f in v2_faces {
            if !self.valid_face[f] {
                continue;
            }
            let face = &mut self.mesh.faces[f];
            if face.contains(&v1) {
                self.valid_face[f] = false;
            } else {
                for v in face.iter_mut() {
                    if *v == v2 {
                        *v = v1;
                    }
                }
                self.vertex_faces[v1].push(f);
            }
        }

        // Recompute supporting planes around the moved vertex. Neighbour
        // vertex quadrics keep their pre-contraction planes.
        let incident = self.vertex_faces[v1].clone();
        for &f in &incident {
            if !self.valid_face[f] {
                continue;
            }
            match face_plane(&self.mesh.vertices, &self.mesh.faces[f]) {
                Some(plane) => self.face_quadrics[f] = SymmetricMatrix4::from_plane(&plane),
                None => self.valid_face[f] = false,
            }
        }

        let mut q = SymmetricMatrix4::zeros();
        for &f in &incident {
            if self.valid_face[f] {
                q += self.face_quadrics[f];
            }
        }
        self.vertex_quadrics[v1] = q;

        // Re-enqueue the surviving edges that touch v1; their version sums
        // now include the bumped counter.
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for &f in &incident {
            if !self.valid_face[f] {
                continue;
            }
            let face = self.mesh.faces[f];
            for j in 0..3 {
                let (a, b) = (face[j], face[(j + 1) % 3]);
                if a != v1 && b != v1 {
                    continue;
                }
                let edge = (a.min(b), a.max(b));
                if seen.insert(edge) {
                    self.emplace_pair(edge.0, edge.1);
                }
            }
        }
    }
}

/// Supporting plane `ax + by + cz + d = 0` of a face, or `None` when the
/// vertices are collinear.
fn face_plane(vertices: &[Vertex], face: &[usize; 3]) -> Option<Vector4<f64>> {
    let p0 = vertices[face[0]].position.coords.cast::<f64>();
    let p1 = vertices[face[1]].position.coords.cast::<f64>();
    let p2 = vertices[face[2]].position.coords.cast::<f64>();

    let normal = (p1 - p0).cross(&(p2 - p0));
    let norm = normal.norm();
    if norm < 1e-12 {
        return None;
    }

    let normal = normal / norm;
    Some(Vector4::new(
        normal.x,
        normal.y,
        normal.z,
        -normal.dot(&p0),
    ))
}

/// Compact the vertex array (skipping retired entries), remap face indices,
/// and drop retired faces. Relative order of survivors is preserved.
fn tidy_mesh(mesh: &mut Mesh, versions: &[u64], valid_face: &[bool]) {
    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut write = 0;
    for read in 0..mesh.vertices.len() {
        if versions[read] != INVALID {
            remap[read] = write;
            mesh.vertices[write] = mesh.vertices[read];
            write += 1;
        }
    }
    mesh.vertices.truncate(write);

    let mut face_write = 0;
    for face_read in 0..mesh.faces.len() {
        if !valid_face[face_read] {
            continue;
        }
        let face = mesh.faces[face_read];
        mesh.faces[face_write] = [remap[face[0]], remap[face[1]], remap[face[2]]];
        face_write += 1;
    }
    mesh.faces.truncate(face_write);
}
