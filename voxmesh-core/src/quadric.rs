//! Packed symmetric 4x4 quadric matrix
//!
//! Stores the 10 unique entries of a symmetric 4x4 matrix in row-major
//! upper-triangle order `(00, 01, 02, 03, 11, 12, 13, 22, 23, 33)`. Quadrics
//! accumulate squared distances to supporting planes; evaluating
//! `[x y z 1] * Q * [x y z 1]^T` yields the error of placing a vertex at
//! `(x, y, z)`.

use nalgebra::{Matrix3, Vector3, Vector4};
use std::ops::{Add, AddAssign};

/// Maps a `(row, col)` pair flattened as `4 * row + col` to the packed slot,
/// reusing the symmetric cell below the diagonal.
const MAP: [usize; 16] = [
    0, 1, 2, 3, //
    1, 4, 5, 6, //
    2, 5, 7, 8, //
    3, 6, 8, 9,
];

/// A symmetric 4x4 matrix packed into its 10 unique entries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymmetricMatrix4 {
    data: [f64; 10],
}

impl SymmetricMatrix4 {
    /// The zero quadric
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Quadric of the plane `ax + by + cz + d = 0`, i.e. the outer product
    /// `[a b c d]^T * [a b c d]`.
    pub fn from_plane(plane: &Vector4<f64>) -> Self {
        let (a, b, c, d) = (plane.x, plane.y, plane.z, plane.w);
        Self {
            data: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    /// Element access through the symmetric index map
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[MAP[4 * row + col]]
    }

    /// Overwrite every packed entry with `value`
    pub fn fill(&mut self, value: f64) {
        self.data = [value; 10];
    }

    /// Bilinear form `v * Q * v` using the packed layout: diagonal entries
    /// once, off-diagonals counted twice.
    pub fn quadric_error(&self, v: &Vector4<f64>) -> f64 {
        let mut error = 0.0;
        for i in 0..4 {
            error += self.get(i, i) * v[i] * v[i];
            for j in (i + 1)..4 {
                error += 2.0 * self.get(i, j) * v[i] * v[j];
            }
        }
        error
    }

    /// The leading 3x3 block, used for the optimal-position solve.
    pub fn leading_block(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.get(0, 0),
            self.get(0, 1),
            self.get(0, 2),
            self.get(1, 0),
            self.get(1, 1),
            self.get(1, 2),
            self.get(2, 0),
            self.get(2, 1),
            self.get(2, 2),
        )
    }

    /// The translation column `(q03, q13, q23)` of the quadric.
    pub fn linear_term(&self) -> Vector3<f64> {
        Vector3::new(self.get(0, 3), self.get(1, 3), self.get(2, 3))
    }
}

impl Add for SymmetricMatrix4 {
    type Output = SymmetricMatrix4;

    fn add(self, rhs: SymmetricMatrix4) -> SymmetricMatrix4 {
        let mut out = self;
        out += rhs;
        out
    }
}

impl AddAssign for SymmetricMatrix4 {
    fn add_assign(&mut self, rhs: SymmetricMatrix4) {
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix4;

    fn dense(q: &SymmetricMatrix4) -> Matrix4<f64> {
        Matrix4::from_fn(|i, j| q.get(i, j))
    }

    #[test]
    fn test_index_map_is_symmetric() {
        let plane = Vector4::new(1.0, 2.0, 3.0, 4.0);
        let q = SymmetricMatrix4::from_plane(&plane);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(q.get(i, j), q.get(j, i));
            }
        }
    }

    #[test]
    fn test_from_plane_is_outer_product() {
        let plane = Vector4::new(0.5, -1.0, 2.0, 0.25);
        let q = SymmetricMatrix4::from_plane(&plane);
        for i in 0..4 {
            for j in 0..4 {
                assert!((q.get(i, j) - plane[i] * plane[j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_quadric_error_matches_dense_product() {
        let q = SymmetricMatrix4::from_plane(&Vector4::new(0.3, 0.8, -0.2, 1.5))
            + SymmetricMatrix4::from_plane(&Vector4::new(-1.0, 0.1, 0.6, -0.4));
        let v = Vector4::new(1.0, -2.0, 0.5, 1.0);

        let expected = (v.transpose() * dense(&q) * v)[0];
        assert!((q.quadric_error(&v) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_plane_quadric_vanishes_on_plane() {
        // Plane z = 2 -> 0x + 0y + 1z - 2 = 0
        let q = SymmetricMatrix4::from_plane(&Vector4::new(0.0, 0.0, 1.0, -2.0));
        let on_plane = Vector4::new(5.0, -3.0, 2.0, 1.0);
        let off_plane = Vector4::new(5.0, -3.0, 4.0, 1.0);

        assert!(q.quadric_error(&on_plane).abs() < 1e-12);
        assert!((q.quadric_error(&off_plane) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_assign_and_fill() {
        let mut q = SymmetricMatrix4::from_plane(&Vector4::new(1.0, 0.0, 0.0, 0.0));
        q += SymmetricMatrix4::from_plane(&Vector4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(q.get(0, 0), 2.0);

        q.fill(0.0);
        assert_eq!(q, SymmetricMatrix4::zeros());
    }
}
