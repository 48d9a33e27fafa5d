//! Dense voxel grid with discrete gradient and separable Gaussian smoothing

use crate::error::{Error, Result};
use crate::point::Vector3f;

/// A dense 3D scalar field sampled on the integer lattice.
///
/// Values are conventionally normalized to `[0, 1]`. The grid is indexed
/// `values[x][y][z]` and is immutable during extraction.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// Scalar values arranged as [x][y][z]
    pub values: Vec<Vec<Vec<f32>>>,
    /// Grid dimensions
    pub dimensions: [usize; 3],
}

impl VoxelGrid {
    /// Create a zero-filled grid
    pub fn new(dimensions: [usize; 3]) -> Self {
        let values = vec![vec![vec![0.0; dimensions[2]]; dimensions[1]]; dimensions[0]];
        Self { values, dimensions }
    }

    /// Build a grid from nested value arrays, validating that every plane and
    /// row has the same length.
    pub fn from_values(values: Vec<Vec<Vec<f32>>>) -> Result<Self> {
        let nx = values.len();
        let ny = values.first().map_or(0, |plane| plane.len());
        let nz = values
            .first()
            .and_then(|plane| plane.first())
            .map_or(0, |row| row.len());

        for plane in &values {
            if plane.len() != ny || plane.iter().any(|row| row.len() != nz) {
                return Err(Error::InvalidData(
                    "voxel grid is not rectangular".to_string(),
                ));
            }
        }

        Ok(Self {
            values,
            dimensions: [nx, ny, nz],
        })
    }

    /// Build a grid by sampling `f` at every lattice point
    pub fn from_fn<F>(dimensions: [usize; 3], mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut grid = Self::new(dimensions);
        for x in 0..dimensions[0] {
            for y in 0..dimensions[1] {
                for z in 0..dimensions[2] {
                    grid.values[x][y][z] = f(x, y, z);
                }
            }
        }
        grid
    }

    /// Get scalar value at grid coordinates (with bounds checking)
    pub fn get_value(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        if x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2] {
            Some(self.values[x][y][z])
        } else {
            None
        }
    }

    /// Set scalar value at grid coordinates
    pub fn set_value(&mut self, x: usize, y: usize, z: usize, value: f32) -> Result<()> {
        if x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2] {
            self.values[x][y][z] = value;
            Ok(())
        } else {
            Err(Error::InvalidData(format!(
                "grid coordinates ({}, {}, {}) out of bounds for dimensions {:?}",
                x, y, z, self.dimensions
            )))
        }
    }

    /// Normalized discrete gradient of the field at an integer lattice point.
    ///
    /// Uses central differences in the interior and one-sided differences on
    /// the boundary planes. A zero gradient (flat field) is returned as the
    /// raw zero vector rather than being normalized.
    pub fn gradient_normal(&self, x: usize, y: usize, z: usize) -> Vector3f {
        let [nx, ny, nz] = self.dimensions;
        let v = |x: usize, y: usize, z: usize| self.values[x][y][z];

        let gx = if x == 0 {
            v(x + 1, y, z) - v(x, y, z)
        } else if x == nx - 1 {
            v(x, y, z) - v(x - 1, y, z)
        } else {
            (v(x + 1, y, z) - v(x - 1, y, z)) / 2.0
        };

        let gy = if y == 0 {
            v(x, y + 1, z) - v(x, y, z)
        } else if y == ny - 1 {
            v(x, y, z) - v(x, y - 1, z)
        } else {
            (v(x, y + 1, z) - v(x, y - 1, z)) / 2.0
        };

        let gz = if z == 0 {
            v(x, y, z + 1) - v(x, y, z)
        } else if z == nz - 1 {
            v(x, y, z) - v(x, y, z - 1)
        } else {
            (v(x, y, z + 1) - v(x, y, z - 1)) / 2.0
        };

        let gradient = Vector3f::new(gx, gy, gz);
        let norm = gradient.norm();
        if norm > 0.0 {
            gradient / norm
        } else {
            gradient
        }
    }

    /// Separable Gaussian smoothing with sigma 0.8: three passes, one per
    /// axis, clamped to `[0, 1]`.
    ///
    /// The half-kernel border along each axis is copied through unfiltered.
    /// `kernel_size` must be odd.
    pub fn smoothed(&self, kernel_size: usize) -> Result<VoxelGrid> {
        if kernel_size == 0 || kernel_size % 2 == 0 {
            return Err(Error::InvalidData(format!(
                "smoothing kernel size must be odd, got {}",
                kernel_size
            )));
        }

        let kernel = gaussian_kernel(kernel_size, 0.8);
        let half = kernel_size / 2;
        let [nx, ny, nz] = self.dimensions;

        let mut dst = self.clone();
        for axis in 0..3 {
            let src = dst.clone();
            let extent = self.dimensions[axis];
            if extent < kernel_size {
                continue;
            }

            for x in 0..nx {
                for y in 0..ny {
                    for z in 0..nz {
                        let pos = [x, y, z][axis];
                        if pos < half || pos + half >= extent {
                            continue;
                        }

                        let mut sum = 0.0;
                        for (t, weight) in kernel.iter().enumerate() {
                            let offset = pos + t - half;
                            let value = match axis {
                                0 => src.values[offset][y][z],
                                1 => src.values[x][offset][z],
                                _ => src.values[x][y][offset],
                            };
                            sum += weight * value;
                        }

                        dst.values[x][y][z] = sum.clamp(0.0, 1.0);
                    }
                }
            }
        }

        Ok(dst)
    }
}

/// Normalized 1D Gaussian kernel of the given size (constant coefficient
/// dropped, the normalization absorbs it).
fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f32> {
    let origin = (size / 2) as f64;
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - origin;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for g in kernel.iter_mut() {
        *g /= sum;
    }

    kernel.into_iter().map(|g| g as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_value_operations() {
        let mut grid = VoxelGrid::new([3, 3, 3]);

        assert!(grid.set_value(1, 1, 1, 5.0).is_ok());
        assert_eq!(grid.get_value(1, 1, 1), Some(5.0));

        assert!(grid.set_value(3, 3, 3, 1.0).is_err());
        assert_eq!(grid.get_value(3, 3, 3), None);
    }

    #[test]
    fn test_from_values_rejects_ragged_input() {
        let ragged = vec![
            vec![vec![0.0; 2], vec![0.0; 2]],
            vec![vec![0.0; 2], vec![0.0; 3]],
        ];
        assert!(VoxelGrid::from_values(ragged).is_err());

        let rect = vec![vec![vec![0.0; 2]; 3]; 4];
        let grid = VoxelGrid::from_values(rect).unwrap();
        assert_eq!(grid.dimensions, [4, 3, 2]);
    }

    #[test]
    fn test_gradient_interior_central_difference() {
        // Linear ramp along x: gradient is (1, 0, 0) before normalization.
        let grid = VoxelGrid::from_fn([5, 3, 3], |x, _, _| x as f32);
        let n = grid.gradient_normal(2, 1, 1);
        assert!((n - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_gradient_boundary_one_sided() {
        let grid = VoxelGrid::from_fn([4, 4, 4], |x, y, z| (x + 2 * y + 3 * z) as f32);

        // At the min corner every axis uses a forward difference.
        let n = grid.gradient_normal(0, 0, 0);
        let expected = Vector3f::new(1.0, 2.0, 3.0).normalize();
        assert!((n - expected).norm() < 1e-6);

        // At the max corner every axis uses a backward difference.
        let n = grid.gradient_normal(3, 3, 3);
        assert!((n - expected).norm() < 1e-6);
    }

    #[test]
    fn test_gradient_flat_field_is_zero() {
        let grid = VoxelGrid::from_fn([3, 3, 3], |_, _, _| 0.5);
        let n = grid.gradient_normal(1, 1, 1);
        assert_eq!(n, Vector3f::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_gaussian_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(5, 0.8);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-7);
        assert!((kernel[1] - kernel[3]).abs() < 1e-7);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn test_smoothing_preserves_constant_field() {
        let grid = VoxelGrid::from_fn([9, 9, 9], |_, _, _| 0.25);
        let smoothed = grid.smoothed(5).unwrap();
        for x in 0..9 {
            for y in 0..9 {
                for z in 0..9 {
                    assert!((smoothed.values[x][y][z] - 0.25).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_smoothing_flattens_spike() {
        let mut grid = VoxelGrid::new([9, 9, 9]);
        grid.set_value(4, 4, 4, 1.0).unwrap();
        let smoothed = grid.smoothed(5).unwrap();

        let peak = smoothed.values[4][4][4];
        assert!(peak < 1.0);
        assert!(peak > 0.0);
        assert!(smoothed.values[4][4][3] > 0.0);
    }

    #[test]
    fn test_smoothing_rejects_even_kernel() {
        let grid = VoxelGrid::new([4, 4, 4]);
        assert!(grid.smoothed(4).is_err());
        assert!(grid.smoothed(0).is_err());
    }
}
