use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// Voxel index triple (i, j, k)
pub type GridIndex = [usize; 3];

/// A voxel whose density exceeded the extraction threshold
pub type CandidateSite = GridIndex;

/// Position in world coordinates, centered on the universe core
pub type WorldPosition = [f64; 3];

/// Dense 3D grid of density values in [0, 1].
/// Values are stored x-major: index (i, j, k) lives at `(i * sy + j) * sz + k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGrid {
    dims: [usize; 3],
    values: Vec<f32>,
}

impl VolumeGrid {
    /// Zero-filled grid
    pub fn zeros(dims: [usize; 3]) -> Self {
        Self {
            dims,
            values: vec![0.0; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Wrap existing values, checking shape and range
    pub fn from_values(dims: [usize; 3], values: Vec<f32>) -> Result<Self> {
        let len = values.len();
        if dims[0] * dims[1] * dims[2] != len {
            return Err(ForgeError::GridShapeMismatch { dims, len });
        }
        if let Some(&value) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(ForgeError::DensityOutOfRange { value });
        }
        Ok(Self { dims, values })
    }

    /// Build a grid by evaluating `f` at every voxel
    pub fn from_fn(dims: [usize; 3], mut f: impl FnMut(GridIndex) -> f32) -> Self {
        let mut grid = Self::zeros(dims);
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    let idx = grid.flat_index([i, j, k]);
                    grid.values[idx] = f([i, j, k]).clamp(0.0, 1.0);
                }
            }
        }
        grid
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Longest axis length
    pub fn max_dim(&self) -> usize {
        self.dims.iter().copied().max().unwrap_or(0)
    }

    /// Number of values in one x-slab (fixed i)
    pub fn slab_len(&self) -> usize {
        self.dims[1] * self.dims[2]
    }

    #[inline]
    pub fn flat_index(&self, [i, j, k]: GridIndex) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    #[inline]
    pub fn grid_index(&self, flat: usize) -> GridIndex {
        let k = flat % self.dims[2];
        let j = (flat / self.dims[2]) % self.dims[1];
        let i = flat / self.slab_len();
        [i, j, k]
    }

    pub fn get(&self, index: GridIndex) -> Option<f32> {
        if index.iter().zip(self.dims.iter()).any(|(&v, &d)| v >= d) {
            return None;
        }
        Some(self.values[self.flat_index(index)])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable access for in-place shaping. Callers keep values in [0, 1].
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Grid center in index space (integer midpoint of each axis)
    pub fn center(&self) -> [f64; 3] {
        [
            (self.dims[0] / 2) as f64,
            (self.dims[1] / 2) as f64,
            (self.dims[2] / 2) as f64,
        ]
    }

    pub fn min(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().map(|&v| v as f64).sum::<f64>() as f32 / self.values.len() as f32
    }

    /// Binary mask: 1.0 where density exceeds `threshold`, else 0.0
    pub fn threshold_mask(&self, threshold: f32) -> Self {
        Self {
            dims: self.dims,
            values: self
                .values
                .iter()
                .map(|&v| if v > threshold { 1.0 } else { 0.0 })
                .collect(),
        }
    }

    /// Every voxel index whose density exceeds `threshold`, in storage order
    pub fn indices_above(&self, threshold: f32) -> Vec<GridIndex> {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > threshold)
            .map(|(flat, _)| self.grid_index(flat))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let grid = VolumeGrid::zeros([3, 4, 5]);
        for flat in 0..grid.len() {
            assert_eq!(grid.flat_index(grid.grid_index(flat)), flat);
        }
        assert_eq!(grid.flat_index([2, 3, 4]), grid.len() - 1);
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert_eq!(
            VolumeGrid::from_values([2, 2, 2], vec![0.5; 7]),
            Err(ForgeError::GridShapeMismatch { dims: [2, 2, 2], len: 7 })
        );
        let mut values = vec![0.5; 8];
        values[3] = 1.5;
        assert_eq!(
            VolumeGrid::from_values([2, 2, 2], values),
            Err(ForgeError::DensityOutOfRange { value: 1.5 })
        );
    }

    #[test]
    fn test_threshold_mask_and_indices() {
        let grid = VolumeGrid::from_fn([4, 1, 1], |[i, _, _]| i as f32 * 0.25);
        let mask = grid.threshold_mask(0.4);
        assert_eq!(mask.values(), &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(grid.indices_above(0.4), vec![[2, 0, 0], [3, 0, 0]]);
    }

    #[test]
    fn test_center_and_stats() {
        let grid = VolumeGrid::from_fn([5, 4, 1], |_| 0.5);
        assert_eq!(grid.center(), [2.0, 2.0, 0.0]);
        assert_eq!(grid.max_dim(), 5);
        assert_eq!(grid.min(), 0.5);
        assert_eq!(grid.max(), 0.5);
        assert!((grid.mean() - 0.5).abs() < 1e-6);
        assert_eq!(grid.get([5, 0, 0]), None);
    }
}
