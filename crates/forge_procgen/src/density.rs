use forge_core::{
    CandidateSite, ForgeError, NoiseParams, Result, VolumeGrid, WorldPosition,
};
use rand::Rng;
use rayon::prelude::*;

use super::backend::{Fidelity, NoiseBackend, default_backend};

/// 3D density field: a grid of values in [0, 1] indicating where structures
/// are likely to form. The grid exists only after `generate` (or when built
/// from a caller-supplied grid).
pub struct DensityField {
    dims: [usize; 3],
    field: Option<VolumeGrid>,
    backend: Box<dyn NoiseBackend>,
}

impl DensityField {
    /// Field using the best backend compiled into this build
    pub fn new(dims: [usize; 3]) -> Self {
        Self::with_backend(dims, default_backend())
    }

    pub fn with_backend(dims: [usize; 3], backend: Box<dyn NoiseBackend>) -> Self {
        Self {
            dims,
            field: None,
            backend,
        }
    }

    /// Wrap an existing grid (no backend is ever invoked on it)
    pub fn from_grid(grid: VolumeGrid) -> Self {
        Self {
            dims: grid.dims(),
            field: Some(grid),
            backend: default_backend(),
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Whether generated fields carry coherent-noise statistics
    pub fn fidelity(&self) -> Fidelity {
        self.backend.fidelity()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_generated(&self) -> bool {
        self.field.is_some()
    }

    /// Synthesize the grid. Replaces any previous field.
    pub fn generate(&mut self, seed: u64, params: &NoiseParams) -> &VolumeGrid {
        log::info!(
            "Generating density field {:?} ({} backend, {} noise, {} octaves, seed {})",
            self.dims,
            self.backend.name(),
            params.kind.name(),
            params.octaves,
            seed
        );
        if self.backend.fidelity().is_degraded() {
            log::warn!("Density field uses the degraded smoothed-random backend");
        }

        let mut grid = VolumeGrid::zeros(self.dims);
        self.backend.fill(&mut grid, seed, params);
        self.field.insert(grid)
    }

    pub fn field(&self) -> Result<&VolumeGrid> {
        self.field.as_ref().ok_or(ForgeError::FieldNotGenerated)
    }

    pub fn into_grid(self) -> Result<VolumeGrid> {
        self.field.ok_or(ForgeError::FieldNotGenerated)
    }

    /// Binary mask of voxels above `threshold`
    pub fn apply_threshold(&self, threshold: f32) -> Result<VolumeGrid> {
        Ok(self.field()?.threshold_mask(threshold))
    }

    /// Multiply the field by `exp(-d² / (2 falloff²))`, where `d` is the
    /// distance from `center` (grid coordinates) normalized per axis by the
    /// grid extent. Values stay in [0, 1] because the factor is in (0, 1].
    /// `falloff` must be finite and positive.
    pub fn add_gradient(&mut self, center: [f64; 3], falloff: f64) -> Result<()> {
        let grid = self.field.as_mut().ok_or(ForgeError::FieldNotGenerated)?;
        if !(falloff.is_finite() && falloff > 0.0) {
            return Err(ForgeError::InvalidConfig(format!(
                "gradient falloff must be positive, got {}",
                falloff
            )));
        }
        let [sx, sy, sz] = grid.dims();
        if grid.is_empty() {
            return Ok(());
        }
        let denom = 2.0 * falloff * falloff;
        let slab_len = grid.slab_len();

        grid.values_mut()
            .par_chunks_mut(slab_len)
            .enumerate()
            .for_each(|(i, slab)| {
                let dx = (i as f64 - center[0]) / sx as f64;
                for j in 0..sy {
                    let dy = (j as f64 - center[1]) / sy as f64;
                    for k in 0..sz {
                        let dz = (k as f64 - center[2]) / sz as f64;
                        let d2 = dx * dx + dy * dy + dz * dz;
                        slab[j * sz + k] *= (-d2 / denom).exp() as f32;
                    }
                }
            });
        Ok(())
    }

    /// Every voxel with density strictly above `threshold`; uniformly
    /// subsampled without replacement down to `max_positions` when there are
    /// more. An empty result is not an error.
    pub fn get_high_density_positions(
        &self,
        threshold: f32,
        max_positions: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<CandidateSite>> {
        let sites = self.field()?.indices_above(threshold);
        if sites.len() <= max_positions {
            log::debug!("{} candidate sites above {:.2}", sites.len(), threshold);
            return Ok(sites);
        }

        log::debug!(
            "{} candidate sites above {:.2}, sampling {}",
            sites.len(),
            threshold,
            max_positions
        );
        Ok(rand::seq::index::sample(rng, sites.len(), max_positions)
            .into_iter()
            .map(|i| sites[i])
            .collect())
    }

    /// Map grid indices to world space: center on the grid midpoint, then
    /// scale so the longest axis spans `world_scale`.
    pub fn normalize_positions(
        &self,
        sites: &[CandidateSite],
        world_scale: f64,
    ) -> Vec<WorldPosition> {
        let max_dim = self.dims.iter().copied().max().unwrap_or(1).max(1) as f64;
        let factor = world_scale / max_dim;
        let half = self.dims.map(|d| d as f64 / 2.0);

        sites
            .iter()
            .map(|site| {
                [
                    (site[0] as f64 - half[0]) * factor,
                    (site[1] as f64 - half[1]) * factor,
                    (site[2] as f64 - half[2]) * factor,
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SmoothedRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ramp_field() -> DensityField {
        // density rises along x: 0.0, 0.25, 0.5, 0.75
        DensityField::from_grid(VolumeGrid::from_fn([4, 2, 2], |[i, _, _]| i as f32 * 0.25))
    }

    #[test]
    fn test_operations_require_generated_field() {
        let mut field = DensityField::new([8, 8, 8]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(!field.is_generated());
        assert_eq!(field.field().err(), Some(ForgeError::FieldNotGenerated));
        assert_eq!(field.add_gradient([4.0; 3], 0.4), Err(ForgeError::FieldNotGenerated));
        assert_eq!(field.apply_threshold(0.5).err(), Some(ForgeError::FieldNotGenerated));
        assert_eq!(
            field.get_high_density_positions(0.5, 10, &mut rng).err(),
            Some(ForgeError::FieldNotGenerated)
        );
    }

    #[test]
    fn test_generate_shape_and_range() {
        let mut field = DensityField::new([32, 32, 32]);
        let grid = field.generate(42, &NoiseParams::default());
        assert_eq!(grid.dims(), [32, 32, 32]);
        assert!(grid.min() >= 0.0);
        assert!(grid.max() <= 1.0);
    }

    #[test]
    fn test_degraded_backend_is_visible() {
        let mut field =
            DensityField::with_backend([8, 8, 8], Box::new(SmoothedRandom::default()));
        assert_eq!(field.fidelity(), Fidelity::Degraded);
        assert_eq!(field.backend_name(), "smoothed-random");
        let grid = field.generate(7, &NoiseParams::default());
        assert!(grid.min() >= 0.0 && grid.max() <= 1.0);
    }

    #[test]
    fn test_gradient_peaks_at_center_and_stays_in_range() {
        let mut field = DensityField::from_grid(VolumeGrid::from_fn([9, 9, 9], |_| 1.0));
        field.add_gradient([4.0, 4.0, 4.0], 0.4).unwrap();
        let grid = field.field().unwrap();

        assert_eq!(grid.get([4, 4, 4]), Some(1.0));
        let corner = grid.get([0, 0, 0]).unwrap();
        assert!(corner > 0.0 && corner < 1.0);
        assert!(grid.get([2, 4, 4]).unwrap() > grid.get([0, 4, 4]).unwrap());
        assert!(grid.min() >= 0.0 && grid.max() <= 1.0);
    }

    #[test]
    fn test_gradient_rejects_degenerate_falloff() {
        let mut field = DensityField::from_grid(VolumeGrid::from_fn([3, 3, 3], |_| 0.8));
        for falloff in [0.0, -0.4, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                field.add_gradient([1.0, 1.0, 1.0], falloff),
                Err(ForgeError::InvalidConfig(_))
            ));
        }
        // Rejected calls leave the field untouched
        let grid = field.field().unwrap();
        assert!(grid.values().iter().all(|&v| v == 0.8));
    }

    #[test]
    fn test_high_density_positions_threshold_and_cap() {
        let field = ramp_field();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // x = 2 and x = 3 qualify: 2 * (2 * 2) voxels
        let all = field.get_high_density_positions(0.4, 100, &mut rng).unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|s| s[0] >= 2));

        let capped = field.get_high_density_positions(0.4, 3, &mut rng).unwrap();
        assert_eq!(capped.len(), 3);
        let mut unique = capped.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3, "sampled without replacement");

        let none = field.get_high_density_positions(0.9, 10, &mut rng).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_normalize_positions_centers_and_scales() {
        let field = DensityField::new([10, 20, 10]);
        let world = field.normalize_positions(&[[5, 10, 5], [0, 0, 0], [10, 20, 10]], 100.0);
        assert_eq!(world[0], [0.0, 0.0, 0.0]);
        assert_eq!(world[1], [-25.0, -50.0, -25.0]);
        assert_eq!(world[2], [25.0, 50.0, 25.0]);
        assert!(field.normalize_positions(&[], 100.0).is_empty());
    }

    #[test]
    fn test_apply_threshold_mask() {
        let mask = ramp_field().apply_threshold(0.3).unwrap();
        assert_eq!(mask.indices_above(0.5).len(), 8);
        assert!(mask.values().iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
