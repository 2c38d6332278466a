use serde::{Deserialize, Serialize};

use crate::constants::{PLACEMENT_MIN_SEPARATION, PLACEMENT_WORLD_SCALE};
use crate::error::{ForgeError, Result};

/// Which coherent noise function drives the density field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex,
}

impl NoiseKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Perlin => "perlin",
            Self::Simplex => "simplex",
        }
    }
}

/// Multi-octave noise parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    /// Number of summed octaves
    pub octaves: u32,
    /// Amplitude multiplier between octaves
    pub persistence: f64,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Grid index to noise-space scale
    pub scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Perlin,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.05,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(ForgeError::InvalidConfig("octaves must be at least 1".into()));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ForgeError::InvalidConfig(format!(
                "noise scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.persistence.is_finite() || !self.lacunarity.is_finite() {
            return Err(ForgeError::InvalidConfig(
                "persistence and lacunarity must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Universe generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed for the whole pipeline (None = draw one from OS entropy)
    pub seed: Option<u64>,
    /// Density grid dimensions (x, y, z)
    pub volume_size: [usize; 3],
    /// Number of structures requested
    pub num_structures: usize,
    /// World-space extent of the longest grid axis
    pub world_scale: f64,
    /// Noise used to synthesize the density field
    pub noise: NoiseParams,
    /// Width of the centering gradient (normalized grid units)
    pub gradient_falloff: f64,
    /// Minimum density for a voxel to become a candidate site
    pub candidate_threshold: f64,
    /// Candidate sites extracted per requested structure
    pub candidates_per_structure: usize,
    /// Minimum structure separation as a fraction of `world_scale`
    pub separation_fraction: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            volume_size: [64, 64, 64],
            num_structures: 10,
            world_scale: 200.0,
            noise: NoiseParams::default(),
            gradient_falloff: 0.4,
            candidate_threshold: 0.5,
            candidates_per_structure: 2,
            separation_fraction: 0.15,
        }
    }
}

impl GeneratorConfig {
    /// Config for a single `generate_universe` call
    pub fn for_universe(
        seed: Option<u64>,
        volume_size: [usize; 3],
        num_structures: usize,
        world_scale: f64,
    ) -> Self {
        Self {
            seed,
            volume_size,
            num_structures,
            world_scale,
            ..Self::default()
        }
    }

    /// Config for placing structures on a caller-supplied field: a world
    /// of `PLACEMENT_WORLD_SCALE` with `PLACEMENT_MIN_SEPARATION` spacing
    pub fn for_placement(seed: Option<u64>) -> Self {
        Self {
            seed,
            world_scale: PLACEMENT_WORLD_SCALE,
            separation_fraction: PLACEMENT_MIN_SEPARATION / PLACEMENT_WORLD_SCALE,
            ..Self::default()
        }
    }

    pub fn min_separation(&self) -> f64 {
        self.world_scale * self.separation_fraction
    }

    pub fn max_candidates(&self) -> usize {
        self.num_structures.saturating_mul(self.candidates_per_structure)
    }

    pub fn validate(&self) -> Result<()> {
        if self.volume_size.iter().any(|&s| s == 0) {
            return Err(ForgeError::InvalidConfig(format!(
                "volume dimensions must be non-zero, got {:?}",
                self.volume_size
            )));
        }
        if self.num_structures == 0 {
            return Err(ForgeError::InvalidConfig(
                "num_structures must be at least 1".into(),
            ));
        }
        if !(self.world_scale.is_finite() && self.world_scale > 0.0) {
            return Err(ForgeError::InvalidConfig(format!(
                "world_scale must be positive, got {}",
                self.world_scale
            )));
        }
        if !(self.gradient_falloff.is_finite() && self.gradient_falloff > 0.0) {
            return Err(ForgeError::InvalidConfig(format!(
                "gradient_falloff must be positive, got {}",
                self.gradient_falloff
            )));
        }
        if !(0.0..=1.0).contains(&self.candidate_threshold) {
            return Err(ForgeError::InvalidConfig(format!(
                "candidate_threshold must lie in [0, 1], got {}",
                self.candidate_threshold
            )));
        }
        if self.candidates_per_structure == 0 {
            return Err(ForgeError::InvalidConfig(
                "candidates_per_structure must be at least 1".into(),
            ));
        }
        if !(self.separation_fraction.is_finite() && self.separation_fraction >= 0.0) {
            return Err(ForgeError::InvalidConfig(format!(
                "separation_fraction must be non-negative, got {}",
                self.separation_fraction
            )));
        }
        self.noise.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
        assert_eq!(GeneratorConfig::default().min_separation(), 30.0);
    }

    #[test]
    fn test_rejects_degenerate_values() {
        let zero_axis = GeneratorConfig {
            volume_size: [16, 0, 16],
            ..GeneratorConfig::default()
        };
        assert!(matches!(zero_axis.validate(), Err(ForgeError::InvalidConfig(_))));

        let no_structures = GeneratorConfig::for_universe(Some(1), [8, 8, 8], 0, 50.0);
        assert!(no_structures.validate().is_err());

        let bad_scale = GeneratorConfig::for_universe(Some(1), [8, 8, 8], 2, f64::NAN);
        assert!(bad_scale.validate().is_err());

        let mut no_octaves = GeneratorConfig::default();
        no_octaves.noise.octaves = 0;
        assert!(no_octaves.validate().is_err());
    }

    #[test]
    fn test_placement_config_spacing() {
        let config = GeneratorConfig::for_placement(Some(3));
        assert!(config.validate().is_ok());
        assert_eq!(config.world_scale, 100.0);
        assert!((config.min_separation() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_voxel_volume_is_valid() {
        let tiny = GeneratorConfig::for_universe(Some(7), [1, 1, 1], 3, 10.0);
        assert!(tiny.validate().is_ok());
        assert_eq!(tiny.max_candidates(), 6);
    }
}
