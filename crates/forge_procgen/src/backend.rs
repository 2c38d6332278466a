use forge_core::{NoiseParams, SMOOTHING_SIGMA, SMOOTHING_TRUNCATE, VolumeGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// How faithfully a backend reproduces coherent noise statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fidelity {
    /// Multi-octave coherent noise
    Coherent,
    /// Smoothed independent-random stand-in; sites cluster differently
    Degraded,
}

impl Fidelity {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded)
    }
}

/// Strategy that fills a density grid with values in [0, 1].
/// Chosen once when a `DensityField` is built.
pub trait NoiseBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn fidelity(&self) -> Fidelity;

    /// Overwrite every voxel of `grid`. Deterministic for a fixed seed.
    fn fill(&self, grid: &mut VolumeGrid, seed: u64, params: &NoiseParams);
}

/// Best backend compiled into this build
pub fn default_backend() -> Box<dyn NoiseBackend> {
    #[cfg(feature = "coherent-noise")]
    {
        Box::new(CoherentNoise)
    }
    #[cfg(not(feature = "coherent-noise"))]
    {
        log::warn!(
            "Coherent noise backend not available; density fields fall back to smoothed random values"
        );
        Box::new(SmoothedRandom::default())
    }
}

/// Fold a 64-bit seed into the 32 bits the noise generators take
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(feature = "coherent-noise")]
pub use coherent::CoherentNoise;

#[cfg(feature = "coherent-noise")]
mod coherent {
    use super::{Fidelity, NoiseBackend, fold_seed};
    use forge_core::{NoiseKind, NoiseParams, VolumeGrid};
    use noise::{NoiseFn, OpenSimplex, Perlin};
    use rayon::prelude::*;

    /// Fractal (multi-octave) Perlin or simplex noise
    #[derive(Debug, Clone, Copy, Default)]
    pub struct CoherentNoise;

    enum Source {
        Perlin(Perlin),
        Simplex(OpenSimplex),
    }

    impl Source {
        fn new(kind: NoiseKind, seed: u32) -> Self {
            match kind {
                NoiseKind::Perlin => Self::Perlin(Perlin::new(seed)),
                NoiseKind::Simplex => Self::Simplex(OpenSimplex::new(seed)),
            }
        }

        fn sample(&self, p: [f64; 3]) -> f64 {
            match self {
                Self::Perlin(n) => n.get(p),
                Self::Simplex(n) => n.get(p),
            }
        }

        /// Octave sum normalized by total amplitude, mapped from [-1, 1] to [0, 1]
        fn fbm(&self, p: [f64; 3], params: &NoiseParams) -> f32 {
            let (total, norm, _, _) = (0..params.octaves).fold(
                (0.0, 0.0, 1.0f64, 1.0f64),
                |(total, norm, amp, freq), _| {
                    let q = [p[0] * freq, p[1] * freq, p[2] * freq];
                    (
                        total + self.sample(q) * amp,
                        norm + amp.abs(),
                        amp * params.persistence,
                        freq * params.lacunarity,
                    )
                },
            );
            let v = if norm > 0.0 { total / norm } else { 0.0 };
            (((v + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
        }
    }

    impl NoiseBackend for CoherentNoise {
        fn name(&self) -> &'static str {
            "coherent"
        }

        fn fidelity(&self) -> Fidelity {
            Fidelity::Coherent
        }

        fn fill(&self, grid: &mut VolumeGrid, seed: u64, params: &NoiseParams) {
            if grid.is_empty() {
                return;
            }
            let source = Source::new(params.kind, fold_seed(seed));
            let [_, sy, sz] = grid.dims();
            let scale = params.scale;

            // One x-slab per task; voxels are independent
            let slab_len = grid.slab_len();
            grid.values_mut()
                .par_chunks_mut(slab_len)
                .enumerate()
                .for_each(|(i, slab)| {
                    for j in 0..sy {
                        for k in 0..sz {
                            let p = [i as f64 * scale, j as f64 * scale, k as f64 * scale];
                            slab[j * sz + k] = source.fbm(p, params);
                        }
                    }
                });
        }
    }
}

/// Uniform random voxels blurred by a separable Gaussian.
/// Ignores the noise kind and octave parameters.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedRandom {
    pub sigma: f64,
}

impl Default for SmoothedRandom {
    fn default() -> Self {
        Self {
            sigma: SMOOTHING_SIGMA,
        }
    }
}

impl NoiseBackend for SmoothedRandom {
    fn name(&self) -> &'static str {
        "smoothed-random"
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Degraded
    }

    fn fill(&self, grid: &mut VolumeGrid, seed: u64, _params: &NoiseParams) {
        if grid.is_empty() {
            return;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for v in grid.values_mut() {
            *v = rng.gen_range(0.0..1.0f32);
        }

        let kernel = gaussian_kernel(self.sigma);
        for axis in 0..3 {
            blur_axis(grid, axis, &kernel);
        }
        for v in grid.values_mut() {
            *v = v.clamp(0.0, 1.0);
        }
    }
}

/// Normalized 1D Gaussian weights, centered at `kernel.len() / 2`.
/// A non-finite or non-positive sigma yields the identity kernel.
fn gaussian_kernel(sigma: f64) -> Vec<f32> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return vec![1.0];
    }
    let radius = (SMOOTHING_TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-((x * x) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Mirror an out-of-range index back into `0..n` (d c b a | a b c d)
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m >= n { period - 1 - m } else { m }) as usize
}

fn blur_axis(grid: &mut VolumeGrid, axis: usize, kernel: &[f32]) {
    let dims = grid.dims();
    let stride = match axis {
        0 => dims[1] * dims[2],
        1 => dims[2],
        _ => 1,
    };
    let n = dims[axis];
    let radius = (kernel.len() / 2) as isize;
    let src = grid.values().to_vec();

    grid.values_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(flat, out)| {
            let pos = (flat / stride) % n;
            let base = flat - pos * stride;
            *out = kernel
                .iter()
                .enumerate()
                .map(|(w, &weight)| {
                    let along = reflect(pos as isize + w as isize - radius, n);
                    src[base + along * stride] * weight
                })
                .sum();
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_boundary() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(3, 1), 0);
        assert_eq!(reflect(2, 4), 2);
    }

    #[test]
    fn test_kernel_is_normalized() {
        let kernel = gaussian_kernel(SMOOTHING_SIGMA);
        assert_eq!(kernel.len(), 17);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(kernel[8] > kernel[0]);
    }

    #[test]
    fn test_smoothed_random_range_and_determinism() {
        let backend = SmoothedRandom::default();
        let params = NoiseParams::default();
        let mut a = VolumeGrid::zeros([12, 10, 8]);
        let mut b = VolumeGrid::zeros([12, 10, 8]);
        backend.fill(&mut a, 99, &params);
        backend.fill(&mut b, 99, &params);

        assert_eq!(a, b);
        assert!(a.min() >= 0.0 && a.max() <= 1.0);
        // Blurring pulls uniform noise toward its mean
        assert!(a.max() - a.min() < 0.8, "spread {}", a.max() - a.min());
        assert_eq!(backend.fidelity(), Fidelity::Degraded);
    }

    #[test]
    fn test_degenerate_sigma_skips_blur() {
        for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(gaussian_kernel(sigma), vec![1.0]);

            let mut grid = VolumeGrid::zeros([6, 6, 6]);
            SmoothedRandom { sigma }.fill(&mut grid, 8, &NoiseParams::default());
            assert!(
                grid.values().iter().all(|v| (0.0..=1.0).contains(v)),
                "sigma {}",
                sigma
            );
        }
    }

    #[test]
    fn test_smoothed_random_single_voxel() {
        let mut grid = VolumeGrid::zeros([1, 1, 1]);
        SmoothedRandom::default().fill(&mut grid, 3, &NoiseParams::default());
        let v = grid.values()[0];
        assert!((0.0..=1.0).contains(&v));
    }

    #[cfg(feature = "coherent-noise")]
    #[test]
    fn test_coherent_noise_range_and_determinism() {
        let params = NoiseParams::default();
        let mut a = VolumeGrid::zeros([16, 16, 16]);
        let mut b = VolumeGrid::zeros([16, 16, 16]);
        CoherentNoise.fill(&mut a, 42, &params);
        CoherentNoise.fill(&mut b, 42, &params);

        assert_eq!(a, b);
        assert!(a.min() >= 0.0 && a.max() <= 1.0);
        assert_eq!(CoherentNoise.fidelity(), Fidelity::Coherent);
    }

    #[cfg(feature = "coherent-noise")]
    #[test]
    fn test_coherent_noise_kinds_differ() {
        let perlin = NoiseParams::default();
        let simplex = NoiseParams {
            kind: forge_core::NoiseKind::Simplex,
            ..perlin
        };
        let mut a = VolumeGrid::zeros([8, 8, 8]);
        let mut b = VolumeGrid::zeros([8, 8, 8]);
        CoherentNoise.fill(&mut a, 5, &perlin);
        CoherentNoise.fill(&mut b, 5, &simplex);
        assert_ne!(a, b);
    }
}
