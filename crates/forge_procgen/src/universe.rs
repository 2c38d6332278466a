use forge_core::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use super::backend::Fidelity;
use super::density::DensityField;
use super::placer::StructurePlacer;

/// Result of one generation run: the flat particle arrays plus what it
/// took to build them.
#[derive(Debug, Clone)]
pub struct Universe {
    particles: ParticleSet,
    structures: Vec<Structure>,
    fidelity: Fidelity,
    used_fallback: bool,
    seed: u64,
    requested: usize,
}

impl Universe {
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Accepted structures in acceptance order (empty after fallback)
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn fidelity(&self) -> Fidelity {
        self.fidelity
    }

    /// True when no site qualified and particles came from the uniform fallback
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Seed the run actually used (drawn from entropy when none was given)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Requested structures that were not placed
    pub fn shortfall(&self) -> usize {
        if self.used_fallback {
            return 0;
        }
        self.requested.saturating_sub(self.structures.len())
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        self.particles.positions()
    }

    pub fn velocities(&self) -> &[[f32; 3]] {
        self.particles.velocities()
    }

    pub fn positions_flat(&self) -> &[f32] {
        self.particles.positions_flat()
    }

    pub fn velocities_flat(&self) -> &[f32] {
        self.particles.velocities_flat()
    }

    pub fn category_codes(&self) -> Vec<u32> {
        self.particles.category_codes()
    }

    /// Range of particle indices belonging to structure `index`
    pub fn structure_span(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let s = self.structures.get(index)?;
        let start: usize = self.structures[..index].iter().map(|s| s.particle_count).sum();
        Some(start..start + s.particle_count)
    }

    /// (positions, velocities, category codes)
    pub fn into_arrays(self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<u32>) {
        let (positions, velocities, categories) = self.particles.into_parts();
        let codes = categories.iter().map(ParticleCategory::code).collect();
        (positions, velocities, codes)
    }
}

/// Runs the full pipeline: field, gradient, candidates, placement, synthesis
#[derive(Debug, Clone)]
pub struct UniverseGenerator {
    config: GeneratorConfig,
}

impl UniverseGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn effective_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    /// Build a universe. Never empty: when no structure can be placed the
    /// uniform fallback takes over.
    pub fn generate(&self) -> Result<Universe> {
        let cfg = &self.config;
        let seed = self.effective_seed();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut field = DensityField::new(cfg.volume_size);
        let fidelity = field.fidelity();
        let center = field.generate(seed, &cfg.noise).center();
        field.add_gradient(center, cfg.gradient_falloff)?;
        let sites = field.get_high_density_positions(
            cfg.candidate_threshold as f32,
            cfg.max_candidates(),
            &mut rng,
        )?;
        let candidates = field.normalize_positions(&sites, cfg.world_scale);
        log::info!("{} candidate sites", candidates.len());

        let mut placer = StructurePlacer::new();
        placer.place(
            &candidates,
            cfg.num_structures,
            cfg.min_separation(),
            &mut rng,
        );

        if placer.is_empty() {
            log::warn!(
                "No suitable structure sites found; using uniform random placement for {} particles",
                cfg.num_structures * FALLBACK_PARTICLES_PER_STRUCTURE
            );
            let particles = fallback_particles(cfg.num_structures, cfg.world_scale, &mut rng);
            return Ok(Universe {
                particles,
                structures: Vec::new(),
                fidelity,
                used_fallback: true,
                seed,
                requested: cfg.num_structures,
            });
        }

        let particles = placer.synthesize_all();
        log::info!(
            "Universe generated: {} particles in {} structures",
            particles.len(),
            placer.len()
        );
        Ok(Universe {
            particles,
            structures: placer.structures().to_vec(),
            fidelity,
            used_fallback: false,
            seed,
            requested: cfg.num_structures,
        })
    }

    /// Raw noise field only, without the centering gradient
    pub fn generate_density_field(
        &self,
        volume_size: [usize; 3],
        seed: Option<u64>,
    ) -> Result<VolumeGrid> {
        check_volume(volume_size)?;
        let seed = seed.unwrap_or_else(rand::random);
        let mut field = DensityField::new(volume_size);
        field.generate(seed, &self.config.noise);
        field.into_grid()
    }

    /// Place structures against a caller-supplied field and return their
    /// world positions. Uses this generator's world scale, separation and
    /// candidate budget.
    pub fn place_structures(
        &self,
        field: VolumeGrid,
        threshold: f32,
        num_structures: usize,
    ) -> Result<Vec<WorldPosition>> {
        let cfg = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(self.effective_seed());
        let field = DensityField::from_grid(field);

        let sites = field.get_high_density_positions(
            threshold,
            num_structures.saturating_mul(cfg.candidates_per_structure),
            &mut rng,
        )?;
        let candidates = field.normalize_positions(&sites, cfg.world_scale);

        let mut placer = StructurePlacer::new();
        placer.place(&candidates, num_structures, cfg.min_separation(), &mut rng);
        Ok(placer.centers())
    }
}

/// One-shot pipeline with the default tuning
pub fn generate_universe(
    seed: Option<u64>,
    volume_size: [usize; 3],
    num_structures: usize,
    world_scale: f64,
) -> Result<Universe> {
    let config = GeneratorConfig::for_universe(seed, volume_size, num_structures, world_scale);
    UniverseGenerator::new(config)?.generate()
}

/// Noise field with the default noise parameters
pub fn generate_density_field(volume_size: [usize; 3], seed: Option<u64>) -> Result<VolumeGrid> {
    UniverseGenerator::new(GeneratorConfig::default())?.generate_density_field(volume_size, seed)
}

/// Structure centers for a caller-supplied field, in a world of
/// `PLACEMENT_WORLD_SCALE` units spaced at least `PLACEMENT_MIN_SEPARATION` apart
pub fn place_structures(
    field: VolumeGrid,
    threshold: f32,
    num_structures: usize,
) -> Result<Vec<WorldPosition>> {
    UniverseGenerator::new(GeneratorConfig::for_placement(None))?.place_structures(
        field,
        threshold,
        num_structures,
    )
}

fn check_volume(volume_size: [usize; 3]) -> Result<()> {
    if volume_size.iter().any(|&s| s == 0) {
        return Err(ForgeError::InvalidConfig(format!(
            "volume dimensions must be non-zero, got {:?}",
            volume_size
        )));
    }
    Ok(())
}

/// Uniform cube of side `world_scale` with Gaussian velocities
fn fallback_particles(num_structures: usize, world_scale: f64, rng: &mut impl Rng) -> ParticleSet {
    let count = num_structures * FALLBACK_PARTICLES_PER_STRUCTURE;
    let half = world_scale / 2.0;
    let mut set = ParticleSet::with_capacity(count);
    for _ in 0..count {
        let pos = [
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
        ];
        let vel = [0; 3].map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            z * FALLBACK_VELOCITY_SIGMA
        });
        set.push(pos, vel, ParticleCategory::Star);
    }
    set
}
