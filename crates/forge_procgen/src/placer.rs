use forge_core::{ForgeError, ParticleSet, Result, Structure, WorldPosition};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::archetype::{self, SynthesisParams};

/// Selects spacing-constrained structure sites and synthesizes their particles.
///
/// Placement is a randomized greedy pass: candidates are shuffled with the
/// caller's random stream and accepted while they keep `min_separation` from
/// every earlier acceptance. The accepted set therefore depends on that
/// stream's state on entry. With the orchestrator that state follows the
/// field seed and the candidate subsampling draws, so changing either one
/// changes which sites win.
#[derive(Debug, Clone, Default)]
pub struct StructurePlacer {
    structures: Vec<Structure>,
    requested: usize,
}

impl StructurePlacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the placed set with a fresh selection from `candidates`.
    /// Returns fewer than `num_structures` when candidates run out or sit
    /// too close together; see `shortfall`.
    pub fn place(
        &mut self,
        candidates: &[WorldPosition],
        num_structures: usize,
        min_separation: f64,
        rng: &mut impl Rng,
    ) -> &[Structure] {
        self.structures.clear();
        self.requested = num_structures;

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.shuffle(rng);

        let min_sq = min_separation * min_separation;
        for idx in order {
            if self.structures.len() >= num_structures {
                break;
            }
            let site = candidates[idx];
            let clear = self
                .structures
                .iter()
                .all(|s| distance_sq(s.center, site) >= min_sq);
            if clear {
                let id = self.structures.len();
                self.structures.push(archetype::roll_structure(id, site, rng));
            }
        }

        if self.structures.len() < num_structures {
            log::info!(
                "Placed {} of {} requested structures ({} candidates, separation {:.2})",
                self.structures.len(),
                num_structures,
                candidates.len(),
                min_separation
            );
        } else {
            log::debug!("Placed {} structures", self.structures.len());
        }
        &self.structures
    }

    /// Accepted structures in acceptance order
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    /// How many requested structures the last `place` could not fit
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.structures.len())
    }

    /// Centers of the accepted structures
    pub fn centers(&self) -> Vec<WorldPosition> {
        self.structures.iter().map(|s| s.center).collect()
    }

    /// Particles of one placed structure, drawn from its private stream
    pub fn synthesize(&self, index: usize) -> Result<ParticleSet> {
        let structure = self
            .structures
            .get(index)
            .ok_or(ForgeError::StructureOutOfRange {
                index,
                placed: self.structures.len(),
            })?;
        Ok(synthesize_structure(structure))
    }

    /// Every structure's particles, concatenated in acceptance order
    pub fn synthesize_all(&self) -> ParticleSet {
        let sets: Vec<ParticleSet> = self
            .structures
            .par_iter()
            .map(synthesize_structure)
            .collect();
        ParticleSet::concat(sets)
    }
}

/// Structures are independent once placed; each one seeds its own stream
pub fn synthesize_structure(structure: &Structure) -> ParticleSet {
    let mut rng = ChaCha8Rng::seed_from_u64(structure.seed);
    archetype::synthesize(
        structure.archetype,
        structure.center,
        structure.particle_count,
        structure.size_scale,
        SynthesisParams::from(structure),
        &mut rng,
    )
}

pub(crate) fn distance_sq(a: WorldPosition, b: WorldPosition) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_candidates(n: usize, spread: f64, rng: &mut impl Rng) -> Vec<WorldPosition> {
        (0..n)
            .map(|_| {
                [
                    rng.gen_range(0.0..spread),
                    rng.gen_range(0.0..spread),
                    rng.gen_range(0.0..spread),
                ]
            })
            .collect()
    }

    #[test]
    fn test_place_respects_count_and_separation() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let candidates = random_candidates(20, 10.0, &mut rng);
        let mut placer = StructurePlacer::new();
        let placed = placer.place(&candidates, 5, 5.0, &mut rng).to_vec();

        assert!(!placed.is_empty());
        assert!(placed.len() <= 5);
        for (i, a) in placed.iter().enumerate() {
            assert_eq!(a.id, i);
            for b in &placed[i + 1..] {
                assert!(distance_sq(a.center, b.center).sqrt() >= 5.0);
            }
        }
    }

    #[test]
    fn test_shortfall_is_observable() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // All candidates within one separation radius: only one fits
        let candidates = vec![[0.0; 3], [0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.2, 0.2, 0.2]];
        let mut placer = StructurePlacer::new();
        placer.place(&candidates, 3, 2.0, &mut rng);

        assert_eq!(placer.len(), 1);
        assert_eq!(placer.requested(), 3);
        assert_eq!(placer.shortfall(), 2);
    }

    #[test]
    fn test_place_with_no_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut placer = StructurePlacer::new();
        assert!(placer.place(&[], 4, 1.0, &mut rng).is_empty());
        assert_eq!(placer.shortfall(), 4);
        assert!(placer.synthesize_all().is_empty());
    }

    #[test]
    fn test_synthesize_out_of_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut placer = StructurePlacer::new();
        placer.place(&[[0.0; 3], [50.0, 0.0, 0.0]], 2, 10.0, &mut rng);
        assert_eq!(placer.len(), 2);

        assert!(placer.synthesize(1).is_ok());
        assert_eq!(
            placer.synthesize(2).err(),
            Some(ForgeError::StructureOutOfRange { index: 2, placed: 2 })
        );
    }

    #[test]
    fn test_synthesize_matches_particle_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let candidates = random_candidates(30, 100.0, &mut rng);
        let mut placer = StructurePlacer::new();
        placer.place(&candidates, 4, 10.0, &mut rng);

        for (i, s) in placer.structures().iter().enumerate() {
            let set = placer.synthesize(i).unwrap();
            assert_eq!(set.len(), s.particle_count);
            assert_eq!(set.velocities().len(), s.particle_count);
        }
    }

    #[test]
    fn test_parallel_synthesis_keeps_acceptance_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let candidates = random_candidates(40, 200.0, &mut rng);
        let mut placer = StructurePlacer::new();
        placer.place(&candidates, 6, 20.0, &mut rng);

        let all = placer.synthesize_all();
        let sequential = ParticleSet::concat(
            (0..placer.len()).map(|i| placer.synthesize(i).unwrap()),
        );
        assert_eq!(all, sequential);

        let total: usize = placer.structures().iter().map(|s| s.particle_count).sum();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_same_stream_same_placement() {
        let candidates = random_candidates(25, 50.0, &mut ChaCha8Rng::seed_from_u64(5));
        let mut a = StructurePlacer::new();
        let mut b = StructurePlacer::new();
        a.place(&candidates, 5, 8.0, &mut ChaCha8Rng::seed_from_u64(6));
        b.place(&candidates, 5, 8.0, &mut ChaCha8Rng::seed_from_u64(6));
        assert_eq!(a.structures(), b.structures());
    }
}
