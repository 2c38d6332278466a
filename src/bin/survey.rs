//! Generate a batch of universes over a seed range and report what came out:
//! archetype census, particle totals, fallbacks and placement shortfalls.
//!
//! Usage: survey [count] [first_seed]

use forge_core::{Archetype, GeneratorConfig};
use forge_procgen::UniverseGenerator;

#[derive(Default)]
struct Census {
    universes: usize,
    particles: usize,
    structures: usize,
    archetypes: [usize; 3],
    fallbacks: usize,
    short_universes: usize,
    missing_structures: usize,
    degraded: usize,
}

impl Census {
    fn record(&mut self, universe: &forge_procgen::Universe) {
        self.universes += 1;
        self.particles += universe.particle_count();
        self.structures += universe.structures().len();
        for s in universe.structures() {
            let slot = Archetype::ALL.iter().position(|a| *a == s.archetype).unwrap_or(0);
            self.archetypes[slot] += 1;
        }
        if universe.used_fallback() {
            self.fallbacks += 1;
        }
        if universe.shortfall() > 0 {
            self.short_universes += 1;
            self.missing_structures += universe.shortfall();
        }
        if universe.fidelity().is_degraded() {
            self.degraded += 1;
        }
    }

    fn report(&self) {
        let pct = |n: usize, of: usize| if of == 0 { 0.0 } else { 100.0 * n as f64 / of as f64 };

        println!("=== SURVEY: {} universes ===", self.universes);
        println!(
            "Particles: {} total, {:.0} per universe",
            self.particles,
            self.particles as f64 / self.universes.max(1) as f64
        );
        println!(
            "Structures: {} placed, {:.1} per universe",
            self.structures,
            self.structures as f64 / self.universes.max(1) as f64
        );
        for (archetype, &n) in Archetype::ALL.iter().zip(&self.archetypes) {
            println!(
                "  {:<11} {:>6} ({:.1}%)",
                archetype.name(),
                n,
                pct(n, self.structures)
            );
        }
        println!(
            "Fallback universes: {} ({:.1}%)",
            self.fallbacks,
            pct(self.fallbacks, self.universes)
        );
        println!(
            "Short placements: {} universes, {} structures missing",
            self.short_universes, self.missing_structures
        );
        if self.degraded > 0 {
            println!("Degraded noise backend in {} universes", self.degraded);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let count: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(20);
    let first_seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1000);

    log::info!("Surveying {} universes from seed {}", count, first_seed);

    let mut census = Census::default();
    for seed in first_seed..first_seed.saturating_add(count) {
        let config = GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        };
        let universe = match UniverseGenerator::new(config).and_then(|g| g.generate()) {
            Ok(u) => u,
            Err(e) => {
                log::error!("Seed {}: {}", seed, e);
                continue;
            }
        };
        log::debug!(
            "Seed {}: {} particles, {} structures",
            seed,
            universe.particle_count(),
            universe.structures().len()
        );
        census.record(&universe);
    }

    census.report();
}
