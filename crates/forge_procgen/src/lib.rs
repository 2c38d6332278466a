//! Procedural universe generation: density field synthesis, structure
//! placement and per-archetype particle synthesis.

pub mod archetype;
pub mod backend;
pub mod density;
pub mod placer;
pub mod universe;

pub use backend::{Fidelity, NoiseBackend, SmoothedRandom, default_backend};
#[cfg(feature = "coherent-noise")]
pub use backend::CoherentNoise;
pub use density::DensityField;
pub use placer::StructurePlacer;
pub use universe::{
    Universe, UniverseGenerator, generate_density_field, generate_universe, place_structures,
};
