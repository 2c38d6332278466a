// Generation constants (world units)
// Distances are in world units: the whole universe spans `world_scale`
// units along its longest grid axis, and a structure spans a few
// `size_scale` units around its center.

/// Categorical weights for archetype selection, in `Archetype::ALL` order
pub const ARCHETYPE_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// Particle count ranges per archetype (half-open)
pub const SPIRAL_PARTICLES: std::ops::Range<usize> = 1000..5000;
pub const ELLIPTICAL_PARTICLES: std::ops::Range<usize> = 500..3000;
pub const IRREGULAR_PARTICLES: std::ops::Range<usize> = 200..1000;

/// Rotation speed range for spiral structures
pub const SPIRAL_ROTATION: std::ops::Range<f64> = 0.5..2.0;

/// Linear size range of a structure
pub const SIZE_SCALE: std::ops::Range<f64> = 3.0..10.0;

/// Lower bounds of the near-white color tint (upper bound is 1.0)
pub const TINT_MIN: [f32; 3] = [0.8, 0.8, 0.9];

/// Fraction of a spiral's particles that form the central bulge
pub const BULGE_FRACTION: f64 = 0.3;

/// Radius floor for the Keplerian speed law (avoids the r -> 0 blow-up)
pub const ORBIT_SOFTENING: f64 = 0.1;

/// Particles generated per requested structure on the fallback path
pub const FALLBACK_PARTICLES_PER_STRUCTURE: usize = 1000;

/// Velocity dispersion of fallback particles
pub const FALLBACK_VELOCITY_SIGMA: f64 = 0.5;

/// Gaussian blur width (in voxels) for the smoothed-random backend
pub const SMOOTHING_SIGMA: f64 = 2.0;

/// Blur kernel is truncated at this many sigmas
pub const SMOOTHING_TRUNCATE: f64 = 4.0;

/// World extent used when placing structures on a caller-supplied field
pub const PLACEMENT_WORLD_SCALE: f64 = 100.0;

/// Minimum center distance when placing on a caller-supplied field
pub const PLACEMENT_MIN_SEPARATION: f64 = 10.0;
