use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::constants::*;
use crate::grid::WorldPosition;

/// Structural archetype of a galaxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Rotating disk with a central bulge and logarithmic arms
    Spiral,
    /// Spherically symmetric, radially concentrated, no coherent rotation
    Elliptical,
    /// Clumpy and asymmetric with chaotic velocities
    Irregular,
}

impl Archetype {
    /// All archetypes, in the order of `ARCHETYPE_WEIGHTS`
    pub const ALL: [Archetype; 3] = [Self::Spiral, Self::Elliptical, Self::Irregular];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spiral => "Spiral",
            Self::Elliptical => "Elliptical",
            Self::Irregular => "Irregular",
        }
    }

    pub fn particle_range(&self) -> Range<usize> {
        match self {
            Self::Spiral => SPIRAL_PARTICLES,
            Self::Elliptical => ELLIPTICAL_PARTICLES,
            Self::Irregular => IRREGULAR_PARTICLES,
        }
    }

    pub fn rotates(&self) -> bool {
        matches!(self, Self::Spiral)
    }
}

/// A placed galaxy. Created once by the placer, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Acceptance ordinal
    pub id: usize,
    /// World-space center
    pub center: WorldPosition,
    pub archetype: Archetype,
    /// Number of particles synthesized for this structure
    pub particle_count: usize,
    /// Linear size in world units
    pub size_scale: f64,
    /// Zero unless the archetype rotates
    pub rotation_speed: f64,
    /// Unit rotation axis
    pub orientation: [f64; 3],
    /// Near-white RGB multiplier for rendering
    pub color_tint: [f32; 3],
    /// Seed of this structure's private random stream
    pub seed: u64,
}

/// Particle category codes handed to renderers
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleCategory {
    Star = 0,
    Planet = 1,
    BlackHole = 2,
}

impl ParticleCategory {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Star),
            1 => Some(Self::Planet),
            2 => Some(Self::BlackHole),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Planet => "planet",
            Self::BlackHole => "black hole",
        }
    }

    /// Get the color for rendering this category [r, g, b]
    pub fn color(&self) -> [f32; 3] {
        match self {
            Self::Star => [1.0, 1.0, 0.8],      // Warm white
            Self::Planet => [0.5, 0.7, 1.0],    // Light blue
            Self::BlackHole => [1.0, 0.2, 1.0], // Magenta
        }
    }
}

/// Parallel particle arrays: positions (N x 3), velocities (N x 3), categories (N)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSet {
    positions: Vec<[f32; 3]>,
    velocities: Vec<[f32; 3]>,
    categories: Vec<ParticleCategory>,
}

impl ParticleSet {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            velocities: Vec::with_capacity(n),
            categories: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, position: [f64; 3], velocity: [f64; 3], category: ParticleCategory) {
        self.positions.push(position.map(|c| c as f32));
        self.velocities.push(velocity.map(|c| c as f32));
        self.categories.push(category);
    }

    /// Append another set, keeping its order after ours
    pub fn append(&mut self, other: &mut ParticleSet) {
        self.positions.append(&mut other.positions);
        self.velocities.append(&mut other.velocities);
        self.categories.append(&mut other.categories);
    }

    /// Concatenate sets in iteration order
    pub fn concat(sets: impl IntoIterator<Item = ParticleSet>) -> Self {
        sets.into_iter().fold(Self::default(), |mut acc, mut set| {
            acc.append(&mut set);
            acc
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn velocities(&self) -> &[[f32; 3]] {
        &self.velocities
    }

    pub fn categories(&self) -> &[ParticleCategory] {
        &self.categories
    }

    /// Positions as one flat `[x0, y0, z0, x1, ...]` slice
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Velocities as one flat `[vx0, vy0, vz0, vx1, ...]` slice
    pub fn velocities_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.velocities)
    }

    /// Integer category codes, one per particle
    pub fn category_codes(&self) -> Vec<u32> {
        self.categories.iter().map(ParticleCategory::code).collect()
    }

    /// Mean particle position (origin for an empty set)
    pub fn centroid(&self) -> [f64; 3] {
        if self.positions.is_empty() {
            return [0.0; 3];
        }
        let n = self.positions.len() as f64;
        let sum = self.positions.iter().fold([0.0f64; 3], |acc, p| {
            [acc[0] + p[0] as f64, acc[1] + p[1] as f64, acc[2] + p[2] as f64]
        });
        sum.map(|s| s / n)
    }

    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<ParticleCategory>) {
        (self.positions, self.velocities, self.categories)
    }
}
