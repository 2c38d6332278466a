use forge_core::*;
use rand::Rng;
use rand::distributions::WeightedIndex;
use rand_distr::{Distribution, Exp1, StandardNormal};
use std::f64::consts::PI;
use std::sync::LazyLock;

/// Per-structure inputs beyond center, count and scale
#[derive(Debug, Clone, Copy)]
pub struct SynthesisParams {
    pub rotation_speed: f64,
    /// Unit disk normal (only spirals use it)
    pub orientation: [f64; 3],
}

impl From<&Structure> for SynthesisParams {
    fn from(s: &Structure) -> Self {
        Self {
            rotation_speed: s.rotation_speed,
            orientation: s.orientation,
        }
    }
}

/// Draw the randomized properties of a newly accepted structure
pub fn roll_structure(id: usize, center: WorldPosition, rng: &mut impl Rng) -> Structure {
    let archetype = roll_archetype(rng);
    let particle_count = rng.gen_range(archetype.particle_range());
    let rotation_speed = if archetype.rotates() {
        rng.gen_range(SPIRAL_ROTATION)
    } else {
        0.0
    };
    let size_scale = rng.gen_range(SIZE_SCALE);
    let orientation = random_unit_vector(rng);
    let color_tint = [
        rng.gen_range(TINT_MIN[0]..1.0),
        rng.gen_range(TINT_MIN[1]..1.0),
        rng.gen_range(TINT_MIN[2]..1.0),
    ];

    Structure {
        id,
        center,
        archetype,
        particle_count,
        size_scale,
        rotation_speed,
        orientation,
        color_tint,
        seed: rng.r#gen(),
    }
}

static ARCHETYPE_DIST: LazyLock<WeightedIndex<f64>> = LazyLock::new(|| {
    WeightedIndex::new(ARCHETYPE_WEIGHTS).expect("archetype weights are positive constants")
});

fn roll_archetype(rng: &mut impl Rng) -> Archetype {
    Archetype::ALL[ARCHETYPE_DIST.sample(rng)]
}

/// Direction drawn from an isotropic Gaussian, normalized
pub fn random_unit_vector(rng: &mut impl Rng) -> [f64; 3] {
    loop {
        let v: [f64; 3] = [
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
        ];
        let len = norm(v);
        if len > 1e-9 {
            return v.map(|c| c / len);
        }
    }
}

/// Synthesize `count` particles for an archetype around `center`.
/// Positions and velocities always have exactly `count` entries.
pub fn synthesize(
    archetype: Archetype,
    center: WorldPosition,
    count: usize,
    scale: f64,
    params: SynthesisParams,
    rng: &mut impl Rng,
) -> ParticleSet {
    let scale = scale.max(f64::EPSILON);
    match archetype {
        Archetype::Spiral => spiral(center, count, scale, params, rng),
        Archetype::Elliptical => elliptical(center, count, scale, rng),
        Archetype::Irregular => irregular(center, count, scale, rng),
    }
}

/// Bulge (30%, Gaussian, at rest) plus logarithmic arms rotating with a
/// simplified Keplerian speed law. The disk lies in the plane normal to
/// `params.orientation`.
fn spiral(
    center: WorldPosition,
    count: usize,
    scale: f64,
    params: SynthesisParams,
    rng: &mut impl Rng,
) -> ParticleSet {
    let bulge_count = (count as f64 * BULGE_FRACTION) as usize;
    let arm_count = count - bulge_count;
    let frame = DiskFrame::new(params.orientation);
    let mut set = ParticleSet::with_capacity(count);

    let bulge = Gaussian(scale * 0.3);
    for _ in 0..bulge_count {
        let offset = [bulge.sample(rng), bulge.sample(rng), bulge.sample(rng)];
        set.push(add(center, offset), [0.0; 3], ParticleCategory::Star);
    }

    let radius = Exponential(scale * 0.4);
    let height = Gaussian(scale * 0.05);
    let jitter = Gaussian(0.05);
    let twist = scale * 0.2;
    for _ in 0..arm_count {
        let r = radius.sample(rng);
        let theta = rng.gen_range(0.0..4.0 * PI) + r / twist * PI;
        let z = height.sample(rng);
        let (sin, cos) = theta.sin_cos();

        let speed = params.rotation_speed / r.max(ORBIT_SOFTENING).sqrt();
        let local_pos = [r * cos, r * sin, z];
        let local_vel = [-sin * speed, cos * speed, jitter.sample(rng)];

        set.push(
            add(center, frame.to_world(local_pos)),
            frame.to_world(local_vel),
            ParticleCategory::Star,
        );
    }

    set
}

/// Uniform directions, exponentially distributed radii, isotropic
/// Gaussian velocities with no net rotation.
fn elliptical(center: WorldPosition, count: usize, scale: f64, rng: &mut impl Rng) -> ParticleSet {
    let radius = Exponential(scale * 0.5);
    let velocity = Gaussian(0.2);
    let mut set = ParticleSet::with_capacity(count);

    for _ in 0..count {
        let dir = random_unit_vector(rng);
        let r = radius.sample(rng);
        let vel = [velocity.sample(rng), velocity.sample(rng), velocity.sample(rng)];
        set.push(add(center, dir.map(|c| c * r)), vel, ParticleCategory::Star);
    }

    set
}

/// Uniform cube overwritten in part by 2-4 Gaussian clumps. Each clump
/// takes its own consecutive slice of `count / clumps` particles.
fn irregular(center: WorldPosition, count: usize, scale: f64, rng: &mut impl Rng) -> ParticleSet {
    let mut offsets: Vec<[f64; 3]> = (0..count)
        .map(|_| {
            [
                rng.gen_range(-scale..scale),
                rng.gen_range(-scale..scale),
                rng.gen_range(-scale..scale),
            ]
        })
        .collect();

    let clumps = rng.gen_range(2..5usize);
    let per_clump = count / clumps;
    for c in 0..clumps {
        let clump_center = [
            rng.gen_range(-scale * 0.5..scale * 0.5),
            rng.gen_range(-scale * 0.5..scale * 0.5),
            rng.gen_range(-scale * 0.5..scale * 0.5),
        ];
        let spread = Gaussian(rng.gen_range(scale * 0.2..scale * 0.4));
        for offset in &mut offsets[c * per_clump..(c + 1) * per_clump] {
            *offset = [
                clump_center[0] + spread.sample(rng),
                clump_center[1] + spread.sample(rng),
                clump_center[2] + spread.sample(rng),
            ];
        }
    }

    let velocity = Gaussian(0.3);
    let mut set = ParticleSet::with_capacity(count);
    for offset in offsets {
        let vel = [velocity.sample(rng), velocity.sample(rng), velocity.sample(rng)];
        set.push(add(center, offset), vel, ParticleCategory::Star);
    }
    set
}

/// Orthonormal basis whose third axis is the disk normal
struct DiskFrame {
    u: [f64; 3],
    v: [f64; 3],
    n: [f64; 3],
}

impl DiskFrame {
    fn new(normal: [f64; 3]) -> Self {
        let len = norm(normal);
        let n = if len > 1e-9 {
            normal.map(|c| c / len)
        } else {
            [0.0, 0.0, 1.0]
        };
        // Any axis not parallel to n seeds the basis
        let seed = if n[0].abs() < 0.9 { [1.0, 0.0, 0.0] } else { [0.0, 1.0, 0.0] };
        let u = cross(seed, n);
        let u_len = norm(u);
        let u = u.map(|c| c / u_len);
        let v = cross(n, u);
        Self { u, v, n }
    }

    fn to_world(&self, local: [f64; 3]) -> [f64; 3] {
        [
            self.u[0] * local[0] + self.v[0] * local[1] + self.n[0] * local[2],
            self.u[1] * local[0] + self.v[1] * local[1] + self.n[1] * local[2],
            self.u[2] * local[0] + self.v[2] * local[1] + self.n[2] * local[2],
        ]
    }
}

/// Zero-mean normal with standard deviation `sigma`
#[derive(Debug, Clone, Copy)]
struct Gaussian(f64);

impl Gaussian {
    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        z * self.0
    }
}

/// Exponential distribution with the given mean
#[derive(Debug, Clone, Copy)]
struct Exponential(f64);

impl Exponential {
    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let e: f64 = Exp1.sample(rng);
        e * self.0
    }
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}
