use bevy::prelude::*;
use forge_core::ParticleCategory;
use forge_procgen::Universe;
use std::collections::HashMap;

use super::state::{UniverseView, ViewerSettings};

/// Marker for particle point entities in the render world
#[derive(Component)]
pub struct ParticlePoint {
    pub index: usize,
}

/// Rendered radius of one particle in world units
const POINT_RADIUS: f32 = 0.15;

/// Spawn one low-poly sphere per sampled particle, sharing a material per
/// (category, structure) pair
pub fn spawn_particle_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    view: Res<UniverseView>,
    settings: Res<ViewerSettings>,
) {
    let Some(universe) = view.universe.as_ref() else {
        return;
    };

    let sphere = Sphere::new(POINT_RADIUS);
    let mesh = meshes.add(sphere.mesh().ico(0).unwrap_or_else(|_| sphere.mesh().uv(6, 4)));
    let owners = structure_owners(universe);
    let positions = universe.positions();
    let categories = universe.particles().categories();

    let stride = sample_stride(positions.len(), settings.render_budget);
    let mut material_cache: HashMap<(ParticleCategory, Option<usize>), Handle<StandardMaterial>> =
        HashMap::new();

    let mut spawned = 0;
    for index in (0..positions.len()).step_by(stride) {
        let category = categories[index];
        let owner = owners.get(index).copied().flatten();
        let tint = owner
            .and_then(|s| universe.structures().get(s))
            .map_or([1.0; 3], |s| s.color_tint);

        let mat = material_cache
            .entry((category, owner))
            .or_insert_with(|| {
                let color = particle_color(category, tint);
                materials.add(StandardMaterial {
                    base_color: color,
                    emissive: LinearRgba::from(color) * 3.0,
                    unlit: true,
                    ..default()
                })
            })
            .clone();

        let p = positions[index];
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(mat),
            Transform::from_xyz(p[0], p[1], p[2]),
            ParticlePoint { index },
        ));
        spawned += 1;
    }

    info!(
        "Spawned {} render particles from {} generated particles",
        spawned,
        positions.len()
    );
}

pub fn despawn_particle_visuals(mut commands: Commands, query: Query<Entity, With<ParticlePoint>>) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

/// Evenly sample `total` particles down to at most `budget`
pub fn sample_stride(total: usize, budget: usize) -> usize {
    if budget == 0 || total <= budget {
        1
    } else {
        total.div_ceil(budget)
    }
}

/// Structure index owning each particle (None for fallback particles)
fn structure_owners(universe: &Universe) -> Vec<Option<usize>> {
    let mut owners = vec![None; universe.particle_count()];
    for i in 0..universe.structures().len() {
        if let Some(span) = universe.structure_span(i) {
            for owner in &mut owners[span] {
                *owner = Some(i);
            }
        }
    }
    owners
}

/// Category colour modulated by the owning structure's tint
fn particle_color(category: ParticleCategory, tint: [f32; 3]) -> Color {
    let c = category.color();
    Color::srgb(c[0] * tint[0], c[1] * tint[1], c[2] * tint[2])
}
