use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on, poll_once};
use forge_core::Result;
use forge_procgen::{Universe, UniverseGenerator};

use super::state::{AppState, UniverseView, ViewerSettings};

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::Loading),
            (spawn_loading_screen, start_generation),
        )
        .add_systems(OnExit(AppState::Loading), despawn_loading_screen)
        .add_systems(
            Update,
            loading_poll_system.run_if(in_state(AppState::Loading)),
        );
    }
}

#[derive(Component)]
struct LoadingRoot;

#[derive(Component)]
struct LoadingText;

#[derive(Resource)]
struct GenerationTask(Task<Result<Universe>>);

fn start_generation(mut commands: Commands, settings: Res<ViewerSettings>) {
    let config = settings.config.clone();
    info!(
        "Generating universe: seed {:?}, volume {:?}, {} structures",
        config.seed, config.volume_size, config.num_structures
    );
    let pool = AsyncComputeTaskPool::get();
    let task = pool.spawn(async move { UniverseGenerator::new(config)?.generate() });
    commands.insert_resource(GenerationTask(task));
}

fn spawn_loading_screen(mut commands: Commands, settings: Res<ViewerSettings>) {
    let msg = match settings.config.seed {
        Some(seed) => format!("Generating universe (seed {seed})..."),
        None => "Generating universe...".to_string(),
    };

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            LoadingRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(msg),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 0.9, 0.6, 0.9)),
                LoadingText,
            ));
        });
}

fn despawn_loading_screen(mut commands: Commands, query: Query<Entity, With<LoadingRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn loading_poll_system(
    mut commands: Commands,
    task: Option<ResMut<GenerationTask>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut view: ResMut<UniverseView>,
    mut text_query: Query<&mut Text, With<LoadingText>>,
) {
    let Some(mut gen_task) = task else { return };

    let Some(result) = block_on(poll_once(&mut gen_task.0)) else {
        return;
    };
    commands.remove_resource::<GenerationTask>();

    match result {
        Ok(universe) => {
            info!(
                "Universe ready: {} particles, {} structures{}",
                universe.particle_count(),
                universe.structures().len(),
                if universe.used_fallback() { " (fallback)" } else { "" }
            );
            view.replace(universe);
            next_state.set(AppState::Viewing);
        }
        Err(e) => {
            error!("Universe generation failed: {e}");
            if let Ok(mut text) = text_query.get_single_mut() {
                **text = format!("Generation failed: {e}");
            }
        }
    }
}
