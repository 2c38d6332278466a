use bevy::prelude::*;

use super::camera;
use super::loading::LoadingPlugin;
use super::particles;
use super::state::{AppState, UniverseView, ViewerSettings};
use super::ui;

/// Viewer plugin: generation lifecycle, particle visuals, camera and HUD
pub struct ForgeRenderPlugin;

impl Plugin for ForgeRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewerSettings>()
            .init_resource::<UniverseView>()
            .init_resource::<ui::HudThrottle>()
            .init_state::<AppState>()
            .add_plugins(LoadingPlugin)
            .add_systems(Startup, (camera::spawn_camera, ui::spawn_hud))
            .add_systems(OnEnter(AppState::Viewing), particles::spawn_particle_visuals)
            .add_systems(OnExit(AppState::Viewing), particles::despawn_particle_visuals)
            .add_systems(
                Update,
                (
                    camera::fly_camera_system,
                    camera::navigation_system.run_if(in_state(AppState::Viewing)),
                    ui::update_hud,
                ),
            );
    }
}
