use bevy::prelude::*;
use forge_core::GeneratorConfig;
use forge_render::{ForgeRenderPlugin, ViewerSettings};

fn main() {
    // Optional first argument: master seed
    let seed = std::env::args().nth(1).and_then(|s| s.parse::<u64>().ok());
    let settings = ViewerSettings {
        config: GeneratorConfig {
            seed: seed.or(Some(42)),
            ..GeneratorConfig::default()
        },
        ..ViewerSettings::default()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "StellarForge - Procedural Universe".into(),
                resolution: (1920.0, 1080.0).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.02)))
        .insert_resource(settings)
        .add_plugins(ForgeRenderPlugin)
        .run();
}
