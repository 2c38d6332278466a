use bevy::prelude::*;
use forge_core::Archetype;

use super::camera::FlyCamera;
use super::state::UniverseView;

/// Marker for the HUD text
#[derive(Component)]
pub struct HudText;

/// Spawn the HUD overlay
pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("StellarForge"),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 0.9, 0.6, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));
}

/// Format large numbers in human-readable form
pub fn fmt_count(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        format!("{}", n)
    }
}

/// HUD frame counter for throttling
#[derive(Resource, Default)]
pub struct HudThrottle {
    pub frame: u32,
}

/// Update HUD text every 10th frame
pub fn update_hud(
    view: Res<UniverseView>,
    mut throttle: ResMut<HudThrottle>,
    camera_query: Query<(&Transform, &FlyCamera)>,
    mut hud_query: Query<&mut Text, With<HudText>>,
) {
    throttle.frame = throttle.frame.wrapping_add(1);
    if throttle.frame % 10 != 0 {
        return;
    }
    let Ok(mut text) = hud_query.get_single_mut() else {
        return;
    };
    let Some(universe) = view.universe.as_ref() else {
        **text = "No universe".to_string();
        return;
    };

    let census: Vec<String> = Archetype::ALL
        .iter()
        .map(|a| {
            let n = universe.structures().iter().filter(|s| s.archetype == *a).count();
            format!("{} {}", a.name(), n)
        })
        .collect();

    let mut flags = Vec::new();
    if universe.fidelity().is_degraded() {
        flags.push("DEGRADED NOISE".to_string());
    }
    if universe.used_fallback() {
        flags.push("FALLBACK".to_string());
    }
    if universe.shortfall() > 0 {
        flags.push(format!("SHORT {}", universe.shortfall()));
    }

    let camera = match camera_query.get_single() {
        Ok((t, cam)) => format!(
            "Camera: ({:.0}, {:.0}, {:.0}) | Speed: {:.0}{}",
            t.translation.x,
            t.translation.y,
            t.translation.z,
            cam.speed,
            cam.structure_nav_idx
                .map(|i| format!(" | Structure #{}", i))
                .unwrap_or_default()
        ),
        Err(_) => String::new(),
    };

    **text = format!(
        "STELLARFORGE | Seed: {}\n\
         Particles: {} | Structures: {} of {}\n\
         {}\n\
         {}\n\
         {}\n\
         \n\
         [WASD/QE] Move  [RMB+Mouse] Look  [Scroll] Speed\n\
         [O] Origin  [G] Next structure  [R] Regenerate",
        universe.seed(),
        fmt_count(universe.particle_count()),
        universe.structures().len(),
        universe.requested(),
        census.join(" | "),
        if flags.is_empty() { "OK".to_string() } else { flags.join(" | ") },
        camera,
    );
}
