use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;

use super::state::{AppState, UniverseView, ViewerSettings};

/// Free-fly camera state
#[derive(Component)]
pub struct FlyCamera {
    pub speed: f32,
    pub sensitivity: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Structure visited by the last [G] press
    pub structure_nav_idx: Option<usize>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            speed: 50.0,
            sensitivity: 0.003,
            yaw: 0.0,
            pitch: 0.0,
            structure_nav_idx: None,
        }
    }
}

/// Camera home: above and behind the universe core, scaled to the world
pub fn home_position(world_scale: f32) -> Vec3 {
    Vec3::new(0.0, 0.6 * world_scale, 1.2 * world_scale)
}

/// Spawn the 3D camera looking at the universe core
pub fn spawn_camera(mut commands: Commands, settings: Res<ViewerSettings>) {
    let pos = home_position(settings.config.world_scale as f32);
    let transform = Transform::from_translation(pos).looking_at(Vec3::ZERO, Vec3::Y);
    let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);

    info!("Camera spawned at ({:.0}, {:.0}, {:.0})", pos.x, pos.y, pos.z);

    commands.spawn((
        Camera3d::default(),
        IsDefaultUiCamera,
        transform,
        FlyCamera {
            yaw,
            pitch,
            ..default()
        },
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.3, 0.3, 0.5),
        brightness: 50.0,
    });
}

/// Handle camera movement with WASD/QE, right-drag look and scroll speed
pub fn fly_camera_system(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mut query: Query<(&mut Transform, &mut FlyCamera)>,
) {
    let Ok((mut transform, mut cam)) = query.get_single_mut() else {
        return;
    };

    let dt = time.delta_secs();

    if mouse_button.pressed(MouseButton::Right) {
        let delta = mouse_motion.delta;
        cam.yaw -= delta.x * cam.sensitivity;
        cam.pitch -= delta.y * cam.sensitivity;
        cam.pitch = cam.pitch.clamp(-1.5, 1.5);
    }

    transform.rotation = Quat::from_euler(EulerRot::YXZ, cam.yaw, cam.pitch, 0.0);

    let scroll = mouse_scroll.delta.y;
    if scroll != 0.0 {
        cam.speed = (cam.speed * (1.0 + scroll * 0.1)).clamp(1.0, 10000.0);
    }

    let forward = *transform.forward();
    let right = *transform.right();
    let up = Vec3::Y;

    let mut velocity = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        velocity += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        velocity -= forward;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        velocity -= right;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        velocity += right;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        velocity += up;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        velocity -= up;
    }

    let boost = if keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight) {
        5.0
    } else {
        1.0
    };

    if velocity.length_squared() > 0.0 {
        transform.translation += velocity.normalize() * cam.speed * boost * dt;
    }
}

/// Navigation hotkeys: [O] origin, [G] next structure, [R] regenerate
pub fn navigation_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    view: Res<UniverseView>,
    mut settings: ResMut<ViewerSettings>,
    mut next_state: ResMut<NextState<AppState>>,
    mut query: Query<(&mut Transform, &mut FlyCamera)>,
) {
    let Ok((mut transform, mut cam)) = query.get_single_mut() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::KeyO) {
        look_from(
            &mut transform,
            &mut cam,
            home_position(settings.config.world_scale as f32),
            Vec3::ZERO,
        );
        info!("Camera: back to origin");
    }

    if keyboard.just_pressed(KeyCode::KeyG) {
        let structures = view.universe.as_ref().map_or(&[][..], |u| u.structures());
        if let Some(idx) = next_structure(cam.structure_nav_idx, structures.len()) {
            let s = &structures[idx];
            let center = Vec3::new(s.center[0] as f32, s.center[1] as f32, s.center[2] as f32);
            let reach = 3.0 * s.size_scale as f32;
            look_from(&mut transform, &mut cam, center + Vec3::new(0.0, reach, reach), center);
            cam.structure_nav_idx = Some(idx);
            info!(
                "Camera: structure #{} ({}, {} particles)",
                idx,
                s.archetype.name(),
                s.particle_count
            );
        } else {
            info!("Camera: no structures placed");
        }
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        let seed = settings.advance_seed();
        cam.structure_nav_idx = None;
        info!("Regenerating with seed {}", seed);
        next_state.set(AppState::Loading);
    }
}

/// Index after `current`, wrapping; None when there is nothing to visit
pub fn next_structure(current: Option<usize>, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(current.map_or(0, |i| (i + 1) % count))
}

fn look_from(transform: &mut Transform, cam: &mut FlyCamera, eye: Vec3, target: Vec3) {
    *transform = Transform::from_translation(eye).looking_at(target, Vec3::Y);
    let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
    cam.yaw = yaw;
    cam.pitch = pitch.clamp(-1.5, 1.5);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_structure_cycles() {
        assert_eq!(next_structure(None, 0), None);
        assert_eq!(next_structure(Some(3), 0), None);
        assert_eq!(next_structure(None, 3), Some(0));
        assert_eq!(next_structure(Some(0), 3), Some(1));
        assert_eq!(next_structure(Some(2), 3), Some(0));
        // Stale index from a larger universe
        assert_eq!(next_structure(Some(9), 3), Some(1));
    }

    #[test]
    fn test_home_scales_with_world() {
        assert_eq!(home_position(100.0), Vec3::new(0.0, 60.0, 120.0));
        assert!(home_position(200.0).length() > home_position(50.0).length());
    }
}
