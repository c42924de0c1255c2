//! Input handling systems

use bevy::prelude::*;

use super::components::{CameraSettings, MainCamera};

/// Handle basic keyboard input
pub fn handle_input(keyboard: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// Move, orbit and zoom the camera from the keyboard
pub fn handle_camera_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut settings: ResMut<CameraSettings>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = camera.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    // Pan along the ground plane relative to the camera's facing
    let forward = Vec3::new(transform.forward().x, 0.0, transform.forward().z).normalize_or_zero();
    let right = Vec3::new(transform.right().x, 0.0, transform.right().z).normalize_or_zero();
    let mut pan = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        pan += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        pan -= forward;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        pan += right;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        pan -= right;
    }
    let pan = pan.normalize_or_zero() * settings.movement_speed * dt;
    transform.translation += pan;
    settings.focus += pan;

    let mut orbit = 0.0;
    if keyboard.pressed(KeyCode::KeyQ) {
        orbit += settings.rotation_speed * dt;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        orbit -= settings.rotation_speed * dt;
    }
    if orbit != 0.0 {
        let focus = settings.focus;
        transform.rotate_around(focus, Quat::from_rotation_y(orbit));
    }

    let mut zoom = 0.0;
    if keyboard.pressed(KeyCode::KeyZ) {
        zoom += settings.zoom_speed * dt;
    }
    if keyboard.pressed(KeyCode::KeyX) {
        zoom -= settings.zoom_speed * dt;
    }
    if zoom != 0.0 {
        let to_focus = settings.focus - transform.translation;
        // Stop short of the focus point
        if zoom < to_focus.length() - 2.0 {
            transform.translation += to_focus.normalize_or_zero() * zoom;
        }
    }
}
