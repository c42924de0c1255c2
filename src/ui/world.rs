//! World setup systems for camera, lighting, ground and shared assets

use bevy::prelude::*;

use super::components::{
    BuildingModel, CameraSettings, ClientConfigResource, Ground, LayoutResource, MainCamera,
    Palette,
};
use crate::client::LightState;

/// Colours of the building variants, cycled when there are more variants
const BUILDING_COLORS: [(f32, f32, f32); 4] = [
    (0.7, 0.6, 0.4),
    (0.5, 0.5, 0.7),
    (0.6, 0.6, 0.6),
    (0.8, 0.7, 0.6),
];

/// System to setup the world environment (ground, lighting, camera)
pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    layout: Res<LayoutResource>,
    mut camera_settings: ResMut<CameraSettings>,
    config: Res<ClientConfigResource>,
) {
    if let Some(layout) = &layout.0 {
        let tile = config.0.tile_size;
        camera_settings.focus = Vec3::new(
            layout.width as f32 * tile / 2.0,
            0.0,
            layout.height as f32 * tile / 2.0,
        );
    }
    let focus = camera_settings.focus;

    // Spawn a 3D camera looking down at the city from the south
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_translation(focus + Vec3::new(0.0, 30.0, -20.0)).looking_at(focus, Vec3::Y),
    ));

    // Spawn a directional light
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Spawn a ground plane under the city
    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(200.0, 200.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
        Transform::from_translation(Vec3::new(focus.x, -0.1, focus.z)),
    ));
}

fn lamp_material(state: LightState) -> StandardMaterial {
    let [r, g, b] = state.rgb();
    let color = Color::srgb_u8(r, g, b);
    StandardMaterial {
        base_color: color,
        emissive: color.to_linear() * 4.0,
        ..default()
    }
}

/// System to create the meshes and materials shared by all visual proxies
pub fn setup_palette(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<ClientConfigResource>,
) {
    const FLOOR_HEIGHT: f32 = 0.02;
    let tile = config.0.tile_size;

    let buildings = (0..config.0.building_variants)
        .map(|variant| {
            let (r, g, b) = BUILDING_COLORS[variant % BUILDING_COLORS.len()];
            let height = 0.8 + 0.4 * variant as f32;
            BuildingModel {
                mesh: meshes.add(Cuboid::new(tile * 0.9, height, tile * 0.9)),
                material: materials.add(Color::srgb(r, g, b)),
                height,
            }
        })
        .collect();

    commands.insert_resource(Palette {
        car_body: meshes.add(Cuboid::new(0.4, 0.2, 0.8)),
        car_material: materials.add(Color::srgb(0.2, 0.4, 0.8)),
        wheel: meshes.add(Cylinder::new(0.08, 0.06)),
        wheel_material: materials.add(Color::srgb(0.1, 0.1, 0.1)),
        floor: meshes.add(Cuboid::new(tile, FLOOR_HEIGHT, tile)),
        floor_material: materials.add(Color::srgb(0.35, 0.35, 0.35)),
        road: meshes.add(Cuboid::new(tile, FLOOR_HEIGHT, tile * 0.8)),
        road_material: materials.add(Color::srgb(0.2, 0.2, 0.2)),
        buildings,
        destination_material: materials.add(Color::srgb(0.9, 0.1, 0.1)),
        pole: meshes.add(Cylinder::new(0.04, 0.8)),
        pole_material: materials.add(Color::srgb(0.15, 0.15, 0.15)),
        lamp: meshes.add(Sphere::new(0.1)),
        lamp_red: materials.add(lamp_material(LightState::Red)),
        lamp_green: materials.add(lamp_material(LightState::Green)),
        lamp_off: materials.add(Color::srgb(0.3, 0.3, 0.3)),
    });
}
