//! Spawning visual proxies from client state

use bevy::prelude::*;

use super::components::{
    CarLink, ClientConfigResource, LayoutResource, LayoutTile, Palette, RigResource, Scenery,
    SignalLamp, SimSynced, TrafficLightLink, Wheel,
};
use crate::client::{
    to_cols_array, AgentId, CarRig, LightState, Position, SceneSink, ScenePlacement,
    SceneryPiece, TileKind,
};

/// Height of a traffic light post
const POLE_HEIGHT: f32 = 0.8;

/// Convert a rig matrix to a Bevy transform
pub fn transform_from_rig(matrix: &nalgebra::Matrix4<f32>) -> Transform {
    Transform::from_matrix(Mat4::from_cols_array(&to_cols_array(matrix)))
}

/// Local transform of a wheel: the rig's wheel matrix with the cylinder
/// laid on its side
pub fn wheel_transform(rig: &CarRig, wheel: usize, time: f32) -> Transform {
    let local = transform_from_rig(&rig.wheel_local_matrix(wheel, time));
    local * Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
}

fn to_vec3(position: &Position) -> Vec3 {
    Vec3::new(position.x, position.y, position.z)
}

/// `SceneSink` that turns client state changes into Bevy commands
pub struct BevySceneSink<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub palette: &'a Palette,
    pub rig: &'a CarRig,
}

impl BevySceneSink<'_, '_, '_> {
    fn spawn_building(
        &mut self,
        variant: usize,
        destination: bool,
        base: Vec3,
        height_scale: f32,
        rotation: Quat,
    ) -> Entity {
        let model = &self.palette.buildings[variant % self.palette.buildings.len()];
        let material = if destination {
            self.palette.destination_material.clone()
        } else {
            model.material.clone()
        };
        self.commands
            .spawn((
                Mesh3d(model.mesh.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(base + Vec3::Y * model.height * height_scale / 2.0)
                    .with_rotation(rotation)
                    .with_scale(Vec3::new(1.0, height_scale, 1.0)),
            ))
            .id()
    }

    /// Post with a lamp on top; returns (post, lamp)
    fn spawn_post(&mut self, base: Vec3, lamp_material: Handle<StandardMaterial>) -> (Entity, Entity) {
        let post = self
            .commands
            .spawn((
                Mesh3d(self.palette.pole.clone()),
                MeshMaterial3d(self.palette.pole_material.clone()),
                Transform::from_translation(base + Vec3::Y * POLE_HEIGHT / 2.0),
            ))
            .id();
        let lamp = self
            .commands
            .spawn((
                SignalLamp,
                Mesh3d(self.palette.lamp.clone()),
                MeshMaterial3d(lamp_material),
                Transform::from_translation(Vec3::Y * POLE_HEIGHT / 2.0),
            ))
            .id();
        self.commands.entity(post).add_child(lamp);
        (post, lamp)
    }
}

impl SceneSink for BevySceneSink<'_, '_, '_> {
    type Car = Entity;
    type Light = Entity;

    fn spawn_car(&mut self, id: &AgentId, position: Position) -> Entity {
        let body = self
            .commands
            .spawn((
                SimSynced,
                CarLink(id.clone()),
                Mesh3d(self.palette.car_body.clone()),
                MeshMaterial3d(self.palette.car_material.clone()),
                transform_from_rig(&self.rig.body_matrix(&position, 0.0)),
            ))
            .id();

        for wheel in 0..self.rig.wheel_offsets.len() {
            let child = self
                .commands
                .spawn((
                    Wheel(wheel),
                    Mesh3d(self.palette.wheel.clone()),
                    MeshMaterial3d(self.palette.wheel_material.clone()),
                    wheel_transform(self.rig, wheel, 0.0),
                ))
                .id();
            self.commands.entity(body).add_child(child);
        }

        debug!("Spawned car {} at {:?}", id, position);
        body
    }

    fn despawn_car(&mut self, id: &AgentId, car: Entity) {
        debug!("Despawning car {}", id);
        self.commands.entity(car).despawn();
    }

    fn spawn_light(&mut self, id: &AgentId, position: Position) -> Entity {
        let (post, lamp) = self.spawn_post(to_vec3(&position), self.palette.lamp_red.clone());
        self.commands
            .entity(post)
            .insert((SimSynced, TrafficLightLink(id.clone())));
        self.commands.entity(lamp).insert(PointLight {
            color: Color::srgb(1.0, 0.0, 0.0),
            intensity: 20_000.0,
            range: 2.0,
            ..default()
        });
        lamp
    }

    fn set_light(&mut self, light: &Entity, state: LightState) {
        let [r, g, b] = state.rgb();
        let material = match state {
            LightState::Green => self.palette.lamp_green.clone(),
            LightState::Red => self.palette.lamp_red.clone(),
        };
        self.commands.entity(*light).insert((
            MeshMaterial3d(material),
            PointLight {
                color: Color::srgb_u8(r, g, b),
                intensity: 20_000.0,
                range: 2.0,
                ..default()
            },
        ));
    }

    fn place_scenery(&mut self, placement: &ScenePlacement) {
        let base = to_vec3(&placement.position);
        let entity = match placement.piece {
            SceneryPiece::Building {
                variant,
                destination,
            } => self.spawn_building(variant, destination, base, 1.0, Quat::IDENTITY),
            SceneryPiece::Floor => self
                .commands
                .spawn((
                    Mesh3d(self.palette.floor.clone()),
                    MeshMaterial3d(self.palette.floor_material.clone()),
                    Transform::from_translation(base),
                ))
                .id(),
        };
        self.commands.entity(entity).insert(Scenery);
    }
}

/// System to lay out the city map, if one was given
pub fn spawn_layout(
    mut commands: Commands,
    palette: Res<Palette>,
    layout: Res<LayoutResource>,
    rig: Res<RigResource>,
    config: Res<ClientConfigResource>,
) {
    let Some(layout) = &layout.0 else {
        return;
    };
    let mut sink = BevySceneSink {
        commands: &mut commands,
        palette: &palette,
        rig: &rig.0,
    };

    for tile in &layout.tiles {
        let base = to_vec3(&tile.position);
        let entities: Vec<Entity> = match tile.kind {
            TileKind::Road { rotated } => vec![spawn_road(&mut sink, base, rotated)],
            TileKind::TrafficLight { rotated } => {
                let road = spawn_road(&mut sink, base, rotated);
                let (post, _) = sink.spawn_post(base, palette.lamp_off.clone());
                vec![road, post]
            }
            TileKind::Destination { variant } => vec![sink.spawn_building(
                variant,
                true,
                base,
                1.0,
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            )],
            TileKind::Building {
                variant,
                height_scale,
            } => vec![sink.spawn_building(variant, false, base, height_scale, Quat::IDENTITY)],
        };
        for entity in entities {
            sink.commands.entity(entity).insert(LayoutTile);
        }
    }

    info!(
        "Laid out {} map tiles ({}x{}, tile size {})",
        layout.tiles.len(),
        layout.width,
        layout.height,
        config.0.tile_size
    );
}

fn spawn_road(sink: &mut BevySceneSink, base: Vec3, rotated: bool) -> Entity {
    let rotation = if rotated {
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)
    } else {
        Quat::IDENTITY
    };
    sink.commands
        .spawn((
            Mesh3d(sink.palette.road.clone()),
            MeshMaterial3d(sink.palette.road_material.clone()),
            Transform::from_translation(base).with_rotation(rotation),
        ))
        .id()
}
