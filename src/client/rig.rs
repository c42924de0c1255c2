//! Car body and wheel transforms
//!
//! The body composite is `T(position) * R_y(heading)`. Each wheel is placed
//! relative to the body and spun about a fixed axis:
//! `body * T(wheel_offset) * R_axis(spin * time)`.

use nalgebra::{Matrix4, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::types::Position;

/// Wheel offsets from the body origin: front left, front right, rear left,
/// rear right
pub const WHEEL_OFFSETS: [Position; 4] = [
    Position { x: -0.22, y: 0.05, z: 0.32 },
    Position { x: 0.22, y: 0.05, z: 0.32 },
    Position { x: -0.22, y: 0.05, z: -0.27 },
    Position { x: 0.22, y: 0.05, z: -0.27 },
];

/// Rotation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> Unit<Vector3<f32>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

pub fn translation(position: &Position) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(position.x, position.y, position.z))
}

/// Rotation of `degrees` about `axis`
pub fn rotation(degrees: f32, axis: Axis) -> Matrix4<f32> {
    Matrix4::from_axis_angle(&axis.unit(), degrees.to_radians())
}

/// Transform parameters shared by every car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarRig {
    pub wheel_offsets: [Position; 4],
    /// Wheel spin in degrees per second
    pub spin_degrees: f32,
    pub spin_axis: Axis,
}

impl Default for CarRig {
    fn default() -> Self {
        Self::new(360.0, Axis::X)
    }
}

impl CarRig {
    pub fn new(spin_degrees: f32, spin_axis: Axis) -> Self {
        Self {
            wheel_offsets: WHEEL_OFFSETS,
            spin_degrees,
            spin_axis,
        }
    }

    /// Body composite for a car at `position` facing `heading` radians
    pub fn body_matrix(&self, position: &Position, heading: f32) -> Matrix4<f32> {
        translation(position) * rotation(heading.to_degrees(), Axis::Y)
    }

    /// Wheel transform relative to the body at `time` seconds
    pub fn wheel_local_matrix(&self, wheel: usize, time: f32) -> Matrix4<f32> {
        let offset = &self.wheel_offsets[wheel % self.wheel_offsets.len()];
        translation(offset) * rotation(self.spin_degrees * time, self.spin_axis)
    }

    /// Wheel transform in world space
    pub fn wheel_matrix(&self, body: &Matrix4<f32>, wheel: usize, time: f32) -> Matrix4<f32> {
        body * self.wheel_local_matrix(wheel, time)
    }
}

/// Apply `matrix` to every vertex in `base`, writing into `out`.
///
/// `out` is resized to match `base`.
pub fn transform_vertices(matrix: &Matrix4<f32>, base: &[Position], out: &mut Vec<Position>) {
    out.clear();
    out.extend(base.iter().map(|v| {
        let p = matrix.transform_point(&Point3::new(v.x, v.y, v.z));
        Position::new(p.x, p.y, p.z)
    }));
}

/// Column-major array, the layout renderers expect
pub fn to_cols_array(matrix: &Matrix4<f32>) -> [f32; 16] {
    let mut cols = [0.0; 16];
    cols.copy_from_slice(matrix.as_slice());
    cols
}
