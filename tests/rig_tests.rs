use approx::assert_relative_eq;
use nalgebra::Point3;
use std::f32::consts::FRAC_PI_2;

use traffic_viz::client::{to_cols_array, transform_vertices, Axis, CarRig, Position, WHEEL_OFFSETS};

fn apply(matrix: &nalgebra::Matrix4<f32>, x: f32, y: f32, z: f32) -> Point3<f32> {
    matrix.transform_point(&Point3::new(x, y, z))
}

#[test]
fn test_body_matrix_places_origin_at_position() {
    let rig = CarRig::default();
    let body = rig.body_matrix(&Position::new(3.0, 0.5, -2.0), 1.2);
    let origin = apply(&body, 0.0, 0.0, 0.0);

    assert_relative_eq!(origin.x, 3.0, epsilon = 1e-5);
    assert_relative_eq!(origin.y, 0.5, epsilon = 1e-5);
    assert_relative_eq!(origin.z, -2.0, epsilon = 1e-5);
}

#[test]
fn test_body_faces_heading() {
    // Heading of a car travelling along +x
    let heading = Position::new(0.0, 0.0, 0.0).angle_to(&Position::new(1.0, 0.0, 0.0));
    assert_relative_eq!(heading, FRAC_PI_2);

    let body = CarRig::default().body_matrix(&Position::default(), heading);
    let nose = apply(&body, 0.0, 0.0, 1.0);

    assert_relative_eq!(nose.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(nose.z, 0.0, epsilon = 1e-5);
}

#[test]
fn test_wheels_sit_at_offsets() {
    let rig = CarRig::default();
    let body = rig.body_matrix(&Position::new(10.0, 0.0, 10.0), 0.0);

    for (i, offset) in WHEEL_OFFSETS.iter().enumerate() {
        let hub = apply(&rig.wheel_matrix(&body, i, 0.7), 0.0, 0.0, 0.0);
        assert_relative_eq!(hub.x, 10.0 + offset.x, epsilon = 1e-5);
        assert_relative_eq!(hub.y, offset.y, epsilon = 1e-5);
        assert_relative_eq!(hub.z, 10.0 + offset.z, epsilon = 1e-5);
    }
}

#[test]
fn test_wheel_spins_about_axis() {
    let rig = CarRig::new(360.0, Axis::X);
    let offset = WHEEL_OFFSETS[0];

    // A quarter turn after 0.25s
    let rim = apply(&rig.wheel_local_matrix(0, 0.25), 0.0, 1.0, 0.0);
    assert_relative_eq!(rim.x, offset.x, epsilon = 1e-5);
    assert_relative_eq!(rim.y, offset.y, epsilon = 1e-5);
    assert_relative_eq!(rim.z, offset.z + 1.0, epsilon = 1e-5);

    // A full turn returns to the start
    let rim = apply(&rig.wheel_local_matrix(0, 1.0), 0.0, 1.0, 0.0);
    assert_relative_eq!(rim.y, offset.y + 1.0, epsilon = 1e-4);
}

#[test]
fn test_transform_vertices_resizes_output() {
    let rig = CarRig::default();
    let body = rig.body_matrix(&Position::new(1.0, 0.0, 0.0), 0.0);
    let base = [Position::new(0.0, 0.0, 0.0), Position::new(0.0, 1.0, 0.0)];
    let mut out = vec![Position::default(); 5];

    transform_vertices(&body, &base, &mut out);

    assert_eq!(out.len(), 2);
    assert_relative_eq!(out[0].x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(out[1].y, 1.0, epsilon = 1e-5);
}

#[test]
fn test_cols_array_is_column_major() {
    let body = CarRig::default().body_matrix(&Position::new(4.0, 5.0, 6.0), 0.0);
    let cols = to_cols_array(&body);

    assert_eq!(&cols[12..15], &[4.0, 5.0, 6.0]);
    assert_eq!(cols[15], 1.0);
}
