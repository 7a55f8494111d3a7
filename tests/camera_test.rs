use cgmath::{Deg, InnerSpace, Point3, Vector3, Vector4};
use lakeside::{
    camera::{Camera, CameraController, Projection},
    config::SceneConfig,
};

use crate::common::test_utils::assert_close;

mod common;

fn camera() -> Camera {
    Camera::new(
        Vector3::new(0.0, 20.0, -30.0),
        Vector3::new(0.0, 0.0, 1.0),
        Deg(-90.0),
    )
}

#[test]
fn should_start_from_the_configured_camera() {
    let config = SceneConfig::default();
    let camera = Camera::from_config(&config.camera);
    assert_eq!(camera.position, Point3::new(0.0, 20.0, -30.0));
    assert_close(camera.front.magnitude(), 1.0);
    assert_eq!(camera.up, Vector3::unit_y());
}

#[test]
fn should_not_move_without_mouse_motion() {
    let mut camera = camera();
    let before = camera;
    CameraController::new(0.1, 1.0).update(&mut camera);
    assert_eq!(camera, before);
}

#[test]
fn should_turn_with_horizontal_motion() {
    let mut camera = camera();
    let mut controller = CameraController::new(0.1, 1.0);
    controller.handle_mouse(450.0, 0.0);
    controller.update(&mut camera);

    // -90 + 45 degrees
    assert_close(camera.yaw.0, -45.0);
    assert_close(camera.front.y, 0.0);
    assert_close(camera.front.x, 45f32.to_radians().cos());
    assert_close(camera.front.z, -(45f32.to_radians().sin()));
    assert_eq!(camera.position, Point3::new(0.0, 20.0, -30.0));
}

#[test]
fn should_walk_forward_when_the_mouse_moves_up() {
    let mut camera = camera();
    let mut controller = CameraController::new(0.1, 2.0);
    controller.handle_mouse(0.0, -10.0);
    controller.update(&mut camera);

    // yaw -90 faces -Z; 10px * 0.1 * 2
    assert_close(camera.position.z, -32.0);
    assert_close(camera.position.x, 0.0);
    assert_close(camera.position.y, 20.0);
}

#[test]
fn should_accumulate_motion_between_frames() {
    let mut accumulated = camera();
    let mut controller = CameraController::new(0.1, 1.0);
    controller.handle_mouse(100.0, 0.0);
    controller.handle_mouse(50.0, 0.0);
    controller.update(&mut accumulated);
    assert_close(accumulated.yaw.0, -75.0);

    // Consumed motion is not applied twice.
    controller.update(&mut accumulated);
    assert_close(accumulated.yaw.0, -75.0);
}

#[test]
fn should_map_depth_into_the_wgpu_range() {
    let projection = Projection::new(800, 600, Deg(60.0), 0.5, 1000.0);
    assert_close(projection.aspect(), 800.0 / 600.0);

    let near = projection.calc_matrix() * Vector4::new(0.0, 0.0, -0.5, 1.0);
    let far = projection.calc_matrix() * Vector4::new(0.0, 0.0, -1000.0, 1.0);
    assert!((near.z / near.w).abs() < 1e-4);
    assert!((far.z / far.w - 1.0).abs() < 1e-4);
}

#[test]
fn should_follow_the_window_aspect() {
    let mut projection = Projection::new(800, 600, Deg(60.0), 0.5, 1000.0);
    projection.resize(1000, 500);
    assert_close(projection.aspect(), 2.0);
    // A minimised window must not divide by zero.
    projection.resize(1000, 0);
    assert!(projection.aspect().is_finite());
}
