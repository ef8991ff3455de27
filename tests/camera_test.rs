use std::f32::consts::{FRAC_PI_2, PI};

use cat_viewer::{
    camera::{OrbitCamera, OrbitController, OrbitSettings, Projection, RotateSpeed},
    config::ViewerConfig,
};
use cgmath::{Deg, Point3, Rad};
use winit::event::MouseScrollDelta;

use crate::common::test_utils::{assert_approx, assert_point3};
mod common;

fn camera() -> OrbitCamera {
    OrbitCamera::new(Point3::new(0.0, 0.0, 0.0), Rad(FRAC_PI_2), Rad(FRAC_PI_2), 10.0)
}

#[test]
fn resize_sets_aspect_from_the_new_size_only() {
    let mut a = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
    let mut b = Projection::new(300, 900, Deg(45.0), 0.1, 100.0);
    a.resize(1920, 1080);
    b.resize(1920, 1080);

    assert_approx(a.aspect(), 1920.0 / 1080.0);
    assert_eq!(a, b);
}

#[test]
fn resizing_twice_to_the_same_size_changes_nothing() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    projection.resize(1024, 768);
    let once = projection;
    projection.resize(1024, 768);

    assert_eq!(projection, once);
    assert_eq!(projection.calc_matrix(), once.calc_matrix());
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut projection = Projection::new(800, 400, Deg(75.0), 0.1, 1000.0);
    projection.resize(0, 400);
    projection.resize(800, 0);
    assert_approx(projection.aspect(), 2.0);
}

#[test]
fn orbit_preset_starts_at_positive_z() {
    let config = ViewerConfig::orbit();
    assert_point3(config.camera.camera().position(), Point3::new(0.0, 0.0, 5.0));

    let arc = ViewerConfig::arc_rotate();
    assert_point3(arc.camera.camera().position(), Point3::new(0.0, 0.0, 10.0));
}

#[test]
fn undamped_rotation_is_applied_in_one_update() {
    let mut controller = OrbitController::new(OrbitSettings::default());
    let mut cam = camera();
    controller.handle_mouse(100.0, 0.0);
    controller.update(&mut cam);

    assert_approx(cam.alpha.0, FRAC_PI_2 + 100.0 * 0.005);
    assert!(!controller.is_moving());

    controller.update(&mut cam);
    assert_approx(cam.alpha.0, FRAC_PI_2 + 100.0 * 0.005);
}

#[test]
fn damped_rotation_converges_to_the_full_drag() {
    let settings = OrbitSettings {
        damping: Some(0.25),
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);
    let mut cam = camera();
    controller.handle_mouse(100.0, 0.0);

    controller.update(&mut cam);
    assert_approx(cam.alpha.0, FRAC_PI_2 + 0.25 * 0.5);
    assert!(controller.is_moving());

    for _ in 0..100 {
        controller.update(&mut cam);
    }
    assert_approx(cam.alpha.0, FRAC_PI_2 + 0.5);
    assert!(!controller.is_moving());
}

#[test]
fn polar_angle_is_clamped_to_the_limit() {
    let settings = OrbitSettings {
        max_beta: Rad(FRAC_PI_2),
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);
    let mut cam = camera();
    // Dragging up lowers the camera below the horizon
    controller.handle_mouse(0.0, -1000.0);
    controller.update(&mut cam);
    assert_approx(cam.beta.0, FRAC_PI_2);

    controller.handle_mouse(0.0, 10_000.0);
    controller.update(&mut cam);
    assert!(cam.beta.0 > 0.0);
    assert!(cam.beta.0 < 0.01);
}

#[test]
fn polar_angle_never_reaches_the_poles() {
    let mut controller = OrbitController::new(OrbitSettings::default());
    let mut cam = camera();
    controller.handle_mouse(0.0, -100_000.0);
    controller.update(&mut cam);
    assert!(cam.beta.0 < PI);
    assert!(cam.position().y.is_finite());
}

#[test]
fn scrolling_up_zooms_in() {
    let mut controller = OrbitController::new(OrbitSettings::default());
    let mut cam = camera();
    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
    controller.update(&mut cam);
    assert_approx(cam.radius, 9.5);

    // Zoom does not carry over to the next frame
    controller.update(&mut cam);
    assert_approx(cam.radius, 9.5);
}

#[test]
fn radius_is_clamped() {
    let settings = OrbitSettings {
        min_radius: 2.0,
        max_radius: 20.0,
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);
    let mut cam = camera();
    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, -100.0));
    controller.update(&mut cam);
    assert_approx(cam.radius, 20.0);

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 200.0));
    controller.update(&mut cam);
    assert_approx(cam.radius, 2.0);
}

#[test]
fn ground_plane_panning_keeps_the_target_height() {
    let settings = OrbitSettings {
        screen_space_panning: false,
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);
    // Looking down at the target from above and behind
    let mut cam = OrbitCamera::new(Point3::new(0.0, 0.0, 0.0), Rad(FRAC_PI_2), Rad(0.5), 10.0);
    controller.handle_pan(40.0, 25.0);
    controller.update(&mut cam);

    assert_approx(cam.target.y, 0.0);
    assert!(cam.target.x != 0.0 || cam.target.z != 0.0);
}

#[test]
fn viewport_relative_rotation_follows_the_window_height() {
    let settings = OrbitSettings {
        rotate_speed: RotateSpeed::PerViewportHeight(1.0),
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);

    // Dragging half the viewport height turns the camera half way round
    controller.resize(1000);
    let mut cam = camera();
    controller.handle_mouse(500.0, 0.0);
    controller.update(&mut cam);
    assert_approx(cam.alpha.0, FRAC_PI_2 + PI);

    controller.resize(500);
    let mut cam = camera();
    controller.handle_mouse(250.0, 0.0);
    controller.update(&mut cam);
    assert_approx(cam.alpha.0, FRAC_PI_2 + PI);
}

#[test]
fn zero_viewport_height_keeps_the_last_one() {
    let settings = OrbitSettings {
        rotate_speed: RotateSpeed::PerViewportHeight(1.0),
        ..Default::default()
    };
    let mut controller = OrbitController::new(settings);
    assert_eq!(controller.radians_per_pixel(), 0.0);

    controller.resize(720);
    controller.resize(0);
    assert_approx(controller.radians_per_pixel(), 2.0 * PI / 720.0);
}

#[test]
fn orbit_preset_rotates_per_viewport_and_arc_rotate_per_pixel() {
    let orbit = ViewerConfig::orbit().controls.unwrap();
    assert_eq!(orbit.rotate_speed, RotateSpeed::PerViewportHeight(1.0));
    let arc = ViewerConfig::arc_rotate().controls.unwrap();
    assert_eq!(arc.rotate_speed, RotateSpeed::PerPixel(0.001));
}
