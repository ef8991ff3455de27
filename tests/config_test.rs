use std::f32::consts::{FRAC_PI_2, PI};

use cat_viewer::{
    config::{ViewerConfig, srgb_colour},
    pipelines::light::{Light, LightUniform},
    stage::{Adjustment, NodeTarget},
};
use cgmath::{Deg, Rad};

use crate::common::test_utils::{assert_approx, assert_vec3};
mod common;

#[test]
fn both_presets_load_the_cat() {
    assert_eq!(ViewerConfig::orbit().asset, "cat.gltf");
    assert_eq!(ViewerConfig::arc_rotate().asset, "cat.gltf");
}

#[test]
fn orbit_preset() {
    let config = ViewerConfig::orbit();
    assert_eq!(config.clear_colour, wgpu::Color::WHITE);

    let fovy: Rad<f32> = Deg(75.0).into();
    assert_approx(config.camera.fovy.0, fovy.0);
    assert_approx(config.camera.znear, 0.1);
    assert_approx(config.camera.zfar, 1000.0);

    let controls = config.controls.expect("orbit controls");
    assert_eq!(controls.damping, Some(0.25));
    assert!(!controls.screen_space_panning);
    assert_approx(controls.max_beta.0, FRAC_PI_2);

    assert_eq!(config.placement.target, NodeTarget::Root);
    match config.placement.on_attach {
        Adjustment::Set(instance) => assert_vec3(instance.scale, cgmath::Vector3::new(0.6, 0.6, 0.6)),
        other => panic!("unexpected adjustment {other:?}"),
    }
    assert!(config.placement.every_frame.is_some());
}

#[test]
fn arc_rotate_preset() {
    let config = ViewerConfig::arc_rotate();
    // Gamma-encoded (0.2, 0.2, 0.3), stored linear for the sRGB surface
    assert!((config.clear_colour.r - 0.0331).abs() < 1e-3);
    assert!((config.clear_colour.g - 0.0331).abs() < 1e-3);
    assert!((config.clear_colour.b - 0.0732).abs() < 1e-3);
    assert_eq!(config.clear_colour.a, 1.0);
    assert_approx(config.camera.alpha.0, FRAC_PI_2);
    assert_approx(config.camera.beta.0, FRAC_PI_2);
    assert_approx(config.camera.radius, 10.0);
    assert_approx(config.camera.fovy.0, 0.8);
    assert_approx(config.camera.znear, 1.0);
    assert_approx(config.camera.zfar, 10000.0);

    let controls = config.controls.expect("arc rotate controls");
    assert_eq!(controls.damping, Some(0.1));
    assert!(controls.max_beta.0 < PI);

    assert_eq!(
        config.placement.target,
        NodeTarget::Named(vec!["RootNode".to_string(), "ContainerMesh".to_string()])
    );
    assert_eq!(
        config.placement.on_attach,
        Adjustment::Translate(cgmath::Vector3::new(0.0, 40.0, 0.0))
    );
    assert_eq!(config.placement.every_frame, None);
}

#[test]
fn presets_pick_different_lights() {
    let orbit = LightUniform::from(ViewerConfig::orbit().light);
    let arc = LightUniform::from(ViewerConfig::arc_rotate().light);
    assert_ne!(orbit.kind, arc.kind);

    let expected = 1.0 / 3.0_f32.sqrt();
    assert_vec3(orbit.direction.into(), cgmath::Vector3::new(expected, expected, expected));
    assert_vec3(arc.direction.into(), cgmath::Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(arc.ground_color, [0.0; 3]);

    assert!(matches!(ViewerConfig::arc_rotate().light, Light::Hemispheric { .. }));
}

#[test]
fn srgb_colour_round_trips_through_the_surface_encoding() {
    assert_eq!(srgb_colour(1.0, 1.0, 1.0), wgpu::Color::WHITE);
    assert_eq!(srgb_colour(0.0, 0.0, 0.0), wgpu::Color::BLACK);

    // Encoding the stored value again gives back the page colour
    let encode = |c: f64| {
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    };
    let colour = ViewerConfig::arc_rotate().clear_colour;
    assert!((encode(colour.r) - 0.2).abs() < 1e-6);
    assert!((encode(colour.g) - 0.2).abs() < 1e-6);
    assert!((encode(colour.b) - 0.3).abs() < 1e-6);
}
