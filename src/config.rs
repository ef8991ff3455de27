//! Viewer presets.
//!
//! Everything a demo page hard-codes lives in a [`ViewerConfig`]: the asset,
//! background, camera, controls, light and where the loaded model is placed.
//! The flow applies it to the [`crate::context::Context`] in `on_init`.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Deg, Point3, Rad, Vector3};

use crate::{
    camera::{OrbitCamera, OrbitSettings, Projection, RotateSpeed},
    data_structures::instance::Instance,
    pipelines::light::Light,
    stage::{Adjustment, ModelPlacement, NodeTarget},
};

/// Initial camera placement and projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSetup {
    pub target: Point3<f32>,
    pub alpha: Rad<f32>,
    pub beta: Rad<f32>,
    pub radius: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl CameraSetup {
    pub fn camera(&self) -> OrbitCamera {
        OrbitCamera::new(self.target, self.alpha, self.beta, self.radius)
    }

    pub fn projection(&self, width: u32, height: u32) -> Projection {
        Projection::new(width, height, self.fovy, self.znear, self.zfar)
    }
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            alpha: Rad(FRAC_PI_2),
            beta: Rad(FRAC_PI_2),
            radius: 10.0,
            fovy: Deg(45.0).into(),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// An opaque clear colour from gamma-encoded (sRGB) components.
///
/// The surface is sRGB, so clear values are linear and get encoded on write.
pub fn srgb_colour(r: f64, g: f64, b: f64) -> wgpu::Color {
    let linear = |c: f64| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    wgpu::Color {
        r: linear(r),
        g: linear(g),
        b: linear(b),
        a: 1.0,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    /// File name below the asset root.
    pub asset: String,
    pub clear_colour: wgpu::Color,
    pub camera: CameraSetup,
    /// Interactive camera controls; `None` keeps the camera fixed.
    pub controls: Option<OrbitSettings>,
    pub light: Light,
    pub placement: ModelPlacement,
}

impl ViewerConfig {
    /// A white page with damped orbit controls and a directional light; the
    /// model is scaled down and turned a quarter around Y on load, then held
    /// at zero rotation every frame.
    pub fn orbit() -> Self {
        Self {
            title: "cat (orbit)".to_string(),
            asset: "cat.gltf".to_string(),
            clear_colour: wgpu::Color::WHITE,
            camera: CameraSetup {
                target: Point3::new(0.0, 0.0, 0.0),
                // (0, 0, 5)
                alpha: Rad(FRAC_PI_2),
                beta: Rad(FRAC_PI_2),
                radius: 5.0,
                fovy: Deg(75.0).into(),
                znear: 0.1,
                zfar: 1000.0,
            },
            controls: Some(OrbitSettings {
                // One full turn per drag across the viewport height
                rotate_speed: RotateSpeed::PerViewportHeight(1.0),
                pan_speed: 0.002,
                zoom_speed: 0.05,
                damping: Some(0.25),
                screen_space_panning: false,
                min_beta: Rad(0.0),
                max_beta: Rad(FRAC_PI_2),
                min_radius: 0.0,
                max_radius: f32::INFINITY,
            }),
            light: Light::Directional {
                direction: Vector3::new(1.0, 1.0, 1.0),
                color: [1.0; 3],
                intensity: 1.0,
            },
            placement: ModelPlacement {
                target: NodeTarget::Root,
                on_attach: Adjustment::Set(Instance {
                    position: Vector3::new(0.0, 0.0, 0.0),
                    rotation: Instance::rotation_from_euler(0.0, FRAC_PI_2, 0.0),
                    scale: Vector3::new(0.6, 0.6, 0.6),
                }),
                every_frame: Some(Instance::rotation_from_euler(0.0, 0.0, 0.0)),
            },
        }
    }

    /// The default dark-blue page (`Color4(0.2, 0.2, 0.3)`) with an arc-rotate camera, a hemispheric
    /// light, and the model's `RootNode` (or `ContainerMesh`) moved by
    /// `y -= -40`.
    pub fn arc_rotate() -> Self {
        Self {
            title: "cat (arc rotate)".to_string(),
            asset: "cat.gltf".to_string(),
            clear_colour: srgb_colour(0.2, 0.2, 0.3),
            camera: CameraSetup {
                target: Point3::new(0.0, 0.0, 0.0),
                alpha: Rad(FRAC_PI_2),
                beta: Rad(FRAC_PI_2),
                radius: 10.0,
                fovy: Rad(0.8),
                znear: 1.0,
                zfar: 10000.0,
            },
            controls: Some(OrbitSettings {
                // angularSensibility 1000
                rotate_speed: RotateSpeed::PerPixel(0.001),
                pan_speed: 0.001,
                zoom_speed: 0.1,
                // inertia 0.9
                damping: Some(0.1),
                screen_space_panning: true,
                min_beta: Rad(0.01),
                max_beta: Rad(PI - 0.01),
                min_radius: 0.0,
                max_radius: f32::INFINITY,
            }),
            light: Light::Hemispheric {
                up: Vector3::new(0.0, 1.0, 0.0),
                sky_color: [1.0; 3],
                ground_color: [0.0; 3],
                intensity: 1.0,
            },
            placement: ModelPlacement {
                target: NodeTarget::Named(vec!["RootNode".to_string(), "ContainerMesh".to_string()]),
                // y -= -40
                on_attach: Adjustment::Translate(Vector3::new(0.0, 40.0, 0.0)),
                every_frame: None,
            },
        }
    }
}
