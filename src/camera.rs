//! Orbit camera, projection, interactive controls and the camera uniform.
//!
//! The camera always looks at a target point from a position on a sphere
//! around it. `alpha` is the azimuth measured from +X towards +Z and `beta`
//! the polar angle measured from +Y, so `alpha = beta = π/2` puts the camera
//! on the +Z axis.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// Keeps `look_at` away from the degenerate case where view and up align.
const POLE_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub alpha: Rad<f32>,
    pub beta: Rad<f32>,
    pub radius: f32,
}

impl OrbitCamera {
    pub fn new<A: Into<Rad<f32>>, B: Into<Rad<f32>>>(
        target: Point3<f32>,
        alpha: A,
        beta: B,
        radius: f32,
    ) -> Self {
        Self {
            target,
            alpha: alpha.into(),
            beta: beta.into(),
            radius,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_alpha, cos_alpha) = self.alpha.0.sin_cos();
        let (sin_beta, cos_beta) = self.beta.0.sin_cos();
        self.target
            + Vector3::new(
                cos_alpha * sin_beta,
                cos_beta,
                sin_alpha * sin_beta,
            ) * self.radius
    }

    /// Unit vector pointing from the camera to its target.
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position()).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height).unwrap_or(1.0),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Sets the aspect ratio from the new viewport; zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(aspect) = aspect_ratio(width, height) {
            self.aspect = aspect;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    (width > 0 && height > 0).then(|| width as f32 / height as f32)
}

/// How mouse movement maps to rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotateSpeed {
    /// Fixed radians per pixel.
    PerPixel(f32),
    /// Full turns per drag across the viewport height, so the drag speed
    /// follows the window size.
    PerViewportHeight(f32),
}

/// Tuning and limits of an [`OrbitController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    pub rotate_speed: RotateSpeed,
    /// World units per pixel at a radius of one.
    pub pan_speed: f32,
    /// Fractional radius change per scroll line.
    pub zoom_speed: f32,
    /// Share of the pending motion applied per update; `None` applies it all at once.
    pub damping: Option<f32>,
    /// Pan along the screen plane instead of the ground plane.
    pub screen_space_panning: bool,
    pub min_beta: Rad<f32>,
    pub max_beta: Rad<f32>,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: RotateSpeed::PerPixel(0.005),
            pan_speed: 0.002,
            zoom_speed: 0.05,
            damping: None,
            screen_space_panning: true,
            min_beta: Rad(0.0),
            max_beta: Rad(std::f32::consts::PI),
            min_radius: 0.0,
            max_radius: f32::INFINITY,
        }
    }
}

/// Accumulates mouse input and applies it to an [`OrbitCamera`] once per frame.
#[derive(Clone, Debug)]
pub struct OrbitController {
    settings: OrbitSettings,
    delta_alpha: f32,
    delta_beta: f32,
    pan: Vector3<f32>,
    zoom: f32,
    pending_pan: (f32, f32),
    viewport_height: u32,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            delta_alpha: 0.0,
            delta_beta: 0.0,
            pan: Vector3::new(0.0, 0.0, 0.0),
            zoom: 1.0,
            pending_pan: (0.0, 0.0),
            viewport_height: 0,
        }
    }

    /// Rotation drag; positive `dy` (mouse moving down) raises the camera.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        let speed = self.radians_per_pixel();
        self.delta_alpha += dx as f32 * speed;
        self.delta_beta -= dy as f32 * speed;
    }

    /// Tracks the viewport for viewport-relative rotation; zero heights are ignored.
    pub fn resize(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height;
        }
    }

    /// Zero until a viewport is known when the speed is viewport-relative.
    pub fn radians_per_pixel(&self) -> f32 {
        match self.settings.rotate_speed {
            RotateSpeed::PerPixel(speed) => speed,
            RotateSpeed::PerViewportHeight(_) if self.viewport_height == 0 => 0.0,
            RotateSpeed::PerViewportHeight(turns) => {
                turns * 2.0 * std::f32::consts::PI / self.viewport_height as f32
            }
        }
    }

    /// Pan drag, converted to world space on the next update.
    pub fn handle_pan(&mut self, dx: f64, dy: f64) {
        self.pending_pan.0 += dx as f32;
        self.pending_pan.1 += dy as f32;
    }

    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
        };
        // Scrolling up zooms in
        self.zoom *= (1.0 - self.settings.zoom_speed).powf(lines);
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.handle_scroll(delta);
        }
    }

    /// True while damped motion is still being applied.
    pub fn is_moving(&self) -> bool {
        const REST: f32 = 1e-6;
        self.delta_alpha.abs() > REST
            || self.delta_beta.abs() > REST
            || self.pan.magnitude2() > REST * REST
    }

    pub fn update(&mut self, camera: &mut OrbitCamera) {
        self.resolve_pan(camera);

        let factor = self.settings.damping.unwrap_or(1.0).clamp(0.0, 1.0);
        camera.alpha += Rad(self.delta_alpha * factor);
        camera.beta += Rad(self.delta_beta * factor);
        camera.target += self.pan * factor;
        camera.radius *= self.zoom;

        match self.settings.damping {
            Some(damping) => {
                let keep = 1.0 - damping.clamp(0.0, 1.0);
                self.delta_alpha *= keep;
                self.delta_beta *= keep;
                self.pan *= keep;
            }
            None => {
                self.delta_alpha = 0.0;
                self.delta_beta = 0.0;
                self.pan = Vector3::new(0.0, 0.0, 0.0);
            }
        }
        self.zoom = 1.0;

        let min_beta = self.settings.min_beta.0.max(POLE_EPSILON);
        let max_beta = self
            .settings
            .max_beta
            .0
            .min(std::f32::consts::PI - POLE_EPSILON)
            .max(min_beta);
        camera.beta = Rad(camera.beta.0.clamp(min_beta, max_beta));
        camera.radius = camera
            .radius
            .clamp(self.settings.min_radius, self.settings.max_radius);
    }

    fn resolve_pan(&mut self, camera: &OrbitCamera) {
        let (dx, dy) = std::mem::take(&mut self.pending_pan);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let forward = camera.forward();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = if self.settings.screen_space_panning {
            right.cross(forward).normalize()
        } else {
            // Move along the ground plane instead of the screen's up axis
            Vector3::unit_y().cross(right).normalize()
        };
        let scale = self.settings.pan_speed * camera.radius;
        self.pan += (-right * dx + up * dy) * scale;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state plus the GPU objects that expose it to shaders.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    /// Interactive controls; `None` when the camera is fixed.
    pub controller: Option<OrbitController>,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    /// Applies pending control input and refreshes the uniform.
    pub fn update(&mut self, projection: &Projection, queue: &wgpu::Queue) {
        if let Some(controller) = self.controller.as_mut() {
            controller.update(&mut self.camera);
        }
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
