use wgpu::util::DeviceExt;

/// The scene's single light: its uniform and the GPU objects that bind it.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(light: Light, device: &wgpu::Device) -> Self {
        let uniform = LightUniform::from(light);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Replaces the light. The bind group keeps pointing at the same buffer.
    pub fn set(&mut self, light: Light, queue: &wgpu::Queue) {
        self.uniform = light.into();
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// The light kinds the shader understands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Parallel rays arriving from `direction` (pointing towards the light).
    Directional {
        direction: cgmath::Vector3<f32>,
        color: [f32; 3],
        intensity: f32,
    },
    /// Sky colour from `up`, fading to `ground_color` from the opposite side.
    Hemispheric {
        up: cgmath::Vector3<f32>,
        sky_color: [f32; 3],
        ground_color: [f32; 3],
        intensity: f32,
    },
}

const DIRECTIONAL: u32 = 0;
const HEMISPHERIC: u32 = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 3],
    pub kind: u32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub ground_color: [f32; 3],
    // Uniforms require 16 byte (4 float) spacing
    _padding: u32,
}

impl From<Light> for LightUniform {
    fn from(light: Light) -> Self {
        use cgmath::InnerSpace;
        match light {
            Light::Directional {
                direction,
                color,
                intensity,
            } => Self {
                direction: direction.normalize().into(),
                kind: DIRECTIONAL,
                color,
                intensity,
                ground_color: [0.0; 3],
                _padding: 0,
            },
            Light::Hemispheric {
                up,
                sky_color,
                ground_color,
                intensity,
            } => Self {
                direction: up.normalize().into(),
                kind: HEMISPHERIC,
                color: sky_color,
                intensity,
                ground_color,
                _padding: 0,
            },
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
