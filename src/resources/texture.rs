use crate::{
    data_structures::{model, texture::Texture},
    resources::GltfAsset,
};

/// Bind group layout for group 0: base colour texture and its sampler.
pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

/**
 * Creates one material per glTF material. The base colour texture wins when
 * present; otherwise the base colour factor becomes a 1x1 texture so every
 * mesh can use the same pipeline.
 *
 * A trailing default material covers primitives without a material index.
 */
pub fn upload_materials(
    asset: &GltfAsset,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Vec<model::Material> {
    let layout = diffuse_layout(device);
    let mut materials: Vec<model::Material> = asset
        .document
        .materials()
        .enumerate()
        .map(|(idx, material)| {
            let name = material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} material {}", asset.name, idx));
            let pbr = material.pbr_metallic_roughness();
            let image = pbr
                .base_color_texture()
                .and_then(|info| asset.images.get(info.texture().source().index()))
                .and_then(Option::as_ref);
            let diffuse_texture = match image {
                Some(img) => Texture::from_image(device, queue, img, Some(&name)),
                None => Texture::from_color(pbr.base_color_factor(), device, queue, &name),
            };
            model::Material::new(device, &name, diffuse_texture, &layout)
        })
        .collect();

    let fallback = Texture::from_color([1.0; 4], device, queue, "default material");
    materials.push(model::Material::new(
        device,
        "default material",
        fallback,
        &layout,
    ));
    materials
}
