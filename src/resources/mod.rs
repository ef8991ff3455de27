//! Loading of external files: raw bytes, glTF documents and their GPU upload.
//!
//! Loading is split in two phases. [`load_gltf`] is async and GPU-free: it
//! reads the document, its buffers and decodes its images. [`upload_gltf`]
//! runs on the render thread and turns a [`GltfAsset`] into scene nodes.

use std::{collections::HashSet, sync::Arc};

use anyhow::{Context as _, anyhow, bail};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    model::{self, ModelVertex},
    scene_graph::{ContainerNode, ModelNode, SceneNode},
    texture::decode_image,
};

pub mod texture;

/// A parsed glTF file with every buffer and image it references resolved.
pub struct GltfAsset {
    pub name: String,
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
    /// Decoded images by glTF image index; `None` if decoding failed.
    pub images: Vec<Option<image::DynamicImage>>,
}

impl std::fmt::Debug for GltfAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GltfAsset")
            .field("name", &self.name)
            .field("buffers", &self.buffers.len())
            .field("images", &self.images.len())
            .finish()
    }
}

impl GltfAsset {
    /// Names of all nodes reachable from the asset's scenes, in depth-first order.
    ///
    /// A node reachable twice (a cycle or a shared child) is listed once.
    pub fn node_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scene in self.document.scenes() {
            let mut seen = HashSet::new();
            let mut stack: Vec<gltf::Node> = scene.nodes().collect();
            stack.reverse();
            while let Some(node) = stack.pop() {
                if !seen.insert(node.index()) {
                    continue;
                }
                if let Some(name) = node.name() {
                    names.push(name.to_string());
                }
                let mut children: Vec<gltf::Node> = node.children().collect();
                children.reverse();
                stack.extend(children);
            }
        }
        names
    }
}

/// Fails if a scene's node graph is not a tree.
///
/// glTF requires every node to have at most one parent; parsing does not
/// enforce it, and a cycle would otherwise recurse forever.
pub fn check_hierarchy(document: &gltf::Document) -> anyhow::Result<()> {
    for scene in document.scenes() {
        let mut seen = HashSet::new();
        let mut stack: Vec<gltf::Node> = scene.nodes().collect();
        while let Some(node) = stack.pop() {
            if !seen.insert(node.index()) {
                bail!(
                    "node {} ({:?}) is reachable more than once in scene {}",
                    node.index(),
                    node.name(),
                    scene.index()
                );
            }
            stack.extend(node.children());
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };

    Ok(data)
}

/// Resolves `uri` relative to the directory of `file_name`.
fn sibling(file_name: &str, uri: &str) -> String {
    match file_name.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, uri),
        None => uri.to_string(),
    }
}

pub async fn load_gltf(file_name: &str) -> anyhow::Result<GltfAsset> {
    let bytes = load_binary(file_name).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).with_context(|| format!("parsing {}", file_name))?;
    check_hierarchy(&gltf.document).with_context(|| format!("checking {}", file_name))?;

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .as_deref()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| anyhow!("{} references a missing binary chunk", file_name))?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("{}: embedded data URIs are not supported", file_name)
            }
            gltf::buffer::Source::Uri(uri) => load_binary(&sibling(file_name, uri)).await?,
        };
        if data.len() < buffer.length() {
            bail!(
                "{}: buffer {} has {} bytes, expected {}",
                file_name,
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffers.push(data);
    }

    let mut images = Vec::new();
    for image in gltf.images() {
        let decoded = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                let data = buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                    .ok_or_else(|| anyhow!("{}: image {} is out of bounds", file_name, image.index()))?;
                decode_image(data, Some(mime_type))
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let data = load_binary(&sibling(file_name, uri)).await?;
                decode_image(&data, mime_type)
            }
        };
        images.push(match decoded {
            Ok(img) => Some(img),
            Err(e) => {
                log::warn!("{}: image {} could not be decoded: {}", file_name, image.index(), e);
                None
            }
        });
    }

    log::info!(
        "loaded {} ({} buffers, {} images, {} nodes)",
        file_name,
        buffers.len(),
        images.len(),
        gltf.nodes().count()
    );

    Ok(GltfAsset {
        name: file_name.to_string(),
        document: gltf.document,
        buffers,
        images,
    })
}

/// Reads vertices and triangle-list indices of one primitive.
///
/// Missing normals or texture coordinates are zero-filled; a primitive
/// without indices is drawn in vertex order.
pub fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> anyhow::Result<(Vec<ModelVertex>, Vec<u32>)> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!("primitive mode {:?} is not supported", primitive.mode());
    }
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .ok_or_else(|| anyhow!("primitive {} has no positions", primitive.index()))?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        bail!("index {} out of range for {} vertices", bad, vertices.len());
    }
    Ok((vertices, indices))
}

fn to_scene_node(
    node: gltf::Node,
    asset: &GltfAsset,
    device: &wgpu::Device,
    materials: &[Arc<model::Material>],
    seen: &mut HashSet<usize>,
) -> anyhow::Result<Box<dyn SceneNode>> {
    if !seen.insert(node.index()) {
        bail!("{}: node {} is reachable more than once", asset.name, node.index());
    }
    let name = node.name().map(str::to_string);
    let fallback_material = materials.len() - 1;
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                let (vertices, indices) = match read_primitive(&primitive, &asset.buffers) {
                    Ok(data) => data,
                    Err(e) => {
                        log::warn!(
                            "{}: skipping primitive {} of mesh {:?}: {}",
                            asset.name,
                            primitive.index(),
                            mesh.name(),
                            e
                        );
                        continue;
                    }
                };
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                meshes.push(model::Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material: primitive.material().index().unwrap_or(fallback_material),
                });
            }
            let model = model::Model {
                meshes,
                materials: materials.to_vec(),
            };
            Box::new(ModelNode::from_model(name, device, model))
        }
        None => Box::new(ContainerNode::new(name)),
    };
    scene_node.set_local_transform(Instance::from(node.transform()));
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, asset, device, materials, seen)?);
    }
    Ok(scene_node)
}

/// Creates the GPU scene graph for `asset`.
///
/// The result is always a single node: a file with several root nodes is
/// wrapped in one unnamed container.
pub fn upload_gltf(
    asset: &GltfAsset,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let materials: Vec<Arc<model::Material>> = texture::upload_materials(asset, device, queue)
        .into_iter()
        .map(Arc::new)
        .collect();

    let scene = asset
        .document
        .default_scene()
        .or_else(|| asset.document.scenes().next())
        .ok_or_else(|| anyhow!("{} contains no scene", asset.name))?;

    let mut seen = HashSet::new();
    let mut roots: Vec<Box<dyn SceneNode>> = scene
        .nodes()
        .map(|node| to_scene_node(node, asset, device, &materials, &mut seen))
        .collect::<anyhow::Result<_>>()?;

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut container = ContainerNode::new(None);
        container.children = roots;
        Box::new(container)
    };
    Ok(root)
}
