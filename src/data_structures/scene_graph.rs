//! Scene graph and hierarchical scene organization.
//!
//! A loaded glTF file becomes a tree of [`SceneNode`]s: [`ContainerNode`]s
//! for nodes without geometry and [`ModelNode`]s for nodes that own a mesh.
//! Each node keeps its glTF name, a local transform relative to its parent and
//! the world transform computed by [`SceneNode::update_world_transform`].

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{instance::Instance, model},
    render::Instanced,
};

pub trait SceneNode {
    /// The node name from the source file, if it had one.
    fn name(&self) -> Option<&str>;

    fn get_local_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> Instance;

    /**
     * Recomputes this node's world transform as `parent * local` and passes
     * the result down to every child.
     */
    fn update_world_transform(&mut self, parent: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Uploads world transforms of this subtree to the GPU.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    /// All instanced draws of this subtree.
    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// Depth-first, pre-order search for the first node whose name is in `names`.
pub fn find_node_mut<'a>(
    node: &'a mut (dyn SceneNode + 'static),
    names: &[String],
) -> Option<&'a mut (dyn SceneNode + 'static)> {
    if node
        .name()
        .is_some_and(|name| names.iter().any(|wanted| wanted == name))
    {
        return Some(node);
    }
    node.get_children_mut()
        .iter_mut()
        .find_map(|child| find_node_mut(child.as_mut(), names))
}

/// Number of nodes in the subtree rooted at `node`, including `node`.
pub fn count_nodes(node: &dyn SceneNode) -> usize {
    1 + node
        .get_children()
        .iter()
        .map(|child| count_nodes(child.as_ref()))
        .sum::<usize>()
}

/// A node without geometry that only groups and transforms its children.
pub struct ContainerNode {
    name: Option<String>,
    local: Instance,
    world: Instance,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            local: Instance::default(),
            world: Instance::default(),
            children: Vec::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Some(name.to_string()))
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> Instance {
        self.world
    }

    fn update_world_transform(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transform(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A node that owns a GPU model and a one-element instance buffer holding
/// its world transform.
pub struct ModelNode {
    name: Option<String>,
    local: Instance,
    world: Instance,
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    model: model::Model,
}

impl ModelNode {
    pub fn from_model(name: Option<String>, device: &wgpu::Device, model: model::Model) -> Self {
        let world = Instance::default();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Instance Buffer", name)),
            contents: bytemuck::cast_slice(&[world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            name,
            local: Instance::default(),
            world,
            children: Vec::new(),
            instance_buffer,
            model,
        }
    }
}

impl SceneNode for ModelNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> Instance {
        self.world
    }

    fn update_world_transform(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transform(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.world.to_raw()]),
        );
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: 1,
            }])
            .collect()
    }
}
