//! The scene root.
//!
//! A [`Stage`] holds the top-level scene nodes and remembers which of them is
//! the loaded model. Until the asset arrives there is no model and every
//! per-frame operation is a no-op.

use crate::{
    data_structures::{
        instance::Instance,
        scene_graph::{SceneNode, find_node_mut},
    },
    render::Render,
};

/// Which node of the loaded model a placement applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeTarget {
    /// The attached root node itself.
    Root,
    /// The first node, depth-first, whose name is one of these.
    Named(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// Replace the local transform.
    Set(Instance),
    /// Move the local position by an offset.
    Translate(cgmath::Vector3<f32>),
}

impl Adjustment {
    fn apply(&self, local: Instance) -> Instance {
        match *self {
            Adjustment::Set(instance) => instance,
            Adjustment::Translate(offset) => Instance {
                position: local.position + offset,
                ..local
            },
        }
    }
}

/// How a freshly loaded model is positioned.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPlacement {
    pub target: NodeTarget,
    /// Applied once when the model is attached.
    pub on_attach: Adjustment,
    /// Rotation written back to the target every frame.
    pub every_frame: Option<cgmath::Quaternion<f32>>,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            target: NodeTarget::Root,
            on_attach: Adjustment::Translate(cgmath::Vector3::new(0.0, 0.0, 0.0)),
            every_frame: None,
        }
    }
}

pub struct Stage {
    nodes: Vec<Box<dyn SceneNode>>,
    model: Option<usize>,
    placement: ModelPlacement,
}

impl Stage {
    pub fn new(placement: ModelPlacement) -> Self {
        Self {
            nodes: Vec::new(),
            model: None,
            placement,
        }
    }

    /// Number of top-level nodes.
    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn model(&self) -> Option<&dyn SceneNode> {
        self.model
            .and_then(|idx| self.nodes.get(idx))
            .map(|node| node.as_ref())
    }

    /**
     * Adds the loaded model as one top-level node and places it.
     *
     * A named target that is missing from the model is logged and the
     * model stays where the file put it.
     */
    pub fn attach(&mut self, node: Box<dyn SceneNode>) {
        self.nodes.push(node);
        let idx = self.nodes.len() - 1;
        self.model = Some(idx);

        let adjustment = self.placement.on_attach;
        match self.target_mut() {
            Some(target) => {
                let local = adjustment.apply(target.get_local_transform());
                target.set_local_transform(local);
            }
            None => log::warn!(
                "no node matching {:?} in the loaded model, leaving it unplaced",
                self.placement.target
            ),
        }
        self.update_world_transforms();
        log::info!("model attached, scene has {} top-level nodes", self.nodes.len());
    }

    /// Per-frame model update. Returns whether any transform changed.
    pub fn on_frame(&mut self) -> bool {
        let Some(rotation) = self.placement.every_frame else {
            return false;
        };
        let Some(target) = self.target_mut() else {
            return false;
        };
        let mut local = target.get_local_transform();
        if local.rotation == rotation {
            return false;
        }
        local.rotation = rotation;
        target.set_local_transform(local);
        self.update_world_transforms();
        true
    }

    pub fn update_world_transforms(&mut self) {
        let root = Instance::default();
        for node in self.nodes.iter_mut() {
            node.update_world_transform(&root);
        }
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.nodes
            .iter_mut()
            .for_each(|node| node.write_to_buffers(queue));
    }

    /// Nothing until a model is attached.
    pub fn render(&self) -> Render<'_> {
        if self.model.is_none() {
            return Render::None;
        }
        Render::Defaults(
            self.nodes
                .iter()
                .flat_map(|node| node.get_render())
                .collect(),
        )
    }

    fn target_mut(&mut self) -> Option<&mut (dyn SceneNode + 'static)> {
        let node = self.nodes.get_mut(self.model?)?.as_mut();
        match &self.placement.target {
            NodeTarget::Root => Some(node),
            NodeTarget::Named(names) => find_node_mut(node, names),
        }
    }
}
