#![allow(dead_code)]

use cat_viewer::data_structures::{
    instance::Instance,
    scene_graph::{ContainerNode, SceneNode},
};
use cgmath::{Point3, Quaternion, Vector3};

pub const EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

#[track_caller]
pub fn assert_approx(actual: f32, expected: f32) {
    assert!(
        approx_eq(actual, expected),
        "expected {expected}, got {actual}"
    );
}

#[track_caller]
pub fn assert_vec3(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        approx_eq(actual.x, expected.x) && approx_eq(actual.y, expected.y) && approx_eq(actual.z, expected.z),
        "expected {expected:?}, got {actual:?}"
    );
}

#[track_caller]
pub fn assert_point3(actual: Point3<f32>, expected: Point3<f32>) {
    assert_vec3(
        Vector3::new(actual.x, actual.y, actual.z),
        Vector3::new(expected.x, expected.y, expected.z),
    );
}

/// Quaternions `q` and `-q` describe the same rotation.
#[track_caller]
pub fn assert_same_rotation(actual: Quaternion<f32>, expected: Quaternion<f32>) {
    let dot = actual.s * expected.s
        + actual.v.x * expected.v.x
        + actual.v.y * expected.v.y
        + actual.v.z * expected.v.z;
    assert!(
        approx_eq(dot.abs(), 1.0),
        "expected {expected:?}, got {actual:?}"
    );
}

/// Builds `name` with the given children, already boxed for a scene.
pub fn container(name: Option<&str>, children: Vec<Box<dyn SceneNode>>) -> Box<dyn SceneNode> {
    let mut node = ContainerNode::new(name.map(str::to_string));
    node.children = children;
    Box::new(node)
}

/// The shape of the bundled asset: `RootNode` holding a `Cat` node.
pub fn cat_tree() -> Box<dyn SceneNode> {
    container(Some("RootNode"), vec![container(Some("Cat"), vec![])])
}

/// Same shape, placed at `position` like a file-provided transform would.
pub fn cat_tree_at(position: Vector3<f32>) -> Box<dyn SceneNode> {
    let mut tree = cat_tree();
    tree.set_local_transform(Instance::from(position));
    tree
}
