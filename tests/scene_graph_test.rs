use std::f32::consts::FRAC_PI_2;

use cat_viewer::data_structures::{
    instance::Instance,
    scene_graph::{count_nodes, find_node_mut},
};
use cgmath::Vector3;

use crate::common::test_utils::{assert_vec3, cat_tree, container};
mod common;

#[test]
fn world_transform_is_parent_times_local() {
    let mut root = container(Some("Parent"), vec![container(Some("Child"), vec![])]);
    root.set_local_transform(Instance {
        position: Vector3::new(1.0, 0.0, 0.0),
        rotation: Instance::rotation_from_euler(0.0, FRAC_PI_2, 0.0),
        scale: Vector3::new(2.0, 2.0, 2.0),
    });
    root.get_children_mut()[0].set_local_transform(Vector3::new(1.0, 0.0, 0.0).into());

    root.update_world_transform(&Instance::default());

    let child = root.get_children()[0].get_world_transform();
    // Scaled by two, then a quarter turn around Y maps +X to -Z
    assert_vec3(child.position, Vector3::new(1.0, 0.0, -2.0));
    assert_vec3(child.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn moving_a_parent_moves_its_children() {
    let mut root = cat_tree();
    root.update_world_transform(&Instance::default());
    assert_vec3(
        root.get_children()[0].get_world_transform().position,
        Vector3::new(0.0, 0.0, 0.0),
    );

    root.set_local_transform(Vector3::new(0.0, 40.0, 0.0).into());
    root.update_world_transform(&Instance::default());
    assert_vec3(
        root.get_children()[0].get_world_transform().position,
        Vector3::new(0.0, 40.0, 0.0),
    );
}

#[test]
fn find_by_name_searches_the_whole_tree() {
    let mut root = container(
        None,
        vec![container(Some("Body"), vec![container(Some("Tail"), vec![])])],
    );
    assert_eq!(count_nodes(root.as_ref()), 3);

    let tail = find_node_mut(root.as_mut(), &["Tail".to_string()]).expect("tail");
    assert_eq!(tail.name(), Some("Tail"));
    assert!(find_node_mut(root.as_mut(), &["Whiskers".to_string()]).is_none());
}

#[test]
fn container_nodes_draw_nothing() {
    let root = cat_tree();
    assert!(root.get_render().is_empty());
}
