use std::f32::consts::FRAC_PI_2;

use cat_viewer::{
    config::ViewerConfig,
    data_structures::instance::Instance,
    render::Render,
    stage::{Adjustment, ModelPlacement, NodeTarget, Stage},
};
use cgmath::Vector3;

use crate::common::test_utils::{
    assert_approx, assert_same_rotation, assert_vec3, cat_tree, cat_tree_at, container,
};
mod common;

#[test]
fn attaching_the_model_adds_exactly_one_top_level_node() {
    let mut stage = Stage::new(ViewerConfig::orbit().placement);
    assert_eq!(stage.child_count(), 0);
    assert!(stage.model().is_none());

    stage.attach(cat_tree());

    assert_eq!(stage.child_count(), 1);
    assert_eq!(stage.model().and_then(|m| m.name()), Some("RootNode"));
}

#[test]
fn frame_without_model_is_a_no_op() {
    for config in [ViewerConfig::orbit(), ViewerConfig::arc_rotate()] {
        let mut stage = Stage::new(config.placement);
        assert!(!stage.on_frame());
        assert!(!stage.on_frame());
        assert_eq!(stage.child_count(), 0);
        assert!(matches!(stage.render(), Render::None));
    }
}

#[test]
fn orbit_placement_scales_and_turns_the_model_on_attach() {
    let mut stage = Stage::new(ViewerConfig::orbit().placement);
    stage.attach(cat_tree_at(Vector3::new(3.0, 2.0, 1.0)));

    let local = stage.model().unwrap().get_local_transform();
    assert_vec3(local.position, Vector3::new(0.0, 0.0, 0.0));
    assert_vec3(local.scale, Vector3::new(0.6, 0.6, 0.6));
    assert_same_rotation(local.rotation, Instance::rotation_from_euler(0.0, FRAC_PI_2, 0.0));

    // World transforms are propagated on attach
    let cat = &stage.model().unwrap().get_children()[0];
    assert_vec3(cat.get_world_transform().scale, Vector3::new(0.6, 0.6, 0.6));
}

#[test]
fn orbit_frame_resets_rotation_and_is_idempotent() {
    let mut stage = Stage::new(ViewerConfig::orbit().placement);
    stage.attach(cat_tree());

    assert!(stage.on_frame());
    let after_first = stage.model().unwrap().get_local_transform();
    assert_same_rotation(after_first.rotation, Instance::rotation_from_euler(0.0, 0.0, 0.0));

    assert!(!stage.on_frame());
    let after_second = stage.model().unwrap().get_local_transform();
    assert_eq!(after_first, after_second);
    // Scale survives the rotation reset
    assert_vec3(after_second.scale, Vector3::new(0.6, 0.6, 0.6));
}

#[test]
fn arc_rotate_moves_the_named_node_up_by_forty() {
    let mut stage = Stage::new(ViewerConfig::arc_rotate().placement);
    let file_root = container(None, vec![cat_tree_at(Vector3::new(0.0, 1.5, -2.0))]);
    stage.attach(file_root);

    let root_node = &stage.model().unwrap().get_children()[0];
    assert_eq!(root_node.name(), Some("RootNode"));
    assert_vec3(
        root_node.get_local_transform().position,
        Vector3::new(0.0, 41.5, -2.0),
    );
    let cat = &root_node.get_children()[0];
    assert_approx(cat.get_world_transform().position.y, 41.5);

    // No per-frame adjustment in this variant
    assert!(!stage.on_frame());
}

#[test]
fn first_matching_name_wins_depth_first() {
    let placement = ModelPlacement {
        target: NodeTarget::Named(vec!["RootNode".to_string(), "ContainerMesh".to_string()]),
        on_attach: Adjustment::Translate(Vector3::new(0.0, 40.0, 0.0)),
        every_frame: None,
    };
    let mut stage = Stage::new(placement);
    stage.attach(container(
        None,
        vec![
            container(Some("Ears"), vec![container(Some("ContainerMesh"), vec![])]),
            container(Some("RootNode"), vec![]),
        ],
    ));

    let model = stage.model().unwrap();
    let container_mesh = &model.get_children()[0].get_children()[0];
    let root_node = &model.get_children()[1];
    assert_approx(container_mesh.get_local_transform().position.y, 40.0);
    assert_approx(root_node.get_local_transform().position.y, 0.0);
}

#[test]
fn missing_named_node_leaves_the_model_unplaced() {
    let mut stage = Stage::new(ViewerConfig::arc_rotate().placement);
    stage.attach(container(Some("Scene"), vec![container(Some("Tail"), vec![])]));

    assert_eq!(stage.child_count(), 1);
    let model = stage.model().unwrap();
    assert_eq!(model.get_local_transform(), Instance::default());
    assert_eq!(model.get_children()[0].get_local_transform(), Instance::default());
    assert!(!stage.on_frame());
}

#[test]
fn attached_containers_render_as_an_empty_batch() {
    let mut stage = Stage::new(ViewerConfig::orbit().placement);
    stage.attach(cat_tree());
    let render = stage.render();
    assert!(matches!(render, Render::Defaults(_)));
    assert_eq!(render.draw_count(), 0);
}
