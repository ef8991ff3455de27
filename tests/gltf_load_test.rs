use cat_viewer::resources::{
    GltfAsset, check_hierarchy, load_binary, load_gltf, load_string, read_primitive,
};

#[tokio::test]
async fn loads_the_bundled_cat() {
    let asset = load_gltf("cat.gltf").await.expect("cat.gltf should load");

    assert_eq!(asset.name, "cat.gltf");
    assert_eq!(asset.node_names(), vec!["RootNode", "Cat"]);
    assert_eq!(asset.buffers.len(), 1);
    assert_eq!(asset.buffers[0].len(), 7560);
    assert!(asset.images.is_empty());
}

#[tokio::test]
async fn reads_the_cat_mesh() {
    let asset = load_gltf("cat.gltf").await.unwrap();
    let mesh = asset.document.meshes().next().expect("one mesh");
    assert_eq!(mesh.name(), Some("CatMesh"));

    let primitive = mesh.primitives().next().expect("one primitive");
    let (vertices, indices) = read_primitive(&primitive, &asset.buffers).unwrap();
    assert_eq!(vertices.len(), 216);
    assert_eq!(indices.len(), 324);
    assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    // Every vertex has a unit normal
    for vertex in &vertices {
        let [x, y, z] = vertex.normal;
        assert!(((x * x + y * y + z * z) - 1.0).abs() < 1e-4);
    }
}

#[tokio::test]
async fn root_node_has_no_transform_of_its_own() {
    let asset = load_gltf("cat.gltf").await.unwrap();
    let scene = asset.document.default_scene().expect("default scene");
    let root = scene.nodes().next().unwrap();
    assert_eq!(root.name(), Some("RootNode"));
    let (translation, _, scale) = root.transform().decomposed();
    assert_eq!(translation, [0.0; 3]);
    assert_eq!(scale, [1.0; 3]);
}

#[tokio::test]
async fn missing_asset_is_an_error() {
    let err = load_gltf("dog.gltf").await.unwrap_err();
    assert!(format!("{err:#}").contains("dog.gltf"));
}

#[tokio::test]
async fn raw_loaders_read_below_assets() {
    let text = load_string("cat.gltf").await.unwrap();
    assert!(text.contains("\"RootNode\""));
    let bytes = load_binary("cat.bin").await.unwrap();
    assert_eq!(bytes.len(), 7560);
}

async fn parse_unchecked(file_name: &str) -> GltfAsset {
    let bytes = load_binary(file_name).await.unwrap();
    GltfAsset {
        name: file_name.to_string(),
        document: gltf::Gltf::from_slice(&bytes).unwrap().document,
        buffers: Vec::new(),
        images: Vec::new(),
    }
}

#[tokio::test]
async fn cyclic_hierarchy_is_rejected_on_load() {
    let err = load_gltf("tests/cyclic.gltf").await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("tests/cyclic.gltf"), "{message}");
    assert!(message.contains("reachable more than once"), "{message}");
}

#[tokio::test]
async fn shared_child_is_rejected_on_load() {
    let err = load_gltf("tests/shared_child.gltf").await.unwrap_err();
    assert!(format!("{err:#}").contains("reachable more than once"));
}

#[tokio::test]
async fn node_names_terminate_on_a_cycle() {
    let asset = parse_unchecked("tests/cyclic.gltf").await;
    assert!(check_hierarchy(&asset.document).is_err());
    assert_eq!(asset.node_names(), vec!["Head", "Tail"]);
}

#[tokio::test]
async fn shared_child_is_named_once() {
    let asset = parse_unchecked("tests/shared_child.gltf").await;
    assert_eq!(
        asset.node_names(),
        vec!["Body", "LeftPaw", "Claw", "RightPaw"]
    );
}

#[tokio::test]
async fn bundled_cat_is_a_tree() {
    let asset = load_gltf("cat.gltf").await.unwrap();
    assert!(check_hierarchy(&asset.document).is_ok());
}
