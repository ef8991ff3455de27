//! cat-viewer
//!
//! A minimal, cross-platform glTF viewer with native and WASM builds. It
//! loads a single model, places it in a scene lit by one light, and renders
//! it through an orbiting camera until the window (or page) goes away.
//!
//! High-level modules
//! - `camera`: orbit camera, interactive controller and uniforms for view/projection
//! - `config`: the viewer presets (`orbit` and `arc_rotate`)
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, textures, scene graph)
//! - `flow`: high level flow control and the event loop
//! - `pipelines`: the basic model pipeline and light uniforms
//! - `resources`: helpers to load glTF assets and create GPU resources
//! - `render`: render composition for the draw loop
//! - `stage`: the scene root holding the loaded model
//! - `viewer`: the demo flow and its entry points
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod stage;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use config::ViewerConfig;
pub use viewer::launch;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
