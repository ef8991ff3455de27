//! The demo flow: load one model, place it and keep it placed.

use log::{error, info};

use crate::{
    config::ViewerConfig,
    context::Context,
    flow::{FlowConstructor, GraphicsFlow, Out, StateFuture},
    render::Render,
    resources::{GltfAsset, load_gltf, upload_gltf},
    stage::Stage,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// State shared between the flow and its async load.
#[derive(Debug, Default)]
pub struct ViewerState {
    /// Set once the load finished, taken by the next update.
    pub loaded: Option<anyhow::Result<GltfAsset>>,
}

pub struct CatViewer {
    config: ViewerConfig,
    stage: Stage,
}

impl CatViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let stage = Stage::new(config.placement.clone());
        Self { config, stage }
    }

    /// Attaches the result of a finished load, if there is one.
    fn receive(&mut self, ctx: &Context, state: &mut ViewerState) {
        match state.loaded.take() {
            Some(Ok(asset)) => match upload_gltf(&asset, &ctx.device, &ctx.queue) {
                Ok(node) => {
                    self.stage.attach(node);
                    self.stage.write_to_buffers(&ctx.queue);
                }
                Err(e) => error!("could not upload {}: {:#}", asset.name, e),
            },
            Some(Err(e)) => error!("could not load {}: {:#}", self.config.asset, e),
            None => (),
        }
    }
}

impl GraphicsFlow<ViewerState> for CatViewer {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut ViewerState) -> Out<ViewerState> {
        ctx.clear_colour = self.config.clear_colour;
        ctx.configure_camera(&self.config);
        ctx.configure_light(&self.config);

        let asset = self.config.asset.clone();
        info!("loading {}", asset);
        let load: StateFuture<ViewerState> = Box::new(async move {
            let result = load_gltf(&asset).await;
            Box::new(move |state: &mut ViewerState| state.loaded = Some(result))
                as Box<dyn FnOnce(&mut ViewerState)>
        });
        Out::FutFn(vec![load])
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut ViewerState,
        _dt: instant::Duration,
    ) -> Out<ViewerState> {
        self.receive(ctx, state);
        if self.stage.on_frame() {
            self.stage.write_to_buffers(&ctx.queue);
        }
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &winit::event::DeviceEvent,
    ) -> Out<ViewerState> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &winit::event::WindowEvent,
    ) -> Out<ViewerState> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        self.stage.render()
    }
}

/// Opens a window (or binds the page canvas) and runs the viewer until it closes.
pub fn launch(config: ViewerConfig) -> anyhow::Result<()> {
    let title = config.title.clone();
    let constructor: FlowConstructor<ViewerState> = Box::new(move || {
        Box::pin(async move { Box::new(CatViewer::new(config)) as Box<dyn GraphicsFlow<ViewerState>> })
    });
    crate::flow::run(&title, vec![constructor])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_orbit() -> Result<(), JsValue> {
    launch(ViewerConfig::orbit()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_arc_rotate() -> Result<(), JsValue> {
    launch(ViewerConfig::arc_rotate()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
