//! Flow control and application event loop.
//!
//! A "flow" is a self-contained piece of the application that reacts to
//! input, updates its state once per frame and says what to draw. The loop
//! owns the GPU [`Context`], hands it to every flow and renders their output.
//!
//! # Lifecycle Flow
//!
//! 1. Create the window (or bind the `canvas` element on the web)
//! 2. Build the [`Context`] and construct all flows asynchronously
//! 3. Call `on_init` once per flow
//! 4. Forward window/device events to the camera controls and to every flow
//! 5. On every redraw: render, update the camera, call `on_update`, request the next frame
//! 6. On resize: reconfigure surface, depth buffer, projection and controls

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, MouseButtonState},
    data_structures::model::DrawModel,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A future resolving into a one-shot mutation of the shared state.
pub type StateFuture<S> = Box<dyn Future<Output = Box<dyn FnOnce(&mut S)>>>;

///
/// The output type of every lifecycle hook.
///
/// `Out::FutFn` resolves futures into one-shot mutations of the shared state.
/// On native targets they are driven to completion right away; on the web
/// they complete whenever the browser delivers the data and the mutation
/// reaches the state through the event loop.
///
/// `Empty` is the default output used when nothing needs to be handled.
///
pub enum Out<S> {
    FutFn(Vec<StateFuture<S>>),
    Empty,
}

impl<S> Default for Out<S> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for a renderable part of the application.
///
/// 1. `on_init()` is called once after construction; configure the context here
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_update()` is called every frame after rendering
/// 4. `on_render()` is called each frame and specifies how to render `self`
pub trait GraphicsFlow<S> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S>;

    /// Update state every frame with the elapsed time `dt`.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: instant::Duration) -> Out<S>;

    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<S>;

    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> crate::render::Render<'_>;
}

// Dummy impl to make wasm work
impl<State> Debug for dyn GraphicsFlow<State> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow factory, awaited once the GPU context exists.
pub type FlowConstructor<S> =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S>>>>>>;

/// GPU context, shared state and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: 'static + Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self, graphics_flows: &[Box<dyn GraphicsFlow<State>>]) -> Result<(), wgpu::SurfaceError> {
        // Keep the loop going
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let draws: Vec<_> = graphics_flows
                .iter()
                .flat_map(|flow| flow.on_render().into_draws())
                .collect();

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in draws {
                if instanced.amount == 0 {
                    log::warn!("you attempted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    state: Option<AppState<State>>,
    // Fully initialized flows once they are ready
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    // Taken on first resume
    constructors: Option<Vec<FlowConstructor<State>>>,
    title: String,
    last_time: Instant,
}

impl<State: 'static> App<State> {
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        title: String,
        constructors: Vec<FlowConstructor<State>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            title,
            last_time: Instant::now(),
        })
    }
}

/// Messages from futures completing on the browser's executor.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) enum FlowEvent<State: 'static> {
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    },
    Mut(Box<dyn FnOnce(&mut State)>),
    Exit,
}

impl<State: 'static> Debug for FlowEvent<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Mut(_) => f.write_str("Mut(|&mut State| -> {...})"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State: 'static + Default> App<State> {
    fn init_flows(&mut self) {
        let Some(app_state) = self.state.as_mut() else {
            return;
        };
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        dispatch(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            #[cfg(target_arch = "wasm32")]
            &self.proxy,
            &mut self.graphics_flows,
            app_state,
            |flow, ctx, state| flow.on_init(ctx, state),
        );
        app_state.ctx.window.request_redraw();
    }
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Resumed fires again on some platforms; the flows are built only once
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor())
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => {
                    self.state = Some(app_state);
                    self.graphics_flows = flows;
                    self.init_flows();
                }
                Err(e) => {
                    log::error!("initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok((state, flows)) => {
                        if proxy
                            .send_event(FlowEvent::Initialized { state, flows })
                            .is_err()
                        {
                            log::error!("event loop closed before initialization finished");
                        }
                    }
                    Err(e) => {
                        log::error!("initialization failed: {:#}", e);
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // Message from the wasm `spawn_local`
                self.state = Some(state);
                self.graphics_flows = flows;
                self.init_flows();
            }
            FlowEvent::Mut(fn_once) => {
                if let Some(state) = &mut self.state {
                    fn_once(&mut state.state);
                }
            }
            FlowEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let Some(controller) = state.ctx.camera.controller.as_mut() {
                match state.ctx.mouse.pressed {
                    MouseButtonState::Left => controller.handle_mouse(dx, dy),
                    MouseButtonState::Right => controller.handle_pan(dx, dy),
                    MouseButtonState::None => (),
                }
            }
        }
        dispatch(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            #[cfg(target_arch = "wasm32")]
            &self.proxy,
            &mut self.graphics_flows,
            state,
            |flow, ctx, state| flow.on_device_events(ctx, state, &event),
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if let Some(controller) = state.ctx.camera.controller.as_mut() {
            controller.handle_window_events(&event);
        }

        dispatch(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            #[cfg(target_arch = "wasm32")]
            &self.proxy,
            &mut self.graphics_flows,
            state,
            |flow, ctx, state| flow.on_window_events(ctx, state, &event),
        );

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(&self.graphics_flows) {
                    Ok(_) => {
                        state
                            .ctx
                            .camera
                            .update(&state.ctx.projection, &state.ctx.queue);
                        dispatch(
                            #[cfg(not(target_arch = "wasm32"))]
                            &self.async_runtime,
                            #[cfg(target_arch = "wasm32")]
                            &self.proxy,
                            &mut self.graphics_flows,
                            state,
                            |flow, ctx, state| flow.on_update(ctx, state, dt),
                        );
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => state.ctx.mouse.pressed = MouseButtonState::Left,
                (MouseButton::Right, true) => state.ctx.mouse.pressed = MouseButtonState::Right,
                (_, false) => state.ctx.mouse.pressed = MouseButtonState::None,
                _ => (),
            },
            _ => {}
        }
    }
}

/// Calls `hook` on every flow in order and handles each output before the next flow runs.
fn dispatch<State: 'static>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")] proxy: &winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    flows: &mut [Box<dyn GraphicsFlow<State>>],
    app_state: &mut AppState<State>,
    mut hook: impl FnMut(&mut Box<dyn GraphicsFlow<State>>, &mut Context, &mut State) -> Out<State>,
) {
    for flow in flows.iter_mut() {
        let out = hook(flow, &mut app_state.ctx, &mut app_state.state);
        handle_flow_output(
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            #[cfg(target_arch = "wasm32")]
            proxy.clone(),
            &mut app_state.state,
            out,
        );
    }
}

fn handle_flow_output<State: 'static>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")] proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))] state: &mut State,
    out: Out<State>,
) {
    match out {
        // Mutate the state directly on native, through the event loop on the web
        Out::FutFn(futures) => {
            #[cfg(not(target_arch = "wasm32"))]
            {
                resolve_blocking(async_runtime, futures)
                    .into_iter()
                    .for_each(|mutation| mutation(state));
            }

            #[cfg(target_arch = "wasm32")]
            {
                let fut = futures::future::join_all(futures.into_iter().map(Pin::from));
                wasm_bindgen_futures::spawn_local(async move {
                    for mutation in fut.await {
                        if proxy.send_event(FlowEvent::Mut(mutation)).is_err() {
                            log::error!("event loop closed before a state update arrived");
                        }
                    }
                });
            }
        }
        Out::Empty => (),
    }
}

/// Drives all futures to completion; mutations keep the order of `futures`.
#[cfg(not(target_arch = "wasm32"))]
fn resolve_blocking<State>(
    async_runtime: &tokio::runtime::Runtime,
    futures: Vec<StateFuture<State>>,
) -> Vec<Box<dyn FnOnce(&mut State)>> {
    async_runtime.block_on(futures::future::join_all(futures.into_iter().map(Pin::from)))
}

/// Runs the flows until the window closes (native) or the page is torn down (web).
pub fn run<State: 'static + Default>(
    title: &str,
    constructors: Vec<FlowConstructor<State>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_logger();
    }

    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, title.to_string(), constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn console_error_logger() {
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn push(value: u32, delay_ms: u64) -> StateFuture<Vec<u32>> {
        Box::new(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            Box::new(move |state: &mut Vec<u32>| state.push(value)) as Box<dyn FnOnce(&mut Vec<u32>)>
        })
    }

    #[test]
    fn state_futures_apply_in_declaration_order() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut state = Vec::new();
        // The first future finishes last
        let mutations = resolve_blocking(&runtime, vec![push(1, 30), push(2, 0), push(3, 10)]);
        mutations.into_iter().for_each(|mutation| mutation(&mut state));
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[test]
    fn empty_output_is_the_default() {
        assert!(matches!(Out::<()>::default(), Out::Empty));
    }
}
