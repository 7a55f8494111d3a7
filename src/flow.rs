//! Application event loop.
//!
//! [`run`] opens the window and drives the frame loop. Everything runs on the
//! event loop thread: the async asset loading is blocked on once while the
//! window is resumed, after which each frame follows the same order:
//!
//! 1. Apply the mouse motion gathered since the last frame to the camera
//! 2. Advance the animation clock and propagate the scene graph
//! 3. Render the shadow pass, then the colour pass
//! 4. Present the frame

use std::sync::Arc;

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use crate::{
    config::SceneConfig,
    context::Context,
    render::Renderer,
    resources::{Assets, load_scene_assets},
    scene::Scene,
};

/// Everything that exists once the window and the GPU are up.
pub struct AppState {
    pub(crate) ctx: Context,
    pub scene: Scene,
    assets: Assets,
    renderer: Renderer,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let (assets, scene_assets) = load_scene_assets(&ctx.device, &ctx.queue, config).await?;
        let scene = Scene::build(config, &scene_assets)?;
        let renderer = Renderer::new(&ctx, &assets, config)?;
        Ok(Self {
            ctx,
            scene,
            assets,
            renderer,
            is_surface_configured: true,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.is_surface_configured = self.ctx.resize(width, height);
    }

    fn frame(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        self.ctx.controller.update(&mut self.ctx.camera);
        self.scene.update(dt);

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }
        self.renderer
            .render(&self.ctx, &mut self.scene, &self.assets)
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: SceneConfig,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(config: SceneConfig) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            config,
            state: None,
            last_time: Instant::now(),
        })
    }
}

/// Hide the cursor and keep it inside the window so mouse motion steers the camera.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(e) = grabbed {
        log::warn!("Could not grab the cursor: {e}");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes().with_title("lakeside");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {e}");
                event_loop.exit();
                return;
            }
        };
        grab_cursor(&window);

        match self
            .async_runtime
            .block_on(AppState::new(window.clone(), &self.config))
        {
            Ok(state) => {
                self.state = Some(state);
                self.last_time = Instant::now();
                window.request_redraw();
            }
            Err(e) => {
                log::error!("App initialization failed: {e:#}");
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
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed().as_secs_f32();
                self.last_time = Instant::now();

                match state.frame(dt) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window().inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {e}");
                    }
                }
                state.ctx.window().request_redraw();
            }
            _ => {}
        }
    }
}

/// Open the window and run the lakeside scene until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
