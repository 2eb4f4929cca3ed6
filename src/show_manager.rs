//! Window, event loop and per-frame orchestration

use glam::Vec2;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};

use crate::control::UniformWriter;
use crate::error::{ViewerError, ViewerResult};
use crate::render::Renderer;
use crate::scene::{ActorId, CameraInput, OrbitController, Scene};
use crate::window::{Window, WindowChange};
use crate::ViewerConfig;

/// Pixels of a high-resolution scroll that count as one wheel notch
const PIXELS_PER_LINE: f32 = 50.0;

/// Application callbacks invoked by the [`ShowManager`] loop
pub trait ViewerHandler {
    /// Build the egui UI for this frame. Runs before the scene is drawn, so
    /// changes made here are visible in the same frame.
    fn on_ui(&mut self, ctx: &egui::Context, scene: &mut Scene);

    /// Fill the custom uniforms of `actor` right before its draw
    fn on_uniform_upload(&mut self, actor: ActorId, uniforms: &mut dyn UniformWriter);

    /// The window was resized; `size` is in egui points
    fn on_window_resize(&mut self, _size: (u32, u32)) {}
}

/// Owns the window and drives the render loop
pub struct ShowManager {
    config: ViewerConfig,
    event_loop: EventLoop<()>,
    window: Window,
}

impl ShowManager {
    /// Create the event loop and the window. No GPU work happens until
    /// [`Self::start`].
    pub fn new(config: ViewerConfig) -> ViewerResult<Self> {
        let event_loop = EventLoop::new().map_err(|e| ViewerError::EventLoop(e.to_string()))?;
        let window = Window::new(&event_loop, &config.title, config.width, config.height)?;
        log::info!(
            "Created window '{}' ({}x{})",
            config.title,
            config.width,
            config.height
        );
        Ok(Self {
            config,
            event_loop,
            window,
        })
    }

    /// Window size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.window.physical_size()
    }

    /// Window size in egui points, the space the UI is laid out in
    pub fn logical_size(&self) -> (u32, u32) {
        self.window.logical_size()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Initialize the renderer and run until the window is closed
    pub fn start(self, mut scene: Scene, handler: &mut dyn ViewerHandler) -> ViewerResult<()> {
        let Self {
            config,
            event_loop,
            mut window,
        } = self;

        let mut renderer = Renderer::new(window.handle_arc(), config.vsync)?;
        scene.set_size(renderer.size());
        renderer.prepare_scene(&scene)?;

        let mut controller = OrbitController::default();
        controller.sync_with_camera(&scene.camera);
        let mut input = CameraInput::default();
        let mut last_cursor: Option<Vec2> = None;
        let mut failure: Option<ViewerError> = None;

        log::info!("Starting render loop");

        event_loop
            .run(|event, elwt: &EventLoopWindowTarget<()>| {
                elwt.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { event, window_id } if window_id == window.handle().id() => {
                        let consumed = renderer
                            .egui_mut()
                            .on_window_event(window.handle(), &event);

                        match window.handle_event(&event) {
                            Some(WindowChange::CloseRequested) => {
                                elwt.exit();
                                return;
                            }
                            Some(WindowChange::Resized { physical, logical }) => {
                                renderer.resize(physical.0, physical.1);
                                scene.set_size(renderer.size());
                                handler.on_window_resize(logical);
                            }
                            None => {}
                        }

                        match event {
                            WindowEvent::MouseInput {
                                button: MouseButton::Left,
                                state,
                                ..
                            } => {
                                input.mouse_look_active = state == ElementState::Pressed
                                    && !consumed
                                    && !renderer.egui().wants_pointer_input();
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                let position = Vec2::new(position.x as f32, position.y as f32);
                                if let Some(last) = last_cursor {
                                    input.mouse_delta += position - last;
                                }
                                last_cursor = Some(position);
                            }
                            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                                input.scroll_delta += match delta {
                                    MouseScrollDelta::LineDelta(_, y) => y,
                                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                                };
                            }
                            WindowEvent::RedrawRequested => {
                                let frame = draw_frame(
                                    &window,
                                    &mut renderer,
                                    &mut scene,
                                    &mut *handler,
                                    &mut controller,
                                    &mut input,
                                );
                                if let Err(e) = frame {
                                    log::error!("Frame failed: {e}");
                                    failure = Some(e);
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => window.request_redraw(),
                    _ => {}
                }
            })
            .map_err(|e| ViewerError::EventLoop(e.to_string()))?;

        log::info!("Render loop finished");
        failure.map_or(Ok(()), Err)
    }
}

fn draw_frame(
    window: &Window,
    renderer: &mut Renderer,
    scene: &mut Scene,
    handler: &mut dyn ViewerHandler,
    controller: &mut OrbitController,
    input: &mut CameraInput,
) -> ViewerResult<()> {
    renderer
        .egui_mut()
        .run(window.handle(), |ctx| handler.on_ui(ctx, scene));

    if !renderer.egui().wants_pointer_input() {
        controller.update(&mut scene.camera, input);
    }
    input.reset_deltas();

    renderer.render(scene, |actor, uniforms| {
        handler.on_uniform_upload(actor, uniforms)
    })
}
