use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use softbuffer::Surface;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Fullscreen, Window, WindowId};

use crate::catalog::Direction;
use crate::cli::Options;
use crate::ui::render::Frame;
use crate::ui::state::{Action, Command, ViewerState, action_for_key};
use crate::viewport::Size;

pub mod render;
pub mod state;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub state: ViewerState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
    start_fullscreen: bool,
    start_slideshow: bool,
    ctrl_down: bool,
    title: String,
}

impl App {
    pub fn new(state: ViewerState, options: &Options) -> Self {
        Self {
            state,
            window: None,
            context: None,
            surface: None,
            start_fullscreen: options.fullscreen,
            start_slideshow: options.slideshow,
            ctrl_down: false,
            title: String::new(),
        }
    }

    fn request_redraw(&mut self) {
        let title = self.state.title();
        if let Some(ref window) = self.window {
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }

    fn run_command(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        match command {
            Command::None => {}
            Command::Redraw => self.request_redraw(),
            Command::SetFullscreen(on) => {
                if let Some(ref window) = self.window {
                    window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
                }
                self.request_redraw();
            }
            Command::Quit => event_loop.exit(),
        }
    }

    fn paint(&mut self) {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return;
        };
        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        if let Err(e) = surface.resize(w, h) {
            log::error!("Failed to resize surface: {}", e);
            return;
        }
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                {
                    let mut frame = Frame::new(&mut buffer, w.get(), h.get());
                    self.state.render(&mut frame);
                }
                if let Err(e) = buffer.present() {
                    log::error!("Failed to present frame: {}", e);
                }
            }
            Err(e) => log::error!("Failed to map frame buffer: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.state.title())
            .with_inner_size(LogicalSize::new(1280u32, 720u32))
            .with_maximized(true);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(Arc::clone(&window)).and_then(|context| {
            let surface = Surface::new(&context, Arc::clone(&window))?;
            Ok((context, surface))
        });
        let (context, surface) = match surface {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Failed to create drawing surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.state.resize(Size::new(size.width, size.height));
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);

        self.state.show_current();

        let now = Instant::now();
        if self.start_fullscreen {
            let command = self.state.apply(Action::ToggleFullscreen, now);
            self.run_command(event_loop, command);
        }
        if self.start_slideshow {
            self.state.start_slideshow(now);
        }
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.state.resize(Size::new(width, height));
                self.request_redraw();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.ctrl_down = modifiers.state().control_key();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(action) = action_for_key(&event.logical_key, self.ctrl_down) else {
                    return;
                };
                // Held keys repeat navigation and zoom, not the toggles.
                let repeatable = matches!(
                    action,
                    Action::Navigate(Direction::Next | Direction::Previous)
                        | Action::ZoomIn { .. }
                        | Action::ZoomOut { .. }
                );
                if event.repeat && !repeatable {
                    return;
                }
                let command = self.state.apply(action, Instant::now());
                self.run_command(event_loop, command);
            }

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                if state == ElementState::Pressed {
                    if self.state.pointer_pressed(Instant::now()) {
                        self.request_redraw();
                    }
                } else {
                    self.state.pointer_released();
                }
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                if self.state.pointer_moved((x, y)) {
                    self.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                self.paint();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.tick(Instant::now()) {
            self.request_redraw();
        }
        match self.state.slideshow().deadline() {
            Some(when) => event_loop.set_control_flow(ControlFlow::WaitUntil(when)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
