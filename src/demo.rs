//! Demo builder and the windowed application loop.
//!
//! [`Demo`] configures the scene and display mode with method chaining, then
//! `.run()` blocks on the winit event loop until the window closes. Each
//! `RedrawRequested` runs one frame: resolve input, advance the scene by the
//! frame's fixed physics steps, copy body transforms into sprite instances,
//! and render.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::DemoError;
use crate::gpu::{GpuState, QuiltLayout, SpriteInstance};
use crate::input::hand::DEFAULT_HAND_ADDR;
use crate::input::InputRig;
use crate::scene::{Scene, DEFAULT_POINT_COUNT, PLAYER_RADIUS, POINT_RADIUS};
use crate::time::Time;

/// Point sprites are white; all their visible color comes from the player
/// light.
const POINT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// How the scene reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// A single on-axis view.
    Flat,
    /// A stereo quilt for lenticular displays.
    Quilt(QuiltLayout),
}

/// The demo builder.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// ```ignore
/// Demo::new()
///     .with_point_count(500)
///     .with_render_mode(RenderMode::Flat)
///     .run()?;
/// ```
pub struct Demo {
    point_count: u32,
    render_mode: RenderMode,
    hand_addr: String,
    title: String,
    window_size: (u32, u32),
}

impl Demo {
    /// Create a demo with default settings: 500 points, standard quilt.
    pub fn new() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            render_mode: RenderMode::Quilt(QuiltLayout::standard()),
            hand_addr: DEFAULT_HAND_ADDR.to_string(),
            title: "holobox".to_string(),
            window_size: (1280, 720),
        }
    }

    /// Set the number of point bodies.
    pub fn with_point_count(mut self, count: u32) -> Self {
        self.point_count = count;
        self
    }

    /// Set the render mode.
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Set the hand-bridge address.
    pub fn with_hand_addr(mut self, addr: &str) -> Self {
        self.hand_addr = addr.to_string();
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Run the demo. Blocks until the window is closed.
    pub fn run(self) -> Result<(), DemoError> {
        if let RenderMode::Quilt(layout) = &self.render_mode {
            if layout.view_count() == 0 {
                return Err(DemoError::Config(
                    "quilt grid needs at least one view".to_string(),
                ));
            }
            if layout.view_cone <= 0.0 || layout.view_cone >= std::f32::consts::PI {
                return Err(DemoError::Config(
                    "view cone must be between 0 and 180 degrees".to_string(),
                ));
            }
        }

        log::info!(
            "starting with {} points, {:?}",
            self.point_count,
            self.render_mode
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Demo {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    settings: Demo,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    scene: Scene,
    rig: InputRig,
    time: Time,
    sprites: Vec<SpriteInstance>,
    error: Option<DemoError>,
}

impl App {
    fn new(settings: Demo) -> Self {
        let scene = Scene::new(settings.point_count);
        let rig = InputRig::new(&settings.hand_addr);
        let sprites = Vec::with_capacity(settings.point_count as usize + 1);

        Self {
            settings,
            window: None,
            gpu: None,
            scene,
            rig,
            time: Time::new(),
            sprites,
            error: None,
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        self.time.update();
        let drive = self.rig.resolve_drive();
        let steps = self.time.take_fixed_steps();
        self.scene.update(drive, steps, self.time.delta());

        // Per-frame state transfer: body transforms into the sprite list,
        // points first, the player last.
        self.sprites.clear();
        for position in self.scene.point_positions() {
            self.sprites.push(SpriteInstance {
                position: position.to_array(),
                size: POINT_RADIUS,
                color: POINT_COLOR,
                emissive: 0.0,
            });
        }
        let player = self.scene.player_position();
        let color = self.scene.player_color();
        self.sprites.push(SpriteInstance {
            position: player.to_array(),
            size: PLAYER_RADIUS,
            color: color.to_array(),
            emissive: 1.0,
        });

        match gpu.render(&self.sprites, player, color, self.time.elapsed()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                width: gpu.config.width,
                height: gpu.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }

        if self.time.frame() % 300 == 0 {
            log::debug!("fps: {:.1}", self.time.fps());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window_size.0,
                self.settings.window_size.1,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let quilt_layout = match self.settings.render_mode {
            RenderMode::Flat => None,
            RenderMode::Quilt(layout) => Some(layout),
        };

        match pollster::block_on(GpuState::new(
            window,
            self.settings.point_count + 1,
            quilt_layout,
        )) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.rig.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let demo = Demo::new();
        assert_eq!(demo.point_count, DEFAULT_POINT_COUNT);
        assert_eq!(demo.render_mode, RenderMode::Quilt(QuiltLayout::standard()));
        assert_eq!(demo.hand_addr, DEFAULT_HAND_ADDR);
    }

    #[test]
    fn test_builder_overrides() {
        let demo = Demo::new()
            .with_point_count(64)
            .with_render_mode(RenderMode::Flat)
            .with_hand_addr("127.0.0.1:7000")
            .with_title("test");
        assert_eq!(demo.point_count, 64);
        assert_eq!(demo.render_mode, RenderMode::Flat);
        assert_eq!(demo.hand_addr, "127.0.0.1:7000");
        assert_eq!(demo.title, "test");
    }

    #[test]
    fn test_run_rejects_degenerate_view_cone() {
        let demo = Demo::new().with_render_mode(RenderMode::Quilt(QuiltLayout {
            cols: 8,
            rows: 6,
            view_cone: 0.0,
        }));
        assert!(matches!(demo.run(), Err(DemoError::Config(_))));
    }
}
