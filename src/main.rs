use anyhow::{Context, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

mod config;
use config::{Args, Config, TRIANGLE};

mod device;
use device::GlDevice;

mod error;

#[cfg(test)]
mod fake_gl;

mod geometry;
use geometry::Geometry;

mod logging;
use logging::{init_logging, LoggingConfig};

mod program;
use program::ShaderProgram;

mod renderer;
use renderer::Renderer;

mod shaders;

mod viewport;
use viewport::Viewport;

mod watcher;
use watcher::ShaderWatcher;

mod window;
use window::GlWindow;

struct App {
    config: Config,

    // Dropped before the window so GPU objects go while the context lives.
    renderer: Option<Renderer<glow::Context>>,
    watcher: Option<ShaderWatcher>,
    window: Option<GlWindow>,

    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            renderer: None,
            watcher: None,
            window: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = GlWindow::new(event_loop, &self.config.window)?;
        log::info!("version: {}", window.gl.version_string());

        let program = ShaderProgram::from_files(
            &window.gl,
            &self.config.vertex_shader,
            &self.config.fragment_shader,
        )
        .context("failed to build the shader program")?;

        let geometry = Geometry::upload(&window.gl, &TRIANGLE, glow::STATIC_DRAW)
            .context("failed to upload the triangle")?;
        log::debug!(
            "vertex buffer holds {} bytes, attribute 0: {:?}",
            geometry.buffer_size(),
            geometry.attribute(0)
        );

        let renderer = Renderer::new(&window.gl, program, geometry, self.config.clear_color);
        renderer.resize(Viewport::from(window.window.inner_size()));
        log::debug!(
            "drawing {} vertices from {:?} with {:?}",
            renderer.geometry().vertex_count(),
            renderer.geometry().vertex_array(),
            renderer.program().raw()
        );

        if self.config.watch {
            let watcher = ShaderWatcher::new([
                self.config.vertex_shader.clone(),
                self.config.fragment_shader.clone(),
            ]);
            for entry in watcher.entries() {
                log::info!("watching {}", entry.path.display());
            }
            self.watcher = Some(watcher);
        }

        window.window.request_redraw();
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(renderer)) = (self.window.as_ref(), self.renderer.as_mut()) else {
            return Ok(());
        };

        renderer.render();
        window.swap_buffers()?;

        if let Some(watcher) = self.watcher.as_mut() {
            if watcher.poll() {
                if let Err(err) = renderer
                    .reload_program(&self.config.vertex_shader, &self.config.fragment_shader)
                {
                    log::error!("shader reload failed, keeping the previous program: {}", err);
                }
            }
        }

        window.window.request_redraw();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("quit requested; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(window), Some(renderer)) = (&self.window, &self.renderer) {
                    window.resize(size);
                    renderer.resize(Viewport::from(size));
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release GPU objects while the context is still current.
        self.renderer = None;
        self.watcher = None;
    }
}

fn main() -> Result<()> {
    let config = Config::from(Args::parse());

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..LoggingConfig::default()
    });

    let event_loop = EventLoop::new().context("failed to create event loop")?;

    // ControlFlow::Wait pauses the event loop if no events are available to process.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
