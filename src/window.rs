use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use crate::config::WindowConfig;

/// A window with a current OpenGL context and the `glow` bindings loaded
/// for it.
pub struct GlWindow {
    pub gl: Arc<glow::Context>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    pub window: Window,
}

impl GlWindow {
    pub fn new(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.size)
            .with_position(config.position)
            .with_resizable(config.resizable);

        let window = event_loop
            .create_window(attributes)
            .context("failed to create window")?;

        // Get platform-specific handles to the display and window
        let raw_display = window
            .display_handle()
            .map_err(|e| anyhow!("failed to get display handle: {}", e))?
            .as_raw();
        let raw_window = window
            .window_handle()
            .map_err(|e| anyhow!("failed to get window handle: {}", e))?
            .as_raw();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(raw_window));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        let display = unsafe { Display::new(raw_display, preference) }
            .context("failed to create GL display")?;

        let template = ConfigTemplateBuilder::new()
            .compatible_with_native_window(raw_window)
            .build();
        let gl_config = unsafe { display.find_configs(template) }
            .context("failed to query GL configs")?
            .next()
            .context("no GL config matches the window")?;

        let physical_size = window.inner_size();
        let width = NonZeroU32::new(physical_size.width).context("window has zero width")?;
        let height = NonZeroU32::new(physical_size.height).context("window has zero height")?;

        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;

        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window));

        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .with_context(|| format!("failed to create an OpenGL {}.{} core context", major, minor))?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make the GL context current")?;

        if let Err(err) =
            surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            log::warn!("vsync unavailable: {}", err);
        }

        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function(|symbol| {
                CString::new(symbol).map_or(std::ptr::null(), |name| {
                    display.get_proc_address(&name) as *const _
                })
            }))
        };

        Ok(Self {
            gl,
            surface,
            context,
            window,
        })
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.surface.resize(&self.context, width, height);
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}
