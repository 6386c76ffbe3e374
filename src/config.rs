use std::path::PathBuf;

use clap::Parser;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// The triangle in normalized device coordinates.
pub const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.0, 0.5, 0.0,
];

#[derive(Debug, Parser)]
#[command(version, about = "Draws a triangle with a vertex/fragment shader pair")]
pub struct Args {
    /// Vertex shader source file
    #[arg(long, default_value = "shaders/main.vert")]
    pub vertex_shader: PathBuf,

    /// Fragment shader source file
    #[arg(long, default_value = "shaders/main.frag")]
    pub fragment_shader: PathBuf,

    /// Rebuild the shader program when either source file changes
    #[arg(long)]
    pub watch: bool,

    /// Log filter in env_logger syntax, e.g. "debug" or "gl_triangle=debug"
    #[arg(long = "log")]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: PhysicalSize<u32>,
    pub position: PhysicalPosition<i32>,
    pub resizable: bool,
    /// Requested OpenGL version, always a core profile.
    pub gl_version: (u8, u8),
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "test".to_string(),
            size: PhysicalSize::new(800, 600),
            position: PhysicalPosition::new(200, 200),
            resizable: false,
            gl_version: (3, 3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub window: WindowConfig,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub clear_color: [f32; 4],
    pub watch: bool,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            vertex_shader: PathBuf::from("shaders/main.vert"),
            fragment_shader: PathBuf::from("shaders/main.frag"),
            clear_color: [0.1, 0.1, 0.1, 0.1],
            watch: false,
            log_filter: None,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            vertex_shader: args.vertex_shader,
            fragment_shader: args.fragment_shader,
            watch: args.watch,
            log_filter: args.log_filter,
            ..Self::default()
        }
    }
}
