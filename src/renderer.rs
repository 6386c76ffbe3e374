use std::path::Path;
use std::sync::Arc;

use crate::device::GlDevice;
use crate::error::GfxResult;
use crate::geometry::Geometry;
use crate::program::ShaderProgram;
use crate::viewport::Viewport;

/// Owns the program and geometry drawn every frame.
///
/// Dropping the renderer releases both, so it has to go before the context.
#[derive(Debug)]
pub struct Renderer<G: GlDevice> {
    gl: Arc<G>,
    program: ShaderProgram<G>,
    geometry: Geometry<G>,
    clear_color: [f32; 4],
}

impl<G: GlDevice> Renderer<G> {
    pub fn new(
        gl: &Arc<G>,
        program: ShaderProgram<G>,
        geometry: Geometry<G>,
        clear_color: [f32; 4],
    ) -> Self {
        Self {
            gl: Arc::clone(gl),
            program,
            geometry,
            clear_color,
        }
    }

    /// Clears the color buffer and draws the geometry once.
    pub fn render(&self) {
        let [red, green, blue, alpha] = self.clear_color;
        self.gl.clear_color(red, green, blue, alpha);
        self.gl.clear(glow::COLOR_BUFFER_BIT);

        self.program.bind();
        self.geometry.bind();
        self.gl
            .draw_arrays(glow::TRIANGLES, 0, self.geometry.vertex_count());
    }

    pub fn resize(&self, viewport: Viewport) {
        self.gl
            .viewport(viewport.x, viewport.y, viewport.width, viewport.height);
    }

    /// Rebuilds the program from disk.
    ///
    /// The current program stays in use if the new one fails to build.
    pub fn reload_program(&mut self, vertex_path: &Path, fragment_path: &Path) -> GfxResult<()> {
        let program = ShaderProgram::from_files(&self.gl, vertex_path, fragment_path)?;
        self.program = program;
        log::info!("shader program reloaded");
        Ok(())
    }

    pub fn program(&self) -> &ShaderProgram<G> {
        &self.program
    }

    pub fn geometry(&self) -> &Geometry<G> {
        &self.geometry
    }
}
