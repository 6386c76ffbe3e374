use std::sync::Arc;

use crate::device::GlDevice;
use crate::error::{GfxError, GfxResult};

/// Floats per vertex: a bare xyz position.
pub const POSITION_COMPONENTS: i32 = 3;

/// One vertex attribute as handed to `vertex_attrib_pointer_f32`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub index: u32,
    pub size: i32,
    pub gl_type: u32,
    pub normalized: bool,
    pub offset: usize,
}

impl Layout {
    pub fn new(index: u32, size: i32, gl_type: u32, normalized: bool, offset: usize) -> Self {
        Self {
            index,
            size,
            gl_type,
            normalized,
            offset,
        }
    }

    pub fn position() -> Self {
        Self::new(0, POSITION_COMPONENTS, glow::FLOAT, false, 0)
    }
}

/// What the driver reports back for a configured attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeState {
    pub enabled: bool,
    pub size: i32,
}

/// A vertex buffer plus the vertex array describing it. Both are deleted on
/// drop.
#[derive(Debug)]
pub struct Geometry<G: GlDevice> {
    gl: Arc<G>,
    vao: G::VertexArray,
    vbo: G::Buffer,
    vertex_count: i32,
}

impl<G: GlDevice> Geometry<G> {
    /// Uploads a flat xyz position stream and wires it to attribute 0.
    pub fn upload(gl: &Arc<G>, vertices: &[f32], usage: u32) -> GfxResult<Self> {
        let components = POSITION_COMPONENTS as usize;
        if vertices.is_empty() || vertices.len() % components != 0 {
            return Err(GfxError::InvalidVertexData {
                len: vertices.len(),
            });
        }

        let vbo = gl.create_buffer().map_err(|message| GfxError::Resource {
            what: "vertex buffer",
            message,
        })?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

        let vao = match gl.create_vertex_array() {
            Ok(vao) => vao,
            Err(message) => {
                gl.bind_buffer(glow::ARRAY_BUFFER, None);
                gl.delete_buffer(vbo);
                return Err(GfxError::Resource {
                    what: "vertex array",
                    message,
                });
            }
        };
        gl.bind_vertex_array(Some(vao));

        gl.buffer_data(glow::ARRAY_BUFFER, bytemuck::cast_slice(vertices), usage);

        let stride = POSITION_COMPONENTS * std::mem::size_of::<f32>() as i32;
        for layout in [Layout::position()] {
            gl.vertex_attrib_pointer_f32(
                layout.index,
                layout.size,
                layout.gl_type,
                layout.normalized,
                stride,
                layout.offset as i32,
            );
            gl.enable_vertex_attrib_array(layout.index);
        }

        gl.bind_vertex_array(None);

        let vertex_count = (vertices.len() / components) as i32;
        log::debug!(
            "uploaded {} vertices ({} bytes)",
            vertex_count,
            std::mem::size_of_val(vertices)
        );

        Ok(Self {
            gl: Arc::clone(gl),
            vao,
            vbo,
            vertex_count,
        })
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.vao));
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn vertex_array(&self) -> G::VertexArray {
        self.vao
    }

    /// Size of the vertex buffer as reported by the driver.
    pub fn buffer_size(&self) -> i32 {
        self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        self.gl.buffer_size(glow::ARRAY_BUFFER)
    }

    /// Reads back the state of attribute `index` from this vertex array.
    pub fn attribute(&self, index: u32) -> AttributeState {
        self.bind();
        let enabled = self
            .gl
            .vertex_attrib_parameter(index, glow::VERTEX_ATTRIB_ARRAY_ENABLED)
            != 0.0;
        let size = self
            .gl
            .vertex_attrib_parameter(index, glow::VERTEX_ATTRIB_ARRAY_SIZE) as i32;
        self.gl.bind_vertex_array(None);
        AttributeState { enabled, size }
    }
}

impl<G: GlDevice> Drop for Geometry<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vao);
        self.gl.delete_buffer(self.vbo);
    }
}
