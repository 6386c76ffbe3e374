use std::path::Path;
use std::sync::Arc;

use crate::device::GlDevice;
use crate::error::{GfxError, GfxResult};
use crate::shaders::{Shader, ShaderStage};

/// A linked vertex + fragment program. Deleted on drop.
#[derive(Debug)]
pub struct ShaderProgram<G: GlDevice> {
    gl: Arc<G>,
    raw: G::Program,
}

impl<G: GlDevice> ShaderProgram<G> {
    /// Loads, compiles and links the two stages found at the given paths.
    pub fn from_files<P, Q>(gl: &Arc<G>, vertex_path: P, fragment_path: Q) -> GfxResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let vertex = Shader::load(gl, vertex_path, ShaderStage::Vertex)?;
        let fragment = Shader::load(gl, fragment_path, ShaderStage::Fragment)?;
        Self::link(gl, vertex, fragment)
    }

    /// Links two compiled stages into a program.
    ///
    /// Both shaders are consumed and released whether or not linking
    /// succeeds.
    pub fn link(gl: &Arc<G>, vertex: Shader<G>, fragment: Shader<G>) -> GfxResult<Self> {
        for (shader, expected) in [
            (&vertex, ShaderStage::Vertex),
            (&fragment, ShaderStage::Fragment),
        ] {
            if shader.stage() != expected {
                return Err(GfxError::StageMismatch {
                    expected,
                    found: shader.stage(),
                });
            }
        }

        let raw = gl.create_program().map_err(|message| GfxError::Resource {
            what: "program",
            message,
        })?;
        let program = ShaderProgram {
            gl: Arc::clone(gl),
            raw,
        };

        gl.attach_shader(raw, vertex.raw());
        gl.attach_shader(raw, fragment.raw());
        gl.link_program(raw);

        let linked = gl.program_link_status(raw);
        let log = if linked {
            String::new()
        } else {
            gl.program_info_log(raw).trim_end().to_string()
        };

        gl.detach_shader(raw, vertex.raw());
        gl.detach_shader(raw, fragment.raw());
        drop(vertex);
        drop(fragment);

        if !linked {
            let log = if log.is_empty() {
                "program link failed without a driver log".to_string()
            } else {
                log
            };
            log::error!("shader program... [FAILED]\n{}", log);
            return Err(GfxError::Link { log });
        }

        log::info!("shader program... [PASSED]");
        Ok(program)
    }

    pub fn raw(&self) -> G::Program {
        self.raw
    }

    pub fn bind(&self) {
        self.gl.use_program(Some(self.raw));
    }
}

impl<G: GlDevice> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.raw);
    }
}
