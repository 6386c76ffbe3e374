use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::device::GlDevice;
use crate::error::{GfxError, GfxResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A compiled shader stage. The driver object is deleted on drop.
#[derive(Debug)]
pub struct Shader<G: GlDevice> {
    gl: Arc<G>,
    raw: G::Shader,
    stage: ShaderStage,
}

impl<G: GlDevice> Shader<G> {
    /// Compiles `source` as a `stage` shader.
    ///
    /// On failure the driver's info log is returned in [`GfxError::Compile`]
    /// and the shader object is released.
    pub fn compile(gl: &Arc<G>, stage: ShaderStage, source: &str) -> GfxResult<Self> {
        let raw = gl
            .create_shader(stage.gl_enum())
            .map_err(|message| GfxError::Resource {
                what: "shader",
                message,
            })?;

        // Owned from here on so the early return below releases it.
        let shader = Shader {
            gl: Arc::clone(gl),
            raw,
            stage,
        };

        gl.shader_source(raw, source);
        gl.compile_shader(raw);

        if !gl.shader_compile_status(raw) {
            let mut log = gl.shader_info_log(raw).trim_end().to_string();
            if log.is_empty() {
                log = format!("{} shader compilation failed without a driver log", stage);
            }
            log::error!("{} shader... [FAILED]\n{}", stage, log);
            return Err(GfxError::Compile { stage, log });
        }

        log::info!("{} shader... [PASSED]", stage);
        Ok(shader)
    }

    /// Reads a shader source file and compiles it.
    pub fn load<P: AsRef<Path>>(gl: &Arc<G>, path: P, stage: ShaderStage) -> GfxResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| GfxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded {} shader from {}", stage, path.display());
        Self::compile(gl, stage, &source)
    }

    pub fn raw(&self) -> G::Shader {
        self.raw
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: GlDevice> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.raw);
    }
}
