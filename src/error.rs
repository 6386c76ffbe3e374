use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::shaders::ShaderStage;

/// Errors raised while building GPU objects.
#[derive(Debug)]
pub enum GfxError {
    /// A shader source file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The driver rejected a shader stage.
    Compile { stage: ShaderStage, log: String },
    /// The driver failed to link a program.
    Link { log: String },
    /// A shader was passed to the linker in the wrong slot.
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },
    /// The driver refused to create an object.
    Resource { what: &'static str, message: String },
    InvalidVertexData { len: usize },
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::Io { path, source } => {
                write!(f, "failed to read shader {}: {}", path.display(), source)
            }
            GfxError::Compile { stage, log } => {
                write!(f, "{} shader failed to compile:\n{}", stage, log)
            }
            GfxError::Link { log } => write!(f, "program failed to link:\n{}", log),
            GfxError::StageMismatch { expected, found } => {
                write!(f, "expected a {} shader, got a {} shader", expected, found)
            }
            GfxError::Resource { what, message } => {
                write!(f, "failed to create {}: {}", what, message)
            }
            GfxError::InvalidVertexData { len } => write!(
                f,
                "vertex data must be a non-empty multiple of 3 floats, got {} floats",
                len
            ),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type GfxResult<T> = Result<T, GfxError>;
