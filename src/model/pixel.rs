use serde::{Deserialize, Serialize};

use super::{CoreError, Result};

/// Numeric element type of a plane, one scalar sample per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PixelType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl PixelType {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            PixelType::Int8 | PixelType::Uint8 => 1,
            PixelType::Int16 | PixelType::Uint16 => 2,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float32 => 4,
            PixelType::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelType::Int8 => "INT8",
            PixelType::Uint8 => "UINT8",
            PixelType::Int16 => "INT16",
            PixelType::Uint16 => "UINT16",
            PixelType::Int32 => "INT32",
            PixelType::Uint32 => "UINT32",
            PixelType::Float32 => "FLOAT32",
            PixelType::Float64 => "FLOAT64",
        }
    }

    /// Parses reader pixel type names such as `uint16`, `float` or `double`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int8" => Ok(PixelType::Int8),
            "uint8" => Ok(PixelType::Uint8),
            "int16" => Ok(PixelType::Int16),
            "uint16" => Ok(PixelType::Uint16),
            "int32" => Ok(PixelType::Int32),
            "uint32" => Ok(PixelType::Uint32),
            "float" | "float32" => Ok(PixelType::Float32),
            "double" | "float64" => Ok(PixelType::Float64),
            _ => Err(CoreError::UnknownPixelType(name.to_string())),
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }
}
