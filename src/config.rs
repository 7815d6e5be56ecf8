//! Everything the triangle program needs to know up front.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shader::{ShaderSource, ShaderStage};

pub const VERTEX_SHADER_BODY: &str = r#"
layout (location = 0) in vec3 aPos;
void main()
{
   gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
"#;

pub const FRAGMENT_SHADER_BODY: &str = r#"
precision mediump float;
out vec4 FragColor;
void main()
{
   FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
    /// xyz triples
    pub vertices: Vec<f32>,
    pub shader_version: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let shader_version = if cfg!(target_arch = "wasm32") {
            "#version 300 es"
        } else {
            "#version 330 core"
        };
        Self {
            title: "Hello Opengl".to_string(),
            width: 800,
            height: 600,
            clear_color: [0.2, 0.3, 0.3, 1.0],
            vertices: vec![
                -0.5, -0.5, 0.0, //
                0.5, -0.5, 0.0, //
                0.0, 0.5, 0.0,
            ],
            shader_version: shader_version.to_string(),
            vertex_shader: VERTEX_SHADER_BODY.to_string(),
            fragment_shader: FRAGMENT_SHADER_BODY.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("loading render config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.vertices.is_empty() || self.vertices.len() % 3 != 0 {
            return Err(ConfigError::Invalid(format!(
                "vertices must be a non-empty list of xyz triples, got {} floats",
                self.vertices.len()
            )));
        }
        if self.vertex_shader.trim().is_empty() || self.fragment_shader.trim().is_empty() {
            return Err(ConfigError::Invalid("shader sources must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertex_source(&self) -> ShaderSource {
        ShaderSource::with_version(ShaderStage::Vertex, &self.shader_version, &self.vertex_shader)
    }

    pub fn fragment_source(&self) -> ShaderSource {
        ShaderSource::with_version(
            ShaderStage::Fragment,
            &self.shader_version,
            &self.fragment_shader,
        )
    }
}
