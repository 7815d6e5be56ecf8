pub mod app;
pub mod config;
pub mod drawer_triangle;
pub mod driver;
pub mod events;
pub mod shader;
pub mod viewport;

#[cfg(test)]
mod fake_driver;

pub use app::{AppError, TriangleApp};
pub use config::{ConfigError, RenderConfig};
pub use driver::GraphicsDriver;
pub use events::{EventQueue, Key, LoopControl, WindowEvent};
pub use shader::{
    activate, build_program, compile_stage, link, CompiledShader, ShaderError, ShaderProgram,
    ShaderSource, ShaderStage,
};
pub use viewport::Viewport;
