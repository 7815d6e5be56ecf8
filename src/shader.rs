//! Compile shader stages, link them into a program, and report driver diagnostics.

use crate::driver::GraphicsDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "VERTEX"),
            ShaderStage::Fragment => write!(f, "FRAGMENT"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("ERROR::SHADER::{stage}::EMPTY_SOURCE")]
    EmptySource { stage: ShaderStage },
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("ERROR::SHADER_PROGRAM::LINK_FAILED\n{log}")]
    Link { log: String },
    #[error("ERROR::SHADER_PROGRAM::STAGE_MISMATCH expected VERTEX and FRAGMENT, got {vertex} and {fragment}")]
    StageMismatch {
        vertex: ShaderStage,
        fragment: ShaderStage,
    },
    #[error("driver could not create {object}: {reason}")]
    Driver { object: &'static str, reason: String },
}

/// Source text of one stage. Never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    /// Prepends a `#version` line, as GLSL requires it to come first.
    pub fn with_version(stage: ShaderStage, shader_version: &str, body: &str) -> Self {
        Self::new(stage, format!("{shader_version}\n{body}"))
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A successfully compiled stage. Consumed by [`link`].
#[derive(Debug)]
pub struct CompiledShader<D: GraphicsDriver> {
    stage: ShaderStage,
    handle: D::Shader,
}

impl<D: GraphicsDriver> CompiledShader<D> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> D::Shader {
        self.handle
    }

    /// Releases a shader that will never reach [`link`].
    pub fn release(self, gl: &D) {
        gl.delete_shader(self.handle);
    }
}

/// A linked program. Only [`link`] can make one.
#[derive(Debug)]
pub struct ShaderProgram<D: GraphicsDriver> {
    handle: D::Program,
}

impl<D: GraphicsDriver> ShaderProgram<D> {
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    pub fn destroy(self, gl: &D) {
        gl.delete_program(self.handle);
    }
}

/// Every error leaving this module is reported here, once.
fn fail<T>(err: ShaderError) -> Result<T, ShaderError> {
    log::error!("{err}");
    Err(err)
}

pub fn compile_stage<D: GraphicsDriver>(
    gl: &D,
    source: &ShaderSource,
) -> Result<CompiledShader<D>, ShaderError> {
    let stage = source.stage();
    if source.text().trim().is_empty() {
        return fail(ShaderError::EmptySource { stage });
    }
    let shader = match gl.create_shader(stage.gl_type()) {
        Ok(shader) => shader,
        Err(reason) => {
            return fail(ShaderError::Driver {
                object: "shader",
                reason,
            })
        }
    };
    gl.shader_source(shader, source.text());
    gl.compile_shader(shader);
    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return fail(ShaderError::Compile { stage, log });
    }
    log::debug!("compiled {stage} shader {shader:?}");
    Ok(CompiledShader {
        stage,
        handle: shader,
    })
}

/// Links two compiled stages. Both shader objects are detached and deleted
/// whatever the outcome, so the caller never has to release them.
pub fn link<D: GraphicsDriver>(
    gl: &D,
    vertex: CompiledShader<D>,
    fragment: CompiledShader<D>,
) -> Result<ShaderProgram<D>, ShaderError> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        let err = ShaderError::StageMismatch {
            vertex: vertex.stage,
            fragment: fragment.stage,
        };
        vertex.release(gl);
        fragment.release(gl);
        return fail(err);
    }
    let shaders = [vertex.handle, fragment.handle];
    let program = match gl.create_program() {
        Ok(program) => program,
        Err(reason) => {
            for shader in shaders {
                gl.delete_shader(shader);
            }
            return fail(ShaderError::Driver {
                object: "program",
                reason,
            });
        }
    };
    for shader in shaders {
        gl.attach_shader(program, shader);
    }
    gl.link_program(program);
    let linked = gl.program_link_status(program);
    let log = if linked {
        String::new()
    } else {
        gl.program_info_log(program)
    };

    for shader in shaders {
        gl.detach_shader(program, shader);
        gl.delete_shader(shader);
    }

    if !linked {
        gl.delete_program(program);
        return fail(ShaderError::Link { log });
    }
    log::debug!("linked program {program:?}");
    Ok(ShaderProgram { handle: program })
}

/// Makes `program` current for the draws that follow.
pub fn activate<D: GraphicsDriver>(gl: &D, program: &ShaderProgram<D>) {
    gl.use_program(Some(program.handle));
}

pub fn build_program<D: GraphicsDriver>(
    gl: &D,
    vertex_source: &ShaderSource,
    fragment_source: &ShaderSource,
) -> Result<ShaderProgram<D>, ShaderError> {
    let vertex = compile_stage(gl, vertex_source)?;
    let fragment = match compile_stage(gl, fragment_source) {
        Ok(fragment) => fragment,
        Err(err) => {
            vertex.release(gl);
            return Err(err);
        }
    };
    link(gl, vertex, fragment)
}
