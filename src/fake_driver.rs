//! In-memory stand-in for a GL context, used by the unit tests.
//!
//! Compilation only checks that braces balance and a `main` exists. Linking
//! checks that every fragment `in` has a vertex `out` of the same name and type.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::driver::GraphicsDriver;

#[derive(Debug)]
struct Shader {
    shader_type: u32,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct Program {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attrib {
    pub size: i32,
    pub stride: i32,
    pub offset: i32,
    pub enabled: bool,
    pub buffer: Option<u32>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    shaders: HashMap<u32, Shader>,
    programs: HashMap<u32, Program>,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashMap<u32, HashMap<u32, Attrib>>,
    bound_buffer: Option<u32>,
    bound_vertex_array: Option<u32>,
    current_program: Option<u32>,
    shaders_created: usize,
    programs_created: usize,
    viewport: Option<[i32; 4]>,
    viewport_calls: usize,
    clear_color: Option<[f32; 4]>,
    draws: Vec<(i32, i32)>,
    error: u32,
}

impl State {
    fn gen_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn raise(&mut self, code: u32) {
        if self.error == glow::NO_ERROR {
            self.error = code;
        }
    }
}

/// Kinds of object whose creation can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    Shader,
    Program,
    Buffer,
    VertexArray,
}

#[derive(Debug, Default)]
pub struct FakeDriver {
    state: RefCell<State>,
    log_padding: usize,
    failing: Option<Object>,
}

fn check_syntax(source: &str) -> Result<(), String> {
    let mut depth = 0i64;
    for (line_no, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}: error: unexpected '}}'", line_no + 1));
            }
        }
    }
    if depth != 0 {
        return Err(format!(
            "0:{}: error: unexpected end of file, {depth} unclosed '{{'",
            source.lines().count()
        ));
    }
    if !source.contains("main(") && !source.contains("main (") {
        return Err("0:0: error: missing entry point 'main'".to_string());
    }
    Ok(())
}

/// `(type, name)` pairs declared with the given storage qualifier.
fn interface(source: &str, qualifier: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if line.starts_with("layout") {
                line = line.split_once(')')?.1.trim();
            }
            let mut tokens = line
                .split_whitespace()
                .skip_while(|t| matches!(*t, "flat" | "smooth" | "noperspective"));
            if tokens.next()? != qualifier {
                return None;
            }
            let ty = tokens.next()?.to_string();
            let name = tokens.next()?.trim_end_matches(';').to_string();
            Some((ty, name))
        })
        .collect()
}

impl FakeDriver {
    /// Pads every failure log with `n` extra bytes.
    pub fn with_log_padding(mut self, n: usize) -> Self {
        self.log_padding = n;
        self
    }

    /// Every `create_*` call for `object` returns `Err`.
    pub fn with_failing(mut self, object: Object) -> Self {
        self.failing = Some(object);
        self
    }

    fn refuse(&self, object: Object) -> Result<(), String> {
        if self.failing == Some(object) {
            return Err(format!("out of memory creating {object:?}"));
        }
        Ok(())
    }

    fn padded(&self, mut log: String) -> String {
        if self.log_padding > 0 {
            log.push('\n');
            log.push_str(&"#".repeat(self.log_padding));
        }
        log
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn shaders_created(&self) -> usize {
        self.state.borrow().shaders_created
    }

    pub fn programs_created(&self) -> usize {
        self.state.borrow().programs_created
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn viewport_state(&self) -> Option<[i32; 4]> {
        self.state.borrow().viewport
    }

    pub fn viewport_calls(&self) -> usize {
        self.state.borrow().viewport_calls
    }

    pub fn clear_color_state(&self) -> Option<[f32; 4]> {
        self.state.borrow().clear_color
    }

    pub fn draw_calls(&self) -> Vec<(i32, i32)> {
        self.state.borrow().draws.clone()
    }

    /// Contents of the buffer feeding `index` in the bound vertex array.
    pub fn attrib_data(&self, index: u32) -> Option<(Attrib, Vec<u8>)> {
        let st = self.state.borrow();
        let attrib = st.vertex_arrays.get(&st.bound_vertex_array?)?.get(&index)?.clone();
        let data = st.buffers.get(&attrib.buffer?)?.clone();
        Some((attrib, data))
    }
}

impl GraphicsDriver for FakeDriver {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        if shader_type != glow::VERTEX_SHADER && shader_type != glow::FRAGMENT_SHADER {
            return Err(format!("unsupported shader type {shader_type:#x}"));
        }
        self.refuse(Object::Shader)?;
        let mut st = self.state.borrow_mut();
        let name = st.gen_name();
        st.shaders.insert(
            name,
            Shader {
                shader_type,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        st.shaders_created += 1;
        Ok(name)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut st = self.state.borrow_mut();
        match st.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => st.raise(glow::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut st = self.state.borrow_mut();
        match st.shaders.get_mut(&shader) {
            Some(s) => match check_syntax(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = self.padded(log);
                }
            },
            None => st.raise(glow::INVALID_VALUE),
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut st = self.state.borrow_mut();
        if st.shaders.remove(&shader).is_none() {
            st.raise(glow::INVALID_VALUE);
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        self.refuse(Object::Program)?;
        let mut st = self.state.borrow_mut();
        let name = st.gen_name();
        st.programs.insert(name, Program::default());
        st.programs_created += 1;
        Ok(name)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut st = self.state.borrow_mut();
        if !st.shaders.contains_key(&shader) {
            st.raise(glow::INVALID_VALUE);
            return;
        }
        match st.programs.get_mut(&program) {
            Some(p) => p.attached.push(shader),
            None => st.raise(glow::INVALID_VALUE),
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut st = self.state.borrow_mut();
        match st.programs.get_mut(&program) {
            Some(p) => p.attached.retain(|s| *s != shader),
            None => st.raise(glow::INVALID_VALUE),
        }
    }

    fn link_program(&self, program: u32) {
        let mut st = self.state.borrow_mut();
        let Some(attached) = st.programs.get(&program).map(|p| p.attached.clone()) else {
            st.raise(glow::INVALID_VALUE);
            return;
        };
        let shaders = &st.shaders;
        let stage = |ty: u32| {
            attached
                .iter()
                .filter_map(|name| shaders.get(name))
                .find(|s| s.shader_type == ty)
        };
        let result = match (stage(glow::VERTEX_SHADER), stage(glow::FRAGMENT_SHADER)) {
            (Some(vs), Some(fs)) if vs.compiled && fs.compiled => {
                let outputs = interface(&vs.source, "out");
                interface(&fs.source, "in")
                    .into_iter()
                    .find_map(|(ty, name)| {
                        match outputs.iter().find(|(_, out_name)| *out_name == name) {
                            Some((out_ty, _)) if *out_ty == ty => None,
                            Some((out_ty, _)) => Some(format!(
                                "error: type mismatch on varying '{name}': {out_ty} vs {ty}"
                            )),
                            None => Some(format!(
                                "error: fragment input '{name}' is not written by the vertex stage"
                            )),
                        }
                    })
                    .map_or(Ok(()), Err)
            }
            (Some(_), Some(_)) => Err("error: attached shader is not compiled".to_string()),
            _ => Err("error: program needs a vertex and a fragment stage".to_string()),
        };
        let log = match result {
            Ok(()) => None,
            Err(log) => Some(self.padded(log)),
        };
        if let Some(p) = st.programs.get_mut(&program) {
            p.linked = log.is_none();
            p.log = log.unwrap_or_default();
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        let mut st = self.state.borrow_mut();
        match program {
            Some(name) if !st.programs.get(&name).map_or(false, |p| p.linked) => {
                st.raise(glow::INVALID_OPERATION)
            }
            _ => st.current_program = program,
        }
    }

    fn delete_program(&self, program: u32) {
        let mut st = self.state.borrow_mut();
        if st.programs.remove(&program).is_none() {
            st.raise(glow::INVALID_VALUE);
        }
        if st.current_program == Some(program) {
            st.current_program = None;
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        self.refuse(Object::Buffer)?;
        let mut st = self.state.borrow_mut();
        let name = st.gen_name();
        st.buffers.insert(name, Vec::new());
        Ok(name)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().bound_buffer = buffer;
    }

    fn array_buffer_data(&self, data: &[u8]) {
        let mut st = self.state.borrow_mut();
        match st.bound_buffer {
            Some(name) => {
                if let Some(buf) = st.buffers.get_mut(&name) {
                    *buf = data.to_vec();
                }
            }
            None => st.raise(glow::INVALID_OPERATION),
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut st = self.state.borrow_mut();
        st.buffers.remove(&buffer);
        if st.bound_buffer == Some(buffer) {
            st.bound_buffer = None;
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        self.refuse(Object::VertexArray)?;
        let mut st = self.state.borrow_mut();
        let name = st.gen_name();
        st.vertex_arrays.insert(name, HashMap::new());
        Ok(name)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut st = self.state.borrow_mut();
        st.vertex_arrays.remove(&vertex_array);
        if st.bound_vertex_array == Some(vertex_array) {
            st.bound_vertex_array = None;
        }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        let mut st = self.state.borrow_mut();
        let buffer = st.bound_buffer;
        let Some(vao) = st.bound_vertex_array else {
            st.raise(glow::INVALID_OPERATION);
            return;
        };
        if let Some(attribs) = st.vertex_arrays.get_mut(&vao) {
            let attrib = attribs.entry(index).or_default();
            attrib.size = size;
            attrib.stride = stride;
            attrib.offset = offset;
            attrib.buffer = buffer;
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut st = self.state.borrow_mut();
        let Some(vao) = st.bound_vertex_array else {
            st.raise(glow::INVALID_OPERATION);
            return;
        };
        if let Some(attribs) = st.vertex_arrays.get_mut(&vao) {
            attribs.entry(index).or_default().enabled = true;
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut st = self.state.borrow_mut();
        st.viewport_calls += 1;
        if width < 0 || height < 0 {
            st.raise(glow::INVALID_VALUE);
            return;
        }
        st.viewport = Some([x, y, width, height]);
    }

    fn clear_color_buffer(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().clear_color = Some(rgba);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        let mut st = self.state.borrow_mut();
        if st.current_program.is_none() {
            st.raise(glow::INVALID_OPERATION);
            return;
        }
        st.draws.push((first, count));
    }

    fn error(&self) -> u32 {
        std::mem::replace(&mut self.state.borrow_mut().error, glow::NO_ERROR)
    }
}
