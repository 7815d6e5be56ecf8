//! Draw a flat-colored triangle list. Positions are xyz, attribute location 0.

use crate::driver::GraphicsDriver;
use crate::shader::{activate, ShaderProgram};

const POSITION_LOCATION: u32 = 0;

pub struct Drawer<D: GraphicsDriver> {
    program: ShaderProgram<D>,
    vertex_array: D::VertexArray,
    vbo: D::Buffer,
    num_vertex: i32,
}

impl<D: GraphicsDriver> Drawer<D> {
    /// Uploads `vtx2xyz` and records its layout in a fresh vertex array.
    /// On failure `program` is destroyed along with anything created so far.
    pub fn new(gl: &D, program: ShaderProgram<D>, vtx2xyz: &[f32]) -> Result<Self, String> {
        if vtx2xyz.is_empty() || vtx2xyz.len() % 3 != 0 {
            program.destroy(gl);
            return Err(format!(
                "expected a non-empty list of xyz triples, got {} floats",
                vtx2xyz.len()
            ));
        }
        let num_vertex = match i32::try_from(vtx2xyz.len() / 3) {
            Ok(n) => n,
            Err(e) => {
                program.destroy(gl);
                return Err(e.to_string());
            }
        };
        // the vertex array must exist before the buffer it captures is bound
        let vertex_array = match gl.create_vertex_array() {
            Ok(vertex_array) => vertex_array,
            Err(e) => {
                program.destroy(gl);
                return Err(e);
            }
        };
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gl.delete_vertex_array(vertex_array);
                program.destroy(gl);
                return Err(e);
            }
        };
        gl.bind_vertex_array(Some(vertex_array));
        gl.bind_array_buffer(Some(vbo));
        gl.array_buffer_data(bytemuck::cast_slice(vtx2xyz));
        gl.vertex_attrib_pointer_f32(
            POSITION_LOCATION,
            3,
            3 * std::mem::size_of::<f32>() as i32,
            0,
        );
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        log::debug!("uploaded {num_vertex} vertices");
        Ok(Self {
            program,
            vertex_array,
            vbo,
            num_vertex,
        })
    }

    pub fn num_vertex(&self) -> i32 {
        self.num_vertex
    }

    pub fn paint(&self, gl: &D, clear_color: [f32; 4]) {
        gl.clear_color_buffer(clear_color);
        activate(gl, &self.program);
        gl.bind_vertex_array(Some(self.vertex_array));
        gl.draw_triangles(0, self.num_vertex);
    }

    pub fn destroy(self, gl: &D) {
        gl.delete_buffer(self.vbo);
        gl.delete_vertex_array(self.vertex_array);
        self.program.destroy(gl);
    }
}
