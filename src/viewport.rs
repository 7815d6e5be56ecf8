use crate::driver::GraphicsDriver;

/// Pixel rectangle rendering maps into. The origin is always the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> [i32; 4] {
        [0, 0, clamp_i32(self.width), clamp_i32(self.height)]
    }

    /// One driver call per invocation.
    pub fn apply<D: GraphicsDriver>(&self, gl: &D) {
        let [x, y, w, h] = self.rect();
        gl.viewport(x, y, w, h);
    }

    pub fn resize<D: GraphicsDriver>(&mut self, gl: &D, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.apply(gl);
        log::debug!("viewport set to {width}x{height}");
    }
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
