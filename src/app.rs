use crate::config::{ConfigError, RenderConfig};
use crate::driver::GraphicsDriver;
use crate::drawer_triangle::Drawer;
use crate::events::{Key, LoopControl, WindowEvent};
use crate::shader::{build_program, ShaderError};
use crate::viewport::Viewport;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("Failed to upload vertices: {0}")]
    Driver(String),
}

/// The whole program once a context exists: one drawer, one viewport, one clear color.
pub struct TriangleApp<D: GraphicsDriver> {
    drawer: Drawer<D>,
    viewport: Viewport,
    clear_color: [f32; 4],
}

impl<D: GraphicsDriver> TriangleApp<D> {
    /// Fails without activating anything if either stage or the link fails.
    pub fn new(gl: &D, config: &RenderConfig) -> Result<Self, AppError> {
        config.validate()?;
        let viewport = Viewport::new(config.width, config.height);
        viewport.apply(gl);
        let program = build_program(gl, &config.vertex_source(), &config.fragment_source())?;
        let drawer = Drawer::new(gl, program, &config.vertices).map_err(AppError::Driver)?;
        log::info!(
            "\"{}\" ready: {} vertices, {}x{}",
            config.title,
            drawer.num_vertex(),
            config.width,
            config.height
        );
        Ok(Self {
            drawer,
            viewport,
            clear_color: config.clear_color,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn handle_event(&mut self, gl: &D, event: &WindowEvent) -> LoopControl {
        match *event {
            WindowEvent::Resized { width, height } => {
                self.viewport.resize(gl, width, height);
                LoopControl::Continue
            }
            WindowEvent::KeyPressed(Key::Escape) | WindowEvent::CloseRequested => {
                log::debug!("exit requested by {event:?}");
                LoopControl::Exit
            }
            WindowEvent::KeyPressed(Key::Other) => LoopControl::Continue,
        }
    }

    /// Handles every event, then reports whether any of them asked to exit.
    pub fn handle_events(
        &mut self,
        gl: &D,
        events: impl IntoIterator<Item = WindowEvent>,
    ) -> LoopControl {
        events
            .into_iter()
            .fold(LoopControl::Continue, |control, event| {
                match self.handle_event(gl, &event) {
                    LoopControl::Exit => LoopControl::Exit,
                    LoopControl::Continue => control,
                }
            })
    }

    pub fn frame(&self, gl: &D) {
        self.drawer.paint(gl, self.clear_color);
    }

    pub fn destroy(self, gl: &D) {
        self.drawer.destroy(gl);
        log::info!("Bye");
    }
}
