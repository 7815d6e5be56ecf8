#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(rustdoc::missing_crate_level_docs)] // it's an example

use eframe::{egui, egui_glow, glow};

use egui::mutex::Mutex;
use hello_triangle::{
    AppError, EventQueue, Key, LoopControl, RenderConfig, TriangleApp, WindowEvent,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    // Log to stderr (set `RUST_LOG=debug` for more).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = match std::env::args().nth(1) {
        Some(path) => match RenderConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(-1);
            }
        },
        None => RenderConfig::default(),
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width as f32, config.height as f32]),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };
    let title = config.title.clone();
    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(MyApp::new(cc, &config)?))),
    );
    match result {
        Ok(()) => {}
        // already logged inside `MyApp::new`
        Err(eframe::Error::AppCreation(_)) => std::process::exit(-1),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(-1);
        }
    }
}

struct MyApp {
    /// Behind an `Arc<Mutex<…>>` so we can pass it to [`egui::PaintCallback`] and paint later.
    app: Arc<Mutex<Option<TriangleApp<glow::Context>>>>,
    events: Arc<Mutex<EventQueue>>,
    exit_requested: Arc<AtomicBool>,
    size_px: Option<[u32; 2]>,
}

impl MyApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: &RenderConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let Some(gl) = cc.gl.as_ref() else {
            let msg = "You need to run eframe with the glow backend";
            log::error!("{msg}");
            return Err(msg.into());
        };
        let app = TriangleApp::new(gl.as_ref(), config).inspect_err(|e| {
            // shader diagnostics are logged where they happen
            if !matches!(e, AppError::Shader(_)) {
                log::error!("{e}");
            }
        })?;
        Ok(Self {
            app: Arc::new(Mutex::new(Some(app))),
            events: Arc::new(Mutex::new(EventQueue::new())),
            exit_requested: Arc::new(AtomicBool::new(false)),
            size_px: None,
        })
    }

    fn collect_events(&mut self, ctx: &egui::Context) {
        let (escape, close, rect, ppp) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.viewport().close_requested(),
                i.screen_rect(),
                i.pixels_per_point(),
            )
        });
        let mut events = self.events.lock();
        let size_px = [
            (rect.width() * ppp).round() as u32,
            (rect.height() * ppp).round() as u32,
        ];
        if self.size_px != Some(size_px) {
            self.size_px = Some(size_px);
            events.push(WindowEvent::Resized {
                width: size_px[0],
                height: size_px[1],
            });
        }
        if escape {
            events.push(WindowEvent::KeyPressed(Key::Escape));
        }
        if close {
            events.push(WindowEvent::CloseRequested);
        }
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exit_requested.load(Ordering::Relaxed) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        self.collect_events(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.custom_painting(ui);
            });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let (Some(gl), Some(app)) = (gl, self.app.lock().take()) {
            app.destroy(gl);
        }
    }
}

impl MyApp {
    fn custom_painting(&mut self, ui: &mut egui::Ui) {
        let rect = ui.max_rect();
        // Clone locals so we can move them into the paint callback:
        let app = self.app.clone();
        let events = self.events.clone();
        let exit_requested = self.exit_requested.clone();
        let ctx = ui.ctx().clone();
        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                let mut app = app.lock();
                let Some(app) = app.as_mut() else {
                    return;
                };
                let gl = painter.gl().as_ref();
                let pending: Vec<_> = events.lock().drain().collect();
                if app.handle_events(gl, pending) == LoopControl::Exit {
                    exit_requested.store(true, Ordering::Relaxed);
                    ctx.request_repaint();
                }
                app.frame(gl);
            })),
        };
        ui.painter().add(callback);
    }
}
