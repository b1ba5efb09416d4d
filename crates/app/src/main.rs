mod state;
mod ui;

use eframe::egui;
use state::AppState;
use std::path::PathBuf;

struct QuadratApp {
    state: AppState,
}

impl QuadratApp {
    fn new(_cc: &eframe::CreationContext<'_>, manifest: Option<PathBuf>) -> Self {
        let mut state = AppState::new();
        if let Some(path) = manifest {
            if let Err(e) = state.open_manifest(path) {
                tracing::error!("{e:#}");
                state.error = Some(format!("{e:#}"));
            }
        }
        Self { state }
    }
}

impl eframe::App for QuadratApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quadrat_core=info,quadrat_app=info")),
        )
        .init();

    // Optional manifest path as the only argument
    let manifest = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Quadrat",
        options,
        Box::new(|cc| Ok(Box::new(QuadratApp::new(cc, manifest)))),
    )
}
