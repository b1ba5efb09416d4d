use anyhow::Context;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use quadrat_core::manifest::Manifest;
use quadrat_core::{compute_view, Dataset, InteractionController, View, ViewConfig};

#[derive(Debug)]
pub enum LoadMsg {
    Done(Dataset),
    Error(String),
}

pub struct AppState {
    pub manifest: Option<Manifest>,
    pub section: Option<String>,
    pub load_rx: Option<Receiver<LoadMsg>>,
    pub dataset: Option<Dataset>,
    pub view: Option<View>,
    pub controller: InteractionController,
    pub config: ViewConfig,
    /// Load or manifest failure; cleared by picking another section.
    pub error: Option<String>,
    /// Why the current canvas size has no view; cleared by the next layout.
    pub layout_error: Option<String>,
    failed_size: Option<(f64, f64)>,
}

impl AppState {
    pub fn new() -> Self {
        let config = ViewConfig::default();
        Self {
            manifest: None,
            section: None,
            load_rx: None,
            dataset: None,
            view: None,
            controller: InteractionController::new(config.tooltip.clone()),
            config,
            error: None,
            layout_error: None,
            failed_size: None,
        }
    }

    pub fn open_manifest(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let manifest =
            Manifest::open(&path).with_context(|| format!("opening manifest {}", path.display()))?;
        let first = manifest.first().map(|e| e.id.clone());
        tracing::info!("Opened manifest {} ({} sections)", path.display(), manifest.entries.len());
        self.manifest = Some(manifest);
        match first {
            Some(id) => self.select_section(id),
            None => self.clear(),
        }
        Ok(())
    }

    /// Switch tabs: drop the current view and read the section's dataset on
    /// a worker thread.
    pub fn select_section(&mut self, id: String) {
        let Some(manifest) = self.manifest.clone() else { return; };
        self.clear();
        self.section = Some(id.clone());

        let (tx, rx): (Sender<LoadMsg>, Receiver<LoadMsg>) = unbounded();
        self.load_rx = Some(rx);
        std::thread::spawn(move || {
            let msg = match manifest.load(&id) {
                Ok(dataset) => LoadMsg::Done(dataset),
                Err(e) => LoadMsg::Error(e.to_string()),
            };
            let _ = tx.send(msg);
        });
    }

    pub fn is_loading(&self) -> bool {
        self.load_rx.is_some()
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.view = None;
        self.layout_error = None;
        self.failed_size = None;
        self.controller.reset();
    }

    /// Recompute the view when there is none yet or the canvas was resized.
    /// A failed layout is retried once the size changes.
    pub fn ensure_view(&mut self, width: f64, height: f64) {
        let Some(dataset) = &self.dataset else { return; };
        let stale = match (&self.view, self.failed_size) {
            (Some(view), _) => (view.width - width).abs() > 0.5 || (view.height - height).abs() > 0.5,
            (None, Some((w, h))) => (w - width).abs() > 0.5 || (h - height).abs() > 0.5,
            (None, None) => true,
        };
        if !stale {
            return;
        }
        self.controller.reset();
        match compute_view(dataset, width, height, &self.config) {
            Ok(view) => {
                self.view = Some(view);
                self.layout_error = None;
                self.failed_size = None;
            }
            Err(e) => {
                tracing::warn!("Cannot lay out '{}': {}", dataset.title, e);
                self.view = None;
                self.layout_error = Some(e.to_string());
                self.failed_size = Some((width, height));
            }
        }
    }

    fn clear(&mut self) {
        self.section = None;
        self.load_rx = None;
        self.dataset = None;
        self.view = None;
        self.error = None;
        self.layout_error = None;
        self.failed_size = None;
        self.controller.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadrat_core::RawRecord;

    fn loaded() -> AppState {
        let mut app = AppState::new();
        app.set_dataset(Dataset {
            title: "Sales".into(),
            description: String::new(),
            data: RawRecord::group("root", vec![RawRecord::leaf("Wii Sports", 82.0)]),
        });
        app
    }

    #[test]
    fn collapsed_canvas_recovers_after_resize() {
        let mut app = loaded();
        app.ensure_view(800.0, 0.0);
        assert!(app.view.is_none());
        assert!(app.layout_error.is_some());
        assert!(app.error.is_none());

        app.ensure_view(800.0, 600.0);
        assert!(app.view.is_some());
        assert!(app.layout_error.is_none());
    }

    #[test]
    fn failed_size_is_not_retried_every_frame() {
        let mut app = loaded();
        app.ensure_view(800.0, 50.0);
        let first = app.layout_error.clone();
        app.ensure_view(800.2, 50.0);
        assert_eq!(app.layout_error, first);
        assert!(app.view.is_none());
    }
}
