use eframe::egui::{self, Align2, Color32, FontId, Pos2, Ui};
use quadrat_core::color::Color;
use quadrat_core::treemap::Rect;
use quadrat_core::HoverState;

use crate::state::{AppState, LoadMsg};

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    poll_load(app, ctx);

    egui::TopBottomPanel::top("sections").show(ctx, |ui| {
        nav_bar(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(dataset) = &app.dataset {
            ui.heading(dataset.title.as_str());
            ui.label(egui::RichText::new(&dataset.description).small());
            ui.add_space(8.0);
        }
        if let Some(err) = &app.error {
            ui.colored_label(ui.visuals().error_fg_color, err.as_str());
            return;
        }
        if app.is_loading() {
            ui.spinner();
            return;
        }
        if app.dataset.is_none() {
            ui.label("Open a manifest to start");
            return;
        }
        chart(ui, app);
    });
}

fn nav_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Open Manifest").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("json", &["json"]).pick_file() {
                if let Err(e) = app.open_manifest(path) {
                    app.error = Some(format!("{e:#}"));
                }
            }
        }
        ui.separator();

        let Some(manifest) = &app.manifest else { return; };
        let mut clicked = None;
        for entry in &manifest.entries {
            let active = app.section.as_deref() == Some(entry.id.as_str());
            let color = if active {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().weak_text_color()
            };
            let text = egui::RichText::new(&entry.link).strong().color(color);
            if ui.add(egui::Label::new(text).sense(egui::Sense::click())).clicked() && !active {
                clicked = Some(entry.id.clone());
            }
        }
        if let Some(id) = clicked {
            app.select_section(id);
        }
    });
}

fn chart(ui: &mut Ui, app: &mut AppState) {
    let size = ui.available_size();
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let origin = response.rect.min;
    app.ensure_view(size.x as f64, size.y as f64);
    let Some(view) = &app.view else {
        if let Some(err) = &app.layout_error {
            painter.text(
                response.rect.left_top(),
                Align2::LEFT_TOP,
                err,
                FontId::proportional(14.0),
                ui.visuals().error_fg_color,
            );
        }
        return;
    };

    let to_screen = |r: &Rect, dx: f64, dy: f64| {
        egui::Rect::from_min_max(
            origin + egui::vec2((r.x0 + dx) as f32, (r.y0 + dy) as f32),
            origin + egui::vec2((r.x1 + dx) as f32, (r.y1 + dy) as f32),
        )
    };

    // Hover first so this frame already shows the new opacity.
    match response.hover_pos() {
        Some(pos) => {
            let local = pos - origin;
            match view.hit_test(local.x as f64, local.y as f64) {
                Some(id) => {
                    app.controller.on_pointer_move(&view.tiles, id, pos.x as f64, pos.y as f64);
                }
                None if app.controller.state() != HoverState::Idle => {
                    app.controller.on_pointer_leave();
                }
                None => {}
            }
        }
        None if app.controller.state() != HoverState::Idle => {
            app.controller.on_pointer_leave();
        }
        None => {}
    }

    for tile in &view.tiles {
        let rect = to_screen(&tile.rect, 0.0, 0.0);
        let fill = color32(tile.color).gamma_multiply(app.controller.opacity(tile.id));
        painter.rect_filled(rect, 0.0, fill);
        painter.with_clip_rect(rect).text(
            rect.min + egui::vec2(5.0, 12.0),
            Align2::LEFT_BOTTOM,
            &tile.label,
            FontId::proportional(8.0),
            Color32::BLACK,
        );
    }

    let (lx, ly) = view.legend_origin;
    for entry in &view.legend {
        painter.rect_filled(to_screen(&entry.swatch, lx, ly), 0.0, color32(entry.color));
        painter.text(
            origin + egui::vec2((entry.label_x + lx) as f32, (entry.label_y + ly) as f32),
            Align2::LEFT_BOTTOM,
            &entry.category,
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
    }

    let tip = app.controller.tooltip();
    if tip.visible {
        egui::Area::new(egui::Id::new("treemap-tooltip"))
            .fixed_pos(Pos2::new(tip.screen_x as f32, tip.screen_y as f32))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.strong(tip.name.as_str());
                    ui.label(format!("Category: {}", tip.category));
                    ui.label(format!("Value: {}", tip.value));
                });
            });
    }
}

fn color32(c: Color) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

fn poll_load(app: &mut AppState, ctx: &egui::Context) {
    let Some(rx) = app.load_rx.take() else { return; };
    match rx.try_recv() {
        Ok(LoadMsg::Done(dataset)) => {
            app.set_dataset(dataset);
            ctx.request_repaint();
        }
        Ok(LoadMsg::Error(e)) => {
            app.error = Some(e);
            ctx.request_repaint();
        }
        Err(_) => {
            // Still loading; keep polling next frame
            app.load_rx = Some(rx);
            ctx.request_repaint();
        }
    }
}
