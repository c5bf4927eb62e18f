use crate::meter::MeterCellState;
use eframe::egui;

pub const PLATINUM_BG: egui::Color32 = egui::Color32::from_rgb(212, 208, 200);
pub const PLATINUM_DARK: egui::Color32 = egui::Color32::from_rgb(128, 128, 128);

// Meter cell palette.
pub const CELL_OFF: egui::Color32 = egui::Color32::from_rgb(64, 64, 64);
pub const CELL_GREEN: egui::Color32 = egui::Color32::from_rgb(40, 200, 64);
pub const CELL_YELLOW: egui::Color32 = egui::Color32::from_rgb(240, 210, 40);
pub const CELL_RED: egui::Color32 = egui::Color32::from_rgb(224, 40, 32);

pub fn setup_global_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.panel_fill = PLATINUM_BG;
    style.visuals.window_fill = PLATINUM_BG;

    //
    // Square widgets to match the meter cells.
    //
    style.visuals.widgets.noninteractive.rounding = egui::Rounding::ZERO;
    style.visuals.widgets.active.rounding = egui::Rounding::ZERO;
    style.visuals.widgets.inactive.rounding = egui::Rounding::ZERO;
    style.visuals.widgets.hovered.rounding = egui::Rounding::ZERO;

    ctx.set_style(style);
}

/// Fill color for one meter cell.
pub fn cell_color(state: MeterCellState) -> egui::Color32 {
    match state {
        MeterCellState::Inactive => CELL_OFF,
        MeterCellState::Green => CELL_GREEN,
        MeterCellState::Yellow => CELL_YELLOW,
        MeterCellState::Red => CELL_RED,
    }
}

/// Draws the top bar with the app name and the active input on the right.
pub fn draw_menu_bar(ui: &mut egui::Ui, input_summary: &str) {
    egui::TopBottomPanel::top("menubar").show_inside(ui, |ui| {
        ui.visuals_mut().widgets.noninteractive.bg_fill = PLATINUM_BG;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("micmeter").strong());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(input_summary).italics().size(10.0));
            });
        });
    });
}

/// Draws a window styled with the "Platinum" retro frame.
pub fn draw_platinum_window<F: FnOnce(&mut egui::Ui)>(ui: &mut egui::Ui, title: &str, content: F) {
    let frame = egui::Frame::none()
        .fill(PLATINUM_BG)
        .stroke(egui::Stroke::new(1.0, egui::Color32::BLACK))
        .inner_margin(2.0);

    frame.show(ui, |ui| {
        let title_height = 18.0;
        let (rect, _response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), title_height),
            egui::Sense::hover(),
        );

        //
        // Pinstriped title bar with centered text.
        //
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(200, 200, 200));
        let stripe = egui::Stroke::new(
            1.0,
            egui::Color32::from_rgba_premultiplied(255, 255, 255, 50),
        );
        for i in (0..rect.width() as i32).step_by(2) {
            let x = rect.min.x + i as f32;
            painter.line_segment(
                [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
                stripe,
            );
        }
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            title,
            egui::FontId::proportional(14.0),
            egui::Color32::BLACK,
        );

        ui.add_space(4.0);
        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.0, PLATINUM_DARK))
            .inner_margin(6.0)
            .show(ui, content);
    });
}

/// Paints the meter as a row of cells across the available width.
pub fn draw_meter(ui: &mut egui::Ui, cells: &[MeterCellState], height: f32) {
    let (rect, _response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), height), egui::Sense::hover());

    let painter = ui.painter();
    painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

    if cells.is_empty() {
        return;
    }

    let gap = 2.0;
    let cell_width = (rect.width() - gap) / cells.len() as f32;

    for (i, &state) in cells.iter().enumerate() {
        let min = egui::pos2(rect.min.x + gap + i as f32 * cell_width, rect.min.y + gap);
        let size = egui::vec2((cell_width - gap).max(1.0), height - 2.0 * gap);
        let cell = egui::Rect::from_min_size(min, size);
        painter.rect_filled(cell, 0.0, cell_color(state));
        if state.is_active() {
            painter.rect_stroke(
                cell,
                egui::Rounding::ZERO,
                egui::Stroke::new(1.0, egui::Color32::WHITE.gamma_multiply(0.4)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_a_distinct_color() {
        let colors = [
            cell_color(MeterCellState::Inactive),
            cell_color(MeterCellState::Green),
            cell_color(MeterCellState::Yellow),
            cell_color(MeterCellState::Red),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
