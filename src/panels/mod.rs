pub mod central_panel;
pub mod history_panel;
pub mod tools_panel;

use crate::app::StatusMessage;
use crate::session::EditorSession;

/// Bottom line: last message, surface size, busy marker
pub fn status_bar(ui: &mut egui::Ui, status: Option<&StatusMessage>, session: &EditorSession) {
    ui.horizontal(|ui| {
        match session.surface() {
            Some(surface) => ui.label(format!("{} × {}", surface.width(), surface.height())),
            None => ui.weak("No image"),
        };
        if session.is_busy() {
            ui.spinner();
        }
        ui.separator();
        if let Some(status) = status {
            if status.soft {
                ui.label(&status.text);
            } else {
                ui.colored_label(ui.visuals().warn_fg_color, &status.text);
            }
        }
    });
}
