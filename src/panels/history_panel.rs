use crate::session::EditorSession;

/// Side panel listing both stacks, oldest at the top
pub fn history_panel(ui: &mut egui::Ui, session: &EditorSession) {
    ui.heading("History");

    let history = session.history();
    ui.horizontal(|ui| {
        ui.label(format!("Undo stack size: {}", history.len()));
        ui.label(format!("Redo stack size: {}", history.redo_len()));
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("history_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .striped(true)
            .show(ui, |ui| {
                let last = history.len().saturating_sub(1);
                for (index, snapshot) in history.entries().iter().enumerate() {
                    let [w, h] = snapshot.size();
                    let text = format!("{} {}×{}", snapshot.short_id(), w, h);
                    if index == last {
                        ui.strong(text);
                        ui.label("current");
                    } else {
                        ui.label(text);
                        ui.label("");
                    }
                    ui.end_row();
                }

                // Next redo is last in the stack, show it first
                for snapshot in history.redo_entries().iter().rev() {
                    let [w, h] = snapshot.size();
                    ui.weak(format!("{} {}×{}", snapshot.short_id(), w, h));
                    ui.weak("redo");
                    ui.end_row();
                }
            });
    });
}
