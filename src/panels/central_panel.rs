use crate::app::Workspace;
use crate::error::EditResult;
use crate::input::{CanvasTool, route_event};
use crate::stroke::BrushSettings;
use crate::util::time;

/// The canvas: present the surface, route pointer input, draw overlays.
///
/// Returns the first error raised by routed input this frame.
pub fn central_panel(
    ui: &mut egui::Ui,
    workspace: &mut Workspace,
    tool: CanvasTool,
    brush: &BrushSettings,
) -> EditResult {
    let ctx = ui.ctx().clone();
    let now = time::current_time_secs();

    let size = match workspace.renderer.present(&ctx, &workspace.session) {
        Some(texture) => texture.size_vec2(),
        None => {
            ui.centered_and_justified(|ui| {
                ui.weak("Open an image or drop one here to start editing");
            });
            return Ok(());
        }
    };

    let mut result = Ok(());
    egui::ScrollArea::both().show(ui, |ui| {
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::drag());

        for event in workspace.input.process_input(&ctx, rect) {
            if let Err(err) = route_event(&event, tool, &mut workspace.session, brush, now) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        // Pick up pixels changed by this frame's events
        workspace.renderer.present(&ctx, &workspace.session);
        workspace.renderer.paint(ui.painter(), rect, &workspace.session, now);
    });
    result
}
