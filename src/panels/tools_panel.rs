use egui::{Color32, Ui};

use crate::app::{Intent, Workspace};
use crate::session::EditorSession;
use crate::stroke::{BrushSettings, BrushStyle, MAX_WIDTH, MIN_WIDTH, PaletteColor};

fn swatch_color(color: PaletteColor) -> Color32 {
    let [r, g, b, a] = color.rgba().0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Undo/redo buttons shared by both tabs
fn history_buttons(ui: &mut Ui, session: &EditorSession, intents: &mut Vec<Intent>) {
    let idle = !session.is_busy();
    let history = session.history();
    if ui.add_enabled(idle && history.can_undo(), egui::Button::new("⟲ Undo")).clicked() {
        intents.push(Intent::Undo);
    }
    if ui.add_enabled(idle && history.can_redo(), egui::Button::new("⟳ Redo")).clicked() {
        intents.push(Intent::Redo);
    }
}

fn save_controls(ui: &mut Ui, workspace: &mut Workspace, intents: &mut Vec<Intent>) {
    ui.add(
        egui::TextEdit::singleline(&mut workspace.file_name)
            .hint_text(workspace.session.kind().default_file_stem())
            .desired_width(120.0),
    );
    if ui
        .add_enabled(workspace.session.surface().is_some(), egui::Button::new("💾 Save"))
        .clicked()
    {
        intents.push(Intent::Save);
    }
}

/// Swatches, width, brush style, eraser, history and save
pub fn paint_tools(ui: &mut Ui, brush: &mut BrushSettings, workspace: &mut Workspace) -> Vec<Intent> {
    let mut intents = Vec::new();

    ui.horizontal_wrapped(|ui| {
        for color in PaletteColor::ALL {
            let selected = !brush.erasing && brush.color == color;
            let stroke = if selected {
                egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
            } else {
                egui::Stroke::new(1.0, Color32::GRAY)
            };
            let swatch = egui::Button::new("")
                .fill(swatch_color(color))
                .stroke(stroke)
                .min_size(egui::vec2(20.0, 20.0));
            if ui.add(swatch).on_hover_text(color.name()).clicked() {
                brush.pick_color(color);
            }
        }

        ui.separator();
        ui.add(egui::Slider::new(&mut brush.width, MIN_WIDTH..=MAX_WIDTH).text("Width"));

        egui::ComboBox::from_label("Brush")
            .selected_text(brush.style.label())
            .show_ui(ui, |ui| {
                for style in BrushStyle::ALL {
                    ui.selectable_value(&mut brush.style, style, style.label());
                }
            });

        ui.toggle_value(&mut brush.erasing, "⌫ Eraser");

        ui.separator();
        history_buttons(ui, &workspace.session, &mut intents);
        ui.separator();
        save_controls(ui, workspace, &mut intents);
    });

    intents
}

/// Load, crop, resize, rotate, history and save
pub fn photo_tools(
    ui: &mut Ui,
    workspace: &mut Workspace,
    resize_width: &mut String,
    resize_height: &mut String,
) -> Vec<Intent> {
    let mut intents = Vec::new();
    let loaded = workspace.session.surface().is_some();

    ui.horizontal_wrapped(|ui| {
        if ui.button("📂 Open…").clicked() {
            intents.push(Intent::Load);
        }
        ui.separator();

        if ui.add_enabled(loaded, egui::Button::new("✂ Crop")).clicked() {
            intents.push(Intent::Crop);
        }

        ui.add_enabled(loaded, egui::TextEdit::singleline(resize_width).desired_width(48.0));
        ui.label("×");
        ui.add_enabled(loaded, egui::TextEdit::singleline(resize_height).desired_width(48.0));
        if ui.add_enabled(loaded, egui::Button::new("Resize")).clicked() {
            intents.push(Intent::Resize);
        }

        if ui.add_enabled(loaded, egui::Button::new("↻ Rotate")).clicked() {
            intents.push(Intent::Rotate);
        }

        ui.separator();
        history_buttons(ui, &workspace.session, &mut intents);
        ui.separator();
        save_controls(ui, workspace, &mut intents);
    });

    intents
}
