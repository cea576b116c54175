use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::export;
use crate::file_handler::FileHandler;
use crate::input::{CanvasTool, InputHandler};
use crate::panels;
use crate::renderer::Renderer;
use crate::session::EditorSession;
use crate::stroke::BrushSettings;

/// Size of a fresh paint canvas
pub const PAINT_CANVAS_SIZE: [u32; 2] = [800, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Paint,
    Photo,
}

/// Discrete requests fired by the toolbar and keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Load,
    Crop,
    Resize,
    Rotate,
    Save,
    Undo,
    Redo,
}

/// Everything that survives a restart.
/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppSettings {
    pub tab: Tab,
    pub brush: BrushSettings,
}

/// Last message shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    /// Benign notices are shown without warning colours
    pub soft: bool,
}

/// One editor tab: its session plus the UI state bound to it
pub struct Workspace {
    pub session: EditorSession,
    pub renderer: Renderer,
    pub input: InputHandler,
    /// Name typed into the save field; blank means the default
    pub file_name: String,
}

impl Workspace {
    fn new(session: EditorSession) -> Self {
        Self {
            session,
            renderer: Renderer::new(),
            input: InputHandler::new(),
            file_name: String::new(),
        }
    }
}

pub struct EditorApp {
    settings: AppSettings,
    paint: Workspace,
    photo: Workspace,
    resize_width: String,
    resize_height: String,
    /// Photo revision the resize fields were last filled from
    resize_synced: Option<u64>,
    status: Option<StatusMessage>,
    file_handler: FileHandler,
}

impl EditorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> EditResult<Self> {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut app = Self::with_settings(settings)?;
        app.paint.session.set_repaint_context(cc.egui_ctx.clone());
        app.photo.session.set_repaint_context(cc.egui_ctx.clone());
        Ok(app)
    }

    pub fn with_settings(settings: AppSettings) -> EditResult<Self> {
        let [width, height] = PAINT_CANVAS_SIZE;
        Ok(Self {
            settings,
            paint: Workspace::new(EditorSession::paint(width, height)?),
            photo: Workspace::new(EditorSession::photo()),
            resize_width: String::new(),
            resize_height: String::new(),
            resize_synced: None,
            status: None,
            file_handler: FileHandler::new(),
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn workspace(&self, tab: Tab) -> &Workspace {
        match tab {
            Tab::Paint => &self.paint,
            Tab::Photo => &self.photo,
        }
    }

    fn active_mut(&mut self) -> &mut Workspace {
        match self.settings.tab {
            Tab::Paint => &mut self.paint,
            Tab::Photo => &mut self.photo,
        }
    }

    /// Surface an operation's outcome in the status bar
    pub fn report(&mut self, result: EditResult) {
        match result {
            Ok(()) => {}
            Err(err) if err.is_soft() => {
                log::info!("{}", err);
                self.status = Some(StatusMessage { text: err.to_string(), soft: true });
            }
            Err(err) => {
                log::warn!("{}", err);
                self.status = Some(StatusMessage { text: err.to_string(), soft: false });
            }
        }
    }

    /// Run one intent against the active tab
    pub fn apply(&mut self, intent: Intent) {
        log::debug!("{:?} on {:?}", intent, self.settings.tab);
        self.status = None;
        let result = match intent {
            Intent::Undo => self.active_mut().session.undo(),
            Intent::Redo => self.active_mut().session.redo(),
            Intent::Rotate => self.active_mut().session.rotate(),
            Intent::Crop => self.active_mut().session.crop_to_selection(),
            Intent::Resize => {
                let (width, height) = (self.resize_width.clone(), self.resize_height.clone());
                self.active_mut()
                    .session
                    .resize_from_text(&width, &height)
                    .map(|_| ())
            }
            Intent::Load => self.load_with_dialog(),
            Intent::Save => self.save_with_dialog(),
        };
        self.report(result);
        self.sync_resize_fields();
    }

    /// Refill the resize fields with the current size whenever the photo
    /// changes. Typed values survive until then.
    fn sync_resize_fields(&mut self) {
        let session = &self.photo.session;
        let Some(surface) = session.surface() else {
            return;
        };
        if self.resize_synced == Some(session.revision()) {
            return;
        }
        self.resize_width = surface.width().to_string();
        self.resize_height = surface.height().to_string();
        self.resize_synced = Some(session.revision());
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_with_dialog(&mut self) -> EditResult {
        let path = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
            .pick_file();
        self.settings.tab = Tab::Photo;
        self.photo.session.load_file(path.as_deref())
    }

    #[cfg(target_arch = "wasm32")]
    fn load_with_dialog(&mut self) -> EditResult {
        // No native picker on the web; files arrive by drag and drop
        Err(EditError::NoFileSelected)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_with_dialog(&mut self) -> EditResult {
        let workspace = self.active_mut();
        let stem = workspace.session.kind().default_file_stem();
        let file_name = export::export_file_name(Some(&workspace.file_name), stem);
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name.as_str())
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            log::debug!("Save cancelled");
            return Ok(());
        };
        export::save_png(&workspace.session, &path)?;
        self.status = Some(StatusMessage {
            text: format!("Saved {}", path.display()),
            soft: true,
        });
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn save_with_dialog(&mut self) -> EditResult {
        Err(EditError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "saving is only available in the desktop build",
        )))
    }

    fn poll_sessions(&mut self) {
        let landed = [
            self.paint.session.poll_pending(),
            self.photo.session.poll_pending(),
        ];
        for result in landed.into_iter().flatten() {
            self.report(result);
        }
        self.sync_resize_fields();
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        let redo = ctx.input_mut(|i| {
            i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                || i.consume_key(Modifiers::COMMAND, Key::Y)
        });
        let undo = ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Z));
        if redo {
            self.apply(Intent::Redo);
        } else if undo {
            self.apply(Intent::Undo);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        let Some(bytes) = self.file_handler.take_image_bytes() else {
            self.report(Err(EditError::NoFileSelected));
            return;
        };
        self.settings.tab = Tab::Photo;
        let result = self.photo.session.load_image(bytes);
        self.report(result);
    }
}

impl eframe::App for EditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_sessions();
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        let mut intents = Vec::new();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.settings.tab, Tab::Paint, "🖌 Paint");
                ui.selectable_value(&mut self.settings.tab, Tab::Photo, "🖼 Photo");
            });
            ui.separator();
            match self.settings.tab {
                Tab::Paint => intents.extend(panels::tools_panel::paint_tools(
                    ui,
                    &mut self.settings.brush,
                    &mut self.paint,
                )),
                Tab::Photo => intents.extend(panels::tools_panel::photo_tools(
                    ui,
                    &mut self.photo,
                    &mut self.resize_width,
                    &mut self.resize_height,
                )),
            }
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, self.status.as_ref(), &self.workspace(self.settings.tab).session);
        });

        egui::SidePanel::right("history_panel")
            .resizable(true)
            .default_width(180.0)
            .show(ctx, |ui| {
                panels::history_panel::history_panel(ui, &self.workspace(self.settings.tab).session);
            });

        let tab = self.settings.tab;
        let brush = self.settings.brush.clone();
        let canvas_result = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let (workspace, tool) = match tab {
                    Tab::Paint => (&mut self.paint, CanvasTool::Brush),
                    Tab::Photo => (&mut self.photo, CanvasTool::Select),
                };
                panels::central_panel::central_panel(ui, workspace, tool, &brush)
            })
            .inner;
        self.report(canvas_result);

        for intent in intents {
            self.apply(intent);
        }

        // Keep the selection outline fading and the pending decodes polled
        if self.photo.session.selection().is_some() || self.photo.session.is_busy() || self.paint.session.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use futures::executor::block_on;
    use image::Rgba;

    fn resize_fields(app: &EditorApp) -> (&str, &str) {
        (app.resize_width.as_str(), app.resize_height.as_str())
    }

    #[test]
    fn test_settings_default() {
        let settings = AppSettings::default();
        assert_eq!(settings.tab, Tab::Paint);
        assert_eq!(settings.brush, BrushSettings::default());
    }

    #[test]
    fn test_report_marks_soft_errors() {
        let mut app = EditorApp::with_settings(AppSettings::default()).unwrap();
        app.apply(Intent::Undo);
        assert_eq!(
            app.status(),
            Some(&StatusMessage { text: "nothing to undo".to_owned(), soft: true })
        );

        app.settings.tab = Tab::Photo;
        app.apply(Intent::Crop);
        let status = app.status().unwrap();
        assert!(!status.soft);
        assert_eq!(status.text, "load an image first");
    }

    #[test]
    fn test_paint_tab_starts_blank() {
        let app = EditorApp::with_settings(AppSettings::default()).unwrap();
        let paint = &app.workspace(Tab::Paint).session;
        assert_eq!(paint.surface().map(|s| s.size()), Some(PAINT_CANVAS_SIZE));
        assert!(app.workspace(Tab::Photo).session.surface().is_none());
    }

    #[cfg(target_arch = "wasm32")]
    #[test]
    fn test_web_save_reports_failure() {
        let mut app = EditorApp::with_settings(AppSettings::default()).unwrap();
        app.apply(Intent::Save);
        assert!(!app.status().unwrap().soft);
    }

    #[test]
    fn test_resize_fields_follow_the_photo() {
        let settings = AppSettings { tab: Tab::Photo, ..Default::default() };
        let mut app = EditorApp::with_settings(settings).unwrap();
        let bytes = Surface::new(100, 50, Rgba([40, 80, 120, 255])).encode_png().unwrap();
        app.photo.session.load_image(bytes).unwrap();
        block_on(app.photo.session.settle()).unwrap();
        app.poll_sessions();
        assert_eq!(resize_fields(&app), ("100", "50"));

        app.apply(Intent::Rotate);
        assert_eq!(resize_fields(&app), ("50", "100"));

        // Typed values stay until the photo changes again
        app.resize_width = "70".to_owned();
        app.poll_sessions();
        assert_eq!(resize_fields(&app), ("70", "100"));

        app.apply(Intent::Undo);
        block_on(app.photo.session.settle()).unwrap();
        app.poll_sessions();
        assert_eq!(resize_fields(&app), ("100", "50"));
    }
}
