use eframe::egui;

/// Picks up files dropped onto the window and hands back the first image
#[derive(Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect newly dropped files from the UI context.
    /// Returns true if any arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });
        new_dropped_files
    }

    /// Bytes of the first dropped image, consuming the drop
    pub fn take_image_bytes(&mut self) -> Option<Vec<u8>> {
        let files = std::mem::take(&mut self.dropped_files);
        for file in &files {
            let name = display_name(file);
            if !is_image_file(file) {
                log::warn!("Dropped file is not a supported image: {}", name);
                continue;
            }
            if let Some(bytes) = read_bytes(file) {
                log::info!("Accepted dropped image {} ({} bytes)", name, bytes.len());
                return Some(bytes);
            }
            log::warn!("Dropped file has no accessible data: {}", name);
        }
        None
    }

    /// Dim the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to open it",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check MIME type first, then the extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| file.name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()));
    matches!(
        name.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn read_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    // For WASM, we can't read from the filesystem
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return match std::fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    log::error!("Failed to read dropped file {}: {}", path.display(), err);
                    None
                }
            };
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, mime: &str, bytes: Option<&[u8]>) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            bytes: bytes.map(|b| b.to_vec().into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_file(&dropped("x", "image/png", None)));
        assert!(!is_image_file(&dropped("x.png", "text/plain", None)));
        assert!(is_image_file(&dropped("photo.JPG", "", None)));
        assert!(!is_image_file(&dropped("notes.txt", "", None)));
    }

    #[test]
    fn test_takes_first_readable_image() {
        let mut handler = FileHandler::new();
        handler.dropped_files = vec![
            dropped("notes.txt", "", Some(b"text")),
            dropped("a.png", "", Some(b"first")),
            dropped("b.png", "", Some(b"second")),
        ];
        assert_eq!(handler.take_image_bytes(), Some(b"first".to_vec()));
        assert_eq!(handler.take_image_bytes(), None);
    }
}
