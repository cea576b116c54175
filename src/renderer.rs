use egui::{Color32, ColorImage, Painter, Rect, TextureHandle, TextureOptions};
use uuid::Uuid;

use crate::session::EditorSession;
use crate::surface::Surface;

/// Outline colour of the drag selection
pub const SELECTION_COLOR: Color32 = Color32::RED;

/// The present step: mirrors a session's surface into a GPU texture.
///
/// The texture is only re-uploaded when the session or its revision changes.
#[derive(Default)]
pub struct Renderer {
    texture: Option<TextureHandle>,
    /// (session, revision) currently in the texture
    presented: Option<(Uuid, u64)>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the texture is stale for this session state
    pub fn needs_upload(&self, session: &EditorSession) -> bool {
        self.presented != Some((session.id(), session.revision()))
    }

    /// Upload the surface if it changed since the last call.
    ///
    /// Returns the texture to draw, or `None` while nothing is loaded.
    pub fn present(&mut self, ctx: &egui::Context, session: &EditorSession) -> Option<&TextureHandle> {
        let Some(surface) = session.surface() else {
            self.texture = None;
            self.presented = None;
            return None;
        };

        if self.needs_upload(session) {
            let image = to_color_image(surface);
            match self.texture.as_mut() {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => {
                    let name = format!("surface_{}", session.id());
                    self.texture = Some(ctx.load_texture(name, image, TextureOptions::NEAREST));
                }
            }
            self.presented = Some((session.id(), session.revision()));
            log::trace!("Uploaded revision {} of {}", session.revision(), session.id());
        }
        self.texture.as_ref()
    }

    /// Draw the presented surface at `rect` and the selection outline on top
    pub fn paint(&self, painter: &Painter, rect: Rect, session: &EditorSession, now: f64) {
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }

        if let Some(drag) = session.selection() {
            if drag.outline_visible(now) {
                let (start, end) = drag.corners();
                let outline = Rect::from_two_pos(start, end).translate(rect.min.to_vec2());
                painter.rect_stroke(outline, 0.0, egui::Stroke::new(2.0, SELECTION_COLOR));
            }
        }
    }
}

/// Surface pixels as an egui image
pub fn to_color_image(surface: &Surface) -> ColorImage {
    let [width, height] = surface.size();
    ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        surface.pixels().as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_image_matches_surface() {
        let surface = Surface::new(3, 2, image::Rgba([10, 20, 30, 255]));
        let image = to_color_image(&surface);
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[5], Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn test_present_uploads_once_per_revision() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new();
        let mut session = EditorSession::paint(8, 8).unwrap();

        assert!(renderer.needs_upload(&session));
        assert!(renderer.present(&ctx, &session).is_some());
        assert!(!renderer.needs_upload(&session));

        session.rotate().unwrap();
        session.resize(4, 4).unwrap();
        assert!(renderer.needs_upload(&session));
        let texture = renderer.present(&ctx, &session).unwrap();
        assert_eq!(texture.size(), [4, 4]);
    }

    #[test]
    fn test_present_without_surface() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new();
        let session = EditorSession::photo();
        assert!(renderer.present(&ctx, &session).is_none());
    }

    #[test]
    fn test_paint_basics() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new();
        let mut session = EditorSession::paint(20, 20).unwrap();
        session.begin_selection(egui::pos2(2.0, 2.0)).unwrap();
        session.update_selection(egui::pos2(12.0, 12.0));
        renderer.present(&ctx, &session);

        let layer_id = egui::LayerId::background();
        let rect = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(20.0, 20.0));
        let painter = Painter::new(ctx.clone(), layer_id, rect);
        renderer.paint(&painter, rect, &session, 0.0);
    }
}
