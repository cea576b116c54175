use std::path::Path;
use std::sync::Arc;

use egui::Pos2;
use futures::channel::oneshot;
use uuid::Uuid;

use crate::decode::{DecodePurpose, DecodeResult, PendingDecode};
use crate::error::{EditError, EditResult};
use crate::history::{History, StackMove};
use crate::selection::{SelectionDrag, SelectionRect};
use crate::stroke::{ActiveStroke, BrushSettings, PAINT_BACKGROUND};
use crate::surface::{self, Surface};

/// Which editor a session backs; picks defaults such as the export name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Paint,
    Photo,
}

impl SessionKind {
    pub fn default_file_stem(self) -> &'static str {
        match self {
            Self::Paint => "drawing",
            Self::Photo => "edited-image",
        }
    }
}

/// One editing session: the surface, its history, and the tool state that
/// touches them.
///
/// Every operation either succeeds or leaves the session untouched. While
/// a decode is in flight only presenting and polling are allowed; anything
/// else fails with [`EditError::Busy`].
pub struct EditorSession {
    id: Uuid,
    kind: SessionKind,
    surface: Option<Surface>,
    history: History,
    pending: Option<PendingDecode>,
    stroke: Option<ActiveStroke>,
    selection: Option<SelectionDrag>,
    /// Bumped on every visible change so the presenter knows when to re-upload
    revision: u64,
    repaint: Option<egui::Context>,
}

impl EditorSession {
    /// A paint canvas filled with the background colour. The blank canvas
    /// is the baseline history entry.
    pub fn paint(width: u32, height: u32) -> EditResult<Self> {
        let mut session = Self::empty(SessionKind::Paint);
        session.surface = Some(Surface::new(width, height, PAINT_BACKGROUND));
        session.save_state(true)?;
        Ok(session)
    }

    /// A photo editor with nothing loaded yet
    pub fn photo() -> Self {
        Self::empty(SessionKind::Photo)
    }

    fn empty(kind: SessionKind) -> Self {
        let id = Uuid::new_v4();
        log::debug!("New {:?} session {}", kind, id);
        Self {
            id,
            kind,
            surface: None,
            history: History::new(),
            pending: None,
            stroke: None,
            selection: None,
            revision: 0,
            repaint: None,
        }
    }

    /// Wake this egui context whenever a background decode lands
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn selection(&self) -> Option<&SelectionDrag> {
        self.selection.as_ref()
    }

    fn ensure_idle(&self) -> EditResult {
        if self.is_busy() {
            return Err(EditError::Busy);
        }
        Ok(())
    }

    fn require_surface(&self) -> EditResult<&Surface> {
        self.surface.as_ref().ok_or(EditError::NoSurface)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Record the current surface. See [`History::save_state`].
    pub fn save_state(&mut self, force: bool) -> EditResult<bool> {
        self.ensure_idle()?;
        let surface = self.surface.as_ref().ok_or(EditError::NoSurface)?;
        self.history.save_state(surface, force)
    }

    // ------------------------------------------------------------------
    // Decoding

    /// Start loading an encoded image. The surface changes when the decode
    /// lands (see [`Self::poll_pending`] and [`Self::settle`]).
    pub fn load_image(&mut self, bytes: Vec<u8>) -> EditResult {
        self.ensure_idle()?;
        if bytes.is_empty() {
            return Err(EditError::NoFileSelected);
        }
        log::info!("Loading image ({} bytes) into session {}", bytes.len(), self.id);
        self.start_decode(DecodePurpose::Load, bytes.into());
        Ok(())
    }

    /// Read `path` and start loading it. `None` means the picker was cancelled.
    pub fn load_file(&mut self, path: Option<&Path>) -> EditResult {
        self.ensure_idle()?;
        let path = path.ok_or(EditError::NoFileSelected)?;
        let bytes = std::fs::read(path)?;
        log::info!("Read {} ({} bytes)", path.display(), bytes.len());
        self.load_image(bytes)
    }

    fn start_decode(&mut self, purpose: DecodePurpose, bytes: Arc<[u8]>) {
        self.stroke = None;
        self.pending = Some(PendingDecode::spawn(purpose, bytes, self.repaint.clone()));
    }

    /// Adopt a finished decode without blocking.
    ///
    /// `None` when nothing was pending or it is still running.
    pub fn poll_pending(&mut self) -> Option<EditResult> {
        let pending = self.pending.as_mut()?;
        let outcome = pending.try_take()?;
        let purpose = pending.purpose();
        self.pending = None;
        Some(self.land(purpose, outcome))
    }

    /// Wait for the in-flight decode, if any, and adopt it
    pub async fn settle(&mut self) -> EditResult {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let purpose = pending.purpose();
        let outcome = pending.finish().await;
        self.land(purpose, outcome)
    }

    fn land(
        &mut self,
        purpose: DecodePurpose,
        outcome: Result<DecodeResult, oneshot::Canceled>,
    ) -> EditResult {
        let decoded = match outcome {
            Ok(Ok(surface)) => surface,
            Ok(Err(err)) => {
                log::error!("Decode for {:?} failed: {}", purpose, err);
                self.abandon(purpose);
                return Err(EditError::Decode(err));
            }
            Err(oneshot::Canceled) => {
                log::error!("Decode for {:?} was abandoned", purpose);
                self.abandon(purpose);
                return Err(EditError::DecodeAbandoned);
            }
        };

        let [width, height] = decoded.size();
        let previous = self.surface.replace(decoded);
        self.selection = None;

        if purpose == DecodePurpose::Load {
            if let Err(err) = self.save_state(true) {
                self.surface = previous;
                return Err(err);
            }
            log::info!("Loaded {}x{} image", width, height);
        } else {
            log::debug!("Restored {}x{} surface", width, height);
        }
        self.touch();
        Ok(())
    }

    fn abandon(&mut self, purpose: DecodePurpose) {
        if let DecodePurpose::Restore(step) = purpose {
            self.history.rollback(step);
        }
    }

    // ------------------------------------------------------------------
    // History

    /// Step back one state. The surface is restored asynchronously.
    pub fn undo(&mut self) -> EditResult {
        self.ensure_idle()?;
        let snapshot = self.history.undo()?;
        log::debug!("Undo to {}", snapshot.short_id());
        self.start_decode(
            DecodePurpose::Restore(StackMove::Undo),
            snapshot.shared_bytes(),
        );
        Ok(())
    }

    /// Replay the last undone state. The surface is restored asynchronously.
    pub fn redo(&mut self) -> EditResult {
        self.ensure_idle()?;
        let snapshot = self.history.redo()?;
        log::debug!("Redo to {}", snapshot.short_id());
        self.start_decode(
            DecodePurpose::Restore(StackMove::Redo),
            snapshot.shared_bytes(),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Freehand strokes

    pub fn begin_stroke(&mut self, pos: Pos2, brush: &BrushSettings) -> EditResult {
        self.ensure_idle()?;
        self.require_surface()?;
        self.stroke = Some(ActiveStroke::begin(brush.stroke_style(), pos));
        Ok(())
    }

    /// Continue the stroke; ignored when no stroke is active
    pub fn extend_stroke(&mut self, pos: Pos2) {
        if let (Some(stroke), Some(surface)) = (self.stroke.as_mut(), self.surface.as_mut()) {
            stroke.extend(pos, surface);
            self.revision += 1;
        }
    }

    /// Finish the stroke and record one snapshot for all of it.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn end_stroke(&mut self) -> EditResult<bool> {
        let Some(stroke) = self.stroke.take() else {
            return Ok(false);
        };
        let surface = self.surface.as_mut().ok_or(EditError::NoSurface)?;
        let points = stroke.finish(surface);
        self.touch();
        log::debug!("Stroke finished with {} points", points);
        self.save_state(false)
    }

    // ------------------------------------------------------------------
    // Selection

    pub fn begin_selection(&mut self, pos: Pos2) -> EditResult {
        self.ensure_idle()?;
        let pos = self.clamp_to_surface(pos)?;
        self.selection = Some(SelectionDrag::begin(pos));
        Ok(())
    }

    pub fn update_selection(&mut self, pos: Pos2) {
        if let Ok(pos) = self.clamp_to_surface(pos) {
            if let Some(drag) = self.selection.as_mut() {
                drag.update(pos);
            }
        }
    }

    /// Release the drag at `pos`; `now` is seconds on the UI clock
    pub fn end_selection(&mut self, pos: Pos2, now: f64) {
        if let Ok(pos) = self.clamp_to_surface(pos) {
            if let Some(drag) = self.selection.as_mut() {
                drag.finish(pos, now);
            }
        }
    }

    fn clamp_to_surface(&self, pos: Pos2) -> EditResult<Pos2> {
        let surface = self.require_surface()?;
        Ok(egui::pos2(
            pos.x.clamp(0.0, surface.width() as f32),
            pos.y.clamp(0.0, surface.height() as f32),
        ))
    }

    // ------------------------------------------------------------------
    // Surface transforms

    /// Snapshot, replace the surface with `transform(surface)`, snapshot
    /// again. On failure the old surface is put back.
    fn apply_transform<F>(&mut self, label: &str, transform: F) -> EditResult
    where
        F: FnOnce(&Surface) -> Surface,
    {
        self.ensure_idle()?;
        self.require_surface()?;
        self.save_state(false)?;

        let Some(current) = self.surface.as_ref() else {
            return Err(EditError::NoSurface);
        };
        let next = transform(current);
        let [width, height] = next.size();
        let previous = self.surface.replace(next);
        self.stroke = None;

        if let Err(err) = self.save_state(false) {
            self.surface = previous;
            return Err(err);
        }
        self.selection = None;
        self.touch();
        log::info!("{} -> {}x{}", label, width, height);
        Ok(())
    }

    /// Crop to the current drag selection
    pub fn crop_to_selection(&mut self) -> EditResult {
        let rect = self.selection.as_ref().and_then(SelectionDrag::normalized);
        self.crop(rect)
    }

    pub fn crop(&mut self, rect: Option<SelectionRect>) -> EditResult {
        self.ensure_idle()?;
        self.require_surface()?;
        let rect = rect
            .filter(|r| r.width >= 1 && r.height >= 1)
            .ok_or(EditError::InvalidSelection)?;
        check_size(rect.width, rect.height)?;
        self.apply_transform("Crop", |surface| surface.cropped(rect))
    }

    /// Scale the whole surface. Returns `false` when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> EditResult<bool> {
        self.ensure_idle()?;
        let surface = self.require_surface()?;
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions(format!("{}x{}", width, height)));
        }
        check_size(width, height)?;
        if surface.size() == [width, height] {
            return Ok(false);
        }
        self.apply_transform("Resize", |surface| surface.resized(width, height))?;
        Ok(true)
    }

    /// [`Self::resize`] with text input from the UI
    pub fn resize_from_text(&mut self, width: &str, height: &str) -> EditResult<bool> {
        self.ensure_idle()?;
        self.require_surface()?;
        let width = parse_dimension(width)?;
        let height = parse_dimension(height)?;
        self.resize(width, height)
    }

    /// Quarter turn clockwise
    pub fn rotate(&mut self) -> EditResult {
        self.apply_transform("Rotate", Surface::rotated_cw)
    }

    // ------------------------------------------------------------------
    // Export

    /// Encode the current surface as PNG. History is not touched.
    pub fn export_png(&self) -> EditResult<Vec<u8>> {
        self.ensure_idle()?;
        self.require_surface()?
            .encode_png()
            .map_err(EditError::Encode)
    }
}

fn check_size(width: u32, height: u32) -> EditResult {
    if !surface::fits_limits(width, height) {
        return Err(EditError::InvalidDimensions(format!(
            "{}x{} exceeds {}px per side or {} pixels",
            width,
            height,
            surface::MAX_DIMENSION,
            surface::MAX_PIXELS
        )));
    }
    Ok(())
}

fn parse_dimension(text: &str) -> EditResult<u32> {
    match text.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(EditError::InvalidDimensions(text.trim().to_owned())),
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("size", &self.surface.as_ref().map(Surface::size))
            .field("history", &self.history.len())
            .field("redo", &self.history.redo_len())
            .field("busy", &self.is_busy())
            .finish()
    }
}
