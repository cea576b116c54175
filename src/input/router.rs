use crate::error::EditResult;
use crate::session::EditorSession;
use crate::stroke::BrushSettings;

use super::InputEvent;

/// What a canvas drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasTool {
    /// Freehand stroke with the current brush
    Brush,
    /// Rectangle selection for cropping
    Select,
}

/// Routes a canvas event to the session operation for `tool`.
///
/// `now` is the UI clock in seconds, used for the selection outline.
pub fn route_event(
    event: &InputEvent,
    tool: CanvasTool,
    session: &mut EditorSession,
    brush: &BrushSettings,
    now: f64,
) -> EditResult {
    match (tool, *event) {
        (CanvasTool::Brush, InputEvent::PointerDown { position }) => {
            session.begin_stroke(position, brush)
        }
        (CanvasTool::Brush, InputEvent::PointerMove { position }) => {
            session.extend_stroke(position);
            Ok(())
        }
        (CanvasTool::Brush, InputEvent::PointerUp { position }) => {
            session.extend_stroke(position);
            session.end_stroke().map(|_| ())
        }
        (CanvasTool::Select, InputEvent::PointerDown { position }) => {
            session.begin_selection(position)
        }
        (CanvasTool::Select, InputEvent::PointerMove { position }) => {
            session.update_selection(position);
            Ok(())
        }
        (CanvasTool::Select, InputEvent::PointerUp { position }) => {
            session.end_selection(position, now);
            Ok(())
        }
    }
}
