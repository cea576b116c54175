use egui::{PointerButton, Pos2, Rect};

mod router;
pub use router::{CanvasTool, route_event};

/// Pointer events on the canvas, in surface pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button went down over the canvas
    PointerDown { position: Pos2 },
    /// Pointer moved while the primary button is held
    PointerMove { position: Pos2 },
    /// Primary button released; ends whatever the press started
    PointerUp { position: Pos2 },
}

/// Turns raw egui pointer state into canvas [`InputEvent`]s.
///
/// A press that starts outside the canvas is ignored until release, and
/// a release anywhere ends a press that started on the canvas.
#[derive(Debug, Default)]
pub struct InputHandler {
    pressed_on_canvas: bool,
    last_position: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame of pointer state. `canvas` is the screen rect the
    /// surface is drawn into, at one screen point per pixel.
    pub fn process(
        &mut self,
        canvas: Rect,
        hover_pos: Option<Pos2>,
        pressed: bool,
        down: bool,
        released: bool,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let local = hover_pos.map(|pos| (pos - canvas.min).to_pos2());

        if pressed {
            if let Some(pos) = hover_pos.filter(|pos| canvas.contains(*pos)) {
                let position = (pos - canvas.min).to_pos2();
                self.pressed_on_canvas = true;
                self.last_position = Some(position);
                events.push(InputEvent::PointerDown { position });
            }
        }

        if self.pressed_on_canvas && down && !pressed {
            if let Some(position) = local.filter(|p| Some(*p) != self.last_position) {
                self.last_position = Some(position);
                events.push(InputEvent::PointerMove { position });
            }
        }

        if self.pressed_on_canvas && released {
            let position = local.or(self.last_position).unwrap_or(Pos2::ZERO);
            self.pressed_on_canvas = false;
            self.last_position = None;
            events.push(InputEvent::PointerUp { position });
        }

        events
    }

    /// Read this frame's primary-button state from the egui context
    pub fn process_input(&mut self, ctx: &egui::Context, canvas: Rect) -> Vec<InputEvent> {
        let (hover, pressed, down, released) = ctx.input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.button_pressed(PointerButton::Primary),
                input.pointer.button_down(PointerButton::Primary),
                input.pointer.button_released(PointerButton::Primary),
            )
        });
        self.process(canvas, hover, pressed, down, released)
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_on_canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(40.0, 30.0))
    }

    #[test]
    fn test_press_drag_release() {
        let mut input = InputHandler::new();
        let down = input.process(canvas(), Some(egui::pos2(110.0, 60.0)), true, true, false);
        assert_eq!(down, vec![InputEvent::PointerDown { position: egui::pos2(10.0, 10.0) }]);

        let moved = input.process(canvas(), Some(egui::pos2(120.0, 65.0)), false, true, false);
        assert_eq!(moved, vec![InputEvent::PointerMove { position: egui::pos2(20.0, 15.0) }]);

        // No movement, no event
        assert!(input.process(canvas(), Some(egui::pos2(120.0, 65.0)), false, true, false).is_empty());

        let up = input.process(canvas(), Some(egui::pos2(300.0, 300.0)), false, false, true);
        assert_eq!(up, vec![InputEvent::PointerUp { position: egui::pos2(200.0, 250.0) }]);
        assert!(!input.is_pressed());
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let mut input = InputHandler::new();
        assert!(input.process(canvas(), Some(egui::pos2(10.0, 10.0)), true, true, false).is_empty());
        assert!(input.process(canvas(), Some(egui::pos2(110.0, 60.0)), false, true, false).is_empty());
        assert!(input.process(canvas(), Some(egui::pos2(110.0, 60.0)), false, false, true).is_empty());
    }

    #[test]
    fn test_release_without_position_uses_last() {
        let mut input = InputHandler::new();
        input.process(canvas(), Some(egui::pos2(105.0, 55.0)), true, true, false);
        let up = input.process(canvas(), None, false, false, true);
        assert_eq!(up, vec![InputEvent::PointerUp { position: egui::pos2(5.0, 5.0) }]);
    }
}
