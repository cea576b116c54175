use egui::Pos2;

/// How long the outline stays on screen after the pointer is released
pub const OUTLINE_LINGER_SECS: f64 = 0.5;

/// A normalised, pixel-aligned selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The transient rectangle between pointer-down and the operation that consumes it
#[derive(Debug, Clone)]
pub struct SelectionDrag {
    start: Pos2,
    end: Pos2,
    dragging: bool,
    released_at: Option<f64>,
}

impl SelectionDrag {
    pub fn begin(pos: Pos2) -> Self {
        Self {
            start: pos,
            end: pos,
            dragging: true,
            released_at: None,
        }
    }

    pub fn update(&mut self, pos: Pos2) {
        if self.dragging {
            self.end = pos;
        }
    }

    pub fn finish(&mut self, pos: Pos2, now: f64) {
        if self.dragging {
            self.end = pos;
            self.dragging = false;
            self.released_at = Some(now);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn corners(&self) -> (Pos2, Pos2) {
        (self.start, self.end)
    }

    /// The outline shows while dragging and briefly after release
    pub fn outline_visible(&self, now: f64) -> bool {
        match self.released_at {
            None => self.dragging,
            Some(released) => now - released < OUTLINE_LINGER_SECS,
        }
    }

    /// Normalise to top-left origin with positive extent.
    ///
    /// Returns `None` when either side is under one pixel.
    pub fn normalized(&self) -> Option<SelectionRect> {
        let min_x = self.start.x.min(self.end.x).max(0.0);
        let min_y = self.start.y.min(self.end.y).max(0.0);
        let width = (self.start.x - self.end.x).abs();
        let height = (self.start.y - self.end.y).abs();
        if !(width >= 1.0 && height >= 1.0) {
            return None;
        }
        Some(SelectionRect {
            x: min_x.floor() as u32,
            y: min_y.floor() as u32,
            width: width.floor() as u32,
            height: height.floor() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_any_drag_direction() {
        let mut drag = SelectionDrag::begin(egui::pos2(40.0, 30.0));
        drag.finish(egui::pos2(10.0, 10.0), 0.0);
        assert_eq!(
            drag.normalized(),
            Some(SelectionRect { x: 10, y: 10, width: 30, height: 20 })
        );
    }

    #[test]
    fn test_degenerate_drag_is_rejected() {
        let mut drag = SelectionDrag::begin(egui::pos2(5.0, 5.0));
        assert_eq!(drag.normalized(), None);

        drag.finish(egui::pos2(50.0, 5.5), 0.0);
        assert_eq!(drag.normalized(), None);
    }

    #[test]
    fn test_updates_ignored_after_release() {
        let mut drag = SelectionDrag::begin(egui::pos2(0.0, 0.0));
        drag.update(egui::pos2(4.0, 4.0));
        drag.finish(egui::pos2(8.0, 8.0), 1.0);
        drag.update(egui::pos2(100.0, 100.0));
        assert_eq!(drag.corners().1, egui::pos2(8.0, 8.0));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_outline_lingers_briefly() {
        let mut drag = SelectionDrag::begin(egui::pos2(0.0, 0.0));
        assert!(drag.outline_visible(100.0));
        drag.finish(egui::pos2(8.0, 8.0), 10.0);
        assert!(drag.outline_visible(10.2));
        assert!(!drag.outline_visible(10.6));
    }
}
