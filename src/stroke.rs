use egui::Pos2;
use image::{GrayImage, Rgba};
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Fill colour of a fresh paint canvas, also what the eraser paints with
pub const PAINT_BACKGROUND: Rgba<u8> = Rgba([0xee, 0xf5, 0xff, 0xff]);

pub const MIN_WIDTH: f32 = 1.0;
pub const MAX_WIDTH: f32 = 50.0;

/// The fixed swatch palette of the paint canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaletteColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    #[default]
    Black,
    Gray,
    White,
}

impl PaletteColor {
    pub const ALL: [Self; 9] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Black,
        Self::Gray,
        Self::White,
    ];

    pub fn rgba(self) -> Rgba<u8> {
        match self {
            Self::Red => Rgba([255, 0, 0, 255]),
            Self::Orange => Rgba([255, 165, 0, 255]),
            Self::Yellow => Rgba([255, 255, 0, 255]),
            Self::Green => Rgba([0, 128, 0, 255]),
            Self::Blue => Rgba([0, 0, 255, 255]),
            Self::Purple => Rgba([128, 0, 128, 255]),
            Self::Black => Rgba([0, 0, 0, 255]),
            Self::Gray => Rgba([128, 128, 128, 255]),
            Self::White => Rgba([255, 255, 255, 255]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Black => "black",
            Self::Gray => "gray",
            Self::White => "white",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushStyle {
    #[default]
    Solid,
    Bold,
    Light,
    Dotted,
}

impl BrushStyle {
    pub const ALL: [Self; 4] = [Self::Solid, Self::Bold, Self::Light, Self::Dotted];

    pub fn width_multiplier(self) -> f32 {
        match self {
            Self::Bold => 3.0,
            _ => 1.0,
        }
    }

    pub fn opacity(self) -> f32 {
        match self {
            Self::Light => 0.3,
            _ => 1.0,
        }
    }

    /// (on, off) lengths in multiples of the stroke width
    pub fn dash_pattern(self) -> Option<[f32; 2]> {
        match self {
            Self::Dotted => Some([1.0, 2.0]),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Bold => "Bold",
            Self::Light => "Light",
            Self::Dotted => "Dotted",
        }
    }
}

/// User-facing brush configuration, persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub color: PaletteColor,
    pub width: f32,
    pub style: BrushStyle,
    pub erasing: bool,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: PaletteColor::Black,
            width: MIN_WIDTH,
            style: BrushStyle::Solid,
            erasing: false,
        }
    }
}

impl BrushSettings {
    /// Picking a swatch always leaves eraser mode
    pub fn pick_color(&mut self, color: PaletteColor) {
        self.color = color;
        self.erasing = false;
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
    }

    pub fn toggle_eraser(&mut self) {
        self.erasing = !self.erasing;
    }

    /// Resolve the concrete pen for the next stroke
    pub fn stroke_style(&self) -> StrokeStyle {
        let width = self.width.clamp(MIN_WIDTH, MAX_WIDTH) * self.style.width_multiplier();
        if self.erasing {
            return StrokeStyle {
                color: PAINT_BACKGROUND,
                width,
                opacity: 1.0,
                dash: None,
            };
        }
        StrokeStyle {
            color: self.color.rgba(),
            width,
            opacity: self.style.opacity(),
            dash: self.style.dash_pattern().map(|[on, off]| [on * width, off * width]),
        }
    }
}

/// Concrete pen parameters with round caps and joins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba<u8>,
    pub width: f32,
    pub opacity: f32,
    /// Absolute (on, off) lengths in pixels
    pub dash: Option<[f32; 2]>,
}

/// A stroke being drawn. Segments are painted as points arrive.
///
/// Each pixel is blended at most once per stroke, so overlapping segment
/// caps keep the stroke at one uniform opacity.
#[derive(Debug, Clone)]
pub struct ActiveStroke {
    style: StrokeStyle,
    points: Vec<Pos2>,
    /// Path length so far, keeps the dash phase continuous across segments
    travelled: f32,
    /// Pixels this stroke has already painted, sized to the surface on first use
    coverage: Option<GrayImage>,
}

impl ActiveStroke {
    pub fn begin(style: StrokeStyle, pos: Pos2) -> Self {
        Self {
            style,
            points: vec![pos],
            travelled: 0.0,
            coverage: None,
        }
    }

    pub fn extend(&mut self, pos: Pos2, surface: &mut Surface) {
        let Some(&last) = self.points.last() else {
            self.points.push(pos);
            return;
        };
        if last == pos {
            return;
        }
        let coverage = coverage_for(&mut self.coverage, surface);
        paint_segment(surface, coverage, last, pos, &self.style, self.travelled);
        self.travelled += last.distance(pos);
        self.points.push(pos);
    }

    /// Completes the stroke. A click without movement leaves a single dot.
    pub fn finish(mut self, surface: &mut Surface) -> usize {
        if let [only] = self.points.as_slice() {
            let coverage = coverage_for(&mut self.coverage, surface);
            paint_segment(surface, coverage, *only, *only, &self.style, 0.0);
        }
        self.points.len()
    }
}

fn coverage_for<'a>(slot: &'a mut Option<GrayImage>, surface: &Surface) -> &'a mut GrayImage {
    let [width, height] = surface.size();
    if slot.as_ref().is_some_and(|mask| mask.dimensions() != (width, height)) {
        *slot = None;
    }
    slot.get_or_insert_with(|| GrayImage::new(width, height))
}

/// Rasterise one capsule-shaped segment from `a` to `b`, skipping pixels
/// already marked in `coverage`
fn paint_segment(
    surface: &mut Surface,
    coverage: &mut GrayImage,
    a: Pos2,
    b: Pos2,
    style: &StrokeStyle,
    dash_offset: f32,
) {
    let radius = (style.width / 2.0).max(0.5);
    let min_x = (a.x.min(b.x) - radius).floor() as i64;
    let max_x = (a.x.max(b.x) + radius).ceil() as i64;
    let min_y = (a.y.min(b.y) - radius).floor() as i64;
    let max_y = (a.y.max(b.y) + radius).ceil() as i64;

    let seg = b - a;
    let len_sq = seg.length_sq();
    let len = len_sq.sqrt();

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = egui::pos2(x as f32 + 0.5, y as f32 + 0.5);
            let t = if len_sq > 0.0 {
                ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + seg * t;
            if p.distance(closest) > radius {
                continue;
            }
            if let Some([on, off]) = style.dash {
                let period = on + off;
                if period > 0.0 && (dash_offset + t * len) % period >= on {
                    continue;
                }
            }
            if x < 0 || y < 0 || x >= coverage.width() as i64 || y >= coverage.height() as i64 {
                continue;
            }
            let mark = coverage.get_pixel_mut(x as u32, y as u32);
            if mark[0] != 0 {
                continue;
            }
            mark[0] = u8::MAX;
            surface.blend_pixel(x, y, style.color, style.opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Surface {
        Surface::new(40, 20, PAINT_BACKGROUND)
    }

    #[test]
    fn test_style_table() {
        let mut brush = BrushSettings::default();
        brush.set_width(4.0);

        brush.style = BrushStyle::Bold;
        assert_eq!(brush.stroke_style().width, 12.0);

        brush.style = BrushStyle::Light;
        let light = brush.stroke_style();
        assert_eq!(light.width, 4.0);
        assert_eq!(light.opacity, 0.3);

        brush.style = BrushStyle::Dotted;
        assert_eq!(brush.stroke_style().dash, Some([4.0, 8.0]));
    }

    #[test]
    fn test_eraser_paints_background() {
        let mut brush = BrushSettings::default();
        brush.pick_color(PaletteColor::Red);
        brush.style = BrushStyle::Light;
        brush.toggle_eraser();

        let style = brush.stroke_style();
        assert_eq!(style.color, PAINT_BACKGROUND);
        assert_eq!(style.opacity, 1.0);

        brush.pick_color(PaletteColor::Blue);
        assert!(!brush.erasing);
    }

    #[test]
    fn test_width_is_clamped() {
        let mut brush = BrushSettings::default();
        brush.set_width(500.0);
        assert_eq!(brush.width, MAX_WIDTH);
        brush.set_width(0.0);
        assert_eq!(brush.width, MIN_WIDTH);
    }

    #[test]
    fn test_segment_covers_path() {
        let mut surface = canvas();
        let brush = BrushSettings { width: 3.0, ..Default::default() };
        let mut stroke = ActiveStroke::begin(brush.stroke_style(), egui::pos2(5.0, 10.0));
        stroke.extend(egui::pos2(30.0, 10.0), &mut surface);
        assert_eq!(stroke.finish(&mut surface), 2);

        let black = Some(Rgba([0, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 10), black);
        assert_eq!(surface.pixel(20, 10), black);
        assert_eq!(surface.pixel(20, 2), Some(PAINT_BACKGROUND));
    }

    #[test]
    fn test_light_stroke_has_even_opacity() {
        let mut surface = canvas();
        let brush = BrushSettings {
            width: 6.0,
            style: BrushStyle::Light,
            ..Default::default()
        };
        let mut stroke = ActiveStroke::begin(brush.stroke_style(), egui::pos2(5.5, 10.5));
        for x in [15.5, 25.5, 35.5] {
            stroke.extend(egui::pos2(x, 10.5), &mut surface);
        }
        stroke.finish(&mut surface);

        // Joints between segments match the middle of a segment
        let mid = surface.pixel(10, 10).unwrap();
        assert_ne!(mid, PAINT_BACKGROUND);
        assert_eq!(surface.pixel(15, 10), Some(mid));
        assert_eq!(surface.pixel(25, 10), Some(mid));
        assert_eq!(surface.pixel(25, 12), Some(mid));
    }

    #[test]
    fn test_new_stroke_blends_over_old_one() {
        let brush = BrushSettings {
            width: 4.0,
            style: BrushStyle::Light,
            ..Default::default()
        };
        let draw = |surface: &mut Surface| {
            let mut stroke = ActiveStroke::begin(brush.stroke_style(), egui::pos2(5.0, 10.0));
            stroke.extend(egui::pos2(30.0, 10.0), surface);
            stroke.finish(surface);
        };

        let mut once = canvas();
        draw(&mut once);
        let mut twice = canvas();
        draw(&mut twice);
        draw(&mut twice);

        // Coverage is per stroke, separate strokes still build up
        assert_ne!(once.pixel(20, 10), Some(PAINT_BACKGROUND));
        assert_ne!(twice.pixel(20, 10), once.pixel(20, 10));
    }

    #[test]
    fn test_dotted_leaves_gaps() {
        let mut surface = canvas();
        let brush = BrushSettings {
            width: 2.0,
            style: BrushStyle::Dotted,
            ..Default::default()
        };
        let mut stroke = ActiveStroke::begin(brush.stroke_style(), egui::pos2(2.0, 10.0));
        stroke.extend(egui::pos2(38.0, 10.0), &mut surface);
        stroke.finish(&mut surface);

        let row: Vec<_> = (4..36).map(|x| surface.pixel(x, 10).unwrap()).collect();
        assert!(row.contains(&Rgba([0, 0, 0, 255])));
        assert!(row.contains(&PAINT_BACKGROUND));
    }

    #[test]
    fn test_click_leaves_dot() {
        let mut surface = canvas();
        let brush = BrushSettings { width: 4.0, ..Default::default() };
        let stroke = ActiveStroke::begin(brush.stroke_style(), egui::pos2(10.0, 10.0));
        stroke.finish(&mut surface);
        assert_eq!(surface.pixel(10, 10), Some(Rgba([0, 0, 0, 255])));
    }
}
