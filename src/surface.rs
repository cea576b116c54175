use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage, imageops};
use sha2::{Digest, Sha256};

use crate::selection::SelectionRect;

/// SHA-256 over the surface dimensions and raw RGBA bytes
pub type PixelDigest = [u8; 32];

/// Largest width or height a transform may produce
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest pixel count a transform may produce (a 256 MiB RGBA buffer)
pub const MAX_PIXELS: u64 = 8_192 * 8_192;

/// Whether a `width`×`height` buffer is within the transform limits
pub fn fits_limits(width: u32, height: u32) -> bool {
    width <= MAX_DIMENSION && height <= MAX_DIMENSION && width as u64 * height as u64 <= MAX_PIXELS
}

/// The editable raster. Every visible change goes through this buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A surface of the given size filled with one colour
    pub fn new(width: u32, height: u32, fill: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), fill),
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode any format the `image` crate understands
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_image(decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.pixels.get_pixel(x, y))
    }

    pub fn digest(&self) -> PixelDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_le_bytes());
        hasher.update(self.height().to_le_bytes());
        hasher.update(self.pixels.as_raw());
        hasher.finalize().into()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Copy out `rect`. The result always has the rect's dimensions;
    /// any part lying outside the surface comes out transparent.
    pub fn cropped(&self, rect: SelectionRect) -> Self {
        let mut out = RgbaImage::new(rect.width, rect.height);
        let view = imageops::crop_imm(&self.pixels, rect.x, rect.y, rect.width, rect.height);
        imageops::replace(&mut out, &view.to_image(), 0, 0);
        Self::from_image(out)
    }

    /// One filtered scale of the whole surface
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self::from_image(imageops::resize(
            &self.pixels,
            width,
            height,
            imageops::FilterType::Triangle,
        ))
    }

    /// Quarter turn clockwise; width and height swap
    pub fn rotated_cw(&self) -> Self {
        Self::from_image(imageops::rotate90(&self.pixels))
    }

    /// Source-over blend of `color` at `opacity` into one pixel.
    /// Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, opacity: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        let src_a = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= f32::EPSILON {
            *dst = Rgba([0, 0, 0, 0]);
            return;
        }
        for c in 0..3 {
            let src = color[c] as f32 * src_a;
            let below = dst[c] as f32 * dst_a * (1.0 - src_a);
            dst[c] = ((src + below) / out_a).round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }
}
