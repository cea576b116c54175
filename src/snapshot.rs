use std::sync::Arc;

use crate::surface::{PixelDigest, Surface};

/// An immutable PNG copy of the whole surface at one point in time.
///
/// Cloning is cheap; the encoded bytes are shared.
#[derive(Clone)]
pub struct Snapshot {
    encoded: Arc<[u8]>,
    digest: PixelDigest,
    size: [u32; 2],
}

impl Snapshot {
    pub fn capture(surface: &Surface) -> Result<Self, image::ImageError> {
        Ok(Self {
            encoded: surface.encode_png()?.into(),
            digest: surface.digest(),
            size: surface.size(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Shared handle to the encoded bytes, for handing to a decode task
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.encoded)
    }

    pub fn digest(&self) -> &PixelDigest {
        &self.digest
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Short hex tag for logs and the history panel
    pub fn short_id(&self) -> String {
        hex::encode(&self.digest[..4])
    }

    /// Whether this snapshot holds exactly what `surface` shows now
    pub fn matches(&self, surface: &Surface) -> bool {
        self.digest == surface.digest()
    }

    pub fn decode(&self) -> Result<Surface, image::ImageError> {
        Surface::decode(&self.encoded)
    }
}

#[cfg(test)]
impl Snapshot {
    /// Wrap arbitrary bytes without encoding, e.g. to exercise decode failures
    pub(crate) fn from_raw(encoded: &[u8], digest: PixelDigest, size: [u32; 2]) -> Self {
        Self {
            encoded: encoded.into(),
            digest,
            size,
        }
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.encoded == other.encoded
    }
}

impl Eq for Snapshot {}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.short_id())
            .field("size", &self.size)
            .field("bytes", &self.encoded.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_capture_and_decode() {
        let surface = Surface::new(12, 8, Rgba([1, 2, 3, 255]));
        let snapshot = Snapshot::capture(&surface).unwrap();
        assert_eq!(snapshot.size(), [12, 8]);
        assert!(snapshot.matches(&surface));
        assert_eq!(snapshot.decode().unwrap(), surface);
    }

    #[test]
    fn test_equality_follows_content() {
        let a = Snapshot::capture(&Surface::new(4, 4, Rgba([0, 0, 0, 255]))).unwrap();
        let b = Snapshot::capture(&Surface::new(4, 4, Rgba([0, 0, 0, 255]))).unwrap();
        let c = Snapshot::capture(&Surface::new(4, 4, Rgba([9, 0, 0, 255]))).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.short_id().len(), 8);
    }
}
