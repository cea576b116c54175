use std::sync::Arc;

use futures::channel::oneshot;

use crate::history::StackMove;
use crate::surface::Surface;

pub type DecodeResult = Result<Surface, image::ImageError>;

/// What to do with the surface once a decode lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePurpose {
    /// A new document from an external file; recorded as a forced snapshot
    Load,
    /// Re-rendering a snapshot after undo or redo; never recorded
    Restore(StackMove),
}

/// A decode running off the UI path.
///
/// Dropping it abandons the result.
#[derive(Debug)]
pub struct PendingDecode {
    purpose: DecodePurpose,
    receiver: oneshot::Receiver<DecodeResult>,
}

impl PendingDecode {
    /// Start decoding `bytes`. `repaint` is poked when the result is ready so
    /// an idle UI wakes up to adopt it.
    pub fn spawn(purpose: DecodePurpose, bytes: Arc<[u8]>, repaint: Option<egui::Context>) -> Self {
        let (sender, receiver) = oneshot::channel();
        log::debug!("Decoding {} bytes for {:?}", bytes.len(), purpose);
        spawn_decode(bytes, move |result| {
            if sender.send(result).is_err() {
                log::debug!("Decode finished after its session gave up on it");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
        Self { purpose, receiver }
    }

    pub fn purpose(&self) -> DecodePurpose {
        self.purpose
    }

    /// Non-blocking check. `None` while the decode is still running.
    pub fn try_take(&mut self) -> Option<Result<DecodeResult, oneshot::Canceled>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(Ok(result)),
            Ok(None) => None,
            Err(canceled) => Some(Err(canceled)),
        }
    }

    /// Suspend until the decode completes
    pub async fn finish(self) -> Result<DecodeResult, oneshot::Canceled> {
        self.receiver.await
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_decode<F>(bytes: Arc<[u8]>, deliver: F)
where
    F: FnOnce(DecodeResult) + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("surface-decode".to_owned())
        .spawn(move || deliver(Surface::decode(&bytes)));
    if let Err(err) = spawned {
        // The sender went down with the closure, so the receiver reports Canceled
        log::error!("Failed to spawn decode thread: {}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn_decode<F>(bytes: Arc<[u8]>, deliver: F)
where
    F: FnOnce(DecodeResult) + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        deliver(Surface::decode(&bytes));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_decode_delivers_surface() {
        let surface = Surface::new(5, 5, Rgba([3, 4, 5, 255]));
        let bytes: Arc<[u8]> = surface.encode_png().unwrap().into();
        let pending = PendingDecode::spawn(DecodePurpose::Load, bytes, None);
        assert_eq!(pending.purpose(), DecodePurpose::Load);

        let decoded = futures::executor::block_on(pending.finish()).unwrap().unwrap();
        assert_eq!(decoded, surface);
    }

    #[test]
    fn test_bad_bytes_report_error() {
        let bytes: Arc<[u8]> = Arc::from(&b"nope"[..]);
        let pending = PendingDecode::spawn(DecodePurpose::Load, bytes, None);
        let result = futures::executor::block_on(pending.finish()).unwrap();
        assert!(result.is_err());
    }
}
