#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod decode;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod stroke;
pub mod surface;
pub mod util;

pub use app::EditorApp;
pub use error::{EditError, EditResult};
pub use history::History;
pub use renderer::Renderer;
pub use session::{EditorSession, SessionKind};
pub use snapshot::Snapshot;
pub use stroke::{BrushSettings, BrushStyle, PaletteColor};
pub use surface::Surface;
