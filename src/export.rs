use std::path::{Path, PathBuf};

use crate::error::EditResult;
use crate::session::EditorSession;

/// File name for a download. Blank or missing input falls back to the
/// session's default stem; `.png` is appended unless already present.
pub fn export_file_name(input: Option<&str>, default_stem: &str) -> String {
    let stem = input.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default_stem);
    if stem.to_ascii_lowercase().ends_with(".png") {
        stem.to_owned()
    } else {
        format!("{}.png", stem)
    }
}

/// Encode the session's surface and write it to `path`
pub fn save_png(session: &EditorSession, path: &Path) -> EditResult<PathBuf> {
    let bytes = session.export_png()?;
    std::fs::write(path, &bytes)?;
    log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path.to_path_buf())
}
