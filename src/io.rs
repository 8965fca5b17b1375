//! Image file decode/encode and the native save dialog.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use rfd::FileDialog;

use crate::canvas::PixelBuffer;
use crate::session::EditorSession;
use crate::{log_info, log_warn};

/// Extensions offered by the save dialog. Decoding accepts anything the
/// image crate recognizes.
const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "tga", "jpg", "jpeg", "webp", "tiff", "ico"];

/// Decode an image file into an owned RGBA8 pixel buffer.
pub fn load_image(path: &Path) -> Result<PixelBuffer, String> {
    let img = image::open(path)
        .map_err(|e| format!("couldn't decode {}: {}", path.display(), e))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let buffer = PixelBuffer::from_rgba_bytes(w, h, rgba.as_raw())?;
    log_info!("loaded {} ({}x{})", path.display(), w, h);
    Ok(buffer)
}

/// Encode a pixel buffer to disk. The format follows the file extension;
/// the alpha channel is preserved by alpha-capable formats.
pub fn save_image(path: &Path, buffer: &PixelBuffer) -> Result<(), String> {
    let img = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
        .ok_or_else(|| "pixel buffer does not match its dimensions".to_string())?;
    img.save(path)
        .map_err(|e| format!("couldn't write {}: {}", path.display(), e))
}

/// Native save dialog. `None` when the user cancels.
pub fn pick_save_path() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .set_file_name("untitled.png")
        .save_file()
}

/// Save a session's buffer to its associated file, asking for a path first
/// when it has none. A cancelled dialog abandons the save (`Ok(false)`); an
/// encode failure leaves the session and its path untouched so the user can
/// retry.
pub fn save_session(session: &mut EditorSession) -> Result<bool, String> {
    let path = match session.path.clone() {
        Some(p) => p,
        None => match pick_save_path() {
            Some(p) => p,
            None => {
                log_warn!("save cancelled, no path chosen");
                return Ok(false);
            }
        },
    };
    save_image(&path, session.buffer())?;
    session.path = Some(path.clone());
    session.mark_saved();
    log_info!("saved {}", path.display());
    Ok(true)
}
