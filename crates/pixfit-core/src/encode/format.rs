//! Output formats and their MIME mapping.

/// Encoded output format.
///
/// Only JPEG honours the quality fraction; PNG and WebP are written
/// losslessly, so a size search over them converges on a single size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Map a MIME type to the format the encoder will write.
    ///
    /// Image types the encoder cannot write (GIF, BMP, ...) fall back to PNG,
    /// the same thing a browser canvas does when asked for an unsupported
    /// type. Non-image types return `None`.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        let subtype = mime.strip_prefix("image/")?;
        Some(match subtype {
            "jpeg" | "jpg" | "pjpeg" => OutputFormat::Jpeg,
            "webp" => OutputFormat::WebP,
            _ => OutputFormat::Png,
        })
    }
}

/// True if a declared content type names an image (`image/*`).
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}
