//! Download file names for processed images.

/// The file name without its last extension.
///
/// Only a trailing `.ext` with no further dots or slashes is stripped, so
/// `archive.tar.gz` becomes `archive.tar` and `name.` is left alone.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot)
            if dot + 1 < name.len() && !name[dot + 1..].contains('/') =>
        {
            &name[..dot]
        }
        _ => name,
    }
}

/// The extension to write for a content type: its MIME subtype.
///
/// `image/jpeg` gives `jpeg`, `image/svg+xml` gives `svg+xml`. A type with
/// no subtype falls back to `bin`.
pub fn extension_for_mime(mime_type: &str) -> &str {
    match mime_type.split('/').nth(1) {
        Some(subtype) if !subtype.is_empty() => subtype,
        _ => "bin",
    }
}

/// `<stem>_resized.<ext>`, used by size-targeted downloads.
pub fn resized_file_name(name: &str, mime_type: &str) -> String {
    format!("{}_resized.{}", file_stem(name), extension_for_mime(mime_type))
}

/// `<stem>_resized_<timestamp>.<ext>`, used by fixed-quality downloads.
pub fn timestamped_file_name(name: &str, mime_type: &str, timestamp_ms: u64) -> String {
    format!(
        "{}_resized_{}.{}",
        file_stem(name),
        timestamp_ms,
        extension_for_mime(mime_type)
    )
}
