//! MIME type and file extension mapping for cached images.

/// MIME type used when an extension is unknown.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Extension used when a MIME type is unknown.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Canonical extension per MIME type. Order matters only for readability.
const MIME_TO_EXTENSION: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/gif", ".gif"),
    ("image/svg+xml", ".svg"),
    ("image/bmp", ".bmp"),
    ("image/webp", ".webp"),
    ("image/x-icon", ".ico"),
    ("image/tiff", ".tiff"),
];

const EXTENSION_TO_MIME: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".bmp", "image/bmp"),
    (".webp", "image/webp"),
    (".ico", "image/x-icon"),
    (".tiff", "image/tiff"),
    (".tif", "image/tiff"),
];

/// Returns the canonical extension (with leading dot) for a MIME type.
///
/// Input is trimmed, lowercased and stripped of parameters, so
/// `"Image/SVG+XML; charset=utf-8"` maps to `".svg"`. Unknown or empty
/// types map to [`FALLBACK_EXTENSION`].
#[must_use]
pub fn mime_to_extension(mime_type: &str) -> &'static str {
    let normalized = normalize_mime(mime_type).to_ascii_lowercase();
    if normalized.is_empty() {
        return FALLBACK_EXTENSION;
    }
    MIME_TO_EXTENSION
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map_or(FALLBACK_EXTENSION, |(_, ext)| *ext)
}

/// Returns the MIME type for a path or extension.
///
/// Accepts `"/a/b/image.PNG"`, `".png"` or `"png"`. Lookup is
/// case-insensitive; unknown extensions map to [`FALLBACK_MIME_TYPE`].
#[must_use]
pub fn extension_to_mime(path_or_ext: &str) -> &'static str {
    let Some(ext) = normalize_extension(path_or_ext) else {
        return FALLBACK_MIME_TYPE;
    };
    EXTENSION_TO_MIME
        .iter()
        .find(|(known, _)| *known == ext)
        .map_or(FALLBACK_MIME_TYPE, |(_, mime)| *mime)
}

/// Strips parameters from a `Content-Type` value.
///
/// `"image/svg+xml; charset=utf-8"` becomes `"image/svg+xml"`. Case is kept.
#[must_use]
pub fn normalize_mime(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

/// Lowercase extension with a leading dot, taken from the last path component.
fn normalize_extension(path_or_ext: &str) -> Option<String> {
    let s = path_or_ext.trim();
    let name = s.rsplit(['/', '\\']).next().unwrap_or(s);
    if name.is_empty() {
        return None;
    }
    let ext = match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[i..],
        Some(_) => return None,
        None => return Some(format!(".{}", name.to_ascii_lowercase())),
    };
    Some(ext.to_ascii_lowercase())
}
