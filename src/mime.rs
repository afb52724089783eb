//! File type detection and the supported-type allow list.

use std::path::Path;

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_WEBP: &str = "image/webp";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const OCTET_STREAM: &str = "application/octet-stream";

const RASTER_TYPES: [&str; 4] = [IMAGE_JPEG, IMAGE_PNG, IMAGE_GIF, IMAGE_WEBP];

/// Sniff the MIME type from leading magic bytes.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(IMAGE_JPEG),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(IMAGE_PNG),
        [0x47, 0x49, 0x46, 0x38, ..] => Some(IMAGE_GIF),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(IMAGE_WEBP),
        [0x25, 0x50, 0x44, 0x46, 0x2D, ..] => Some(APPLICATION_PDF),
        _ => None,
    }
}

pub fn from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(IMAGE_JPEG),
        "png" => Some(IMAGE_PNG),
        "gif" => Some(IMAGE_GIF),
        "webp" => Some(IMAGE_WEBP),
        "pdf" => Some(APPLICATION_PDF),
        _ => None,
    }
}

/// Content sniffing first, then the extension, then `application/octet-stream`.
pub fn detect(path: &Path, bytes: &[u8]) -> &'static str {
    if let Some(mime) = sniff(bytes) {
        return mime;
    }
    match from_extension(path) {
        Some(mime) => {
            tracing::warn!(
                "Unrecognized content in {} (first 4 bytes: {:02X?}), trusting extension: {}",
                path.display(),
                &bytes[..bytes.len().min(4)],
                mime
            );
            mime
        }
        None => OCTET_STREAM,
    }
}

pub fn is_raster(mime: &str) -> bool {
    RASTER_TYPES.contains(&mime)
}

pub fn is_document(mime: &str) -> bool {
    mime == APPLICATION_PDF
}

pub fn is_supported(mime: &str) -> bool {
    is_raster(mime) || is_document(mime)
}
