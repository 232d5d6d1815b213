//! Content type lookup by file extension.

use std::path::Path;

/// Content type for files whose extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension map, one `mimetype ext...` entry per line.
const EXTENSIONS_MAP: &[&str] = &[
    "text/html              html htm",
    "text/css               css",
    "text/plain             txt asc text md",
    "text/csv               csv",
    "text/xml               xml",
    "text/javascript        js mjs",
    "application/json       json map",
    "application/pdf        pdf",
    "application/wasm       wasm",
    "application/zip        zip",
    "application/gzip       gz",
    "application/x-tar      tar",
    "image/png              png",
    "image/jpeg             jpg jpeg",
    "image/gif              gif",
    "image/svg+xml          svg",
    "image/webp             webp",
    "image/x-icon           ico",
    "font/woff              woff",
    "font/woff2             woff2",
    "font/ttf               ttf",
    "audio/mpeg             mp3",
    "audio/ogg              ogg",
    "video/mp4              mp4",
    "video/webm             webm",
];

/// Guess a content type from the extension of `path`, case-insensitively.
pub fn content_type(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME_TYPE;
    };
    let extension = extension.to_ascii_lowercase();

    for line in EXTENSIONS_MAP {
        let mut fields = line.split_ascii_whitespace();
        let Some(mimetype) = fields.next() else {
            continue;
        };
        if fields.any(|ext| ext == extension) {
            return mimetype;
        }
    }
    DEFAULT_MIME_TYPE
}
