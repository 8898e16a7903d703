//! MIME Type Detection Utilities
//!
//! Resolves the media type of an input from its bytes (magic numbers via the
//! `infer` crate) or from a file name / URL extension. The explicit table
//! covers the formats the media providers accept, so aliases stay stable;
//! anything else is looked up through `mime_guess`.

/// Fallback for inputs whose type cannot be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Map legacy and vendor aliases onto the names provider format lists use.
///
/// `infer` reports `audio/x-wav` and `audio/x-flac`, browsers send
/// `audio/wave` or `audio/x-m4a`; all of them mean the same container.
pub fn canonical_mime(mime: &str) -> String {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/x-wav" | "audio/wave" | "audio/vnd.wave" | "audio/x-pn-wav" => "audio/wav".to_string(),
        "audio/x-flac" => "audio/flac".to_string(),
        "audio/x-m4a" | "audio/mp4" => "audio/m4a".to_string(),
        "audio/x-mpeg" | "audio/mpeg3" | "audio/x-mpeg-3" => "audio/mpeg".to_string(),
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => essence,
    }
}

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| canonical_mime(k.mime_type()))
}

/// Guess MIME by file path or URL (extension-based)
pub fn guess_mime_from_path_or_url(path_or_url: &str) -> Option<String> {
    let without_query = path_or_url.split(['?', '#']).next()?;
    let file_name = without_query.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    let mime = match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/m4a",
        "flac" => "audio/flac",
        "aac" => "audio/aac",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Documents
        "json" => "application/json",
        "txt" => "text/plain",

        other => {
            return mime_guess::from_ext(other)
                .first()
                .map(|m| canonical_mime(m.essence_str()));
        }
    };

    Some(mime.to_string())
}

/// Combined guess: prefer bytes, fall back to extension, otherwise octet-stream
pub fn guess_mime(bytes: Option<&[u8]>, path_or_url: Option<&str>) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(p) = path_or_url
        && let Some(m) = guess_mime_from_path_or_url(p)
    {
        return m;
    }
    OCTET_STREAM.to_string()
}
