//! Upload validation: content-type allow-lists and size ceilings.
//!
//! The upload transport hands the API a `(mime_type, size, original_name)`
//! tuple plus the raw bytes. Everything here runs before a single byte is
//! written to the blob store; a rejected upload leaves no row and no blob.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted supplementary-material size (100 MB). Video size is
/// enforced upstream by the upload transport.
pub const MAX_MATERIAL_BYTES: i64 = 100 * 1024 * 1024;

/// Supported video container types for lesson uploads.
pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/webm", "video/quicktime"];

/// Supported video file extensions, matching [`VIDEO_MIME_TYPES`].
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// Supported supplementary-material types: documents, archives, and images
/// handed out with lessons.
pub const MATERIAL_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/zip",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "image/png",
    "image/jpeg",
];

/// Accepted thumbnail image types.
pub const THUMBNAIL_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a video upload by declared mime type and filename extension.
pub fn validate_video_upload(mime_type: &str, filename: &str) -> Result<(), CoreError> {
    if !VIDEO_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported video type '{mime_type}'. Must be one of: {VIDEO_MIME_TYPES:?}"
        )));
    }
    let ext = file_extension(filename);
    if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported video extension '.{ext}'. Must be one of: {VIDEO_EXTENSIONS:?}"
        )));
    }
    Ok(())
}

/// Validate a material upload by declared mime type and byte size.
pub fn validate_material_upload(mime_type: &str, size_bytes: i64) -> Result<(), CoreError> {
    if !MATERIAL_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported material type '{mime_type}'. Must be one of: {MATERIAL_MIME_TYPES:?}"
        )));
    }
    if size_bytes <= 0 {
        return Err(CoreError::Validation(
            "Material upload is empty".to_string(),
        ));
    }
    if size_bytes > MAX_MATERIAL_BYTES {
        return Err(CoreError::Validation(format!(
            "Material exceeds the {MAX_MATERIAL_BYTES} byte ceiling, got {size_bytes}"
        )));
    }
    Ok(())
}

/// Validate a thumbnail upload by declared mime type.
pub fn validate_thumbnail_mime(mime_type: &str) -> Result<(), CoreError> {
    if THUMBNAIL_MIME_TYPES.contains(&mime_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported thumbnail type '{mime_type}'. Must be one of: {THUMBNAIL_MIME_TYPES:?}"
        )))
    }
}

/// Lowercased extension of a filename, or `""` when it has none.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- videos --------------------------------------------------------------

    #[test]
    fn accepts_mp4_video() {
        assert!(validate_video_upload("video/mp4", "intro.mp4").is_ok());
    }

    #[test]
    fn rejects_unknown_video_mime() {
        assert_matches!(
            validate_video_upload("video/x-msvideo", "intro.avi"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_mismatched_video_extension() {
        assert!(validate_video_upload("video/mp4", "intro.mkv").is_err());
    }

    #[test]
    fn rejects_video_without_extension() {
        assert!(validate_video_upload("video/mp4", "intro").is_err());
    }

    // -- materials -----------------------------------------------------------

    #[test]
    fn accepts_pdf_material_within_ceiling() {
        assert!(validate_material_upload("application/pdf", 1024).is_ok());
    }

    #[test]
    fn accepts_material_exactly_at_ceiling() {
        assert!(validate_material_upload("application/zip", MAX_MATERIAL_BYTES).is_ok());
    }

    #[test]
    fn rejects_material_over_ceiling() {
        assert_matches!(
            validate_material_upload("application/zip", MAX_MATERIAL_BYTES + 1),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_empty_material() {
        assert!(validate_material_upload("application/pdf", 0).is_err());
    }

    #[test]
    fn rejects_executable_material() {
        assert!(validate_material_upload("application/x-msdownload", 10).is_err());
    }

    // -- thumbnails ----------------------------------------------------------

    #[test]
    fn accepts_png_thumbnail() {
        assert!(validate_thumbnail_mime("image/png").is_ok());
    }

    #[test]
    fn rejects_gif_thumbnail() {
        assert!(validate_thumbnail_mime("image/gif").is_err());
    }

    // -- file_extension ------------------------------------------------------

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Movie.MP4"), "mp4");
    }

    #[test]
    fn hidden_files_have_no_extension() {
        assert_eq!(file_extension(".gitignore"), "");
        assert_eq!(file_extension("archive"), "");
    }
}
