//! Blob key naming convention engine.
//!
//! Generates deterministic object-store keys for course content. Versioned
//! content lives under a `v{N}` segment so every course version maps to a
//! distinct key prefix; thumbnails are deliberately non-versioned because a
//! thumbnail is cosmetic and shared across all versions.

use crate::types::VersionNumber;

/// Subdirectory for video blobs within a version prefix.
const VIDEOS_SEGMENT: &str = "videos";

/// Subdirectory for material blobs within a version prefix.
const MATERIALS_SEGMENT: &str = "materials";

/// Build the key for a versioned video upload.
///
/// Convention: `courses/{slug}/v{version}/videos/{timestamp}_{filename}`
///
/// ```
/// use coursebase_core::blobkey::video_key;
///
/// assert_eq!(
///     video_key("sourdough-basics", 3, 1700000000, "lesson one.mp4"),
///     "courses/sourdough-basics/v3/videos/1700000000_lesson_one.mp4"
/// );
/// ```
pub fn video_key(slug: &str, version: VersionNumber, timestamp: i64, filename: &str) -> String {
    versioned_key(slug, version, VIDEOS_SEGMENT, timestamp, filename)
}

/// Build the key for a versioned material upload.
///
/// Convention: `courses/{slug}/v{version}/materials/{timestamp}_{filename}`
pub fn material_key(slug: &str, version: VersionNumber, timestamp: i64, filename: &str) -> String {
    versioned_key(slug, version, MATERIALS_SEGMENT, timestamp, filename)
}

/// Build the key for a course thumbnail.
///
/// Thumbnails are the one content type exempt from versioning:
/// `courses/{slug}/thumbnails/{timestamp}_{filename}`
pub fn thumbnail_key(slug: &str, timestamp: i64, filename: &str) -> String {
    format!(
        "courses/{slug}/thumbnails/{timestamp}_{}",
        sanitize_filename(filename)
    )
}

fn versioned_key(
    slug: &str,
    version: VersionNumber,
    segment: &str,
    timestamp: i64,
    filename: &str,
) -> String {
    format!(
        "courses/{slug}/v{version}/{segment}/{timestamp}_{}",
        sanitize_filename(filename)
    )
}

/// Sanitize an uploaded filename for use as a key segment.
///
/// Keeps ASCII alphanumerics, `.`, `_`, and `-`; every other character
/// (spaces, path separators, non-ASCII) becomes `_`. An empty or dot-only
/// result falls back to `"file"` so a key segment always exists.
pub fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.' || c == '_') {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Derive a course slug from its primary-language title.
///
/// Lowercases, maps runs of non-alphanumeric characters to single dashes,
/// and trims leading/trailing dashes. Falls back to `"course"` for titles
/// with no usable characters.
///
/// ```
/// use coursebase_core::blobkey::slugify;
///
/// assert_eq!(slugify("Sourdough Basics: Week 1"), "sourdough-basics-week-1");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // suppress a leading dash

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "course".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- key shapes ----------------------------------------------------------

    #[test]
    fn video_key_shape() {
        assert_eq!(
            video_key("rust-101", 1, 1700000000, "intro.mp4"),
            "courses/rust-101/v1/videos/1700000000_intro.mp4"
        );
    }

    #[test]
    fn material_key_shape() {
        assert_eq!(
            material_key("rust-101", 4, 1700000001, "slides.pdf"),
            "courses/rust-101/v4/materials/1700000001_slides.pdf"
        );
    }

    #[test]
    fn thumbnail_key_has_no_version_segment() {
        let key = thumbnail_key("rust-101", 1700000002, "cover.png");
        assert_eq!(key, "courses/rust-101/thumbnails/1700000002_cover.png");
        assert!(!key.contains("/v1/"));
    }

    #[test]
    fn distinct_versions_get_distinct_prefixes() {
        let v1 = video_key("rust-101", 1, 5, "a.mp4");
        let v2 = video_key("rust-101", 2, 5, "a.mp4");
        assert_ne!(v1, v2);
    }

    // -- sanitize_filename ---------------------------------------------------

    #[test]
    fn sanitize_replaces_spaces() {
        assert_eq!(sanitize_filename("my file.mp4"), "my_file.mp4");
    }

    #[test]
    fn sanitize_neutralizes_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "______etc_passwd");
        assert!(!sanitize_filename("a/b\\c.pdf").contains('/'));
    }

    #[test]
    fn sanitize_replaces_non_ascii() {
        assert_eq!(sanitize_filename("видео.mp4"), "_____.mp4");
    }

    #[test]
    fn sanitize_falls_back_for_empty_input() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn sanitize_keeps_clean_names_unchanged() {
        assert_eq!(sanitize_filename("lesson-01_final.mp4"), "lesson-01_final.mp4");
    }

    // -- slugify -------------------------------------------------------------

    #[test]
    fn slugify_basic_title() {
        assert_eq!(slugify("Sourdough Basics"), "sourdough-basics");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("C++ -- The Hard Parts!"), "c-the-hard-parts");
    }

    #[test]
    fn slugify_trims_edge_dashes() {
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn slugify_falls_back_for_unusable_titles() {
        assert_eq!(slugify("???"), "course");
        assert_eq!(slugify(""), "course");
    }
}
