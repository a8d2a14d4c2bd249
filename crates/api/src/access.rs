//! Access annotation for content listings.
//!
//! Handlers resolve who is asking into a [`Viewer`], then map content rows
//! into [`VideoView`] / [`MaterialView`] DTOs. The DTOs never carry the blob
//! key, and a signed download URL is requested from the blob store only
//! after the access policy has granted the item -- locked rows short-circuit
//! before any signing call is made.

use coursebase_blob::BlobStore;
use coursebase_core::access::{
    resolve_material_access, resolve_video_access, AccessDecision, AccessReason,
};
use coursebase_core::error::CoreError;
use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use coursebase_db::models::course::Course;
use coursebase_db::models::material::Material;
use coursebase_db::models::video::Video;
use coursebase_db::repositories::{CourseVersionRepo, EnrollmentRepo};
use futures::future::try_join_all;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

// ---------------------------------------------------------------------------
// Viewer resolution
// ---------------------------------------------------------------------------

/// The caller of a content endpoint, resolved to the inputs the access
/// policy needs plus the course version their listing is served from.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub is_admin: bool,
    /// Whether the caller holds an enrollment for the course.
    pub purchased: bool,
    /// Version the caller's listing resolves to: an enrolled student's
    /// pinned version, an admin's requested version, or the course's
    /// current version for everyone else.
    pub version: VersionNumber,
}

impl Viewer {
    /// Resolve the caller against a course.
    ///
    /// - Admins may request any existing version via `requested`; an unknown
    ///   number is a 404.
    /// - Enrolled students are always served their pinned version;
    ///   `requested` is ignored for them.
    /// - Anonymous callers and never-enrolled students get the current
    ///   version (free-preview browsing).
    ///
    /// Archived courses stay visible to admins and already-enrolled
    /// students; everyone else sees a 404.
    pub async fn resolve(
        pool: &PgPool,
        user: Option<&AuthUser>,
        course: &Course,
        requested: Option<VersionNumber>,
    ) -> AppResult<Viewer> {
        if let Some(user) = user {
            if user.is_admin() {
                let version = match requested {
                    Some(number) => {
                        CourseVersionRepo::find_by_number(pool, course.id, number)
                            .await?
                            .ok_or(AppError::Core(CoreError::VersionNotFound {
                                course_id: course.id,
                                version: number,
                            }))?;
                        number
                    }
                    None => course.current_version,
                };
                return Ok(Viewer {
                    is_admin: true,
                    purchased: false,
                    version,
                });
            }

            let enrollment =
                EnrollmentRepo::find_by_user_and_course(pool, user.user_id, course.id).await?;
            if let Some(enrollment) = enrollment {
                return Ok(Viewer {
                    is_admin: false,
                    purchased: true,
                    version: enrollment.course_version,
                });
            }
        }

        // Anonymous or never-enrolled: preview browsing of the current
        // version, and archived courses are not browsable at all.
        if course.archived_at.is_some() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Course",
                id: course.id,
            }));
        }

        Ok(Viewer {
            is_admin: false,
            purchased: false,
            version: course.current_version,
        })
    }
}

// ---------------------------------------------------------------------------
// Annotated content DTOs
// ---------------------------------------------------------------------------

/// A video as served to API clients: metadata plus the access decision.
///
/// Deliberately omits `blob_key`. `download_url` is `Some` exactly when
/// `has_access` is true.
#[derive(Debug, Serialize)]
pub struct VideoView {
    pub id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub original_filename: String,
    pub duration_secs: Option<f64>,
    pub is_free_preview: bool,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub has_access: bool,
    pub access_reason: AccessReason,
    pub download_url: Option<String>,
}

/// A material as served to API clients. Same contract as [`VideoView`]:
/// no blob key, URL only on granted access.
#[derive(Debug, Serialize)]
pub struct MaterialView {
    pub id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub has_access: bool,
    pub access_reason: AccessReason,
    pub download_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// Annotate one video for a viewer, signing a download URL only on grant.
pub async fn annotate_video(
    blob: &dyn BlobStore,
    ttl: Duration,
    video: Video,
    viewer: &Viewer,
) -> AppResult<VideoView> {
    let decision = resolve_video_access(viewer.is_admin, viewer.purchased, video.is_free_preview);
    let download_url = sign_if_granted(blob, ttl, &video.blob_key, decision).await?;

    Ok(VideoView {
        id: video.id,
        course_id: video.course_id,
        course_version: video.course_version,
        title_primary: video.title_primary,
        title_secondary: video.title_secondary,
        description_primary: video.description_primary,
        description_secondary: video.description_secondary,
        original_filename: video.original_filename,
        duration_secs: video.duration_secs,
        is_free_preview: video.is_free_preview,
        position: video.position,
        created_at: video.created_at,
        updated_at: video.updated_at,
        has_access: decision.has_access,
        access_reason: decision.reason,
        download_url,
    })
}

/// Annotate one material for a viewer.
pub async fn annotate_material(
    blob: &dyn BlobStore,
    ttl: Duration,
    material: Material,
    viewer: &Viewer,
) -> AppResult<MaterialView> {
    let decision = resolve_material_access(viewer.is_admin, viewer.purchased);
    let download_url = sign_if_granted(blob, ttl, &material.blob_key, decision).await?;

    Ok(MaterialView {
        id: material.id,
        course_id: material.course_id,
        course_version: material.course_version,
        title_primary: material.title_primary,
        title_secondary: material.title_secondary,
        original_filename: material.original_filename,
        mime_type: material.mime_type,
        file_size_bytes: material.file_size_bytes,
        position: material.position,
        created_at: material.created_at,
        updated_at: material.updated_at,
        has_access: decision.has_access,
        access_reason: decision.reason,
        download_url,
    })
}

/// Annotate a whole listing; signing for granted items runs concurrently.
pub async fn annotate_videos(
    blob: &dyn BlobStore,
    ttl: Duration,
    videos: Vec<Video>,
    viewer: &Viewer,
) -> AppResult<Vec<VideoView>> {
    try_join_all(
        videos
            .into_iter()
            .map(|video| annotate_video(blob, ttl, video, viewer)),
    )
    .await
}

/// Annotate a material listing; signing for granted items runs concurrently.
pub async fn annotate_materials(
    blob: &dyn BlobStore,
    ttl: Duration,
    materials: Vec<Material>,
    viewer: &Viewer,
) -> AppResult<Vec<MaterialView>> {
    try_join_all(
        materials
            .into_iter()
            .map(|material| annotate_material(blob, ttl, material, viewer)),
    )
    .await
}

async fn sign_if_granted(
    blob: &dyn BlobStore,
    ttl: Duration,
    key: &str,
    decision: AccessDecision,
) -> AppResult<Option<String>> {
    if !decision.has_access {
        return Ok(None);
    }
    let url = blob.sign_get(key, ttl, None).await?;
    Ok(Some(url))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coursebase_blob::MemoryBlobStore;

    fn video(id: DbId, blob_key: &str, is_free_preview: bool) -> Video {
        let now = Utc::now();
        Video {
            id,
            course_id: 1,
            course_version: 1,
            title_primary: format!("Video {id}"),
            title_secondary: None,
            description_primary: None,
            description_secondary: None,
            blob_key: blob_key.to_string(),
            original_filename: "lesson.mp4".to_string(),
            duration_secs: Some(120.0),
            is_free_preview,
            position: 0,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn material(id: DbId, blob_key: &str) -> Material {
        let now = Utc::now();
        Material {
            id,
            course_id: 1,
            course_version: 1,
            title_primary: format!("Material {id}"),
            title_secondary: None,
            blob_key: blob_key.to_string(),
            original_filename: "slides.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            file_size_bytes: 1024,
            position: 0,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    const TTL: Duration = Duration::from_secs(600);

    fn anonymous() -> Viewer {
        Viewer {
            is_admin: false,
            purchased: false,
            version: 1,
        }
    }

    fn enrolled() -> Viewer {
        Viewer {
            is_admin: false,
            purchased: true,
            version: 1,
        }
    }

    #[tokio::test]
    async fn locked_video_gets_no_url_and_no_signing_happens() {
        // The store is empty, so any signing attempt would error NotFound.
        // A locked row must not reach the store at all.
        let store = MemoryBlobStore::new();

        let view = annotate_video(&store, TTL, video(1, "courses/c/v1/videos/1_a.mp4", false), &anonymous())
            .await
            .unwrap();

        assert!(!view.has_access);
        assert_eq!(view.access_reason, AccessReason::RequiresPurchase);
        assert_eq!(view.download_url, None);
    }

    #[tokio::test]
    async fn preview_video_is_signed_for_anonymous_viewer() {
        let store = MemoryBlobStore::new();
        store
            .put("courses/c/v1/videos/1_a.mp4", b"x".to_vec(), "video/mp4")
            .await
            .unwrap();

        let view = annotate_video(&store, TTL, video(1, "courses/c/v1/videos/1_a.mp4", true), &anonymous())
            .await
            .unwrap();

        assert!(view.has_access);
        assert_eq!(view.access_reason, AccessReason::FreePreview);
        assert!(view.download_url.is_some());
    }

    #[tokio::test]
    async fn purchased_viewer_gets_urls_for_everything() {
        let store = MemoryBlobStore::new();
        store.put("k1", b"x".to_vec(), "video/mp4").await.unwrap();
        store.put("k2", b"x".to_vec(), "video/mp4").await.unwrap();

        let views = annotate_videos(
            &store,
            TTL,
            vec![video(1, "k1", false), video(2, "k2", true)],
            &enrolled(),
        )
        .await
        .unwrap();

        assert!(views.iter().all(|v| v.has_access));
        assert!(views.iter().all(|v| v.download_url.is_some()));
        assert_eq!(views[0].access_reason, AccessReason::Purchased);
        // Purchase wins over preview as the reported reason.
        assert_eq!(views[1].access_reason, AccessReason::Purchased);
    }

    #[tokio::test]
    async fn mixed_listing_signs_only_unlocked_items() {
        let store = MemoryBlobStore::new();
        // Only the preview's object exists; the locked row's absence from the
        // store must not matter because it is never signed.
        store.put("preview", b"x".to_vec(), "video/mp4").await.unwrap();

        let views = annotate_videos(
            &store,
            TTL,
            vec![video(1, "locked", false), video(2, "preview", true)],
            &anonymous(),
        )
        .await
        .unwrap();

        assert_eq!(views[0].download_url, None);
        assert!(views[1].download_url.is_some());
    }

    #[tokio::test]
    async fn serialized_view_never_contains_the_blob_key() {
        let store = MemoryBlobStore::new();
        store
            .put("secret/key/path.mp4", b"x".to_vec(), "video/mp4")
            .await
            .unwrap();

        let locked = annotate_video(&store, TTL, video(1, "secret/key/path.mp4", false), &anonymous())
            .await
            .unwrap();
        let granted = annotate_video(&store, TTL, video(2, "secret/key/path.mp4", false), &enrolled())
            .await
            .unwrap();

        let locked_json = serde_json::to_string(&locked).unwrap();
        assert!(!locked_json.contains("secret/key"));
        assert!(!locked_json.contains("blob_key"));

        // The granted view exposes a signed URL, not the raw key field.
        let granted_json = serde_json::to_string(&granted).unwrap();
        assert!(!granted_json.contains("blob_key"));
        assert!(granted_json.contains("download_url"));
    }

    #[tokio::test]
    async fn materials_are_locked_for_anonymous_viewers() {
        let store = MemoryBlobStore::new();

        let view = annotate_material(&store, TTL, material(1, "m1"), &anonymous())
            .await
            .unwrap();
        assert!(!view.has_access);
        assert_eq!(view.download_url, None);
    }

    #[tokio::test]
    async fn admin_viewer_is_granted_with_admin_reason() {
        let store = MemoryBlobStore::new();
        store.put("k", b"x".to_vec(), "application/pdf").await.unwrap();

        let admin = Viewer {
            is_admin: true,
            purchased: false,
            version: 1,
        };
        let view = annotate_material(&store, TTL, material(1, "k"), &admin)
            .await
            .unwrap();

        assert!(view.has_access);
        assert_eq!(view.access_reason, AccessReason::Admin);
        assert!(view.download_url.is_some());
    }
}
