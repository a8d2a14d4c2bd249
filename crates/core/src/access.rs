//! Per-item access resolution for course content.
//!
//! The rule is small and worth keeping in one place: administrators see
//! everything; students see what they purchased plus free-preview videos.
//! Everything downstream (signed URLs, DRM session issuance) keys off the
//! decision made here, and a locked decision must be reached *before* any
//! signed URL is requested from the blob store.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why an access decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    /// Caller is an administrator.
    Admin,
    /// Caller has purchased the course.
    Purchased,
    /// The video is flagged as a free preview.
    FreePreview,
    /// Locked: the caller must purchase the course.
    RequiresPurchase,
}

/// The outcome of resolving access for one `(user, course, item)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub has_access: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn granted(reason: AccessReason) -> Self {
        Self {
            has_access: true,
            reason,
        }
    }

    fn locked() -> Self {
        Self {
            has_access: false,
            reason: AccessReason::RequiresPurchase,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve access to a single video.
///
/// `purchased` is the external purchase check (`userHasPurchased`), realized
/// as an enrollment row in this system. A free-preview video is unlocked for
/// every caller regardless of purchase state, and stays that way.
pub fn resolve_video_access(
    is_admin: bool,
    purchased: bool,
    is_free_preview: bool,
) -> AccessDecision {
    if is_admin {
        return AccessDecision::granted(AccessReason::Admin);
    }
    if purchased {
        return AccessDecision::granted(AccessReason::Purchased);
    }
    if is_free_preview {
        return AccessDecision::granted(AccessReason::FreePreview);
    }
    AccessDecision::locked()
}

/// Resolve access to a supplementary material.
///
/// Materials have no free-preview flag; they are purchase-gated only.
pub fn resolve_material_access(is_admin: bool, purchased: bool) -> AccessDecision {
    resolve_video_access(is_admin, purchased, false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_always_has_access() {
        for purchased in [false, true] {
            for preview in [false, true] {
                let d = resolve_video_access(true, purchased, preview);
                assert!(d.has_access);
                assert_eq!(d.reason, AccessReason::Admin);
            }
        }
    }

    #[test]
    fn purchase_unlocks_non_preview_video() {
        let d = resolve_video_access(false, true, false);
        assert!(d.has_access);
        assert_eq!(d.reason, AccessReason::Purchased);
    }

    #[test]
    fn free_preview_is_unlocked_for_everyone() {
        // Purchased or not, a preview video resolves to a grant.
        for purchased in [false, true] {
            let d = resolve_video_access(false, purchased, true);
            assert!(d.has_access, "purchased={purchased}");
        }
    }

    #[test]
    fn purchase_reason_wins_over_preview_reason() {
        let d = resolve_video_access(false, true, true);
        assert_eq!(d.reason, AccessReason::Purchased);
    }

    #[test]
    fn unpurchased_non_preview_is_locked() {
        let d = resolve_video_access(false, false, false);
        assert!(!d.has_access);
        assert_eq!(d.reason, AccessReason::RequiresPurchase);
    }

    #[test]
    fn unlock_is_monotonic_across_purchase() {
        // Locked -> purchase completes -> unlocked. No combination of inputs
        // takes an unlocked preview back to locked.
        let before = resolve_video_access(false, false, false);
        assert!(!before.has_access);

        let after = resolve_video_access(false, true, false);
        assert!(after.has_access);

        let preview_before = resolve_video_access(false, false, true);
        let preview_after = resolve_video_access(false, true, true);
        assert!(preview_before.has_access);
        assert!(preview_after.has_access);
    }

    #[test]
    fn materials_are_purchase_gated() {
        assert!(resolve_material_access(true, false).has_access);
        assert!(resolve_material_access(false, true).has_access);

        let locked = resolve_material_access(false, false);
        assert!(!locked.has_access);
        assert_eq!(locked.reason, AccessReason::RequiresPurchase);
    }
}
