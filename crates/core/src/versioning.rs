//! Copy-on-write branching policy for course content.
//!
//! A course points at a single current version. Content mutations either edit
//! that version's rows in place or fork the whole manifest into a new version,
//! depending on the mutation kind and whether anyone has enrolled. The policy
//! decision and the version arithmetic live here as pure functions; executing
//! a fork (row cloning, pointer flip) is `CourseVersionRepo` territory in
//! `coursebase-db`.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, VersionNumber};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Version number allocated to a newly created course.
pub const INITIAL_VERSION: VersionNumber = 1;

/// Maximum allowed length for a version change log entry.
pub const MAX_CHANGE_LOG_LENGTH: usize = 1000;

// ---------------------------------------------------------------------------
// Branch decision
// ---------------------------------------------------------------------------

/// Kind of content mutation requested by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A new video or material is added to the course.
    Add,
    /// An existing video or material is removed from the course.
    Remove,
    /// Title, description, order, or flag changes that do not alter which
    /// content items the course contains.
    EditMetadata,
}

/// Outcome of the branch decision for a single mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDecision {
    /// Apply the mutation directly to the current version's rows.
    InPlace,
    /// Clone the current manifest into a new version, then apply the
    /// mutation to the clone.
    Fork,
}

/// Decide whether a mutation may edit the current version in place or must
/// fork a new one.
///
/// Metadata-only edits never fork. Membership changes (add/remove) fork
/// exactly when the course has at least one enrollment: enrolled students
/// hold an access contract on the current content set, so it must be frozen
/// before it changes.
pub fn decide_branch(kind: MutationKind, has_enrollments: bool) -> BranchDecision {
    match kind {
        MutationKind::EditMetadata => BranchDecision::InPlace,
        MutationKind::Add | MutationKind::Remove => {
            if has_enrollments {
                BranchDecision::Fork
            } else {
                BranchDecision::InPlace
            }
        }
    }
}

/// Next version number for a course given the highest number ever allocated.
///
/// Version numbers are strictly increasing and never reused. Retried forks
/// must recompute this from a fresh read rather than reuse a candidate
/// computed before the failure.
pub fn next_version_number(highest_existing: VersionNumber) -> VersionNumber {
    highest_existing + 1
}

/// Guard that a mutation targets a row of the course's current version.
///
/// Rows of superseded versions are frozen history; a request that names one
/// is refused as a conflict rather than silently editing what a
/// version-pinned student sees. This applies to metadata edits as much as to
/// removals: rule 2 permits in-place edits on the *current* version only.
pub fn ensure_current_version(
    row_version: VersionNumber,
    current_version: VersionNumber,
) -> Result<(), CoreError> {
    if row_version != current_version {
        return Err(CoreError::Conflict(format!(
            "Content belongs to version {row_version}; only the current version \
             ({current_version}) can be modified"
        )));
    }
    Ok(())
}

/// Validate a change log entry for a new version.
pub fn validate_change_log(change_log: &str) -> Result<(), CoreError> {
    if change_log.trim().is_empty() {
        return Err(CoreError::Validation(
            "Change log must not be empty".to_string(),
        ));
    }
    if change_log.len() > MAX_CHANGE_LOG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Change log must not exceed {MAX_CHANGE_LOG_LENGTH} characters, got {}",
            change_log.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Manifests
// ---------------------------------------------------------------------------

/// The membership of one course version: ordered content item ids.
///
/// Manifests are immutable once a later version exists; [`Manifest::apply`]
/// therefore returns a new manifest and never touches its receiver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Manifest {
    pub video_ids: Vec<DbId>,
    pub material_ids: Vec<DbId>,
}

/// A single membership change carried by an add/remove mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestChange {
    AddVideo(DbId),
    RemoveVideo(DbId),
    AddMaterial(DbId),
    RemoveMaterial(DbId),
}

impl Manifest {
    /// Apply a membership change, producing the manifest the next version is
    /// expected to have. Additions append at the end of the ordering;
    /// removals preserve the relative order of the remaining items.
    pub fn apply(&self, change: ManifestChange) -> Manifest {
        let mut next = self.clone();
        match change {
            ManifestChange::AddVideo(id) => next.video_ids.push(id),
            ManifestChange::RemoveVideo(id) => next.video_ids.retain(|v| *v != id),
            ManifestChange::AddMaterial(id) => next.material_ids.push(id),
            ManifestChange::RemoveMaterial(id) => next.material_ids.retain(|m| *m != id),
        }
        next
    }

    /// Total number of content items in the manifest.
    pub fn len(&self) -> usize {
        self.video_ids.len() + self.material_ids.len()
    }

    /// True when the manifest lists no content at all.
    pub fn is_empty(&self) -> bool {
        self.video_ids.is_empty() && self.material_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- decide_branch -------------------------------------------------------

    #[test]
    fn metadata_edit_never_forks() {
        assert_eq!(
            decide_branch(MutationKind::EditMetadata, false),
            BranchDecision::InPlace
        );
        // Even with enrollments present.
        assert_eq!(
            decide_branch(MutationKind::EditMetadata, true),
            BranchDecision::InPlace
        );
    }

    #[test]
    fn add_without_enrollments_stays_in_place() {
        assert_eq!(
            decide_branch(MutationKind::Add, false),
            BranchDecision::InPlace
        );
    }

    #[test]
    fn remove_without_enrollments_stays_in_place() {
        assert_eq!(
            decide_branch(MutationKind::Remove, false),
            BranchDecision::InPlace
        );
    }

    #[test]
    fn add_with_enrollments_forks() {
        assert_eq!(decide_branch(MutationKind::Add, true), BranchDecision::Fork);
    }

    #[test]
    fn remove_with_enrollments_forks() {
        assert_eq!(
            decide_branch(MutationKind::Remove, true),
            BranchDecision::Fork
        );
    }

    #[test]
    fn version_never_advances_without_enrollments() {
        // Any sequence of membership mutations on an unenrolled course
        // resolves to InPlace, so the current version cannot move.
        let sequence = [
            MutationKind::Add,
            MutationKind::Add,
            MutationKind::Remove,
            MutationKind::EditMetadata,
            MutationKind::Remove,
        ];
        for kind in sequence {
            assert_eq!(decide_branch(kind, false), BranchDecision::InPlace);
        }
    }

    // -- next_version_number -------------------------------------------------

    #[test]
    fn initial_version_is_one() {
        assert_eq!(INITIAL_VERSION, 1);
    }

    #[test]
    fn next_version_increments_by_exactly_one() {
        assert_eq!(next_version_number(1), 2);
        assert_eq!(next_version_number(7), 8);
    }

    #[test]
    fn next_version_is_strictly_increasing() {
        let mut highest = INITIAL_VERSION;
        for _ in 0..5 {
            let next = next_version_number(highest);
            assert!(next > highest);
            highest = next;
        }
        assert_eq!(highest, 6);
    }

    // -- ensure_current_version ----------------------------------------------

    #[test]
    fn current_version_rows_may_be_modified() {
        assert!(ensure_current_version(3, 3).is_ok());
        assert!(ensure_current_version(INITIAL_VERSION, INITIAL_VERSION).is_ok());
    }

    #[test]
    fn superseded_version_rows_are_frozen() {
        // A row left behind by a fork must never be editable again, even for
        // metadata: version-pinned students are still being served from it.
        assert_matches!(ensure_current_version(1, 2), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn rows_ahead_of_the_pointer_are_rejected_too() {
        // Cannot happen through the normal flow, but a stale read of the
        // course row must not open a window either.
        assert_matches!(ensure_current_version(2, 1), Err(CoreError::Conflict(_)));
    }

    // -- validate_change_log -------------------------------------------------

    #[test]
    fn accepts_normal_change_log() {
        assert!(validate_change_log("Removed video 'Old intro'").is_ok());
    }

    #[test]
    fn rejects_empty_change_log() {
        assert_matches!(validate_change_log(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_change_log("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_oversize_change_log() {
        let log = "x".repeat(MAX_CHANGE_LOG_LENGTH + 1);
        assert_matches!(validate_change_log(&log), Err(CoreError::Validation(_)));
    }

    #[test]
    fn accepts_change_log_at_limit() {
        let log = "x".repeat(MAX_CHANGE_LOG_LENGTH);
        assert!(validate_change_log(&log).is_ok());
    }

    // -- Manifest::apply -----------------------------------------------------

    fn manifest(videos: &[DbId], materials: &[DbId]) -> Manifest {
        Manifest {
            video_ids: videos.to_vec(),
            material_ids: materials.to_vec(),
        }
    }

    #[test]
    fn add_video_appends_at_end() {
        let m = manifest(&[1, 2], &[]);
        let next = m.apply(ManifestChange::AddVideo(9));
        assert_eq!(next.video_ids, vec![1, 2, 9]);
    }

    #[test]
    fn remove_video_preserves_order_of_rest() {
        let m = manifest(&[1, 2, 3], &[]);
        let next = m.apply(ManifestChange::RemoveVideo(2));
        assert_eq!(next.video_ids, vec![1, 3]);
    }

    #[test]
    fn material_changes_leave_videos_untouched() {
        let m = manifest(&[1, 2], &[10]);
        let next = m.apply(ManifestChange::AddMaterial(11));
        assert_eq!(next.video_ids, vec![1, 2]);
        assert_eq!(next.material_ids, vec![10, 11]);
    }

    #[test]
    fn apply_never_mutates_the_source_manifest() {
        let m = manifest(&[1, 2, 3], &[10, 11]);
        let snapshot = m.clone();

        let _ = m.apply(ManifestChange::RemoveVideo(2));
        let _ = m.apply(ManifestChange::AddVideo(4));
        let _ = m.apply(ManifestChange::RemoveMaterial(10));

        assert_eq!(m, snapshot, "source manifest must stay frozen");
    }

    #[test]
    fn remove_of_unknown_id_is_a_no_op() {
        let m = manifest(&[1, 2], &[10]);
        let next = m.apply(ManifestChange::RemoveVideo(99));
        assert_eq!(next, m);
    }

    #[test]
    fn len_counts_both_kinds() {
        let m = manifest(&[1, 2], &[10]);
        assert_eq!(m.len(), 3);
        assert!(!m.is_empty());
        assert!(Manifest::default().is_empty());
    }

    // -- end-to-end expectation of the fork scenario -------------------------

    #[test]
    fn fork_scenario_from_enrollment_boundary() {
        // Course with no enrollments, version 1 holds videos [A=1, B=2].
        let v1 = manifest(&[1, 2], &[]);

        // Add video D while unenrolled: in place, still version 1.
        assert_eq!(
            decide_branch(MutationKind::Add, false),
            BranchDecision::InPlace
        );
        let v1 = v1.apply(ManifestChange::AddVideo(4));
        assert_eq!(v1.video_ids, vec![1, 2, 4]);

        // A student enrolls; removing B must now fork into version 2.
        assert_eq!(
            decide_branch(MutationKind::Remove, true),
            BranchDecision::Fork
        );
        let v2_number = next_version_number(INITIAL_VERSION);
        assert_eq!(v2_number, 2);

        let v2 = v1.apply(ManifestChange::RemoveVideo(2));
        assert_eq!(v2.video_ids, vec![1, 4]);

        // Version 1's manifest is untouched by the fork.
        assert_eq!(v1.video_ids, vec![1, 2, 4]);
    }
}
