//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod course_repo;
pub mod course_version_repo;
pub mod enrollment_repo;
pub mod material_repo;
pub mod session_repo;
pub mod user_repo;
pub mod video_repo;

pub use course_repo::CourseRepo;
pub use course_version_repo::CourseVersionRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use material_repo::MaterialRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
