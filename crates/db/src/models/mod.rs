//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where the table
//!   supports patching

pub mod course;
pub mod course_version;
pub mod enrollment;
pub mod material;
pub mod session;
pub mod user;
pub mod video;
