//! Pure domain logic for the Coursebase content platform.
//!
//! Everything here is I/O-free and synchronous: policy decisions, parsing,
//! validation, and naming conventions. Persistence lives in `coursebase-db`,
//! object storage in `coursebase-blob`, and HTTP in `coursebase-api`.

pub mod access;
pub mod blobkey;
pub mod error;
pub mod localized;
pub mod roles;
pub mod types;
pub mod uploads;
pub mod versioning;
