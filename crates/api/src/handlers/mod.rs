//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod course;
pub mod enrollment;
pub mod material;
pub mod user;
pub mod version;
pub mod video;
