/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Course version numbers are 1-based and strictly increasing per course.
pub type VersionNumber = i32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
