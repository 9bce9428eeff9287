/// Primary keys issued by the marketplace backend.
pub type DbId = i64;

/// All timestamps are UTC and supplied by the caller.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
