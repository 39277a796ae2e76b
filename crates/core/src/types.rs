/// Database primary keys are PostgreSQL BIGSERIAL values.
pub type DbId = i64;

/// All timestamps are stored and compared in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
