/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are stored as TIMESTAMPTZ.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Product identifiers are owned by the catalogue and stored as BIGINT.
pub type ProductId = i64;

/// User identifiers are owned by the identity service and stored as BIGINT.
pub type UserId = i64;
