//! Application-wide constants

/// Header carrying the client idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
/// Header set on responses served from the idempotency store.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "idempotent-replayed";
pub const MAX_IDEMPOTENCY_KEY_LENGTH: u64 = 255;

/// Status stored with a successful create.
pub const STATUS_CREATED: u16 = 201;
/// Status stored with a successful update.
pub const STATUS_OK: u16 = 200;

/// Calendar date format accepted in request bodies.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const BACKEND_POSTGRES: &str = "postgres";
pub const BACKEND_MEMORY: &str = "memory";
