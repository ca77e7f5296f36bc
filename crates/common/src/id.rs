//! ID generation utilities.

use chrono::Utc;
use ulid::Ulid;

/// Prefix marking identities synthesized for unauthenticated submitters.
pub const GUEST_ID_PREFIX: &str = "guest_";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs carry their creation millisecond in the leading characters, so
    /// records created later sort after earlier ones.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a guest identity derived from the submission time.
    #[must_use]
    pub fn generate_guest_id(&self) -> String {
        format!("{GUEST_ID_PREFIX}{}", Utc::now().timestamp_millis())
    }
}

/// Whether an identifier was produced by [`IdGenerator::generate_guest_id`].
#[must_use]
pub fn is_guest_id(id: &str) -> bool {
    id.starts_with(GUEST_ID_PREFIX)
}
