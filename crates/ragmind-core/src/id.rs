//! ID generation utilities.

use uuid::Uuid;

/// Maximum accepted length of a user id.
pub const MAX_USER_ID_LEN: usize = 64;

/// Generate a new UUID v4.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Check if a user id is acceptable as a record key.
///
/// Allows ASCII alphanumerics plus `_`, `-` and `.`.
pub fn is_valid_user_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_USER_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
