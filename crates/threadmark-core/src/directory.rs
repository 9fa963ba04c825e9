use std::collections::HashMap;

use thiserror::Error;

/// User id to display name, as supplied by the caller.
pub type UserDirectory = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user directory is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid user id {0:?}: expected upper-case letters and digits")]
    InvalidUserId(String),

    #[error("user {0} has an empty display name")]
    EmptyDisplayName(String),
}

fn is_user_id_byte(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte.is_ascii_digit()
}

/// Whether `id` could appear in a `<@ID>` mention.
pub fn is_valid_user_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(is_user_id_byte)
}

/// Parses a `{"U123": "Alice", ...}` object into a directory.
pub fn parse_user_directory(json: &str) -> Result<UserDirectory, DirectoryError> {
    let raw: HashMap<String, String> = serde_json::from_str(json)?;
    for (id, name) in &raw {
        if !is_valid_user_id(id) {
            return Err(DirectoryError::InvalidUserId(id.clone()));
        }
        if name.trim().is_empty() {
            return Err(DirectoryError::EmptyDisplayName(id.clone()));
        }
    }
    tracing::debug!(users = raw.len(), "loaded user directory");
    Ok(raw)
}
