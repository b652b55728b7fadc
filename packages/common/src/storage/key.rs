use super::error::StorageError;

const MAX_KEY_LEN: usize = 512;

/// Checks if a key contains `..` path components.
fn contains_path_traversal(key: &str) -> bool {
    key == ".." || key.starts_with("../") || key.contains("/../") || key.ends_with("/..")
}

/// Validates an object key: a relative, slash-separated path of safe segments.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let invalid = |msg: &str| Err(StorageError::InvalidKey(msg.to_string()));

    if key.is_empty() {
        return invalid("key cannot be empty");
    }
    if key.len() > MAX_KEY_LEN {
        return invalid("key exceeds maximum length of 512 characters");
    }
    if key.contains('\\') || key.contains('\0') {
        return invalid("key must not contain backslashes or null bytes");
    }
    if key.starts_with('/') || key.ends_with('/') {
        return invalid("key must not start or end with '/'");
    }
    if contains_path_traversal(key) {
        return invalid("key must not contain '..' traversal");
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return invalid("key must not contain empty segments");
        }
        if segment.starts_with('.') {
            return invalid("key segments must not start with '.'");
        }
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return invalid("key contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)");
    }

    Ok(key)
}
