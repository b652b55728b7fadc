use intake_common::application::ATTACHMENT_EXTENSIONS;

/// Result of validating an uploaded filename.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is exactly `..`.
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Extension is missing or not one of the accepted deck formats.
    UnsupportedExtension,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::UnsupportedExtension => "Only .ppt, .pptx and .pdf files are accepted",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// Lower-cased extension of an uploaded slide deck.
pub fn attachment_extension(filename: &str) -> Result<String, FilenameError> {
    let name = validate_flat_filename(filename)?;
    let (_, ext) = name
        .rsplit_once('.')
        .ok_or(FilenameError::UnsupportedExtension)?;
    let ext = ext.to_ascii_lowercase();

    if ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(FilenameError::UnsupportedExtension)
    }
}

/// Reduces free text to a storage-key segment (`[A-Za-z0-9_-]`).
///
/// Other characters become `_`; an empty result becomes `applicant`.
pub fn sanitize_key_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "applicant".to_string()
    } else {
        cleaned
    }
}

/// Storage key of an uploaded deck: `applications/<register>_<millis>.<ext>`.
pub fn attachment_key(register_number: &str, timestamp_millis: i64, ext: &str) -> String {
    format!(
        "applications/{}_{}.{}",
        sanitize_key_segment(register_number),
        timestamp_millis,
        ext
    )
}
