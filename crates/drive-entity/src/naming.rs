//! Name rules shared by folders and files.

use drive_core::{AppError, AppResult};

/// Longest accepted folder or file name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Separator used in materialized folder paths.
pub const PATH_SEPARATOR: char = '/';

/// Trim and validate a folder or file name.
///
/// `what` names the object in the error message ("Folder", "File").
/// Names are compared case-sensitively after trimming.
pub fn normalize_name(name: &str, what: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{what} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "{what} name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if trimmed.contains(PATH_SEPARATOR) {
        return Err(AppError::invalid_input(format!(
            "{what} name cannot contain '{PATH_SEPARATOR}'"
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::invalid_input(format!(
            "'{trimmed}' is not a valid {} name",
            what.to_lowercase()
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::ErrorKind;

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize_name("  Docs ", "Folder").unwrap(), "Docs");
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let err = normalize_name("   ", "Folder").unwrap_err();
        assert!(err.is(ErrorKind::InvalidInput));
        assert_eq!(err.message, "Folder name cannot be empty");
    }

    #[test]
    fn test_separator_and_dot_names_are_invalid() {
        assert!(normalize_name("a/b", "File").is_err());
        assert!(normalize_name("..", "Folder").is_err());
    }

    #[test]
    fn test_length_limit_counts_characters() {
        assert!(normalize_name(&"é".repeat(MAX_NAME_LENGTH), "File").is_ok());
        assert!(normalize_name(&"x".repeat(MAX_NAME_LENGTH + 1), "File").is_err());
    }
}
