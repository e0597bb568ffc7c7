//! Input validation for requests sent to the messenger API

use std::path::Path;

pub const MISSING_CREDENTIALS: &str = "Please enter all required fields";

/// Maximum direct message length accepted by the service
const MAX_MESSAGE_CHARS: usize = 1000;

/// Both login fields must be filled in before a login is attempted.
///
/// The username is trimmed; the password is taken as typed.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(MISSING_CREDENTIALS.to_string());
    }
    Ok(())
}

/// Validates the text of a direct message
pub fn validate_message(msg: &str) -> Result<(), String> {
    if msg.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if msg.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_CHARS
        ));
    }

    Ok(())
}

/// A search query is usable when it has something besides whitespace
pub fn normalize_search_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Uploads must point at an existing image file
pub fn validate_upload_path(path: &str) -> Result<(), String> {
    let path_str = path.trim();
    if path_str.is_empty() {
        return Err("Choose a file to send".to_string());
    }

    let path = Path::new(path_str);
    if !path.is_file() {
        return Err(format!("File not found: {}", path_str));
    }

    let is_image = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_ascii_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp"
            )
        })
        .unwrap_or(false);
    if !is_image {
        return Err("Only images (jpg, png, gif, webp) can be sent".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("alice", "hunter2").is_ok());
        assert!(validate_credentials("alice", " spaced ").is_ok());

        assert_eq!(
            validate_credentials("", "hunter2").unwrap_err(),
            MISSING_CREDENTIALS
        );
        assert_eq!(
            validate_credentials("alice", "").unwrap_err(),
            MISSING_CREDENTIALS
        );
        assert!(validate_credentials("   ", "hunter2").is_err());
    }

    #[test]
    fn test_validate_message() {
        assert!(validate_message("Hello, world!").is_ok());
        assert!(validate_message("Line1\nLine2").is_ok());
        assert!(validate_message("日本語").is_ok());

        assert!(validate_message("").is_err());
        assert!(validate_message("  \n ").is_err());
        assert!(validate_message(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_normalize_search_query() {
        assert_eq!(normalize_search_query("  bob "), Some("bob".to_string()));
        assert_eq!(normalize_search_query("   "), None);
    }

    #[test]
    fn test_validate_upload_path() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("pic.JPG");
        std::fs::write(&image, b"jpeg").unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"text").unwrap();

        assert!(validate_upload_path(image.to_str().unwrap()).is_ok());
        assert!(validate_upload_path("").is_err());
        assert!(validate_upload_path(text.to_str().unwrap()).is_err());
        assert!(validate_upload_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_upload_path("/no/such/file.png").is_err());
    }
}
