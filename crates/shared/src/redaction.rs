//! Secret detection and redaction utilities.
//!
//! Form submissions can carry passwords or tokens next to ordinary fields, so
//! anything that echoes field names or values (logs, config dumps) goes
//! through these helpers first.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// # Examples
///
/// ```
/// use form_service_shared::is_secret_key;
///
/// assert!(is_secret_key("password_confirmation"));
/// assert!(is_secret_key("API_TOKEN"));
/// assert!(!is_secret_key("title"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Redacts a value if the key is likely a secret.
///
/// # Examples
///
/// ```
/// use form_service_shared::redact_if_secret;
///
/// assert_eq!(redact_if_secret("password", "hunter2"), "[REDACTED]");
/// assert_eq!(redact_if_secret("title", "Hello"), "Hello");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}
