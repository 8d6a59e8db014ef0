//! Input validation for account requests.

/// Longest local part accepted (RFC 5321 limit).
const MAX_LOCAL_PART_LEN: usize = 64;

/// Longest display name accepted.
const MAX_DISPLAY_NAME_LEN: usize = 255;

/// Validation error for an account request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User ID is empty.
    EmptyUserId,
    /// Local part is empty.
    EmptyLocalPart,
    /// Local part exceeds 64 characters.
    LocalPartTooLong,
    /// Local part contains characters outside `[a-z0-9._-]`.
    InvalidLocalPartCharacter,
    /// Local part starts or ends with a dot, or contains `..`.
    MisplacedDot,
    /// Display name is empty.
    EmptyDisplayName,
    /// Display name exceeds 255 characters.
    DisplayNameTooLong,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyUserId => "User ID is required",
            Self::EmptyLocalPart => "Mailbox name is required",
            Self::LocalPartTooLong => "Mailbox name must be at most 64 characters",
            Self::InvalidLocalPartCharacter => {
                "Mailbox name may only contain letters, digits, '.', '_' and '-'"
            }
            Self::MisplacedDot => {
                "Mailbox name must not start or end with '.' or contain consecutive dots"
            }
            Self::EmptyDisplayName => "Display name is required",
            Self::DisplayNameTooLong => "Display name must be at most 255 characters",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUserId => "user_id",
            Self::EmptyLocalPart
            | Self::LocalPartTooLong
            | Self::InvalidLocalPartCharacter
            | Self::MisplacedDot => "local_part",
            Self::EmptyDisplayName | Self::DisplayNameTooLong => "display_name",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a request.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate an account creation request.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_account_request(
    user_id: &str,
    local_part: &str,
    display_name: &str,
) -> ValidationResult {
    let mut errors = Vec::new();

    if user_id.trim().is_empty() {
        errors.push(ValidationError::EmptyUserId);
    }

    if let Err(e) = validate_local_part(local_part) {
        errors.push(e);
    }

    let name = display_name.trim();
    if name.is_empty() {
        errors.push(ValidationError::EmptyDisplayName);
    } else if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        errors.push(ValidationError::DisplayNameTooLong);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the part of a mailbox address before the `@`.
///
/// # Errors
///
/// Returns the first rule the local part violates.
pub fn validate_local_part(local_part: &str) -> Result<(), ValidationError> {
    if local_part.is_empty() {
        return Err(ValidationError::EmptyLocalPart);
    }
    if local_part.len() > MAX_LOCAL_PART_LEN {
        return Err(ValidationError::LocalPartTooLong);
    }
    if !local_part
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::InvalidLocalPartCharacter);
    }
    if local_part.starts_with('.') || local_part.ends_with('.') || local_part.contains("..") {
        return Err(ValidationError::MisplacedDot);
    }
    Ok(())
}

/// Basic email validation.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') {
        return false;
    }

    !domain.split('.').any(str::is_empty)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_local_parts() {
        assert!(validate_local_part("john").is_ok());
        assert!(validate_local_part("john.doe").is_ok());
        assert!(validate_local_part("john_doe-2").is_ok());
        assert!(validate_local_part("J").is_ok());
    }

    #[test]
    fn test_invalid_local_parts() {
        assert_eq!(validate_local_part(""), Err(ValidationError::EmptyLocalPart));
        assert_eq!(
            validate_local_part("john@example.com"),
            Err(ValidationError::InvalidLocalPartCharacter)
        );
        assert_eq!(
            validate_local_part("john doe"),
            Err(ValidationError::InvalidLocalPartCharacter)
        );
        assert_eq!(validate_local_part(".john"), Err(ValidationError::MisplacedDot));
        assert_eq!(validate_local_part("john."), Err(ValidationError::MisplacedDot));
        assert_eq!(validate_local_part("jo..hn"), Err(ValidationError::MisplacedDot));
        assert_eq!(
            validate_local_part(&"a".repeat(65)),
            Err(ValidationError::LocalPartTooLong)
        );
    }

    #[test]
    fn test_request_collects_all_errors() {
        let errors = validate_account_request(" ", "", "").unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyUserId,
                ValidationError::EmptyLocalPart,
                ValidationError::EmptyDisplayName,
            ]
        );
        assert_eq!(errors[1].field(), "local_part");
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_account_request("user-1", "john", "John Doe").is_ok());
    }

    #[test]
    fn test_display_name_too_long() {
        let errors = validate_account_request("u", "john", &"x".repeat(256)).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DisplayNameTooLong]);
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@sub.example.com"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }
}
