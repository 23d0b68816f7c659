//! Input validation for free-text fields.

use crate::constants::MIN_PASSWORD_LEN;
use crate::error::ValidationError;

/// Trim `value` and reject it when empty or longer than `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Trim an optional value, mapping blank input to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accept `#RRGGBB` (either case).
pub fn accent_color(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidAccentColor(value.to_string()))
    }
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}
