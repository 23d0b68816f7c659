use thiserror::Error;

/// Rejections produced while turning untrusted input into domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown feedback status: {0:?}")]
    UnknownStatus(String),

    #[error("Unknown feedback category: {0:?}")]
    UnknownCategory(String),

    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid accent color {0:?}, expected #RRGGBB")]
    InvalidAccentColor(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}
