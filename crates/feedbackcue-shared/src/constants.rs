/// Application name
pub const APP_NAME: &str = "FeedbackCue";

/// Accent color given to boards created without one
pub const DEFAULT_ACCENT_COLOR: &str = "#4F46E5";

/// Display name recorded for feedback submitted without one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Base slug used when a board name has no usable characters
pub const FALLBACK_SLUG: &str = "board";

/// Minimum accepted password length (characters)
pub const MIN_PASSWORD_LEN: usize = 8;

/// Column limits mirrored from the schema
pub const MAX_BOARD_NAME_LEN: usize = 200;
pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_AUTHOR_NAME_LEN: usize = 100;

/// Cookie carrying the login session token
pub const SESSION_COOKIE: &str = "session";

/// Cookie carrying the anonymous voter identifier
pub const VOTER_COOKIE: &str = "voter_id";

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 8000;
