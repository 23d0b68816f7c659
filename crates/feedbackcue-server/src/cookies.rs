//! Cookies issued by the server. Both are HttpOnly, SameSite=Lax and scoped
//! to the whole site; `Secure` follows `SECURE_COOKIES`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;

/// Value of cookie `name`, if present and non-empty.
pub fn value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn build(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .secure(secure)
        .build()
}

/// A cookie that tells the browser to forget `name`. Sent even when the
/// request did not carry the cookie.
pub fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}
