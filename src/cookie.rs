//! Session cookie values handed back to the browser.

use chrono::{DateTime, Duration, Utc};

/// Timestamp format of the cookie `expires` attribute.
pub const COOKIE_EXPIRES_FORMAT: &str = "%a, %d-%b-%Y %H:%M:%S GMT";

/// Build a `Set-Cookie` value for a session token.
///
/// A zero lifespan yields a browser-session cookie without `expires`.
pub fn make_cookie_value(name: &str, session_id: &str, path: &str, lifespan_secs: u64) -> String {
    make_cookie_value_at(Utc::now(), name, session_id, path, lifespan_secs)
}

/// Same as [`make_cookie_value`] with an explicit clock.
pub fn make_cookie_value_at(
    now: DateTime<Utc>,
    name: &str,
    session_id: &str,
    path: &str,
    lifespan_secs: u64,
) -> String {
    if lifespan_secs == 0 {
        return format!("{}={}; path={}", name, session_id, path);
    }

    let lifespan = i64::try_from(lifespan_secs).unwrap_or(i64::MAX);
    let expires = Duration::try_seconds(lifespan)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    format!(
        "{}={}; expires={}; path={}",
        name,
        session_id,
        expires.format(COOKIE_EXPIRES_FORMAT),
        path
    )
}
