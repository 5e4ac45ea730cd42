//! Session record types for OpenID relay persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum byte length of every string field in a stored record.
pub const MAX_FIELD_LEN: usize = 254;

/// Byte length of a freshly minted session token (16 random bytes, hex).
pub const SESSION_ID_HEX_LEN: usize = 32;

/// Generate a new random session token.
///
/// 128 bits of randomness, hex-encoded so it is safe as a cookie value and
/// as a store key.
pub fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// The string fields of a [`SessionRecord`], used to name the offending
/// field in codec errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SessionId,
    Path,
    Identity,
    IdentityServer,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::SessionId => write!(f, "session_id"),
            Field::Path => write!(f, "path"),
            Field::Identity => write!(f, "identity"),
            Field::IdentityServer => write!(f, "identity_server"),
        }
    }
}

/// One in-flight or completed OpenID authentication session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session token, also the store key.
    pub session_id: String,

    /// URL path the session cookie is scoped to.
    pub path: String,

    /// Claimed identity URL. Empty while the handshake is pending.
    pub identity: String,

    /// Endpoint of the identity provider handling this session.
    pub identity_server: String,

    /// When the session becomes stale.
    pub expires_on: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record that expires `ttl_secs` from now.
    ///
    /// Expiry has whole-second precision, matching the stored layout.
    pub fn new(
        session_id: String,
        path: String,
        identity: String,
        identity_server: String,
        ttl_secs: u64,
    ) -> Self {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let expires_on = DateTime::from_timestamp(Utc::now().timestamp().saturating_add(ttl), 0)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            session_id,
            path,
            identity,
            identity_server,
            expires_on,
        }
    }

    /// Check if the session is expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against an explicit clock.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_on
    }

    /// Whether the identity-provider handshake has completed for this session.
    pub fn is_authenticated(&self) -> bool {
        !self.identity.is_empty()
    }

    pub(crate) fn fields(&self) -> [(Field, &str); 4] {
        [
            (Field::SessionId, self.session_id.as_str()),
            (Field::Path, self.path.as_str()),
            (Field::Identity, self.identity.as_str()),
            (Field::IdentityServer, self.identity_server.as_str()),
        ]
    }
}

/// Outcome of a store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No record exists for the token.
    Absent,
    /// A record exists but its expiry has passed.
    Expired(SessionRecord),
    /// A live record.
    Active(SessionRecord),
}

impl SessionLookup {
    /// The live record, if any. Expired records are treated as absent.
    pub fn into_active(self) -> Option<SessionRecord> {
        match self {
            SessionLookup::Active(record) => Some(record),
            SessionLookup::Absent | SessionLookup::Expired(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ttl_secs: u64) -> SessionRecord {
        SessionRecord::new(
            "abc".to_string(),
            "/".to_string(),
            String::new(),
            "https://idp.example.com/server".to_string(),
            ttl_secs,
        )
    }

    #[test]
    fn test_new_session_id() {
        let a = new_session_id();
        let b = new_session_id();
        assert_eq!(a.len(), SESSION_ID_HEX_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_expiry() {
        let mut session = record(3600);
        assert!(!session.is_expired());

        session.expires_on = Utc::now() - chrono::Duration::seconds(10);
        assert!(session.is_expired());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let session = record(u64::MAX);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_pending_vs_authenticated() {
        let mut session = record(60);
        assert!(!session.is_authenticated());
        session.identity = "http://alice.example.com/".to_string();
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_lookup_into_active() {
        let live = record(60);
        assert_eq!(
            SessionLookup::Active(live.clone()).into_active(),
            Some(live.clone())
        );
        assert_eq!(SessionLookup::Expired(live).into_active(), None);
        assert_eq!(SessionLookup::Absent.into_active(), None);
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::IdentityServer.to_string(), "identity_server");
        assert_eq!(Field::SessionId.to_string(), "session_id");
    }
}
