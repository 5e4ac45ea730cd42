//! Zentinel OpenID session persistence
//!
//! Durable session state for the OpenID relay: a redb-backed session store
//! with a fixed record layout, the cookie value handed back to the browser,
//! and the URL and query-string helpers used to interpret identity-provider
//! redirects.

pub mod config;
pub mod cookie;
pub mod error;
pub mod failure;
pub mod session;
pub mod urls;

pub use config::{SessionConfig, SessionConfigJson};
pub use cookie::make_cookie_value;
pub use error::{CodecError, DecodeError, InvalidUrlError, StoreError};
pub use failure::AuthFailure;
pub use session::{new_session_id, SessionLookup, SessionRecord, SessionStore};
