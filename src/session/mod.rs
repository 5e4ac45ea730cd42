//! Session persistence for the OpenID relay.
//!
//! Records live in a redb database keyed by session token, using a fixed
//! binary layout. Expired records read as absent and are swept in the
//! background.

pub mod cleanup;
pub mod codec;
pub mod store;
pub mod types;

pub use cleanup::{spawn_cleanup_task, sweep_once, DEFAULT_CLEANUP_INTERVAL_SECS};
pub use store::SessionStore;
pub use types::{new_session_id, Field, SessionLookup, SessionRecord, MAX_FIELD_LEN};
