//! Session store backed by the redb embedded database.
//!
//! One table maps the session token to a fixed-layout record (see
//! [`super::codec`]). Every write is a single redb write transaction, so a
//! record is always replaced as a whole. Reads run on MVCC snapshots and
//! never observe a half-written record.

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::codec;
use super::types::{SessionLookup, SessionRecord};
use crate::error::{Result, StoreError};
use crate::urls::validate_url;

/// redb table for sessions (key: session token, value: encoded record).
const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Persistent session store.
pub struct SessionStore {
    /// redb database handle.
    db: Database,

    /// Database file location, kept for diagnostics.
    path: PathBuf,

    /// TTL applied to every write, in seconds.
    ttl_secs: u64,
}

impl SessionStore {
    /// Open or create a session store at the given path.
    pub fn open(path: impl Into<PathBuf>, ttl_secs: u64) -> Result<Self> {
        let path = path.into();
        let open_err = |source: redb::Error| StoreError::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| open_err(redb::Error::Io(e)))?;
        }

        let db = Database::create(&path).map_err(|e| open_err(e.into()))?;

        let write_txn = db.begin_write().map_err(|e| open_err(e.into()))?;
        {
            let _ = write_txn
                .open_table(SESSIONS_TABLE)
                .map_err(|e| open_err(e.into()))?;
        }
        write_txn.commit().map_err(|e| open_err(e.into()))?;

        debug!(path = %path.display(), ttl_secs, "Session store opened");

        Ok(Self { db, path, ttl_secs })
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// TTL applied on write, in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Get the live session for a token. Expired records read as absent.
    pub fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.lookup(session_id)?.into_active())
    }

    /// Look up a token, distinguishing absent, expired and active records.
    pub fn lookup(&self, session_id: &str) -> Result<SessionLookup> {
        codec::check_session_id(session_id)?;

        let read_txn = self.db.begin_read().map_err(StoreError::read)?;
        let table = read_txn
            .open_table(SESSIONS_TABLE)
            .map_err(StoreError::read)?;

        let Some(value) = table.get(session_id).map_err(StoreError::read)? else {
            debug!(session_id, "Session not found");
            return Ok(SessionLookup::Absent);
        };
        let record = codec::decode(value.value())?;

        if record.is_expired() {
            debug!(session_id, expires_on = %record.expires_on, "Session expired");
            return Ok(SessionLookup::Expired(record));
        }
        Ok(SessionLookup::Active(record))
    }

    /// Store a session, replacing any previous record for the token.
    ///
    /// Expiry is set to now plus the store TTL. Non-empty identity and
    /// identity server URLs must pass [`crate::urls::is_valid_url`]. Nothing
    /// is written unless every field validates.
    pub fn put(
        &self,
        session_id: &str,
        path: &str,
        identity: &str,
        identity_server: &str,
    ) -> Result<SessionRecord> {
        let record = SessionRecord::new(
            session_id.to_string(),
            path.to_string(),
            identity.to_string(),
            identity_server.to_string(),
            self.ttl_secs,
        );
        let encoded = codec::encode(&record)?;
        for url in [identity, identity_server] {
            if !url.is_empty() {
                validate_url(url)?;
            }
        }

        self.insert_encoded(session_id, &encoded)?;
        debug!(
            session_id,
            authenticated = record.is_authenticated(),
            expires_on = %record.expires_on,
            "Session stored"
        );
        Ok(record)
    }

    /// Delete a session. Returns whether a record existed.
    pub fn delete(&self, session_id: &str) -> Result<bool> {
        codec::check_session_id(session_id)?;

        let write_txn = self.db.begin_write().map_err(StoreError::write)?;
        let removed = {
            let mut table = write_txn
                .open_table(SESSIONS_TABLE)
                .map_err(StoreError::write)?;
            let result = table.remove(session_id).map_err(StoreError::write)?;
            result.is_some()
        };
        write_txn.commit().map_err(StoreError::write)?;

        debug!(session_id, removed, "Session deleted");
        Ok(removed)
    }

    /// Remove every expired or undecodable record in one transaction.
    /// Returns the number of records removed.
    pub fn evict_expired(&self) -> Result<usize> {
        let write_txn = self.db.begin_write().map_err(StoreError::write)?;
        let evicted = {
            let mut table = write_txn
                .open_table(SESSIONS_TABLE)
                .map_err(StoreError::write)?;

            let mut doomed = Vec::new();
            for entry in table.iter().map_err(StoreError::write)? {
                let (key, value) = entry.map_err(StoreError::write)?;
                match codec::decode(value.value()) {
                    Ok(record) if record.is_expired() => doomed.push(key.value().to_string()),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(session_id = key.value(), error = %e, "Undecodable session record, evicting");
                        doomed.push(key.value().to_string());
                    }
                }
            }

            for session_id in &doomed {
                table
                    .remove(session_id.as_str())
                    .map_err(StoreError::write)?;
            }
            doomed.len()
        };
        write_txn.commit().map_err(StoreError::write)?;

        Ok(evicted)
    }

    /// Number of stored records, expired ones included.
    pub fn session_count(&self) -> Result<usize> {
        let read_txn = self.db.begin_read().map_err(StoreError::read)?;
        let table = read_txn
            .open_table(SESSIONS_TABLE)
            .map_err(StoreError::read)?;
        Ok(table.len().map_err(StoreError::read)? as usize)
    }

    /// Release the database handle.
    pub fn close(self) {
        let path = self.path.clone();
        drop(self.db);
        info!(path = %path.display(), "Session store closed");
    }

    /// Write a fully built record as is, keeping its expiry.
    pub(crate) fn write_record(&self, record: &SessionRecord) -> Result<()> {
        let encoded = codec::encode(record)?;
        self.insert_encoded(&record.session_id, &encoded)
    }

    fn insert_encoded(&self, session_id: &str, encoded: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(StoreError::write)?;
        {
            let mut table = write_txn
                .open_table(SESSIONS_TABLE)
                .map_err(StoreError::write)?;
            table
                .insert(session_id, encoded)
                .map_err(StoreError::write)?;
        }
        write_txn.commit().map_err(StoreError::write)?;
        Ok(())
    }
}
