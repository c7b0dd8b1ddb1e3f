pub mod actions;
pub mod error;
pub mod migrations;
pub mod preferences;
pub mod pulse;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use actions::ActionStore;
pub use error::{Result, StoreError};
pub use preferences::PreferenceStore;
pub use pulse::PulseAnswerStore;

/// Maximum number of action records kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Total bytes (keys plus values) the local storage may hold.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Local key-value storage: string keys, string (JSON) values.
///
/// Every value lives in a single `local_storage` table. All calls are
/// synchronous and serialized on one connection; concurrent writers to the
/// same key get last-write-wins.
pub struct LocalStorage {
    conn: Mutex<Connection>,
    quota_bytes: u64,
}

impl LocalStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Local storage opened at {}", path.display());
        Ok(Self::from_conn(conn))
    }

    /// Storage that disappears with the process.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self::from_conn(conn))
    }

    fn from_conn(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }
}
