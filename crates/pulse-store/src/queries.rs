use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::LocalStorage;
use crate::error::{Result, StoreError};

impl LocalStorage {
    // -- Raw items --

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_item(conn, key))
    }

    /// Insert or overwrite `key`. Fails without touching the old value when
    /// the write would push total usage past the quota.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let quota = self.quota_bytes;
        self.with_conn(|conn| upsert_item(conn, key, value, quota))
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM local_storage ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(keys)
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM local_storage", [])?;
            Ok(())
        })
    }

    /// Bytes currently used by keys plus values.
    pub fn used_bytes(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let used: i64 = conn.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM local_storage",
                [],
                |row| row.get(0),
            )?;
            Ok(used as u64)
        })
    }

    // -- JSON values --

    /// Missing key is `Ok(None)`; unparseable text is `StoreError::Corrupt`.
    pub(crate) fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get_item(key)?
            .map(|raw| parse_json(key, &raw))
            .transpose()
    }

    pub(crate) fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = to_json(key, value)?;
        self.set_item(key, &raw)
    }

    /// Read, modify and write back one JSON value while holding the
    /// connection lock, so writers in this process never drop each other's
    /// updates.
    ///
    /// `f` receives the current value (or the parse error) and returns the
    /// value to store plus what the caller gets back. An `Err` from `f`
    /// leaves the stored value untouched.
    pub(crate) fn update_json<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Result<Option<T>>) -> Result<(T, R)>,
    {
        let quota = self.quota_bytes;
        self.with_conn(|conn| {
            let current = query_item(conn, key)?
                .map(|raw| parse_json(key, &raw))
                .transpose();
            let (next, out) = f(current)?;
            let raw = to_json(key, &next)?;
            upsert_item(conn, key, &raw, quota)?;
            Ok(out)
        })
    }
}

fn parse_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}

fn upsert_item(conn: &Connection, key: &str, value: &str, quota: u64) -> Result<()> {
    let others: i64 = conn.query_row(
        "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
         FROM local_storage WHERE key != ?1",
        [key],
        |row| row.get(0),
    )?;

    let needed = others as u64 + key.len() as u64 + value.len() as u64;
    if needed > quota {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }

    conn.execute(
        "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        (key, value),
    )?;
    Ok(())
}

fn query_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(value)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = LocalStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_item("ui_color_mode").unwrap(), None);

        storage.set_item("ui_color_mode", "dark").unwrap();
        assert_eq!(storage.get_item("ui_color_mode").unwrap().as_deref(), Some("dark"));

        storage.set_item("ui_color_mode", "light").unwrap();
        assert_eq!(storage.get_item("ui_color_mode").unwrap().as_deref(), Some("light"));

        storage.remove_item("ui_color_mode").unwrap();
        assert_eq!(storage.get_item("ui_color_mode").unwrap(), None);
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let storage = LocalStorage::open_in_memory().unwrap().with_quota(16);
        storage.set_item("k", "small").unwrap();

        let err = storage.set_item("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        // 1 byte key + 9 byte value, rewritten in place
        let storage = LocalStorage::open_in_memory().unwrap().with_quota(10);
        storage.set_item("k", "123456789").unwrap();
        storage.set_item("k", "987654321").unwrap();
        assert_eq!(storage.used_bytes().unwrap(), 10);
    }

    #[test]
    fn read_json_reports_corrupt_text() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set_item("history", "{not json").unwrap();

        let result: Result<Option<Vec<u32>>> = storage.read_json("history");
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn update_json_error_leaves_value() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.write_json("counts", &vec![1u32]).unwrap();

        let out: Result<()> = storage.update_json("counts", |_: Result<Option<Vec<u32>>>| {
            Err(StoreError::LockPoisoned)
        });
        assert!(out.is_err());
        assert_eq!(storage.get_item("counts").unwrap().as_deref(), Some("[1]"));

        let len = storage
            .update_json("counts", |current: Result<Option<Vec<u32>>>| {
                let mut counts = current?.unwrap_or_default();
                counts.push(2);
                let len = counts.len();
                Ok((counts, len))
            })
            .unwrap();
        assert_eq!(len, 2);
        assert_eq!(storage.get_item("counts").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn keys_and_clear() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);

        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
        assert_eq!(storage.used_bytes().unwrap(), 0);
    }
}
