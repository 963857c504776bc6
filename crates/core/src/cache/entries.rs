//! Entry CRUD within a named store.
//!
//! Writes are single UPSERT statements (or one transaction for batches), so a
//! reader never sees a partially written entry and the last write for a key wins.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use super::stores::ensure_store;
use crate::Error;
use crate::request::RequestKey;
use crate::response::{ResponseType, StoredResponse};
use tokio_rusqlite::{params, rusqlite};

fn parse_response_type(value: &str) -> ResponseType {
    match value {
        "cors" => ResponseType::Cors,
        "opaque" => ResponseType::Opaque,
        "error" => ResponseType::Error,
        _ => ResponseType::Basic,
    }
}

fn upsert(conn: &rusqlite::Connection, store: &str, key: &RequestKey, entry: &StoredResponse) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.headers)?;
    conn.execute(
        "INSERT INTO entries (
            store_name, key_hash, method, url, status, status_text, headers_json,
            response_url, response_type, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(store_name, key_hash) DO UPDATE SET
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            response_url = excluded.response_url,
            response_type = excluded.response_type,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            store,
            compute_cache_key(key),
            key.method.to_ascii_uppercase(),
            &key.url,
            entry.status,
            &entry.status_text,
            headers_json,
            &entry.url,
            entry.response_type.as_str(),
            &entry.body,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Look up an entry.
    ///
    /// Returns None if the store or the key doesn't exist.
    pub async fn get_entry(&self, store: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let store = store.to_string();
        let key_hash = compute_cache_key(key);
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, headers_json, response_url, response_type, body, stored_at
                     FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((status, status_text, headers_json, url, response_type, body, stored_at)) => {
                        let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;
                        Ok(Some(StoredResponse {
                            status,
                            status_text,
                            headers,
                            url,
                            response_type: parse_response_type(&response_type),
                            body,
                            stored_at,
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace an entry, creating the store if needed.
    pub async fn put_entry(&self, store: &str, key: &RequestKey, entry: StoredResponse) -> Result<(), Error> {
        let store = store.to_string();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &store)?;
                upsert(conn, &store, &key, &entry)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace several entries in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(&self, store: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                for (key, entry) in &entries {
                    upsert(&tx, &store, key, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Keys of every entry in a store, ordered by URL.
    pub async fn entry_keys(&self, store: &str) -> Result<Vec<RequestKey>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE store_name = ?1 ORDER BY url ASC")?;
                let keys = stmt
                    .query_map(params![store], |row| Ok(RequestKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
