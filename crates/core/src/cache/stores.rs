//! Named store operations.
//!
//! A store is a row in `stores`; deleting it cascades to its entries in the same
//! statement, so a half-deleted store is never observable.

use super::connection::CacheDb;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// Store name with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

pub(crate) fn ensure_store(conn: &rusqlite::Connection, name: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO stores (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![name, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl CacheDb {
    /// Create the store if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &name)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no such store existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// All store names, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every store with its entry count.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, COUNT(e.key_hash), s.created_at
                     FROM stores s LEFT JOIN entries e ON e.store_name = s.name
                     GROUP BY s.name
                     ORDER BY s.created_at ASC, s.name ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(1)? as u64,
                            created_at: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("blog-pwa-v1").await.unwrap();
        db.open_store("blog-pwa-v1").await.unwrap();
        assert_eq!(db.store_names().await.unwrap(), vec!["blog-pwa-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("blog-pwa-v1").await.unwrap();
        db.open_store("blog-pwa-v2").await.unwrap();

        assert!(db.delete_store("blog-pwa-v1").await.unwrap());
        assert!(!db.delete_store("blog-pwa-v1").await.unwrap());
        assert_eq!(db.store_names().await.unwrap(), vec!["blog-pwa-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_store_summaries_empty_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("blog-pwa-v1").await.unwrap();
        let summaries = db.store_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entries, 0);
    }
}
