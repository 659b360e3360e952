//! Cache generation CRUD.
//!
//! A generation is one deployment's named precache namespace. Install opens
//! the current generation and upserts one entry per manifest asset; activate
//! deletes every generation that is not current. Entries are addressed by
//! request identity (method + URL).

use super::connection::CacheDb;
use super::identity::entry_key;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Fixed prefix for generation names.
const GENERATION_PREFIX: &str = "cache-";

/// Derive the generation name for a deployment version identifier.
///
/// The version string is used verbatim; the prefix keeps generation names
/// recognizable next to any other tables sharing the database file.
pub fn generation_name(version: &str) -> String {
    format!("{GENERATION_PREFIX}{version}")
}

/// A stored request/response pair.
///
/// The snapshot carries everything needed to replay the response offline:
/// status, content type, headers, and body bytes. Only GET responses are
/// ever stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub entry_key: String,
    pub method: String,
    pub url: String,
    pub path: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers_json: Option<String>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CacheEntry {
    /// Build an entry from a fetched response, computing its identity key.
    pub fn new(
        method: &str, url: &str, path: &str, status: u16, content_type: Option<String>, headers_json: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            entry_key: entry_key(method, url),
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            path: path.to_string(),
            status,
            content_type,
            headers_json,
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheDb {
    /// Open a generation, creating it if absent.
    ///
    /// Idempotent: reopening an existing generation keeps its entries and
    /// its original created_at.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List all generation names, oldest first.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all of its entries.
    ///
    /// Returns false if no generation with that name existed. Entries go
    /// with the generation row via ON DELETE CASCADE.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace an entry in a generation.
    ///
    /// Upsert by request identity: re-running install against the same
    /// version overwrites each entry with the freshly fetched response.
    pub async fn put_entry(&self, generation: &str, entry: &CacheEntry) -> Result<(), Error> {
        let generation = generation.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        generation, entry_key, method, url, path,
                        status, content_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT(generation, entry_key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        path = excluded.path,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        generation,
                        entry.entry_key,
                        entry.method,
                        entry.url,
                        entry.path,
                        entry.status as i64,
                        entry.content_type,
                        entry.headers_json,
                        entry.body,
                        entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by request identity.
    ///
    /// Returns None when the generation holds no entry for that identity.
    pub async fn match_entry(&self, generation: &str, method: &str, url: &str) -> Result<Option<CacheEntry>, Error> {
        let generation = generation.to_string();
        let key = entry_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT entry_key, method, url, path, status, content_type, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND entry_key = ?2",
                )?;

                let result = stmt.query_row(params![generation, key], |row| {
                    Ok(CacheEntry {
                        entry_key: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        path: row.get(3)?,
                        status: row.get::<_, i64>(4)? as u16,
                        content_type: row.get(5)?,
                        headers_json: row.get(6)?,
                        body: row.get(7)?,
                        stored_at: row.get(8)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a generation.
    pub async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(url: &str, body: &[u8]) -> CacheEntry {
        let path = url::Url::parse(url).unwrap().path().to_string();
        CacheEntry::new("GET", url, &path, 200, Some("text/javascript".to_string()), None, body.to_vec())
    }

    #[tokio::test]
    async fn test_generation_name_prefix() {
        assert_eq!(generation_name("v1"), "cache-v1");
    }

    #[tokio::test]
    async fn test_open_generation_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();
        db.put_entry("cache-v1", &make_entry("https://example.com/app.js", b"a"))
            .await
            .unwrap();

        db.open_generation("cache-v1").await.unwrap();
        assert_eq!(db.entry_count("cache-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();

        let entry = make_entry("https://example.com/app.js", b"console.log(1)");
        db.put_entry("cache-v1", &entry).await.unwrap();

        let hit = db
            .match_entry("cache-v1", "GET", "https://example.com/app.js")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, b"console.log(1)");
        assert_eq!(hit.status, 200);
        assert_eq!(hit.path, "/app.js");
    }

    #[tokio::test]
    async fn test_match_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();

        let miss = db
            .match_entry("cache-v1", "GET", "https://example.com/missing.js")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_match_is_method_sensitive() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();
        db.put_entry("cache-v1", &make_entry("https://example.com/app.js", b"a"))
            .await
            .unwrap();

        let miss = db
            .match_entry("cache-v1", "HEAD", "https://example.com/app.js")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_by_identity() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();

        db.put_entry("cache-v1", &make_entry("https://example.com/app.js", b"old"))
            .await
            .unwrap();
        db.put_entry("cache-v1", &make_entry("https://example.com/app.js", b"new"))
            .await
            .unwrap();

        assert_eq!(db.entry_count("cache-v1").await.unwrap(), 1);
        let hit = db
            .match_entry("cache-v1", "GET", "https://example.com/app.js")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.body, b"new");
    }

    #[tokio::test]
    async fn test_delete_generation_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();
        db.put_entry("cache-v1", &make_entry("https://example.com/app.js", b"a"))
            .await
            .unwrap();

        assert!(db.delete_generation("cache-v1").await.unwrap());
        assert!(db.list_generations().await.unwrap().is_empty());

        // Entries went with the generation row.
        db.open_generation("cache-v1").await.unwrap();
        assert_eq!(db.entry_count("cache-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(!db.delete_generation("cache-v9").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("cache-v1").await.unwrap();
        db.open_generation("cache-v2").await.unwrap();

        let names = db.list_generations().await.unwrap();
        assert_eq!(names, vec!["cache-v1".to_string(), "cache-v2".to_string()]);
    }
}
