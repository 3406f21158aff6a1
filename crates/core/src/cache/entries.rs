//! Namespace and entry operations for the SQLite store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::CacheStore;
use super::connection::SqliteStore;
use super::hash::compute_cache_key;
use crate::Error;
use crate::model::Response;

const SELECT_ENTRY: &str = "SELECT e.status, e.status_text, e.headers_json, e.body FROM entries e";

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u16, String, String, Vec<u8>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_response((status, status_text, headers_json, body): (u16, String, String, Vec<u8>)) -> Result<Response, Error> {
    let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;
    Ok(Response { status, status_text, headers, body: Bytes::from(body) })
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![namespace, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, namespace: &str, url: &str) -> Result<Option<Response>, Error> {
        let namespace = namespace.to_string();
        let key = compute_cache_key("GET", url);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} WHERE e.namespace = ?1 AND e.key = ?2"))?;
                match stmt.query_row(params![namespace, key], row_to_response) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(decode_response).transpose()
    }

    /// Insert or update an entry.
    ///
    /// Uses UPSERT semantics so a later navigation fetch replaces the
    /// previous copy under the same key.
    async fn put(&self, namespace: &str, url: &str, response: &Response) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let url = url.to_string();
        let key = compute_cache_key("GET", &url);
        let headers_json = serde_json::to_string(&response.headers)?;
        let status = response.status;
        let status_text = response.status_text.clone();
        let body = response.body.to_vec();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![&namespace, &now],
                )?;
                tx.execute(
                    "INSERT INTO entries (namespace, key, url, status, status_text, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(namespace, key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![&namespace, &key, &url, status, &status_text, &headers_json, &body, &now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_any(&self, url: &str) -> Result<Option<Response>, Error> {
        let key = compute_cache_key("GET", url);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_ENTRY} JOIN namespaces n ON n.name = e.namespace
                     WHERE e.key = ?1 ORDER BY n.rowid ASC LIMIT 1"
                ))?;
                match stmt.query_row(params![key], row_to_response) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(decode_response).transpose()
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Entries go with their namespace via `ON DELETE CASCADE`.
    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![namespace])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
