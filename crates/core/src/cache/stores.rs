//! Versioned cache store operations.
//!
//! A store is a named generation of cached responses. The worker opens the
//! store for its version on install, populates it in one transaction, and
//! deletes every other generation on activate.

use super::connection::CacheDb;
use super::hash::request_key;
use crate::{Error, Request, Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Summary of one store generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoreInfo {
    pub name: String,
    /// Set once population committed.
    pub ready: bool,
    pub entry_count: i64,
    pub created_at: String,
}

/// Metadata of a stored entry, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryInfo {
    pub store_name: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub size: i64,
    pub stored_at: String,
}

fn decode_headers(json: &str) -> Vec<(String, String)> {
    serde_json::from_str(json).unwrap_or_default()
}

impl CacheDb {
    /// Create the named store, or mark an existing one not ready.
    ///
    /// A reopened store keeps its entries but only becomes ready again once
    /// [`populate_store`](Self::populate_store) commits.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_stores (name, ready, created_at) VALUES (?1, 0, ?2)
                     ON CONFLICT(name) DO UPDATE SET ready = 0",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write every entry into the named store and mark it ready, atomically.
    ///
    /// Either all entries land and the store becomes ready, or nothing
    /// changes. Entries with the same request identity are replaced.
    pub async fn populate_store(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<usize, Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;

                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(Error::InvalidState(format!("store {name} has not been opened")));
                }

                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO cache_entries (
                            store_name, request_key, method, url, response_url,
                            status, status_text, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                        ON CONFLICT(store_name, request_key) DO UPDATE SET
                            response_url = excluded.response_url,
                            status = excluded.status,
                            status_text = excluded.status_text,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;

                    for (request, response) in &entries {
                        let headers_json = serde_json::to_string(&response.headers)
                            .map_err(|e| Error::InvalidInput(format!("unencodable headers: {e}")))?;
                        stmt.execute(params![
                            &name,
                            request_key(&request.method, &request.url),
                            &request.method,
                            request.url.as_str(),
                            &response.url,
                            response.status,
                            &response.status_text,
                            headers_json,
                            &response.body,
                            &now,
                        ])?;
                    }
                }

                tx.execute("UPDATE cache_stores SET ready = 1 WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Find a stored response for the request across all stores, oldest
    /// store first.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(&request.method, &request.url);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let result = conn.query_row(
                    "SELECT e.response_url, e.status, e.status_text, e.headers_json, e.body
                     FROM cache_entries e
                     JOIN cache_stores s ON s.name = e.store_name
                     WHERE e.request_key = ?1
                     ORDER BY s.rowid ASC
                     LIMIT 1",
                    params![key],
                    |row| {
                        Ok(Response {
                            url: row.get(0)?,
                            status: row.get(1)?,
                            status_text: row.get(2)?,
                            headers: decode_headers(&row.get::<_, String>(3)?),
                            body: row.get(4)?,
                        })
                    },
                );

                match result {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every store, in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the named store exists and has been populated.
    pub async fn is_ready(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let ready: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1 AND ready = 1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(ready)
            })
            .await
            .map_err(Error::from)
    }

    /// The store generation recorded by the last activation, if any.
    pub async fn active_store(&self) -> Result<Option<String>, Error> {
        self.conn
            .call(|conn| -> Result<Option<String>, Error> {
                match conn.query_row("SELECT active_store FROM worker_registration WHERE id = 1", [], |row| row.get(0)) {
                    Ok(name) => Ok(Some(name)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Record the store generation that now controls the host.
    pub async fn set_active_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO worker_registration (id, active_store, activated_at) VALUES (1, ?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET
                        active_store = excluded.active_store,
                        activated_at = excluded.activated_at",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Summaries of every store, in creation order.
    pub async fn list_stores(&self) -> Result<Vec<StoreInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.ready, s.created_at, COUNT(e.request_key)
                     FROM cache_stores s
                     LEFT JOIN cache_entries e ON e.store_name = s.name
                     GROUP BY s.name
                     ORDER BY s.rowid ASC",
                )?;
                let stores = stmt
                    .query_map([], |row| {
                        Ok(StoreInfo {
                            name: row.get(0)?,
                            ready: row.get::<_, i32>(1)? == 1,
                            created_at: row.get(2)?,
                            entry_count: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stores)
            })
            .await
            .map_err(Error::from)
    }

    /// Summary of a single store.
    pub async fn store_info(&self, name: &str) -> Result<Option<StoreInfo>, Error> {
        Ok(self.list_stores().await?.into_iter().find(|s| s.name == name))
    }

    /// Entry metadata for a store, ordered by URL.
    pub async fn list_entries(&self, name: &str) -> Result<Vec<EntryInfo>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntryInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store_name, method, url, status, headers_json, LENGTH(body), stored_at
                     FROM cache_entries WHERE store_name = ?1 ORDER BY url ASC",
                )?;
                let entries = stmt
                    .query_map(params![name], |row| {
                        let headers = decode_headers(&row.get::<_, String>(4)?);
                        Ok(EntryInfo {
                            store_name: row.get(0)?,
                            method: row.get(1)?,
                            url: row.get(2)?,
                            status: row.get(3)?,
                            content_type: headers
                                .into_iter()
                                .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                                .map(|(_, v)| v),
                            size: row.get(5)?,
                            stored_at: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }
}
