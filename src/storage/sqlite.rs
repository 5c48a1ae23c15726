//! SQLite-backed job and template store.
//!
//! Each row keeps the record's JSON in `body` next to the few columns queries filter and sort
//! on, so the record shape can grow without a schema migration.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use r2d2_sqlite::rusqlite::{self, OpenFlags, OptionalExtension, params};

use crate::{
    foundation::error::{SwatchError, SwatchResult},
    jobs::model::{Job, JobStatus},
    jobs::store::JobStore,
    scene::canvas::CanvasData,
    templates::model::Template,
    templates::store::TemplateStore,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    status TEXT NOT NULL,
    depends_on TEXT,
    created_at TEXT NOT NULL,
    body TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS jobs_status ON jobs(status, created_at);
CREATE INDEX IF NOT EXISTS jobs_depends_on ON jobs(depends_on);
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    master_template_id TEXT,
    created_at TEXT NOT NULL,
    body TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS templates_master ON templates(master_template_id, created_at);
";

/// Durable store shared by the polling API and the worker.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> SwatchResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|c| {
                c.busy_timeout(Duration::from_millis(5_000))?;
                c.pragma_update(None, "journal_mode", "WAL")?;
                c.execute_batch(SCHEMA)
            });
        Self::with_manager(manager, 8)
    }

    /// Private in-memory database, for tests and one-shot CLI runs.
    pub fn in_memory() -> SwatchResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|c| c.execute_batch(SCHEMA));
        // Every in-memory connection is its own database.
        Self::with_manager(manager, 1)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32) -> SwatchResult<Self> {
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(storage)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> SwatchResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(storage)
    }

    fn load_template(conn: &rusqlite::Connection, id: &str) -> SwatchResult<Option<Template>> {
        conn.query_row(
            "SELECT body FROM templates WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(storage)?
        .map(|body| decode(&body))
        .transpose()
    }

    fn store_template(conn: &rusqlite::Connection, t: &Template) -> SwatchResult<()> {
        conn.execute(
            "UPDATE templates SET body = ?2 WHERE id = ?1",
            params![t.id, encode(t)?],
        )
        .map_err(storage)?;
        Ok(())
    }

    fn with_template<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Template) -> SwatchResult<T>,
    ) -> SwatchResult<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(storage)?;
        let mut t = Self::load_template(&tx, id)?
            .ok_or_else(|| SwatchError::storage(format!("template {id} not found")))?;
        let out = f(&mut t)?;
        Self::store_template(&tx, &t)?;
        tx.commit().map_err(storage)?;
        Ok(out)
    }

    fn query_jobs(&self, sql: &str, arg: &str) -> SwatchResult<Vec<Job>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(storage)?;
        let rows = stmt
            .query_map(params![arg], |row| row.get::<_, String>(0))
            .map_err(storage)?;
        let mut out = Vec::new();
        for body in rows {
            out.push(decode(&body.map_err(storage)?)?);
        }
        Ok(out)
    }
}

fn storage(e: impl std::fmt::Display) -> SwatchError {
    SwatchError::storage(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> SwatchResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> SwatchResult<T> {
    Ok(serde_json::from_str(body)?)
}

/// Fixed-width UTC timestamp, so text order is time order.
fn sort_key(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl JobStore for SqliteStore {
    fn insert_job(&self, job: &Job) -> SwatchResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO jobs (id, shop, status, depends_on, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    job.id,
                    job.shop,
                    job.status.as_str(),
                    job.depends_on,
                    sort_key(job.created_at),
                    encode(job)?
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn get_job(&self, id: &str) -> SwatchResult<Option<Job>> {
        self.conn()?
            .query_row(
                "SELECT body FROM jobs WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(storage)?
            .map(|body| decode(&body))
            .transpose()
    }

    fn update_job(&self, job: &Job) -> SwatchResult<()> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE jobs SET status = ?2, body = ?3 WHERE id = ?1",
                params![job.id, job.status.as_str(), encode(job)?],
            )
            .map_err(storage)?;
        if changed == 0 {
            return Err(SwatchError::job_not_found(&job.id));
        }
        Ok(())
    }

    fn jobs_with_status(&self, status: JobStatus) -> SwatchResult<Vec<Job>> {
        self.query_jobs(
            "SELECT body FROM jobs WHERE status = ?1 ORDER BY created_at, id",
            status.as_str(),
        )
    }

    fn dependents_of(&self, parent_id: &str) -> SwatchResult<Vec<Job>> {
        self.query_jobs(
            "SELECT body FROM jobs WHERE depends_on = ?1 ORDER BY created_at, id",
            parent_id,
        )
    }
}

impl TemplateStore for SqliteStore {
    fn insert(&self, template: &Template) -> SwatchResult<()> {
        self.conn()?
            .execute(
                "INSERT INTO templates (id, shop, master_template_id, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    template.id,
                    template.shop,
                    template.master_template_id,
                    sort_key(template.created_at),
                    encode(template)?
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn get(&self, id: &str) -> SwatchResult<Option<Template>> {
        Self::load_template(&*self.conn()?, id)
    }

    fn update_canvas(&self, id: &str, canvas_data: CanvasData) -> SwatchResult<Template> {
        self.with_template(id, |t| {
            t.replace_canvas(canvas_data)?;
            Ok(t.clone())
        })
    }

    fn set_thumbnail(&self, id: &str, url: &str) -> SwatchResult<()> {
        self.with_template(id, |t| {
            t.set_thumbnail(url);
            Ok(())
        })
    }

    fn bind_variants(
        &self,
        id: &str,
        product_id: &str,
        variant_ids: &[String],
    ) -> SwatchResult<()> {
        self.with_template(id, |t| {
            t.bind(product_id, variant_ids.to_vec());
            Ok(())
        })
    }

    fn variants_of(&self, master_id: &str) -> SwatchResult<Vec<Template>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT body FROM templates WHERE master_template_id = ?1
                 ORDER BY created_at, id",
            )
            .map_err(storage)?;
        let rows = stmt
            .query_map(params![master_id], |row| row.get::<_, String>(0))
            .map_err(storage)?;
        let mut out = Vec::new();
        for body in rows {
            out.push(decode(&body.map_err(storage)?)?);
        }
        Ok(out)
    }

    fn delete_variants_of(&self, master_id: &str) -> SwatchResult<usize> {
        self.conn()?
            .execute(
                "DELETE FROM templates WHERE master_template_id = ?1",
                params![master_id],
            )
            .map_err(storage)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/sqlite.rs"]
mod tests;
