use crate::error::Result;
use crate::link::LocationLink;
use connector_fetch::{Location, LocationId, Router, RouterId};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Router,
    Location,
    Link,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Router => "router",
            EntityKind::Location => "location",
            EntityKind::Link => "link",
        }
    }
}

/// A record that can be stored as a self-contained value under `(KIND, key)`.
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn key(&self) -> String;
}

impl Entity for Router {
    const KIND: EntityKind = EntityKind::Router;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Entity for LocationLink {
    const KIND: EntityKind = EntityKind::Link;

    fn key(&self) -> String {
        self.unique_id.clone()
    }
}

/// Key-value storage for routers, locations and location links.
///
/// Implementors only move JSON text in and out. A missing key is `Ok(None)`,
/// anything else that goes wrong is an `Err`.
pub trait EntityStore {
    fn put_value(&self, kind: EntityKind, key: &str, value: &str) -> Result<()>;

    fn get_value(&self, kind: EntityKind, key: &str) -> Result<Option<String>>;

    fn put<E: Entity>(&self, entity: &E) -> Result<()> {
        let value = serde_json::to_string(entity)?;
        self.put_value(E::KIND, &entity.key(), &value)
    }

    fn get<E: Entity>(&self, key: &str) -> Result<Option<E>> {
        match self.get_value(E::KIND, key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    fn router(&self, id: RouterId) -> Result<Option<Router>> {
        self.get(&id.to_string())
    }

    fn location(&self, id: LocationId) -> Result<Option<Location>> {
        self.get(&id.to_string())
    }

    fn link(&self, unique_id: &str) -> Result<Option<LocationLink>> {
        self.get(unique_id)
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entities (
    kind TEXT NOT NULL CHECK(kind IN ('router', 'location', 'link')),
    key TEXT NOT NULL,
    value TEXT NOT NULL,      -- JSON encoded record
    stored_at INTEGER NOT NULL,
    PRIMARY KEY(kind, key)
);

CREATE INDEX IF NOT EXISTS idx_entities_kind ON entities(kind);
            ",
        )?;
        Ok(())
    }

    /// Remove every stored record. Returns the number of rows deleted.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM entities", [])?)
    }

    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// All stored location links, ordered by identifier.
    pub fn list_links(&self) -> Result<Vec<LocationLink>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM entities WHERE kind = ?1 ORDER BY key")?;

        let values = stmt
            .query_map(params![EntityKind::Link.as_str()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut links = Vec::with_capacity(values.len());
        for value in values {
            links.push(serde_json::from_str(&value)?);
        }
        Ok(links)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

impl EntityStore for Database {
    fn put_value(&self, kind: EntityKind, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entities (kind, key, value, stored_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(kind, key) DO UPDATE SET value = excluded.value, stored_at = excluded.stored_at",
            params![kind.as_str(), key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn get_value(&self, kind: EntityKind, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM entities WHERE kind = ?1 AND key = ?2")?;

        let value = stmt
            .query_row(params![kind.as_str(), key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }
}
