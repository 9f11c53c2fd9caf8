//! Capture-state store
//!
//! Persists one boolean per (version, creature) in a SQLite database and
//! fans toggles out to every registered UI surface sharing the key.
//!
//! Key scheme: exactly one, applied uniformly — `"{version}:{creature_id}"`,
//! global per creature with no location component. A creature caught once in
//! a version is caught everywhere that version shows it, so popup rows and
//! list rows always agree.
//!
//! Broadcast goes through an explicit registry (key → surface handles), not
//! a scan of the rendered tree: `toggle` flips the checked and dimmed state
//! of every bound surface synchronously before returning. The view reads
//! surface states back when it rebuilds.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult};

use crate::data::model::Version;

/// Compose the storage key for a (version, creature) pair.
pub fn capture_key(version: Version, creature_id: &str) -> String {
    format!("{}:{}", version.key(), creature_id)
}

/// Handle to one rendered checkbox surface (a popup row or a list row).
pub type SurfaceId = u64;

/// Render state of one bound surface: the checkbox indicator and the paired
/// row-dimming effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceState {
    pub checked: bool,
    pub dimmed: bool,
}

/// The capture-flag store: SQLite persistence, an in-memory cache so render
/// never blocks on the database, and the broadcast registry.
pub struct CaptureStore {
    conn: Connection,
    db_path: PathBuf,
    /// key → caught, loaded once at open and kept current by `toggle`.
    cache: HashMap<String, bool>,
    /// key → surfaces currently bound to it.
    registry: HashMap<String, Vec<SurfaceId>>,
    surfaces: HashMap<SurfaceId, SurfaceState>,
    next_surface: SurfaceId,
}

impl CaptureStore {
    /// Open the store at its platform data path:
    /// - Linux: ~/.local/share/dex-atlas/captures.db
    /// - macOS: ~/Library/Application Support/dex-atlas/captures.db
    /// - Windows: %APPDATA%\dex-atlas\captures.db
    pub fn new() -> SqlResult<Self> {
        let db_path = Self::get_db_path();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;
        println!("📁 Capture database at: {}", db_path.display());

        Self::from_connection(conn, db_path)
    }

    /// Open the store over an arbitrary connection (tests use temp files).
    pub fn from_connection(conn: Connection, db_path: PathBuf) -> SqlResult<Self> {
        let mut store = CaptureStore {
            conn,
            db_path,
            cache: HashMap::new(),
            registry: HashMap::new(),
            surfaces: HashMap::new(),
            next_surface: 0,
        };
        store.init_schema()?;
        store.load_cache()?;
        Ok(store)
    }

    /// Get the path where the database should be stored
    fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("dex-atlas");
        path.push("captures.db");
        path
    }

    /// Initialize the database schema.
    fn init_schema(&mut self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS captures (
                key         TEXT PRIMARY KEY,
                caught      INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Add caught_at column if it doesn't exist (for existing databases)
        // This is safe - if the column exists, the ALTER is silently ignored
        let _ = self
            .conn
            .execute("ALTER TABLE captures ADD COLUMN caught_at TEXT", []);

        Ok(())
    }

    /// Load every persisted flag into the cache.
    fn load_cache(&mut self) -> SqlResult<()> {
        let mut stmt = self.conn.prepare("SELECT key, caught FROM captures")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
        })?;

        let mut cache = HashMap::new();
        for row in rows {
            let (key, caught) = row?;
            cache.insert(key, caught);
        }
        drop(stmt);
        self.cache = cache;

        Ok(())
    }

    /// Whether a key is currently marked caught.
    pub fn is_caught(&self, key: &str) -> bool {
        self.cache.get(key).copied().unwrap_or(false)
    }

    /// Number of creatures marked caught in a version.
    pub fn caught_count(&self, version: Version) -> usize {
        let prefix = format!("{}:", version.key());
        self.cache
            .iter()
            .filter(|(key, &caught)| caught && key.starts_with(&prefix))
            .count()
    }

    /// Persist a toggle and broadcast it to every bound surface.
    ///
    /// Idempotent: toggling the same value twice leaves exactly one row. A
    /// storage write failure is logged and ignored (the in-memory state and
    /// the broadcast still go through).
    pub fn toggle(&mut self, key: &str, caught: bool) {
        let caught_at: Option<String> = caught.then(|| Utc::now().to_rfc3339());

        let result = self.conn.execute(
            "INSERT INTO captures (key, caught, caught_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET caught = ?2, caught_at = ?3",
            rusqlite::params![key, caught as i64, caught_at],
        );
        if let Err(e) = result {
            eprintln!("⚠️  Failed to persist capture flag {}: {:?}", key, e);
        }

        self.cache.insert(key.to_string(), caught);
        self.broadcast(key, caught);
    }

    /// Read a flag straight from the database, bypassing the cache.
    /// Round-trip checks and fresh loads go through here.
    pub fn persisted(&self, key: &str) -> SqlResult<Option<bool>> {
        let mut stmt = self
            .conn
            .prepare("SELECT caught FROM captures WHERE key = ?1")?;
        let mut rows = stmt.query_map([key], |row| row.get::<_, i64>(0))?;
        match rows.next() {
            Some(value) => Ok(Some(value? != 0)),
            None => Ok(None),
        }
    }

    // ========== Surface registry ==========

    /// Bind a new UI surface to a key. The surface starts out reflecting the
    /// current flag.
    pub fn register_surface(&mut self, key: &str) -> SurfaceId {
        let id = self.next_surface;
        self.next_surface += 1;

        let caught = self.is_caught(key);
        self.surfaces.insert(
            id,
            SurfaceState {
                checked: caught,
                dimmed: caught,
            },
        );
        self.registry.entry(key.to_string()).or_default().push(id);
        id
    }

    /// Drop every binding; called when the view is rebuilt from scratch.
    pub fn clear_surfaces(&mut self) {
        self.registry.clear();
        self.surfaces.clear();
    }

    pub fn surface(&self, id: SurfaceId) -> SurfaceState {
        self.surfaces.get(&id).copied().unwrap_or_default()
    }

    /// Fan a toggle out to every surface bound to the key, synchronously.
    /// Only the registry is walked, never the whole rendered tree.
    fn broadcast(&mut self, key: &str, caught: bool) {
        let Some(ids) = self.registry.get(key) else {
            return;
        };
        for id in ids {
            if let Some(state) = self.surfaces.get_mut(id) {
                state.checked = caught;
                state.dimmed = caught;
            }
        }
    }
}

impl std::fmt::Debug for CaptureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStore")
            .field("db_path", &self.db_path)
            .field("flags", &self.cache.len())
            .field("surfaces", &self.surfaces.len())
            .finish()
    }
}
