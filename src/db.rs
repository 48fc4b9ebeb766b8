use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, Transaction, params};
use serde::{Deserialize, Serialize};

use crate::background::BackgroundStore;
use crate::categories::CategoryStore;
use crate::config::BoardConfig;
use crate::memos::MemoStore;
use crate::models::{ImagePlaceholder, Language, Memo, MemoIcon, lenient_icon};
use crate::seed::{
    BUILTIN_IMAGES, DEFAULT_BACKGROUND_COLOR, DEFAULT_BACKGROUND_OPACITY, SEED_CATEGORIES,
    SEED_MEMOS,
};

pub const MEMOS_SLOT: &str = "memos";
pub const CATEGORIES_SLOT: &str = "categories";
pub const BACKGROUND_URL_SLOT: &str = "backgroundUrl";
pub const BACKGROUND_COLOR_SLOT: &str = "backgroundColor";
pub const BACKGROUND_OPACITY_SLOT: &str = "backgroundOpacity";
pub const IMAGES_SLOT: &str = "images";
pub const LANGUAGE_SLOT: &str = "language";

/// Version written into the `memos` slot. A bare array is version 1.
pub const MEMO_SCHEMA_VERSION: u32 = 2;
const CURRENT_DB_SCHEMA_VERSION: i64 = 1;

/// Durable string-keyed storage. Every slot is read and written whole.
pub trait KeyValueStore {
    fn get(&mut self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// SQLite-backed slot table. A damaged database file is moved aside and
/// replaced with an empty one, which the loader then fills with defaults.
pub struct SqliteStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = match open_with_schema(&path) {
            Ok(conn) => conn,
            Err(err) if is_corruption_error(&err) => {
                log::warn!("database {} is corrupt, recreating: {err:#}", path.display());
                backup_corrupt_db_files(&path)?;
                open_with_schema(&path)?
            }
            Err(err) => return Err(err),
        };
        log::info!("opened slot store at {}", path.display());
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_with_recovery<T, F>(&mut self, mut operation: F) -> Result<T>
    where
        F: FnMut(&Connection) -> Result<T>,
    {
        match operation(&self.conn) {
            Ok(value) => Ok(value),
            Err(err) if is_corruption_error(&err) => {
                log::warn!("slot store corrupted during use, recreating: {err:#}");
                self.recover_connection()?;
                operation(&self.conn)
            }
            Err(err) => Err(err),
        }
    }

    fn recover_connection(&mut self) -> Result<()> {
        let stale = std::mem::replace(&mut self.conn, Connection::open_in_memory()?);
        if let Err((_, err)) = stale.close() {
            log::debug!("closing damaged slot store failed: {err}");
        }
        backup_corrupt_db_files(&self.path)?;
        self.conn = open_with_schema(&self.path)?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.run_with_recovery(|conn| {
            Ok(conn
                .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?)
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.run_with_recovery(|conn| {
            conn.execute(
                "INSERT INTO slots(key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )
            .with_context(|| format!("failed to write slot '{key}'"))?;
            Ok(())
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.run_with_recovery(|conn| {
            conn.execute("DELETE FROM slots WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

fn create_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_READ_WRITE,
    )?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}

fn open_with_schema(path: &Path) -> Result<Connection> {
    let mut conn = create_connection(path)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Renames the database and its WAL sidecars to `<name>.corrupt.<stamp>`.
fn backup_corrupt_db_files(db_file: &Path) -> Result<()> {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let sidecars = ["", "-wal", "-shm"].map(|suffix| {
        let mut name = db_file.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    });
    for file in sidecars.iter().filter(|file| file.exists()) {
        let mut backup = file.as_os_str().to_os_string();
        backup.push(format!(".corrupt.{stamp}"));
        std::fs::rename(file, &backup)
            .with_context(|| format!("failed to move aside damaged {}", file.display()))?;
        log::warn!("moved damaged {} aside", file.display());
    }
    Ok(())
}

fn is_corruption_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<rusqlite::Error>())
        .any(|sql_err| {
            matches!(
                sql_err.sqlite_error_code(),
                Some(ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase)
            )
        })
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );
        "#,
    )?;
    let mut version = get_schema_version(conn)?;

    while version < CURRENT_DB_SCHEMA_VERSION {
        let target = version + 1;
        let tx = conn.transaction()?;
        match target {
            1 => migrate_to_v1(&tx)?,
            _ => bail!("unsupported slot store migration: {target}"),
        }
        set_schema_version(&tx, target)?;
        tx.commit()?;
        log::debug!("slot store migrated to schema v{target}");
        version = target;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn
        .query_row(
            "SELECT version FROM schema_version WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0))
}

fn set_schema_version(tx: &Transaction<'_>, version: i64) -> Result<()> {
    tx.execute(
        "INSERT INTO schema_version(id, version) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET version = excluded.version",
        [version],
    )?;
    Ok(())
}

fn migrate_to_v1(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
        "#,
    )?;
    Ok(())
}

#[derive(Serialize)]
struct StoredMemosOut<'a> {
    version: u32,
    memos: &'a [Memo],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMemos {
    Versioned {
        version: u32,
        memos: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// Shape written before the slot carried a version: a single optional
/// `imageUrl`, possibly empty categories, free-form icon names.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMemo {
    id: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image_urls: Option<Vec<String>>,
    #[serde(default)]
    is_voice_memo: Option<bool>,
    #[serde(default, deserialize_with = "lenient_icon")]
    icon: Option<MemoIcon>,
    #[serde(default)]
    cover_image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LegacyMemo> for Memo {
    fn from(legacy: LegacyMemo) -> Self {
        let image_urls = legacy
            .image_urls
            .unwrap_or_else(|| legacy.image_url.into_iter().collect())
            .into_iter()
            .filter(|url| !url.is_empty())
            .collect();
        Memo {
            id: legacy.id,
            title: legacy.title,
            content: legacy.content,
            category: legacy.category.filter(|c| !c.is_empty()),
            image_urls,
            is_voice_memo: legacy.is_voice_memo.unwrap_or(false),
            icon: legacy.icon,
            cover_image_url: legacy.cover_image_url.filter(|c| !c.is_empty()),
            created_at: legacy.created_at,
        }
    }
}

pub fn encode_memos(memos: &[Memo]) -> Result<String> {
    let stored = StoredMemosOut {
        version: MEMO_SCHEMA_VERSION,
        memos,
    };
    serde_json::to_string(&stored).context("failed to serialize memos")
}

pub fn decode_memos(raw: &str) -> Result<Vec<Memo>> {
    let stored: StoredMemos = serde_json::from_str(raw).context("memos slot is not valid JSON")?;
    let (version, records) = match stored {
        StoredMemos::Versioned { version, memos } => (version, memos),
        StoredMemos::Legacy(memos) => (1, memos),
    };

    let memos = match version {
        1 => {
            log::debug!("migrating {} memos from schema v1", records.len());
            records
                .into_iter()
                .map(|record| serde_json::from_value::<LegacyMemo>(record).map(Memo::from))
                .collect::<serde_json::Result<Vec<_>>>()
                .context("legacy memo record is malformed")?
        }
        MEMO_SCHEMA_VERSION => records
            .into_iter()
            .map(serde_json::from_value::<Memo>)
            .collect::<serde_json::Result<Vec<_>>>()
            .context("memo record is malformed")?,
        newer => bail!("memos slot has unknown schema version {newer}"),
    };

    Ok(dedupe_ids(memos))
}

fn dedupe_ids(memos: Vec<Memo>) -> Vec<Memo> {
    let mut seen = HashSet::new();
    memos
        .into_iter()
        .filter(|memo| {
            let fresh = seen.insert(memo.id.clone());
            if !fresh {
                log::warn!("dropping memo with duplicate id {}", memo.id);
            }
            fresh
        })
        .collect()
}

/// The stores as reconstructed at startup.
pub struct LoadedState {
    pub memos: MemoStore,
    pub categories: CategoryStore,
    pub background: BackgroundStore,
}

/// Write-through bridge between the in-memory stores and a `KeyValueStore`.
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Opens the configured SQLite file, or runs in memory when it cannot
    /// be opened.
    pub fn open(config: &BoardConfig) -> Self {
        let Some(path) = &config.db_path else {
            log::warn!("no data directory available; memos will not survive a restart");
            return Self::in_memory();
        };
        match SqliteStore::open(path) {
            Ok(store) => Self::new(Box::new(store)),
            Err(err) => {
                log::warn!(
                    "slot store at {} is unavailable, running in memory: {err:#}",
                    path.display()
                );
                Self::in_memory()
            }
        }
    }

    pub fn load(&mut self) -> LoadedState {
        let memos = self
            .load_slot(MEMOS_SLOT, decode_memos)
            .unwrap_or_else(|| SEED_MEMOS.clone());
        let categories = self
            .load_slot(CATEGORIES_SLOT, |raw| Ok(serde_json::from_str::<Vec<String>>(raw)?))
            .unwrap_or_else(|| SEED_CATEGORIES.clone());
        let background_url = self.load_slot(BACKGROUND_URL_SLOT, |raw| Ok(raw.to_string()));
        let background_color = self
            .load_slot(BACKGROUND_COLOR_SLOT, |raw| Ok(raw.to_string()))
            .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());
        let opacity = self
            .load_slot(BACKGROUND_OPACITY_SLOT, parse_opacity)
            .unwrap_or(DEFAULT_BACKGROUND_OPACITY);
        let images = self
            .load_slot(IMAGES_SLOT, |raw| {
                Ok(serde_json::from_str::<Vec<ImagePlaceholder>>(raw)?)
            })
            .unwrap_or_else(|| BUILTIN_IMAGES.clone());
        let language = self
            .load_slot(LANGUAGE_SLOT, |raw| {
                raw.parse::<Language>().map_err(anyhow::Error::msg)
            })
            .unwrap_or_default();

        LoadedState {
            memos: MemoStore::new(memos),
            categories: CategoryStore::new(categories),
            background: BackgroundStore::new(
                background_url,
                background_color,
                opacity,
                images,
                language,
            ),
        }
    }

    fn load_slot<T, F>(&mut self, key: &str, parse: F) -> Option<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        match self.store.get(key) {
            Ok(Some(raw)) => match parse(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    log::warn!("slot '{key}' is unreadable, using defaults: {err:#}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("slot '{key}' could not be read, using defaults: {err:#}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.set(key, value).inspect_err(|err| {
            log::warn!("failed to persist slot '{key}': {err:#}");
        })
    }

    pub fn save_memos(&mut self, memos: &[Memo]) -> Result<()> {
        let encoded = encode_memos(memos)?;
        self.write(MEMOS_SLOT, &encoded)
    }

    pub fn save_categories(&mut self, categories: &[String]) -> Result<()> {
        let encoded = serde_json::to_string(categories).context("failed to serialize categories")?;
        self.write(CATEGORIES_SLOT, &encoded)
    }

    pub fn save_background_url(&mut self, url: Option<&str>) -> Result<()> {
        self.write(BACKGROUND_URL_SLOT, url.unwrap_or_default())
    }

    pub fn save_background_color(&mut self, color: &str) -> Result<()> {
        self.write(BACKGROUND_COLOR_SLOT, color)
    }

    pub fn save_background_opacity(&mut self, opacity: f32) -> Result<()> {
        self.write(BACKGROUND_OPACITY_SLOT, &opacity.to_string())
    }

    pub fn save_images(&mut self, images: &[ImagePlaceholder]) -> Result<()> {
        let encoded = serde_json::to_string(images).context("failed to serialize images")?;
        self.write(IMAGES_SLOT, &encoded)
    }

    pub fn save_language(&mut self, language: Language) -> Result<()> {
        self.write(LANGUAGE_SLOT, language.code())
    }

    /// Drops every slot so the next load starts from defaults.
    pub fn clear(&mut self) -> Result<()> {
        for key in [
            MEMOS_SLOT,
            CATEGORIES_SLOT,
            BACKGROUND_URL_SLOT,
            BACKGROUND_COLOR_SLOT,
            BACKGROUND_OPACITY_SLOT,
            IMAGES_SLOT,
            LANGUAGE_SLOT,
        ] {
            self.store.remove(key)?;
        }
        Ok(())
    }
}

fn parse_opacity(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        bail!("opacity '{raw}' is not finite");
    }
    Ok(value)
}
