//! Configuration record persistence.
//!
//! # Responsibility
//! - Load the configuration record as stored fields merged over defaults.
//! - Save every top-level field, atomically.
//!
//! # Invariants
//! - One row per top-level field; `value` holds the field's JSON encoding.
//! - Stored keys unknown to this binary are ignored on load, never an error.
//! - A save either persists all fields or none.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::settings::Settings;
use log::debug;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while reading, writing or editing the configuration record.
#[derive(Debug)]
pub enum SettingsError {
    Db(DbError),
    /// A stored field value is not valid JSON.
    Decode { field: String, message: String },
    Encode(serde_json::Error),
    /// Stored fields decoded but do not form a valid record.
    InvalidData(String),
    /// `set_field` named a field the record does not have.
    UnknownField(String),
    /// A copy-pair index is out of range.
    PairIndex { index: usize, len: usize },
    /// Connection was opened without the current schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Decode { field, message } => {
                write!(f, "stored setting `{field}` is not valid JSON: {message}")
            }
            Self::Encode(err) => write!(f, "cannot encode settings: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored settings: {message}"),
            Self::UnknownField(name) => write!(f, "unknown settings field `{name}`"),
            Self::PairIndex { index, len } => {
                write!(f, "copy pair index {index} out of range (have {len})")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "settings connection not migrated: expected schema {expected_version}, found {actual_version}"
            ),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SettingsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the configuration record.
pub trait SettingsRepository {
    fn load(&self) -> SettingsResult<Settings>;
    fn save(&self, settings: &Settings) -> SettingsResult<()>;
}

impl<T: SettingsRepository + ?Sized> SettingsRepository for &T {
    fn load(&self) -> SettingsResult<Settings> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> SettingsResult<()> {
        (**self).save(settings)
    }
}

/// SQLite-backed settings store.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> SettingsResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(SettingsError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load(&self) -> SettingsResult<Settings> {
        let mut fields = settings_to_object(&Settings::default())?;

        let mut stmt = self.conn.prepare("SELECT key, value FROM settings;")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, raw) = row?;
            if !fields.contains_key(&key) {
                debug!(
                    "event=settings_load module=repo status=skip reason=unknown_key key={}",
                    key
                );
                continue;
            }
            let value: Value =
                serde_json::from_str(&raw).map_err(|err| SettingsError::Decode {
                    field: key.clone(),
                    message: err.to_string(),
                })?;
            fields.insert(key, value);
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|err| SettingsError::InvalidData(err.to_string()))
    }

    fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let fields = settings_to_object(settings)?;
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO settings (key, value)
                 VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
            )?;
            for (key, value) in &fields {
                stmt.execute(params![key, value.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Serializes the record to its top-level JSON object.
pub(crate) fn settings_to_object(settings: &Settings) -> SettingsResult<Map<String, Value>> {
    match serde_json::to_value(settings).map_err(SettingsError::Encode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(SettingsError::InvalidData(format!(
            "settings serialized to non-object `{other}`"
        ))),
    }
}
