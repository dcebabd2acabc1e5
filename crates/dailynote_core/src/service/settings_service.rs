//! Configuration editing use-cases.
//!
//! # Responsibility
//! - Edit the ordered copy-pair list (append, move, remove, replace).
//! - Update any top-level field from a raw value.
//!
//! # Invariants
//! - Every successful edit is persisted before returning.
//! - Out-of-range pair indices are errors; moving past either end is a no-op.
//! - Field names are the persisted camelCase keys.

use crate::model::settings::{CopyPair, Settings};
use crate::repo::settings_repo::{
    settings_to_object, SettingsError, SettingsRepository, SettingsResult,
};
use log::info;
use serde_json::Value;

/// Use-case service wrapper over a settings repository.
pub struct SettingsService<R: SettingsRepository> {
    repo: R,
}

impl<R: SettingsRepository> SettingsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn load(&self) -> SettingsResult<Settings> {
        self.repo.load()
    }

    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        self.repo.save(settings)
    }

    /// Appends a pair and returns the new list.
    pub fn add_pair(&self, source: &str, dest: &str) -> SettingsResult<Vec<CopyPair>> {
        self.edit_pairs("add", |pairs| {
            pairs.push(CopyPair::new(source, dest));
            Ok(())
        })
    }

    /// Swaps pair `index` with the one above it.
    pub fn move_pair_up(&self, index: usize) -> SettingsResult<Vec<CopyPair>> {
        self.edit_pairs("move_up", |pairs| {
            check_index(pairs, index)?;
            if index > 0 {
                pairs.swap(index - 1, index);
            }
            Ok(())
        })
    }

    /// Swaps pair `index` with the one below it.
    pub fn move_pair_down(&self, index: usize) -> SettingsResult<Vec<CopyPair>> {
        self.edit_pairs("move_down", |pairs| {
            check_index(pairs, index)?;
            if index + 1 < pairs.len() {
                pairs.swap(index, index + 1);
            }
            Ok(())
        })
    }

    pub fn remove_pair(&self, index: usize) -> SettingsResult<Vec<CopyPair>> {
        self.edit_pairs("remove", |pairs| {
            check_index(pairs, index)?;
            pairs.remove(index);
            Ok(())
        })
    }

    pub fn set_pair(&self, index: usize, source: &str, dest: &str) -> SettingsResult<Vec<CopyPair>> {
        self.edit_pairs("set", |pairs| {
            check_index(pairs, index)?;
            pairs[index] = CopyPair::new(source, dest);
            Ok(())
        })
    }

    /// Sets field `name` from `raw`.
    ///
    /// `raw` is parsed as JSON; text that is not valid JSON is taken as a
    /// string, so `## Tasks` and `"## Tasks"` are equivalent.
    pub fn set_field(&self, name: &str, raw: &str) -> SettingsResult<Settings> {
        let current = self.repo.load()?;
        let mut fields = settings_to_object(&current)?;
        if !fields.contains_key(name) {
            return Err(SettingsError::UnknownField(name.to_string()));
        }

        let as_text = Value::String(raw.to_string());
        let parsed = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| as_text.clone());

        fields.insert(name.to_string(), parsed);
        let updated = match serde_json::from_value::<Settings>(Value::Object(fields.clone())) {
            Ok(updated) => updated,
            // `2024` typed for a text field.
            Err(first) => {
                fields.insert(name.to_string(), as_text);
                serde_json::from_value::<Settings>(Value::Object(fields)).map_err(|_| {
                    SettingsError::Decode {
                        field: name.to_string(),
                        message: first.to_string(),
                    }
                })?
            }
        };
        self.repo.save(&updated)?;
        info!("event=settings_set module=service status=ok field={}", name);
        Ok(updated)
    }

    fn edit_pairs(
        &self,
        action: &'static str,
        edit: impl FnOnce(&mut Vec<CopyPair>) -> SettingsResult<()>,
    ) -> SettingsResult<Vec<CopyPair>> {
        let mut settings = self.repo.load()?;
        edit(&mut settings.copy_content_headings)?;
        self.repo.save(&settings)?;
        info!(
            "event=copy_pairs_edit module=service status=ok action={} pairs={}",
            action,
            settings.copy_content_headings.len()
        );
        Ok(settings.copy_content_headings)
    }
}

fn check_index(pairs: &[CopyPair], index: usize) -> SettingsResult<()> {
    if index < pairs.len() {
        Ok(())
    } else {
        Err(SettingsError::PairIndex {
            index,
            len: pairs.len(),
        })
    }
}
