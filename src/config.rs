use crate::backup::{self, BackupInfo};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_ICON: &str = "icons/default.png";
/// Number of rotating backups kept by the pre-save snapshot.
pub const MAX_BACKUPS: usize = 10;

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

/// One launchable entry of a category. `name` and `path` are required in the
/// document; `icon` and `workdir` are defaulted when absent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LaunchItem {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub path: String,
    #[serde(default)]
    pub workdir: String,
}

impl LaunchItem {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: default_icon(),
            path: path.into(),
            workdir: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub items: Vec<LaunchItem>,
}

/// The root configuration document. A root object without a `categories` key
/// decodes to an empty list rather than an error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Config {
    /// The document written on first run when no configuration exists yet.
    pub fn default_document() -> Self {
        Self {
            categories: vec![Category {
                name: "系统工具".into(),
                items: vec![
                    LaunchItem::new("任务管理器", "taskmgr.exe"),
                    LaunchItem::new("记事本", "notepad.exe"),
                ],
            }],
        }
    }
}

/// Owner of the in-memory configuration document for the process lifetime.
///
/// Mutation commands validate and persist synchronously, reporting success as
/// a boolean. The panel reacts to the result and prompts the user; this store
/// never does.
pub struct ConfigStore {
    config_path: PathBuf,
    backup_dir: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Load the store from `path`. This never fails: a missing file is seeded
    /// with the default document, a corrupt one is preserved beside the
    /// original (`<file>.backup_<stamp>`) and replaced in memory only.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let config_path = path.into();
        let backup_dir = config_path
            .parent()
            .map(|dir| dir.join(backup::BACKUP_DIR))
            .unwrap_or_else(|| PathBuf::from(backup::BACKUP_DIR));
        let mut store = Self {
            config_path,
            backup_dir,
            config: Config::default(),
        };
        store.reload();
        store
    }

    /// Re-read the document from disk, discarding unsaved in-memory state.
    pub fn reload(&mut self) {
        match read_document(&self.config_path) {
            Ok(config) => self.config = config,
            Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "no configuration at {}, writing defaults",
                    self.config_path.display()
                );
                self.config = Config::default_document();
                self.save();
            }
            Err(err @ ConfigError::Io(_)) => {
                tracing::error!("failed to read configuration: {err}");
                self.config = Config::default_document();
            }
            Err(err) => {
                // Parse or shape error: keep the broken file for inspection
                // and continue with defaults in memory. The file on disk is
                // only replaced by an explicit later save.
                tracing::error!("configuration is corrupt: {err}");
                if let Err(err) = backup::forensic_copy(&self.config_path) {
                    tracing::warn!("could not back up corrupt configuration: {err}");
                }
                self.config = Config::default_document();
            }
        }
    }

    /// Persist the document over `config_path`, taking a rotating snapshot of
    /// the previous on-disk state first.
    pub fn save(&self) -> bool {
        if let Err(err) = backup::snapshot(&self.config_path, &self.backup_dir, MAX_BACKUPS) {
            tracing::warn!("pre-save backup failed: {err}");
        }
        match self.write_to(&self.config_path) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("failed to save configuration: {err}");
                false
            }
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn categories(&self) -> &[Category] {
        &self.config.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.config.categories.iter().find(|c| c.name == name)
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.config.categories.iter_mut().find(|c| c.name == name)
    }

    /// Append an empty category. Names are case-sensitive and unique.
    pub fn add_category(&mut self, name: &str) -> bool {
        if name.is_empty() {
            tracing::warn!("refusing to add category with empty name");
            return false;
        }
        if self.category(name).is_some() {
            tracing::warn!("category '{name}' already exists");
            return false;
        }
        self.config.categories.push(Category {
            name: name.to_string(),
            items: Vec::new(),
        });
        self.save()
    }

    /// Rename a category in place. Renaming onto a *different* existing
    /// category is rejected; renaming onto itself is a no-op that succeeds.
    pub fn rename_category(&mut self, old: &str, new: &str) -> bool {
        if new.is_empty() {
            return false;
        }
        if old != new && self.category(new).is_some() {
            tracing::warn!("category '{new}' already exists");
            return false;
        }
        match self.category_mut(old) {
            Some(category) => {
                category.name = new.to_string();
                self.save()
            }
            None => false,
        }
    }

    /// Remove a category and everything in it.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let before = self.config.categories.len();
        self.config.categories.retain(|c| c.name != name);
        if self.config.categories.len() == before {
            return false;
        }
        self.save()
    }

    /// Append `item` to an existing category. Item names are unique within
    /// their category; an empty icon is replaced with the default.
    pub fn add_item(&mut self, category: &str, mut item: LaunchItem) -> bool {
        if item.name.is_empty() || item.path.is_empty() {
            tracing::warn!("refusing to add item without name or path");
            return false;
        }
        if item.icon.is_empty() {
            item.icon = default_icon();
        }
        let Some(target) = self.category_mut(category) else {
            tracing::warn!("category '{category}' does not exist");
            return false;
        };
        if target.items.iter().any(|i| i.name == item.name) {
            tracing::warn!("item '{}' already exists in '{category}'", item.name);
            return false;
        }
        target.items.push(item);
        self.save()
    }

    /// Replace the item named `item_name` wholesale, including its name.
    pub fn update_item(&mut self, category: &str, item_name: &str, mut new_item: LaunchItem) -> bool {
        if new_item.name.is_empty() || new_item.path.is_empty() {
            return false;
        }
        if new_item.icon.is_empty() {
            new_item.icon = default_icon();
        }
        let Some(target) = self.category_mut(category) else {
            return false;
        };
        if new_item.name != item_name && target.items.iter().any(|i| i.name == new_item.name) {
            tracing::warn!("item '{}' already exists in '{category}'", new_item.name);
            return false;
        }
        let Some(slot) = target.items.iter_mut().find(|i| i.name == item_name) else {
            return false;
        };
        *slot = new_item;
        self.save()
    }

    pub fn delete_item(&mut self, category: &str, item_name: &str) -> bool {
        let Some(target) = self.category_mut(category) else {
            return false;
        };
        let Some(pos) = target.items.iter().position(|i| i.name == item_name) else {
            return false;
        };
        target.items.remove(pos);
        self.save()
    }

    /// Move an item from one category to the end of another as one persisted
    /// state transition. Both ends are checked before the item is detached, so
    /// a failed move never loses it.
    pub fn move_item(&mut self, from: &str, to: &str, item_name: &str) -> bool {
        let categories = &self.config.categories;
        let Some(from_idx) = categories.iter().position(|c| c.name == from) else {
            return false;
        };
        let Some(to_idx) = categories.iter().position(|c| c.name == to) else {
            return false;
        };
        let Some(item_idx) = categories[from_idx]
            .items
            .iter()
            .position(|i| i.name == item_name)
        else {
            return false;
        };
        let item = self.config.categories[from_idx].items.remove(item_idx);
        self.config.categories[to_idx].items.push(item);
        self.save()
    }

    /// Write the in-memory document to an arbitrary path, independent of the
    /// primary storage location. No backup is taken.
    pub fn export_config(&self, path: impl AsRef<Path>) -> bool {
        match self.write_to(path.as_ref()) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("failed to export configuration: {err}");
                false
            }
        }
    }

    /// Replace the current document with the one at `path` and persist it.
    ///
    /// The import is strict: the file must hold a JSON object with a
    /// `categories` key. Rejection leaves memory and disk untouched. On
    /// success the previous on-disk state is snapshotted by the pre-save
    /// backup inside [`ConfigStore::save`] before being overwritten.
    pub fn import_config(&mut self, path: impl AsRef<Path>) -> bool {
        let imported = match read_import(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("import of {} rejected: {err}", path.as_ref().display());
                return false;
            }
        };
        self.config = imported;
        self.save()
    }

    /// Rotating backups of the primary document, newest first.
    pub fn backups(&self) -> Vec<BackupInfo> {
        backup::list_backups(&self.backup_dir)
    }

    pub fn restore_backup(&mut self, path: impl AsRef<Path>) -> bool {
        self.import_config(path)
    }

    fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Lenient read used by [`ConfigStore::load`]: a missing `categories` key is
/// tolerated, everything else about the shape is checked at decode time.
fn read_document(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    decode_document(&content, false)
}

/// Strict read used by [`ConfigStore::import_config`]: the `categories` key
/// itself must be present.
fn read_import(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    decode_document(&content, true)
}

fn decode_document(content: &str, require_categories: bool) -> Result<Config, ConfigError> {
    let root: serde_json::Value = serde_json::from_str(content)?;
    let Some(map) = root.as_object() else {
        return Err(ConfigError::Validation("root must be a JSON object".into()));
    };
    if require_categories && !map.contains_key("categories") {
        return Err(ConfigError::Validation(
            "document has no `categories` key".into(),
        ));
    }
    serde_json::from_value(root).map_err(|err| ConfigError::Validation(err.to_string()))
}
