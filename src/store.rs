//! File persistence for whole databases.
//!
//! Each database lives in one file, `<save_dir>/<name>.<extension>`, written
//! by replacing a temp file so readers never see a half-written store.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec::{decode_database, encode_database};
use crate::config::StoreConfig;
use crate::database::Database;
use crate::error::{Result, StoreError};

#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Path of the file holding database `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let usable = !name.trim().is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !usable {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self
            .config
            .save_dir
            .join(format!("{}.{}", name, self.config.extension)))
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Writes `db` to its file, replacing any previous version.
    pub fn save(&self, db: &Database) -> Result<PathBuf> {
        let path = self.path_for(db.name())?;
        let tmp_path = path.with_extension(format!("{}.tmp", self.config.extension));
        fs::create_dir_all(&self.config.save_dir)?;

        let bytes = encode_database(db);
        let written = self
            .write_file(&tmp_path, &bytes)
            .and_then(|()| fs::rename(&tmp_path, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        if self.config.sync_writes {
            // best effort, the rename has already landed
            if let Ok(dir) = File::open(&self.config.save_dir) {
                let _ = dir.sync_all();
            }
        }

        info!(database = db.name(), path = %path.display(), bytes = bytes.len(), "saved database");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Database> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StoreError::DatabaseNotFound(path));
        }

        let bytes = fs::read(&path)?;
        let mut db = decode_database(&bytes)?;
        if db.name() != name {
            warn!(file = %path.display(), stored = db.name(), "database name differs from file name, using file name");
            db.set_name(name);
        }

        debug!(database = name, tables = db.len(), "loaded database");
        Ok(db)
    }

    /// Loads `name` if it has been saved before, otherwise starts a fresh
    /// empty database of that name.
    pub fn open_or_create(&self, name: &str) -> Result<Database> {
        if self.exists(name)? {
            self.load(name)
        } else {
            debug!(database = name, "no saved file, starting empty database");
            Ok(Database::new(name))
        }
    }

    /// Names of the databases saved in the configured directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = &self.config.save_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.has_store_extension(p))
            .filter_map(|p| p.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();

        debug!(dir = %dir.display(), count = names.len(), "listed databases");
        Ok(names)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(bytes)?;
        if self.config.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }

    fn has_store_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.config.extension.as_str())
            .unwrap_or(false)
    }
}
