//! A durable key-value store backed by a directory of JSON files.
//!
//! Every key maps to exactly one file (see [`key_to_file_name`]). Writes land in a uniquely named
//! sibling file first and are then renamed into place, so a reader never observes a half-written
//! entry.

use super::path_utils::key_to_file_name;
use crate::Result;
use core::sync::atomic::{AtomicU64, Ordering};
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     store";

static WRITE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`, whether or not it exists.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key_to_file_name(key))
    }

    /// Create the store directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).into_app_err_with(|| format!("creating store directory '{}'", self.dir.display()))
    }

    /// Read and deserialize the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, and an error when the entry exists but cannot be
    /// read or parsed.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).into_app_err_with(|| format!("opening store entry '{}'", path.display())),
        };

        let value = serde_json::from_reader(BufReader::new(file))
            .into_app_err_with(|| format!("parsing store entry '{}'", path.display()))?;
        Ok(Some(value))
    }

    /// Serialize `value` and store it under `key`, replacing any previous entry.
    pub fn put<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_dir()?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            WRITE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let write_result = Self::write_json(&tmp_path, value);
        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &path).into_app_err_with(|| format!("replacing store entry '{}'", path.display()))?;
        log::trace!(target: LOG_TARGET, "Stored '{key}' in '{}'", path.display());
        Ok(())
    }

    /// Delete the entry stored under `key`. Deleting an absent key succeeds.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::trace!(target: LOG_TARGET, "Removed '{key}'");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).into_app_err_with(|| format!("removing store entry '{}'", path.display())),
        }
    }

    fn write_json<T>(path: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let file = File::create(path).into_app_err_with(|| format!("creating store file '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);

        #[cfg(debug_assertions)]
        let result = serde_json::to_writer_pretty(&mut writer, value);
        #[cfg(not(debug_assertions))]
        let result = serde_json::to_writer(&mut writer, value);

        result.into_app_err_with(|| format!("writing store file '{}'", path.display()))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing store file '{}'", path.display()))
    }
}
