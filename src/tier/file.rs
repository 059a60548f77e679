//! Filesystem Tier
//!
//! Durable cache storing one JSON file per key. The file name is the hex
//! SHA-256 digest of the key followed by [`FILE_SUFFIX`], so keys of any
//! length map to one fixed-length portable name. The key itself lives in the
//! record.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::tier::Tier;

/// Suffix of every record file.
pub const FILE_SUFFIX: &str = ".cache";

#[derive(Debug, Serialize, Deserialize)]
struct FileRecord<V> {
    key: String,
    value: V,
    /// None = never expires
    exp: Option<DateTime<Utc>>,
}

/// Record header read when listing keys; the value is never decoded.
#[derive(Deserialize)]
struct RecordKey {
    key: String,
}

// == FileSystem Cache ==
/// String-keyed cache persisted under a directory.
///
/// Operations block on disk I/O. Several handles may share one directory.
#[derive(Debug)]
pub struct FileSystemCache<V> {
    dir: PathBuf,
    ttl: Option<Duration>,
    tmp_seq: AtomicU64,
    _marker: PhantomData<fn() -> V>,
}

impl<V> FileSystemCache<V>
where
    V: Serialize + DeserializeOwned,
{
    // == Open ==
    /// Opens (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            ttl: None,
            tmp_seq: AtomicU64::new(0),
            _marker: PhantomData,
        })
    }

    /// Records stored from now on expire after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl).filter(|ttl| !ttl.is_zero());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // == Path For ==
    /// File holding `key`'s record.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", file_stem(key), FILE_SUFFIX))
    }

    // == Load ==
    /// Reads the record for `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` for a live record
    /// - `Err(CacheError::Expired)` the first time an expired record is read;
    ///   the file is removed so later reads miss
    /// - `Ok(None)` when no file exists
    pub fn load(&self, key: &str) -> Result<Option<V>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let record: FileRecord<V> = serde_json::from_slice(&bytes).map_err(|err| {
            warn!(path = %path.display(), error = %err, "Undecodable cache record");
            CacheError::from(err)
        })?;

        if record.exp.is_some_and(|exp| Utc::now() > exp) {
            remove_if_exists(&path)?;
            debug!(key = %key, "File record expired");
            return Err(CacheError::Expired(key.to_string()));
        }

        Ok(Some(record.value))
    }

    // == Store ==
    /// Writes `key`'s record atomically (temp file + rename).
    pub fn store(&self, key: &str, value: V) -> Result<()> {
        // A deadline past chrono's range never expires.
        let exp = self.ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        });

        let record = FileRecord {
            key: key.to_string(),
            value,
            exp,
        };
        let bytes = serde_json::to_vec(&record)?;

        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{}.{}.{}.tmp", file_stem(key), std::process::id(), seq));
        fs::write(&tmp, bytes)?;
        if let Err(err) = fs::rename(&tmp, self.path_for(key)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    // == Delete ==
    pub fn delete(&self, key: &str) -> Result<()> {
        remove_if_exists(&self.path_for(key))
    }

    // == Keys ==
    /// Keys of every record file in the directory, expired ones included.
    ///
    /// Undecodable records are skipped with a warning.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(FILE_SUFFIX));
            if !is_record {
                continue;
            }

            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                // Deleted by another handle while listing
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            match serde_json::from_slice::<RecordKey>(&bytes) {
                Ok(record) => keys.push(record.key),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping undecodable cache record"),
            }
        }
        Ok(keys)
    }

    // == Purge ==
    /// Removes every record file.
    pub fn purge(&self) -> Result<()> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }
}

impl<V> Tier<String, V> for FileSystemCache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self, key: &String) -> Result<Option<V>> {
        FileSystemCache::load(self, key)
    }

    fn store(&self, key: String, value: V) -> Result<()> {
        FileSystemCache::store(self, &key, value)
    }

    fn delete(&self, key: &String) -> Result<()> {
        FileSystemCache::delete(self, key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        FileSystemCache::keys(self)
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn file_stem(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
