// Day-keyed disk cache for listing results.
// Each calendar day gets its own directory; older directories are removed on open.

use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{ErrorContext, Result};

const DIR_PREFIX: &str = "cachedir_";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Identifies a memoized call: function name plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    function: String,
    args: Vec<String>,
}

impl CacheKey {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// File name of the entry, e.g. `alfred_list_pages__AbCDeFGH.json`.
    ///
    /// Arguments are escaped down to `[A-Za-z0-9-]` and `%XX`, so they never
    /// contain the `__` separator and distinct arguments give distinct names.
    pub fn file_name(&self) -> String {
        let mut name = escape_name(&self.function, &['_']);
        for arg in &self.args {
            name.push_str("__");
            name.push_str(&escape_name(arg, &[]));
        }
        name.push_str(".json");
        name
    }
}

/// Wrapper for cached data with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

/// Cache rooted at `root`, storing today's entries in `root/cachedir_<date>`
#[derive(Debug, Clone)]
pub struct DayCache {
    root: PathBuf,
    today: NaiveDate,
}

impl DayCache {
    /// Open today's cache and delete every older dated directory under `root`
    pub fn open(root: impl Into<PathBuf>, clock: &dyn Clock) -> Result<Self> {
        let cache = Self {
            root: root.into(),
            today: clock.today(),
        };
        cache.sweep_stale()?;
        Ok(cache)
    }

    /// Directory name used for `date`
    pub fn dir_name(date: NaiveDate) -> String {
        format!("{DIR_PREFIX}{}", date.format(DATE_FORMAT))
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(Self::dir_name(self.today))
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir().join(key.file_name())
    }

    /// Read an entry, `None` when it has not been written today
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .coda_cache_err(format!("Failed to read {}", path.display()))?;
        let cached: CachedData<T> = serde_json::from_str(&contents)
            .coda_cache_err(format!("Corrupt cache entry {}", path.display()))?;
        Ok(Some(cached.data))
    }

    pub fn write<T: Serialize>(&self, key: &CacheKey, data: &T) -> Result<()> {
        let path = self.entry_path(key);
        let cached = CachedData {
            data,
            cached_at: Utc::now(),
        };
        let json = serde_json::to_string(&cached)?;
        write_atomic(&path, json.as_bytes())
            .coda_cache_err(format!("Failed to write {}", path.display()))
    }

    /// Return today's entry for `key`, or run `fetch` and store its result.
    ///
    /// Errors from `fetch` are returned as-is and nothing is stored. A result
    /// that cannot be written to disk is still returned.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.read::<T>(key) {
            Ok(Some(data)) => {
                tracing::debug!(entry = %key.file_name(), "cache hit");
                return Ok(data);
            }
            Ok(None) => tracing::debug!(entry = %key.file_name(), "cache miss"),
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable cache entry"),
        }

        let data = fetch().await?;
        if let Err(e) = self.write(key, &data) {
            tracing::warn!(error = %e, "unable to cache result to disk");
        }
        Ok(data)
    }

    /// Remove today's directory
    pub fn clear(&self) -> Result<()> {
        let dir = self.dir();
        remove_dir(&dir).coda_cache_err(format!("Failed to remove {}", dir.display()))
    }

    /// Delete dated cache directories older than today. Returns how many were removed.
    fn sweep_stale(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).coda_cache_err(format!(
                    "Failed to list cache root {}",
                    self.root.display()
                ));
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(parse_dir_date) else {
                continue;
            };
            if date >= self.today || !entry.path().is_dir() {
                continue;
            }

            let path = entry.path();
            remove_dir(&path).coda_cache_err(format!("Failed to remove {}", path.display()))?;
            tracing::info!(path = %path.display(), "removed stale cache directory");
            removed += 1;
        }

        Ok(removed)
    }
}

fn parse_dir_date(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(DIR_PREFIX)?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Missing directories count as removed; another process may have beaten us to it
fn remove_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}

/// Percent-escapes every UTF-8 byte outside `[A-Za-z0-9-]` and `keep`
fn escape_name(name: &str, keep: &[char]) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || keep.contains(&c) {
            out.push(c);
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}
