use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;

/// Values a [`SnapshotMap`] can persist. Conversion from JSON is lenient:
/// entries that do not convert are dropped on load rather than failing it.
pub trait SnapshotValue: Clone + Send + Sync + 'static {
    fn to_json(&self) -> serde_json::Value;
    fn from_json(value: serde_json::Value) -> Option<Self>;
}

/// State codes. Snapshots written by other tools may store them as floats.
impl SnapshotValue for i64 {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(*self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_json(value: serde_json::Value) -> Option<Self> {
        let serde_json::Value::Number(n) = value else {
            return None;
        };
        n.as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    }
}

/// Descriptive job fields keyed by field name.
pub type PropertySnapshot = BTreeMap<String, String>;

impl SnapshotValue for PropertySnapshot {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
                .collect(),
        )
    }

    fn from_json(value: serde_json::Value) -> Option<Self> {
        let serde_json::Value::Object(map) = value else {
            return None;
        };
        Some(
            map.into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        )
    }
}

struct Entries<V> {
    map: HashMap<String, V>,
    /// Set by every mutation, cleared by the flusher. Lives under the same
    /// lock as the map so a check never races a write.
    dirty: bool,
}

/// Thread-safe string-keyed map mirrored to a JSON snapshot file.
///
/// Reads share the lock; writes, deletes, loads and dirty-flag changes take
/// it exclusively. Snapshots only observe, so they hold the read lock while
/// encoding and release it before touching the disk.
pub struct SnapshotMap<V> {
    inner: RwLock<Entries<V>>,
}

/// Last reported state code per job identity.
pub type JobStateStore = SnapshotMap<i64>;

/// Creation-time properties per job identity.
pub type PropertyCache = SnapshotMap<PropertySnapshot>;

impl<V: SnapshotValue> Default for SnapshotMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SnapshotValue> SnapshotMap<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Entries {
                map: HashMap::new(),
                dirty: false,
            }),
        }
    }

    /// Create a map seeded from `path`. A missing or corrupt snapshot is
    /// logged and yields an empty map.
    pub fn open(path: &Path) -> Self {
        let store = Self::new();
        match store.load_from(path) {
            Ok(count) => {
                tracing::info!(path = %path.display(), entries = count, "snapshot loaded");
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(path = %path.display(), "no snapshot found, starting empty");
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot unreadable, starting empty");
            }
        }
        store
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Entries<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Entries<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read(&self, key: &str) -> Option<V> {
        self.read_guard().map.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_guard().map.contains_key(key)
    }

    pub fn write(&self, key: impl Into<String>, value: V) {
        let mut entries = self.write_guard();
        entries.map.insert(key.into(), value);
        entries.dirty = true;
    }

    /// Remove `key`. Marks the map dirty even when the key was absent.
    pub fn delete(&self, key: &str) -> Option<V> {
        let mut entries = self.write_guard();
        entries.dirty = true;
        entries.map.remove(key)
    }

    pub fn is_dirty(&self) -> bool {
        self.read_guard().dirty
    }

    pub fn clear_dirty(&self) {
        self.write_guard().dirty = false;
    }

    pub fn len(&self) -> usize {
        self.read_guard().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().map.is_empty()
    }

    /// Encode the current contents as a JSON object.
    ///
    /// # Errors
    /// Returns `StoreError::Serialization` if encoding fails.
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .read_guard()
            .map
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Ok(serde_json::to_string(&object)?)
    }

    /// Rewrite the snapshot file with the current contents.
    ///
    /// The file is written next to `path` and renamed over it, so readers
    /// never observe a partial snapshot.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be written or renamed.
    pub fn snapshot_to(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json_string()?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        std::fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }

    /// Replace the contents with the snapshot at `path`.
    ///
    /// The map is only replaced when the file holds a JSON object; on any
    /// error the prior contents stay in place. Entries whose values do not
    /// convert are skipped. Returns the number of entries loaded.
    ///
    /// # Errors
    /// Returns `StoreError::Io`, `StoreError::Parse` or
    /// `StoreError::NotAnObject` and leaves the map untouched.
    pub fn load_from(&self, path: &Path) -> Result<usize, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let serde_json::Value::Object(object) = value else {
            return Err(StoreError::NotAnObject(path.to_path_buf()));
        };

        let mut map = HashMap::with_capacity(object.len());
        for (key, raw) in object {
            match V::from_json(raw) {
                Some(v) => {
                    map.insert(key, v);
                }
                None => tracing::warn!(key = %key, "skipping unconvertible snapshot entry"),
            }
        }

        let count = map.len();
        let mut entries = self.write_guard();
        entries.map = map;
        entries.dirty = false;
        Ok(count)
    }
}

/// Flush-side view of a snapshot map, used by the flusher to drive any
/// number of maps with different value types.
pub trait Persist: Send + Sync {
    fn is_dirty(&self) -> bool;
    fn clear_dirty(&self);
    fn snapshot_to(&self, path: &Path) -> Result<(), StoreError>;
}

impl<V: SnapshotValue> Persist for SnapshotMap<V> {
    fn is_dirty(&self) -> bool {
        SnapshotMap::is_dirty(self)
    }

    fn clear_dirty(&self) {
        SnapshotMap::clear_dirty(self);
    }

    fn snapshot_to(&self, path: &Path) -> Result<(), StoreError> {
        SnapshotMap::snapshot_to(self, path)
    }
}
