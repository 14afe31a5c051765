//! # In-Memory Rule Store
//!
//! [`MemoryStore`] keeps each entity kind as a map of JSON documents keyed by
//! record id, plus a secondary index table. All operations are synchronous
//! under a `parking_lot::RwLock` and never hold the lock across an `.await`.
//!
//! A store opened with [`MemoryStore::open`] can be written back to its JSON
//! file with [`MemoryStore::flush`], so a command-line session keeps state
//! across runs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::kind::{active_key, EntityKind, IndexName, StoreRecord};
use crate::store::RuleStore;

/// One stored record and the index entries it contributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDoc {
    doc: serde_json::Value,
    index: Vec<(IndexName, String)>,
}

type IndexKey = (EntityKind, IndexName, String);

#[derive(Debug, Default)]
struct Tables {
    docs: HashMap<EntityKind, BTreeMap<String, StoredDoc>>,
    index: HashMap<IndexKey, BTreeSet<String>>,
}

impl Tables {
    fn insert(&mut self, kind: EntityKind, key: String, stored: StoredDoc) {
        let entries = stored.index.clone();
        let previous = self.docs.entry(kind).or_default().insert(key.clone(), stored);
        if let Some(previous) = previous {
            self.unindex(kind, &key, &previous.index);
        }
        for (name, value) in entries {
            self.index
                .entry((kind, name, value))
                .or_default()
                .insert(key.clone());
        }
    }

    fn remove(&mut self, kind: EntityKind, key: &str) -> bool {
        let removed = self.docs.get_mut(&kind).and_then(|docs| docs.remove(key));
        match removed {
            Some(stored) => {
                self.unindex(kind, key, &stored.index);
                true
            }
            None => false,
        }
    }

    fn unindex(&mut self, kind: EntityKind, key: &str, entries: &[(IndexName, String)]) {
        for (name, value) in entries {
            let index_key = (kind, *name, value.clone());
            if let Some(keys) = self.index.get_mut(&index_key) {
                keys.remove(key);
                if keys.is_empty() {
                    self.index.remove(&index_key);
                }
            }
        }
    }
}

/// Persisted form: kind name → record key → stored document.
type Snapshot = BTreeMap<String, BTreeMap<String, StoredDoc>>;

/// Thread-safe, cloneable in-memory [`RuleStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, unbacked store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`. A missing file yields an empty store;
    /// the file is created on the first [`flush`](Self::flush).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut tables = Tables::default();

        if path.exists() {
            let bytes = std::fs::read(&path).map_err(|e| {
                StoreError::unavailable(format!("cannot read {}: {e}", path.display()))
            })?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::unavailable(format!("corrupt store file {}: {e}", path.display()))
            })?;
            for (kind_name, docs) in snapshot {
                let Some(kind) = EntityKind::from_name(&kind_name) else {
                    tracing::warn!(kind = %kind_name, "skipping unknown entity kind in store file");
                    continue;
                };
                for (key, stored) in docs {
                    tables.insert(kind, key, stored);
                }
            }
            tracing::debug!(path = %path.display(), "opened rule store file");
        }

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
            path: Some(path),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the current contents to the backing file. No-op for an
    /// unbacked store. The file is replaced via a sibling temp file.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot: Snapshot = {
            let tables = self.tables.read();
            tables
                .docs
                .iter()
                .map(|(kind, docs)| (kind.as_str().to_string(), docs.clone()))
                .collect()
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::unavailable(format!("cannot encode store: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .map_err(|e| StoreError::unavailable(format!("cannot write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path).map_err(|e| {
            StoreError::unavailable(format!("cannot replace {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "flushed rule store");
        Ok(())
    }

    fn encode<R: StoreRecord>(record: &R) -> Result<(String, StoredDoc), StoreError> {
        let doc = serde_json::to_value(record).map_err(|source| StoreError::Serialization {
            kind: R::KIND,
            source,
        })?;
        let mut index = record.index_values();
        index.push((IndexName::Active, active_key(record.is_active()).to_string()));
        Ok((record.id().to_string(), StoredDoc { doc, index }))
    }

    fn decode<R: StoreRecord>(stored: &StoredDoc) -> Result<R, StoreError> {
        serde_json::from_value(stored.doc.clone()).map_err(|source| StoreError::Serialization {
            kind: R::KIND,
            source,
        })
    }
}

impl RuleStore for MemoryStore {
    async fn get_all<R: StoreRecord>(&self) -> Result<Vec<R>, StoreError> {
        let tables = self.tables.read();
        tables
            .docs
            .get(&R::KIND)
            .map(|docs| docs.values().map(Self::decode::<R>).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_by_id<R: StoreRecord>(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let tables = self.tables.read();
        tables
            .docs
            .get(&R::KIND)
            .and_then(|docs| docs.get(&id.to_string()))
            .map(Self::decode::<R>)
            .transpose()
    }

    async fn get_by_index<R: StoreRecord>(
        &self,
        index: IndexName,
        value: &str,
    ) -> Result<Vec<R>, StoreError> {
        let tables = self.tables.read();
        let Some(keys) = tables.index.get(&(R::KIND, index, value.to_string())) else {
            return Ok(Vec::new());
        };
        let Some(docs) = tables.docs.get(&R::KIND) else {
            return Ok(Vec::new());
        };
        keys.iter()
            .filter_map(|key| docs.get(key))
            .map(Self::decode::<R>)
            .collect()
    }

    async fn put<R: StoreRecord>(&self, record: R) -> Result<(), StoreError> {
        let (key, stored) = Self::encode(&record)?;
        self.tables.write().insert(R::KIND, key, stored);
        Ok(())
    }

    async fn put_batch<R: StoreRecord>(&self, records: Vec<R>) -> Result<(), StoreError> {
        let encoded = records
            .iter()
            .map(Self::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let mut tables = self.tables.write();
        for (key, stored) in encoded {
            tables.insert(R::KIND, key, stored);
        }
        Ok(())
    }

    async fn delete<R: StoreRecord>(&self, id: R::Id) -> Result<(), StoreError> {
        let key = id.to_string();
        if self.tables.write().remove(R::KIND, &key) {
            Ok(())
        } else {
            Err(StoreError::NotFound { kind: R::KIND, id: key })
        }
    }

    async fn count<R: StoreRecord>(&self) -> Result<usize, StoreError> {
        Ok(self
            .tables
            .read()
            .docs
            .get(&R::KIND)
            .map_or(0, BTreeMap::len))
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        tables.docs.clear();
        tables.index.clear();
        Ok(())
    }
}
