// In: src/cache.rs

//! A process-local cache of loaded snapshots.
//!
//! Entries are keyed by the source settings (`LoaderConfig`, `AuxConfig`) and
//! guarded by a [`Fingerprint`] of the files behind them: the sorted candidate
//! spreadsheets and the work-order CSV, each with its size and modification
//! time. A lookup re-stats the files; any difference triggers a fresh load.
//! Failed loads are never stored.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use hashbrown::HashMap;

use crate::config::{AuxConfig, LoaderConfig, LookupConfig};
use crate::error::GenealogyError;
use crate::loader::candidate_files;
use crate::session::Snapshot;

//==================================================================================
// I. Fingerprints
//==================================================================================

/// Size and modification time of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    /// `None` when the file cannot be stat'ed.
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub genealogy: Vec<FileStamp>,
    pub aux: Option<FileStamp>,
}

impl Fingerprint {
    /// Stats the sources named by `config`. `None` when the genealogy directory
    /// cannot be listed; such a state is never considered fresh.
    pub fn capture(genealogy: &LoaderConfig, aux: &AuxConfig) -> Option<Self> {
        let files = candidate_files(&genealogy.directory, &genealogy.extension).ok()?;
        let stamps = files.iter().filter_map(|path| FileStamp::of(path)).collect();
        Some(Self {
            genealogy: stamps,
            aux: FileStamp::of(&aux.path),
        })
    }
}

//==================================================================================
// II. The Cache
//==================================================================================

#[derive(Debug)]
struct CacheEntry {
    fingerprint: Fingerprint,
    snapshot: Arc<Snapshot>,
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<(LoaderConfig, AuxConfig), CacheEntry>,
    hits: u64,
    misses: u64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot for `config` if its sources are unchanged,
    /// otherwise loads, stores and returns a new one.
    pub fn get_or_load(&mut self, config: &LookupConfig) -> Result<Arc<Snapshot>, GenealogyError> {
        let key = (config.genealogy.clone(), config.aux.clone());
        let fingerprint = Fingerprint::capture(&config.genealogy, &config.aux);

        if let (Some(current), Some(entry)) = (fingerprint.as_ref(), self.entries.get(&key)) {
            if entry.fingerprint == *current {
                self.hits += 1;
                log::debug!(
                    "snapshot cache hit for '{}'",
                    config.genealogy.directory.display()
                );
                return Ok(Arc::clone(&entry.snapshot));
            }
        }

        self.misses += 1;
        log::info!(
            "loading genealogy snapshot from '{}'",
            config.genealogy.directory.display()
        );
        let snapshot = match Snapshot::load(config) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                self.entries.remove(&key);
                return Err(err);
            }
        };

        match fingerprint {
            Some(fingerprint) => {
                self.entries.insert(
                    key,
                    CacheEntry {
                        fingerprint,
                        snapshot: Arc::clone(&snapshot),
                    },
                );
            }
            None => {
                self.entries.remove(&key);
            }
        }
        Ok(snapshot)
    }

    /// Drops the entry for `config`. Returns whether one existed.
    pub fn invalidate(&mut self, config: &LookupConfig) -> bool {
        self.entries
            .remove(&(config.genealogy.clone(), config.aux.clone()))
            .is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_aux_csv, write_genealogy_xlsx};
    use std::fs;

    fn setup() -> (tempfile::TempDir, LookupConfig) {
        let dir = tempfile::tempdir().unwrap();
        let excel = dir.path().join("excel_files");
        fs::create_dir(&excel).unwrap();
        write_genealogy_xlsx(&excel.join("a.xlsx"), &[["TOP", "S1", "ASI-MS-00071", "S2"]]);
        let mut config = LookupConfig::default();
        config.genealogy.directory = excel;
        config.aux.path = dir.path().join("work_orders.csv");
        (dir, config)
    }

    #[test]
    fn test_unchanged_sources_hit_the_cache() {
        let (_dir, config) = setup();
        let mut cache = SnapshotCache::new();

        let first = cache.get_or_load(&config).unwrap();
        let second = cache.get_or_load(&config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_new_file_invalidates_entry() {
        let (_dir, config) = setup();
        let mut cache = SnapshotCache::new();
        let first = cache.get_or_load(&config).unwrap();
        assert_eq!(first.genealogy().num_rows(), 1);

        write_genealogy_xlsx(
            &config.genealogy.directory.join("b.xlsx"),
            &[["TOP", "S9", "ASI-MS-01550", "S10"]],
        );
        let second = cache.get_or_load(&config).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.genealogy().num_rows(), 2);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_aux_file_appearing_invalidates_entry() {
        let (_dir, config) = setup();
        let mut cache = SnapshotCache::new();
        let first = cache.get_or_load(&config).unwrap();
        assert!(first.aux_error().is_some());

        write_aux_csv(&config.aux.path, &[["S1", "WO-1", "Dana"]]);
        let second = cache.get_or_load(&config).unwrap();

        assert!(second.aux_error().is_none());
        assert_eq!(second.aux_index().len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LookupConfig::default();
        config.genealogy.directory = dir.path().join("excel_files");
        config.aux.path = dir.path().join("work_orders.csv");
        let mut cache = SnapshotCache::new();

        assert!(matches!(
            cache.get_or_load(&config),
            Err(GenealogyError::MissingData { .. })
        ));
        assert!(cache.is_empty());

        fs::create_dir(&config.genealogy.directory).unwrap();
        write_genealogy_xlsx(
            &config.genealogy.directory.join("a.xlsx"),
            &[["TOP", "S1", "ASI-MS-00071", "S2"]],
        );
        assert!(cache.get_or_load(&config).is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (_dir, config) = setup();
        let mut cache = SnapshotCache::new();
        cache.get_or_load(&config).unwrap();

        assert!(cache.invalidate(&config));
        assert!(!cache.invalidate(&config));
        cache.get_or_load(&config).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 2);
    }
}
