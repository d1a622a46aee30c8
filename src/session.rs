// In: src/session.rs

//! The query-facing facade.
//!
//! A `Session` owns one immutable [`Snapshot`] (the loaded genealogy table, the
//! work-order index and the load diagnostics) and answers queries against it.
//! Loading happens once, in [`Session::open`] or through a [`SnapshotCache`];
//! queries never touch the filesystem.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::SnapshotCache;
use crate::config::LookupConfig;
use crate::error::GenealogyError;
use crate::loader::{load_aux_index, load_genealogy, AuxIndex, FileReadWarning};
use crate::lookup::lookup_aux;
use crate::resolver::{resolve, DrilldownView, Resolution};
use crate::table::{GenealogyRecord, GenealogyTable, WorkOrderRecord};

//==================================================================================
// I. Snapshot
//==================================================================================

/// Everything one load cycle produced. Immutable once built.
#[derive(Debug)]
pub struct Snapshot {
    genealogy: GenealogyTable,
    aux: AuxIndex,
    aux_error: Option<GenealogyError>,
    warnings: Vec<FileReadWarning>,
    files_loaded: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Builds a snapshot from tables that are already in memory.
    pub fn new(genealogy: GenealogyTable, aux: AuxIndex) -> Self {
        Self {
            genealogy,
            aux,
            aux_error: None,
            warnings: Vec::new(),
            files_loaded: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Runs both loaders.
    ///
    /// `MissingData` from the genealogy loader is returned as is. A failing
    /// work-order index is kept as `aux_error` and replaced by an empty index.
    pub fn load(config: &LookupConfig) -> Result<Self, GenealogyError> {
        let genealogy = load_genealogy(&config.genealogy.directory, &config.genealogy)?;

        let (aux, aux_error) = match load_aux_index(&config.aux.path, &config.aux) {
            Ok(index) => (index, None),
            Err(err) => {
                log::warn!("{}; continuing with genealogy search only", err);
                (AuxIndex::empty(), Some(err))
            }
        };

        Ok(Self {
            genealogy: genealogy.table,
            aux,
            aux_error,
            warnings: genealogy.warnings,
            files_loaded: genealogy.files_loaded,
            loaded_at: Utc::now(),
        })
    }

    pub fn genealogy(&self) -> &GenealogyTable {
        &self.genealogy
    }

    pub fn aux_index(&self) -> &AuxIndex {
        &self.aux
    }

    pub fn aux_error(&self) -> Option<&GenealogyError> {
        self.aux_error.as_ref()
    }

    pub fn warnings(&self) -> &[FileReadWarning] {
        &self.warnings
    }

    pub fn files_loaded(&self) -> &[String] {
        &self.files_loaded
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

//==================================================================================
// II. Search Result
//==================================================================================

/// The answer to one query, as plain records.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub matches: Vec<GenealogyRecord>,
    pub drilldown: Option<DrilldownView>,
    pub workorder: Option<WorkOrderRecord>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

//==================================================================================
// III. Session
//==================================================================================

#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<LookupConfig>,
    snapshot: Arc<Snapshot>,
}

impl Session {
    /// Validates the config and loads fresh tables.
    pub fn open(config: Arc<LookupConfig>) -> Result<Self, GenealogyError> {
        config.validate()?;
        let snapshot = Arc::new(Snapshot::load(&config)?);
        Ok(Self { config, snapshot })
    }

    /// Like [`Session::open`], reusing the cached snapshot while the source files
    /// are unchanged.
    pub fn open_cached(
        config: Arc<LookupConfig>,
        cache: &mut SnapshotCache,
    ) -> Result<Self, GenealogyError> {
        config.validate()?;
        let snapshot = cache.get_or_load(&config)?;
        Ok(Self { config, snapshot })
    }

    pub fn from_snapshot(config: Arc<LookupConfig>, snapshot: Arc<Snapshot>) -> Self {
        Self { config, snapshot }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn warnings(&self) -> &[FileReadWarning] {
        self.snapshot.warnings()
    }

    pub fn aux_error(&self) -> Option<&GenealogyError> {
        self.snapshot.aux_error()
    }

    /// Resolves a parent serial with the configured traversal plan.
    /// `None` for a blank query.
    pub fn resolve(&self, parent_serial: &str) -> Result<Option<Resolution>, GenealogyError> {
        if parent_serial.trim().is_empty() {
            return Ok(None);
        }
        resolve(
            self.snapshot.genealogy(),
            parent_serial,
            &self.config.traversal,
        )
        .map(Some)
    }

    /// Full query: genealogy matches, drill-down and the work order for the same
    /// serial. `None` for a blank query.
    pub fn search(&self, parent_serial: &str) -> Result<Option<SearchResult>, GenealogyError> {
        let Some(resolution) = self.resolve(parent_serial)? else {
            return Ok(None);
        };
        let workorder = lookup_aux(self.snapshot.aux_index(), &resolution.query);
        let view = resolution.to_view();
        Ok(Some(SearchResult {
            query: view.query,
            matches: view.matches,
            drilldown: view.drilldown,
            workorder,
        }))
    }
}
