// In: src/config.rs

//! The single source of truth for lookup configuration.
//!
//! `LookupConfig` is created once at the application boundary (a JSON file, CLI
//! flags or Python keyword arguments) and then shared read-only as an
//! `Arc<LookupConfig>`. Every field has a serde default, so an empty JSON object
//! yields the reference behaviour: `excel_files/*.xlsx`, sheet `Genealogy`, a
//! two-line preamble on the work-order CSV and the fixed two-level drill-down.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenealogyError;

/// Part number whose presence among first-level matches triggers the drill-down.
pub const DEFAULT_DRILLDOWN_PART: &str = "ASI-MS-00071";

/// Part numbers reported separately inside the drill-down level.
pub const DEFAULT_SUBPARTS: [&str; 2] = ["ASI-MS-01550", "ASI-MS-01599"];

//==================================================================================
// I. Source Settings
//==================================================================================

/// Where and how the genealogy spreadsheets are read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub struct LoaderConfig {
    /// Directory scanned (non-recursively) for spreadsheet files.
    #[serde(default = "default_genealogy_dir")]
    pub directory: PathBuf,

    /// File extension that marks a candidate file, without the dot.
    /// Compared case-insensitively.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the worksheet read from every file. Matched exactly.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            directory: default_genealogy_dir(),
            extension: default_extension(),
            sheet_name: default_sheet_name(),
        }
    }
}

/// Where and how the work-order/operator CSV is read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub struct AuxConfig {
    #[serde(default = "default_aux_path")]
    pub path: PathBuf,

    /// Boilerplate lines preceding the header row.
    #[serde(default = "default_skip_lines")]
    pub skip_lines: usize,
}

impl Default for AuxConfig {
    fn default() -> Self {
        Self {
            path: default_aux_path(),
            skip_lines: default_skip_lines(),
        }
    }
}

//==================================================================================
// II. Traversal Plan
//==================================================================================

/// One drill-down step.
///
/// The first row (in table order) of the current level whose `Part No` equals
/// `part_no` supplies the serial number used as the parent key for the next
/// level. Within that next level, rows for each of `subparts` are reported
/// separately.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TraversalStep {
    pub part_no: String,
    #[serde(default)]
    pub subparts: Vec<String>,
}

impl TraversalStep {
    pub fn new(part_no: impl Into<String>, subparts: &[&str]) -> Self {
        Self {
            part_no: part_no.into(),
            subparts: subparts.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// An ordered chain of drill-down steps. An empty plan disables drill-down.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TraversalPlan {
    pub steps: Vec<TraversalStep>,
}

impl TraversalPlan {
    pub fn new(steps: Vec<TraversalStep>) -> Self {
        Self { steps }
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

// The two-level traversal: parent -> ASI-MS-00071 -> {ASI-MS-01550, ASI-MS-01599}.
impl Default for TraversalPlan {
    fn default() -> Self {
        Self {
            steps: vec![TraversalStep::new(DEFAULT_DRILLDOWN_PART, &DEFAULT_SUBPARTS)],
        }
    }
}

//==================================================================================
// III. The Unified LookupConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LookupConfig {
    #[serde(default)]
    pub genealogy: LoaderConfig,

    #[serde(default)]
    pub aux: AuxConfig,

    #[serde(default)]
    pub traversal: TraversalPlan,
}

impl LookupConfig {
    /// Reads a JSON config file and validates it.
    pub fn from_json_file(path: &Path) -> Result<Self, GenealogyError> {
        let text = fs::read_to_string(path)?;
        let config: LookupConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GenealogyError> {
        let extension = self.genealogy.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(GenealogyError::InvalidConfig(
                "genealogy.extension must not be empty".to_string(),
            ));
        }
        if self.genealogy.sheet_name.is_empty() {
            return Err(GenealogyError::InvalidConfig(
                "genealogy.sheet_name must not be empty".to_string(),
            ));
        }
        for (idx, step) in self.traversal.steps.iter().enumerate() {
            if step.part_no.trim().is_empty() {
                return Err(GenealogyError::InvalidConfig(format!(
                    "traversal.steps[{}].part_no must not be empty",
                    idx
                )));
            }
        }
        Ok(())
    }
}

fn default_genealogy_dir() -> PathBuf {
    PathBuf::from("excel_files")
}

fn default_extension() -> String {
    "xlsx".to_string()
}

fn default_sheet_name() -> String {
    "Genealogy".to_string()
}

fn default_aux_path() -> PathBuf {
    PathBuf::from("work_orders.csv")
}

fn default_skip_lines() -> usize {
    2
}
