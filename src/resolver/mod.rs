// In: src/resolver/mod.rs

//! Genealogy resolution: exact-match filtering plus the designated-part drill-down.
//!
//! The walk is driven by a [`TraversalPlan`]. With the default plan it is the
//! fixed two-level lookup:
//!
//! ```text
//!   query ──(Parent Serial No == query)──────────────► level 1
//!     level 1 ∋ first row with Part No == ASI-MS-00071 ─► child serial
//!   child ──(Parent Serial No == child, whole table)──► level 2
//!     level 2 split by Part No ∈ {ASI-MS-01550, ASI-MS-01599}
//! ```
//!
//! Absence of data at any stage is an empty result, never an error. The only
//! error path is an Arrow kernel failure.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::TraversalPlan;
use crate::error::GenealogyError;
use crate::table::{GenealogyRecord, GenealogyTable, PARENT_SERIAL_NO, PART_NO, SERIAL_NO};

//==================================================================================
// 1. Result Types
//==================================================================================

/// Rows of one designated sub-part inside a drill-down level.
#[derive(Debug, Clone)]
pub struct SubpartMatch {
    pub part_no: String,
    pub rows: GenealogyTable,
}

/// One completed drill-down step.
#[derive(Debug, Clone)]
pub struct Drilldown {
    /// The designated part number that triggered this step.
    pub via_part: String,
    /// Serial number of the first designated row; the parent key of `matches`.
    pub child_serial: String,
    /// How many rows of the previous level carried `via_part`. Anything above one
    /// means the first was chosen.
    pub candidate_count: usize,
    /// Every row of the full table whose `Parent Serial No` is `child_serial`.
    pub matches: GenealogyTable,
    /// Per designated sub-part subsets of `matches`, in plan order.
    pub subparts: Vec<SubpartMatch>,
}

impl Drilldown {
    pub fn subpart(&self, part_no: &str) -> Option<&GenealogyTable> {
        self.subparts
            .iter()
            .find(|s| s.part_no == part_no)
            .map(|s| &s.rows)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidate_count > 1
    }
}

/// The outcome of resolving one parent serial number.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The trimmed query.
    pub query: String,
    pub level1: GenealogyTable,
    /// Completed drill-down steps, outermost first. Empty when the first
    /// designated part was not found (or the plan has no steps).
    pub drilldowns: Vec<Drilldown>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.level1.is_empty()
    }

    /// The first drill-down level, if the designated part was found.
    pub fn drilldown(&self) -> Option<&Drilldown> {
        self.drilldowns.first()
    }

    /// A serialisable view of this resolution.
    pub fn to_view(&self) -> ResolutionView {
        ResolutionView {
            query: self.query.clone(),
            matches: self.level1.records(),
            drilldown: DrilldownView::chain(&self.drilldowns),
        }
    }
}

//==================================================================================
// 2. Serialisable Views
//==================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubpartView {
    pub part_no: String,
    pub records: Vec<GenealogyRecord>,
}

/// A drill-down level as plain records. `next` holds the following level when
/// the plan has more than one step.
#[derive(Debug, Clone, Serialize)]
pub struct DrilldownView {
    pub via_part: String,
    pub child_serial: String,
    pub candidate_count: usize,
    pub subparts: Vec<SubpartView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<DrilldownView>>,
}

impl DrilldownView {
    fn chain(levels: &[Drilldown]) -> Option<DrilldownView> {
        let (first, rest) = levels.split_first()?;
        Some(DrilldownView {
            via_part: first.via_part.clone(),
            child_serial: first.child_serial.clone(),
            candidate_count: first.candidate_count,
            subparts: first
                .subparts
                .iter()
                .map(|s| SubpartView {
                    part_no: s.part_no.clone(),
                    records: s.rows.records(),
                })
                .collect(),
            next: DrilldownView::chain(rest).map(Box::new),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionView {
    pub query: String,
    pub matches: Vec<GenealogyRecord>,
    pub drilldown: Option<DrilldownView>,
}

//==================================================================================
// 3. Resolution
//==================================================================================

/// Resolves `parent_serial` against `table` following `plan`.
///
/// The query is trimmed; stored values are compared untouched. An empty query
/// is the caller's to reject; here it simply matches rows whose parent serial is
/// the empty string.
pub fn resolve(
    table: &GenealogyTable,
    parent_serial: &str,
    plan: &TraversalPlan,
) -> Result<Resolution, GenealogyError> {
    let query = parent_serial.trim();
    let level1 = table.filter_eq(PARENT_SERIAL_NO, query)?;
    log::debug!("resolve '{}': {} level-1 row(s)", query, level1.num_rows());

    let mut drilldowns: Vec<Drilldown> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(query.to_string());
    let mut current = level1.clone();

    for step in &plan.steps {
        if current.is_empty() {
            break;
        }
        let candidates = current.filter_eq(PART_NO, &step.part_no)?;
        if candidates.is_empty() {
            log::debug!("resolve '{}': no '{}' row, drill-down stops", query, step.part_no);
            break;
        }
        let Some(child_serial) = candidates.value(0, SERIAL_NO).map(str::to_string) else {
            log::warn!(
                "resolve '{}': first '{}' row has no Serial No, drill-down stops",
                query,
                step.part_no
            );
            break;
        };
        if candidates.num_rows() > 1 {
            log::warn!(
                "resolve '{}': {} rows carry part '{}'; using the first (serial '{}')",
                query,
                candidates.num_rows(),
                step.part_no,
                child_serial
            );
        }
        if !visited.insert(child_serial.clone()) {
            log::warn!(
                "resolve '{}': serial '{}' already visited, stopping to avoid a cycle",
                query,
                child_serial
            );
            break;
        }

        let matches = table.filter_eq(PARENT_SERIAL_NO, &child_serial)?;
        let subparts = step
            .subparts
            .iter()
            .map(|part_no| {
                Ok(SubpartMatch {
                    part_no: part_no.clone(),
                    rows: matches.filter_eq(PART_NO, part_no)?,
                })
            })
            .collect::<Result<Vec<_>, GenealogyError>>()?;

        drilldowns.push(Drilldown {
            via_part: step.part_no.clone(),
            child_serial,
            candidate_count: candidates.num_rows(),
            matches: matches.clone(),
            subparts,
        });
        current = matches;
    }

    Ok(Resolution {
        query: query.to_string(),
        level1,
        drilldowns,
    })
}
