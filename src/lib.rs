//! This file is the root of the `serial_genealogy` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules of the library (`loader`, `resolver`,
//!     `session`, etc.) and re-exporting the types most callers need.
//! 2.  Defining the `#[pymodule]` which acts as the main entry point when the
//!     library is built with the `python` feature and imported into Python.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod observability;
pub mod resolver;
pub mod session;
pub mod table;

#[cfg(feature = "python")]
mod ffi;

#[cfg(test)]
mod test_support;

pub use cache::SnapshotCache;
pub use config::{AuxConfig, LoaderConfig, LookupConfig, TraversalPlan, TraversalStep};
pub use error::GenealogyError;
pub use loader::{load_aux_index, load_genealogy, AuxIndex, FileReadWarning};
pub use lookup::lookup_aux;
pub use resolver::{resolve, Resolution};
pub use session::{SearchResult, Session, Snapshot};
pub use table::{GenealogyRecord, GenealogyTable, WorkOrderRecord};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `serial_genealogy` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn serial_genealogy(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::python::PySession>()?;

    // --- Expose the custom error types ---
    let py = m.py();
    m.add(
        "MissingDataError",
        py.get_type_bound::<pyo3::exceptions::PyFileNotFoundError>(),
    )?;
    m.add(
        "GenealogyError",
        py.get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    // --- Turn on logging for loader and resolver diagnostics ---
    m.add_function(wrap_pyfunction!(ffi::python::enable_verbose_logging_py, m)?)?;

    Ok(())
}
