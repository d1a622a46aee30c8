// In: src/ffi/python.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::pyarrow::ToPyArrow;
use log::LevelFilter;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use serde_json::Value;

use crate::cache::SnapshotCache;
use crate::config::LookupConfig;
use crate::observability;
use crate::session::Session;

//==================================================================================
// I. Stateful Session API
//==================================================================================

#[pyclass(name = "Session", module = "serial_genealogy")]
pub struct PySession {
    inner: Session,
    cache: SnapshotCache,
}

#[pymethods]
impl PySession {
    /// Loads the genealogy spreadsheets and the work-order CSV.
    ///
    /// Keyword arguments override the matching fields of `config_file` (or of the
    /// defaults when no file is given). Raises `FileNotFoundError` when no
    /// genealogy data can be read; a missing work-order file only sets
    /// `aux_error`.
    #[new]
    #[pyo3(signature = (
        data_dir = None,
        aux_file = None,
        config_file = None,
        sheet_name = None
    ))]
    fn new(
        data_dir: Option<PathBuf>,
        aux_file: Option<PathBuf>,
        config_file: Option<PathBuf>,
        sheet_name: Option<String>,
    ) -> PyResult<Self> {
        let mut config = match config_file {
            Some(path) => LookupConfig::from_json_file(&path)?,
            None => LookupConfig::default(),
        };
        if let Some(dir) = data_dir {
            config.genealogy.directory = dir;
        }
        if let Some(path) = aux_file {
            config.aux.path = path;
        }
        if let Some(sheet) = sheet_name {
            config.genealogy.sheet_name = sheet;
        }

        let mut cache = SnapshotCache::new();
        let inner = Session::open_cached(Arc::new(config), &mut cache)?;
        Ok(Self { inner, cache })
    }

    /// Looks up one parent serial number.
    ///
    /// Returns `None` for a blank query, otherwise a dict with `query`,
    /// `matches`, `drilldown` and `workorder`.
    pub fn search(&self, py: Python, serial: &str) -> PyResult<Option<PyObject>> {
        let Some(result) = self.inner.search(serial)? else {
            return Ok(None);
        };
        let value = serde_json::to_value(&result).map_err(crate::error::GenealogyError::from)?;
        Ok(Some(json_to_py(py, &value)?))
    }

    /// Re-reads the sources if any file changed since the last load.
    pub fn reload(&mut self) -> PyResult<bool> {
        let config = Arc::new(self.inner.config().clone());
        let before = Arc::clone(self.inner.snapshot());
        self.inner = Session::open_cached(config, &mut self.cache)?;
        Ok(!Arc::ptr_eq(&before, self.inner.snapshot()))
    }

    /// Per-file read problems from the last load, as display strings.
    #[getter]
    pub fn warnings(&self) -> Vec<String> {
        self.inner.warnings().iter().map(|w| w.to_string()).collect()
    }

    #[getter]
    pub fn aux_error(&self) -> Option<String> {
        self.inner.aux_error().map(|e| e.to_string())
    }

    #[getter]
    pub fn files_loaded(&self) -> Vec<String> {
        self.inner.snapshot().files_loaded().to_vec()
    }

    #[getter]
    pub fn loaded_at(&self) -> String {
        self.inner.snapshot().loaded_at().to_rfc3339()
    }

    /// The unified genealogy table as a `pyarrow.RecordBatch`.
    pub fn table(&self, py: Python) -> PyResult<PyObject> {
        self.inner.snapshot().genealogy().batch().to_pyarrow(py)
    }

    fn __repr__(&self) -> String {
        format!(
            "Session(rows={}, files={}, warnings={})",
            self.inner.snapshot().genealogy().num_rows(),
            self.inner.snapshot().files_loaded().len(),
            self.inner.warnings().len()
        )
    }
}

fn json_to_py(py: Python, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into_py(py),
            None => n.as_f64().unwrap_or(f64::NAN).into_py(py),
        },
        Value::String(s) => s.into_py(py),
        Value::Array(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(json_to_py(py, item)?)?;
            }
            list.into_py(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (key, item) in map {
                dict.set_item(key, json_to_py(py, item)?)?;
            }
            dict.into_py(py)
        }
    })
}

//==================================================================================
// II. Module Functions
//==================================================================================

#[pyfunction]
#[pyo3(name = "enable_verbose_logging")]
#[pyo3(signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<String>) -> PyResult<()> {
    observability::init_logging(LevelFilter::Info, log_file.as_deref().map(Path::new))?;
    Ok(())
}
