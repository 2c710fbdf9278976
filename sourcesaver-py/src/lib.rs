//! Python bindings for the sourcesaver Rust library.
//!
//! Exposes response extraction, the link merge rule, export formatting and
//! the accumulated search store. Records cross the boundary as plain dicts
//! shaped like their JSON form (`query`, `links`, `updatedAt`).

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use sourcesaver::config::ExtractionConfig;
use sourcesaver::core::{Block, LinkEntry};
use sourcesaver::errors::SourceSaverError;
use sourcesaver::export::{self, ExportFormat};
use sourcesaver::pipeline::Extractor;
use sourcesaver::stages;
use sourcesaver::store;

fn to_py_err(err: SourceSaverError) -> PyErr {
    match err {
        SourceSaverError::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn build_extractor(config: Option<&str>) -> PyResult<Extractor> {
    match config {
        Some(text) => ExtractionConfig::from_json_str(text)
            .and_then(Extractor::new)
            .map_err(to_py_err),
        None => Ok(Extractor::default()),
    }
}

fn to_py<T: serde::Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json = serde_json::to_value(value).map_err(|e| PyValueError::new_err(e.to_string()))?;
    json_to_py(py, &json)
}

fn from_py<T: serde::de::DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    serde_json::from_value(py_to_json(obj)?).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Extracts `[{"query", "links"}]` from a raw response body.
///
/// `config` is an optional JSON document overriding extraction settings.
#[pyfunction]
#[pyo3(signature = (text, config=None))]
fn parse_response(py: Python<'_>, text: &str, config: Option<&str>) -> PyResult<PyObject> {
    let blocks = build_extractor(config)?.extract(text);
    to_py(py, &blocks)
}

/// Merges an incoming block into a stored one; first-seen link metadata wins.
#[pyfunction]
fn merge_blocks(
    py: Python<'_>,
    existing: &Bound<'_, PyAny>,
    incoming: &Bound<'_, PyAny>,
) -> PyResult<PyObject> {
    let existing: Block = from_py(existing)?;
    let incoming: Block = from_py(incoming)?;
    to_py(py, &stages::merge(&existing, &incoming))
}

/// Renders links as `markdown`, `tsv` or `urls` text.
#[pyfunction]
fn export_links(links: &Bound<'_, PyAny>, format: &str) -> PyResult<String> {
    let format: ExportFormat = format.parse().map_err(to_py_err)?;
    let links: Vec<LinkEntry> = from_py(links)?;
    Ok(format.render(&links))
}

/// Normalised, de-duplicated URLs for replaying into another site.
#[pyfunction]
fn replay_queue(links: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    let links: Vec<LinkEntry> = from_py(links)?;
    Ok(export::replay_queue(&links))
}

/// The user-facing counter shown after an extraction.
#[pyfunction]
fn summary_message(count: usize) -> String {
    export::summary_message(count)
}

/// Python wrapper for the accumulated search store.
#[pyclass(name = "SearchStore")]
pub struct PySearchStore {
    inner: store::SearchStore,
    extractor: Extractor,
}

#[pymethods]
impl PySearchStore {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&str>) -> PyResult<Self> {
        Ok(Self {
            inner: store::SearchStore::new(),
            extractor: build_extractor(config)?,
        })
    }

    /// Loads a snapshot written by `save`.
    #[staticmethod]
    #[pyo3(signature = (path, config=None))]
    fn load(path: &str, config: Option<&str>) -> PyResult<Self> {
        Ok(Self {
            inner: store::SearchStore::load(path).map_err(to_py_err)?,
            extractor: build_extractor(config)?,
        })
    }

    /// Extracts a raw response and merges its blocks; returns how many were recorded.
    fn record_response(&self, text: &str) -> usize {
        let blocks = self.extractor.extract(text);
        self.inner.record(&blocks)
    }

    /// Merges already-extracted blocks.
    fn record_blocks(&self, blocks: &Bound<'_, PyAny>) -> PyResult<usize> {
        let blocks: Vec<Block> = from_py(blocks)?;
        Ok(self.inner.record(&blocks))
    }

    /// All stored searches, most recently updated first.
    fn searches(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.recent())
    }

    /// One stored search, or `None`.
    fn get(&self, py: Python<'_>, query: &str) -> PyResult<PyObject> {
        match self.inner.get(query) {
            Some(search) => to_py(py, &search),
            None => Ok(py.None()),
        }
    }

    /// Renders the links stored for `query`, or `None` if it is unknown.
    fn export(&self, query: &str, format: &str) -> PyResult<Option<String>> {
        let format: ExportFormat = format.parse().map_err(to_py_err)?;
        Ok(self.inner.get(query).map(|search| format.render(&search.links)))
    }

    /// Deletes one query; returns whether it existed.
    fn remove(&self, query: &str) -> bool {
        self.inner.remove(query).is_some()
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    fn save(&self, path: &str) -> PyResult<()> {
        self.inner.save(path).map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("SearchStore(searches={})", self.inner.len())
    }
}

// Helper functions

fn py_to_json(obj: &Bound<'_, PyAny>) -> PyResult<serde_json::Value> {
    if obj.is_none() {
        return Ok(serde_json::Value::Null);
    }

    if let Ok(b) = obj.extract::<bool>() {
        return Ok(serde_json::Value::Bool(b));
    }

    if let Ok(i) = obj.extract::<i64>() {
        return Ok(serde_json::Value::Number(i.into()));
    }

    if let Ok(f) = obj.extract::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Ok(serde_json::Value::Number(n));
        }
    }

    if let Ok(s) = obj.extract::<String>() {
        return Ok(serde_json::Value::String(s));
    }

    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| py_to_json(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(serde_json::Value::Array);
    }

    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = serde_json::Map::new();
        for (key, value) in dict.iter() {
            let key_str: String = key.extract()?;
            map.insert(key_str, py_to_json(&value)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    // Fallback: convert to string representation
    Ok(serde_json::Value::String(obj.str()?.to_string()))
}

fn json_to_py(py: Python<'_>, value: &serde_json::Value) -> PyResult<PyObject> {
    Ok(match value {
        serde_json::Value::Null => py.None(),
        serde_json::Value::Bool(b) => b.into_py(py),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py(py)
            } else if let Some(f) = n.as_f64() {
                f.into_py(py)
            } else {
                py.None()
            }
        }
        serde_json::Value::String(s) => s.into_py(py),
        serde_json::Value::Array(arr) => {
            let items = arr
                .iter()
                .map(|v| json_to_py(py, v))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new_bound(py, items).into_py(py)
        }
        serde_json::Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in map {
                dict.set_item(k, json_to_py(py, v)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// The sourcesaver Python module.
#[pymodule]
fn sourcesaver_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_response, m)?)?;
    m.add_function(wrap_pyfunction!(merge_blocks, m)?)?;
    m.add_function(wrap_pyfunction!(export_links, m)?)?;
    m.add_function(wrap_pyfunction!(replay_queue, m)?)?;
    m.add_function(wrap_pyfunction!(summary_message, m)?)?;
    m.add_class::<PySearchStore>()?;

    // Add version info
    m.add("__version__", "0.1.0")?;
    m.add("__rust_version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
