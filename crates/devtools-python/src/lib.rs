//! Python bindings for Developer Tools via PyO3

use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;

use devtools_core::logging;
use devtools_core::tools::global_registry;
use devtools_core::types::{
    ToolMetadata as CoreToolMetadata,
    ToolOptions as CoreToolOptions,
    ToolResult as CoreToolResult,
};

// JSON values cross the boundary as text and go through Python's `json` module

fn json_loads(py: Python<'_>, text: &str) -> PyResult<PyObject> {
    Ok(py.import("json")?.call_method1("loads", (text,))?.unbind())
}

fn json_dumps(value: &Bound<'_, PyAny>) -> PyResult<String> {
    value.py().import("json")?.call_method1("dumps", (value,))?.extract()
}

fn to_options(options: Option<&Bound<'_, PyAny>>) -> PyResult<CoreToolOptions> {
    let Some(options) = options.filter(|o| !o.is_none()) else {
        return Ok(CoreToolOptions::new());
    };
    let value: serde_json::Value = serde_json::from_str(&json_dumps(options)?)
        .map_err(|e| PyValueError::new_err(format!("Invalid options: {}", e)))?;
    Ok(CoreToolOptions::from_value(value))
}

// ============================================================================
// Tool Types
// ============================================================================

/// Result of a tool run
#[pyclass]
#[derive(Clone)]
pub struct ToolResult {
    #[pyo3(get)]
    pub success: bool,
    #[pyo3(get)]
    pub output: Option<String>,
    #[pyo3(get)]
    pub error: Option<String>,
    metadata_json: Option<String>,
}

#[pymethods]
impl ToolResult {
    /// Metadata as a dict, or None
    #[getter]
    fn metadata(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        self.metadata_json
            .as_deref()
            .map(|text| json_loads(py, text))
            .transpose()
    }

    fn __repr__(&self) -> String {
        match (&self.output, &self.error) {
            (_, Some(error)) if !self.success => format!("ToolResult(success=False, error='{}')", error),
            (Some(output), _) => format!("ToolResult(success={}, output_len={})", self.success, output.len()),
            _ => format!("ToolResult(success={})", self.success),
        }
    }
}

impl From<CoreToolResult> for ToolResult {
    fn from(result: CoreToolResult) -> Self {
        let metadata_json = result
            .metadata
            .as_ref()
            .and_then(|m| serde_json::to_string(m).ok());
        Self {
            success: result.success,
            output: result.output,
            error: result.error,
            metadata_json,
        }
    }
}

/// Sidebar metadata of a registered tool
#[pyclass]
#[derive(Clone)]
pub struct ToolInfo {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub category: String,
    #[pyo3(get)]
    pub has_input: bool,
    #[pyo3(get)]
    pub placeholder: Option<String>,
    options_json: Option<String>,
}

#[pymethods]
impl ToolInfo {
    /// Option form definitions as a list of dicts, or None
    #[getter]
    fn options(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        self.options_json
            .as_deref()
            .map(|text| json_loads(py, text))
            .transpose()
    }

    fn __repr__(&self) -> String {
        format!("ToolInfo(id='{}', name='{}', category='{}')", self.id, self.name, self.category)
    }
}

impl From<CoreToolMetadata> for ToolInfo {
    fn from(meta: CoreToolMetadata) -> Self {
        let options_json = meta
            .options
            .as_ref()
            .and_then(|o| serde_json::to_string(o).ok());
        Self {
            id: meta.id,
            name: meta.name,
            category: meta.category,
            has_input: meta.has_input,
            placeholder: meta.placeholder,
            options_json,
        }
    }
}

// ============================================================================
// Module Functions
// ============================================================================

/// Run a tool from the built-in catalog
#[pyfunction]
#[pyo3(signature = (tool, input = "", options = None))]
pub fn execute_tool(
    py: Python<'_>,
    tool: &str,
    input: &str,
    options: Option<&Bound<'_, PyAny>>,
) -> PyResult<ToolResult> {
    let options = to_options(options)?;
    let result = py.allow_threads(|| global_registry().execute(tool, input, &options));
    Ok(result.into())
}

/// List every built-in tool, in sidebar order
#[pyfunction]
pub fn list_tools() -> Vec<ToolInfo> {
    global_registry()
        .metadata()
        .into_iter()
        .map(ToolInfo::from)
        .collect()
}

/// Get the path to the debug log file
#[pyfunction]
pub fn get_log_file_path() -> String {
    logging::log_file_path().to_string_lossy().to_string()
}

/// Clear the debug log file
#[pyfunction]
pub fn clear_log() {
    logging::clear_log();
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
fn developertools(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Tool Types
    m.add_class::<ToolResult>()?;
    m.add_class::<ToolInfo>()?;

    // Functions
    m.add_function(wrap_pyfunction!(execute_tool, m)?)?;
    m.add_function(wrap_pyfunction!(list_tools, m)?)?;
    m.add_function(wrap_pyfunction!(get_log_file_path, m)?)?;
    m.add_function(wrap_pyfunction!(clear_log, m)?)?;

    Ok(())
}
