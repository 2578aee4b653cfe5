//! Python bindings (PyO3) for sqlshim. Commands and configs cross the boundary as JSON.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyAny;

use crate::{Command, DialectKind, Translator, TranslatorConfig};

fn py_err<E: std::fmt::Display>(msg: E) -> PyErr {
    PyRuntimeError::new_err(msg.to_string())
}

fn to_value_err<E: std::fmt::Display>(msg: E) -> PyErr {
    PyValueError::new_err(msg.to_string())
}

fn dumps(py: Python<'_>, obj: &Bound<'_, PyAny>) -> PyResult<String> {
    let json = py.import("json")?;
    json.call_method1("dumps", (obj,))?.extract()
}

fn parse_command(py: Python<'_>, obj: &Bound<'_, PyAny>) -> PyResult<Command> {
    let s = dumps(py, obj)?;
    serde_json::from_str(&s).map_err(to_value_err)
}

fn parse_config(py: Python<'_>, obj: Option<&Bound<'_, PyAny>>) -> PyResult<TranslatorConfig> {
    match obj {
        Some(obj) if !obj.is_none() => {
            let s = dumps(py, obj)?;
            serde_json::from_str(&s).map_err(to_value_err)
        }
        _ => Ok(TranslatorConfig::default()),
    }
}

#[pyfunction]
#[pyo3(signature = (dialect, command, config=None))]
/// Translate a command into dialect SQL.
/// - `dialect`: `"oracle"`, `"sybase"` or `"ansi"`
/// - `command`: command dict (shape matches the Rust AST)
/// - `config`: optional translator settings (time zone, version, bind variables)
///
/// Returns `{"sql": str, "bind_values": list}`.
fn translate(
    py: Python<'_>,
    dialect: &str,
    command: &Bound<'_, PyAny>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let kind: DialectKind = dialect.parse().map_err(to_value_err)?;
    let command = parse_command(py, command)?;
    let config = parse_config(py, config)?;
    let translator = Translator::new(kind, &config).map_err(to_value_err)?;
    let translated = translator.translate(&command).map_err(to_value_err)?;
    let out = serde_json::to_string(&translated).map_err(py_err)?;

    let json = py.import("json")?;
    Ok(json.call_method1("loads", (out,))?.unbind())
}

/// PyO3 module entrypoint
#[pymodule]
fn sqlshim_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(translate, m)?)?;
    Ok(())
}
