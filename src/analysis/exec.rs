//! Filepath: src/analysis/exec.rs
//! Optional live evaluation: run a block's prefix plus the block
//! itself in a fresh interpreter process and read back the value
//! bound to a resolved name. Each call gets a brand-new namespace
//! (a brand-new process); nothing is cached across blocks.
//!
//! This executes arbitrary user code, which is understood and
//! acceptable for a local developer tool; it is opt-in and the AST
//! fallback covers callers who decline.

use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

use serde_json::Value as Json;
use tracing::debug;

use crate::analysis::tree::PyValue;

/// Marker prefix for the one stdout line carrying our payload;
/// user code is free to print anything else.
const VALUE_MARKER: &str = "__PYTUTOR_VALUE__ ";

/// A runtime value read back from the interpreter. Nested
/// collections inside items collapse to `PyValue::Unknown`; advice
/// never needs more than one level of structure.
#[derive(Debug, Clone, PartialEq)]
pub enum RunValue {
    Scalar(PyValue),
    Seq(Vec<PyValue>),
    Pairs(Vec<(PyValue, PyValue)>),
}

/// Outcome of one evaluation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// The name resolved to a decodable value
    Value(RunValue),

    /// The snippet imports a package that is not installed; the
    /// module name is surfaced so callers can explain
    MissingImport(String),

    /// Execution succeeded structurally but the name was absent
    NameNotFound,

    /// Anything else - analysis must never crash because a snippet
    /// is broken, so every other failure degrades to this
    Unresolved,
}

/// Locate a Python interpreter once per process.
fn interpreter() -> Option<&'static PathBuf> {
    static INTERPRETER: OnceLock<Option<PathBuf>> = OnceLock::new();
    INTERPRETER
        .get_or_init(|| {
            which::which("python3")
                .or_else(|_| which::which("python"))
                .ok()
        })
        .as_ref()
}

/// Evaluate `pre_block_code + block_code` in a fresh namespace and
/// look up `name_str` (a rendered binding such as `x`, `obj.attr`,
/// or `d['k']`).
pub fn resolve_value(pre_block_code: &str, block_code: &str, name_str: &str) -> ExecOutcome {
    let Some(python) = interpreter() else {
        debug!("no python interpreter found; treating value as unresolved");
        return ExecOutcome::Unresolved;
    };

    let program = build_program(pre_block_code, block_code, name_str);

    let output = match Command::new(python).arg("-c").arg(&program).output() {
        Ok(output) => output,
        Err(err) => {
            debug!(error = %err, "failed to launch interpreter");
            return ExecOutcome::Unresolved;
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return classify_failure(&stderr);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let Some(payload) = stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(VALUE_MARKER))
    else {
        return ExecOutcome::Unresolved;
    };

    match serde_json::from_str::<Json>(payload) {
        Ok(json) => decode_value(&json)
            .map(ExecOutcome::Value)
            .unwrap_or(ExecOutcome::Unresolved),
        Err(_) => ExecOutcome::Unresolved,
    }
}

/// The staged program: user code, then a JSON encoder that prints
/// one marker line with the value of the requested name.
fn build_program(pre_block_code: &str, block_code: &str, name_str: &str) -> String {
    format!(
        r#"{pre_block_code}{block_code}

import json as _pytutor_json

def _pytutor_scalar(value):
    if value is None or isinstance(value, (bool, int, float, str)):
        return {{"t": type(value).__name__, "v": value}}
    return {{"t": "opaque"}}

def _pytutor_encode(value):
    if value is None or isinstance(value, (bool, int, float, str)):
        return {{"t": type(value).__name__, "v": value}}
    if isinstance(value, (list, tuple, set, frozenset)):
        return {{"t": "seq", "items": [_pytutor_scalar(item) for item in value]}}
    if isinstance(value, dict):
        return {{"t": "map", "pairs": [[_pytutor_scalar(k), _pytutor_scalar(v)] for k, v in value.items()]}}
    return {{"t": "opaque"}}

print("\n{marker}" + _pytutor_json.dumps(_pytutor_encode({name_str})))
"#,
        marker = VALUE_MARKER,
    )
}

/// Map interpreter stderr to an outcome kind.
fn classify_failure(stderr: &str) -> ExecOutcome {
    if let Some(rest) = stderr.split("ModuleNotFoundError: No module named ").nth(1) {
        let module = rest
            .trim_start()
            .trim_start_matches(['\'', '"'])
            .chars()
            .take_while(|c| *c != '\'' && *c != '"' && *c != '\n')
            .collect::<String>();
        return ExecOutcome::MissingImport(module);
    }
    if stderr.contains("NameError")
        || stderr.contains("KeyError")
        || stderr.contains("AttributeError")
    {
        return ExecOutcome::NameNotFound;
    }
    ExecOutcome::Unresolved
}

/// Decode the encoder's JSON payload into a `RunValue`.
fn decode_value(json: &Json) -> Option<RunValue> {
    let tag = json.get("t")?.as_str()?;
    match tag {
        "seq" => {
            let items = json.get("items")?.as_array()?;
            Some(RunValue::Seq(items.iter().map(decode_scalar).collect()))
        }
        "map" => {
            let pairs = json.get("pairs")?.as_array()?;
            let decoded = pairs
                .iter()
                .filter_map(|pair| {
                    let arr = pair.as_array()?;
                    Some((decode_scalar(arr.first()?), decode_scalar(arr.get(1)?)))
                })
                .collect();
            Some(RunValue::Pairs(decoded))
        }
        _ => Some(RunValue::Scalar(decode_tagged_scalar(tag, json.get("v")))),
    }
}

/// Decode one `{"t": ..., "v": ...}` scalar entry.
fn decode_scalar(json: &Json) -> PyValue {
    match json.get("t").and_then(|t| t.as_str()) {
        Some(tag) => decode_tagged_scalar(tag, json.get("v")),
        None => PyValue::Unknown,
    }
}

fn decode_tagged_scalar(tag: &str, value: Option<&Json>) -> PyValue {
    match (tag, value) {
        ("bool", Some(v)) => v.as_bool().map(PyValue::Bool).unwrap_or(PyValue::Unknown),
        ("int", Some(v)) => v.as_i64().map(PyValue::Int).unwrap_or(PyValue::Unknown),
        ("float", Some(v)) => v.as_f64().map(PyValue::Float).unwrap_or(PyValue::Unknown),
        ("str", Some(v)) => v
            .as_str()
            .map(|s| PyValue::Str(s.to_string()))
            .unwrap_or(PyValue::Unknown),
        ("NoneType", _) => PyValue::None,
        _ => PyValue::Unknown,
    }
}
