//! The loaded JSON document and the pure transforms the viewer runs over it.

mod outline;
mod query;
mod search;
mod tree;

use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use outline::outline_lines;
pub use query::{PathQuery, QueryCache, QueryEvaluator, QueryOutput};
pub use search::{LineMatcher, build_matcher, find_matches, split_key_value};
pub use tree::{CollapsibleView, JsonTree, TreeRow, TreeView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Stdin,
}

impl DocumentSource {
    /// `-` selects standard input.
    pub fn from_arg(arg: &OsStr) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Stdin => "<stdin>".to_string(),
        }
    }

    /// Exports land next to the source file, or in the working directory
    /// for stdin.
    pub fn sibling_path(&self, suffix: &str) -> PathBuf {
        match self {
            Self::File(path) => {
                let stem = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "document".to_string());
                path.with_file_name(format!("{stem}.{suffix}"))
            }
            Self::Stdin => PathBuf::from(format!("stdin.{suffix}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonDocument {
    source: DocumentSource,
    value: Arc<Value>,
    lines: Arc<Vec<String>>,
    outline: Arc<Vec<String>>,
}

impl JsonDocument {
    pub fn load(source: DocumentSource) -> AppResult<Self> {
        let raw = match &source {
            DocumentSource::File(path) => read_file(path)?,
            DocumentSource::Stdin => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .map_err(|err| AppError::io_with_context(err, "failed to read stdin"))?;
                raw
            }
        };
        Self::parse(source, &raw)
    }

    pub fn parse(source: DocumentSource, raw: &str) -> AppResult<Self> {
        let value = serde_json::from_str::<Value>(raw).map_err(|err| {
            AppError::json_with_context(err, format!("failed to parse {}", source.display_name()))
        })?;
        Self::from_value(source, value)
    }

    pub fn from_value(source: DocumentSource, value: Value) -> AppResult<Self> {
        let lines = pretty_lines(std::slice::from_ref(&value))?;
        let outline = outline_lines(&value);
        Ok(Self {
            source,
            value: Arc::new(value),
            lines: Arc::new(lines),
            outline: Arc::new(outline),
        })
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    pub fn value(&self) -> &Arc<Value> {
        &self.value
    }

    pub fn lines(&self) -> &Arc<Vec<String>> {
        &self.lines
    }

    pub fn outline(&self) -> &Arc<Vec<String>> {
        &self.outline
    }
}

/// Pretty-prints each value and concatenates the lines.
pub fn pretty_lines(values: &[Value]) -> AppResult<Vec<String>> {
    let mut lines = Vec::new();
    for value in values {
        let text = serde_json::to_string_pretty(value)
            .map_err(|err| AppError::json_with_context(err, "failed to format value"))?;
        lines.extend(text.lines().map(str::to_string));
    }
    Ok(lines)
}

fn read_file(path: &Path) -> AppResult<String> {
    if !path.is_file() {
        return Err(AppError::invalid_argument(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    fs::read_to_string(path).map_err(|err| {
        AppError::io_with_context(err, format!("failed to read {}", path.display()))
    })
}
