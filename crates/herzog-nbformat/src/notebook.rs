//! Notebook document types
//!
//! A subset of the nbformat v4 document needed for script conversion.
//! Reference: https://nbformat.readthedocs.io/en/latest/format_description.html

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Notebook document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid notebook document: {0}")]
    InvalidDocument(String),

    #[error("Failed to serialize notebook: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A complete notebook document
///
/// Everything other than `cells` (metadata, nbformat, nbformat_minor) is carried
/// as an opaque boilerplate map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookDocument {
    /// Cells in document order
    pub cells: Vec<NotebookCell>,
    /// Remaining top-level fields
    #[serde(flatten)]
    pub boilerplate: Map<String, Value>,
}

/// A notebook cell
///
/// Code and markdown cells are typed; any other `cell_type` (e.g. `raw`) is kept
/// as an [`OtherCell`] so that a document containing it still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum NotebookCell {
    Code(CodeCell),
    Markdown(MarkdownCell),
    #[serde(untagged)]
    Other(OtherCell),
}

/// Code cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub source: CellSource,
    #[serde(default)]
    pub execution_count: Option<u64>,
    #[serde(default)]
    pub outputs: Vec<Value>,
}

/// Markdown cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownCell {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub source: CellSource,
}

/// Cell of a type with no script representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCell {
    pub cell_type: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub source: CellSource,
}

/// Cell source text
///
/// nbformat allows either a single string or a list of line fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl CellSource {
    /// Join the source into a single string
    pub fn joined(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

impl From<String> for CellSource {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellSource {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl NotebookCell {
    /// Create a code cell with no outputs
    pub fn code(source: impl Into<CellSource>) -> Self {
        Self::Code(CodeCell {
            metadata: Map::new(),
            source: source.into(),
            execution_count: None,
            outputs: Vec::new(),
        })
    }

    /// Create a markdown cell
    pub fn markdown(source: impl Into<CellSource>) -> Self {
        Self::Markdown(MarkdownCell {
            metadata: Map::new(),
            source: source.into(),
        })
    }

    /// The `cell_type` field as it appears in the document
    pub fn cell_type(&self) -> &str {
        match self {
            Self::Code(_) => "code",
            Self::Markdown(_) => "markdown",
            Self::Other(cell) => &cell.cell_type,
        }
    }

    /// Cell source, regardless of cell type
    pub fn source(&self) -> &CellSource {
        match self {
            Self::Code(cell) => &cell.source,
            Self::Markdown(cell) => &cell.source,
            Self::Other(cell) => &cell.source,
        }
    }
}

impl NotebookDocument {
    /// Create a document from cells and a boilerplate map
    ///
    /// A `cells` key in the boilerplate is ignored.
    pub fn new(cells: Vec<NotebookCell>, mut boilerplate: Map<String, Value>) -> Self {
        boilerplate.remove("cells");
        Self { cells, boilerplate }
    }

    /// Parse a notebook from JSON text
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        serde_json::from_str(json).map_err(|e| DocumentError::InvalidDocument(e.to_string()))
    }

    /// Serialize to pretty-printed JSON (two-space indent, trailing newline)
    pub fn to_json(&self) -> DocumentResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
