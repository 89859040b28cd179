//! Cell model
//!
//! A cell is one typed block of content, extracted from a script or read from a
//! notebook document. Cells are immutable once built.

use crate::parser::{ParseError, ParseResult};
use herzog_nbformat::NotebookCell;
use std::fmt;

/// Kind of a cell block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Python code, a notebook "code" cell
    Executable,
    /// Formatted text, a notebook "markdown" cell
    Prose,
    /// State save/restore block, never written to a notebook
    Scoped,
}

impl CellKind {
    /// Parse a kind from the literal used in a cell guard
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "python" => Some(Self::Executable),
            "markdown" => Some(Self::Prose),
            "sandbox" => Some(Self::Scoped),
            _ => None,
        }
    }

    /// Guard literal for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executable => "python",
            Self::Prose => "markdown",
            Self::Scoped => "sandbox",
        }
    }

    /// Notebook `cell_type`, if the kind has one
    pub fn notebook_cell_type(&self) -> Option<&'static str> {
        match self {
            Self::Executable => Some("code"),
            Self::Prose => Some("markdown"),
            Self::Scoped => None,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line terminator used when joining cell content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// Host platform terminator
    #[default]
    Native,
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// The terminator text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native if cfg!(windows) => "\r\n",
            Self::Native | Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    kind: CellKind,
    content: Vec<String>,
}

impl Cell {
    pub fn new(kind: CellKind, content: Vec<String>) -> Self {
        Self { kind, content }
    }

    /// Build a cell from a notebook cell
    ///
    /// Fails with [`ParseError::UnsupportedKind`] for cell types with no script form.
    pub fn from_notebook(cell: &NotebookCell) -> ParseResult<Self> {
        let kind = match cell {
            NotebookCell::Code(_) => CellKind::Executable,
            NotebookCell::Markdown(_) => CellKind::Prose,
            NotebookCell::Other(other) => {
                return Err(ParseError::UnsupportedKind {
                    kind: other.cell_type.clone(),
                });
            }
        };
        let content = cell.source().joined().lines().map(String::from).collect();
        Ok(Self { kind, content })
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Content lines, without block opener, indentation or delimiters
    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn has_notebook_representation(&self) -> bool {
        self.kind.notebook_cell_type().is_some()
    }

    /// Content joined with the given line terminator
    pub fn source(&self, line_ending: LineEnding) -> String {
        self.content.join(line_ending.as_str())
    }

    /// Render to the notebook cell shape
    ///
    /// Callers should check [`Cell::has_notebook_representation`] first; `Scoped`
    /// cells fail with [`ParseError::UnsupportedKind`].
    pub fn to_document_shape(&self, line_ending: LineEnding) -> ParseResult<NotebookCell> {
        match self.kind {
            CellKind::Executable => Ok(NotebookCell::code(self.source(line_ending))),
            CellKind::Prose => Ok(NotebookCell::markdown(self.source(line_ending))),
            CellKind::Scoped => Err(ParseError::UnsupportedKind {
                kind: self.kind.to_string(),
            }),
        }
    }
}
