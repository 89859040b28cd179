//! Script to notebook assembly
//!
//! Cells are taken in document order; kinds without a notebook representation are
//! dropped and the rest are merged with the notebook boilerplate.

use crate::error::ConvertResult;
use herzog_nbformat::{NotebookDocument, template};
use herzog_parser::{LineEnding, LocatorOptions, Parser};
use serde_json::{Map, Value};

/// Options for notebook generation
#[derive(Debug, Clone, Default)]
pub struct NotebookOptions {
    /// Cell guard matching
    pub locator: LocatorOptions,
    /// Terminator used to join cell content
    pub line_ending: LineEnding,
    /// Boilerplate replacing the bundled Python 3 template
    pub template: Option<Map<String, Value>>,
}

/// Convert a script to a notebook with default options
pub fn script_to_notebook(script: &str) -> ConvertResult<NotebookDocument> {
    script_to_notebook_with_options(script, &NotebookOptions::default())
}

/// Convert a script to a notebook
///
/// Fails on the first parse error; no partial document is produced.
pub fn script_to_notebook_with_options(
    script: &str,
    options: &NotebookOptions,
) -> ConvertResult<NotebookDocument> {
    let parser = Parser::new(script, &options.locator)?;

    let mut cells = Vec::new();
    for cell in parser.cells() {
        let cell = cell?;
        if !cell.has_notebook_representation() {
            tracing::debug!(kind = %cell.kind(), "Skipping cell without notebook representation");
            continue;
        }
        cells.push(cell.to_document_shape(options.line_ending)?);
    }

    let boilerplate = options
        .template
        .clone()
        .unwrap_or_else(|| template::python3().clone());
    Ok(NotebookDocument::new(cells, boilerplate))
}
