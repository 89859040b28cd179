//! Notebook to herzog script writer
//!
//! Each notebook cell becomes a `with <namespace>.Cell(...)` block with its content
//! re-indented beneath the opener. Cells of unsupported types are commented out
//! with a diagnostic line instead of failing the conversion.

use crate::error::ConvertResult;
use herzog_nbformat::{NotebookCell, NotebookDocument};
use herzog_parser::extract::{ESCAPED_PREFIX, PLACEHOLDER, escape_line, escape_prose_line};
use herzog_parser::{Cell, CellKind, ParseError};

/// Options for the script writer
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Module name used in block openers
    pub namespace: String,
    /// Indentation width of cell bodies
    pub indent: usize,
    /// Emit `import <namespace>` at the top of the script
    pub import: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            namespace: "herzog".to_string(),
            indent: 4,
            import: true,
        }
    }
}

/// Convert a notebook document to a herzog script
pub fn notebook_to_script(doc: &NotebookDocument, options: &WriterOptions) -> String {
    let mut writer = Writer::new(options);
    writer.write_document(doc)
}

/// Convert notebook JSON text to a herzog script
pub fn notebook_json_to_script(json: &str, options: &WriterOptions) -> ConvertResult<String> {
    let doc = NotebookDocument::from_json(json)?;
    Ok(notebook_to_script(&doc, options))
}

/// Script writer state
struct Writer<'a> {
    options: &'a WriterOptions,
    output: String,
    indent: String,
}

impl<'a> Writer<'a> {
    fn new(options: &'a WriterOptions) -> Self {
        Self {
            options,
            output: String::new(),
            indent: " ".repeat(options.indent),
        }
    }

    fn write_document(&mut self, doc: &NotebookDocument) -> String {
        if self.options.import {
            self.output
                .push_str(&format!("import {}\n", self.options.namespace));
        }

        for cell in &doc.cells {
            if !self.output.is_empty() {
                self.output.push('\n');
            }
            match Cell::from_notebook(cell) {
                Ok(cell) => self.write_cell(&cell),
                Err(err) => self.write_unsupported(cell, &err),
            }
        }

        std::mem::take(&mut self.output)
    }

    fn write_opener(&mut self, kind: &str) {
        self.output.push_str(&format!(
            "with {}.Cell(\"{}\"):\n",
            self.options.namespace, kind
        ));
    }

    fn write_line(&mut self, line: &str) {
        if !line.is_empty() {
            self.output.push_str(&self.indent);
            self.output.push_str(line);
        }
        self.output.push('\n');
    }

    fn write_cell(&mut self, cell: &Cell) {
        self.write_opener(cell.kind().as_str());
        match cell.kind() {
            CellKind::Executable => self.write_code(cell.content()),
            CellKind::Prose => self.write_markdown(cell.content()),
            // Notebook cells never produce sandbox blocks
            CellKind::Scoped => {}
        }
    }

    fn write_code(&mut self, content: &[String]) {
        let mut has_statement = false;
        for line in content {
            let line = escape_line(line);
            let trimmed = line.trim_start();
            has_statement |= !trimmed.is_empty() && !trimmed.starts_with('#');
            self.write_line(&line);
        }
        if !has_statement {
            self.write_line(PLACEHOLDER);
        }
    }

    fn write_markdown(&mut self, content: &[String]) {
        let contains = |quote: &str| content.iter().any(|line| line.contains(quote));
        match (contains(r#"""""#), contains("'''")) {
            (true, false) => self.write_literal("", "'''", content),
            (true, true) => {
                let escaped: Vec<String> = content.iter().map(|l| escape_prose_line(l)).collect();
                self.write_literal(ESCAPED_PREFIX, r#"""""#, &escaped);
            }
            _ => self.write_literal("", r#"""""#, content),
        }
    }

    fn write_literal(&mut self, prefix: &str, quote: &str, content: &[String]) {
        self.write_line(&format!("{prefix}{quote}"));
        for line in content {
            self.write_line(line);
        }
        self.write_line(quote);
    }

    fn write_unsupported(&mut self, cell: &NotebookCell, err: &ParseError) {
        tracing::warn!(cell_type = cell.cell_type(), "{err}; cell commented out");

        self.output
            .push_str(&format!("# herzog: {err}; cell commented out\n"));
        self.output.push_str(&format!(
            "# with {}.Cell(\"{}\"):\n",
            self.options.namespace,
            cell.cell_type()
        ));
        for line in cell.source().joined().lines() {
            if line.is_empty() {
                self.output.push_str("#\n");
            } else {
                self.output
                    .push_str(&format!("# {}{}\n", self.indent, line));
            }
        }
    }
}
