//! herzog script parser
//!
//! Runs the locator, extractor and validator over a script and yields cells in
//! document order.

use crate::cell::Cell;
use crate::extract::extract;
use crate::locator::{LocatedBlock, Locator, LocatorOptions};
use crate::validate::validate;
use thiserror::Error;

/// Parser errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unknown cell kind \"{kind}\" at line {line}")]
    UnknownCellKind { kind: String, line: usize },

    #[error("Malformed cell at line {line}: {reason}")]
    MalformedCell { line: usize, reason: String },

    #[error("Inconsistent indentation at line {line}")]
    Indentation { line: usize },

    #[error("Syntax error in cell at line {line}: {detail}")]
    Syntax { line: usize, detail: String },

    #[error("Unsupported cell kind \"{kind}\"")]
    UnsupportedKind { kind: String },

    #[error("Failed to load Python grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Python parser produced no syntax tree")]
    Unparsable,
}

impl ParseError {
    /// 1-indexed script line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownCellKind { line, .. }
            | Self::MalformedCell { line, .. }
            | Self::Indentation { line }
            | Self::Syntax { line, .. } => Some(*line),
            Self::UnsupportedKind { .. } | Self::Grammar(_) | Self::Unparsable => None,
        }
    }
}

/// Parse result type
pub type ParseResult<T> = Result<T, ParseError>;

/// herzog script parser
pub struct Parser<'s> {
    locator: Locator<'s>,
    lines: Vec<&'s str>,
}

impl<'s> Parser<'s> {
    /// Create a parser from script text
    pub fn new(source: &'s str, options: &LocatorOptions) -> ParseResult<Self> {
        let lines = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Ok(Self {
            locator: Locator::new(source, options)?,
            lines,
        })
    }

    /// Cells in document order
    ///
    /// Each executable cell is validated right after extraction. Iteration ends
    /// after the first error.
    pub fn cells(&self) -> impl Iterator<Item = ParseResult<Cell>> + '_ {
        let mut failed = false;
        self.locator.blocks().map_while(move |block| {
            if failed {
                return None;
            }
            let cell = self.cell(block);
            failed = cell.is_err();
            Some(cell)
        })
    }

    fn cell(&self, block: ParseResult<LocatedBlock<'_>>) -> ParseResult<Cell> {
        let block = block?;
        let cell = extract(&block, self.locator.source(), &self.lines)?;
        validate(&cell, block.span.line())?;
        tracing::debug!(
            line = block.span.line(),
            kind = %cell.kind(),
            lines = cell.content().len(),
            "Extracted cell"
        );
        Ok(cell)
    }
}

/// Parse a script with default options
pub fn parse(source: &str) -> ParseResult<Vec<Cell>> {
    parse_with_options(source, &LocatorOptions::default())
}

/// Parse a script into cells
pub fn parse_with_options(source: &str, options: &LocatorOptions) -> ParseResult<Vec<Cell>> {
    Parser::new(source, options)?.cells().collect()
}
