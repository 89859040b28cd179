//! herzog-parser: Cell parser for herzog-formatted Python scripts
//!
//! This crate provides:
//! - Block locator (tree-sitter Python syntax tree walk)
//! - Cell extractor (dedent, placeholder and magic/shell-escape handling)
//! - Validator for executable cell content
//! - Cell model rendering to notebook cells
//!
//! # Example
//!
//! ```
//! use herzog_parser::{CellKind, parse};
//!
//! let source = r#"
//! with herzog.Cell("markdown"):
//!     """
//!     Title
//!     """
//!
//! with herzog.Cell("python"):
//!     x = 1
//! "#;
//!
//! let cells = parse(source).unwrap();
//! assert_eq!(cells.len(), 2);
//! assert_eq!(cells[0].kind(), CellKind::Prose);
//! assert_eq!(cells[0].content(), ["Title"]);
//! assert_eq!(cells[1].content(), ["x = 1"]);
//! ```

pub mod cell;
pub mod extract;
pub mod locator;
pub mod parser;
pub mod validate;

// Re-export main types for convenient access
pub use cell::{Cell, CellKind, LineEnding};
pub use locator::{BlockIter, LocatedBlock, Locator, LocatorOptions, SourceSpan};
pub use parser::{ParseError, ParseResult, Parser, parse, parse_with_options};
