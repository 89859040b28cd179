//! herzog-core: Core library for herzog script/notebook conversion
//!
//! This crate provides:
//! - Script to notebook assembly (forward)
//! - Notebook to script writing (backward)
//! - Format detection and a single conversion entry point
//! - A sandbox scope over an explicit namespace

pub mod convert;
pub mod error;
pub mod notebook;
pub mod sandbox;
pub mod script;

pub use convert::{ConvertOptions, Format, convert};
pub use error::{ConvertError, ConvertResult};
pub use notebook::{NotebookOptions, script_to_notebook, script_to_notebook_with_options};
pub use script::{WriterOptions, notebook_to_script, notebook_json_to_script};

pub use herzog_nbformat::{NotebookCell, NotebookDocument};
pub use herzog_parser::{Cell, CellKind, LineEnding, LocatorOptions, ParseError};
