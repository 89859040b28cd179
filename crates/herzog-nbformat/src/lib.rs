//! herzog-nbformat: Jupyter notebook document types for herzog
//!
//! This crate provides:
//! - nbformat v4 document types (subset needed for script conversion)
//! - The bundled Python 3 boilerplate merged into generated notebooks
//!
//! ## Example
//!
//! ```rust
//! use herzog_nbformat::{NotebookCell, NotebookDocument, template};
//!
//! let doc = NotebookDocument::new(
//!     vec![NotebookCell::markdown("# Title"), NotebookCell::code("x = 1")],
//!     template::python3().clone(),
//! );
//!
//! let json = doc.to_json().unwrap();
//! assert!(json.contains("\"cell_type\": \"markdown\""));
//! ```

pub mod notebook;
pub mod template;

pub use notebook::{
    CellSource, CodeCell, DocumentError, DocumentResult, MarkdownCell, NotebookCell,
    NotebookDocument, OtherCell,
};
