//! Format detection and the conversion entry point

use crate::error::ConvertResult;
use crate::notebook::{NotebookOptions, script_to_notebook_with_options};
use crate::script::{WriterOptions, notebook_json_to_script};
use std::path::Path;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// herzog Python script (`.py`)
    Script,
    /// Jupyter notebook (`.ipynb`)
    Notebook,
}

impl Format {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Self::Script),
            "ipynb" => Some(Self::Notebook),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Script => "py",
            Self::Notebook => "ipynb",
        }
    }

    /// The format a document of this format converts to
    pub fn target(&self) -> Self {
        match self {
            Self::Script => Self::Notebook,
            Self::Notebook => Self::Script,
        }
    }
}

/// Options for both conversion directions
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub notebook: NotebookOptions,
    pub writer: WriterOptions,
}

impl ConvertOptions {
    /// Use one cell namespace for reading and writing scripts
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.notebook.locator.namespace = namespace.clone();
        self.writer.namespace = namespace;
        self
    }
}

/// Convert a document given in format `from` to its counterpart
///
/// Scripts become notebook JSON; notebooks become scripts.
pub fn convert(input: &str, from: Format, options: &ConvertOptions) -> ConvertResult<String> {
    match from {
        Format::Script => {
            let doc = script_to_notebook_with_options(input, &options.notebook)?;
            Ok(doc.to_json()?)
        }
        Format::Notebook => notebook_json_to_script(input, &options.writer),
    }
}
