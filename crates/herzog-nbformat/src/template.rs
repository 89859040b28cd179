//! Notebook boilerplate templates
//!
//! Generated notebooks are a cell list merged with a static fragment carrying the
//! notebook format version and kernel/language metadata.

use crate::notebook::{DocumentError, DocumentResult};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static PYTHON_3: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    from_json(include_str!("../data/python_3_boiler.json"))
        .expect("bundled python 3 template is a JSON object")
});

/// The bundled Python 3 boilerplate
pub fn python3() -> &'static Map<String, Value> {
    &PYTHON_3
}

/// Load a boilerplate fragment from JSON text
///
/// The fragment must be a JSON object. A `cells` entry, if present, is dropped.
pub fn from_json(json: &str) -> DocumentResult<Map<String, Value>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| DocumentError::InvalidDocument(e.to_string()))?;

    match value {
        Value::Object(mut map) => {
            map.remove("cells");
            Ok(map)
        }
        _ => Err(DocumentError::InvalidDocument(
            "notebook template must be a JSON object".to_string(),
        )),
    }
}
