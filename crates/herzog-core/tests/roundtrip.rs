//! Round-trip tests between herzog scripts and notebooks

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use herzog_core::{
    ConvertOptions, Format, NotebookCell, NotebookDocument, WriterOptions, convert,
    notebook_json_to_script, notebook_to_script, script_to_notebook,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("Failed to read fixture file")
}

/// Cell type and joined source, ignoring list/string source representation
fn normalized(doc: &NotebookDocument) -> Vec<(String, String)> {
    doc.cells
        .iter()
        .map(|cell| (cell.cell_type().to_string(), cell.source().joined()))
        .collect()
}

#[test]
fn test_script_round_trip() {
    let script = read_fixture("orbits.py");
    let doc = script_to_notebook(&script).expect("Failed to convert script");
    assert_eq!(doc.cells.len(), 4);
    assert_eq!(notebook_to_script(&doc, &WriterOptions::default()), script);
}

#[test]
fn test_script_round_trip_other_indent() {
    let script = read_fixture("orbits.py");
    let options = WriterOptions {
        indent: 2,
        ..Default::default()
    };
    let doc = script_to_notebook(&script).unwrap();
    let narrow = notebook_to_script(&doc, &options);
    assert!(narrow.contains("\n  #!ls -la\n"));

    // Same cells either way
    let again = script_to_notebook(&narrow).unwrap();
    assert_eq!(again.cells, doc.cells);
}

#[test]
fn test_notebook_round_trip() {
    let json = read_fixture("orbits.ipynb");
    let original = NotebookDocument::from_json(&json).unwrap();

    let script = notebook_json_to_script(&json, &WriterOptions::default()).unwrap();
    assert_eq!(script, read_fixture("orbits.py"));

    let doc = script_to_notebook(&script).unwrap();
    assert_eq!(normalized(&doc), normalized(&original));
    assert!(doc.cells.iter().all(|cell| match cell {
        NotebookCell::Code(code) => code.execution_count.is_none() && code.outputs.is_empty(),
        _ => true,
    }));
}

#[test]
fn test_notebook_conversion_is_idempotent() {
    let json = read_fixture("orbits.ipynb");
    let options = ConvertOptions::default();

    let script = convert(&json, Format::Notebook, &options).unwrap();
    let once = convert(&script, Format::Script, &options).unwrap();
    let script_again = convert(&once, Format::Notebook, &options).unwrap();
    let twice = convert(&script_again, Format::Script, &options).unwrap();

    assert_eq!(script, script_again);
    assert_eq!(once, twice);
}

#[test]
fn test_shell_line_round_trip() {
    let doc = NotebookDocument::from_json(&read_fixture("orbits.ipynb")).unwrap();
    let script = notebook_to_script(&doc, &WriterOptions::default());
    assert!(script.contains("\n    #!ls -la\n"));

    let back = script_to_notebook(&script).unwrap();
    assert!(back.cells[2].source().joined().starts_with("!ls -la\n"));
}

#[test]
fn test_sandbox_never_in_notebook() {
    let script = r#"with herzog.Sandbox():
    scratch = 1

with herzog.Cell("python"):
    x = 1

if True:
    with herzog.Sandbox():
        scratch = 2
"#;
    let doc = script_to_notebook(script).unwrap();
    assert_eq!(doc.cells, vec![NotebookCell::code("x = 1")]);
}

#[test]
fn test_missing_body_is_located() {
    let script = "with herzog.Cell(\"python\"):\nwith herzog.Cell(\"python\"):\n    x = 1\n";
    let err = script_to_notebook(script).unwrap_err();
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_raw_cell_degrades() {
    let json = r#"{
  "cells": [
    {"cell_type": "markdown", "metadata": {}, "source": "Intro"},
    {"cell_type": "raw", "metadata": {}, "source": ["\\begin{equation}\n", "x\n", "\\end{equation}"]},
    {"cell_type": "code", "metadata": {}, "source": ["y = 2"], "execution_count": 3, "outputs": []}
  ],
  "metadata": {},
  "nbformat": 4,
  "nbformat_minor": 2
}"#;
    let script = notebook_json_to_script(json, &WriterOptions::default()).unwrap();
    assert!(script.contains("# herzog: Unsupported cell kind \"raw\""));
    assert!(script.contains("#     \\begin{equation}\n"));

    let doc = script_to_notebook(&script).unwrap();
    assert_eq!(
        doc.cells,
        vec![NotebookCell::markdown("Intro"), NotebookCell::code("y = 2")]
    );
}

#[test]
fn test_end_to_end_example() {
    let script = r#"import herzog

with herzog.Cell("markdown"):
    """
    # Title
    body
    """

with herzog.Cell("python"):
    x = 1
    print(x)
"#;
    let json = convert(script, Format::Script, &ConvertOptions::default()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["cells"],
        json!([
            {
                "cell_type": "markdown",
                "metadata": {},
                "source": "# Title\nbody"
            },
            {
                "cell_type": "code",
                "execution_count": null,
                "metadata": {},
                "outputs": [],
                "source": "x = 1\nprint(x)"
            }
        ])
    );
}
