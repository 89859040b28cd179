//! Integration tests for the herzog binary

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Run herzog in `dir` so that no stray `_herzog.toml` is picked up
fn herzog(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_herzog"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run herzog")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Non UTF-8 path")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("Invalid UTF-8")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("Invalid UTF-8")
}

#[test]
fn test_script_to_notebook_file() {
    let dir = TempDir::new().unwrap();
    let notebook = dir.path().join("greeting.ipynb");

    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("greeting.py")),
            "-o",
            path_arg(&notebook),
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), notebook.display().to_string());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&notebook).unwrap()).unwrap();
    let cells = json["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0]["source"], "# Greeting\nSay hello.");
    assert_eq!(
        cells[1]["source"],
        "!whoami\nname = \"world\"\nprint(f\"hello {name}\")"
    );
    assert_eq!(json["nbformat"], 4);
}

#[test]
fn test_round_trip_through_stdout() {
    let dir = TempDir::new().unwrap();
    let notebook = dir.path().join("greeting.ipynb");

    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("greeting.py")),
            "-o",
            path_arg(&notebook),
            "-q",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let output = herzog(dir.path(), &["convert", path_arg(&notebook)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        fs::read_to_string(fixture("greeting.py")).unwrap()
    );
}

#[test]
fn test_stdin_input() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_herzog"))
        .current_dir(dir.path())
        .args(["convert", "-", "--to", "ipynb"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run herzog");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"with herzog.Cell(\"python\"):\n    x = 1\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["cells"][0]["cell_type"], "code");
    assert_eq!(json["cells"][0]["source"], "x = 1");
}

#[test]
fn test_stdin_requires_target() {
    let dir = TempDir::new().unwrap();
    let output = herzog(dir.path(), &["convert", "-"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--to is required"));
}

#[test]
fn test_parse_error_is_located() {
    let dir = TempDir::new().unwrap();
    let notebook = dir.path().join("broken.ipynb");

    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("broken.py")),
            "-o",
            path_arg(&notebook),
        ],
    );
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Unknown cell kind \"markdwn\" at line 6"), "{err}");
    assert_eq!(err.trim().lines().count(), 1, "{err}");
    assert!(!notebook.exists());
}

#[test]
fn test_same_type_extensions_rejected() {
    let dir = TempDir::new().unwrap();
    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("greeting.py")),
            "-o",
            path_arg(&dir.path().join("copy.py")),
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot convert .py to .py"));
    assert!(!dir.path().join("copy.py").exists());
}

#[test]
fn test_unsupported_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "hello").unwrap();

    let output = herzog(dir.path(), &["convert", path_arg(&input)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unsupported input file extension"));
}

#[test]
fn test_raw_cell_degrades() {
    let dir = TempDir::new().unwrap();
    let output = herzog(dir.path(), &["convert", path_arg(&fixture("mixed.ipynb"))]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Unsupported cell kind \"raw\""));

    insta::assert_snapshot!(stdout(&output), @r#"
    import herzog

    with herzog.Cell("markdown"):
        """
        # Mixed
        Has a raw cell.
        """

    # herzog: Unsupported cell kind "raw"; cell commented out
    # with herzog.Cell("raw"):
    #     raw text

    with herzog.Cell("python"):
        #%time total = 1 + 1
        pass
    "#);
}

#[test]
fn test_writer_flags() {
    let dir = TempDir::new().unwrap();
    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("mixed.ipynb")),
            "--namespace",
            "nb",
            "--indent",
            "2",
            "--no-import",
            "-q",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let script = stdout(&output);
    assert!(script.starts_with("with nb.Cell(\"markdown\"):\n  \"\"\"\n"));
    assert!(!script.contains("import nb"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("_herzog.toml"),
        "[script]\nnamespace = \"nb\"\n\n[notebook]\nline_ending = \"crlf\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("analysis.py"),
        "import nb\n\nwith nb.Cell(\"python\"):\n    a = 1\n    b = 2\n",
    )
    .unwrap();

    let output = herzog(dir.path(), &["convert", "analysis.py"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["cells"][0]["source"], "a = 1\r\nb = 2");

    // Flags take precedence over the config file
    let output = herzog(dir.path(), &["convert", "analysis.py", "--namespace", "herzog"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["cells"].as_array().unwrap().len(), 0);
}

#[test]
fn test_custom_template() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("template.json"),
        r#"{"metadata": {"kernelspec": {"name": "pypy3"}}, "nbformat": 4, "nbformat_minor": 5}"#,
    )
    .unwrap();

    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&fixture("greeting.py")),
            "--template",
            "template.json",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["metadata"]["kernelspec"]["name"], "pypy3");
    assert_eq!(json["nbformat_minor"], 5);
}

#[test]
fn test_directory_conversion() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scripts");
    let output_dir = dir.path().join("notebooks");
    fs::create_dir_all(input.join("nested")).unwrap();
    fs::copy(fixture("greeting.py"), input.join("greeting.py")).unwrap();
    fs::copy(fixture("greeting.py"), input.join("nested/again.py")).unwrap();
    fs::write(input.join("README.md"), "not converted").unwrap();

    let output = herzog(
        dir.path(),
        &[
            "convert",
            path_arg(&input),
            "-o",
            path_arg(&output_dir),
            "--to",
            "ipynb",
            "-r",
            "-j",
            "2",
            "-q",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(output_dir.join("greeting.ipynb").is_file());
    assert!(output_dir.join("nested/again.ipynb").is_file());
    assert!(!output_dir.join("README.ipynb").exists());
}

#[test]
fn test_directory_conversion_reports_failures() {
    let dir = TempDir::new().unwrap();
    fs::copy(fixture("greeting.py"), dir.path().join("greeting.py")).unwrap();
    fs::copy(fixture("broken.py"), dir.path().join("broken.py")).unwrap();

    let output = herzog(dir.path(), &["convert", ".", "--to", "ipynb"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("broken.py"), "{err}");
    assert!(err.contains("1 files failed to convert"), "{err}");

    // The good file is still converted; the broken one leaves nothing behind
    assert!(dir.path().join("greeting.ipynb").is_file());
    assert!(!dir.path().join("broken.ipynb").exists());
}

#[test]
fn test_directory_requires_target() {
    let dir = TempDir::new().unwrap();
    let output = herzog(dir.path(), &["convert", "."]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--to is required"));
}

#[test]
fn test_init_config() {
    let dir = TempDir::new().unwrap();

    let output = herzog(dir.path(), &["init"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let content = fs::read_to_string(dir.path().join("_herzog.toml")).unwrap();
    assert!(content.starts_with("#:schema https://"));
    assert!(content.contains("[script]"));
    assert!(content.contains("namespace = \"herzog\""));
    assert!(content.contains("indent = 4"));
    assert!(content.contains("line_ending = \"native\""));

    // Refuses to overwrite without --force
    let output = herzog(dir.path(), &["init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already exists"));

    let output = herzog(dir.path(), &["init", "--force", "-q"]);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn test_init_schema() {
    let dir = TempDir::new().unwrap();
    let output = herzog(dir.path(), &["init", "--schema"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let schema: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(schema["title"], "Config");
    assert!(!dir.path().join("_herzog.toml").exists());
}
