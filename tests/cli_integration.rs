//! End-to-end tests for the `jsonld` binary.
//!
//! Every test runs with an empty config file so user configuration on the
//! host cannot change the output.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PERSON: &str = concat!(
    r#"{"@context": {"name": "http://schema.org/name"}, "#,
    r#""@id": "http://example.org/jane", "name": "Jane"}"#,
);
const EXPANDED_PERSON: &str = concat!(
    r#"[{"@id":"http://example.org/jane","#,
    r#""http://schema.org/name":[{"@value":"Jane"}]}]"#,
    "\n",
);
const PERSON_NQUADS: &str = "<http://example.org/jane> <http://schema.org/name> \"Jane\" .\n";
const CONTEXT: &str = r#"{"@context": {"name": "http://schema.org/name"}}"#;

/// Scratch directory with an empty config file.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("jsonld").unwrap();
        cmd.env("JSONLD_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn format_reads_stdin_by_default() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["format", "-i", "0"])
        .write_stdin(r#"{"@id": "http://example.org/a"}"#)
        .assert()
        .success()
        .stdout("{\"@id\":\"http://example.org/a\"}\n");
}

#[test]
fn format_reads_file_with_default_indent() {
    let fx = Fixture::new();
    let path = fx.file("doc.jsonld", r#"{"@id": "http://example.org/a"}"#);
    fx.cmd()
        .arg("format")
        .arg(&path)
        .assert()
        .success()
        .stdout("{\n  \"@id\": \"http://example.org/a\"\n}\n");
}

#[test]
fn no_newline_suppresses_trailing_newline() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["format", "-N", "-i", "0"])
        .write_stdin("[]")
        .assert()
        .success()
        .stdout("[]");
}

#[test]
fn unknown_format_fails_without_output() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["format", "--format", "unknown-format"])
        .write_stdin("{}")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("ERROR:"))
        .stderr(predicate::str::contains("unknown format: unknown-format"));
}

#[test]
fn format_nquads_emits_statements() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["format", "--nquads"])
        .write_stdin(PERSON)
        .assert()
        .success()
        .stdout(PERSON_NQUADS);
}

#[test]
fn expand_applies_context() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["expand", "-i", "0"])
        .write_stdin(PERSON)
        .assert()
        .success()
        .stdout(EXPANDED_PERSON);
}

#[test]
fn compact_with_context_file() {
    let fx = Fixture::new();
    let context = fx.file("context.jsonld", CONTEXT);
    let doc = r#"{"@id": "http://example.org/jane", "http://schema.org/name": "Jane"}"#;
    fx.cmd()
        .args(["compact", "-i", "0", "-c"])
        .arg(&context)
        .write_stdin(doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"Jane\""))
        .stdout(predicate::str::contains("\"@context\""));
}

#[test]
fn compact_without_context_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("compact")
        .write_stdin(PERSON)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("ERROR: compact failed"));
}

#[test]
fn compact_cannot_read_stdin_twice() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["compact", "-", "-c", "-"])
        .write_stdin(CONTEXT)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "standard input can only be read once",
        ));
}

#[test]
fn compact_rejects_bad_boolean() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["compact", "--strict=maybe"])
        .write_stdin(PERSON)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("ERROR:"))
        .stderr(predicate::str::contains("invalid boolean value: maybe"));
}

#[test]
fn non_numeric_indent_is_reported() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["format", "-i", "abc"])
        .write_stdin(PERSON)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("ERROR: invalid value 'abc'"));
}

#[test]
fn help_still_exits_zero() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("normalize"));
}

#[test]
fn flatten_without_context_is_expanded_form() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["flatten", "-i", "0"])
        .write_stdin(PERSON)
        .assert()
        .success()
        .stdout(EXPANDED_PERSON);
}

#[test]
fn frame_selects_by_type() {
    let fx = Fixture::new();
    let doc = fx.file(
        "people.jsonld",
        r#"{
            "@context": {"name": "http://schema.org/name", "Person": "http://schema.org/Person"},
            "@graph": [
                {"@id": "http://example.org/jane", "@type": "Person", "name": "Jane"},
                {"@id": "http://example.org/acme", "name": "Acme"}
            ]
        }"#,
    );
    let frame = fx.file(
        "frame.jsonld",
        r#"{
            "@context": {"name": "http://schema.org/name", "Person": "http://schema.org/Person"},
            "@type": "Person"
        }"#,
    );
    fx.cmd()
        .args(["frame", "-i", "0"])
        .arg(&doc)
        .arg("-f")
        .arg(&frame)
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane"))
        .stdout(predicate::str::contains("Acme").not());
}

#[test]
fn normalize_nquads_labels_blank_nodes() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["normalize", "-q"])
        .write_stdin(r#"{"http://schema.org/name": "Jane"}"#)
        .assert()
        .success()
        .stdout("_:c14n0 <http://schema.org/name> \"Jane\" .\n");
}

#[test]
fn missing_file_is_reported() {
    let fx = Fixture::new();
    let missing = fx.dir.path().join("missing.jsonld");
    fx.cmd()
        .arg("expand")
        .arg(&missing)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("ERROR: failed to read input"))
        .stderr(predicate::str::contains("caused by:"));
}

#[test]
fn offline_refuses_urls() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--offline", "format", "http://example.org/doc.jsonld"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("network access is not available"));
}

#[test]
fn config_sets_default_indent() {
    let fx = Fixture::new();
    fx.file("config.toml", "[output]\nindent = 4\n");
    fx.cmd()
        .arg("format")
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n    1\n]\n");
}

#[test]
fn completion_generates_script() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jsonld"));
}
