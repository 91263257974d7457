#![cfg(unix)]

use std::fs;
use std::path::Path;
use tc_core::script::ScriptValue;
use tc_core::{Context, ContextOptions};
use tempfile::TempDir;

const SHELL: &str = "/bin/sh";

fn write_fixture(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("fixture file should be written");
}

fn minimal_scripts_dir() -> TempDir {
    let temp = TempDir::new().expect("tempdir should be created");
    write_fixture(
        temp.path(),
        "tc-prefs.txt",
        "calcmode 1\ndataset 55\nscriptfile test\n",
    );
    write_fixture(
        temp.path(),
        "tc-test.txt",
        concat!(
            "axfile mb50NCKFMASHTO\n",
            "rbi H2O SiO2 Al2O3\n",
            "rbi g 0.18 3.0 0.98 1.2\n",
            "xyzguess x(g) 0.885\n",
        ),
    );
    write_fixture(temp.path(), "tc-ds55.txt", "opaque dataset bytes\n");
    write_fixture(temp.path(), "tc-mb50NCKFMASHTO.txt", "opaque axfile bytes\n");
    temp
}

fn context_for(scripts: &TempDir, scratch: &TempDir) -> Context {
    Context::new(
        ContextOptions::new()
            .scripts_dir(scripts.path())
            .executable(SHELL)
            .temp_dir(scratch.path().join("work"))
            .fixed_id("abcdef"),
    )
    .expect("context over the minimal fixture should load")
}

#[test]
fn minimal_fixture_reloads_and_validates() {
    let scripts = minimal_scripts_dir();
    let scratch = TempDir::new().expect("tempdir should be created");
    let context = context_for(&scripts, &scratch);

    context.check_config().expect("minimal fixture should validate");
    assert_eq!(context.prefs().get("dataset").map(String::as_str), Some("55"));
    assert_eq!(context.prefs().get("scriptfile").map(String::as_str), Some("test"));

    let rbi = context.script().rbi().expect("script should hold one rbi table");
    assert_eq!(rbi.len(), 1);
    let guesses = context.script().guesses().expect("script should hold guesses");
    assert_eq!(guesses.len(), 1);
}

#[test]
fn reload_discards_in_memory_mutations() {
    let scripts = minimal_scripts_dir();
    let scratch = TempDir::new().expect("tempdir should be created");
    let mut context = context_for(&scripts, &scratch);

    context
        .script_mut()
        .set("dogmin", ScriptValue::Scalar("yes 2".to_string()));
    assert!(context.script().contains("dogmin"));

    context.reload().expect("reload should succeed");
    assert!(!context.script().contains("dogmin"));
    assert!(context.script().rbi().is_some());
}

#[test]
fn axfile_key_without_value_fails_validation() {
    let scripts = minimal_scripts_dir();
    write_fixture(
        scripts.path(),
        "tc-test.txt",
        "axfile\nrbi H2O\nrbi g 0.5 1.0\n",
    );
    let scratch = TempDir::new().expect("tempdir should be created");

    let error = Context::new(
        ContextOptions::new()
            .scripts_dir(scripts.path())
            .executable(SHELL)
            .temp_dir(scratch.path().join("work")),
    )
    .expect_err("valueless axfile should fail validation");

    assert_eq!(error.code(), "CONFIG.AXFILE");
    assert!(!scratch.path().join("work").exists(), "no scratch dir on failure");
}

#[test]
fn missing_prefs_file_is_fatal() {
    let temp = TempDir::new().expect("tempdir should be created");
    let error = Context::new(
        ContextOptions::new()
            .scripts_dir(temp.path())
            .executable(SHELL),
    )
    .expect_err("empty scripts dir should fail");
    assert_eq!(error.code(), "CONFIG.PREFS_MISSING");
    assert!(error.message().contains("tc-prefs.txt"));
}

#[test]
fn missing_dataset_file_is_fatal_and_names_it() {
    let scripts = minimal_scripts_dir();
    fs::remove_file(scripts.path().join("tc-ds55.txt")).expect("fixture removal");
    let error = Context::new(
        ContextOptions::new()
            .scripts_dir(scripts.path())
            .executable(SHELL),
    )
    .expect_err("missing dataset file should fail");
    assert_eq!(error.code(), "CONFIG.DATASET_FILE");
    assert!(error.message().contains("tc-ds55.txt"));
}

#[test]
fn unsupported_calcmode_is_fatal() {
    let scripts = minimal_scripts_dir();
    write_fixture(
        scripts.path(),
        "tc-prefs.txt",
        "calcmode 2\ndataset 55\nscriptfile test\n",
    );
    let error = Context::new(
        ContextOptions::new()
            .scripts_dir(scripts.path())
            .executable(SHELL),
    )
    .expect_err("calcmode 2 should be rejected");
    assert_eq!(error.code(), "CONFIG.CALCMODE");
}

#[test]
fn unresolvable_executable_fails_before_any_disk_state() {
    let scripts = minimal_scripts_dir();
    let scratch = TempDir::new().expect("tempdir should be created");
    let error = Context::new(
        ContextOptions::new()
            .scripts_dir(scripts.path())
            .executable("/no/such/binary/anywhere")
            .temp_dir(scratch.path().join("work")),
    )
    .expect_err("bogus executable should fail construction");
    assert_eq!(error.code(), "CONFIG.EXECUTABLE");
    assert!(!scratch.path().join("work").exists());
}

#[test]
fn empty_context_has_defaults_but_fails_validation() {
    let scratch = TempDir::new().expect("tempdir should be created");
    let context = Context::new(
        ContextOptions::new()
            .executable(SHELL)
            .temp_dir(scratch.path().join("work"))
            .fixed_id("zzzzzz"),
    )
    .expect("empty context should construct");

    assert_eq!(context.prefs().get("calcmode").map(String::as_str), Some("1"));
    assert_eq!(context.prefs().get("scriptfile").map(String::as_str), Some("zzzzzz"));
    assert_eq!(context.script().get("axfile"), Some(&ScriptValue::Empty));

    let error = context.check_config().expect_err("no dataset configured yet");
    assert_eq!(error.code(), "CONFIG.DATASET");
}
