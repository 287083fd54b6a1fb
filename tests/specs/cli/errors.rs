//! Error reporting specs

use crate::prelude::*;

#[test]
fn vigild_without_program_prints_usage() {
    let pair = Pair::new("usage");
    let run = pair.vigild().fails().stderr_has("usage: vigild");
    assert_eq!(run.code(), Some(2));
}

#[test]
fn vigild_with_separator_only_prints_usage() {
    let pair = Pair::new("usage-sep");
    pair.vigild().args(&["--"]).fails().stderr_has("usage: vigild");
}

#[test]
fn unknown_command_fails() {
    let pair = Pair::new("unknown");
    pair.vigil().args(&["frobnicate"]).fails();
}

#[test]
fn bad_duration_setting_names_the_variable() {
    let pair = Pair::new("bad-env");
    pair.vigil()
        .env("VIGIL_STOP_INTERVAL", "eventually")
        .args(&["inspect"])
        .fails()
        .stderr_has("VIGIL_STOP_INTERVAL");
}

#[test]
fn missing_config_file_is_reported() {
    let pair = Pair::new("no-config");
    pair.vigil()
        .env("VIGIL_CONFIG", "/nonexistent/vigil.toml")
        .args(&["inspect"])
        .fails()
        .stderr_has("/nonexistent/vigil.toml");
}

#[test]
fn fresh_namespace_has_no_semaphores() {
    let pair = Pair::new("fresh");
    assert!(!pair.semaphores_present());
    pair.vigil()
        .args(&["cleanup"])
        .passes()
        .stdout_has("Nothing to clean up");
}
