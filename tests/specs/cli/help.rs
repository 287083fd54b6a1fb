//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let pair = Pair::new("help");
    pair.vigil()
        .args(&["--help"])
        .passes()
        .stdout_has("demo")
        .stdout_has("inspect")
        .stdout_has("cleanup");
}

#[test]
fn demo_help_shows_duration_flag() {
    let pair = Pair::new("demo-help");
    pair.vigil()
        .args(&["demo", "--help"])
        .passes()
        .stdout_has("--seconds");
}
