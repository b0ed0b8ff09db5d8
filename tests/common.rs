use assert_cmd::cargo_bin_cmd;

/// Path to the demo model, relative to the crate root
#[allow(dead_code)]
pub const DEMO_MODEL_DIR: &str = "demos/two_day";

/// Run dacplan with default settings and check that it succeeds
#[allow(dead_code)]
pub fn assert_dacplan_runs(args: &[&str]) {
    cargo_bin_cmd!("dacplan")
        .env("DACPLAN_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .success();
}

/// Run dacplan with default settings and check that it fails
#[allow(dead_code)]
pub fn assert_dacplan_fails(args: &[&str]) {
    cargo_bin_cmd!("dacplan")
        .env("DACPLAN_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .failure();
}
