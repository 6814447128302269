//! Binary-level tests for the weft CLI.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r##"
root = "web"
out_dir = "dist"

[compiler]
project_id = "webapp"
uri_prefix = "compiled"

[service_worker]
source_template = "../worker/worker-{variant}"
max_cacheable_bytes = 4096

[manifest]
name = "Sandbox"
short_name = "Sandbox"
theme_color = "#6200ee"

[[manifest.icons]]
src = "/icons/icon-512x512.png"
sizes = "512x512"
type = "image/png"

[[proxy]]
pattern = "/ops"
target = "http://localhost:8080"

[[proxy]]
pattern = "^/tap/.*"
target = "ws://localhost:8080"
upgrade = true

[profiles.tiny.service_worker]
max_cacheable_bytes = 16
"##;

fn weft(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("weft").expect("weft binary");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("WEFT_SERVICE_WORKER__MAX_CACHEABLE_BYTES");
    cmd
}

/// Project with config, bundler root and both compiled worker variants.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    fs::write(dir.join("weft.toml"), CONFIG).unwrap();
    fs::create_dir_all(dir.join("web/dist")).unwrap();
    fs::create_dir_all(dir.join("worker/worker-fastopt")).unwrap();
    fs::create_dir_all(dir.join("worker/worker-opt")).unwrap();
    fs::write(dir.join("web/dist/index.js"), vec![b'x'; 100]).unwrap();
    temp
}

#[test]
fn serve_emits_fast_plan() {
    let temp = project();
    weft(temp.path())
        .args(["serve", "--emit", "plan.json"])
        .assert()
        .success();

    let plan = fs::read_to_string(temp.path().join("plan.json")).unwrap();
    assert!(plan.contains("worker-fastopt"));
    assert!(plan.contains("\"plugin\": \"compiler-bridge\""));
}

#[test]
fn build_prints_plan_to_stdout() {
    let temp = project();
    weft(temp.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker-opt"))
        .stdout(predicate::str::contains("worker-fastopt").not());
}

#[test]
fn build_fails_without_compiled_worker() {
    let temp = project();
    fs::remove_dir_all(temp.path().join("worker/worker-opt")).unwrap();

    weft(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("service worker source not found"));
}

#[test]
fn build_checks_assets_against_ceiling() {
    let temp = project();
    weft(temp.path())
        .args(["build", "--assets", "web/dist"])
        .assert()
        .success();

    fs::write(temp.path().join("web/dist/app.wasm"), vec![0u8; 8192]).unwrap();
    weft(temp.path())
        .args(["build", "--assets", "web/dist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("app.wasm"));
}

#[test]
fn build_names_missing_assets_dir() {
    let temp = project();
    weft(temp.path())
        .args(["build", "--assets", "web/public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assets directory not found"))
        .stderr(predicate::str::contains("public"));
}

#[test]
fn profile_lowers_ceiling() {
    let temp = project();
    weft(temp.path())
        .args(["build", "--profile", "tiny", "--assets", "web/dist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index.js"));
}

#[test]
fn env_override_lowers_ceiling() {
    let temp = project();
    weft(temp.path())
        .env("WEFT_SERVICE_WORKER__MAX_CACHEABLE_BYTES", "10")
        .args(["build", "--assets", "web/dist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index.js"));
}

#[test]
fn unknown_profile_fails() {
    let temp = project();
    weft(temp.path())
        .args(["check", "--profile", "media"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile 'media'"));
}

#[test]
fn build_writes_manifest() {
    let temp = project();
    weft(temp.path())
        .args(["build", "--write-manifest", "--emit", "plan.json"])
        .assert()
        .success();

    let manifest =
        fs::read_to_string(temp.path().join("web/dist/manifest.webmanifest")).unwrap();
    assert!(manifest.contains("\"short_name\": \"Sandbox\""));
}

#[test]
fn serve_rejects_write_manifest() {
    let temp = project();
    weft(temp.path())
        .args(["serve", "--write-manifest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only applies to build"));
}

#[test]
fn check_passes_for_both_modes() {
    let temp = project();
    weft(temp.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("All checks passed"));
}

#[test]
fn check_reports_bad_share_target() {
    let temp = project();
    let config = format!(
        "{CONFIG}\n[manifest.share_target]\naction = \"/share\"\nmethod = \"PUT\"\n"
    );
    fs::write(temp.path().join("weft.toml"), config).unwrap();

    weft(temp.path())
        .args(["check", "--schema-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("✗ serve: check failed"))
        .stderr(predicate::str::contains("share_target.method"));
}

#[test]
fn manifest_prints_json() {
    let temp = project();
    weft(temp.path())
        .arg("manifest")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"display\": \"standalone\""))
        .stdout(predicate::str::contains("\"theme_color\": \"#6200ee\""));
}

#[test]
fn proxy_reports_tunnel_and_forward() {
    let temp = project();
    weft(temp.path())
        .args(["proxy", "/tap/session1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://localhost:8080 (tunnel"));

    weft(temp.path())
        .args(["proxy", "/ops/health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(forward"));

    weft(temp.path())
        .args(["proxy", "/index.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("served locally"));
}

#[test]
fn missing_config_fails() {
    let temp = TempDir::new().unwrap();
    weft(temp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weft.toml"));
}

#[test]
fn init_writes_config_once() {
    let temp = TempDir::new().unwrap();
    weft(temp.path()).arg("init").assert().success();
    assert!(temp.path().join("weft.toml").is_file());

    weft(temp.path())
        .args(["check", "--schema-only"])
        .assert()
        .success();

    weft(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    weft(temp.path()).args(["init", "--force"]).assert().success();
}
