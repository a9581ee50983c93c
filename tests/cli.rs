use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn gitdata(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("gitdata").unwrap();
    cmd.env_remove("GITDATA_AUTHUSER")
        .env_remove("RUST_LOG")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("members"))
        .stdout(predicate::str::contains("collabs"));
}

#[test]
fn listfields_needs_no_target() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .args(["repos", "--listfields"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default fields for"))
        .stdout(predicate::str::contains("owner.login"));
}

#[test]
fn bad_output_filename_is_rejected() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .args(["repos", "--org", "acme", "--filename", "out.txt", "--source", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be .CSV or .JSON"));
}

#[test]
fn members_requires_a_target() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .args(["members", "--source", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("members requires --org or --team"));
}

#[test]
fn cache_only_query_without_entry_reports_missing_data() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    gitdata(dir.path())
        .args(["config", "set", "cache_dir"])
        .arg(&cache_dir)
        .assert()
        .success();

    gitdata(dir.path())
        .args(["teams", "--org", "acme", "--source", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ERROR: cached data requested, but none found.",
        ))
        .stdout(predicate::str::contains("No records found."));
}

#[test]
fn config_set_then_show() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .args(["config", "set", "default_source", "cache"])
        .assert()
        .success();

    gitdata(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"default_source\s+c").unwrap());

    gitdata(dir.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure();

    gitdata(dir.path())
        .args(["config", "set", "per_page", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a number from 1 to 100"));
}

#[test]
fn auth_round_trip() {
    let dir = tempdir().unwrap();
    gitdata(dir.path())
        .args(["auth", "set", "octocat", "--token", "ghp_abcdef"])
        .assert()
        .success();

    gitdata(dir.path())
        .args(["auth", "status", "octocat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gh...ef"));

    gitdata(dir.path())
        .args(["auth", "delete", "octocat"])
        .assert()
        .success();

    gitdata(dir.path())
        .args(["auth", "status", "octocat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("*none*"));
}
