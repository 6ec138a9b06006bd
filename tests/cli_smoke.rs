use assert_cmd::prelude::*;
use httpmock::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

// Points the binary at a port nothing listens on, with a token set so the
// `gh` session is never consulted.
fn contrib() -> Command {
    let mut cmd = Command::cargo_bin("gh-contrib").unwrap();
    cmd.env("GH_TOKEN", "dummy")
        .env("GH_CONTRIB_API_URL", "http://127.0.0.1:9")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_date_flags() {
    let output = contrib().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--from"), "help was: {stdout}");
    assert!(stdout.contains("--to"), "help was: {stdout}");
}

#[test]
fn malformed_date_exits_non_zero() {
    let output = contrib().args(["--from", "2024-13-40"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid 'from' date format"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn reversed_range_exits_non_zero() {
    let output = contrib()
        .args(["--from", "2024-02-01", "--to", "2024-01-01"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not be after"), "stderr was: {stderr}");
}

#[test]
fn unreachable_api_is_reported_as_auth_failure() {
    let output = contrib().arg("--skip-version-check").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("authentication failed"), "stderr was: {stderr}");
}

#[test]
fn redirected_stderr_gets_no_escape_codes() {
    let output = contrib()
        .env_remove("NO_COLOR")
        .env("CLICOLOR_FORCE", "1")
        .args(["--from", "not-a-date"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr was: {stderr:?}");
    assert!(!stderr.contains('\u{1b}'), "stderr was: {stderr:?}");
}

#[test]
fn prints_table_then_upgrade_advisory() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(serde_json::json!({ "login": "octocat" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(serde_json::json!({
            "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                "totalContributions": 4,
                "weeks": [{ "contributionDays": [
                    { "contributionCount": 4, "contributionLevel": "FOURTH_QUARTILE", "date": "2024-01-02" }
                ]}]
            }}}}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/someone/gh-contrib/releases/latest");
        then.status(200).json_body(serde_json::json!({ "tag_name": "v1.1.0" }));
    });

    let data_dir = tempdir().unwrap();
    let ext_dir = data_dir.path().join("extensions").join("gh-contrib");
    fs::create_dir_all(&ext_dir).unwrap();
    fs::write(
        ext_dir.join("manifest.yml"),
        "owner: someone\nname: gh-contrib\nhost: github.com\ntag: v1.0.0\n",
    )
    .unwrap();

    let output = contrib()
        .env("GH_CONTRIB_API_URL", server.base_url())
        .env("GH_DATA_DIR", data_dir.path())
        .env_remove("GH_HOST")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr was: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("FOURTH_QUARTILE"), "stdout was: {stdout}");
    assert!(
        stdout.contains("your contrib extension is out of date: v1.0.0 -> v1.1.0"),
        "stdout was: {stdout}"
    );
    assert!(stdout.contains("gh extension upgrade contrib"), "stdout was: {stdout}");
}
