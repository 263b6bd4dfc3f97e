//! End-to-end tests for the pluginsfetcher binary over stdio.

use assert_cmd::Command;
use predicates::prelude::*;
use pluginsfetcher_core::{Capability, PluginRecord, TokenGrant};
use pluginsfetcher_test_utils::{LEGACY_TOKEN, MONITOR_TOKEN, TestSite};
use serde_json::{Value, json};

fn pluginsfetcher_cmd() -> Command {
    Command::cargo_bin("pluginsfetcher").expect("Failed to find pluginsfetcher binary")
}

fn request(id: u64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

/// Run the binary against `site` with `lines` on stdin and parse each
/// stdout line as a response.
fn run(site: &TestSite, lines: &[String]) -> Vec<Value> {
    let output = pluginsfetcher_cmd()
        .arg("--config")
        .arg(site.config_path())
        .write_stdin(lines.join("\n") + "\n")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_get_info_over_stdio() {
    let site = TestSite::new().write();
    let responses = run(
        &site,
        &[request(
            1,
            "local_pluginsfetcher_get_info",
            json!({"wstoken": MONITOR_TOKEN, "type": "block"}),
        )],
    );

    assert_eq!(responses.len(), 1);
    let result = &responses[0]["result"];
    assert_eq!(result["pluginstats"], json!({"total": 3, "standard": 2, "contrib": 1}));
    assert_eq!(result["software"]["db"]["type"], "pgsql");
}

#[test]
fn test_one_response_per_request_in_order() {
    let site = TestSite::new().write();
    let responses = run(
        &site,
        &[
            request(1, "functions/list", json!({})),
            String::new(),
            request(2, "local_pluginsfetcher_get_info", json!({"wstoken": MONITOR_TOKEN})),
            r#"{"jsonrpc":"2.0","method":"functions/list"}"#.to_string(),
            request(3, "no/such/method", json!({})),
        ],
    );

    let ids: Vec<&Value> = responses.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3)]);
    assert_eq!(responses[2]["error"]["code"], -32601);
}

#[test]
fn test_legacy_service_enabled_by_config() {
    let call = request(
        7,
        "local_pluginsfetcher_get_information",
        json!({"wstoken": LEGACY_TOKEN, "contribonly": true}),
    );

    let disabled = TestSite::new().write();
    let responses = run(&disabled, std::slice::from_ref(&call));
    assert_eq!(responses[0]["error"]["code"], -32002);

    let enabled = TestSite::new().enable_legacy().write();
    let responses = run(&enabled, &[call]);
    let plugins = responses[0]["result"].as_array().unwrap();
    assert_eq!(plugins.len(), 4);
    assert!(plugins.iter().all(|p| p["versiondb"].is_string()));
}

#[test]
fn test_missing_snapshot_is_a_data_access_error() {
    let site = TestSite::new().without_snapshot().write();
    let responses = run(
        &site,
        &[request(1, "local_pluginsfetcher_get_info", json!({"wstoken": MONITOR_TOKEN}))],
    );

    assert_eq!(responses[0]["error"]["code"], -32000);
    assert_eq!(responses[0]["error"]["data"]["errorcode"], "dmlreadexception");
}

#[test]
fn test_missing_config_fails_to_start() {
    let temp = tempfile::TempDir::new().unwrap();
    pluginsfetcher_cmd()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_logs_stay_off_stdout() {
    let site = TestSite::new().write();
    pluginsfetcher_cmd()
        .arg("--config")
        .arg(site.config_path())
        .env("RUST_LOG", "debug")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Starting pluginsfetcher server"));
}

#[test]
fn test_rust_log_enables_crate_debug_output() {
    let site = TestSite::new().write();
    pluginsfetcher_cmd()
        .arg("--config")
        .arg(site.config_path())
        .env("RUST_LOG", "pluginsfetcher_core=debug")
        .write_stdin(
            request(1, "local_pluginsfetcher_get_info", json!({"wstoken": MONITOR_TOKEN})) + "\n",
        )
        .assert()
        .success()
        .stderr(predicate::str::contains("Collected plugin stats"));
}

#[test]
fn test_default_log_level_hides_debug_output() {
    let site = TestSite::new().write();
    pluginsfetcher_cmd()
        .arg("--config")
        .arg(site.config_path())
        .env_remove("RUST_LOG")
        .write_stdin(
            request(1, "local_pluginsfetcher_get_info", json!({"wstoken": MONITOR_TOKEN})) + "\n",
        )
        .assert()
        .success()
        .stderr(predicate::str::contains("Starting pluginsfetcher server"))
        .stderr(predicate::str::contains("Collected plugin stats").not());
}

#[test]
fn test_quoted_values_survive_the_config_file() {
    let token = r#"tok"en\with"quotes"#;
    let site = TestSite::new()
        .with_plugins(vec![
            PluginRecord::new("mod", "quiz", r#"The "Quiz""#)
                .with_version(2024100700, "4.5")
                .standard(true),
            PluginRecord::new("local", "reports", "Reports")
                .with_version(2025010100, "1.0"),
        ])
        .with_tokens(vec![TokenGrant {
            token: token.to_string(),
            user: r#"ops "night" shift"#.to_string(),
            service: "pluginsfetcher".to_string(),
            capabilities: vec![Capability::SITE_CONFIG.to_string()],
            site_admin: false,
        }])
        .write();

    let responses = run(
        &site,
        &[request(1, "local_pluginsfetcher_get_info", json!({"wstoken": token}))],
    );
    let result = &responses[0]["result"];

    assert_eq!(result["pluginstats"]["total"], site.plugins().len() as u64);
    assert_eq!(result["plugins"][0]["displayname"], r#"The "Quiz""#);
}
