mod support;

use serde_json::json;

use mcpconf_core::propagation::{BatchStatus, BatchSummary, EnvTarget};
use mcpconf_core::types::FormatTag;

use support::{Sandbox, entry};

fn three_clients() -> Sandbox {
    Sandbox::new(&[
        ("c1", FormatTag::McpServers),
        ("c2", FormatTag::NestedMcpServers),
        ("c3", FormatTag::McpServers),
    ])
}

#[test]
fn copy_server_missing_source_is_not_found_and_writes_nothing() {
    let sandbox = three_clients();
    sandbox.write_client("c1", &json!({"mcpServers": {"other": {"command": "x"}}}));

    let err = sandbox
        .manager
        .copy_server("c1", "s1", "c2", None)
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!sandbox.client_path("c2").exists());
}

#[test]
fn copy_server_renames_and_overwrites_target() {
    let sandbox = three_clients();
    sandbox.write_client("c1", &json!({"mcpServers": {"s1": {"command": "npx", "args": ["a"]}}}));
    sandbox.write_client("c2", &json!({"mcp": {"servers": {"copy": {"command": "old"}}}}));

    sandbox
        .manager
        .copy_server("c1", "s1", "c2", Some("copy"))
        .unwrap();

    assert_eq!(
        sandbox.read_client("c2")["mcp"]["servers"]["copy"],
        json!({"command": "npx", "args": ["a"]})
    );
}

#[test]
fn rename_across_clients_reports_per_client_outcome() {
    let sandbox = three_clients();
    sandbox.write_global(&json!({"old": {"command": "node"}}));
    sandbox.write_client("c1", &json!({"mcpServers": {"old": {"command": "npx"}}}));
    sandbox.write_client("c2", &json!({"mcp": {"servers": {"old": {"args": ["--x"]}}}}));
    sandbox.write_client("c3", &json!({"mcpServers": {"unrelated": {"command": "uvx"}}}));

    let report = sandbox
        .manager
        .rename_server_across_clients("old", "new")
        .unwrap();

    assert!(report.global_renamed);
    assert_eq!(sandbox.read_global(), json!({"new": {"command": "node"}}));

    let summary = BatchSummary::of(&report.results);
    assert_eq!(summary.applied, 2);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.failed, 0);

    let missing = report
        .results
        .iter()
        .find(|r| r.status == BatchStatus::NotFound)
        .unwrap();
    assert_eq!(missing.client, "c3");
    assert!(!missing.success);
    assert!(missing.error.is_none());

    assert_eq!(
        sandbox.read_client("c1")["mcpServers"],
        json!({"new": {"command": "npx"}})
    );
    assert!(sandbox.read_client("c2")["mcp"]["servers"].get("old").is_none());
    assert_eq!(
        sandbox.manager.read_config("c2").unwrap().servers["new"],
        entry(json!({"command": "node", "args": ["--x"]}))
    );
}

#[test]
fn rename_to_same_name_is_noop() {
    let sandbox = three_clients();
    sandbox.write_global(&json!({"s": {"command": "node"}}));

    let report = sandbox.manager.rename_server_across_clients("s", "s").unwrap();

    assert!(report.unchanged);
    assert!(!report.global_renamed);
    assert!(report.results.is_empty());
    assert_eq!(sandbox.read_global(), json!({"s": {"command": "node"}}));
}

#[test]
fn unset_env_removes_key_everywhere_and_keeps_others() {
    let sandbox = three_clients();
    sandbox.write_client(
        "c1",
        &json!({"mcpServers": {
            "a": {"command": "x", "env": {"KEY": "1", "KEEP": "k"}},
            "b": {"command": "y", "env": {"KEY": "2"}},
            "c": {"command": "z", "env": {"OTHER": "o"}}
        }}),
    );
    sandbox.write_client(
        "c2",
        &json!({"mcp": {"servers": {"d": {"env": {"KEY": "3"}}}}}),
    );

    let results = sandbox
        .manager
        .update_environment_variable_across_configs("KEY", None, None)
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    let a = results.iter().find(|r| r.server.as_deref() == Some("a")).unwrap();
    assert_eq!(a.old_value.as_deref(), Some("1"));
    assert!(a.new_value.is_none());

    let c1 = sandbox.read_client("c1");
    assert_eq!(c1["mcpServers"]["a"]["env"], json!({"KEEP": "k"}));
    assert_eq!(c1["mcpServers"]["b"]["env"], json!({}));
    assert_eq!(c1["mcpServers"]["c"]["env"], json!({"OTHER": "o"}));
    assert_eq!(
        sandbox.read_client("c2")["mcp"]["servers"]["d"]["env"],
        json!({})
    );
    assert!(!sandbox.client_path("c3").exists());
}

#[test]
fn set_env_respects_target_filter() {
    let sandbox = three_clients();
    sandbox.write_client(
        "c1",
        &json!({"mcpServers": {
            "a": {"env": {"TOKEN": "old"}},
            "b": {"env": {"TOKEN": "old"}}
        }}),
    );

    let targets = vec![EnvTarget::new("c1", "b")];
    let results = sandbox
        .manager
        .update_environment_variable_across_configs("TOKEN", Some("new"), Some(&targets))
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].server.as_deref(), Some("b"));
    assert_eq!(results[0].new_value.as_deref(), Some("new"));

    let body = sandbox.read_client("c1");
    assert_eq!(body["mcpServers"]["a"]["env"]["TOKEN"], "old");
    assert_eq!(body["mcpServers"]["b"]["env"]["TOKEN"], "new");
}

#[test]
fn env_update_records_unreadable_client_as_failure() {
    let sandbox = three_clients();
    sandbox.write_client("c1", &json!({"mcpServers": {"a": {"env": {"K": "1"}}}}));
    sandbox.write_client_raw("c3", "not json at all");

    let results = sandbox
        .manager
        .update_environment_variable_across_configs("K", Some("2"), None)
        .unwrap();

    let failed: Vec<_> = results.iter().filter(|r| !r.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].client, "c3");
    assert!(failed[0].server.is_none());
    assert!(failed[0].error.is_some());
    assert_eq!(sandbox.read_client("c1")["mcpServers"]["a"]["env"]["K"], "2");
}

#[test]
fn plan_env_update_writes_nothing() {
    let sandbox = three_clients();
    let body = json!({"mcpServers": {"a": {"env": {"K": "1"}}}});
    sandbox.write_client("c1", &body);

    let results = sandbox.manager.plan_env_update("K", Some("2"), None).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].old_value.as_deref(), Some("1"));
    assert_eq!(sandbox.read_client("c1"), body);
}

#[test]
fn add_to_multiple_clients_continues_past_failures() {
    let sandbox = Sandbox::new(&[("good", FormatTag::McpServers), ("bad", FormatTag::McpServers)]);
    // A directory where the bad client's file should be
    std::fs::create_dir_all(sandbox.client_path("bad")).unwrap();

    let cfg = entry(json!({"command": "npx", "args": ["-y", "pkg"]}));
    let ids = vec!["good".to_string(), "bad".to_string(), "ghost".to_string()];
    let results = sandbox
        .manager
        .add_server_to_multiple_clients("s", &cfg, &ids)
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(!results[2].success);
    assert!(results[2].error.as_deref().unwrap().contains("Unknown client"));
    assert_eq!(results[0].client_name.as_deref(), Some("Client good"));
    assert_eq!(sandbox.read_client("good")["mcpServers"]["s"]["command"], "npx");
}

#[test]
fn add_to_multiple_clients_applies_to_each() {
    let sandbox = three_clients();
    let cfg = entry(json!({"command": "npx"}));
    let ids = vec!["c1".to_string(), "c2".to_string()];

    let results = sandbox
        .manager
        .add_server_to_multiple_clients("s", &cfg, &ids)
        .unwrap();

    assert!(results.iter().all(|r| r.success));
    assert_eq!(sandbox.read_client("c1")["mcpServers"]["s"]["command"], "npx");
    assert_eq!(sandbox.read_client("c2")["mcp"]["servers"]["s"]["command"], "npx");
}

#[test]
fn add_to_multiple_clients_requires_targets() {
    let sandbox = three_clients();
    let err = sandbox
        .manager
        .add_server_to_multiple_clients("s", &entry(json!({})), &[])
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn remove_from_all_clients() {
    let sandbox = three_clients();
    sandbox.write_client("c1", &json!({"mcpServers": {"s": {"command": "x"}, "t": {}}}));
    sandbox.write_client("c2", &json!({"mcp": {"servers": {}}}));

    let results = sandbox.manager.remove_server_from_all_clients("s").unwrap();

    let summary = BatchSummary::of(&results);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(sandbox.read_client("c1")["mcpServers"], json!({"t": {}}));
}

#[test]
fn copy_to_all_skips_source_and_undetected_clients() {
    let sandbox = three_clients();
    sandbox.write_client("c1", &json!({"mcpServers": {"s": {"command": "npx"}}}));
    sandbox.write_client("c2", &json!({"mcp": {"servers": {}}}));

    let results = sandbox
        .manager
        .copy_server_to_all_clients("c1", "s", None)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].client, "c2");
    assert!(results[0].success);
    assert_eq!(sandbox.read_client("c2")["mcp"]["servers"]["s"]["command"], "npx");
    assert!(!sandbox.client_path("c3").exists());
}
