mod support;

use serde_json::json;

use mcpconf_core::transfer::{ImportKind, write_export};
use mcpconf_core::types::FormatTag;

use support::{Sandbox, write_json};

fn sandbox() -> Sandbox {
    Sandbox::new(&[("a", FormatTag::McpServers), ("b", FormatTag::NestedMcpServers)])
}

#[test]
fn env_index_groups_locations_by_sorted_key() {
    let sandbox = sandbox();
    sandbox.write_client(
        "a",
        &json!({"mcpServers": {"s1": {"env": {"ZED": "z", "API_KEY": "k1"}}}}),
    );
    sandbox.write_client("b", &json!({"mcp": {"servers": {"s2": {"env": {"API_KEY": "k2"}}}}}));

    let index = sandbox.manager.get_all_environment_variables();

    let keys: Vec<_> = index.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["API_KEY", "ZED"]);
    assert_eq!(index[0].locations.len(), 2);
    assert_eq!(index[0].locations[0].client_id, "a");
    assert_eq!(index[0].locations[0].client_display_name, "Client a");
    assert_eq!(index[0].locations[1].server_name, "s2");
    assert_eq!(index[0].locations[1].value, "k2");
}

#[test]
fn env_index_skips_unreadable_clients() {
    let sandbox = sandbox();
    sandbox.write_client("a", &json!({"mcpServers": {"s1": {"env": {"K": "v"}}}}));
    sandbox.write_client_raw("b", "{{{");

    let index = sandbox.manager.get_all_environment_variables();

    assert_eq!(index.len(), 1);
    assert_eq!(index[0].locations.len(), 1);
    assert!(sandbox.manager.find_environment_variable("K").is_some());
    assert!(sandbox.manager.find_environment_variable("MISSING").is_none());
}

#[test]
fn list_clients_reports_detected_clients() {
    let sandbox = sandbox();
    sandbox.write_client("a", &json!({"mcpServers": {"x": {}, "y": {}}}));
    sandbox.write_global(&json!({"g": {"command": "node"}}));

    let clients = sandbox.manager.list_clients();

    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].id, "a");
    assert_eq!(clients[0].server_count, 3);
    assert!(clients[0].exists);
    assert_eq!(
        sandbox.manager.supported_clients(),
        vec![("a".to_string(), "Client a".to_string())]
    );
}

#[test]
fn servers_in_clients_marks_global_and_client_membership() {
    let sandbox = sandbox();
    sandbox.write_global(&json!({"g": {"command": "node"}}));
    sandbox.write_client("a", &json!({"mcpServers": {"x": {"command": "npx"}}}));
    sandbox.write_client("b", &json!({"mcp": {"servers": {"x": {"command": "npx", "env": {"T": "1"}}}}}));

    let inventory = sandbox.manager.servers_in_clients().unwrap();

    assert!(inventory["g"].global);
    assert_eq!(inventory["g"].clients.len(), 2);
    assert!(!inventory["x"].global);
    let ids: Vec<_> = inventory["x"].clients.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn export_then_import_config_into_another_client() {
    let sandbox = sandbox();
    sandbox.write_client("a", &json!({"mcpServers": {"x": {"command": "npx", "disabled": true}}}));
    sandbox.write_global(&json!({"g": {"command": "node"}}));

    let export = sandbox.manager.export_config("a").unwrap();
    assert_eq!(export.client, "a");
    assert!(export.timestamp.ends_with('Z'));
    assert!(export.servers.contains_key("g"));

    let path = sandbox.temp.path().join("exports/a.json");
    write_export(&path, &export).unwrap();

    let kind = sandbox.manager.import_config("b", &path).unwrap();

    assert_eq!(kind, ImportKind::Servers(2));
    assert_eq!(
        sandbox.read_client("b"),
        json!({"mcp": {"servers": {"x": {"command": "npx", "disabled": true}}}})
    );
    let imported = sandbox.manager.read_config("b").unwrap();
    assert_eq!(imported.servers.len(), 2);
}

#[test]
fn export_server_and_import_single_entry() {
    let sandbox = sandbox();
    sandbox.write_client("a", &json!({"mcpServers": {"x": {"command": "npx"}}}));
    sandbox.write_client("b", &json!({"mcp": {"servers": {"keep": {"command": "uvx"}}}}));

    let export = sandbox.manager.export_server("a", "x").unwrap();
    let path = sandbox.temp.path().join("x.json");
    write_export(&path, &export).unwrap();

    assert_eq!(sandbox.manager.import_config("b", &path).unwrap(), ImportKind::Server);
    let servers = &sandbox.read_client("b")["mcp"]["servers"];
    assert_eq!(servers["keep"]["command"], "uvx");
    assert_eq!(servers["x"]["command"], "npx");
}

#[test]
fn export_server_missing_is_not_found() {
    let sandbox = sandbox();
    assert!(sandbox.manager.export_server("a", "x").unwrap_err().is_not_found());
}

#[test]
fn import_rejects_unrecognised_document() {
    let sandbox = sandbox();
    let path = sandbox.temp.path().join("weird.json");
    write_json(&path, &json!({"hello": "world"}));

    let err = sandbox.manager.import_config("a", &path).unwrap_err();

    assert_eq!(err.kind(), "validation");
    assert!(!sandbox.client_path("a").exists());
}
