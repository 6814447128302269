//! End-to-end plan resolution from a full configuration.

use serde_json::{Value, json};
use weft_config::{
    ArtifactVariant, BuildContext, ManifestDescriptor, Mode, PluginKind, PluginSpec, ProxyRuleConfig,
    ProxyTable, RouteKind, WeftConfig,
};

fn full_config() -> Value {
    json!({
        "root": "./web",
        "out_dir": "./dist",
        "server": { "cors": true },
        "preview": { "port": 8090 },
        "compiler": { "cwd": ".", "project_id": "webapp", "uri_prefix": "compiled" },
        "service_worker": {
            "source_template": "../serviceworker/target/app-serviceworker-{variant}",
            "filename": "sw.js",
            "strategy": "inject-manifest",
            "max_cacheable_bytes": 18000000,
            "dev_enabled": true
        },
        "manifest": {
            "name": "Sandbox Messaging",
            "short_name": "Sandbox",
            "description": "Demo sandbox",
            "theme_color": "#6200ee",
            "background_color": "#018786",
            "display": "standalone",
            "scope": "/",
            "start_url": "/",
            "lang": "en",
            "categories": ["education", "messaging"],
            "icons": [
                { "src": "https://cdn.example.com/icons/icon-72x72.png", "sizes": "72x72", "type": "image/png" },
                { "src": "https://cdn.example.com/icons/icon-144x144.png", "sizes": "144x144", "type": "image/png", "purpose": "any maskable" },
                { "src": "https://cdn.example.com/icons/icon-512x512.png", "sizes": "512x512", "type": "image/png" }
            ],
            "protocol_handlers": [{ "protocol": "did", "url": "/#/resolver/%s" }],
            "shortcuts": [{ "name": "Mediator", "url": "/#/mediator" }],
            "share_target": {
                "action": "/#/?_oob=",
                "method": "POST",
                "enctype": "multipart/form-data",
                "params": {
                    "title": "name",
                    "text": "description",
                    "url": "link",
                    "files": [
                        { "name": "lists", "accept": ["text/csv", ".csv"] },
                        { "name": "photos", "accept": ["image/svg+xml", ".svg"] },
                        { "name": "image", "accept": ["image/jpeg", "image/jfif", ".jpeg", ".jpe", ".jpg", ".jfif", ".jfi"] },
                        { "name": "file", "accept": ["*/*"] }
                    ]
                }
            }
        },
        "proxy": [
            { "pattern": "/ops", "target": "http://localhost:8080" },
            { "pattern": "/makeKey/X25519", "target": "http://localhost:8080" },
            { "pattern": "/makeKey/Ed25519", "target": "http://localhost:8080" },
            { "pattern": "^/ws", "target": "ws://localhost:8080", "ws": true }
        ]
    })
}

fn config() -> WeftConfig {
    WeftConfig::from_value(full_config()).expect("valid config")
}

#[test]
fn serve_uses_fast_variant() {
    let plan = config().resolve_plan(BuildContext::serve()).unwrap();

    match plan.plugin(PluginKind::CompilerBridge).unwrap() {
        PluginSpec::CompilerBridge(bridge) => assert_eq!(bridge.variant, ArtifactVariant::Fast),
        other => panic!("unexpected plugin {other:?}"),
    }
    let sw = plan.service_worker().unwrap();
    assert!(sw.source_path.to_string_lossy().contains("fastopt"));
    assert!(sw.dev_enabled);
    assert_eq!(sw.max_cacheable_bytes, 18_000_000);
}

#[test]
fn build_uses_optimized_variant() {
    let plan = config()
        .resolve_plan(BuildContext::new(Mode::Build, false))
        .unwrap();

    match plan.plugin(PluginKind::CompilerBridge).unwrap() {
        PluginSpec::CompilerBridge(bridge) => {
            assert_eq!(bridge.variant, ArtifactVariant::Optimized)
        }
        other => panic!("unexpected plugin {other:?}"),
    }
    let source = plan
        .service_worker()
        .unwrap()
        .source_path
        .to_string_lossy()
        .into_owned();
    assert!(source.ends_with("app-serviceworker-opt"));
    assert!(!source.contains("fastopt"));
    assert!(!plan.service_worker().unwrap().dev_enabled);
}

#[test]
fn upgrade_rule_tunnels_tap_sessions() {
    let table = ProxyTable::build(vec![
        ProxyRuleConfig::new("^/tap/.*", "ws://localhost:8080").upgrade(true),
    ])
    .unwrap();

    let route = table.resolve("/tap/session1").expect("route");
    assert_eq!(route.kind, RouteKind::Tunnel);
    assert_eq!(route.rule.target_str(), "ws://localhost:8080");
    assert_eq!(route.target().host_str(), Some("localhost"));
    assert_eq!(route.target().port(), Some(8080));
}

#[test]
fn configured_proxy_table_keeps_declaration_order() {
    let plan = config().resolve_plan(BuildContext::serve()).unwrap();
    let patterns: Vec<&str> = plan.proxy.iter().map(|rule| rule.pattern()).collect();
    assert_eq!(
        patterns,
        vec!["/ops", "/makeKey/X25519", "/makeKey/Ed25519", "^/ws"]
    );

    assert_eq!(
        plan.proxy.resolve("/ws").unwrap().kind,
        RouteKind::Tunnel
    );
    assert_eq!(
        plan.proxy.resolve("/ops/health").unwrap().kind,
        RouteKind::Forward
    );
}

#[test]
fn manifest_round_trips_through_json() {
    let plan = config().resolve_plan(BuildContext::build()).unwrap();
    let manifest = plan.manifest().unwrap();

    let json = manifest.to_json().unwrap();
    let parsed = ManifestDescriptor::from_json(&json).unwrap();
    assert_eq!(&parsed, manifest);

    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["share_target"]["params"]["files"][2]["accept"][3], ".jpe");
    assert_eq!(value["protocol_handlers"][0]["url"], "/#/resolver/%s");
}

#[test]
fn plan_serializes_and_reloads() {
    let plan = config().resolve_plan(BuildContext::build()).unwrap();
    let json = serde_json::to_string(&plan).unwrap();
    let reloaded: weft_config::PipelinePlan = serde_json::from_str(&json).unwrap();

    assert_eq!(reloaded.plugin_order(), plan.plugin_order());
    assert_eq!(reloaded.proxy.len(), plan.proxy.len());
    assert_eq!(reloaded.manifest(), plan.manifest());
    reloaded.verify_order().unwrap();
}

#[test]
fn put_share_target_fails_the_whole_plan() {
    let mut value = full_config();
    value["manifest"]["share_target"]["method"] = json!("PUT");
    let err = WeftConfig::from_value(value)
        .unwrap()
        .resolve_plan(BuildContext::build())
        .unwrap_err();
    assert_eq!(err.field(), Some("manifest.share_target.method"));
}
