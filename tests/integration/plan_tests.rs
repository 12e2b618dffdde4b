use mpa::core::{plan_for, BuildPlan, ChunkName, Mode, ModeResolver, ProjectSettings};
use mpa::utils::ConfigLoader;
use regex::Regex;
use std::path::PathBuf;

fn settings(pages: &[&str]) -> ProjectSettings {
    ConfigLoader::merge_with_cli(
        None,
        PathBuf::from("."),
        Some(pages.iter().map(|p| p.to_string()).collect()),
        None,
        None,
    )
}

fn plan(pages: &[&str], signal: Option<&str>) -> BuildPlan {
    let settings = settings(pages);
    let resolver = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone());
    plan_for(&settings, &resolver.resolve(signal)).expect("plan should assemble")
}

#[test]
fn test_prod_plan_for_two_pages() {
    let plan = plan(&["pageA", "pageB"], Some("prod"));

    assert_eq!(plan.mode, Mode::Prod);
    assert_eq!(plan.html_targets.len(), 2);

    for target in &plan.html_targets {
        assert_eq!(
            target.chunks,
            vec![
                ChunkName::Manifest,
                ChunkName::Vendor,
                ChunkName::Polyfill,
                ChunkName::Page(target.page.clone()),
            ]
        );
        assert!(target.minify.is_some());
        assert_eq!(target.favicon, PathBuf::from("./static/favicon.ico"));
    }

    let re = Regex::new(r"^js/[\w-]+\.[0-9a-f]{20}\.js$").unwrap();
    for entry in &plan.entries {
        let name = entry.name.to_string();
        let rendered = plan.output.entry_file(&name, name.as_bytes());
        assert!(re.is_match(&rendered), "{}", rendered);
    }

    assert_eq!(plan.chunk_graph.depends_on(&ChunkName::Manifest), &[ChunkName::Vendor]);
    assert!(plan.chunk_graph.splitting);
    assert!(plan.has_step("minify-js"));
    assert!(plan.has_step("copy-static"));
    assert!(!plan.has_step("hot-module-replacement"));
    assert!(plan.devtool.is_none());
    assert!(plan.dev_server.is_none());
}

#[test]
fn test_dev_plan_is_unhashed_with_proxy() {
    let plan = plan(&["pageA", "pageB", "pageC"], Some("dev"));

    assert_eq!(plan.mode, Mode::Dev);
    assert!(!plan.output.is_hashed());
    assert!(!plan.output.filename.contains("hash"));
    assert!(!plan.output.chunk_filename.contains("hash"));

    let server = plan.dev_server.as_ref().expect("dev server");
    assert_eq!(server.port, 9000);
    assert!(server.hot);
    assert_eq!(server.proxy.len(), 1);
    assert_eq!(server.proxy[0].prefix, "/cloud_account");
    assert!(server.proxy_for("/cloud_account/login").is_some());
    assert!(server.proxy_for("/api/users").is_none());

    assert!(plan.has_step("hot-module-replacement"));
    assert!(!plan.has_step("copy-static"));
    assert!(plan.devtool.is_some());
    assert_eq!(plan.html_targets.len(), 3);
}

#[test]
fn test_unknown_signal_falls_back_to_base() {
    let plan = plan(&["pageA"], Some("staging"));

    assert_eq!(plan.mode, Mode::Base);
    assert_eq!(plan.html_targets.len(), 1);
    assert_eq!(plan.entries[0].name, ChunkName::Polyfill);
    assert!(plan.dev_server.is_none());
    assert!(!plan.chunk_graph.splitting);
    assert!(!plan.has_step("minify-js"));
    assert!(!plan.has_step("hot-module-replacement"));
}

#[test]
fn test_plan_is_deterministic() {
    let first = plan(&["pageA", "pageB"], Some("prod")).to_json().unwrap();
    let second = plan(&["pageA", "pageB"], Some("prod")).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_plan_json_shape() {
    let json: serde_json::Value =
        serde_json::from_str(&plan(&["pageA"], Some("prod")).to_json().unwrap()).unwrap();

    assert_eq!(json["mode"], "prod");
    assert_eq!(
        json["htmlTargets"][0]["chunks"],
        serde_json::json!(["manifest", "vendor", "babel-polyfill", "pageA"])
    );
    assert!(json["moduleRules"].as_array().map_or(false, |r| !r.is_empty()));
}

#[test]
fn test_duplicate_pages_rejected() {
    let settings = settings(&["pageA", "pageA"]);
    let resolver = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone());
    assert!(plan_for(&settings, &resolver.resolve(Some("prod"))).is_err());
}

#[test]
fn test_page_ids_are_unique_entries_and_targets() {
    let plan = plan(&["pageA", "pageB", "pageC"], Some("prod"));

    for id in ["pageA", "pageB", "pageC"] {
        assert_eq!(plan.entries.iter().filter(|e| e.name.as_str() == id).count(), 1);
        assert_eq!(plan.html_targets.iter().filter(|t| t.page == id).count(), 1);
    }

    let mut names: Vec<&str> = plan.entries.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), plan.entries.len());
}

#[test]
fn test_shared_chunk_name_as_page_rejected() {
    for id in ["babel-polyfill", "vendor", "manifest"] {
        let settings = settings(&["pageA", id]);
        let resolver = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone());
        assert!(plan_for(&settings, &resolver.resolve(Some("prod"))).is_err(), "{} accepted", id);
    }
}
