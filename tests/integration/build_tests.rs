use mpa::core::{ModeResolver, PlanService, ProjectSettings};
use mpa::infrastructure::{JsonPlanEngine, TokioFileSystemService, PLAN_FILE_NAME};
use mpa::utils::{ConfigLoader, MpaError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scaffold(pages: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for page in pages {
        write(dir.path(), &format!("src/{page}/index.js"), "console.log('hi');");
        write(dir.path(), &format!("src/{page}/{page}.html"), "<html></html>");
    }
    write(dir.path(), "static/favicon.ico", "ico");
    write(dir.path(), "static/img/logo.png", "png");
    write(dir.path(), "static/.DS_Store", "junk");
    dir
}

fn settings(root: &Path, pages: &[&str]) -> ProjectSettings {
    ConfigLoader::merge_with_cli(
        None,
        root.to_path_buf(),
        Some(pages.iter().map(|p| p.to_string()).collect()),
        None,
        None,
    )
}

fn service() -> (PlanService, JsonPlanEngine) {
    let fs_service = Arc::new(TokioFileSystemService);
    (PlanService::new(fs_service.clone()), JsonPlanEngine::new(fs_service))
}

#[tokio::test]
async fn test_prod_build_writes_plan_and_copies_static() {
    let project = scaffold(&["pageA", "pageB"]);
    let settings = settings(project.path(), &["pageA", "pageB"]);
    let mode = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone())
        .resolve(Some("prod"));
    let (service, engine) = service();

    let report = service.build(&settings, &mode, &engine).await.unwrap();

    let plan_path = project.path().join("dist").join(PLAN_FILE_NAME);
    assert_eq!(report.output_files, vec![plan_path.clone()]);
    assert!(plan_path.exists());

    assert_eq!(report.copied_static, 2);
    assert!(project.path().join("dist/static/favicon.ico").exists());
    assert!(project.path().join("dist/static/img/logo.png").exists());
    assert!(!project.path().join("dist/static/.DS_Store").exists());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(plan_path).unwrap()).unwrap();
    assert_eq!(json["htmlTargets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_dev_build_skips_static_copy() {
    let project = scaffold(&["pageA"]);
    let settings = settings(project.path(), &["pageA"]);
    let mode = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone())
        .resolve(Some("dev"));
    let (service, engine) = service();

    let report = service.build(&settings, &mode, &engine).await.unwrap();

    assert_eq!(report.copied_static, 0);
    assert!(!project.path().join("dist/static").exists());
}

#[tokio::test]
async fn test_missing_template_fails_before_output() {
    let project = scaffold(&["pageA"]);
    write(project.path(), "src/pageB/index.js", "");
    let settings = settings(project.path(), &["pageA", "pageB"]);
    let mode = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone())
        .resolve(Some("prod"));
    let (service, engine) = service();

    let err = service.build(&settings, &mode, &engine).await.unwrap_err();

    match err {
        MpaError::Configuration { page, path } => {
            assert_eq!(page, "pageB");
            assert!(path.ends_with("pageB.html"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert!(!project.path().join("dist").exists());
}

#[tokio::test]
async fn test_missing_entry_script_fails_preflight() {
    let project = tempfile::tempdir().unwrap();
    write(project.path(), "src/pageC/pageC.html", "<html></html>");
    let settings = settings(project.path(), &["pageC"]);
    let mode = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone())
        .resolve(None);
    let (service, _) = service();

    let err = service.plan(&settings, &mode).await.unwrap_err();
    assert!(matches!(err, MpaError::Configuration { ref page, .. } if page == "pageC"));
}

#[tokio::test]
async fn test_config_file_overrides_defaults() {
    let project = scaffold(&["home"]);
    write(
        project.path(),
        "mpa.config.json",
        r#"{ "pages": ["home"], "outDir": "public", "devServer": { "port": 8080 } }"#,
    );

    let file_config = ConfigLoader::load_from_file(project.path()).unwrap();
    let settings = ConfigLoader::merge_with_cli(file_config, project.path().to_path_buf(), None, None, None);
    assert_eq!(settings.pages, vec!["home".to_string()]);
    assert_eq!(settings.dev_server.port, 8080);

    let mode = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone())
        .resolve(Some("prod"));
    let (service, engine) = service();
    service.build(&settings, &mode, &engine).await.unwrap();

    assert!(project.path().join("public").join(PLAN_FILE_NAME).exists());
    assert!(project.path().join("public/static/favicon.ico").exists());
}
