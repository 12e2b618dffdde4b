use std::process::Command;

fn mpa(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mpa"))
        .args(args)
        .env("RUST_LOG", "mpa=debug")
        .env_remove("NODE_ENV")
        .output()
        .expect("mpa binary should run")
}

#[test]
fn test_plan_stdout_is_json_only() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path().to_str().unwrap();

    let output = mpa(&["plan", "--root", root, "--mode", "prod", "--pages", "pageA,pageB"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be plan JSON");
    assert_eq!(json["mode"], "prod");
    assert_eq!(json["htmlTargets"].as_array().unwrap().len(), 2);

    let logs = String::from_utf8_lossy(&output.stderr);
    assert!(logs.contains("Assembling build plan"));
}

#[test]
fn test_base_mode_warning_stays_off_stdout() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path().to_str().unwrap();

    let output = mpa(&["plan", "--root", root, "--mode", "staging"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout should be plan JSON");
    assert_eq!(json["mode"], "base");
    assert!(String::from_utf8_lossy(&output.stderr).contains("neither 'dev' nor 'prod'"));
}

#[test]
fn test_check_fails_on_missing_page() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path().to_str().unwrap();

    let output = mpa(&["check", "--root", root, "--pages", "pageA"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
