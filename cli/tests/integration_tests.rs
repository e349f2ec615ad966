use std::process::{Command, Output};

fn demo(args: &[&str]) -> Output {
    demo_with_env(args, &[])
}

fn demo_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdtree-demo"));
    cmd.args(args)
        .env_remove("DEMO_HOST")
        .env_remove("DEMO_PORT")
        .env_remove("CMDTREE_LOG");
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run cmdtree-demo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn no_arguments_prints_root_usage() {
    let out = demo(&[]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.starts_with("Control a demo service\n\nUsage: cmdtree-demo [COMMAND]\n"));
    assert!(text.contains("describe"));
    assert!(text.contains("serve"));
}

#[test]
fn serve_uses_defaults() {
    let out = demo(&["serve"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "serving on 127.0.0.1:8080 with 4 workers (timeout 30s)\n"
    );
}

#[test]
fn serve_cluster_and_inline_values() {
    let out = demo(&["serve", "-vp", "9000", "--host=0.0.0.0", "--timeout", "2.5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "serving on 0.0.0.0:9000 with 4 workers (timeout 2.5s)\nrequest logging enabled\n"
    );
}

#[test]
fn environment_is_overridden_by_arguments() {
    let out = demo_with_env(&["serve"], &[("DEMO_PORT", "7000")]);
    assert!(stdout(&out).contains(":7000 "));

    let out = demo_with_env(&["serve", "--port", "7001"], &[("DEMO_PORT", "7000")]);
    assert!(stdout(&out).contains(":7001 "));
}

#[test]
fn nested_command_without_action_prints_usage() {
    let out = demo(&["config"]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.contains("Usage: cmdtree-demo config [COMMAND]"));
    assert!(text.contains("get"));
    assert!(text.contains("help"));
}

#[test]
fn public_help_describes_its_caller() {
    let out = demo(&["config", "set", "help"]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.contains("Usage: cmdtree-demo config set [COMMAND] [OPTIONS]"));
    assert!(text.contains("-k, --key"));
    assert!(text.contains("[Required]"));
}

#[test]
fn describe_prints_json_tree() {
    let out = demo(&["status", "describe"]);
    assert!(out.status.success());

    let tree: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON");
    let names: Vec<_> = tree["subcommands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sub| sub["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["config", "serve", "status", "version"]);
    assert_eq!(tree["public_subcommands"][0]["name"], "describe");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_command_fails() {
    let out = demo(&["restart"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("command not found: restart"));
}

#[test]
fn missing_required_option_fails() {
    let out = demo(&["config", "get"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("required option: --key"));
}

#[test]
fn malformed_value_fails() {
    let out = demo(&["serve", "--port=http"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("invalid int value for option --port: 'http'"));
}

#[test]
fn malformed_environment_value_fails() {
    let out = demo_with_env(&["serve"], &[("DEMO_PORT", "eighty")]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("DEMO_PORT"));
}

#[test]
fn action_failure_code_becomes_exit_code() {
    let out = demo(&["config", "get", "-k", "colour"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown setting 'colour'"));

    let out = demo(&["status", "--format", "xml"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn config_get_known_setting() {
    let out = demo(&["config", "get", "--key", "workers"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "4\n");
}
