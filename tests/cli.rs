use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_universe"))
}

fn run_cmd(dir: &TempDir, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin_path());
    cmd.arg("--data-dir").arg(dir.path());
    cmd.args(args);
    cmd.env_remove("UNIVERSE_LOG");
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd.output().expect("run command")
}

fn output_stdout(output: Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout utf8")
}

fn output_stderr(output: Output) -> String {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    String::from_utf8(output.stderr).expect("stderr utf8")
}

fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let stdout = output_stdout(run_cmd(dir, args));
    serde_json::from_str(&stdout).expect("json output")
}

fn parse_id(stdout: &str, prefix: &str) -> i64 {
    let rest = stdout.trim().strip_prefix(prefix).expect("id prefix");
    let id_str = rest
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()
        .expect("id");
    id_str.parse().expect("id parse")
}

fn project_ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|project| project["id"].as_i64().expect("id"))
        .collect()
}

fn create_project(dir: &TempDir, name: &str, domain: &str) -> i64 {
    let stdout = output_stdout(run_cmd(
        dir,
        &["project", "add", name, "--domain", domain, "--description", "desc"],
    ));
    parse_id(&stdout, "Created project ID: ")
}

#[test]
fn first_run_lists_seed_projects() {
    let dir = TempDir::new().expect("temp dir");
    let value = run_json(&dir, &["project", "list", "--sort", "name", "--json"]);
    let mut ids = project_ids(&value);
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(dir.path().join("universe.db").exists());
}

#[test]
fn remove_seed_project_then_list() {
    let dir = TempDir::new().expect("temp dir");
    output_stdout(run_cmd(&dir, &["project", "remove", "2"]));
    output_stdout(run_cmd(&dir, &["project", "remove", "2"]));

    let value = run_json(&dir, &["project", "list", "--json"]);
    let mut ids = project_ids(&value);
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn add_project_round_trips_through_show() {
    let dir = TempDir::new().expect("temp dir");
    let id = create_project(&dir, "X", "Code");

    let value = run_json(&dir, &["project", "show", &id.to_string(), "--json"]);
    assert_eq!(value["name"], "X");
    assert_eq!(value["domain"], "Code");
    assert_eq!(value["description"], "desc");
    assert_eq!(value["status"], "Active");
    assert_eq!(value["ideas"].as_array().expect("ideas").len(), 0);
    assert!(value["last_touched_at"].as_str().is_some());
}

#[test]
fn list_filters_by_domain_and_sorts_by_ideas() {
    let dir = TempDir::new().expect("temp dir");
    let id = create_project(&dir, "Busy", "Code");
    let id_str = id.to_string();
    output_stdout(run_cmd(&dir, &["idea", "add", &id_str, "One"]));
    output_stdout(run_cmd(&dir, &["idea", "add", &id_str, "Two"]));

    let value = run_json(
        &dir,
        &["project", "list", "--domain", "Code", "--sort", "ideas", "--json"],
    );
    let ids = project_ids(&value);
    assert_eq!(ids[0], id);
    assert_eq!(ids.len(), 3);
    for project in value.as_array().expect("array") {
        assert_eq!(project["domain"], "Code");
    }
}

#[test]
fn update_sets_status_and_keeps_ideas() {
    let dir = TempDir::new().expect("temp dir");
    let before = run_json(&dir, &["project", "show", "1", "--json"]);
    output_stdout(run_cmd(
        &dir,
        &["project", "update", "1", "--status", "on-hold", "--name", "Watch"],
    ));
    let after = run_json(&dir, &["project", "show", "1", "--json"]);

    assert_eq!(after["status"], "On Hold");
    assert_eq!(after["name"], "Watch");
    assert_eq!(after["ideas"], before["ideas"]);
    assert_ne!(after["last_touched_at"], before["last_touched_at"]);

    let on_hold = run_json(&dir, &["project", "list", "--status", "on-hold", "--json"]);
    assert_eq!(project_ids(&on_hold), vec![1]);
}

#[test]
fn idea_and_task_lifecycle() {
    let dir = TempDir::new().expect("temp dir");
    let stdout = output_stdout(run_cmd(&dir, &["idea", "add", "1", "Sequel"]));
    let idea_id = parse_id(&stdout, "Created idea ID: ");
    let idea_str = idea_id.to_string();

    let stdout = output_stdout(run_cmd(&dir, &["task", "add", "1", &idea_str, "Sketch"]));
    let task_id = parse_id(&stdout, "Created task ID: ");
    let task_str = task_id.to_string();

    let stdout = output_stdout(run_cmd(&dir, &["task", "toggle", "1", &idea_str, &task_str]));
    assert!(stdout.contains("is now done"));
    output_stdout(run_cmd(
        &dir,
        &["task", "rename", "1", &idea_str, &task_str, "Sketch v2"],
    ));

    let value = run_json(&dir, &["project", "show", "1", "--json"]);
    let ideas = value["ideas"].as_array().expect("ideas");
    let idea = ideas.last().expect("appended idea");
    assert_eq!(idea["id"].as_i64(), Some(idea_id));
    assert_eq!(idea["name"], "Sequel");
    assert_eq!(idea["tasks"][0]["name"], "Sketch v2");
    assert_eq!(idea["tasks"][0]["is_completed"], true);

    output_stdout(run_cmd(&dir, &["task", "remove", "1", &idea_str, &task_str]));
    output_stdout(run_cmd(&dir, &["idea", "rename", "1", &idea_str, "Prequel"]));
    let value = run_json(&dir, &["project", "show", "1", "--json"]);
    let idea = value["ideas"].as_array().expect("ideas").last().cloned().expect("idea");
    assert_eq!(idea["name"], "Prequel");
    assert_eq!(idea["tasks"].as_array().expect("tasks").len(), 0);

    output_stdout(run_cmd(&dir, &["idea", "remove", "1", &idea_str]));
    let value = run_json(&dir, &["project", "show", "1", "--json"]);
    assert_eq!(value["ideas"].as_array().expect("ideas").len(), 1);
}

#[test]
fn nested_edit_on_unknown_ids_fails() {
    let dir = TempDir::new().expect("temp dir");
    let stderr = output_stderr(run_cmd(&dir, &["idea", "add", "999", "Nope"]));
    assert!(stderr.contains("Not found: project id 999"), "stderr: {stderr}");

    let stderr = output_stderr(run_cmd(&dir, &["task", "toggle", "1", "101", "5"]));
    assert!(stderr.contains("task id 5 in idea 101"), "stderr: {stderr}");
}

#[test]
fn show_renders_checklist() {
    let dir = TempDir::new().expect("temp dir");
    let stdout = output_stdout(run_cmd(&dir, &["project", "show", "1"]));
    assert!(stdout.contains("Name: Amazfit Watchfaces"));
    assert!(stdout.contains("  - [x] Design the watch face UI in Figma (task id 1001)"));
    assert!(stdout.contains("Tasks: 1/3"));
}

#[test]
fn domain_add_trims_and_rejects_duplicates() {
    let dir = TempDir::new().expect("temp dir");
    let stdout = output_stdout(run_cmd(&dir, &["domain", "add", "  Writing  "]));
    assert_eq!(stdout.trim(), "Added domain: Writing");

    let stderr = output_stderr(run_cmd(&dir, &["domain", "add", "Writing"]));
    assert!(stderr.contains("domain already exists or is invalid"));

    let stdout = output_stdout(run_cmd(&dir, &["domain", "list"]));
    let domains: Vec<_> = stdout.lines().collect();
    assert_eq!(
        domains,
        vec!["Art", "Code", "Music", "Content Creation", "Writing"]
    );
}

#[test]
fn domain_remove_refuses_in_use() {
    let dir = TempDir::new().expect("temp dir");
    let stderr = output_stderr(run_cmd(&dir, &["domain", "remove", "Art"]));
    assert!(stderr.contains("still used by 1 project(s)"), "stderr: {stderr}");

    let stdout = output_stdout(run_cmd(&dir, &["domain", "remove", "Music"]));
    assert_eq!(stdout.trim(), "Removed domain: Music");
}

#[test]
fn new_domain_flag_registers_before_create() {
    let dir = TempDir::new().expect("temp dir");
    let id = create_project_with_new_domain(&dir, "Zine", " Print ");
    let value = run_json(&dir, &["project", "show", &id.to_string(), "--json"]);
    assert_eq!(value["domain"], "Print");

    let stdout = output_stdout(run_cmd(&dir, &["domain", "list"]));
    assert!(stdout.lines().any(|line| line == "Print"));

    let output = run_cmd(
        &dir,
        &["project", "add", "Again", "--domain", "Print", "--new-domain"],
    );
    output_stderr(output);
}

fn create_project_with_new_domain(dir: &TempDir, name: &str, domain: &str) -> i64 {
    let stdout = output_stdout(run_cmd(
        dir,
        &["project", "add", name, "--domain", domain, "--new-domain"],
    ));
    parse_id(&stdout, "Created project ID: ")
}

#[test]
fn resume_forgotten_and_pick() {
    let dir = TempDir::new().expect("temp dir");
    let stdout = output_stdout(run_cmd(&dir, &["project", "resume"]));
    assert!(stdout.contains("Project ID: 3"));

    let stdout = output_stdout(run_cmd(&dir, &["project", "forgotten"]));
    assert!(stdout.contains("Social Media Content"));

    let stdout = output_stdout(run_cmd(&dir, &["project", "pick", "--domain", "Art"]));
    assert!(stdout.contains("Project ID: 2"));

    let stdout = output_stdout(run_cmd(&dir, &["project", "pick", "--domain", "Music"]));
    assert_eq!(stdout.trim(), "No projects found.");
}

#[test]
fn project_name_and_description_are_trimmed() {
    let dir = TempDir::new().expect("temp dir");
    let stdout = output_stdout(run_cmd(
        &dir,
        &[
            "project",
            "add",
            "  Padded  ",
            "--domain",
            "Code",
            "--description",
            "  spaced out  ",
        ],
    ));
    assert!(stdout.trim().ends_with(": Padded"), "stdout: {stdout}");
    let id = parse_id(&stdout, "Created project ID: ").to_string();

    let value = run_json(&dir, &["project", "show", &id, "--json"]);
    assert_eq!(value["name"], "Padded");
    assert_eq!(value["description"], "spaced out");

    output_stdout(run_cmd(
        &dir,
        &["project", "update", &id, "--name", " Renamed ", "--description", " tidy "],
    ));
    let value = run_json(&dir, &["project", "show", &id, "--json"]);
    assert_eq!(value["name"], "Renamed");
    assert_eq!(value["description"], "tidy");

    let stderr = output_stderr(run_cmd(&dir, &["project", "add", "   ", "--domain", "Code"]));
    assert!(stderr.contains("project name cannot be empty"), "stderr: {stderr}");
}

#[test]
fn debug_logging_reports_reads_on_stderr() {
    let dir = TempDir::new().expect("temp dir");
    let output = Command::new(bin_path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["project", "list", "--json"])
        .env("UNIVERSE_LOG", "debug")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("run command");
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let stdout = output_stdout(output);

    let value: Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(value.as_array().expect("array").len(), 3);
    assert!(stderr.contains("listed projects"), "stderr: {stderr}");
}
