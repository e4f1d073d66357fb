use onboardiq_core::responder::{CELEBRATION_MESSAGE, FILLER_PHRASES};
use onboardiq_core::{CompletionStore, Database, MessageLog};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("onboardiq/onboardiq.db")
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("onboardiq");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn run_bin(env: &CliTestEnv, bin_name: &str, args: &[&str], stdin: &str) -> Output {
    let bin_path = match bin_name {
        "onboardiq-chat" => PathBuf::from(assert_cmd::cargo::cargo_bin!("onboardiq-chat")),
        "onboardiq-stats" => PathBuf::from(assert_cmd::cargo::cargo_bin!("onboardiq-stats")),
        _ => panic!("unsupported binary in test harness: {bin_name}"),
    };

    let mut child = Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("failed to execute {bin_name}: {e}"));

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");

    child
        .wait_with_output()
        .unwrap_or_else(|e| panic!("failed to wait for {bin_name}: {e}"))
}

fn assert_success(bin_name: &str, args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "{bin_name} {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn chat(env: &CliTestEnv, args: &[&str], input: &str) -> Vec<String> {
    let output = run_bin(env, "onboardiq-chat", args, input);
    assert_success("onboardiq-chat", args, &output);
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn chat_completes_first_stage_and_persists_it() {
    let env = CliTestEnv::new();

    let lines = chat(&env, &["--user", "alice"], "I created my dough account\n");

    assert_eq!(lines.len(), 2, "unexpected output: {lines:?}");
    assert!(lines[0].starts_with("✅ Dough - Create Account completed! "));
    assert_eq!(lines[1], "Progress: 16%");

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    let events = db.completions_for_user("alice").expect("query failed");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].stage, "Dough - Create Account");
    assert_eq!(db.count_chats().expect("count failed"), 1);
}

#[test]
fn chat_repeat_and_filler_do_not_add_completions() {
    let env = CliTestEnv::new();

    let lines = chat(
        &env,
        &[],
        "dough done\n\nDOUGH again\nwhat's the weather\n",
    );

    assert_eq!(lines.len(), 4, "blank lines get no reply: {lines:?}");
    assert_eq!(lines[1], "You already finished Dough - Create Account 👍");
    assert!(FILLER_PHRASES.contains(&lines[2].as_str()));
    assert_eq!(lines[3], "Progress: 16%");

    // Default user comes from config defaults
    let db = Database::open(&env.db_path()).expect("failed to open db");
    assert_eq!(db.completions_for_user("demo_user").unwrap().len(), 1);
    assert_eq!(db.count_chats().unwrap(), 3);
}

#[test]
fn chat_celebrates_once_when_all_slices_done() {
    let env = CliTestEnv::new();

    let input = "serve\nbake\ntoppings\ncheese\nsauce\ndough\ndough\n";
    let lines = chat(&env, &["--user", "bob"], input);

    let celebrations = lines.iter().filter(|l| *l == CELEBRATION_MESSAGE).count();
    assert_eq!(celebrations, 1, "output: {lines:?}");

    let position = lines
        .iter()
        .position(|l| l == CELEBRATION_MESSAGE)
        .unwrap();
    assert!(lines[position - 1].starts_with("✅ Dough - Create Account completed!"));
    assert_eq!(lines.last().unwrap(), "Progress: 100%");
}

#[test]
fn chat_returning_user_resumes_progress() {
    let env = CliTestEnv::new();

    chat(&env, &["--user", "carol"], "sauce\ncheese\n");
    let lines = chat(&env, &["--user", "carol"], "sauce\n");

    assert_eq!(lines[0], "You already finished Sauce - Connect Workspace 👍");
    assert_eq!(lines[1], "Progress: 33%");
}

#[test]
fn chat_login_command_switches_user() {
    let env = CliTestEnv::new();

    let lines = chat(&env, &["--user", "alice"], "dough\n/login bob\nbake\n");

    assert_eq!(lines[1], "Logged in as bob (0% complete)");
    assert!(lines[2].starts_with("✅ Bake - Test Workflow completed!"));
    assert_eq!(lines[3], "Progress: 16%");

    let db = Database::open(&env.db_path()).expect("failed to open db");
    assert_eq!(db.completions_for_user("alice").unwrap().len(), 1);
    assert_eq!(db.completions_for_user("bob").unwrap().len(), 1);
}

#[test]
fn chat_honors_configured_default_user() {
    let env = CliTestEnv::new();
    env.write_config("[session]\ndefault_user = \"dana\"\n");

    chat(&env, &[], "toppings\n");

    let db = Database::open(&env.db_path()).expect("failed to open db");
    assert_eq!(db.completions_for_user("dana").unwrap().len(), 1);
    assert!(db.completions_for_user("demo_user").unwrap().is_empty());
}

#[test]
fn stats_reports_counts_as_json_and_text() {
    let env = CliTestEnv::new();
    chat(&env, &["--user", "alice"], "dough\nsauce\nhello\n");
    chat(&env, &["--user", "bob"], "dough\n");

    let args = ["--format", "json"];
    let output = run_bin(&env, "onboardiq-stats", &args, "");
    assert_success("onboardiq-stats", &args, &output);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stats output should be JSON");
    assert_eq!(report["total_messages"], 4);
    assert_eq!(report["users_started"], 2);
    assert_eq!(report["completions_by_stage"]["Dough - Create Account"], 2);
    assert_eq!(report["completions_by_stage"]["Sauce - Connect Workspace"], 1);
    assert!(report["completions_by_stage"]
        .get("Serve - Go Live")
        .is_none());
    assert_eq!(report["stage_breakdown"].as_array().unwrap().len(), 6);

    let output = run_bin(&env, "onboardiq-stats", &[], "");
    assert_success("onboardiq-stats", &[], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Chat Messages: 4"));
    assert!(stdout.contains("Users Started Onboarding: 2"));
    assert!(stdout.contains("Dough - Create Account → 2 completions"));
}

#[test]
fn stats_on_empty_database() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, "onboardiq-stats", &[], "");
    assert_success("onboardiq-stats", &[], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Chat Messages: 0"));
    assert!(stdout.contains("Last Completion: never"));
    assert!(stdout.contains("No completions yet."));
}

#[test]
fn stats_rejects_unknown_format() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, "onboardiq-stats", &["--format", "xml"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown format"), "stderr: {stderr}");
}
