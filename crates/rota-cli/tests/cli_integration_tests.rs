/// CLI integration tests for rota
///
/// These tests exercise the CLI commands as a black box against a
/// temporary database.
use predicates::prelude::*;

mod helpers;
use helpers::CliTestHarness;

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("task manager"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("rota"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_add_and_list_tasks() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["add", "Basic Task"])
        .stdout(predicate::str::contains("Created task"));

    harness.run_success(&["category", "add", "Work"]);
    harness
        .run_success(&[
            "add",
            "Complex Task",
            "--due",
            "tomorrow",
            "--priority",
            "high",
            "--description",
            "A complex test task",
            "--category",
            "Work",
            "--tag",
            "urgent",
        ])
        .stdout(predicate::str::contains("Created task"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Basic Task"))
        .stdout(predicate::str::contains("Complex Task"));

    harness
        .run_success(&["list", "--priority", "high"])
        .stdout(predicate::str::contains("Complex Task"))
        .stdout(predicate::str::contains("Basic Task").not());

    harness
        .run_success(&["list", "--tag", "urgent"])
        .stdout(predicate::str::contains("Complex Task"));

    // Invalid priority is rejected by argument parsing.
    harness.run_failure(&["add", "Bad", "--priority", "extreme"]);
}

#[test]
fn test_add_with_unknown_category_fails() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["add", "Task", "--category", "Nonexistent"])
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_complete_single_task() {
    let harness = CliTestHarness::new();

    harness.run_success(&["add", "Finish me"]);

    // Resolve via the short id shown in the list output.
    let output = harness.run_success(&["list"]).get_output().stdout.clone();
    let short_id = extract_first_id(&output);

    harness
        .run_success(&["do", &short_id])
        .stdout(predicate::str::contains("Completed task: 'Finish me'"));
}

#[test]
fn test_recurring_task_lifecycle() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["rule", "create", "--every", "daily"])
        .stdout(predicate::str::contains("Created DAILY rule"));

    let output = harness
        .run_success(&["rule", "list"])
        .get_output()
        .stdout
        .clone();
    let rule_id = extract_first_id(&output);

    harness
        .run_success(&[
            "add",
            "Water plants",
            "--due",
            "tomorrow",
            "--rule",
            &rule_id,
        ])
        .stdout(predicate::str::contains("Created recurring task"));

    let output = harness.run_success(&["list"]).get_output().stdout.clone();
    let task_id = extract_first_id(&output);

    harness
        .run_success(&["do", &task_id])
        .stdout(predicate::str::contains("Completed task: 'Water plants'"))
        .stdout(predicate::str::contains("Created recurring task 'Water plants'"));

    // The rule cannot be deleted while the tasks reference it.
    harness
        .run_failure(&["rule", "delete", &rule_id, "--force"])
        .stderr(predicate::str::contains("in use"));
}

#[test]
fn test_rule_preview() {
    let harness = CliTestHarness::new();

    harness.run_success(&[
        "rule",
        "create",
        "--every",
        "weekly",
        "--on",
        "MO,WE,FR",
    ]);

    let output = harness
        .run_success(&["rule", "list"])
        .get_output()
        .stdout
        .clone();
    let rule_id = extract_first_id(&output);

    harness
        .run_success(&["rule", "preview", &rule_id, "--count", "3"])
        .stdout(predicate::str::contains("1"));

    harness
        .run_failure(&["rule", "preview", "deadbeef"])
        .stderr(predicate::str::contains("No rule found"));
}

#[test]
fn test_rule_create_validation() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["rule", "create", "--every", "daily", "--interval", "0"])
        .stderr(predicate::str::contains("Invalid input"));

    harness
        .run_failure(&["rule", "create", "--every", "monthly", "--day", "0"])
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_edit_task() {
    let harness = CliTestHarness::new();

    harness.run_success(&["add", "Old title"]);
    let output = harness.run_success(&["list"]).get_output().stdout.clone();
    let task_id = extract_first_id(&output);

    harness
        .run_success(&[
            "edit",
            &task_id,
            "--title",
            "New title",
            "--priority",
            "low",
            "--add-tag",
            "later",
        ])
        .stdout(predicate::str::contains("Updated task: 'New title'"));

    harness
        .run_success(&["list", "--tag", "later"])
        .stdout(predicate::str::contains("New title"));
}

#[test]
fn test_delete_task_forced() {
    let harness = CliTestHarness::new();

    harness.run_success(&["add", "Goner"]);
    let output = harness.run_success(&["list"]).get_output().stdout.clone();
    let task_id = extract_first_id(&output);

    harness
        .run_success(&["delete", &task_id, "--force"])
        .stdout(predicate::str::contains("Deleted task"));

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn test_category_management() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["category", "add", "Home"])
        .stdout(predicate::str::contains("Created category: 'Home'"));

    harness
        .run_failure(&["category", "add", "Home"])
        .stderr(predicate::str::contains("already exists"));

    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("Home"));

    harness
        .run_success(&["category", "delete", "Home"])
        .stdout(predicate::str::contains("Deleted category: 'Home'"));

    harness
        .run_failure(&["category", "delete", "Home"])
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_sweep_runs_cleanly_on_empty_db() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["sweep"])
        .stdout(predicate::str::contains("Swept 0"));
}

#[test]
fn test_users_are_isolated() {
    let harness = CliTestHarness::new();

    harness.run_success(&["add", "Mine"]);

    harness
        .run_success(&["--user", "intruder", "list"])
        .stdout(predicate::str::contains("No tasks found"));
}

/// Pull the first 7-character short id out of a table printed to stdout.
fn extract_first_id(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    text.lines()
        .filter_map(|line| {
            let cell = line.trim_start_matches(['|', '│', ' ']).trim();
            let candidate: String = cell.chars().take(7).collect();
            if candidate.len() == 7 && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
                Some(candidate)
            } else {
                None
            }
        })
        .next()
        .expect("No id found in output")
}
