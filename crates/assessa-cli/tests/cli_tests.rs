//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn assessa() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("assessa").unwrap()
}

/// A command running inside `dir` with no user config leaking in.
fn assessa_in(dir: &Path) -> Command {
    let mut cmd = assessa();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("ASSESSA_LEARNER_ID", "dana")
        .env_remove("ASSESSA_STORE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `init` in a fresh directory and return it.
fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    assessa_in(dir.path()).arg("init").assert().success();
    dir
}

fn write_answers(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("answers.json");
    std::fs::write(&path, json).unwrap();
    path
}

const ALL_CORRECT: &str = r#"{
    "eyes": "Safety goggles",
    "gloves": "true",
    "acronym": "  personal protective EQUIPMENT "
}"#;

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    assessa_in(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assessa.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"));

    assert!(dir.path().join("assessa.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized();

    assessa_in(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_example_quiz() {
    let dir = initialized();

    assessa_in(dir.path())
        .args(["validate", "--quiz", "quizzes/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions, 15 points, 5 min"))
        .stdout(predicate::str::contains("All quizzes valid."));
}

#[test]
fn validate_directory_reports_warnings() {
    let dir = initialized();
    std::fs::write(
        dir.path().join("quizzes/broken.toml"),
        r#"
[quiz]
id = "broken"
title = "Broken Quiz"

[[questions]]
id = "q1"
type = "multiple-choice"
prompt = "Pick one"
options = ["a", "b"]
correct_answer = "c"
"#,
    )
    .unwrap();

    assessa_in(dir.path())
        .args(["validate", "--quiz", "quizzes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Broken Quiz"))
        .stdout(predicate::str::contains("Personal Protective Equipment Basics"))
        .stdout(predicate::str::contains("[q1] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    assessa()
        .args(["validate", "--quiz", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_partial_answers_fails() {
    let dir = initialized();
    let answers = write_answers(
        dir.path(),
        r#"{ "eyes": "Safety goggles", "gloves": "false", "acronym": "personal protective equipment" }"#,
    );

    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--answers"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Score: 67% (10/15 points) FAILED (passing score 70%)",
        ));
}

#[test]
fn grade_all_correct_passes() {
    let dir = initialized();
    let answers = write_answers(dir.path(), ALL_CORRECT);

    assessa_in(dir.path())
        .args(["grade", "--quiz", "quizzes/example.toml", "--answers"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100% (15/15 points) PASSED"));
}

#[test]
fn grade_reports_unanswered_questions() {
    let dir = initialized();
    let answers = write_answers(dir.path(), r#"{ "eyes": "Earplugs", "nope": "x" }"#);

    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--answers"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0% (0/15 points) FAILED"))
        .stdout(predicate::str::contains("[gloves] question has not been answered"))
        .stderr(predicate::str::contains("unknown question 'nope'"));
}

#[test]
fn grade_json_output() {
    let dir = initialized();
    let answers = write_answers(dir.path(), ALL_CORRECT);

    let output = assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--json", "--answers"])
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let attempt: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(attempt["quiz_id"], "ppe-basics");
    assert_eq!(attempt["score_percent"], 100);
    assert_eq!(attempt["passed"], true);
    assert_eq!(attempt["auto_submitted"], false);
    assert_eq!(attempt["answers"]["acronym"]["value"], "personal protective equipment");
}

#[test]
fn grade_without_record_leaves_no_history() {
    let dir = initialized();
    let answers = write_answers(dir.path(), ALL_CORRECT);

    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--answers"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded attempt").not());

    assessa_in(dir.path())
        .args(["attempts", "--quiz", "ppe-basics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No attempts recorded for dana"));
}

#[test]
fn recorded_attempts_are_listed() {
    let dir = initialized();
    let answers = write_answers(dir.path(), ALL_CORRECT);

    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--record", "--answers"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded attempt"));

    assert!(dir
        .path()
        .join("assessa-attempts/dana/ppe-basics.json")
        .exists());

    assessa_in(dir.path())
        .args(["attempts", "--quiz", "ppe-basics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dana on 'ppe-basics'"))
        .stdout(predicate::str::contains("passed"))
        .stdout(predicate::str::contains("Best score: 100%"));

    // Another learner has no history.
    assessa_in(dir.path())
        .args(["attempts", "--quiz", "ppe-basics", "--learner", "lee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No attempts recorded for lee"));
}

#[test]
fn max_attempts_enforced() {
    let dir = initialized();
    let answers = write_answers(dir.path(), r#"{ "eyes": "Earplugs" }"#);

    for _ in 0..3 {
        assessa_in(dir.path())
            .args(["grade", "--quiz", "ppe-basics", "--record", "--answers"])
            .arg(&answers)
            .assert()
            .success();
    }

    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--record", "--answers"])
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("used all 3 attempts"));

    // Grading without recording is still allowed.
    assessa_in(dir.path())
        .args(["grade", "--quiz", "ppe-basics", "--answers"])
        .arg(&answers)
        .assert()
        .success();
}

#[test]
fn take_interactive_session() {
    let dir = initialized();

    assessa_in(dir.path())
        .args(["take", "--quiz", "ppe-basics"])
        .write_stdin("1\nyes\nPersonal Protective Equipment\n:submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/3"))
        .stdout(predicate::str::contains("attempt 1 of 3"))
        .stdout(predicate::str::contains("All questions answered."))
        .stdout(predicate::str::contains("Score: 100% (15/15 points) PASSED"));

    assessa_in(dir.path())
        .args(["attempts", "--quiz", "ppe-basics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best score: 100%"));
}

#[test]
fn take_navigation_and_partial_submit() {
    let dir = initialized();

    assessa_in(dir.path())
        .args(["take", "--quiz", "ppe-basics"])
        .write_stdin(":goto 3\nwrong\n:prev\n:status\n:submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 3/3"))
        .stdout(predicate::str::contains("Submitting with 2 unanswered or invalid answer(s)."))
        .stdout(predicate::str::contains("Score: 0% (0/15 points) FAILED"));
}

#[test]
fn take_abandoned_on_eof() {
    let dir = initialized();

    assessa_in(dir.path())
        .args(["take", "--quiz", "ppe-basics"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("session abandoned without submitting"));

    assert!(!dir.path().join("assessa-attempts").exists());
}

#[test]
fn take_unknown_quiz() {
    let dir = initialized();

    assessa_in(dir.path())
        .args(["take", "--quiz", "no-such-quiz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn help_output() {
    assessa()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timed quiz assessments in the terminal"));
}

#[test]
fn version_output() {
    assessa()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("assessa"));
}
