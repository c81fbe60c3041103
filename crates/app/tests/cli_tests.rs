//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quiz(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quiz").unwrap();
    cmd.current_dir(dir.path())
        .env("QUIZ_DB_URL", dir.path().join("quiz.sqlite3"))
        .env("QUIZ_CACHE_DIR", dir.path().join("cache"))
        .env("QUIZ_TRANSITION_MS", "0")
        .env_remove("QUIZ_ADMIN_SECRET")
        .env_remove("QUIZ_ADMIN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn seed_then_seed_again_keeps_existing_quiz() {
    let dir = TempDir::new().unwrap();

    quiz(&dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("11 questions"));

    quiz(&dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn show_lists_default_tiers() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Questions (11)"))
        .stdout(predicate::str::contains("Significance"))
        .stdout(predicate::str::contains("Scores matching no tier"));

    assert!(dir.path().join("cache").join("quizData.json").exists());
}

#[test]
fn take_scores_piped_answers() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .arg("take")
        .write_stdin("e\n".repeat(11))
        .assert()
        .success()
        .stdout(predicate::str::contains("Your score: 5.00"))
        .stdout(predicate::str::contains("Result: Significance"));
}

#[test]
fn interrupted_take_resumes() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .arg("take")
        .write_stdin("a\na\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("--resume"));

    quiz(&dir)
        .args(["take", "--resume"])
        .write_stdin("a\n".repeat(9))
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 3 of 11"))
        .stdout(predicate::str::contains("Result: Seeking"));
}

#[test]
fn admin_requires_configured_secret() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .args(["admin", "export", "--out", "quiz.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUIZ_ADMIN_SECRET"));
}

#[test]
fn admin_rejects_wrong_password() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .env("QUIZ_ADMIN_SECRET", "hunter2")
        .args(["admin", "--password", "nope", "export", "--out", "quiz.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect admin password"));
}

#[test]
fn admin_edit_tier_adds_redirect() {
    let dir = TempDir::new().unwrap();
    quiz(&dir)
        .env("QUIZ_ADMIN_SECRET", "hunter2")
        .args([
            "admin",
            "--password",
            "hunter2",
            "edit-tier",
            "significance",
            "--redirect-url",
            "https://example.com/next",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved configuration"));

    quiz(&dir)
        .arg("take")
        .write_stdin("e\n".repeat(11))
        .assert()
        .success()
        .stdout(predicate::str::contains("Continue at https://example.com/next"));
}

#[test]
fn admin_export_then_import() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("quiz.json");

    quiz(&dir)
        .env("QUIZ_ADMIN_SECRET", "hunter2")
        .args(["admin", "export", "--out"])
        .arg(&export)
        .write_stdin("hunter2\n")
        .assert()
        .success();

    let raw = std::fs::read_to_string(&export).unwrap();
    assert!(raw.contains("\"minScore\""));
    let edited = raw.replace("Steadfast", "Grounded");
    std::fs::write(&export, edited).unwrap();

    quiz(&dir)
        .env("QUIZ_ADMIN_SECRET", "hunter2")
        .env("QUIZ_ADMIN_PASSWORD", "hunter2")
        .args(["admin", "import", "--file"])
        .arg(&export)
        .assert()
        .success();

    quiz(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Grounded"));
}
