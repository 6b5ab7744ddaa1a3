//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's home, config and API keys.
fn wordbank(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wordbank").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("WORDBANK_ANTHROPIC_KEY")
        .env_remove("WORDBANK_OPENROUTER_KEY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn add(dir: &TempDir, args: &[&str]) {
    wordbank(dir).arg("add").args(args).assert().success();
}

fn exported(dir: &TempDir) -> Vec<serde_json::Value> {
    let output = wordbank(dir).arg("export").output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn only_id(dir: &TempDir) -> String {
    let entries = exported(dir);
    assert_eq!(entries.len(), 1);
    entries[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    wordbank(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created wordbank.toml"));
    assert!(dir.path().join("wordbank.toml").exists());

    wordbank(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn add_then_list() {
    let dir = TempDir::new().unwrap();

    wordbank(&dir)
        .args(["add", "implement", "--pos", "verb", "--zh", "實施"])
        .args(["--example", "We **implemented** the plan.", "--tag", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved implement (v.) as vocab:implement-verb-"));

    wordbank(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("implement"))
        .stdout(predicate::str::contains("實施"))
        .stdout(predicate::str::contains("Showing 1 of 1"))
        .stdout(predicate::str::contains("Tags: work"));
}

#[test]
fn list_filters_and_sorts() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["zeal", "--pos", "noun"]);
    add(&dir, &["apple", "--pos", "noun"]);
    add(&dir, &["run", "--pos", "verb"]);

    wordbank(&dir)
        .args(["list", "--pos", "noun", "--sort", "alphabetical", "--date", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run").not())
        .stdout(predicate::str::is_match("(?s)apple.*zeal").unwrap())
        .stdout(predicate::str::contains("Showing 2 of 3"));

    wordbank(&dir)
        .args(["list", "--status", "practiced"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries match"));
}

#[test]
fn add_rejects_blank_word() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
    assert!(exported(&dir).is_empty());
}

#[test]
fn add_with_lookup_falls_back_for_phrases() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .args(["add", "take off", "--pos", "phrasal-verb", "--lookup"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Phrases cannot be looked up"))
        .stdout(predicate::str::contains("Saved take off"));
}

#[test]
fn show_edit_and_delete() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement", "--zh", "實施", "--tag", "work"]);
    let id = only_id(&dir);

    wordbank(&dir)
        .args(["edit", &id, "--en", "to carry out", "--untag", "work", "--tag", "daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated implement"));

    wordbank(&dir)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("to carry out"))
        .stdout(predicate::str::contains("daily"))
        .stdout(predicate::str::contains("work").not())
        .stdout(predicate::str::contains("not practiced yet"));

    // Editing keeps the id.
    assert_eq!(only_id(&dir), id);

    wordbank(&dir).args(["delete", &id]).assert().success();
    // Deleting again is not an error.
    wordbank(&dir).args(["delete", &id]).assert().success();

    wordbank(&dir)
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry with id"));
}

#[test]
fn dry_run_leaves_the_file_untouched() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement"]);
    let id = only_id(&dir);

    wordbank(&dir)
        .args(["--dry-run", "add", "zeal", "--pos", "noun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved zeal"));
    wordbank(&dir)
        .args(["delete", &id, "--dry-run"])
        .assert()
        .success();

    let entries = exported(&dir);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], id.as_str());
}

#[test]
fn export_import_round_trip() {
    let source = TempDir::new().unwrap();
    add(&source, &["implement", "--zh", "實施"]);
    add(&source, &["zeal", "--pos", "noun"]);

    let file = source.path().join("backup.json");
    wordbank(&source)
        .arg("export")
        .arg("--output")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 entries"));

    let target = TempDir::new().unwrap();
    wordbank(&target)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 entries"));

    assert_eq!(exported(&target), exported(&source));
}

#[test]
fn import_rejects_bad_ids() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.json");
    std::fs::write(
        &file,
        r#"[{"id": "word-1", "word": "x", "partOfSpeech": "verb", "addedDate": "2024-03-10T00:00:00Z"}]"#,
    )
    .unwrap();

    wordbank(&dir)
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));
}

#[test]
fn stats_counts_entries() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement"]);
    add(&dir, &["zeal", "--pos", "noun"]);

    wordbank(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total"))
        .stdout(predicate::str::contains("Not practiced"))
        .stdout(predicate::str::contains("noun"));
}

#[test]
fn list_models_without_providers() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("No providers configured"));
}

#[test]
fn list_models_with_config() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir).arg("init").assert().success();

    wordbank(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("haiku"))
        .stdout(predicate::str::contains("grading default"))
        .stdout(predicate::str::contains("qwen/qwen-2.5-72b-instruct:free"));
}

#[test]
fn practice_without_provider_fails_and_keeps_stats() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement"]);
    let id = only_id(&dir);

    wordbank(&dir)
        .args(["practice", &id, "--sentence", "We implement the plan."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));

    assert!(exported(&dir)[0].get("practiceStats").is_none());
}

#[test]
fn practice_scenario_only() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement"]);
    let id = only_id(&dir);

    wordbank(&dir)
        .args(["practice", &id, "--scenario"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario"));
}

#[test]
fn practice_requires_sentence() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["implement"]);
    let id = only_id(&dir);

    wordbank(&dir)
        .args(["practice", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--sentence"));
}

#[test]
fn lookup_rejects_phrases() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .args(["lookup", "give up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported input"));
}

#[test]
fn translate_without_provider_fails() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .args(["translate", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("writing assistant"));
}

#[test]
fn corrupt_entry_file_fails_without_overwriting() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("entries.json"), "[not json").unwrap();

    wordbank(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open data directory"));
    wordbank(&dir).args(["add", "zeal"]).assert().failure();

    assert_eq!(
        std::fs::read_to_string(data.join("entries.json")).unwrap(),
        "[not json"
    );
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    wordbank(&dir)
        .args(["--config", "nope.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
