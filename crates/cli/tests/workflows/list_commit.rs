//! List, commit, list again

use crate::common::ScanDir;
use crate::tidemark;
use anyhow::Result;

#[test]
fn test_list_then_commit_then_nothing_new() -> Result<()> {
    let scan = ScanDir::new()?;
    scan.file("a.csv", 1_600_000_000)?;
    scan.file("nested/b.csv", 1_600_000_100)?;

    let result = tidemark!(
        scan.root(),
        "list",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    let mut lines = result.lines();
    lines.sort();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("a.csv"));
    assert!(lines[1].ends_with("b.csv"));
    assert!(!scan.checkpoint_path().exists());

    tidemark!(
        scan.root(),
        "commit",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    assert!(scan.checkpoint_path().exists());

    let result = tidemark!(
        scan.root(),
        "list",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    assert!(result.lines().is_empty());

    Ok(())
}

#[test]
fn test_list_with_commit_flag() -> Result<()> {
    let scan = ScanDir::new()?;
    scan.file("old.log", 1_000)?;

    let result = tidemark!(
        scan.root(),
        "list",
        "--commit",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    assert_eq!(result.lines().len(), 1);
    assert!(result.stderr.contains("Checkpoint updated to:"));

    // Files written after the commit with a future mtime still show up
    scan.future_file("late.log")?;
    let result = tidemark!(
        scan.root(),
        "list",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    let lines = result.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("late.log"));

    Ok(())
}

#[test]
fn test_commit_needs_only_the_checkpoint() -> Result<()> {
    let scan = ScanDir::new()?;

    let result = tidemark!(scan.root(), "commit", "--checkpoint", scan.checkpoint()).succeeds()?;
    assert!(result.stdout.contains("Checkpoint updated to:"));
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(scan.checkpoint_path())?)?;
    assert!(stored["last_processed_time"].as_f64().unwrap() > 1_600_000_000.0);

    // max_seen_mtime without a listing writes the stored value back
    std::fs::write(scan.checkpoint_path(), r#"{"last_processed_time": 1234.5}"#)?;
    tidemark!(
        scan.root(),
        "commit",
        "--commit-mode",
        "max_seen_mtime",
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(scan.checkpoint_path())?)?;
    assert_eq!(stored["last_processed_time"].as_f64(), Some(1234.5));

    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let scan = ScanDir::new()?;
    scan.file("a.csv", 1_600_000_000)?;

    let result = tidemark!(
        scan.root(),
        "list",
        "--json",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;

    let records: serde_json::Value = serde_json::from_str(&result.stdout)?;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0]["identifier"].as_str().unwrap().ends_with("a.csv"));
    assert_eq!(records[0]["modified_time"].as_f64(), Some(1_600_000_000.0));

    Ok(())
}

#[test]
fn test_show_before_and_after_commit() -> Result<()> {
    let scan = ScanDir::new()?;

    let result = tidemark!(scan.root(), "show", "--checkpoint", scan.checkpoint())
        .succeeds()?;
    assert!(result.stdout.contains("No checkpoint recorded"));

    std::fs::create_dir_all(scan.checkpoint_path().parent().unwrap())?;
    std::fs::write(scan.checkpoint_path(), r#"{"last_processed_time": 1700000000.5}"#)?;

    let result = tidemark!(scan.root(), "show", "--checkpoint", scan.checkpoint())
        .succeeds()?;
    assert!(result.stdout.contains("1700000000.5"));

    Ok(())
}

#[test]
fn test_config_file_drives_list() -> Result<()> {
    let scan = ScanDir::new()?;
    scan.file("a.csv", 5_000)?;
    std::fs::create_dir_all(scan.checkpoint_path().parent().unwrap())?;
    std::fs::write(scan.checkpoint_path(), r#"{"last_processed_time": 4000}"#)?;

    let config = scan.root().join("tidemark.toml");
    std::fs::write(
        &config,
        format!(
            "path = {:?}\ncheckpoint_path = {:?}\ncommit_mode = \"max_seen_mtime\"\n",
            scan.data(),
            scan.checkpoint()
        ),
    )?;
    let config = config.to_str().unwrap();

    let result = tidemark!(scan.root(), "list", "--commit", "--config", config)
        .succeeds()?;
    assert_eq!(result.lines().len(), 1);

    let stored = std::fs::read_to_string(scan.checkpoint_path())?;
    let stored: serde_json::Value = serde_json::from_str(&stored)?;
    assert_eq!(stored["last_processed_time"].as_f64(), Some(5_000.0));

    Ok(())
}

#[test]
fn test_example_config_prints_toml() -> Result<()> {
    let scan = ScanDir::new()?;
    let result = tidemark!(scan.root(), "example").succeeds()?;
    assert!(result.stdout.contains("checkpoint_path"));
    Ok(())
}

#[test]
fn test_verbose_logs_go_to_stderr() -> Result<()> {
    let scan = ScanDir::new()?;
    scan.file("a.csv", 2_000)?;

    let result = tidemark!(
        scan.root(),
        "-v",
        "list",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .succeeds()?;
    assert!(result.stderr.contains("Printing new files"));
    assert_eq!(result.lines().len(), 1);

    Ok(())
}
