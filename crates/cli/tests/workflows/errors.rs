//! Failure modes and exit codes

use crate::common::ScanDir;
use crate::tidemark;
use anyhow::Result;

#[test]
fn test_unsupported_scheme_exits_with_config_code() -> Result<()> {
    let scan = ScanDir::new()?;

    let result = tidemark!(
        scan.root(),
        "list",
        "--path",
        "ftp://host/data",
        "--checkpoint",
        scan.checkpoint()
    )
    .fails_with(2)?;
    assert!(result.stderr.contains("ftp"));

    tidemark!(scan.root(), "show", "--checkpoint", "ftp://host/cp.json").fails_with(2)?;
    tidemark!(scan.root(), "commit", "--checkpoint", "ftp://host/cp.json").fails_with(2)?;

    Ok(())
}

#[test]
fn test_missing_checkpoint_flag_is_config_error() -> Result<()> {
    let scan = ScanDir::new()?;
    let result = tidemark!(scan.root(), "list", "--path", scan.data()).fails_with(2)?;
    assert!(result.stderr.contains("--checkpoint"));
    Ok(())
}

#[test]
fn test_missing_data_root_exits_with_failure() -> Result<()> {
    let scan = ScanDir::new()?;
    let missing = scan.root().join("nowhere");

    tidemark!(
        scan.root(),
        "list",
        "--path",
        missing.to_str().unwrap(),
        "--checkpoint",
        scan.checkpoint()
    )
    .fails_with(1)?;

    Ok(())
}

#[test]
fn test_corrupt_checkpoint_fails() -> Result<()> {
    let scan = ScanDir::new()?;
    std::fs::create_dir_all(scan.checkpoint_path().parent().unwrap())?;
    std::fs::write(scan.checkpoint_path(), "not json")?;

    tidemark!(
        scan.root(),
        "list",
        "--path",
        scan.data(),
        "--checkpoint",
        scan.checkpoint()
    )
    .fails_with(1)?;

    Ok(())
}
