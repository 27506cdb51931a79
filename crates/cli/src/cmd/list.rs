//! List files that are new since the checkpoint

use crate::util::TargetArgs;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use session::{format_timestamp, Session};
use std::io::Write;
use tracing::debug;

pub fn run(target: &TargetArgs, json: bool, commit: bool) -> Result<()> {
    let mut session = Session::open(target.session_config()?)?;
    let files = session.get_new_files()?;
    debug!(count = files.len(), json, commit, "Printing new files");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &files).context("Failed to encode file list")?;
        writeln!(out)?;
    } else {
        for file in &files {
            writeln!(out, "{}", file.identifier())?;
        }
    }
    // Everything printed must reach the consumer before the checkpoint moves
    out.flush()?;
    drop(out);

    if commit {
        let checkpoint = session.commit_checkpoint()?;
        let value = checkpoint.cutoff();
        eprintln!(
            "{} Checkpoint updated to: {} ({} new)",
            "✓".green(),
            format_timestamp(value).cyan(),
            files.len()
        );
    }

    Ok(())
}
