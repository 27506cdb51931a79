//! Advance the checkpoint
//!
//! Only the checkpoint location is needed; the data root is never touched.

use crate::util::TargetArgs;
use anyhow::Result;
use backend::Backends;
use owo_colors::OwoColorize;
use tidemark_core::{format_timestamp, Checkpoint, Clock, CommitMode, Location, SystemClock};
use tracing::{info, warn};

pub fn run(target: &TargetArgs) -> Result<()> {
    let location = Location::parse(target.checkpoint_path()?);
    let store = target.merged_store_config()?;
    let backends = Backends::for_locations(&[&location], store.as_ref())?;
    let backend = backends.resolve(&location)?;

    let previous = backend.load_checkpoint(&location)?;
    let checkpoint = match target.commit_mode()? {
        CommitMode::WallClock => Checkpoint::at(SystemClock.now()),
        CommitMode::MaxSeenMtime => {
            warn!("Nothing listed in max_seen_mtime mode; checkpoint value unchanged");
            Checkpoint::at(previous.cutoff())
        }
    };
    backend.commit_checkpoint(&location, &checkpoint)?;
    info!(
        location = %location,
        last_processed_time = checkpoint.cutoff(),
        "Checkpoint updated to: {}",
        format_timestamp(checkpoint.cutoff())
    );

    println!(
        "{} Checkpoint updated to: {}",
        "✓".green(),
        format_timestamp(checkpoint.cutoff()).cyan()
    );
    if !previous.is_initial() {
        println!("  Previous:  {}", format_timestamp(previous.cutoff()).dimmed());
    }

    Ok(())
}
