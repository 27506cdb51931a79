//! Show the stored checkpoint

use crate::util::TargetArgs;
use anyhow::Result;
use backend::Backends;
use owo_colors::OwoColorize;
use tidemark_core::{format_timestamp, Location};
use tracing::debug;

pub fn run(target: &TargetArgs) -> Result<()> {
    let location = Location::parse(target.checkpoint_path()?);
    let store = target.merged_store_config()?;
    let backends = Backends::for_locations(&[&location], store.as_ref())?;
    let checkpoint = backends.resolve(&location)?.load_checkpoint(&location)?;
    debug!(location = %location, checkpoint = %checkpoint, "Loaded checkpoint");

    println!("Checkpoint:  {}", location.to_string().cyan());
    match checkpoint.last_processed_time() {
        Some(value) => {
            println!("Value:       {value}");
            println!("Local time:  {}", format_timestamp(value).bold());
        }
        None => println!("{}", "No checkpoint recorded".yellow()),
    }

    Ok(())
}
