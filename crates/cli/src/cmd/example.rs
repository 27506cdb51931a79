//! Print an example configuration file

use anyhow::Result;

pub fn run() -> Result<()> {
    print!("{}", tidemark_core::config::example_config());
    Ok(())
}
