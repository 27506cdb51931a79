//! Runs the `tidemark` binary built for this test run

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct TidemarkCommand {
    working_dir: PathBuf,
    args: Vec<String>,
}

impl TidemarkCommand {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn run(&self) -> Result<CommandResult> {
        let output = Command::new(env!("CARGO_BIN_EXE_tidemark"))
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env_remove("RUST_LOG")
            .output()
            .context("Failed to run tidemark")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Run and require exit code 0
    pub fn succeeds(&self) -> Result<CommandResult> {
        let result = self.run()?;
        if result.exit_code != 0 {
            bail!(
                "tidemark {:?} exited with {}\n{}",
                self.args,
                result.exit_code,
                result.stderr
            );
        }
        Ok(result)
    }

    /// Run and require the given non-zero exit code
    pub fn fails_with(&self, code: i32) -> Result<CommandResult> {
        let result = self.run()?;
        if result.exit_code != code {
            bail!(
                "tidemark {:?} exited with {}, wanted {}\nstdout: {}\nstderr: {}",
                self.args,
                result.exit_code,
                code,
                result.stdout,
                result.stderr
            );
        }
        Ok(result)
    }
}

#[derive(Debug)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Non-empty stdout lines
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|l| !l.is_empty()).collect()
    }
}

/// `tidemark!(dir, "list", "--path", data)` builds a command
#[macro_export]
macro_rules! tidemark {
    ($dir:expr, $($arg:expr),+ $(,)?) => {{
        let mut cmd = $crate::common::TidemarkCommand::new($dir);
        cmd.args(&[$($arg),+]);
        cmd
    }};
}
