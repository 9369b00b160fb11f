// Cd command

use crate::config::home_dir;
use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;

pub struct CdCommand;

impl Command for CdCommand {
    fn name(&self) -> &str {
        "cd"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let target = match args.first() {
            Some(path) if path == "~" => home_dir(),
            Some(path) => match path.strip_prefix("~/") {
                Some(rest) => home_dir().join(rest),
                None => PathBuf::from(path),
            },
            None => home_dir(),
        };

        if !target.is_dir() {
            bail!("cd: no such file or directory: {}", target.display());
        }
        // Canonicalize to remove .. and .
        let target = target.canonicalize().unwrap_or(target);
        env::set_current_dir(&target)?;
        Ok(())
    }

    fn help(&self) -> &str {
        "cd [dir]\n\nChange the working directory (home when omitted)."
    }

    fn short_help(&self) -> &str {
        "change directory"
    }
}
