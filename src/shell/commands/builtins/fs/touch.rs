// Touch command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, bail};
use std::fs::{File, OpenOptions};
use std::time::SystemTime;

pub struct TouchCommand;

impl Command for TouchCommand {
    fn name(&self) -> &str {
        "touch"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        if args.is_empty() {
            bail!("usage: touch file...");
        }
        for path in args {
            let file: File = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to touch: {}", path))?;
            file.set_modified(SystemTime::now())
                .with_context(|| format!("Failed to update timestamp: {}", path))?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "touch file...\n\nCreate empty files or update their modification time."
    }

    fn short_help(&self) -> &str {
        "create files or update timestamps"
    }
}
