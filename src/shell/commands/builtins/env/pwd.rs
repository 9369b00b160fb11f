// Pwd command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result};
use std::io::Write;

pub struct PwdCommand;

impl Command for PwdCommand {
    fn name(&self) -> &str {
        "pwd"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        writeln!(ctx.stdout, "{}", cwd.display())?;
        Ok(())
    }

    fn help(&self) -> &str {
        "pwd\n\nPrint the working directory."
    }

    fn short_help(&self) -> &str {
        "print working directory"
    }
}
