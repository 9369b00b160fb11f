// True and false commands

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use anyhow::Result;

pub struct TrueCommand;

impl Command for TrueCommand {
    fn name(&self) -> &str {
        "true"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<()> {
        Ok(())
    }

    fn help(&self) -> &str {
        "true\n\nDo nothing, successfully."
    }

    fn short_help(&self) -> &str {
        "succeed"
    }
}

pub struct FalseCommand;

impl Command for FalseCommand {
    fn name(&self) -> &str {
        "false"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<()> {
        Err(ShellError::Status(1).into())
    }

    fn help(&self) -> &str {
        "false\n\nDo nothing, unsuccessfully."
    }

    fn short_help(&self) -> &str {
        "fail"
    }
}
