// Exit command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use anyhow::{Context, Result};

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &str {
        "exit"
    }

    // The session owns shutdown, so this only asks for it.
    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let code = match args.first() {
            Some(value) => value
                .parse::<i32>()
                .with_context(|| format!("exit: numeric argument required: {}", value))?,
            None => 0,
        };
        Err(ShellError::Exit(code).into())
    }

    fn help(&self) -> &str {
        "exit [code]\n\nLeave the shell with the given status (0 by default)."
    }

    fn short_help(&self) -> &str {
        "leave the shell"
    }
}
