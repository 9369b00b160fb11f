// Clear command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::Result;
use std::io::Write;

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str {
        "clear"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<()> {
        // erase the screen, then home the cursor
        write!(ctx.stdout, "\x1b[2J\x1b[H")?;
        Ok(())
    }

    fn help(&self) -> &str {
        "clear\n\nClear the terminal screen."
    }

    fn short_help(&self) -> &str {
        "clear the screen"
    }
}
