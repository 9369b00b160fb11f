// Cat command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::open_inputs;
use crate::shell::context::CommandContext;
use anyhow::Result;
use std::io;

pub struct CatCommand;

impl Command for CatCommand {
    fn name(&self) -> &str {
        "cat"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        // Streams chunk by chunk so a slow producer upstream is never buffered whole.
        for (_, mut reader) in open_inputs(ctx, args)? {
            io::copy(&mut reader, &mut ctx.stdout)?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "cat [file...]\n\nConcatenate files (or standard input) to standard output."
    }

    fn short_help(&self) -> &str {
        "concatenate files"
    }
}
