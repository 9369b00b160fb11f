// Head command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{byte_lines, open_inputs, take_count};
use crate::shell::context::CommandContext;
use std::io::Write;
use anyhow::Result;

pub struct HeadCommand;

impl Command for HeadCommand {
    fn name(&self) -> &str {
        "head"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (count, files) = take_count(args, "-n", 10)?;

        for (_, reader) in open_inputs(ctx, &files)? {
            // Stops reading as soon as enough lines were seen; upstream then hits a closed pipe.
            for line in byte_lines(reader).take(count) {
                writeln!(ctx.stdout, "{}", line?)?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "head [-n count] [file...]\n\nPrint the first lines of each input (10 by default)."
    }

    fn short_help(&self) -> &str {
        "print the first lines"
    }
}
