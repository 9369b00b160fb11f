// Tail command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{byte_lines, open_inputs, take_count};
use crate::shell::context::CommandContext;
use std::io::Write;
use anyhow::Result;
use std::collections::VecDeque;

pub struct TailCommand;

impl Command for TailCommand {
    fn name(&self) -> &str {
        "tail"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (count, files) = take_count(args, "-n", 10)?;

        for (_, reader) in open_inputs(ctx, &files)? {
            let mut window = VecDeque::with_capacity(count);
            for line in byte_lines(reader) {
                let line = line?;
                if count == 0 {
                    continue;
                }
                if window.len() == count {
                    window.pop_front();
                }
                window.push_back(line);
            }
            for line in window {
                writeln!(ctx.stdout, "{}", line)?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "tail [-n count] [file...]\n\nPrint the last lines of each input (10 by default)."
    }

    fn short_help(&self) -> &str {
        "print the last lines"
    }
}
