// Echo command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use std::io::Write;
use anyhow::Result;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (newline, words) = match args.first() {
            Some(flag) if flag == "-n" => (false, &args[1..]),
            _ => (true, args),
        };

        let output = words.join(" ");
        if newline {
            writeln!(ctx.stdout, "{}", output)?;
        } else {
            write!(ctx.stdout, "{}", output)?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "echo [-n] [text...]\n\nWrite the arguments separated by single spaces.\n  -n  do not print the trailing newline"
    }

    fn short_help(&self) -> &str {
        "print arguments"
    }
}
