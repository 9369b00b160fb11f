// Help command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Result, bail};
use std::io::Write;

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        if let Some(name) = args.first() {
            let Some(command) = ctx.registry.get(name) else {
                bail!("help: no such command: {}", name);
            };
            writeln!(ctx.stdout, "{}", command.help())?;
            return Ok(());
        }

        let names = ctx.registry.list();
        let width = names.iter().map(String::len).max().unwrap_or(0);
        writeln!(ctx.stdout, "Available commands:")?;
        for name in names {
            if let Some(command) = ctx.registry.get(&name) {
                writeln!(ctx.stdout, "  {:<width$}  {}", name, command.short_help(), width = width)?;
            }
        }
        writeln!(ctx.stdout, "\nUse 'help <command>' for details.")?;
        Ok(())
    }

    fn help(&self) -> &str {
        "help [command]\n\nList commands, or show the help of one command."
    }

    fn short_help(&self) -> &str {
        "show help"
    }
}
