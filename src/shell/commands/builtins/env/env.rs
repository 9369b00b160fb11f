// Env command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::Result;
use std::io::Write;

pub struct EnvCommand;

impl Command for EnvCommand {
    fn name(&self) -> &str {
        "env"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort();

        for (key, value) in vars {
            if args.is_empty() || args.iter().any(|a| key.contains(a.as_str())) {
                writeln!(ctx.stdout, "{}={}", key, value)?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "env [filter...]\n\nPrint the process environment, optionally only names containing a filter."
    }

    fn short_help(&self) -> &str {
        "print environment variables"
    }
}
