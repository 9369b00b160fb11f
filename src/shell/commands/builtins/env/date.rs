// Date command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::Result;
use chrono::{Local, Utc};
use std::io::Write;

pub struct DateCommand;

const DEFAULT_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

impl Command for DateCommand {
    fn name(&self) -> &str {
        "date"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let utc = args.iter().any(|a| a == "-u");
        let format = args
            .iter()
            .find_map(|a| a.strip_prefix('+'))
            .unwrap_or(DEFAULT_FORMAT);

        let text = if utc {
            Utc::now().format(format).to_string()
        } else {
            Local::now().format(format).to_string()
        };
        writeln!(ctx.stdout, "{}", text)?;
        Ok(())
    }

    fn help(&self) -> &str {
        "date [-u] [+format]\n\nPrint the current date and time using strftime-style formats.\n  -u  use UTC"
    }

    fn short_help(&self) -> &str {
        "print date and time"
    }
}
