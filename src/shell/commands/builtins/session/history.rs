// History command

use crate::history::History;
use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{split_flags, take_count};
use crate::shell::context::CommandContext;
use anyhow::{Result, bail};
use std::io::Write;
use std::sync::Arc;

pub struct HistoryCommand {
    history: Arc<History>,
}

impl HistoryCommand {
    pub fn new(history: Arc<History>) -> Self {
        Self { history }
    }
}

impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "history"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (count, rest) = take_count(args, "-n", 0)?;
        let (flags, operands) = split_flags(&rest);
        if let Some(extra) = operands.first() {
            bail!("history: unexpected argument: {}", extra);
        }
        if flags.contains(&'c') {
            self.history.clear();
            return Ok(());
        }

        let entries = self.history.entries();
        let skip = if count == 0 { 0 } else { entries.len().saturating_sub(count) };
        for (index, entry) in entries.iter().enumerate().skip(skip) {
            match &entry.timestamp {
                Some(ts) => writeln!(
                    ctx.stdout,
                    "{:>5}  {}  {}",
                    index + 1,
                    ts.format("%Y-%m-%d %H:%M:%S"),
                    entry.line
                )?,
                None => writeln!(ctx.stdout, "{:>5}  {}", index + 1, entry.line)?,
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "history [-n N] [-c]\n\nShow the command history.\n  -n N  only the last N entries\n  -c    clear the history"
    }

    fn short_help(&self) -> &str {
        "show command history"
    }
}
