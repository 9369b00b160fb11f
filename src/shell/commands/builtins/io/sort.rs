// Sort command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{read_lines, split_flags};
use crate::shell::context::CommandContext;
use std::io::Write;
use anyhow::Result;
use std::cmp::Ordering;

pub struct SortCommand;

impl Command for SortCommand {
    fn name(&self) -> &str {
        "sort"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, files) = split_flags(args);
        let numeric = flags.contains(&'n');
        let reverse = flags.contains(&'r');
        let unique = flags.contains(&'u');

        let mut lines = read_lines(ctx, &files)?;
        if numeric {
            lines.sort_by(|a, b| compare_numeric(a, b));
        } else {
            lines.sort();
        }
        if reverse {
            lines.reverse();
        }
        if unique {
            lines.dedup();
        }

        for line in lines {
            writeln!(ctx.stdout, "{}", line)?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "sort [-nru] [file...]\n\nSort lines.\n  -n  compare as numbers\n  -r  reverse the order\n  -u  drop repeated lines"
    }

    fn short_help(&self) -> &str {
        "sort lines"
    }
}

// Lines that are not numbers sort before numbers, then by text.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| s.trim().parse::<f64>().ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
