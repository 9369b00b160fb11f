// Grep command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{byte_lines, open_inputs, split_flags};
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use std::io::Write;
use anyhow::{Context, Result, bail};
use regex::RegexBuilder;

pub struct GrepCommand;

impl Command for GrepCommand {
    fn name(&self) -> &str {
        "grep"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, mut operands) = split_flags(args);
        if operands.is_empty() {
            bail!("usage: grep [-ivnc] pattern [file...]");
        }
        let pattern = operands.remove(0);

        let ignore_case = flags.contains(&'i');
        let invert = flags.contains(&'v');
        let numbered = flags.contains(&'n');
        let count_only = flags.contains(&'c');

        let re = RegexBuilder::new(&pattern)
            .case_insensitive(ignore_case)
            .build()
            .with_context(|| format!("invalid pattern: {}", pattern))?;

        let show_names = operands.len() > 1;
        let mut matched_any = false;

        for (name, reader) in open_inputs(ctx, &operands)? {
            let mut count = 0usize;
            for (index, line) in byte_lines(reader).enumerate() {
                ctx.check_cancelled()?;
                let line = line?;
                if re.is_match(&line) == invert {
                    continue;
                }
                count += 1;
                if count_only {
                    continue;
                }
                if show_names {
                    write!(ctx.stdout, "{}:", name)?;
                }
                if numbered {
                    write!(ctx.stdout, "{}:", index + 1)?;
                }
                writeln!(ctx.stdout, "{}", line)?;
            }
            if count_only {
                if show_names {
                    write!(ctx.stdout, "{}:", name)?;
                }
                writeln!(ctx.stdout, "{}", count)?;
            }
            matched_any |= count > 0;
        }

        if !matched_any {
            return Err(ShellError::Status(1).into());
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "grep [-ivnc] pattern [file...]\n\nPrint lines matching a regular expression.\n  -i  ignore case\n  -v  select non-matching lines\n  -n  prefix line numbers\n  -c  print only a count of matching lines\n\nFails when nothing matched."
    }

    fn short_help(&self) -> &str {
        "search text with a regular expression"
    }
}
