// Wc command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{open_inputs, split_flags};
use crate::shell::context::CommandContext;
use anyhow::Result;
use std::io::{Read, Write};

#[derive(Default, Clone, Copy)]
struct Counts {
    lines: usize,
    words: usize,
    bytes: usize,
}

pub struct WcCommand;

impl Command for WcCommand {
    fn name(&self) -> &str {
        "wc"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, files) = split_flags(args);
        let all = !flags.iter().any(|f| matches!(f, 'l' | 'w' | 'c'));
        let show = |f: char| all || flags.contains(&f);

        let mut total = Counts::default();
        let inputs = open_inputs(ctx, &files)?;
        let named = !files.is_empty();
        let multiple = inputs.len() > 1;

        for (name, mut reader) in inputs {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            let text = String::from_utf8_lossy(&buf);
            let counts = Counts {
                lines: buf.iter().filter(|b| **b == b'\n').count(),
                words: text.split_whitespace().count(),
                bytes: buf.len(),
            };
            total.lines += counts.lines;
            total.words += counts.words;
            total.bytes += counts.bytes;

            let label = if named { Some(name.as_str()) } else { None };
            write_counts(ctx, counts, label, &show)?;
        }

        if multiple {
            write_counts(ctx, total, Some("total"), &show)?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "wc [-lwc] [file...]\n\nCount lines, words and bytes.\n  -l  lines\n  -w  words\n  -c  bytes"
    }

    fn short_help(&self) -> &str {
        "count lines, words and bytes"
    }
}

fn write_counts(
    ctx: &mut CommandContext<'_>,
    counts: Counts,
    label: Option<&str>,
    show: &dyn Fn(char) -> bool,
) -> Result<()> {
    let mut fields = Vec::new();
    if show('l') {
        fields.push(counts.lines.to_string());
    }
    if show('w') {
        fields.push(counts.words.to_string());
    }
    if show('c') {
        fields.push(counts.bytes.to_string());
    }
    if let Some(label) = label {
        fields.push(label.to_string());
    }
    writeln!(ctx.stdout, "{}", fields.join(" "))?;
    Ok(())
}
