// Ls command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::split_flags;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{IsTerminal, Write};
use std::path::Path;

pub struct LsCommand;

impl Command for LsCommand {
    fn name(&self) -> &str {
        "ls"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, mut paths) = split_flags(args);
        let show_hidden = flags.contains(&'a');
        let long = flags.contains(&'l');
        if paths.is_empty() {
            paths.push(".".to_string());
        }

        // Colors only make sense when the listing ends up on a terminal.
        let colorize = std::io::stdout().is_terminal();
        let titled = paths.len() > 1;

        for (i, path_str) in paths.iter().enumerate() {
            let path = Path::new(path_str);
            if path.is_file() {
                writeln!(ctx.stdout, "{}", path_str)?;
                continue;
            }

            let mut entries = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory: {}", path_str))?
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.sort_by_key(|e| e.file_name());

            if titled {
                if i > 0 {
                    writeln!(ctx.stdout)?;
                }
                writeln!(ctx.stdout, "{}:", path_str)?;
            }

            for entry in entries {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !show_hidden && name.starts_with('.') {
                    continue;
                }
                let meta = entry.metadata()?;
                let shown = if colorize && meta.is_dir() {
                    name.blue().bold().to_string()
                } else {
                    name
                };
                if long {
                    let kind = if meta.is_dir() { 'd' } else { '-' };
                    writeln!(ctx.stdout, "{} {:>10} {}", kind, meta.len(), shown)?;
                } else {
                    writeln!(ctx.stdout, "{}", shown)?;
                }
            }
        }

        Ok(())
    }

    fn help(&self) -> &str {
        "ls [-al] [path...]\n\nList directory contents.\n  -a  include hidden entries\n  -l  show type and size"
    }

    fn short_help(&self) -> &str {
        "list directory contents"
    }
}
