// Rm command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::split_flags;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub struct RmCommand;

impl Command for RmCommand {
    fn name(&self) -> &str {
        "rm"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, paths) = split_flags(args);
        let recursive = flags.contains(&'r') || flags.contains(&'R');
        let force = flags.contains(&'f');

        if paths.is_empty() && !force {
            bail!("usage: rm [-rf] path...");
        }

        for path_str in &paths {
            let p = Path::new(path_str);
            if !p.exists() {
                if !force {
                    bail!("File not found: {}", path_str);
                }
                continue;
            }

            if p.is_dir() {
                if recursive {
                    fs::remove_dir_all(p).with_context(|| format!("Failed to remove directory: {}", path_str))?;
                } else {
                    bail!("Cannot remove directory '{}' without -r", path_str);
                }
            } else {
                fs::remove_file(p).with_context(|| format!("Failed to remove file: {}", path_str))?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "rm [-rf] path...\n\nRemove files or directories.\n  -r  remove directories and their contents\n  -f  ignore missing paths"
    }

    fn short_help(&self) -> &str {
        "remove files"
    }
}
