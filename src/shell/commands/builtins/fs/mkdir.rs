// Mkdir command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::split_flags;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, bail};
use std::fs;

pub struct MkdirCommand;

impl Command for MkdirCommand {
    fn name(&self) -> &str {
        "mkdir"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, paths) = split_flags(args);
        let parents = flags.contains(&'p');

        if paths.is_empty() {
            bail!("usage: mkdir [-p] dir...");
        }

        for path_str in &paths {
            if parents {
                fs::create_dir_all(path_str)
                    .with_context(|| format!("Failed to create directory (with parents): {}", path_str))?;
            } else {
                fs::create_dir(path_str).with_context(|| format!("Failed to create directory: {}", path_str))?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "mkdir [-p] dir...\n\nCreate directories.\n  -p  create missing parents, no error if it exists"
    }

    fn short_help(&self) -> &str {
        "create directories"
    }
}
