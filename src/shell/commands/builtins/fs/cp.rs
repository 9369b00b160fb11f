// Cp command

use crate::shell::commands::Command;
use crate::shell::commands::builtins::common::{copy_dir_recursive, split_flags};
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;

pub struct CpCommand;

impl Command for CpCommand {
    fn name(&self) -> &str {
        "cp"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let (flags, mut paths) = split_flags(args);
        let recursive = flags.contains(&'r') || flags.contains(&'R');

        if paths.len() < 2 {
            bail!("cp requires at least source and destination");
        }

        let dest_str = paths.pop().ok_or_else(|| anyhow!("missing destination"))?;
        let dest_path = Path::new(&dest_str);
        let dest_is_dir = dest_path.is_dir();

        if paths.len() > 1 && !dest_is_dir {
            bail!("Target '{}' is not a directory", dest_str);
        }

        for src_str in &paths {
            let src_path = Path::new(src_str);
            if !src_path.exists() {
                bail!("Source not found: {}", src_str);
            }

            let target = if dest_is_dir {
                dest_path.join(src_path.file_name().ok_or_else(|| anyhow!("Invalid source filename"))?)
            } else {
                dest_path.to_path_buf()
            };

            if src_path.is_dir() {
                if recursive {
                    copy_dir_recursive(src_path, &target)?;
                } else {
                    bail!("Omitting directory '{}' (use -r to copy)", src_str);
                }
            } else {
                fs::copy(src_path, &target)
                    .with_context(|| format!("Failed to copy {} to {}", src_str, target.display()))?;
            }
        }

        Ok(())
    }

    fn help(&self) -> &str {
        "cp [-r] source... dest\n\nCopy files. With several sources the destination must be a directory.\n  -r  copy directories recursively"
    }

    fn short_help(&self) -> &str {
        "copy files"
    }
}
