// Mv command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;

pub struct MvCommand;

impl Command for MvCommand {
    fn name(&self) -> &str {
        "mv"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let Some((dest_str, sources)) = args.split_last() else {
            bail!("mv requires source and destination");
        };
        if sources.is_empty() {
            bail!("mv requires source and destination");
        }

        let dest_path = Path::new(dest_str);
        let dest_is_dir = dest_path.is_dir();
        if sources.len() > 1 && !dest_is_dir {
            bail!("Target '{}' is not a directory", dest_str);
        }

        for src_str in sources {
            let src_path = Path::new(src_str);
            let target = if dest_is_dir {
                dest_path.join(src_path.file_name().ok_or_else(|| anyhow!("Invalid source filename"))?)
            } else {
                dest_path.to_path_buf()
            };
            fs::rename(src_path, &target)
                .with_context(|| format!("Failed to move {} to {}", src_str, target.display()))?;
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "mv source... dest\n\nMove or rename files."
    }

    fn short_help(&self) -> &str {
        "move or rename files"
    }
}
