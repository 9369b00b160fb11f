// Alias and unalias commands

use crate::shell::alias::{Aliases, is_valid_name};
use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use anyhow::{Result, bail};
use std::io::Write;
use std::sync::Arc;

pub struct AliasCommand {
    aliases: Arc<Aliases>,
}

impl AliasCommand {
    pub fn new(aliases: Arc<Aliases>) -> Self {
        Self { aliases }
    }
}

impl Command for AliasCommand {
    fn name(&self) -> &str {
        "alias"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        if args.is_empty() {
            for (name, value) in self.aliases.list() {
                writeln!(ctx.stdout, "alias {}={}", name, shell_words::quote(&value))?;
            }
            return Ok(());
        }

        let mut missing = false;
        for arg in args {
            match arg.split_once('=') {
                Some((name, value)) => {
                    if !is_valid_name(name) {
                        bail!("alias: invalid alias name: {}", name);
                    }
                    self.aliases.set(name, value);
                }
                None => match self.aliases.get(arg) {
                    Some(value) => writeln!(ctx.stdout, "alias {}={}", arg, shell_words::quote(&value))?,
                    None => {
                        writeln!(ctx.stderr, "alias: {}: not found", arg)?;
                        missing = true;
                    }
                },
            }
        }
        if missing {
            return Err(ShellError::Status(1).into());
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "alias [NAME[=VALUE]...]\n\nWithout arguments, list every alias. NAME=VALUE defines one,\na bare NAME shows it."
    }

    fn short_help(&self) -> &str {
        "define or show aliases"
    }
}

pub struct UnaliasCommand {
    aliases: Arc<Aliases>,
}

impl UnaliasCommand {
    pub fn new(aliases: Arc<Aliases>) -> Self {
        Self { aliases }
    }
}

impl Command for UnaliasCommand {
    fn name(&self) -> &str {
        "unalias"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        if args.is_empty() {
            bail!("unalias: missing alias name");
        }
        let mut missing = false;
        for name in args {
            if !self.aliases.remove(name) {
                writeln!(ctx.stderr, "unalias: {}: not found", name)?;
                missing = true;
            }
        }
        if missing {
            return Err(ShellError::Status(1).into());
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "unalias NAME...\n\nRemove the named aliases."
    }

    fn short_help(&self) -> &str {
        "remove aliases"
    }
}
