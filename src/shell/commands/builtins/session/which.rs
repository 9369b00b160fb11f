// Which command

use crate::script::Interpreter;
use crate::shell::alias::Aliases;
use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use anyhow::{Result, bail};
use std::io::Write;
use std::sync::{Arc, Mutex, Weak};

/// Tells what a name runs: an alias, a script function or a builtin.
/// There are no external programs to look up.
pub struct WhichCommand {
    aliases: Arc<Aliases>,
    interpreter: Weak<Mutex<Interpreter>>,
}

impl WhichCommand {
    pub fn new(aliases: Arc<Aliases>, interpreter: Weak<Mutex<Interpreter>>) -> Self {
        Self { aliases, interpreter }
    }

    // A script that is running holds the lock; its functions are skipped then.
    fn is_function(&self, name: &str) -> bool {
        self.interpreter
            .upgrade()
            .and_then(|interpreter| interpreter.try_lock().ok().map(|i| i.has_function(name)))
            .unwrap_or(false)
    }
}

impl Command for WhichCommand {
    fn name(&self) -> &str {
        "which"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        if args.is_empty() {
            bail!("which: missing command name");
        }
        let mut missing = false;
        for name in args {
            if let Some(value) = self.aliases.get(name) {
                writeln!(ctx.stdout, "{}: aliased to {}", name, value)?;
            } else if self.is_function(name) {
                writeln!(ctx.stdout, "{}: shell function", name)?;
            } else if ctx.registry.contains(name) {
                writeln!(ctx.stdout, "{}: lish builtin", name)?;
            } else {
                writeln!(ctx.stderr, "{}: not found", name)?;
                missing = true;
            }
        }
        if missing {
            return Err(ShellError::Status(1).into());
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "which NAME...\n\nShow whether each NAME is an alias, a function or a builtin."
    }

    fn short_help(&self) -> &str {
        "locate a command"
    }
}
