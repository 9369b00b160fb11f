// Source command

use crate::script::Interpreter;
use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::executor::Executor;
use anyhow::{Result, bail};
use std::path::Path;
use std::sync::{Arc, Mutex, TryLockError, Weak};

/// Runs a script inside the session interpreter so its variables and
/// functions survive. The script reads and writes through this stage's
/// handles, so `source f > out` and `source f | cat` see its output.
pub struct SourceCommand {
    interpreter: Weak<Mutex<Interpreter>>,
}

impl SourceCommand {
    pub fn new(interpreter: Weak<Mutex<Interpreter>>) -> Self {
        Self { interpreter }
    }
}

impl Command for SourceCommand {
    fn name(&self) -> &str {
        "source"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let Some(path) = args.first() else {
            bail!("source: missing file operand");
        };
        let Some(interpreter) = self.interpreter.upgrade() else {
            bail!("source: the session is gone");
        };
        // The interpreter is busy when a running script pipes into `source`.
        let mut interpreter = match interpreter.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                bail!("source: cannot run inside a pipeline of a running script")
            }
        };
        let previous = interpreter.replace_dispatcher(Arc::new(Executor::for_stage(ctx)));
        let result = interpreter.source_file(&ctx.cancel, Path::new(path));
        interpreter.replace_dispatcher(previous);
        result
    }

    fn help(&self) -> &str {
        "source FILE\n. FILE\n\nRun FILE in the current session. Variables and functions it\ndefines stay available afterwards."
    }

    fn short_help(&self) -> &str {
        "run a script in the current session"
    }
}
