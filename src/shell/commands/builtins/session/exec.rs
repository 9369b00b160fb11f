// Exec command

use crate::script::Interpreter;
use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use crate::shell::executor::Executor;
use anyhow::{Result, bail};
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Runs a script in a fresh interpreter bound to this stage's handles.
/// Nothing it defines leaks back into the session, and its `exit` only
/// ends the script.
pub struct ExecCommand;

impl Command for ExecCommand {
    fn name(&self) -> &str {
        "exec"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let Some((path, script_args)) = args.split_first() else {
            bail!("exec: missing file operand");
        };
        let cancel = ctx.cancel.clone();
        let mut interpreter = Interpreter::new(Arc::new(Executor::for_stage(ctx)));
        let result = interpreter.execute_file(&cancel, Path::new(path), script_args);
        let code = match result {
            Ok(()) => interpreter.last_exit_code(),
            Err(e) => match e.downcast_ref::<ShellError>() {
                Some(ShellError::Exit(code)) => *code,
                _ => return Err(e),
            },
        };
        debug!("{} finished with status {}", path, code);

        if code != 0 {
            return Err(ShellError::Status(code).into());
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "exec FILE [ARGS...]\n\nRun FILE in a separate interpreter. $1..$N are bound to ARGS;\nvariables and functions it defines are discarded."
    }

    fn short_help(&self) -> &str {
        "run a script in isolation"
    }
}
