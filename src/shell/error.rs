use crate::script::ScriptError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the session layer may want to tell apart. Everything else
/// travels as a plain `anyhow::Error`.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("cannot open {path} for {purpose}: {source}")]
    Redirect {
        path: PathBuf,
        purpose: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("command {0} is already registered")]
    DuplicateCommand(String),

    #[error("interrupted")]
    Interrupted,

    /// Quiet failure: the command already said what it had to say (or
    /// nothing, like `false`) and only wants a non-zero status.
    #[error("exit status {0}")]
    Status(i32),

    /// The session was asked to terminate.
    #[error("exit {0}")]
    Exit(i32),
}

impl ShellError {
    /// Errors that carry no message worth printing.
    pub fn is_quiet(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::Status(_) | ShellError::Exit(_))
        )
    }

    /// Errors that end the whole run rather than one command: `exit` and
    /// interrupts.
    pub fn is_fatal(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::Exit(_) | ShellError::Interrupted)
        ) || matches!(err.downcast_ref::<ScriptError>(), Some(ScriptError::Interrupted))
    }
}

/// Process exit status for a run that ended in `err`. `$?` itself only
/// tells success (0) from failure (1).
pub fn exit_status(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ShellError>() {
        Some(ShellError::Status(code) | ShellError::Exit(code)) => *code,
        Some(ShellError::UnknownCommand(_)) => 127,
        Some(ShellError::Interrupted) => 130,
        _ if matches!(err.downcast_ref::<ScriptError>(), Some(ScriptError::Interrupted)) => 130,
        _ => 1,
    }
}

/// Broken pipes show up when a downstream stage stops reading early
/// (`cat big.txt | head`). They are expected and not worth reporting.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
