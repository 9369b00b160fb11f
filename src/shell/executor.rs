use crate::script::Dispatch;
use crate::shell::ast::{ParsedCommand, Pipeline};
use crate::shell::commands::Registry;
use crate::shell::context::{CancelToken, CommandContext, SharedReader, SharedWriter};
use crate::shell::error::{ShellError, is_broken_pipe};
use anyhow::{Context, Result};
use colored::*;
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Runs pipelines against the session's stdio, dispatching every stage to
/// the registry.
pub struct Executor {
    registry: Arc<Registry>,
    stdin: SharedReader,
    stdout: SharedWriter,
    stderr: SharedWriter,
}

impl Executor {
    pub fn new(
        registry: Arc<Registry>,
        stdin: SharedReader,
        stdout: SharedWriter,
        stderr: SharedWriter,
    ) -> Self {
        Self {
            registry,
            stdin,
            stdout,
            stderr,
        }
    }

    /// An executor bound to a running stage's handles, for commands that
    /// run scripts (`source`, `exec`). The stage keeps empty stand-ins;
    /// the pipe ends close once the returned executor is dropped.
    pub fn for_stage(ctx: &mut CommandContext<'_>) -> Self {
        let stdin = std::mem::replace(&mut ctx.stdin, Box::new(io::empty()));
        let stdout = std::mem::replace(&mut ctx.stdout, Box::new(io::sink()));
        let stderr = std::mem::replace(&mut ctx.stderr, Box::new(io::sink()));
        Self::new(
            ctx.registry.clone(),
            SharedReader::new(stdin),
            SharedWriter::new(stdout),
            SharedWriter::new(stderr),
        )
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn stderr(&self) -> SharedWriter {
        self.stderr.clone()
    }

    /// Prints `err` on stderr with a suggestion for mistyped commands.
    /// Quiet statuses print nothing.
    pub fn report_error(&self, err: &anyhow::Error) {
        if ShellError::is_quiet(err) {
            return;
        }
        let mut stderr = self.stderr.clone();
        let _ = writeln!(stderr, "{} {:#}", "lish:".red().bold(), err);
        if let Some(ShellError::UnknownCommand(name)) = err.downcast_ref::<ShellError>() {
            if let Some(suggestion) = self.registry.closest(name) {
                let _ = writeln!(stderr, "  did you mean {}?", suggestion.green());
            }
        }
    }

    /// Stages `0..n-1` run on worker threads, each writing into its own OS
    /// pipe; the last stage runs on the calling thread. A worker drops its
    /// write end when it returns, whatever the outcome, so the next stage
    /// always sees end of stream. Worker failures are reported on stderr
    /// and do not stop the other stages; only the last stage's result is
    /// returned.
    pub fn execute_pipeline(&self, cancel: &CancelToken, pipeline: &Pipeline) -> Result<()> {
        let Some((last, upstream)) = pipeline.commands.split_last() else {
            return Ok(());
        };

        if upstream.is_empty() {
            return self.execute_command(
                cancel,
                last,
                Box::new(self.stdin.clone()),
                Box::new(self.stdout.clone()),
            );
        }

        thread::scope(|scope| {
            let mut input: Box<dyn Read + Send> = Box::new(self.stdin.clone());

            for (index, cmd) in upstream.iter().enumerate() {
                let (reader, writer) = os_pipe::pipe().context("Failed to create pipe")?;
                let stage_input = std::mem::replace(&mut input, Box::new(reader));
                let mut stderr = self.stderr.clone();

                scope.spawn(move || {
                    debug!("stage {} started: {}", index, cmd);
                    let result = self.execute_command(cancel, cmd, stage_input, Box::new(writer));
                    match result {
                        Ok(()) => debug!("stage {} finished", index),
                        Err(e) if is_broken_pipe(&e) => {
                            debug!("stage {} stopped, reader went away", index)
                        }
                        Err(e) if ShellError::is_quiet(&e) => {
                            debug!("stage {} ({}) ended with {}", index, cmd.command, e)
                        }
                        Err(e) => {
                            warn!("stage {} ({}) failed: {:#}", index, cmd.command, e);
                            let _ = writeln!(stderr, "{}: {:#}", cmd.command, e);
                        }
                    }
                });
            }

            debug!("stage {} started: {}", upstream.len(), last);
            self.execute_command(cancel, last, input, Box::new(self.stdout.clone()))
        })
    }

    /// Apply the stage's own redirections on top of the handles it was
    /// given, then run it.
    fn execute_command(
        &self,
        cancel: &CancelToken,
        cmd: &ParsedCommand,
        stdin: Box<dyn Read + Send>,
        stdout: Box<dyn Write + Send>,
    ) -> Result<()> {
        let stdin: Box<dyn Read + Send> = match &cmd.redirect_in {
            Some(path) => Box::new(open_input(path)?),
            None => stdin,
        };
        let stdout: Box<dyn Write + Send> = match &cmd.redirect_out {
            Some(path) => Box::new(open_output(path, cmd.append, "output")?),
            None => stdout,
        };
        let stderr: Box<dyn Write + Send> = match &cmd.redirect_err {
            Some(path) => Box::new(open_output(path, false, "error output")?),
            None => Box::new(self.stderr.clone()),
        };

        let command = self
            .registry
            .get(&cmd.command)
            .ok_or_else(|| ShellError::UnknownCommand(cmd.command.clone()))?;

        let mut ctx = CommandContext {
            stdin,
            stdout,
            stderr,
            cancel: cancel.clone(),
            registry: &self.registry,
        };

        let result = command.execute(&mut ctx, &cmd.args);
        let flushed = ctx.stdout.flush();
        result?;
        flushed.with_context(|| format!("{}: failed to flush output", cmd.command))
    }
}

impl Dispatch for Executor {
    fn dispatch(&self, cancel: &CancelToken, pipeline: &Pipeline) -> Result<()> {
        self.execute_pipeline(cancel, pipeline)
    }

    fn redirected(&self, stage: &ParsedCommand) -> Result<Arc<dyn Dispatch>> {
        let stdin = match &stage.redirect_in {
            Some(path) => SharedReader::new(Box::new(open_input(path)?)),
            None => self.stdin.clone(),
        };
        let stdout = match &stage.redirect_out {
            Some(path) => SharedWriter::new(Box::new(open_output(path, stage.append, "output")?)),
            None => self.stdout.clone(),
        };
        let stderr = match &stage.redirect_err {
            Some(path) => SharedWriter::new(Box::new(open_output(path, false, "error output")?)),
            None => self.stderr.clone(),
        };
        debug!("redirected dispatcher for {}", stage);
        Ok(Arc::new(Executor::new(self.registry.clone(), stdin, stdout, stderr)))
    }

    fn report(&self, err: &anyhow::Error) {
        self.report_error(err);
    }
}

fn open_input(path: &str) -> Result<File> {
    File::open(path).map_err(|source| {
        ShellError::Redirect {
            path: Path::new(path).to_path_buf(),
            purpose: "input",
            source,
        }
        .into()
    })
}

fn open_output(path: &str, append: bool, purpose: &'static str) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true);
    if append {
        opts.append(true);
    } else {
        opts.truncate(true);
    }
    opts.open(path).map_err(|source| {
        ShellError::Redirect {
            path: Path::new(path).to_path_buf(),
            purpose,
            source,
        }
        .into()
    })
}
