pub mod alias;
pub mod ast;
pub mod commands;
pub mod context;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod token;

#[cfg(test)]
mod tests;

use crate::config::LishConfig;
use crate::history::History;
use crate::script::{self, Dispatch, Interpreter};
use alias::Aliases;
use anyhow::Result;
use ast::Operator;
use commands::Registry;
use commands::builtins::register_all_builtins;
use commands::builtins::session::alias::{AliasCommand, UnaliasCommand};
use commands::builtins::session::{history::HistoryCommand, source::SourceCommand, which::WhichCommand};
use context::{CancelToken, SharedReader, SharedWriter};
use error::ShellError;
use executor::Executor;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use token::{Token, TokenKind};

/// One interactive session: the registry, the executor bound to the
/// session's stdio, the aliases and the interpreter that keeps variables
/// and functions between lines.
pub struct Shell {
    config: LishConfig,
    registry: Arc<Registry>,
    executor: Arc<Executor>,
    interpreter: Arc<Mutex<Interpreter>>,
    aliases: Arc<Aliases>,
    cancel: CancelToken,
}

impl Shell {
    pub fn new(
        config: LishConfig,
        history: Arc<History>,
        stdin: SharedReader,
        stdout: SharedWriter,
        stderr: SharedWriter,
    ) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        register_all_builtins(&registry)?;

        let executor = Arc::new(Executor::new(registry.clone(), stdin, stdout, stderr));
        let mut interpreter = Interpreter::new(executor.clone());
        for (name, value) in &config.env {
            interpreter.set_var(name.as_str(), value.as_str());
        }
        let interpreter = Arc::new(Mutex::new(interpreter));

        let aliases = Arc::new(Aliases::from_config(&config.aliases));

        // Session commands only hold weak handles so the registry never
        // keeps the interpreter alive.
        registry.register(Arc::new(SourceCommand::new(Arc::downgrade(&interpreter))))?;
        registry.register_as(".", Arc::new(SourceCommand::new(Arc::downgrade(&interpreter))))?;
        registry.register(Arc::new(HistoryCommand::new(history)))?;
        registry.register(Arc::new(AliasCommand::new(aliases.clone())))?;
        registry.register(Arc::new(UnaliasCommand::new(aliases.clone())))?;
        registry.register(Arc::new(WhichCommand::new(aliases.clone(), Arc::downgrade(&interpreter))))?;

        Ok(Self {
            config,
            registry,
            executor,
            interpreter,
            aliases,
            cancel: CancelToken::new(),
        })
    }

    pub fn config(&self) -> &LishConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn aliases(&self) -> &Arc<Aliases> {
        &self.aliases
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn get_var(&self, name: &str) -> Option<String> {
        self.interpreter().get_var(name)
    }

    pub fn last_status(&self) -> i32 {
        self.interpreter().last_exit_code()
    }

    fn interpreter(&self) -> MutexGuard<'_, Interpreter> {
        self.interpreter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one line of input. Errors of all but the last pipeline are
    /// reported on the session's stderr; the last one is returned.
    pub fn run_line(&self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        self.cancel.reset();

        let line = self.aliases.expand(line).unwrap_or_else(|| line.to_string());

        if self.is_script_line(&line) {
            debug!("handing line to the interpreter: {}", line);
            return self.interpreter().execute_source(&self.cancel, &line);
        }
        self.run_statement(&line)
    }

    /// Runs a script file in the session interpreter, as `source` does.
    pub fn source_file(&self, path: &std::path::Path) -> Result<()> {
        self.cancel.reset();
        self.interpreter().source_file(&self.cancel, path)
    }

    /// Runs a script file in an interpreter of its own, as `exec` does.
    pub fn exec_file(&self, path: &std::path::Path, args: &[String]) -> Result<i32> {
        self.cancel.reset();
        let dispatcher: Arc<dyn Dispatch> = self.executor.clone();
        let mut interpreter = Interpreter::new(dispatcher);
        match interpreter.execute_file(&self.cancel, path, args) {
            Ok(()) => Ok(interpreter.last_exit_code()),
            Err(e) => match e.downcast_ref::<ShellError>() {
                Some(ShellError::Exit(code)) => Ok(*code),
                _ => Err(e),
            },
        }
    }

    fn is_script_line(&self, line: &str) -> bool {
        let interpreter = self.interpreter();
        script::is_script_line(line, |name| interpreter.has_function(name))
    }

    /// Runs the `&&`, `||` and `;` separated pieces of a plain line,
    /// expanding each one just before it runs so `$?` is current.
    fn run_statement(&self, line: &str) -> Result<()> {
        let tokens = lexer::tokenize(line);
        let mut last: Option<Result<()>> = None;

        for (joiner, segment) in parser::split_segments(&tokens) {
            if let Some(previous) = &last {
                let operator = joiner.unwrap_or(Operator::Semicolon);
                let run = match operator {
                    Operator::And => previous.is_ok(),
                    Operator::Or => previous.is_err(),
                    Operator::Semicolon => true,
                };
                if !run {
                    debug!("skipping a pipeline after {}", operator.as_str());
                    continue;
                }
            }
            if let Some(Err(e)) = last.take() {
                self.report_error(&e);
            }

            let result = self.run_segment(&segment);
            if result.as_ref().is_err_and(ShellError::is_fatal) {
                return result;
            }
            last = Some(result);
        }
        last.unwrap_or(Ok(()))
    }

    fn run_segment(&self, tokens: &[Token]) -> Result<()> {
        let expanded = {
            let interpreter = self.interpreter();
            expand_words(&interpreter, tokens)
        };
        let result = expanded.and_then(|tokens| {
            let statement = parser::parse(&tokens);
            match statement.pipelines.first() {
                Some(pipeline) => {
                    debug!("running {}", pipeline);
                    self.executor.execute_pipeline(&self.cancel, pipeline)
                }
                None => Ok(()),
            }
        });
        self.interpreter().set_last_exit_code(if result.is_ok() { 0 } else { 1 });
        result
    }

    /// Prints `err` on the session's stderr, unless it is a quiet status.
    pub fn report_error(&self, err: &anyhow::Error) {
        self.executor.report_error(err);
    }
}

/// Expands variables in every word. An unquoted word that comes out empty
/// is dropped, except as the target of a redirection.
fn expand_words(interpreter: &Interpreter, tokens: &[Token]) -> Result<Vec<Token>> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut target = false;
    for token in tokens {
        if token.kind != TokenKind::Word {
            target = matches!(
                token.kind,
                TokenKind::RedirectOut | TokenKind::RedirectAppend | TokenKind::RedirectIn | TokenKind::RedirectErr
            );
            expanded.push(token.clone());
            continue;
        }
        let value = interpreter.expand(&token.value)?;
        if value.is_empty() && !token.quoted && !target {
            continue;
        }
        target = false;
        expanded.push(Token { value, ..token.clone() });
    }
    Ok(expanded)
}
