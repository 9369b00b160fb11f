use crate::script::ast::{
    CommandStatement, Expression, FunctionDef, LogicalOp, Program, Statement, UnaryOp,
};
use crate::script::error::ScriptError;
use crate::script::parser::Parser;
use crate::script::scope::{self, Scope};
use crate::shell::ast::{ParsedCommand, Pipeline};
use crate::shell::context::CancelToken;
use crate::shell::error::ShellError;
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const MAX_CALL_DEPTH: usize = 256;

/// How scripts reach the outside world: every command statement that is
/// not a function or `source` is handed over as a pipeline.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, cancel: &CancelToken, pipeline: &Pipeline) -> Result<()>;

    /// A dispatcher writing and reading where `stage`'s redirections point,
    /// for commands the interpreter runs itself (functions, `source`).
    fn redirected(&self, stage: &ParsedCommand) -> Result<Arc<dyn Dispatch>>;

    /// Shows an error the script survives, e.g. the left side of `||`.
    fn report(&self, err: &anyhow::Error);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Option<String>),
}

pub struct Interpreter {
    dispatcher: Arc<dyn Dispatch>,
    scope: Scope,
    functions: HashMap<String, Arc<FunctionDef>>,
    last_exit: i32,
    last_return: Option<String>,
    call_depth: usize,
}

/// Parses `text`, refusing programs with diagnostics.
pub fn parse_program(origin: &str, text: &str) -> Result<Program, ScriptError> {
    let mut parser = Parser::new(text);
    let program = parser.parse();
    if !parser.errors().is_empty() {
        return Err(ScriptError::Parse {
            origin: origin.to_string(),
            errors: parser.errors().to_vec(),
        });
    }
    Ok(program)
}

fn load(path: &Path) -> Result<Program> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    Ok(parse_program(&path.display().to_string(), &text)?)
}

fn is_source(name: &str) -> bool {
    matches!(name, "source" | ".")
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && value != "false"
}

fn compare_numbers(a: &str, b: &str, cmp: fn(i64, i64) -> bool) -> bool {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => cmp(x, y),
        _ => false,
    }
}

fn evaluate_test(operator: &str, values: &[String]) -> Result<bool> {
    let result = match (operator, values) {
        ("-f", [path]) => Path::new(path).is_file(),
        ("-d", [path]) => Path::new(path).is_dir(),
        ("-e", [path]) => Path::new(path).exists(),
        ("-z", [s]) => s.is_empty(),
        ("-n", [s]) => !s.is_empty(),
        ("=" | "==", [a, b]) => a == b,
        ("!=", [a, b]) => a != b,
        ("<", [a, b]) => a < b,
        (">", [a, b]) => a > b,
        ("<=", [a, b]) => a <= b,
        (">=", [a, b]) => a >= b,
        ("-eq", [a, b]) => compare_numbers(a, b, |x, y| x == y),
        ("-ne", [a, b]) => compare_numbers(a, b, |x, y| x != y),
        ("-lt", [a, b]) => compare_numbers(a, b, |x, y| x < y),
        ("-gt", [a, b]) => compare_numbers(a, b, |x, y| x > y),
        ("-le", [a, b]) => compare_numbers(a, b, |x, y| x <= y),
        ("-ge", [a, b]) => compare_numbers(a, b, |x, y| x >= y),
        _ => {
            return Err(ScriptError::Unsupported(format!(
                "test '{}' with {} operand(s)",
                operator,
                values.len()
            ))
            .into());
        }
    };
    Ok(result)
}

impl Interpreter {
    pub fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
        Self {
            dispatcher,
            scope: Scope::new(),
            functions: HashMap::new(),
            last_exit: 0,
            last_return: None,
            call_depth: 0,
        }
    }

    pub fn execute(&mut self, cancel: &CancelToken, program: &Program) -> Result<()> {
        for statement in &program.statements {
            self.check_cancelled(cancel)?;
            match self.execute_statement(cancel, statement)? {
                Flow::Normal => {}
                Flow::Break | Flow::Continue => warn!("break/continue outside of a loop ignored"),
                Flow::Return(value) => {
                    self.finish_return(value);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Runs a script file with its own positional parameters.
    pub fn execute_file(&mut self, cancel: &CancelToken, path: &Path, args: &[String]) -> Result<()> {
        let program = load(path)?;
        debug!("executing {} with {} argument(s)", path.display(), args.len());
        self.scope.bind_positional(&path.display().to_string(), args);
        self.execute(cancel, &program)
    }

    /// Runs a file in the current scope, leaving its variables and
    /// functions behind.
    pub fn source_file(&mut self, cancel: &CancelToken, path: &Path) -> Result<()> {
        let program = load(path)?;
        debug!("sourcing {}", path.display());
        self.execute(cancel, &program)
    }

    pub fn execute_source(&mut self, cancel: &CancelToken, text: &str) -> Result<()> {
        let program = parse_program("<input>", text)?;
        self.execute(cancel, &program)
    }

    /// Expands variable references in `text` against the current scope.
    pub fn expand(&self, text: &str) -> Result<String> {
        Ok(scope::expand(text, |name| self.lookup(name))?)
    }

    /// Script variables only; `$?` included, the environment is not consulted.
    pub fn get_var(&self, name: &str) -> Option<String> {
        if name == "?" {
            return Some(self.last_exit.to_string());
        }
        self.scope.get(name).map(str::to_string)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.scope.set(name, value);
    }

    pub fn last_exit_code(&self) -> i32 {
        self.last_exit
    }

    pub fn set_last_exit_code(&mut self, code: i32) {
        self.last_exit = code;
    }

    pub fn last_return_value(&self) -> Option<&str> {
        self.last_return.as_deref()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Swaps the dispatcher, returning the old one. `source` and `exec`
    /// use it to bind a script to the stdio of their pipeline stage.
    pub fn replace_dispatcher(&mut self, dispatcher: Arc<dyn Dispatch>) -> Arc<dyn Dispatch> {
        std::mem::replace(&mut self.dispatcher, dispatcher)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.get_var(name).or_else(|| std::env::var(name).ok())
    }

    fn check_cancelled(&self, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(ScriptError::Interrupted.into());
        }
        Ok(())
    }

    fn finish_return(&mut self, value: Option<String>) {
        if let Some(code) = value.as_deref().and_then(|v| v.trim().parse::<i32>().ok()) {
            self.last_exit = code;
        }
        self.last_return = value;
    }

    fn execute_block(&mut self, cancel: &CancelToken, block: &[Statement]) -> Result<Flow> {
        for statement in block {
            self.check_cancelled(cancel)?;
            let flow = self.execute_statement(cancel, statement)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_statement(&mut self, cancel: &CancelToken, statement: &Statement) -> Result<Flow> {
        match statement {
            Statement::Command(cmd) => self.run_commands(cancel, std::slice::from_ref(cmd)),
            Statement::Pipeline(stages) => self.run_commands(cancel, stages),
            Statement::Assign { name, value } => {
                let value = self.evaluate_value(value)?;
                self.scope.set(name.as_str(), value);
                self.last_exit = 0;
                Ok(Flow::Normal)
            }
            Statement::AndOr { first, rest } => self.execute_and_or(cancel, first, rest),
            Statement::If {
                condition,
                then_block,
                elifs,
                else_block,
            } => {
                if self.evaluate_condition(condition)? {
                    return self.execute_block(cancel, then_block);
                }
                for (condition, block) in elifs {
                    if self.evaluate_condition(condition)? {
                        return self.execute_block(cancel, block);
                    }
                }
                match else_block {
                    Some(block) => self.execute_block(cancel, block),
                    None => Ok(Flow::Normal),
                }
            }
            Statement::For {
                variable,
                items,
                block,
            } => {
                let mut values = Vec::new();
                for item in items {
                    let value = self.evaluate_value(item)?;
                    match item {
                        // an unquoted `$list` splits into words
                        Expression::Variable(_) => {
                            values.extend(value.split_whitespace().map(String::from))
                        }
                        _ => values.push(value),
                    }
                }
                for value in values {
                    self.check_cancelled(cancel)?;
                    self.scope.set(variable.as_str(), value);
                    match self.execute_block(cancel, block)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::While { condition, block } => {
                loop {
                    self.check_cancelled(cancel)?;
                    if !self.evaluate_condition(condition)? {
                        break;
                    }
                    match self.execute_block(cancel, block)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Statement::Function(def) => {
                debug!("defined function {}", def.name);
                self.functions.insert(def.name.clone(), Arc::clone(def));
                Ok(Flow::Normal)
            }
            Statement::Return(value) => {
                let value = value
                    .as_ref()
                    .map(|v| self.evaluate_value(v))
                    .transpose()?;
                Ok(Flow::Return(value))
            }
            Statement::Break => Ok(Flow::Break),
            Statement::Continue => Ok(Flow::Continue),
        }
    }

    /// Each operator looks at how the statement before it went. A failure
    /// some operator consumes is reported and only recorded in `$?`; a
    /// failure of the last statement that ran is returned as usual.
    fn execute_and_or(
        &mut self,
        cancel: &CancelToken,
        first: &Statement,
        rest: &[(LogicalOp, Statement)],
    ) -> Result<Flow> {
        let mut outcome = self.execute_statement(cancel, first);
        for (operator, statement) in rest {
            let succeeded = match outcome {
                Ok(Flow::Normal) => self.last_exit == 0,
                Ok(flow) => return Ok(flow),
                Err(e) if ShellError::is_fatal(&e) => return Err(e),
                Err(e) => {
                    self.dispatcher.report(&e);
                    false
                }
            };
            let run = match operator {
                LogicalOp::And => succeeded,
                LogicalOp::Or => !succeeded,
            };
            outcome = if run {
                self.check_cancelled(cancel)?;
                self.execute_statement(cancel, statement)
            } else {
                debug!("skipping {:?} operand, status {}", operator, self.last_exit);
                Ok(Flow::Normal)
            };
        }
        outcome
    }

    fn expand_command(&self, stage: &CommandStatement) -> Result<ParsedCommand> {
        let mut args = Vec::with_capacity(stage.args.len());
        for arg in &stage.args {
            let value = self.evaluate_value(arg)?;
            if value.is_empty() && matches!(arg, Expression::Variable(_)) {
                continue;
            }
            args.push(value);
        }
        let mut cmd = ParsedCommand::new(self.expand(&stage.command)?, args);
        cmd.redirect_in = stage.redirect_in.as_deref().map(|p| self.expand(p)).transpose()?;
        cmd.redirect_out = stage.redirect_out.as_deref().map(|p| self.expand(p)).transpose()?;
        cmd.redirect_err = stage.redirect_err.as_deref().map(|p| self.expand(p)).transpose()?;
        cmd.append = stage.append;
        Ok(cmd)
    }

    fn run_commands(&mut self, cancel: &CancelToken, stages: &[CommandStatement]) -> Result<Flow> {
        let commands = match stages
            .iter()
            .map(|stage| self.expand_command(stage))
            .collect::<Result<Vec<_>>>()
        {
            Ok(commands) => commands,
            Err(e) => {
                self.last_exit = 1;
                return Err(e);
            }
        };

        let result = match commands.as_slice() {
            [single] if self.functions.contains_key(&single.command) || is_source(&single.command) => {
                self.with_redirects(single, |interp| interp.run_in_session(cancel, single))
            }
            _ => match commands.iter().find(|c| self.functions.contains_key(&c.command)) {
                Some(cmd) => {
                    Err(ScriptError::Unsupported(format!("function {} inside a pipeline", cmd.command)).into())
                }
                None => {
                    let pipeline = Pipeline { commands };
                    debug!("dispatching {}", pipeline);
                    let result = self.dispatcher.dispatch(cancel, &pipeline);
                    if result.is_ok() {
                        self.last_exit = 0;
                    }
                    result.map(|()| Flow::Normal)
                }
            },
        };
        if result.is_err() {
            self.last_exit = 1;
        }
        result
    }

    /// A function call or `source`, run by this interpreter.
    fn run_in_session(&mut self, cancel: &CancelToken, cmd: &ParsedCommand) -> Result<Flow> {
        if let Some(function) = self.functions.get(&cmd.command).cloned() {
            return self.call_function(cancel, &function, &cmd.args);
        }
        let Some(path) = cmd.args.first() else {
            bail!("{}: missing file operand", cmd.command);
        };
        self.source_file(cancel, Path::new(path))?;
        Ok(Flow::Normal)
    }

    /// Runs `run` with the dispatcher pointed at `stage`'s redirections.
    fn with_redirects(
        &mut self,
        stage: &ParsedCommand,
        run: impl FnOnce(&mut Self) -> Result<Flow>,
    ) -> Result<Flow> {
        if !stage.has_redirects() {
            return run(self);
        }
        let redirected = self.dispatcher.redirected(stage)?;
        let previous = self.replace_dispatcher(redirected);
        let result = run(self);
        self.dispatcher = previous;
        result
    }

    fn call_function(&mut self, cancel: &CancelToken, function: &FunctionDef, args: &[String]) -> Result<Flow> {
        if self.call_depth >= MAX_CALL_DEPTH {
            self.last_exit = 1;
            return Err(ScriptError::TooDeep(MAX_CALL_DEPTH).into());
        }
        debug!("calling {} with {} argument(s)", function.name, args.len());

        self.call_depth += 1;
        self.scope.push();
        self.scope.bind_positional(&function.name, args);
        let result = self.execute_block(cancel, &function.block);
        self.scope.pop();
        self.call_depth -= 1;

        match result? {
            Flow::Return(value) => self.finish_return(value),
            Flow::Break | Flow::Continue => {
                warn!("break/continue outside of a loop in {} ignored", function.name);
                self.last_return = None;
            }
            Flow::Normal => self.last_return = None,
        }
        Ok(Flow::Normal)
    }

    fn evaluate_value(&self, expr: &Expression) -> Result<String> {
        match expr {
            Expression::StringLiteral(text) => self.expand(text),
            Expression::Variable(name) => Ok(self.lookup(name).unwrap_or_default()),
            Expression::CommandSubstitution { .. } => {
                Err(ScriptError::Unsupported("command substitution".to_string()).into())
            }
            Expression::Binary { .. } | Expression::Unary { .. } | Expression::Test { .. } => {
                Ok(self.evaluate_condition(expr)?.to_string())
            }
        }
    }

    fn evaluate_condition(&self, expr: &Expression) -> Result<bool> {
        match expr {
            Expression::Binary {
                left,
                operator: LogicalOp::And,
                right,
            } => Ok(self.evaluate_condition(left)? && self.evaluate_condition(right)?),
            Expression::Binary {
                left,
                operator: LogicalOp::Or,
                right,
            } => Ok(self.evaluate_condition(left)? || self.evaluate_condition(right)?),
            Expression::Unary {
                operator: UnaryOp::Not,
                operand,
            } => Ok(!self.evaluate_condition(operand)?),
            Expression::Test { operator, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate_value(arg))
                    .collect::<Result<Vec<_>>>()?;
                evaluate_test(operator, &values)
            }
            other => Ok(is_truthy(&self.evaluate_value(other)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy("yes"));
        assert!(is_truthy("1"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
    }

    #[test]
    fn test_numeric_tests_reject_non_numbers() {
        let v = |a: &str, b: &str| vec![a.to_string(), b.to_string()];
        assert!(evaluate_test("-eq", &v("3", " 3")).unwrap());
        assert!(evaluate_test("-lt", &v("-2", "10")).unwrap());
        assert!(!evaluate_test("-eq", &v("abc", "abc")).unwrap());
        assert!(!evaluate_test("-ne", &v("1", "x")).unwrap());
    }

    #[test]
    fn test_unknown_test_operator_is_an_error() {
        let err = evaluate_test("-x", &["a".to_string()]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::Unsupported(_))
        ));
    }
}
