use std::fmt;

/// One pipeline stage: `grep foo < in.txt > out.txt 2> err.txt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: String,
    pub args: Vec<String>,
    pub redirect_in: Option<String>,
    pub redirect_out: Option<String>,
    pub redirect_err: Option<String>,
    pub append: bool, // `>>` instead of `>`
}

impl ParsedCommand {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    pub fn has_redirects(&self) -> bool {
        self.redirect_in.is_some() || self.redirect_out.is_some() || self.redirect_err.is_some()
    }
}

impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.command.as_str()).chain(self.args.iter().map(String::as_str));
        write!(f, "{}", shell_words::join(words))?;
        if let Some(input) = &self.redirect_in {
            write!(f, " < {}", shell_words::quote(input))?;
        }
        if let Some(output) = &self.redirect_out {
            let op = if self.append { ">>" } else { ">" };
            write!(f, " {} {}", op, shell_words::quote(output))?;
        }
        if let Some(err) = &self.redirect_err {
            write!(f, " 2> {}", shell_words::quote(err))?;
        }
        Ok(())
    }
}

/// Stage `i` feeds stage `i + 1` unless a redirection says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<ParsedCommand>,
}

impl Pipeline {
    pub fn single(command: ParsedCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", cmd)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,       // &&
    Or,        // ||
    Semicolon, // ;
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Semicolon => ";",
        }
    }
}

/// Pipelines chained by operators. `operators[i]` sits between
/// `pipelines[i]` and `pipelines[i + 1]`; the parser only records the
/// structure, the session decides what short-circuits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pub pipelines: Vec<Pipeline>,
    pub operators: Vec<Operator>,
}

impl Statement {
    /// The last operator seen on the line, if any.
    pub fn operator(&self) -> Option<Operator> {
        self.operators.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
