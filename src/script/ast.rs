use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

pub type Block = Vec<Statement>;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Command(CommandStatement),
    /// Two or more commands joined by `|`.
    Pipeline(Vec<CommandStatement>),
    /// `name=value` and `local name=value`; both write the innermost frame.
    Assign {
        name: String,
        value: Expression,
    },
    /// Simple statements joined by `&&` and `||`, evaluated left to right.
    AndOr {
        first: Box<Statement>,
        rest: Vec<(LogicalOp, Statement)>,
    },
    If {
        condition: Expression,
        then_block: Block,
        elifs: Vec<(Expression, Block)>,
        else_block: Option<Block>,
    },
    For {
        variable: String,
        items: Vec<Expression>,
        block: Block,
    },
    While {
        condition: Expression,
        block: Block,
    },
    Function(Arc<FunctionDef>),
    Return(Option<Expression>),
    Break,
    Continue,
}

/// Words are kept unexpanded; variables are resolved each time the
/// statement runs. An argument that is a bare `$name` disappears when the
/// variable is empty, a quoted one stays as an empty word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandStatement {
    pub command: String,
    pub args: Vec<Expression>,
    pub redirect_in: Option<String>,
    pub redirect_out: Option<String>,
    pub redirect_err: Option<String>,
    pub append: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Raw text, expanded on evaluation.
    StringLiteral(String),
    /// A bare `$name` / `${name}` reference, name without the sigil.
    Variable(String),
    Binary {
        left: Box<Expression>,
        operator: LogicalOp,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expression>,
    },
    /// `[ op arg ]` or `[ a op b ]`, args in source order.
    Test {
        operator: String,
        args: Vec<Expression>,
    },
    CommandSubstitution {
        command: String,
        args: Vec<String>,
    },
}

impl Expression {
    pub fn literal(text: impl Into<String>) -> Self {
        Expression::StringLiteral(text.into())
    }
}
