use crate::script::ast::{
    Block, CommandStatement, Expression, FunctionDef, LogicalOp, Program, Statement, UnaryOp,
};
use crate::script::lexer::Lexer;
use crate::script::token::{Token, TokenKind};
use std::sync::Arc;

const BINARY_TESTS: &[&str] = &[
    "=", "==", "!=", "<", ">", "<=", ">=", "-eq", "-ne", "-lt", "-gt", "-le", "-ge",
];

/// Operator tokens that read as plain text when they show up among a
/// command's arguments (`echo a = b`, `ls file[1]`).
fn is_text_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Assign
            | TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::Le
            | TokenKind::Ge
            | TokenKind::Not
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::LBrace
    )
}

/// A word assembled from one or more adjacent tokens.
struct Word {
    text: String,
    /// The single token it came from, when it was not glued.
    single: Option<Token>,
}

impl Word {
    fn into_expression(self) -> Expression {
        match self.single {
            Some(token) if token.kind == TokenKind::CommandSubst => {
                let mut words = shell_words::split(&token.literal)
                    .unwrap_or_else(|_| token.literal.split_whitespace().map(String::from).collect())
                    .into_iter();
                let command = words.next().unwrap_or_default();
                Expression::CommandSubstitution {
                    command,
                    args: words.collect(),
                }
            }
            Some(token) if token.kind == TokenKind::Ident && token.literal.starts_with('$') => {
                let name = token.literal[1..].trim_start_matches('{').trim_end_matches('}');
                Expression::Variable(name.to_string())
            }
            _ => Expression::StringLiteral(self.text),
        }
    }
}

fn token_text(token: &Token) -> String {
    match token.kind {
        TokenKind::CommandSubst => format!("$({})", token.literal),
        _ => token.literal.clone(),
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let eof = token.kind == TokenKind::Eof;
            if token.kind != TokenKind::Comment {
                tokens.push(token);
            }
            if eof {
                break;
            }
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Diagnostics collected by `parse`, formatted `line L:C: message`.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Always returns a program; whatever could not be parsed is reported
    /// through `errors` and left out.
    pub fn parse(&mut self) -> Program {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.at(TokenKind::Eof) {
                break;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }
        Program { statements }
    }

    // ---- token helpers ----

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(&mut self, token: &Token, message: impl AsRef<str>) {
        self.errors
            .push(format!("line {}:{}: {}", token.line, token.column, message.as_ref()));
    }

    fn error(&mut self, message: impl AsRef<str>) {
        let token = self.current().clone();
        self.error_at(&token, message);
    }

    fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Ident | TokenKind::Word | TokenKind::Number | TokenKind::String => {
                format!("{} '{}'", token.kind, token.literal)
            }
            TokenKind::Illegal => format!("illegal character '{}'", token.literal.escape_default()),
            kind => kind.to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        let found = Self::describe(self.current());
        self.error(format!("expected {}, found {}", kind, found));
        false
    }

    fn skip_separators(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// After a statement only a separator, the end of input or a block
    /// terminator may follow. Anything else is reported and skipped up to
    /// the next separator.
    fn finish_statement(&mut self) {
        let token = self.current().clone();
        if matches!(
            token.kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        ) || token.kind.ends_block()
        {
            return;
        }
        self.error_at(&token, format!("unexpected {}", Self::describe(&token)));
        while !matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    // ---- words ----

    /// Reads one word: a word-like token plus every token glued to it
    /// without whitespace. Inside `[ ]` brackets are never glued.
    fn read_word(&mut self, in_test: bool) -> Option<Word> {
        let first = self.current().clone();
        let starts = first.is_wordlike() || (!in_test && is_text_operator(first.kind));
        if !starts {
            return None;
        }
        self.advance();

        let mut text = token_text(&first);
        let mut glued = false;
        loop {
            let next = self.current();
            let gluable = next.joined
                && (next.is_wordlike()
                    || (is_text_operator(next.kind)
                        && !(in_test
                            && matches!(next.kind, TokenKind::LBracket | TokenKind::RBracket))));
            if !gluable {
                break;
            }
            text.push_str(&token_text(next));
            glued = true;
            self.advance();
        }

        Some(Word {
            text,
            single: (!glued).then_some(first),
        })
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Option<Statement> {
        let token = self.current().clone();
        let statement = match token.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Function => self.parse_function(),
            TokenKind::Ident
                if self.peek(1).kind == TokenKind::LParen
                    && self.peek(2).kind == TokenKind::RParen
                    && !token.literal.starts_with('$') =>
            {
                self.advance();
                self.advance();
                self.advance();
                self.parse_function_body(token.literal)
            }
            kind if kind.ends_block() => {
                self.error(format!("unexpected {}", kind));
                self.advance();
                return None;
            }
            TokenKind::Illegal => {
                self.error(Self::describe(&token));
                self.advance();
                return None;
            }
            _ => self.parse_and_or(),
        };
        self.finish_statement();
        statement
    }

    /// `a && b || c`: simple statements chained left to right.
    fn parse_and_or(&mut self) -> Option<Statement> {
        let first = self.parse_simple()?;
        let mut rest = Vec::new();
        loop {
            let operator = match self.current().kind {
                TokenKind::And => LogicalOp::And,
                TokenKind::Or => LogicalOp::Or,
                _ => break,
            };
            let token = self.advance();
            self.skip_newlines();
            match self.parse_simple() {
                Some(statement) => rest.push((operator, statement)),
                None => {
                    self.error(format!("expected a command after {}", token.kind));
                    break;
                }
            }
        }
        if rest.is_empty() {
            return Some(first);
        }
        Some(Statement::AndOr {
            first: Box::new(first),
            rest,
        })
    }

    fn parse_simple(&mut self) -> Option<Statement> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Return => {
                self.advance();
                let value = self.read_word(false).map(Word::into_expression);
                Some(Statement::Return(value))
            }
            TokenKind::Break => {
                self.advance();
                Some(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance();
                Some(Statement::Continue)
            }
            TokenKind::Local => self.parse_local(),
            TokenKind::Ident
                if self.peek(1).kind == TokenKind::Assign
                    && self.peek(1).joined
                    && !token.literal.starts_with('$') =>
            {
                self.parse_assign()
            }
            _ => self.parse_pipeline(),
        }
    }

    fn parse_assign(&mut self) -> Option<Statement> {
        let name = self.advance().literal;
        self.advance(); // '='
        let value = if self.current().joined {
            self.read_word(false).map(Word::into_expression)
        } else {
            None
        };
        Some(Statement::Assign {
            name,
            value: value.unwrap_or_else(|| Expression::literal("")),
        })
    }

    fn parse_local(&mut self) -> Option<Statement> {
        self.advance();
        let token = self.current().clone();
        if token.kind != TokenKind::Ident || token.literal.starts_with('$') {
            self.error(format!("expected variable name after 'local', found {}", Self::describe(&token)));
            return None;
        }
        if self.peek(1).kind == TokenKind::Assign && self.peek(1).joined {
            return self.parse_assign();
        }
        self.advance();
        Some(Statement::Assign {
            name: token.literal,
            value: Expression::literal(""),
        })
    }

    fn parse_pipeline(&mut self) -> Option<Statement> {
        let first = self.parse_command()?;
        let mut stages = vec![first];
        while self.at(TokenKind::Pipe) {
            self.advance();
            self.skip_newlines();
            match self.parse_command() {
                Some(stage) => stages.push(stage),
                None => {
                    self.error("expected a command after '|'");
                    break;
                }
            }
        }
        if stages.len() == 1 {
            stages.pop().map(Statement::Command)
        } else {
            Some(Statement::Pipeline(stages))
        }
    }

    fn parse_command(&mut self) -> Option<CommandStatement> {
        let mut words: Vec<Word> = Vec::new();
        let mut cmd = CommandStatement::default();

        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Eof
                | TokenKind::Pipe
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Illegal
                | TokenKind::LParen
                | TokenKind::RParen => break,
                kind if kind.ends_block() => break,
                TokenKind::Gt | TokenKind::Append | TokenKind::Lt => {
                    self.advance();
                    let Some(target) = self.read_word(false) else {
                        self.error(format!("expected a file name after {}", token.kind));
                        break;
                    };
                    match token.kind {
                        TokenKind::Lt => cmd.redirect_in = Some(target.text),
                        kind => {
                            cmd.redirect_out = Some(target.text);
                            cmd.append = kind == TokenKind::Append;
                        }
                    }
                }
                TokenKind::Number
                    if token.literal == "2"
                        && self.peek(1).joined
                        && matches!(self.peek(1).kind, TokenKind::Gt | TokenKind::Append) =>
                {
                    self.advance();
                    let op = self.advance();
                    if op.kind == TokenKind::Append {
                        self.error_at(&op, "appending error output is not supported, use 2>");
                    }
                    match self.read_word(false) {
                        Some(target) => cmd.redirect_err = Some(target.text),
                        None => {
                            self.error("expected a file name after 2>");
                            break;
                        }
                    }
                }
                _ => match self.read_word(false) {
                    Some(word) => words.push(word),
                    None => break,
                },
            }
        }

        let mut words = words.into_iter();
        let Some(command) = words.next() else {
            if cmd.redirect_in.is_some() || cmd.redirect_out.is_some() || cmd.redirect_err.is_some() {
                self.error("redirection without a command");
            }
            return None;
        };
        cmd.command = command.text;
        cmd.args = words.map(Word::into_expression).collect();
        Some(cmd)
    }

    fn parse_block(&mut self, terminators: &[TokenKind]) -> Block {
        let mut block = Vec::new();
        loop {
            self.skip_separators();
            let kind = self.current().kind;
            if terminators.contains(&kind) {
                break;
            }
            if kind == TokenKind::Eof {
                let expected: Vec<String> = terminators.iter().map(|k| k.to_string()).collect();
                self.error(format!("expected {}, found end of input", expected.join(" or ")));
                break;
            }
            if let Some(statement) = self.parse_statement() {
                block.push(statement);
            }
        }
        block
    }

    fn parse_if(&mut self) -> Option<Statement> {
        self.advance();
        let condition = self.parse_condition();
        self.skip_separators();
        self.expect(TokenKind::Then);
        let then_block = self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::Fi]);

        let mut elifs = Vec::new();
        while self.at(TokenKind::Elif) {
            self.advance();
            let condition = self.parse_condition();
            self.skip_separators();
            self.expect(TokenKind::Then);
            let block = self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::Fi]);
            elifs.push((condition, block));
        }

        let else_block = if self.at(TokenKind::Else) {
            self.advance();
            Some(self.parse_block(&[TokenKind::Fi]))
        } else {
            None
        };
        self.expect(TokenKind::Fi);

        Some(Statement::If {
            condition,
            then_block,
            elifs,
            else_block,
        })
    }

    fn parse_for(&mut self) -> Option<Statement> {
        self.advance();
        let token = self.current().clone();
        if token.kind != TokenKind::Ident || token.literal.starts_with('$') {
            self.error(format!("expected loop variable, found {}", Self::describe(&token)));
            return None;
        }
        self.advance();
        let variable = token.literal;

        self.expect(TokenKind::In);
        let mut items = Vec::new();
        while !self.at(TokenKind::Do) {
            match self.read_word(false) {
                Some(word) => items.push(word.into_expression()),
                None => break,
            }
        }
        self.skip_separators();
        self.expect(TokenKind::Do);
        let block = self.parse_block(&[TokenKind::Done]);
        self.expect(TokenKind::Done);

        Some(Statement::For {
            variable,
            items,
            block,
        })
    }

    fn parse_while(&mut self) -> Option<Statement> {
        self.advance();
        let condition = self.parse_condition();
        self.skip_separators();
        self.expect(TokenKind::Do);
        let block = self.parse_block(&[TokenKind::Done]);
        self.expect(TokenKind::Done);
        Some(Statement::While { condition, block })
    }

    fn parse_function(&mut self) -> Option<Statement> {
        self.advance();
        let token = self.current().clone();
        if token.kind != TokenKind::Ident || token.literal.starts_with('$') {
            self.error(format!("expected function name, found {}", Self::describe(&token)));
            return None;
        }
        self.advance();
        if self.at(TokenKind::LParen) {
            self.advance();
            self.expect(TokenKind::RParen);
        }
        self.parse_function_body(token.literal)
    }

    fn parse_function_body(&mut self, name: String) -> Option<Statement> {
        self.skip_newlines();
        if !self.expect(TokenKind::LBrace) {
            return None;
        }
        let block = self.parse_block(&[TokenKind::RBrace]);
        self.expect(TokenKind::RBrace);
        Some(Statement::Function(Arc::new(FunctionDef { name, block })))
    }

    // ---- conditions ----

    fn parse_condition(&mut self) -> Expression {
        let mut left = self.parse_and();
        while self.at(TokenKind::Or) {
            self.advance();
            self.skip_newlines();
            let right = self.parse_and();
            left = Expression::Binary {
                left: Box::new(left),
                operator: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_and(&mut self) -> Expression {
        let mut left = self.parse_unary();
        while self.at(TokenKind::And) {
            self.advance();
            self.skip_newlines();
            let right = self.parse_unary();
            left = Expression::Binary {
                left: Box::new(left),
                operator: LogicalOp::And,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expression {
        if self.at(TokenKind::Not) {
            self.advance();
            return Expression::Unary {
                operator: UnaryOp::Not,
                operand: Box::new(self.parse_unary()),
            };
        }
        if self.at(TokenKind::LBracket) {
            return self.parse_test();
        }
        match self.read_word(true) {
            Some(word) => word.into_expression(),
            None => {
                let found = Self::describe(self.current());
                self.error(format!("expected a condition, found {}", found));
                Expression::literal("")
            }
        }
    }

    fn parse_test(&mut self) -> Expression {
        self.advance(); // '['
        let mut items: Vec<(String, Expression)> = Vec::new();
        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => {
                    self.error(format!("expected ']', found {}", Self::describe(&token)));
                    break;
                }
                TokenKind::Assign
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Ge
                | TokenKind::Not => {
                    self.advance();
                    items.push((token.literal.clone(), Expression::literal(token.literal)));
                }
                _ => match self.read_word(true) {
                    Some(word) => {
                        let text = word.text.clone();
                        items.push((text, word.into_expression()));
                    }
                    None => {
                        self.error(format!("unexpected {} in test", Self::describe(&token)));
                        self.advance();
                    }
                },
            }
        }
        classify_test(items)
    }
}

/// Turns the words between `[` and `]` into a test expression. The
/// operator goes first for unary tests and in the middle for binary ones.
fn classify_test(mut items: Vec<(String, Expression)>) -> Expression {
    if items.len() > 1 && items[0].0 == "!" {
        items.remove(0);
        return Expression::Unary {
            operator: UnaryOp::Not,
            operand: Box::new(classify_test(items)),
        };
    }
    match items.len() {
        0 => Expression::literal(""),
        1 => items.remove(0).1,
        3 if BINARY_TESTS.contains(&items[1].0.as_str()) => {
            let right = items.remove(2).1;
            let (operator, _) = items.remove(1);
            let left = items.remove(0).1;
            Expression::Test {
                operator,
                args: vec![left, right],
            }
        }
        _ => {
            let (operator, _) = items.remove(0);
            Expression::Test {
                operator,
                args: items.into_iter().map(|(_, expr)| expr).collect(),
            }
        }
    }
}
