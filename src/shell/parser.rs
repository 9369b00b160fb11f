use crate::shell::ast::{Operator, ParsedCommand, Pipeline, Statement};
use crate::shell::lexer::tokenize;
use crate::shell::token::{Token, TokenKind};

/// Build a `Statement` from a token stream in a single pass.
///
/// Malformed structure is dropped rather than reported: a redirection with
/// no operand disappears, consecutive operators never produce empty
/// pipelines.
pub fn parse(tokens: &[Token]) -> Statement {
    let mut statement = Statement::default();
    let mut pipeline = Pipeline::default();
    let mut cmd = ParsedCommand::default();

    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        match token.kind {
            TokenKind::Word => {
                if cmd.command.is_empty() {
                    cmd.command = token.value.clone();
                } else {
                    cmd.args.push(token.value.clone());
                }
            }
            TokenKind::RedirectOut
            | TokenKind::RedirectAppend
            | TokenKind::RedirectIn
            | TokenKind::RedirectErr => {
                let Some(target) = iter.next_if(|t| t.kind == TokenKind::Word) else {
                    continue;
                };
                let target = target.value.clone();
                match token.kind {
                    TokenKind::RedirectIn => cmd.redirect_in = Some(target),
                    TokenKind::RedirectErr => cmd.redirect_err = Some(target),
                    _ => {
                        cmd.redirect_out = Some(target);
                        cmd.append = token.kind == TokenKind::RedirectAppend;
                    }
                }
            }
            TokenKind::Pipe => {
                close_command(&mut cmd, &mut pipeline);
            }
            TokenKind::And | TokenKind::Or | TokenKind::Semicolon => {
                close_command(&mut cmd, &mut pipeline);
                if !pipeline.commands.is_empty() {
                    statement.pipelines.push(std::mem::take(&mut pipeline));
                    statement.operators.push(match token.kind {
                        TokenKind::And => Operator::And,
                        TokenKind::Or => Operator::Or,
                        _ => Operator::Semicolon,
                    });
                }
            }
            TokenKind::Eof => break,
        }
    }

    close_command(&mut cmd, &mut pipeline);
    if !pipeline.commands.is_empty() {
        statement.pipelines.push(pipeline);
    }

    statement
}

// A stage that only carried redirections has no command and is discarded.
fn close_command(cmd: &mut ParsedCommand, pipeline: &mut Pipeline) {
    let done = std::mem::take(cmd);
    if !done.is_empty() {
        pipeline.commands.push(done);
    }
}

/// Cuts a token stream at `&&`, `||` and `;`. Each segment carries the
/// operator joining it to the previous one (`None` for the first). Empty
/// segments vanish the same way `parse` drops empty pipelines, so
/// `a && && b` still joins `a` and `b` with `&&`.
pub fn split_segments(tokens: &[Token]) -> Vec<(Option<Operator>, Vec<Token>)> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut joiner = None;

    for token in tokens {
        let operator = match token.kind {
            TokenKind::And => Operator::And,
            TokenKind::Or => Operator::Or,
            TokenKind::Semicolon => Operator::Semicolon,
            TokenKind::Eof => break,
            _ => {
                current.push(token.clone());
                continue;
            }
        };
        if !current.is_empty() {
            segments.push((joiner, std::mem::take(&mut current)));
            joiner = Some(operator);
        }
    }
    if !current.is_empty() {
        segments.push((joiner, current));
    }
    segments
}

pub fn parse_line(line: &str) -> Statement {
    parse(&tokenize(line))
}

/// Degenerate single-command entry point: whitespace split that honors
/// quotes and backslash escapes, no operators. Blank input yields `None`.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut words = split_words(input).into_iter();
    let command = words.next()?;
    Some(ParsedCommand::new(command, words.collect()))
}

fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                current.push(next);
            }
            continue;
        }

        if c == '"' || c == '\'' {
            match in_quote {
                None => in_quote = Some(c),
                Some(q) if q == c => in_quote = None,
                Some(_) => current.push(c),
            }
            continue;
        }

        if in_quote.is_none() && c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
