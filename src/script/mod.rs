pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;

pub use error::ScriptError;
pub use interpreter::{Dispatch, Flow, Interpreter, parse_program};

#[cfg(test)]
mod tests;

/// True when `line` has to go through the script interpreter rather than
/// straight to the pipeline executor. Every command position counts (the
/// start and whatever follows `;`, `&&`, `||`, `|` or a newline): a
/// keyword, an assignment, a function definition or a call to a function
/// `is_function` knows sends the whole line.
pub fn is_script_line(line: &str, is_function: impl Fn(&str) -> bool) -> bool {
    use token::TokenKind;

    let mut lexer = lexer::Lexer::new(line);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Comment => {}
            _ => tokens.push(token),
        }
    }

    let mut at_command = true;
    for (i, token) in tokens.iter().enumerate() {
        if matches!(
            token.kind,
            TokenKind::Semicolon | TokenKind::And | TokenKind::Or | TokenKind::Pipe | TokenKind::Newline
        ) {
            at_command = true;
            continue;
        }
        if !std::mem::replace(&mut at_command, false) {
            continue;
        }
        if token.kind.is_keyword() {
            return true;
        }
        if !matches!(token.kind, TokenKind::Ident | TokenKind::Word) || token.literal.starts_with('$') {
            continue;
        }
        let kind_at = |offset: usize| tokens.get(i + offset).map(|t| t.kind);
        if token.kind == TokenKind::Ident {
            let assigns = tokens
                .get(i + 1)
                .is_some_and(|next| next.kind == TokenKind::Assign && next.joined);
            let defines = kind_at(1) == Some(TokenKind::LParen) && kind_at(2) == Some(TokenKind::RParen);
            if assigns || defines {
                return true;
            }
        }
        if is_function(&token.literal) {
            return true;
        }
    }
    false
}
