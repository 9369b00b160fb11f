use crate::script::token::{Token, TokenKind};

/// Characters that always end a bare word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | '|' | '&' | '<' | '>' | '(' | ')' | '{' | '}' | '[' | ']' | '"' | '\'')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

/// `name`, `$name`, `${name}`, `$1`, `$#`, `$?`, `$@`
fn is_ident(s: &str) -> bool {
    match s.strip_prefix('$') {
        None => is_plain_ident(s),
        Some(rest) => {
            if let Some(inner) = rest.strip_prefix('{') {
                return inner.ends_with('}') && inner.len() > 1;
            }
            is_plain_ident(rest)
                || (rest.chars().count() == 1 && rest.chars().all(|c| c.is_ascii_digit() || "#?@*".contains(c)))
        }
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    at_start: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            at_start: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips blanks and backslash-newline continuations, reporting whether
    /// anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                    skipped = true;
                }
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                    skipped = true;
                }
                _ => return skipped,
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        let skipped = self.skip_whitespace();
        let joined = !skipped && !self.at_start;
        self.at_start = false;

        let line = self.line;
        let column = self.column;
        let make = |kind: TokenKind, literal: String| Token {
            kind,
            literal,
            line,
            column,
            joined,
        };

        let Some(c) = self.peek() else {
            return make(TokenKind::Eof, String::new());
        };

        // two-char operators first
        let pair = |second: char| self.peek_at(1) == Some(second);
        let two = match c {
            '=' if pair('=') => Some((TokenKind::Eq, "==")),
            '!' if pair('=') => Some((TokenKind::Ne, "!=")),
            '<' if pair('=') => Some((TokenKind::Le, "<=")),
            '>' if pair('=') => Some((TokenKind::Ge, ">=")),
            '>' if pair('>') => Some((TokenKind::Append, ">>")),
            '&' if pair('&') => Some((TokenKind::And, "&&")),
            '|' if pair('|') => Some((TokenKind::Or, "||")),
            _ => None,
        };
        if let Some((kind, text)) = two {
            self.advance();
            self.advance();
            return make(kind, text.to_string());
        }

        let single = match c {
            '\n' => Some(TokenKind::Newline),
            '=' => Some(TokenKind::Assign),
            '!' => Some(TokenKind::Not),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '|' => Some(TokenKind::Pipe),
            ';' => Some(TokenKind::Semicolon),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            // a single '&' would mean background execution, which does not exist here
            '&' => Some(TokenKind::Illegal),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return make(kind, c.to_string());
        }

        match c {
            '#' => make(TokenKind::Comment, self.read_comment()),
            '"' | '\'' => {
                self.advance();
                make(TokenKind::String, self.read_string(c))
            }
            '$' if self.peek_at(1) == Some('(') => {
                self.advance();
                self.advance();
                make(TokenKind::CommandSubst, self.read_substitution())
            }
            c if c.is_control() => {
                self.advance();
                make(TokenKind::Illegal, c.to_string())
            }
            _ => {
                let word = self.read_word();
                let kind = if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
                    TokenKind::Number
                } else if is_ident(&word) {
                    if is_plain_ident(&word) {
                        TokenKind::keyword(&word).unwrap_or(TokenKind::Ident)
                    } else {
                        TokenKind::Ident
                    }
                } else {
                    TokenKind::Word
                };
                make(kind, word)
            }
        }
    }

    fn read_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        text
    }

    /// Escapes `\n \t \r \\` and the quote are resolved; `\$` stays escaped
    /// so expansion leaves it alone. In single quotes every `$` is escaped.
    fn read_string(&mut self, quote: char) -> String {
        let mut text = String::new();
        while let Some(c) = self.advance() {
            if c == quote {
                return text;
            }
            match c {
                '\\' => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('$') => text.push_str("\\$"),
                    Some(other) => text.push(other),
                    None => break,
                },
                '$' if quote == '\'' => text.push_str("\\$"),
                _ => text.push(c),
            }
        }
        text
    }

    // Balanced parentheses; an unterminated substitution runs to the end.
    fn read_substitution(&mut self) -> String {
        let mut depth = 1usize;
        let mut text = String::new();
        while let Some(c) = self.advance() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            text.push(c);
        }
        text
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_delimiter(c) || c.is_control() {
                break;
            }
            match c {
                // `name=` splits into an assignment; `--opt=value` stays whole
                '=' if is_plain_ident(&word) => break,
                '$' if self.peek_at(1) == Some('(') => break,
                '$' if self.peek_at(1) == Some('{') => {
                    while let Some(c) = self.advance() {
                        word.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                }
                '\\' => {
                    self.advance();
                    match self.peek() {
                        Some('\n') | None => break,
                        Some('$') => {
                            self.advance();
                            word.push_str("\\$");
                        }
                        Some(next) => {
                            self.advance();
                            word.push(next);
                        }
                    }
                }
                _ => {
                    self.advance();
                    word.push(c);
                }
            }
        }
        word
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    fn literals(input: &str) -> Vec<String> {
        Lexer::new(input).map(|t| t.literal).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("if then elif else fi for in do done while function return break continue local iffy"),
            vec![
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Elif,
                TokenKind::Else,
                TokenKind::Fi,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Do,
                TokenKind::Done,
                TokenKind::While,
                TokenKind::Function,
                TokenKind::Return,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Local,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || >> = ! < > |"),
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Append,
                TokenKind::Assign,
                TokenKind::Not,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Pipe,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens: Vec<_> = Lexer::new("echo hi # trailing\n# whole line\nls").collect();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
            ]
        );
        assert_eq!(tokens[6].line, 3);
        assert_eq!(tokens[6].column, 1);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(literals(r#""a\tb\n" 'it\'s' "q\"q""#), vec!["a\tb\n", "it's", "q\"q"]);
    }

    #[test]
    fn test_single_quotes_protect_dollar() {
        assert_eq!(literals(r#"'$HOME' "$HOME""#), vec!["\\$HOME", "$HOME"]);
    }

    #[test]
    fn test_words_numbers_and_variables() {
        let tokens: Vec<_> = Lexer::new("[ $i -eq 3 ] ${name} file.txt 12ab").collect();
        let pairs: Vec<_> = tokens.iter().map(|t| (t.kind, t.literal.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (TokenKind::LBracket, "["),
                (TokenKind::Ident, "$i"),
                (TokenKind::Word, "-eq"),
                (TokenKind::Number, "3"),
                (TokenKind::RBracket, "]"),
                (TokenKind::Ident, "${name}"),
                (TokenKind::Word, "file.txt"),
                (TokenKind::Word, "12ab"),
            ]
        );
    }

    #[test]
    fn test_assignment_split_and_joined_flag() {
        let tokens: Vec<_> = Lexer::new("x=1 --opt=v").collect();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Assign);
        assert!(tokens[1].joined);
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert!(tokens[2].joined);
        assert_eq!(tokens[3].literal, "--opt=v");
        assert!(!tokens[3].joined);
    }

    #[test]
    fn test_command_substitution() {
        let tokens: Vec<_> = Lexer::new("x=$(ls (a) -l)").collect();
        assert_eq!(tokens[2].kind, TokenKind::CommandSubst);
        assert_eq!(tokens[2].literal, "ls (a) -l");
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(kinds("a & b"), vec![TokenKind::Ident, TokenKind::Illegal, TokenKind::Ident]);
        assert_eq!(kinds("\u{7}"), vec![TokenKind::Illegal]);
    }
}
