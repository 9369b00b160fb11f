// Interactive lexer: one input line into a flat token stream

use crate::shell::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Consume the whole line. The returned sequence always ends with `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }

            let Some(c) = self.peek() else {
                break;
            };

            match c {
                '|' => {
                    self.pos += 1;
                    if self.peek() == Some('|') {
                        self.pos += 1;
                        tokens.push(Token::new(TokenKind::Or, "||"));
                    } else {
                        tokens.push(Token::new(TokenKind::Pipe, "|"));
                    }
                }
                '>' => {
                    self.pos += 1;
                    if self.peek() == Some('>') {
                        self.pos += 1;
                        tokens.push(Token::new(TokenKind::RedirectAppend, ">>"));
                    } else {
                        tokens.push(Token::new(TokenKind::RedirectOut, ">"));
                    }
                }
                '<' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::RedirectIn, "<"));
                }
                '&' => {
                    if self.peek_next() == Some('&') {
                        self.pos += 2;
                        tokens.push(Token::new(TokenKind::And, "&&"));
                    } else {
                        // A lone '&' is not background execution here, just a word
                        self.pos += 1;
                        tokens.push(Token::word("&"));
                    }
                }
                ';' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::Semicolon, ";"));
                }
                _ => {
                    let (word, quoted) = self.read_word();
                    if !quoted && word == "2" && self.peek() == Some('>') {
                        self.pos += 1;
                        tokens.push(Token::new(TokenKind::RedirectErr, "2>"));
                    } else if quoted {
                        tokens.push(Token::quoted_word(word));
                    } else {
                        tokens.push(Token::word(word));
                    }
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, ""));
        tokens
    }

    /// Reads one word made of unquoted runs and quoted segments. The flag
    /// reports whether any part of it was quoted or escaped.
    fn read_word(&mut self) -> (String, bool) {
        let mut word = String::new();
        let mut quoted = false;

        while let Some(c) = self.peek() {
            if c.is_whitespace() || is_operator(c) {
                break;
            }
            match c {
                '"' | '\'' => {
                    self.pos += 1;
                    quoted = true;
                    self.read_quoted(c, &mut word);
                }
                '\\' => {
                    self.pos += 1;
                    quoted = true;
                    if let Some(next) = self.bump() {
                        word.push(next);
                    }
                }
                _ => {
                    word.push(c);
                    self.pos += 1;
                }
            }
        }

        (word, quoted)
    }

    // Unterminated quotes run to the end of the line.
    fn read_quoted(&mut self, quote: char, out: &mut String) {
        while let Some(c) = self.bump() {
            if c == quote {
                return;
            }
            if c == '\\' {
                if let Some(next) = self.bump() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
    }
}

fn is_operator(c: char) -> bool {
    matches!(c, '|' | '>' | '<' | '&' | ';')
}

pub fn tokenize(line: &str) -> Vec<Token> {
    Lexer::new(line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line).into_iter().map(|t| t.kind).collect()
    }

    fn words(line: &str) -> Vec<String> {
        tokenize(line)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_quoted_word_stays_whole() {
        assert_eq!(words(r#"echo "a b" c"#), vec!["echo", "a b", "c"]);
    }

    #[test]
    fn test_plain_words_rejoin_to_collapsed_input() {
        let input = "  ls   -la\t/tmp   foo ";
        let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(words(input).join(" "), collapsed);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a | b > c >> d < e && f || g ; h"),
            vec![
                TokenKind::Word,
                TokenKind::Pipe,
                TokenKind::Word,
                TokenKind::RedirectOut,
                TokenKind::Word,
                TokenKind::RedirectAppend,
                TokenKind::Word,
                TokenKind::RedirectIn,
                TokenKind::Word,
                TokenKind::And,
                TokenKind::Word,
                TokenKind::Or,
                TokenKind::Word,
                TokenKind::Semicolon,
                TokenKind::Word,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_ampersand_is_word() {
        assert_eq!(words("echo & done"), vec!["echo", "&", "done"]);
    }

    #[test]
    fn test_stderr_redirect() {
        let tokens = tokenize("cmd 2> err.txt");
        assert_eq!(tokens[1].kind, TokenKind::RedirectErr);
        assert_eq!(tokens[2].value, "err.txt");

        // separated by whitespace it is an ordinary argument
        assert_eq!(kinds("cmd 2 > x")[1], TokenKind::Word);
        // quoted "2" is never a redirect
        assert_eq!(kinds(r#"cmd "2"> x"#)[1], TokenKind::Word);
    }

    #[test]
    fn test_escapes_and_unterminated_quote() {
        assert_eq!(words(r"echo a\ b \|"), vec!["echo", "a b", "|"]);
        assert_eq!(words(r#"echo "never closed"#), vec!["echo", "never closed"]);
        assert_eq!(words(r#"echo "say \"hi\"""#), vec!["echo", "say \"hi\""]);
    }

    #[test]
    fn test_empty_quotes_produce_empty_word() {
        assert_eq!(words(r#"echo """#), vec!["echo", ""]);
    }

    #[test]
    fn test_quoting_is_recorded() {
        let quoted: Vec<bool> = tokenize(r#"echo $a "$b" c\$d"#)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.quoted)
            .collect();
        assert_eq!(quoted, vec![false, false, true, true]);
    }

    #[test]
    fn test_blank_line_is_just_eof() {
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }
}
