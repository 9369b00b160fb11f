// Interactive token model

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Pipe,           // |
    RedirectOut,    // >
    RedirectAppend, // >>
    RedirectIn,     // <
    RedirectErr,    // 2>
    And,            // &&
    Or,             // ||
    Semicolon,      // ;
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Some part of the word was quoted or escaped.
    pub quoted: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            quoted: false,
        }
    }

    pub fn word(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Word, value)
    }

    pub fn quoted_word(value: impl Into<String>) -> Self {
        Self {
            quoted: true,
            ..Self::word(value)
        }
    }
}
