use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Illegal,
    Comment,

    Ident,    // name, $name, ${name}
    Word,     // any other bare word: -eq, file.txt, /tmp
    String,   // quoted, escapes resolved
    Number,   // integer literal
    CommandSubst, // $( ... ), literal holds the inner text

    // Keywords
    If,
    Then,
    Elif,
    Else,
    Fi,
    For,
    In,
    Do,
    Done,
    While,
    Function,
    Return,
    Break,
    Continue,
    Local,

    // Operators
    Assign,    // =
    Eq,        // ==
    Ne,        // !=
    Lt,        // <
    Gt,        // >
    Le,        // <=
    Ge,        // >=
    And,       // &&
    Or,        // ||
    Not,       // !
    Pipe,      // |
    Append,    // >>
    Semicolon, // ;

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Newline,
}

impl TokenKind {
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "fi" => TokenKind::Fi,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "do" => TokenKind::Do,
            "done" => TokenKind::Done,
            "while" => TokenKind::While,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "local" => TokenKind::Local,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Then
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Fi
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Do
                | TokenKind::Done
                | TokenKind::While
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Local
        )
    }

    /// Keywords that close (or split) a block and therefore end a command.
    pub fn ends_block(&self) -> bool {
        matches!(
            self,
            TokenKind::Fi
                | TokenKind::Done
                | TokenKind::RBrace
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Then
                | TokenKind::Do
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Illegal => "illegal character",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Word => "word",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::CommandSubst => "command substitution",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::Fi => "'fi'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Do => "'do'",
            TokenKind::Done => "'done'",
            TokenKind::While => "'while'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Local => "'local'",
            TokenKind::Assign => "'='",
            TokenKind::Eq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::Pipe => "'|'",
            TokenKind::Append => "'>>'",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Newline => "newline",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
    /// No whitespace between this token and the previous one.
    pub joined: bool,
}

impl Token {
    /// Tokens that can be part of a command word.
    pub fn is_wordlike(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Ident
                | TokenKind::Word
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::CommandSubst
        ) || self.kind.is_keyword()
    }
}
