use std::fmt;

/// Operator keywords, including their symbolic spellings (`=`, `!=`, `>=`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKeyword {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    StartsWith,
    EndsWith,
    Between,
    In,
    Is,
}

/// The classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word that is not a keyword; usually a column reference
    ///
    /// # Examples
    /// ```text
    /// paycheck
    /// Name
    /// ```
    Identifier,

    /// Apostrophe-quoted text. The token text is the unescaped content.
    ///
    /// # Examples
    /// ```text
    /// 'Alice Smith'
    /// 'Danielle O''Shea'
    /// ```
    StringLiteral,

    /// Optional leading minus, digits, optional single decimal point
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1000.50
    /// ```
    NumericLiteral,

    /// `true` or `false`, any case
    BooleanLiteral(bool),

    /// Unquoted `null`, any case. Distinct from the string `'null'`.
    Null,

    /// `eq`, `gt`, `contains`, `between`, `in`, `is`, ...
    Operator(OperatorKeyword),

    /// `and`
    And,

    /// `or`
    Or,

    /// `not`
    Not,

    /// `(`
    LParen,

    /// `)`
    RParen,

    /// `,`
    Comma,

    /// `[` opening a `["key"]` segment
    LBracket,

    /// `]`
    RBracket,
}

/// A classified run of query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token (unescaped content for string literals and key names).
    pub text: String,
    /// 0-based character offset of the token's first character.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Whether this token can stand as an operand literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier
                | TokenKind::StringLiteral
                | TokenKind::NumericLiteral
                | TokenKind::BooleanLiteral(_)
                | TokenKind::Null
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::StringLiteral => write!(f, "string '{}'", self.text),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
