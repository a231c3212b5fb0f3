use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::ast::{OperatorKeyword, Token, TokenKind};
use crate::error::{ParsingContext, QueryError};

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("numeric literal pattern is valid"));

/// Characters that always end a bare word.
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\'' | '(' | ')' | ',' | '[' | ']' | '=' | '<' | '>')
}

/// Output of the tokenizer: the tokens plus what the scanner noticed but did
/// not report.
///
/// An unterminated string literal or key name is not an error at scan time.
/// The scanner records where it started and stops; the parser turns that into
/// a diagnostic when it runs out of tokens, see [`TokenStream::pending_error`].
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStream {
    pub original_text: String,
    pub context: ParsingContext,
    pub tokens: VecDeque<Token>,
    pub has_unterminated_literal: bool,
    pub has_unterminated_key_name: bool,
    /// Offset of the last apostrophe that opened a string literal.
    pub last_string_literal_begin: usize,
    /// Offset of the last `[` that opened a `["key"]` segment.
    pub last_json_key_begin: usize,
}

impl TokenStream {
    pub fn next(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The deferred scan error, if the text ended inside a literal or key name.
    pub fn pending_error(&self) -> Option<QueryError> {
        if self.has_unterminated_literal {
            Some(QueryError::UnterminatedStringLiteral {
                original_text: self.original_text.clone(),
                context: self.context,
                position: self.last_string_literal_begin,
            })
        } else if self.has_unterminated_key_name {
            Some(QueryError::UnterminatedJsonKey {
                original_text: self.original_text.clone(),
                context: self.context,
                position: self.last_json_key_begin,
            })
        } else {
            None
        }
    }
}

/// Convert query text into a [`TokenStream`]. Never fails.
pub fn tokenize(text: &str, context: ParsingContext) -> TokenStream {
    Lexer::new(text, context).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    stream: TokenStream,
}

impl Lexer {
    pub fn new(input: &str, context: ParsingContext) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            stream: TokenStream {
                original_text: input.to_string(),
                context,
                tokens: VecDeque::new(),
                has_unterminated_literal: false,
                has_unterminated_key_name: false,
                last_string_literal_begin: 0,
                last_json_key_begin: 0,
            },
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, position: usize) {
        let token = Token::new(kind, text, position);
        trace!(kind = ?token.kind, text = %token.text, position, "token");
        self.stream.tokens.push_back(token);
    }

    /// Emit a token of `len` chars at the current position.
    fn single(&mut self, kind: TokenKind, len: usize) {
        let start = self.position;
        let text: String = self.input[start..start + len].iter().collect();
        self.position += len;
        self.push(kind, text, start);
    }

    /// Scan `'...'`. A doubled apostrophe inside is a literal apostrophe.
    /// Returns false if the text ends before the closing apostrophe.
    fn read_string(&mut self) -> bool {
        let start = self.position;
        self.stream.last_string_literal_begin = start;
        self.advance(); // opening quote

        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\'' {
                if self.peek_char(1) == Some('\'') {
                    result.push('\'');
                    self.position += 2;
                    continue;
                }
                self.advance();
                self.push(TokenKind::StringLiteral, result, start);
                return true;
            }
            result.push(ch);
            self.advance();
        }

        self.stream.has_unterminated_literal = true;
        false
    }

    /// Scan `["name"]` into `[`, the name, `]`.
    /// Returns false if the text ends before `"]`.
    fn read_json_key(&mut self) -> bool {
        let start = self.position;
        self.stream.last_json_key_begin = start;
        self.position += 2; // ["

        let name_start = self.position;
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '"' && self.peek_char(1) == Some(']') {
                self.push(TokenKind::LBracket, "[", start);
                self.push(TokenKind::StringLiteral, name, name_start);
                let close = self.position + 1;
                self.position += 2;
                self.push(TokenKind::RBracket, "]", close);
                return true;
            }
            name.push(ch);
            self.advance();
        }

        self.stream.has_unterminated_key_name = true;
        false
    }

    fn read_word(&mut self) {
        let start = self.position;
        let mut word = String::new();
        while let Some(ch) = self.current_char() {
            if is_delimiter(ch) || (ch == '!' && self.peek_char(1) == Some('=') && !word.is_empty()) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        let kind = classify_word(&word);
        self.push(kind, word, start);
    }

    /// Scan the whole input. Scanning stops at the first unterminated
    /// construct; everything after it belongs to that construct.
    pub fn tokenize(mut self) -> TokenStream {
        loop {
            self.skip_whitespace();

            match self.current_char() {
                None => break,
                Some('\'') => {
                    if !self.read_string() {
                        break;
                    }
                }
                Some('[') if self.peek_char(1) == Some('"') => {
                    if !self.read_json_key() {
                        break;
                    }
                }
                Some('[') => self.single(TokenKind::LBracket, 1),
                Some(']') => self.single(TokenKind::RBracket, 1),
                Some('(') => self.single(TokenKind::LParen, 1),
                Some(')') => self.single(TokenKind::RParen, 1),
                Some(',') => self.single(TokenKind::Comma, 1),
                Some('=') => {
                    let len = if self.peek_char(1) == Some('=') { 2 } else { 1 };
                    self.single(TokenKind::Operator(OperatorKeyword::Eq), len);
                }
                Some('!') if self.peek_char(1) == Some('=') => {
                    self.single(TokenKind::Operator(OperatorKeyword::Ne), 2);
                }
                Some('<') => match self.peek_char(1) {
                    Some('=') => self.single(TokenKind::Operator(OperatorKeyword::Le), 2),
                    Some('>') => self.single(TokenKind::Operator(OperatorKeyword::Ne), 2),
                    _ => self.single(TokenKind::Operator(OperatorKeyword::Lt), 1),
                },
                Some('>') => match self.peek_char(1) {
                    Some('=') => self.single(TokenKind::Operator(OperatorKeyword::Ge), 2),
                    _ => self.single(TokenKind::Operator(OperatorKeyword::Gt), 1),
                },
                Some(_) => self.read_word(),
            }
        }

        self.stream
    }
}

fn classify_word(word: &str) -> TokenKind {
    match word.to_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" => TokenKind::BooleanLiteral(true),
        "false" => TokenKind::BooleanLiteral(false),
        "null" => TokenKind::Null,
        "eq" => TokenKind::Operator(OperatorKeyword::Eq),
        "ne" => TokenKind::Operator(OperatorKeyword::Ne),
        "gt" => TokenKind::Operator(OperatorKeyword::Gt),
        "ge" => TokenKind::Operator(OperatorKeyword::Ge),
        "lt" => TokenKind::Operator(OperatorKeyword::Lt),
        "le" => TokenKind::Operator(OperatorKeyword::Le),
        "contains" => TokenKind::Operator(OperatorKeyword::Contains),
        "startswith" => TokenKind::Operator(OperatorKeyword::StartsWith),
        "endswith" => TokenKind::Operator(OperatorKeyword::EndsWith),
        "between" => TokenKind::Operator(OperatorKeyword::Between),
        "in" => TokenKind::Operator(OperatorKeyword::In),
        "is" => TokenKind::Operator(OperatorKeyword::Is),
        _ if NUMERIC.is_match(word) => TokenKind::NumericLiteral,
        _ => TokenKind::Identifier,
    }
}
