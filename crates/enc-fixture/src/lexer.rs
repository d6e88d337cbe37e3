//! Tokenizer for the Python-literal fixture format.

use enc_core::errors::{EncError, ErrorInfo};

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier, possibly dotted (`np.inf`).
    Ident(String),
    /// Integer literal.
    Int(i64),
    /// Floating point literal (also integers too large for `i64`).
    Float(f64),
    /// String literal with escapes resolved.
    Str(String),
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Unary `-`
    Minus,
    /// Unary `+`
    Plus,
    /// Comment body, without the leading `#`. Only emitted outside brackets.
    Comment(String),
    /// Logical end of statement. Suppressed inside brackets.
    Newline,
    /// End of input.
    Eof,
}

/// Token with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token category and payload.
    pub kind: TokenKind,
    /// Line of the first character.
    pub line: usize,
    /// Column of the first character.
    pub col: usize,
}

pub(crate) fn lex_error(code: &str, message: impl Into<String>, line: usize, col: usize) -> EncError {
    EncError::Parse(
        ErrorInfo::new(code, message)
            .with_context("line", line.to_string())
            .with_context("column", col.to_string()),
    )
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat_while(&mut self, out: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.bump();
        }
    }
}

/// Splits fixture source into tokens.
pub fn tokenize(src: &str) -> Result<Vec<Token>, EncError> {
    let mut cursor = Cursor::new(src);
    let mut tokens = Vec::new();
    let mut depth = 0usize;

    while let Some(ch) = cursor.peek() {
        let (line, col) = (cursor.line, cursor.col);
        let push = |tokens: &mut Vec<Token>, kind| tokens.push(Token { kind, line, col });
        match ch {
            '\n' => {
                cursor.bump();
                if depth == 0 && !matches!(tokens.last(), Some(Token { kind: TokenKind::Newline, .. }) | None) {
                    push(&mut tokens, TokenKind::Newline);
                }
            }
            ' ' | '\t' | '\r' => {
                cursor.bump();
            }
            '\\' => {
                cursor.bump();
                while matches!(cursor.peek(), Some(' ' | '\t' | '\r')) {
                    cursor.bump();
                }
                if cursor.bump() != Some('\n') {
                    return Err(lex_error(
                        "enc_fixture.lex.stray_backslash",
                        "backslash must end a line",
                        line,
                        col,
                    ));
                }
            }
            '#' => {
                cursor.bump();
                let mut text = String::new();
                cursor.eat_while(&mut text, |c| c != '\n');
                if depth == 0 {
                    let text = text.strip_prefix(' ').unwrap_or(&text).trim_end().to_string();
                    push(&mut tokens, TokenKind::Comment(text));
                }
            }
            '=' => {
                cursor.bump();
                push(&mut tokens, TokenKind::Equals);
            }
            ',' => {
                cursor.bump();
                push(&mut tokens, TokenKind::Comma);
            }
            '(' | '[' => {
                cursor.bump();
                depth += 1;
                let kind = if ch == '(' {
                    TokenKind::LParen
                } else {
                    TokenKind::LBracket
                };
                push(&mut tokens, kind);
            }
            ')' | ']' => {
                cursor.bump();
                depth = depth.checked_sub(1).ok_or_else(|| {
                    lex_error(
                        "enc_fixture.lex.unbalanced",
                        format!("unmatched '{ch}'"),
                        line,
                        col,
                    )
                })?;
                let kind = if ch == ')' {
                    TokenKind::RParen
                } else {
                    TokenKind::RBracket
                };
                push(&mut tokens, kind);
            }
            '-' => {
                cursor.bump();
                push(&mut tokens, TokenKind::Minus);
            }
            '+' => {
                cursor.bump();
                push(&mut tokens, TokenKind::Plus);
            }
            '"' | '\'' => {
                let text = lex_string(&mut cursor, ch)?;
                push(&mut tokens, TokenKind::Str(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let kind = lex_number(&mut cursor)?;
                push(&mut tokens, kind);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                cursor.eat_while(&mut ident, |c| c.is_alphanumeric() || c == '_' || c == '.');
                if ident.ends_with('.') || ident.contains("..") {
                    return Err(lex_error(
                        "enc_fixture.lex.bad_identifier",
                        format!("malformed dotted name '{ident}'"),
                        line,
                        col,
                    ));
                }
                push(&mut tokens, TokenKind::Ident(ident));
            }
            other => {
                return Err(lex_error(
                    "enc_fixture.lex.unexpected_char",
                    format!("unexpected character '{other}'"),
                    line,
                    col,
                ));
            }
        }
    }

    if depth != 0 {
        return Err(lex_error(
            "enc_fixture.lex.unbalanced",
            "unclosed bracket at end of input",
            cursor.line,
            cursor.col,
        ));
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        line: cursor.line,
        col: cursor.col,
    });
    Ok(tokens)
}

fn lex_string(cursor: &mut Cursor<'_>, quote: char) -> Result<String, EncError> {
    let (line, col) = (cursor.line, cursor.col);
    cursor.bump();
    let mut text = String::new();
    loop {
        match cursor.bump() {
            Some(c) if c == quote => return Ok(text),
            Some('\\') => match cursor.bump() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some('0') => text.push('\0'),
                Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                Some(other) => {
                    text.push('\\');
                    text.push(other);
                }
                None => break,
            },
            Some('\n') | None => break,
            Some(c) => text.push(c),
        }
    }
    Err(lex_error(
        "enc_fixture.lex.unterminated_string",
        "string literal is not terminated on its line",
        line,
        col,
    ))
}

fn lex_number(cursor: &mut Cursor<'_>) -> Result<TokenKind, EncError> {
    let (line, col) = (cursor.line, cursor.col);
    let mut raw = String::new();
    let mut is_float = false;
    cursor.eat_while(&mut raw, |c| c.is_ascii_digit() || c == '_');
    if cursor.peek() == Some('.') {
        is_float = true;
        raw.push('.');
        cursor.bump();
        cursor.eat_while(&mut raw, |c| c.is_ascii_digit() || c == '_');
    }
    if matches!(cursor.peek(), Some('e' | 'E')) {
        is_float = true;
        raw.push('e');
        cursor.bump();
        if let Some(sign @ ('+' | '-')) = cursor.peek() {
            raw.push(sign);
            cursor.bump();
        }
        let before = raw.len();
        cursor.eat_while(&mut raw, |c| c.is_ascii_digit() || c == '_');
        if raw.len() == before {
            return Err(lex_error(
                "enc_fixture.lex.bad_number",
                format!("exponent without digits in '{raw}'"),
                line,
                col,
            ));
        }
    }
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    if cleaned == "." {
        return Err(lex_error(
            "enc_fixture.lex.bad_number",
            "lone '.' is not a number",
            line,
            col,
        ));
    }
    if !is_float {
        if let Ok(value) = cleaned.parse::<i64>() {
            return Ok(TokenKind::Int(value));
        }
    }
    cleaned.parse::<f64>().map(TokenKind::Float).map_err(|err| {
        lex_error(
            "enc_fixture.lex.bad_number",
            format!("invalid number '{raw}': {err}"),
            line,
            col,
        )
    })
}
