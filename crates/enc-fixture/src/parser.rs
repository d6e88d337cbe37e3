//! Statement level parser for fixture files.
//!
//! The accepted language is the subset of Python the histogram writers
//! emit: `import` lines, comments, and assignments of literals, tuples and
//! lists. Earlier bindings may be referenced by name.

use std::collections::BTreeMap;

use enc_core::errors::EncError;
use serde::{Deserialize, Serialize};

use crate::lexer::{lex_error, tokenize, Token, TokenKind};
use crate::value::{Value, MAX_NESTING};

/// `import module [as alias]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Imported module path.
    pub module: String,
    /// Local alias, if any.
    pub alias: Option<String>,
}

impl Import {
    /// Name the module is reachable under.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.module)
    }
}

/// Top level comment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// 1-based source line.
    pub line: usize,
    /// Text after `#`, one leading space removed.
    pub text: String,
}

/// Single `name = value` binding. Tuple unpacking yields one binding per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Bound name.
    pub name: String,
    /// Bound value.
    pub value: Value,
    /// 1-based line of the statement.
    pub line: usize,
}

/// Parsed fixture source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Import statements in source order.
    pub imports: Vec<Import>,
    /// Top level comments in source order.
    pub comments: Vec<Comment>,
    /// Bindings in source order. Rebinding a name keeps both entries.
    pub bindings: Vec<Binding>,
}

impl Document {
    /// Latest value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.name == name)
            .map(|binding| &binding.value)
    }

    /// Latest binding per name, keyed by name.
    pub fn latest(&self) -> BTreeMap<&str, &Binding> {
        let mut map = BTreeMap::new();
        for binding in &self.bindings {
            map.insert(binding.name.as_str(), binding);
        }
        map
    }
}

/// Parses fixture source text into a [`Document`].
pub fn parse_document(src: &str) -> Result<Document, EncError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        doc: Document::default(),
    };
    parser.run()?;
    Ok(parser.doc)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open brackets, parentheses and unary signs around the current value.
    depth: usize,
    doc: Document,
}

fn unexpected(token: &Token, expected: &str) -> EncError {
    lex_error(
        "enc_fixture.parse.unexpected_token",
        format!("expected {expected}, found {}", describe(&token.kind)),
        token.line,
        token.col,
    )
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(name) => format!("name '{name}'"),
        TokenKind::Int(v) => format!("integer {v}"),
        TokenKind::Float(v) => format!("number {v}"),
        TokenKind::Str(s) => format!("string {s:?}"),
        TokenKind::Equals => "'='".into(),
        TokenKind::Comma => "','".into(),
        TokenKind::LParen => "'('".into(),
        TokenKind::RParen => "')'".into(),
        TokenKind::LBracket => "'['".into(),
        TokenKind::RBracket => "']'".into(),
        TokenKind::Minus => "'-'".into(),
        TokenKind::Plus => "'+'".into(),
        TokenKind::Comment(_) => "comment".into(),
        TokenKind::Newline => "end of line".into(),
        TokenKind::Eof => "end of input".into(),
    }
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, EncError> {
        let token = self.next();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, what))
        }
    }

    fn run(&mut self) -> Result<(), EncError> {
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Newline => {
                    self.pos += 1;
                }
                TokenKind::Comment(text) => {
                    self.pos += 1;
                    self.doc.comments.push(Comment {
                        line: token.line,
                        text,
                    });
                }
                TokenKind::Ident(ref name) if name == "import" => {
                    self.pos += 1;
                    self.import()?;
                }
                TokenKind::Ident(_) => self.assignment()?,
                _ => return Err(unexpected(&token, "a statement")),
            }
        }
    }

    fn end_of_statement(&mut self) -> Result<(), EncError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Newline => {
                self.pos += 1;
                Ok(())
            }
            // Trailing comments stay attached to the statement's line.
            TokenKind::Eof | TokenKind::Comment(_) => Ok(()),
            _ => Err(unexpected(&token, "end of statement")),
        }
    }

    fn import(&mut self) -> Result<(), EncError> {
        let token = self.next();
        let TokenKind::Ident(module) = token.kind else {
            return Err(unexpected(&token, "module name"));
        };
        let alias = match &self.peek().kind {
            TokenKind::Ident(word) if word == "as" => {
                self.pos += 1;
                let token = self.next();
                match token.kind {
                    TokenKind::Ident(alias) => Some(alias),
                    _ => return Err(unexpected(&token, "alias name")),
                }
            }
            _ => None,
        };
        self.doc.imports.push(Import { module, alias });
        self.end_of_statement()
    }

    fn assignment(&mut self) -> Result<(), EncError> {
        let line = self.peek().line;
        let mut targets = Vec::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Ident(name) if !name.contains('.') => targets.push(name),
                _ => return Err(unexpected(&token, "assignment target")),
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if self.peek().kind == TokenKind::Equals {
                break;
            }
        }
        self.expect(TokenKind::Equals, "'='")?;

        let value_token = self.peek().clone();
        let value = self.expression_list()?;
        self.end_of_statement()?;

        if targets.len() == 1 {
            let name = targets.remove(0);
            self.doc.bindings.push(Binding { name, value, line });
            return Ok(());
        }
        let items = match value {
            Value::Tuple(items) | Value::List(items) if items.len() == targets.len() => items,
            other => {
                return Err(lex_error(
                    "enc_fixture.parse.unpack_mismatch",
                    format!(
                        "cannot unpack {} into {} names",
                        other.type_name(),
                        targets.len()
                    ),
                    value_token.line,
                    value_token.col,
                ))
            }
        };
        for (name, value) in targets.into_iter().zip(items) {
            self.doc.bindings.push(Binding { name, value, line });
        }
        Ok(())
    }

    /// `expr (, expr)* [,]` — more than one element (or a trailing comma) makes a tuple.
    fn expression_list(&mut self) -> Result<Value, EncError> {
        let first = self.expression()?;
        if self.peek().kind != TokenKind::Comma {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if matches!(
                self.peek().kind,
                TokenKind::Newline | TokenKind::Eof | TokenKind::Comment(_)
            ) {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Value::Tuple(items))
    }

    fn expression(&mut self) -> Result<Value, EncError> {
        if self.depth >= MAX_NESTING {
            let token = self.peek();
            return Err(lex_error(
                "enc_fixture.parse.too_deep",
                format!("values nest deeper than {MAX_NESTING} levels"),
                token.line,
                token.col,
            ));
        }
        self.depth += 1;
        let value = self.nested_expression();
        self.depth -= 1;
        value
    }

    fn nested_expression(&mut self) -> Result<Value, EncError> {
        let token = self.next();
        match token.kind {
            TokenKind::Minus | TokenKind::Plus => {
                let negate = token.kind == TokenKind::Minus;
                let operand_token = self.peek().clone();
                match self.expression()? {
                    Value::Int(v) if negate => Ok(Value::Int(-v)),
                    Value::Float(v) if negate => Ok(Value::Float(-v)),
                    value @ (Value::Int(_) | Value::Float(_)) => Ok(value),
                    other => Err(lex_error(
                        "enc_fixture.parse.bad_operand",
                        format!("unary sign applied to {}", other.type_name()),
                        operand_token.line,
                        operand_token.col,
                    )),
                }
            }
            TokenKind::Int(v) => Ok(Value::Int(v)),
            TokenKind::Float(v) => Ok(Value::Float(v)),
            TokenKind::Str(mut s) => {
                // Adjacent literals concatenate.
                while let TokenKind::Str(next) = &self.peek().kind {
                    s.push_str(next);
                    self.pos += 1;
                }
                Ok(Value::Str(s))
            }
            TokenKind::LParen => {
                if self.eat(&TokenKind::RParen) {
                    return Ok(Value::Tuple(Vec::new()));
                }
                let first = self.expression()?;
                if self.eat(&TokenKind::RParen) {
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.eat(&TokenKind::Comma) {
                    if self.peek().kind == TokenKind::RParen {
                        break;
                    }
                    items.push(self.expression()?);
                }
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Value::Tuple(items))
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while !self.eat(&TokenKind::RBracket) {
                    items.push(self.expression()?);
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(TokenKind::RBracket, "',' or ']'")?;
                        break;
                    }
                }
                Ok(Value::List(items))
            }
            TokenKind::Ident(ref name) => self.name(name, &token),
            _ => Err(unexpected(&token, "a value")),
        }
    }

    fn name(&mut self, name: &str, token: &Token) -> Result<Value, EncError> {
        match name {
            "True" => return Ok(Value::Bool(true)),
            "False" => return Ok(Value::Bool(false)),
            "float" => return self.float_call(token),
            _ => {}
        }
        if let Some((module, attr)) = name.split_once('.') {
            let numeric_module = self.doc.imports.iter().any(|import| {
                import.local_name() == module && matches!(import.module.as_str(), "numpy" | "math")
            });
            if numeric_module {
                match attr {
                    "inf" => return Ok(Value::Float(f64::INFINITY)),
                    "nan" => return Ok(Value::Float(f64::NAN)),
                    "pi" => return Ok(Value::Float(std::f64::consts::PI)),
                    "e" => return Ok(Value::Float(std::f64::consts::E)),
                    _ => {}
                }
            }
        }
        if let Some(value) = self.doc.get(name) {
            return Ok(value.clone());
        }
        match name {
            "inf" => return Ok(Value::Float(f64::INFINITY)),
            "nan" => return Ok(Value::Float(f64::NAN)),
            _ => {}
        }
        Err(lex_error(
            "enc_fixture.parse.unresolved_name",
            format!("name '{name}' is not defined"),
            token.line,
            token.col,
        ))
    }

    /// `float("inf")`, `float("-inf")`, `float("nan")` or `float(<number>)`.
    fn float_call(&mut self, token: &Token) -> Result<Value, EncError> {
        self.expect(TokenKind::LParen, "'(' after float")?;
        let arg = self.expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let parsed = match &arg {
            Value::Str(text) => match text.trim().to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
                "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
                "nan" => Some(f64::NAN),
                other => other.parse::<f64>().ok(),
            },
            other => other.as_f64(),
        };
        parsed.map(Value::Float).ok_or_else(|| {
            lex_error(
                "enc_fixture.parse.bad_float",
                format!("float() cannot convert {}", arg.type_name()),
                token.line,
                token.col,
            )
        })
    }
}
