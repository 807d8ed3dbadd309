//! Recursive-descent JSON parser producing located [`Node`] trees.
//!
//! Two budgets guard against hostile input: execution fuel (tokens consumed)
//! and recursion depth. Exhausting either is a `ParseLimit` diagnostic, never
//! a stack overflow.

use rowan::{TextRange, TextSize};

use super::lexer::{Token, TokenKind, lex, token_text};
use super::node::{Node, Object, Value};
use super::source_map::SourceId;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};

/// Parser budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub fuel: u32,
    pub depth: u32,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            fuel: 1_000_000,
            depth: 128,
        }
    }
}

pub fn parse_json(source: &str, id: SourceId, limits: ParseLimits) -> Result<Node, Diagnostic> {
    let mut parser = JsonParser {
        source,
        tokens: lex(source),
        pos: 0,
        id,
        fuel: limits.fuel,
        depth: 0,
        max_depth: limits.depth,
    };
    let node = parser.value()?;
    if let Some(extra) = parser.peek() {
        return Err(parser.unexpected(extra, "end of document"));
    }
    Ok(node)
}

struct JsonParser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    id: SourceId,
    fuel: u32,
    depth: u32,
    max_depth: u32,
}

impl<'s> JsonParser<'s> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<Token, Diagnostic> {
        let Some(token) = self.peek() else {
            return Err(self.eof());
        };
        if self.fuel == 0 {
            return Err(Diagnostic::new(DiagnosticKind::ParseLimit, self.span(token.span))
                .message("execution limit exceeded"));
        }
        self.fuel -= 1;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Diagnostic> {
        let token = self.bump()?;
        if token.kind != kind {
            return Err(self.unexpected(token, what));
        }
        Ok(token)
    }

    fn span(&self, range: TextRange) -> Span {
        Span::new(self.id, range)
    }

    fn eof(&self) -> Diagnostic {
        let end = TextSize::of(self.source);
        Diagnostic::new(DiagnosticKind::JsonSyntax, self.span(TextRange::empty(end)))
            .message("unexpected end of document")
    }

    fn unexpected(&self, token: Token, expected: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::JsonSyntax, self.span(token.span)).message(format!(
            "expected {}, found {}",
            expected,
            token.kind.describe()
        ))
    }

    fn enter(&mut self, at: TextRange) -> Result<(), Diagnostic> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Diagnostic::new(DiagnosticKind::ParseLimit, self.span(at))
                .message("recursion limit exceeded"));
        }
        Ok(())
    }

    fn value(&mut self) -> Result<Node, Diagnostic> {
        let token = self.bump()?;
        let value = match token.kind {
            TokenKind::Null => Value::Null,
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Number => Value::Number(self.number(token)?),
            TokenKind::String => Value::String(self.string(token)?),
            TokenKind::LBrace => return self.object(token),
            TokenKind::LBracket => return self.array(token),
            _ => return Err(self.unexpected(token, "a value")),
        };
        Ok(Node::new(token.span, value))
    }

    fn number(&self, token: Token) -> Result<serde_json::Number, Diagnostic> {
        let text = token_text(self.source, &token);
        text.parse::<serde_json::Number>().map_err(|_| {
            Diagnostic::new(DiagnosticKind::JsonSyntax, self.span(token.span))
                .message(format!("number `{}` is out of range", text))
        })
    }

    fn string(&self, token: Token) -> Result<String, Diagnostic> {
        let text = token_text(self.source, &token);
        serde_json::from_str::<String>(text).map_err(|e| {
            Diagnostic::new(DiagnosticKind::JsonSyntax, self.span(token.span))
                .message(format!("invalid string literal ({})", e))
        })
    }

    fn object(&mut self, open: Token) -> Result<Node, Diagnostic> {
        self.enter(open.span)?;
        let mut object = Object::new();

        if self.peek().is_some_and(|t| t.kind == TokenKind::RBrace) {
            let close = self.bump()?;
            self.depth -= 1;
            return Ok(Node::new(open.span.cover(close.span), Value::Object(object)));
        }

        loop {
            let key_token = self.expect(TokenKind::String, "object key")?;
            let key = self.string(key_token)?;
            self.expect(TokenKind::Colon, "`:`")?;
            let value = self.value()?;
            if let Some(previous) = object.insert(key.clone(), key_token.span, value) {
                return Err(
                    Diagnostic::new(DiagnosticKind::DuplicateKey, self.span(key_token.span))
                        .message(&key)
                        .related_to(self.span(previous), "first defined here"),
                );
            }

            let token = self.bump()?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RBrace => {
                    self.depth -= 1;
                    return Ok(Node::new(open.span.cover(token.span), Value::Object(object)));
                }
                _ => return Err(self.unexpected(token, "`,` or `}`")),
            }
        }
    }

    fn array(&mut self, open: Token) -> Result<Node, Diagnostic> {
        self.enter(open.span)?;
        let mut items = Vec::new();

        if self.peek().is_some_and(|t| t.kind == TokenKind::RBracket) {
            let close = self.bump()?;
            self.depth -= 1;
            return Ok(Node::new(open.span.cover(close.span), Value::Array(items)));
        }

        loop {
            items.push(self.value()?);
            let token = self.bump()?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RBracket => {
                    self.depth -= 1;
                    return Ok(Node::new(open.span.cover(token.span), Value::Array(items)));
                }
                _ => return Err(self.unexpected(token, "`,` or `]`")),
            }
        }
    }
}
