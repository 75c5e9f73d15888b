// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Minimal JSONPath for convergence checks.
//!
//! Supported: optional `$` root, `.field`, `['field']`, `["field"]`, `[N]`,
//! wildcards `.*` / `[*]` and filters `[?(@.field)]`, `[?(@.field == 'v')]`,
//! `[?(@.field != 'v')]`. A kubectl-style `{.status.phase}` wrapper and a bare
//! `status.phase` are accepted too. Dotted field names are limited to
//! alphanumerics, `_` and `-`; anything else needs the bracket form.

use crate::error::{ReconcileError, Result};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
    Filter(Filter),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
}

/// `[?(@.a.b)]` or `[?(@.a.b == 'literal')]`, applied to the elements of a list
#[derive(Clone, Debug, PartialEq, Eq)]
struct Filter {
    field: Vec<String>,
    test: Option<(Comparison, String)>,
}

impl Filter {
    fn matches(&self, element: &Value) -> bool {
        let found = self
            .field
            .iter()
            .try_fold(element, |current, key| current.as_object()?.get(key));

        match (&self.test, found) {
            (None, found) => found.is_some_and(|v| !v.is_null()),
            (Some((Comparison::Eq, literal)), Some(v)) => scalar_string(v) == *literal,
            (Some((Comparison::Eq, _)), None) => false,
            (Some((Comparison::Ne, literal)), found) => {
                found.map_or(true, |v| scalar_string(v) != *literal)
            }
        }
    }
}

/// A parsed path expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonPath {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: String| ReconcileError::InvalidJsonPath {
            expression: expression.to_string(),
            reason,
        };

        let mut body = expression.trim();
        if let Some(inner) = body.strip_prefix('{') {
            body = inner
                .strip_suffix('}')
                .ok_or_else(|| invalid("unclosed '{'".to_string()))?;
        }
        if body.is_empty() {
            return Err(invalid("empty expression".to_string()));
        }
        let body = body.strip_prefix('$').unwrap_or(body);

        let segments = Parser::new(body).segments().map_err(invalid)?;

        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    /// Every value this path points at, in document order
    pub fn find<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        self.segments
            .iter()
            .fold(vec![document], |current, segment| {
                current
                    .into_iter()
                    .flat_map(|value| select(value, segment))
                    .collect()
            })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn select<'a>(value: &'a Value, segment: &Segment) -> Vec<&'a Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(fields)) => fields.get(key).into_iter().collect(),
        (Segment::Index(index), Value::Array(items)) => items.get(*index).into_iter().collect(),
        (Segment::Wildcard, Value::Array(items)) => items.iter().collect(),
        (Segment::Wildcard, Value::Object(fields)) => fields.values().collect(),
        (Segment::Filter(filter), Value::Array(items)) => {
            items.iter().filter(|item| filter.matches(item)).collect()
        }
        _ => Vec::new(),
    }
}

/// String form used for comparisons: strings by content, null as "", other scalars as JSON text
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl Parser {
    fn new(body: &str) -> Self {
        Self {
            chars: body.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, wanted: char) -> ParseResult<()> {
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!("expected '{}', found '{}'", wanted, c)),
            None => Err(format!("expected '{}', found end of expression", wanted)),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn segments(&mut self) -> ParseResult<Vec<Segment>> {
        let mut segments = Vec::new();

        // bare leading field name, as in `status.phase`
        if self.peek().is_some_and(|c| c != '.' && c != '[') {
            segments.push(Segment::Key(self.dotted_key()?));
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    if self.peek() == Some('*') {
                        self.pos += 1;
                        segments.push(Segment::Wildcard);
                    } else {
                        segments.push(Segment::Key(self.dotted_key()?));
                    }
                }
                '[' => segments.push(self.bracket()?),
                c => return Err(format!("unexpected character '{}'", c)),
            }
        }

        Ok(segments)
    }

    fn dotted_key(&mut self) -> ParseResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_key_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                None | Some('.') | Some('[') => Err("empty field name".to_string()),
                Some(c) => Err(format!(
                    "'{}' is not allowed in a field name, use ['...'] instead",
                    c
                )),
            };
        }
        let key: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            None | Some('.') | Some('[') => Ok(key),
            Some(c) => Err(format!(
                "'{}' is not allowed in a field name, use ['...'] instead",
                c
            )),
        }
    }

    fn quoted(&mut self) -> ParseResult<String> {
        let quote = self.peek().ok_or("expected a quoted string")?;
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err("unterminated string".to_string());
        }
        let value = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(value)
    }

    fn bracket(&mut self) -> ParseResult<Segment> {
        self.expect('[')?;
        self.skip_whitespace();

        let segment = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some('\'') | Some('"') => Segment::Key(self.quoted()?),
            Some('?') => {
                self.pos += 1;
                Segment::Filter(self.filter()?)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                Segment::Index(digits.parse().map_err(|_| "index out of range")?)
            }
            _ => {
                return Err(
                    "brackets must hold a quoted field name, an index, '*' or a filter"
                        .to_string(),
                )
            }
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(segment)
    }

    fn filter(&mut self) -> ParseResult<Filter> {
        self.expect('(')?;
        self.skip_whitespace();
        self.expect('@')?;

        let mut field = Vec::new();
        while self.peek() == Some('.') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(is_key_char) {
                self.pos += 1;
            }
            if self.pos == start {
                return Err("empty field name in filter".to_string());
            }
            field.push(self.chars[start..self.pos].iter().collect());
        }
        if field.is_empty() {
            return Err("filter must test a field of '@'".to_string());
        }

        self.skip_whitespace();
        let test = match self.peek() {
            Some(')') => None,
            Some('=') | Some('!') => {
                let comparison = if self.peek() == Some('=') {
                    Comparison::Eq
                } else {
                    Comparison::Ne
                };
                self.pos += 1;
                self.expect('=')?;
                self.skip_whitespace();
                Some((comparison, self.literal()?))
            }
            _ => return Err("filter supports only '==' and '!='".to_string()),
        };

        self.skip_whitespace();
        self.expect(')')?;
        Ok(Filter { field, test })
    }

    fn literal(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some('\'') | Some('"') => self.quoted(),
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '.' || c == '-')
                {
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err("filter needs a value to compare with".to_string());
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
        }
    }
}
