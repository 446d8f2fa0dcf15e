//! Text parser for selection-filter expressions.
//!
//! Accepts the parenthesized prefix syntax used by native-code selection
//! filters, e.g. `(&(os=linux)(osversion>=5.0))`. Only the operators the
//! filter algebra supports are recognized: `=` (equality or `*`
//! substring), `>=`, `<=`, and the `&`/`|`/`!` combinators.

use crate::expr::Filter;
use lattice_core::{ManifestError, ManifestResult, Version};

/// Parse a selection-filter expression
///
/// # Errors
///
/// Returns [`ManifestError::InvalidFilter`] on syntax errors, trailing
/// input, or an unparsable version bound.
pub fn parse_filter(input: &str) -> ManifestResult<Filter> {
    let mut parser = Parser {
        input: input.trim(),
        pos: 0,
    };
    let filter = parser.parse_node()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(parser.error("trailing characters after filter"));
    }
    Ok(filter)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> ManifestError {
        ManifestError::filter(format!("{reason} at offset {} in: {}", self.pos, self.input))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, c: char) -> ManifestResult<()> {
        if self.bump() == Some(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn parse_node(&mut self) -> ManifestResult<Filter> {
        self.skip_whitespace();
        self.expect('(')?;
        self.skip_whitespace();
        let node = match self.peek() {
            Some('&') => {
                self.bump();
                Filter::And(self.parse_list()?)
            }
            Some('|') => {
                self.bump();
                Filter::Or(self.parse_list()?)
            }
            Some('!') => {
                self.bump();
                Filter::Not(Box::new(self.parse_node()?))
            }
            Some(_) => self.parse_comparison()?,
            None => return Err(self.error("unexpected end of filter")),
        };
        self.skip_whitespace();
        self.expect(')')?;
        Ok(node)
    }

    fn parse_list(&mut self) -> ManifestResult<Vec<Filter>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('(') => items.push(self.parse_node()?),
                Some(')') if !items.is_empty() => return Ok(items),
                _ => return Err(self.error("expected sub-filter")),
            }
        }
    }

    fn parse_comparison(&mut self) -> ManifestResult<Filter> {
        let start = self.pos;
        let rest = &self.input[start..];
        let op_pos = rest
            .find(['=', '<', '>'])
            .ok_or_else(|| self.error("expected comparison operator"))?;
        let key = rest[..op_pos].trim().to_string();
        if key.is_empty() {
            return Err(self.error("empty property name"));
        }

        self.pos = start + op_pos;
        let op = match self.bump() {
            Some('=') => Op::Eq,
            Some('>') => {
                self.expect('=')?;
                Op::Gte
            }
            Some('<') => {
                self.expect('=')?;
                Op::Lte
            }
            _ => return Err(self.error("expected comparison operator")),
        };

        let rest = &self.input[self.pos..];
        let end = rest
            .find(')')
            .ok_or_else(|| self.error("unterminated comparison"))?;
        let value = rest[..end].trim().to_string();
        self.pos += end;

        match op {
            Op::Eq if value.contains('*') => Ok(Filter::substring(key, &value)),
            Op::Eq => Ok(Filter::Eq { key, value }),
            Op::Gte => Ok(Filter::Gte {
                key,
                value: self.parse_version(&value)?,
            }),
            Op::Lte => Ok(Filter::Lte {
                key,
                value: self.parse_version(&value)?,
            }),
        }
    }

    fn parse_version(&self, value: &str) -> ManifestResult<Version> {
        Version::parse(value)
            .map_err(|_| ManifestError::filter(format!("not a version bound: {value}")))
    }
}

enum Op {
    Eq,
    Gte,
    Lte,
}
