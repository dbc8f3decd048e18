// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone file text model
//!
//! This module provides a lossless, token-level model of a DNS zone file using nom.
//! It understands just enough of the master file format to find owner names, record
//! types and record values:
//!
//! - `[domain] [ttl] [class] type value...` records, with TTL and class optional
//!   and in either order
//! - parenthesized multi-line records (the usual SOA layout)
//! - `;` comments, quoted strings, blank lines
//! - `$TTL`, `$ORIGIN` and other directives, passed through untouched
//!
//! Every byte of the input is kept in a token, so rendering a parsed [`Zone`] gives
//! back exactly the input. Only tokens rewritten with [`Entry::set_value`] or added
//! with [`Zone::append`] change the output.
//!
//! # Examples
//!
//! ```rust
//! use zonecar::zonefile::Zone;
//!
//! let text = "@ IN SOA ns1.example.com. admin.example.com. 1 3600 600 604800 86400\nwww IN A 192.0.2.1\n";
//! let mut zone = Zone::parse(text).unwrap();
//! assert_eq!(zone.to_string(), text);
//!
//! zone.append("mail", "A", "192.0.2.25").unwrap();
//! assert!(zone.to_string().ends_with("www IN A 192.0.2.1\nmail A 192.0.2.25"));
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::{map, recognize},
    sequence::preceded,
    IResult,
};
use std::fmt;
use thiserror::Error;

/// Record type of the start-of-authority record
pub const SOA_TYPE: &str = "SOA";

/// Record types that always carry exactly one value
const SINGLE_VALUE_TYPES: &[&str] = &["A", "AAAA", "PTR"];

/// DNS classes that may appear between the owner name and the type
const CLASSES: &[&str] = &["IN", "CH", "HS", "CS"];

/// Zone file parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneParseError {
    #[error("Zone file is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Line {line}: illegal character {ch:?}")]
    IllegalCharacter { line: usize, ch: char },

    #[error("Line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },

    #[error("Line {line}: unbalanced ')'")]
    UnbalancedParen { line: usize },

    #[error("Line {line}: '(' is never closed")]
    UnclosedParen { line: usize },

    #[error("Line {line}: record has no type")]
    MissingType { line: usize },

    #[error("Line {line}: invalid record type {rtype:?}")]
    InvalidType { line: usize, rtype: String },

    #[error("Line {line}: {rtype} record has no value")]
    MissingValue { line: usize, rtype: String },

    #[error("Line {line}: {rtype} record expects {expected} value(s), found {actual}")]
    FieldCount {
        line: usize,
        rtype: String,
        expected: usize,
        actual: usize,
    },

    #[error("Line {line}: second SOA record (first one is on line {first})")]
    DuplicateSoa { line: usize, first: usize },

    #[error("Invalid zone file field: {0:?}")]
    InvalidField(String),
}

pub type ParseResult<T> = Result<T, ZoneParseError>;

// ========== Tokens ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Blank,
    Newline,
    Comment,
    Open,
    Close,
    Quoted,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }

    /// Words and quoted strings are the fields of a record
    fn is_field(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Quoted)
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_control() && !matches!(c, ' ' | ';' | '(' | ')' | '"')
}

fn blank(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c == ' ' || c == '\t')(input)
}

fn newline(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n")))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char(';'), take_while(|c| c != '\n' && c != '\r')))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

/// Parse a quoted string, keeping the quotes: "some text"
///
/// Backslash escapes the next character. A quoted string may not span lines.
fn quoted(input: &str) -> IResult<&str, &str> {
    let (rest, _) = char('"')(input)?;
    let mut escaped = false;
    for (idx, c) in rest.char_indices() {
        match c {
            '\n' => break,
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                let end = 1 + idx + c.len_utf8();
                return Ok((&input[end..], &input[..end]));
            }
            _ => escaped = false,
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(newline, |t| Token::new(TokenKind::Newline, t)),
        map(blank, |t| Token::new(TokenKind::Blank, t)),
        map(comment, |t| Token::new(TokenKind::Comment, t)),
        map(char('('), |_| Token::new(TokenKind::Open, "(")),
        map(char(')'), |_| Token::new(TokenKind::Close, ")")),
        map(quoted, |t| Token::new(TokenKind::Quoted, t)),
        map(word, |t| Token::new(TokenKind::Word, t)),
    ))(input)
}

/// Turn a tokenizer failure at `rest` into a descriptive error
fn unparsable(rest: &str, line: usize) -> ZoneParseError {
    match rest.chars().next() {
        Some('"') => ZoneParseError::UnterminatedQuote { line },
        Some(ch) => ZoneParseError::IllegalCharacter { line, ch },
        None => ZoneParseError::IllegalCharacter { line, ch: '\0' },
    }
}

// ========== Field classification ==========

/// TTL field: plain seconds (3600) or BIND duration units (1h30m, 1w)
fn is_ttl(field: &str) -> bool {
    field.starts_with(|c: char| c.is_ascii_digit())
        && field
            .chars()
            .all(|c| c.is_ascii_digit() || "smhdwSMHDW".contains(c))
}

fn is_class(field: &str) -> bool {
    CLASSES.iter().any(|class| class.eq_ignore_ascii_case(field))
}

/// Check whether `rtype` is a well-formed record type mnemonic (A, AAAA, TYPE65534)
pub fn is_record_type(rtype: &str) -> bool {
    let mut chars = rtype.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Check whether `field` can be written into a zone file as one plain token
///
/// Plain tokens contain no whitespace, control characters, quotes, parentheses or
/// comment markers, and do not start with `$`.
pub fn is_plain_field(field: &str) -> bool {
    !field.is_empty() && !field.starts_with('$') && field.chars().all(is_word_char)
}

// ========== Entries ==========

#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryKind {
    /// Blank or comment-only line
    Trivia,
    /// `$TTL`, `$ORIGIN`, `$INCLUDE`, ...
    Directive,
    /// Resource record; indices point into the entry's tokens
    Record {
        domain: Option<usize>,
        rtype: usize,
        values: Vec<usize>,
    },
}

/// One logical line of a zone file, including its line terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    tokens: Vec<Token>,
    line: usize,
    kind: EntryKind,
}

impl Entry {
    fn classify(tokens: Vec<Token>, line: usize) -> ParseResult<Self> {
        let fields: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_field())
            .map(|(i, _)| i)
            .collect();

        let Some(&first) = fields.first() else {
            return Ok(Self {
                tokens,
                line,
                kind: EntryKind::Trivia,
            });
        };

        if first == 0 && tokens[0].text.starts_with('$') {
            return Ok(Self {
                tokens,
                line,
                kind: EntryKind::Directive,
            });
        }

        // An owner name is only present when the line does not start with a blank
        let domain = (first == 0).then_some(0);
        let mut rest = &fields[usize::from(domain.is_some())..];

        let mut skipped = 0;
        while skipped < 2 {
            match rest.first() {
                Some(&i) if is_ttl(&tokens[i].text) || is_class(&tokens[i].text) => {
                    rest = &rest[1..];
                    skipped += 1;
                }
                _ => break,
            }
        }

        let (&rtype, values) = rest
            .split_first()
            .ok_or(ZoneParseError::MissingType { line })?;

        let type_token = &tokens[rtype];
        if type_token.kind != TokenKind::Word || !is_record_type(&type_token.text) {
            return Err(ZoneParseError::InvalidType {
                line,
                rtype: type_token.text.clone(),
            });
        }

        if values.is_empty() {
            return Err(ZoneParseError::MissingValue {
                line,
                rtype: type_token.text.clone(),
            });
        }

        if SINGLE_VALUE_TYPES.contains(&type_token.text.as_str()) && values.len() != 1 {
            return Err(ZoneParseError::FieldCount {
                line,
                rtype: type_token.text.clone(),
                expected: 1,
                actual: values.len(),
            });
        }

        let values = values.to_vec();
        Ok(Self {
            tokens,
            line,
            kind: EntryKind::Record {
                domain,
                rtype,
                values,
            },
        })
    }

    /// Line number (1-based) where this entry starts
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether this entry is a resource record
    pub fn is_record(&self) -> bool {
        matches!(self.kind, EntryKind::Record { .. })
    }

    /// Owner name as written, or `None` when the line starts with a blank
    pub fn domain(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Record {
                domain: Some(idx), ..
            } => Some(&self.tokens[*idx].text),
            _ => None,
        }
    }

    /// Record type as written
    pub fn record_type(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Record { rtype, .. } => Some(&self.tokens[*rtype].text),
            _ => None,
        }
    }

    /// Record values in order, without parentheses or comments
    pub fn values(&self) -> Vec<&str> {
        match &self.kind {
            EntryKind::Record { values, .. } => values
                .iter()
                .map(|idx| self.tokens[*idx].text.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Overwrite the value at `index`, leaving all surrounding text untouched
    ///
    /// `value` must be a plain field (see [`is_plain_field`]).
    ///
    /// # Returns
    /// The previous value, or `None` if this entry has no value at `index`
    pub fn set_value(&mut self, index: usize, value: &str) -> Option<String> {
        let EntryKind::Record { values, .. } = &self.kind else {
            return None;
        };
        let token = &mut self.tokens[*values.get(index)?];
        token.kind = TokenKind::Word;
        Some(std::mem::replace(&mut token.text, value.to_string()))
    }

    fn ends_with_newline(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Newline)
    }

    fn newline_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

// ========== Zone ==========

/// Parsed zone file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zone {
    entries: Vec<Entry>,
}

impl Zone {
    /// Parse zone file bytes
    ///
    /// # Errors
    /// Returns an error if the bytes are not UTF-8 or any line is malformed
    pub fn from_bytes(bytes: &[u8]) -> ParseResult<Self> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| ZoneParseError::InvalidUtf8(e.to_string()))?;
        Self::parse(text)
    }

    /// Parse zone file text
    ///
    /// The whole text must parse; there is no best-effort mode.
    pub fn parse(text: &str) -> ParseResult<Self> {
        let mut entries = Vec::new();
        let mut current = Vec::new();
        let mut start_line = 1;
        let mut line = 1;
        let mut depth = 0usize;
        let mut open_line = 0;
        let mut rest = text;

        while !rest.is_empty() {
            let (remaining, tok) = token(rest).map_err(|_| unparsable(rest, line))?;
            rest = remaining;

            match tok.kind {
                TokenKind::Open => {
                    if depth == 0 {
                        open_line = line;
                    }
                    depth += 1;
                }
                TokenKind::Close => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(ZoneParseError::UnbalancedParen { line })?;
                }
                _ => {}
            }

            let ends_entry = tok.kind == TokenKind::Newline && depth == 0;
            if tok.kind == TokenKind::Newline {
                line += 1;
            }
            current.push(tok);

            if ends_entry {
                entries.push(Entry::classify(std::mem::take(&mut current), start_line)?);
                start_line = line;
            }
        }

        if depth > 0 {
            return Err(ZoneParseError::UnclosedParen { line: open_line });
        }
        if !current.is_empty() {
            entries.push(Entry::classify(current, start_line)?);
        }

        let mut first_soa = None;
        for entry in entries.iter().filter(|e| e.record_type() == Some(SOA_TYPE)) {
            match first_soa {
                None => first_soa = Some(entry.line),
                Some(first) => {
                    return Err(ZoneParseError::DuplicateSoa {
                        line: entry.line,
                        first,
                    })
                }
            }
        }

        Ok(Self { entries })
    }

    /// All entries, including blank lines, comments and directives
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Resource records in file order
    pub fn records(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_record())
    }

    /// Mutable resource records in file order
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut().filter(|e| e.is_record())
    }

    /// Number of resource records
    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    /// The zone's SOA record, if any
    pub fn soa(&self) -> Option<&Entry> {
        self.records().find(|e| e.record_type() == Some(SOA_TYPE))
    }

    /// Line terminator used by the zone: the last one in the text, or `\n` if none
    pub fn line_ending(&self) -> &str {
        self.entries
            .iter()
            .rev()
            .flat_map(|e| e.tokens.iter().rev())
            .find(|t| t.kind == TokenKind::Newline)
            .map_or("\n", |t| t.text.as_str())
    }

    /// Append a `domain type value` record at the end of the zone
    ///
    /// Fields are separated by single spaces and the new record carries no line
    /// terminator. If the current last entry is not terminated, the zone's
    /// [`line_ending`](Self::line_ending) is added to it first so existing records
    /// stay on their own lines.
    ///
    /// # Errors
    /// Returns [`ZoneParseError::InvalidField`] if a field is not a plain token
    pub fn append(&mut self, domain: &str, rtype: &str, value: &str) -> ParseResult<()> {
        for field in [domain, rtype, value] {
            if !is_plain_field(field) {
                return Err(ZoneParseError::InvalidField(field.to_string()));
            }
        }
        if !is_record_type(rtype) {
            return Err(ZoneParseError::InvalidField(rtype.to_string()));
        }

        let ending = self.line_ending().to_string();
        if let Some(last) = self.entries.last_mut() {
            if !last.ends_with_newline() {
                last.tokens.push(Token::new(TokenKind::Newline, &ending));
            }
        }

        let line = 1 + self.entries.iter().map(Entry::newline_count).sum::<usize>();
        self.entries.push(Entry {
            tokens: vec![
                Token::new(TokenKind::Word, domain),
                Token::new(TokenKind::Blank, " "),
                Token::new(TokenKind::Word, rtype),
                Token::new(TokenKind::Blank, " "),
                Token::new(TokenKind::Word, value),
            ],
            line,
            kind: EntryKind::Record {
                domain: Some(0),
                rtype: 2,
                values: vec![4],
            },
        });

        Ok(())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
