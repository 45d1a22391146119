//! Release descriptor (`.rel`) parsing and projection.
//!
//! A descriptor is a single Erlang term,
//! `{release, {Name, Vsn}, {erts, ErtsVsn}, [{App, Vsn}, ...]}.`,
//! with `%` comments running to end of line. Application entries may carry
//! extra tuple elements (start types, included applications); only the
//! name and version are kept.

use crate::common::write_file_with_dirs;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Core applications kept by the minimal projection.
pub const CORE_APPLICATIONS: &[&str] = &["kernel", "stdlib"];

/// Descriptor syntax or shape violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected end of descriptor")]
    UnexpectedEof,
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
    },
}

/// One application entry: name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub version: String,
}

/// Parsed release descriptor. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub name: String,
    pub version: String,
    pub erts_version: String,
    pub applications: Vec<AppEntry>,
}

impl ReleaseDescriptor {
    /// Read and parse a descriptor file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read release descriptor {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Malformed release descriptor {}", path.display()))
    }

    /// Parse descriptor text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Parser::new(tokenize(text)?).release()
    }

    /// Projection keeping only the core applications, renamed to `name`.
    ///
    /// This is a filter, not a validation: a release listing neither core
    /// application projects to an empty application list.
    pub fn minimal(&self, name: &str) -> ReleaseDescriptor {
        ReleaseDescriptor {
            name: name.to_string(),
            version: self.version.clone(),
            erts_version: self.erts_version.clone(),
            applications: self
                .applications
                .iter()
                .filter(|app| CORE_APPLICATIONS.contains(&app.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Render back to `.rel` text.
    pub fn to_rel_text(&self) -> String {
        let apps = self
            .applications
            .iter()
            .map(|app| format!("{{{}, \"{}\"}}", app.name, app.version))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{{release, {{\"{}\", \"{}\"}}, {{erts, \"{}\"}},\n [{}]}}.\n",
            self.name, self.version, self.erts_version, apps
        )
    }

    /// Write the descriptor as a `.rel` file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_file_with_dirs(path, self.to_rel_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Atom(String),
    Str(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LBrace => "'{'".into(),
            Token::RBrace => "'}'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::Comma => "','".into(),
            Token::Dot => "'.'".into(),
            Token::Atom(a) => format!("atom '{a}'"),
            Token::Str(s) => format!("string \"{s}\""),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '%' => {
                // Comment to end of line.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' => {
                chars.next();
                tokens.push(Token::LBrace);
            }
            '}' => {
                chars.next();
                tokens.push(Token::RBrace);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ParseError::UnterminatedString),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            None => return Err(ParseError::UnterminatedString),
                            Some(esc) => s.push(esc),
                        },
                        Some(other) => s.push(other),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_lowercase() => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '@' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Atom(name));
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn peek(&self) -> Result<&Token, ParseError> {
        self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEof)
    }

    /// Consume the token if it matches.
    fn eat(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        let found = self.next()?;
        if found == token {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                expected,
                found: found.describe(),
            })
        }
    }

    fn expect_atom(&mut self, name: &'static str) -> Result<(), ParseError> {
        match self.next()? {
            Token::Atom(a) if a == name => Ok(()),
            found => Err(ParseError::Unexpected {
                expected: name,
                found: found.describe(),
            }),
        }
    }

    fn take_string(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.next()? {
            Token::Str(s) => Ok(s),
            found => Err(ParseError::Unexpected {
                expected,
                found: found.describe(),
            }),
        }
    }

    fn release(&mut self) -> Result<ReleaseDescriptor, ParseError> {
        self.expect(Token::LBrace, "'{'")?;
        self.expect_atom("release")?;
        self.expect(Token::Comma, "','")?;

        self.expect(Token::LBrace, "'{'")?;
        let name = self.take_string("release name")?;
        self.expect(Token::Comma, "','")?;
        let version = self.take_string("release version")?;
        self.expect(Token::RBrace, "'}'")?;
        self.expect(Token::Comma, "','")?;

        self.expect(Token::LBrace, "'{'")?;
        self.expect_atom("erts")?;
        self.expect(Token::Comma, "','")?;
        let erts_version = self.take_string("erts version")?;
        self.expect(Token::RBrace, "'}'")?;
        self.expect(Token::Comma, "','")?;

        self.expect(Token::LBracket, "'['")?;
        let mut applications = Vec::new();
        if !self.eat(&Token::RBracket) {
            loop {
                applications.push(self.application()?);
                if self.eat(&Token::RBracket) {
                    break;
                }
                self.expect(Token::Comma, "','")?;
            }
        }
        self.expect(Token::RBrace, "'}'")?;

        let _ = self.eat(&Token::Dot);
        if let Some(extra) = self.tokens.get(self.pos) {
            return Err(ParseError::Unexpected {
                expected: "end of descriptor",
                found: extra.describe(),
            });
        }

        Ok(ReleaseDescriptor {
            name,
            version,
            erts_version,
            applications,
        })
    }

    fn application(&mut self) -> Result<AppEntry, ParseError> {
        self.expect(Token::LBrace, "'{'")?;
        let name = match self.next()? {
            Token::Atom(a) => a,
            found => {
                return Err(ParseError::Unexpected {
                    expected: "application name",
                    found: found.describe(),
                })
            }
        };
        self.expect(Token::Comma, "','")?;
        let version = self.take_string("application version")?;

        // Extra tuple elements (start type, included applications) are
        // tolerated and dropped.
        while self.eat(&Token::Comma) {
            self.skip_term()?;
        }
        self.expect(Token::RBrace, "'}'")?;

        Ok(AppEntry { name, version })
    }

    /// Consume one balanced term without interpreting it.
    fn skip_term(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            Token::Atom(_) | Token::Str(_) => Ok(()),
            Token::LBrace => self.skip_until(&Token::RBrace),
            Token::LBracket => self.skip_until(&Token::RBracket),
            found => Err(ParseError::Unexpected {
                expected: "term",
                found: found.describe(),
            }),
        }
    }

    fn skip_until(&mut self, close: &Token) -> Result<(), ParseError> {
        loop {
            if self.eat(close) {
                return Ok(());
            }
            match self.peek()? {
                Token::LBrace | Token::LBracket => self.skip_term()?,
                _ => {
                    self.pos += 1;
                }
            }
        }
    }
}
