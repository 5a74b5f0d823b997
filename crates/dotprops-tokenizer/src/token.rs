//! Token types for the properties tokenizer.

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The key of a property line, up to the first unescaped separator.
    Key,
    /// The run of characters between a key and its value: spaces, tabs,
    /// and at most one `=` or `:`.
    Separator,
    /// The value of a property line, including continuation lines.
    Value,
    /// A comment line starting with `#` or `!`, without its line terminator.
    Comment,
    /// Inline whitespace and/or a single line terminator.
    Whitespace,
}

/// A token with its kind, raw source text, and (for keys and values with
/// escape sequences) the decoded text.
///
/// Tokens own their text so that a document can synthesize new tokens long
/// after the source they were scanned from is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    raw: String,
    /// Escape-resolved text; `None` when it would equal `raw`.
    decoded: Option<String>,
}

impl Token {
    /// Create a new token. A decoded form equal to the raw text is not
    /// stored; [`Token::text`] falls back to the raw text.
    pub fn new(kind: TokenKind, raw: impl Into<String>, decoded: Option<String>) -> Self {
        let raw = raw.into();
        let decoded = decoded.filter(|d| *d != raw);
        Self { kind, raw, decoded }
    }

    /// A key token with the given raw and decoded text.
    pub fn key(raw: impl Into<String>, decoded: impl Into<String>) -> Self {
        Self::new(TokenKind::Key, raw, Some(decoded.into()))
    }

    /// A separator token.
    pub fn separator(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Separator, raw, None)
    }

    /// A value token with the given raw and decoded text.
    pub fn value(raw: impl Into<String>, decoded: impl Into<String>) -> Self {
        Self::new(TokenKind::Value, raw, Some(decoded.into()))
    }

    /// A comment token. The text must start with `#` or `!` and contain no
    /// line terminator.
    pub fn comment(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Comment, raw, None)
    }

    /// A whitespace token.
    pub fn whitespace(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Whitespace, raw, None)
    }

    /// The kind of this token.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The exact source text of this token.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The decoded text, if it differs from the raw text.
    pub fn decoded(&self) -> Option<&str> {
        self.decoded.as_deref()
    }

    /// The logical text: decoded if escapes were present, raw otherwise.
    pub fn text(&self) -> &str {
        self.decoded.as_deref().unwrap_or(&self.raw)
    }

    /// Whether this token is whitespace ending in a line terminator.
    pub fn is_eol(&self) -> bool {
        self.kind == TokenKind::Whitespace && self.raw.ends_with(['\n', '\r'])
    }

    /// Whether this token is inline whitespace (no line terminator).
    pub fn is_ws(&self) -> bool {
        self.kind == TokenKind::Whitespace && !self.is_eol()
    }
}
