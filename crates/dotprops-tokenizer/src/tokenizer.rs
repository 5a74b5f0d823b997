//! State-machine scanner for properties documents.

use tracing::trace;

use crate::escape;
use crate::{Token, TokenKind};

/// An error produced while scanning malformed input.
///
/// The only malformed construct the format admits is a `\uXXXX` escape
/// without four hex digits, or one naming an unpaired UTF-16 surrogate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    offset: u32,
    message: String,
}

impl ScanError {
    pub(crate) fn new(offset: u32, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset in the source where the error occurred.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for ScanError {}

/// Which part of a property line the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Key,
    Separator,
    Value,
}

/// A tokenizer that produces properties tokens from source text.
///
/// Every key is followed by exactly one separator and one value token, even
/// when a line has no separator at all (both are then empty), so consumers
/// can rely on uniform KEY/SEPARATOR/VALUE triples.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    state: State,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            state: State::None,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token {
        self.token_decoded(kind, start, None)
    }

    fn token_decoded(&self, kind: TokenKind, start: u32, decoded: Option<String>) -> Token {
        let raw = &self.source[start as usize..self.pos as usize];
        trace!("token {:?} at {}..{}: {:?}", kind, start, self.pos, raw);
        Token::new(kind, raw, decoded)
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        match self.state {
            State::None => match self.peek() {
                None => Ok(None),
                Some(c) if is_comment_char(c) => Ok(Some(self.scan_comment())),
                Some(c) if is_whitespace_char(c) => Ok(Some(self.scan_whitespace())),
                Some(_) => self.scan_key().map(Some),
            },
            State::Key => self.scan_key().map(Some),
            State::Separator => Ok(Some(self.scan_separator())),
            State::Value => self.scan_value().map(Some),
        }
    }

    /// A comment runs from `#`/`!` to the end of the line, terminator
    /// excluded. No escapes are interpreted.
    fn scan_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_eol_char(c) {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    /// Whitespace stops right after one line terminator, so a single token
    /// holds at most one of CR, LF, or CRLF. Inline whitespace on the next
    /// line starts a new token.
    fn scan_whitespace(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\u{c}' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    break;
                }
                '\r' => {
                    self.advance();
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    break;
                }
                _ => break,
            }
        }
        self.token(TokenKind::Whitespace, start)
    }

    /// A key runs to the first unescaped separator character, or to the end
    /// of the line for a separator-less property.
    fn scan_key(&mut self) -> Result<Token, ScanError> {
        self.state = State::Key;
        let start = self.pos;
        let mut decoded = None;
        while let Some(c) = self.peek() {
            if is_separator_char(c) || is_eol_char(c) {
                break;
            }
            if c == '\\' {
                self.scan_escape(start, &mut decoded, false)?;
            } else {
                self.advance();
                if let Some(d) = decoded.as_mut() {
                    d.push(c);
                }
            }
        }
        self.state = State::Separator;
        Ok(self.token_decoded(TokenKind::Key, start, decoded))
    }

    /// At most one `=` or `:` is structural; a second one belongs to the
    /// value.
    fn scan_separator(&mut self) -> Token {
        let start = self.pos;
        let mut seen_assign = false;
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' => {
                    self.advance();
                }
                '=' | ':' if !seen_assign => {
                    seen_assign = true;
                    self.advance();
                }
                _ => break,
            }
        }
        self.state = State::Value;
        self.token(TokenKind::Separator, start)
    }

    /// A value runs to the end of the line, trailing inline whitespace
    /// included, spanning continuation lines.
    fn scan_value(&mut self) -> Result<Token, ScanError> {
        let start = self.pos;
        let mut decoded = None;
        while let Some(c) = self.peek() {
            if is_eol_char(c) {
                break;
            }
            if c == '\\' {
                self.scan_escape(start, &mut decoded, true)?;
            } else {
                self.advance();
                if let Some(d) = decoded.as_mut() {
                    d.push(c);
                }
            }
        }
        self.state = State::None;
        Ok(self.token_decoded(TokenKind::Value, start, decoded))
    }

    /// Consume a backslash escape, appending its decoded form.
    ///
    /// `continuations` is true inside a value, where `\` before a line
    /// terminator joins the next line (minus its leading whitespace) into
    /// the same logical value. Everywhere else a backslash before an
    /// unrecognized character stands for that character.
    fn scan_escape(
        &mut self,
        start: u32,
        decoded: &mut Option<String>,
        continuations: bool,
    ) -> Result<(), ScanError> {
        let d =
            decoded.get_or_insert_with(|| self.source[start as usize..self.pos as usize].to_string());
        self.advance();
        match self.peek() {
            // a trailing backslash at end of input escapes nothing
            None => Ok(()),
            Some('u') => {
                self.advance();
                let c = self.scan_unicode_escape()?;
                d.push(c);
                Ok(())
            }
            Some('t') => {
                self.advance();
                d.push('\t');
                Ok(())
            }
            Some('n') => {
                self.advance();
                d.push('\n');
                Ok(())
            }
            Some('r') => {
                self.advance();
                d.push('\r');
                Ok(())
            }
            Some('f') => {
                self.advance();
                d.push('\u{c}');
                Ok(())
            }
            Some(c) if continuations && is_eol_char(c) => {
                // Line continuation: the terminator and the next line's
                // leading whitespace stay in raw but not in the decoded text.
                self.advance();
                if c == '\r' && self.peek() == Some('\n') {
                    self.advance();
                }
                while matches!(self.peek(), Some(' ' | '\t' | '\u{c}')) {
                    self.advance();
                }
                Ok(())
            }
            Some(c) => {
                self.advance();
                d.push(c);
                Ok(())
            }
        }
    }

    /// Decode the four hex digits of a `\uXXXX` escape. A UTF-16 high
    /// surrogate must be followed by a low-surrogate escape.
    fn scan_unicode_escape(&mut self) -> Result<char, ScanError> {
        let escape_start = self.pos;
        let high = self.scan_hex4()?;
        if let Some(c) = char::from_u32(high) {
            return Ok(c);
        }
        if escape::is_high_surrogate(high) && self.starts_with("\\u") {
            self.advance();
            self.advance();
            let low = self.scan_hex4()?;
            if let Some(c) = escape::surrogate_pair(high, low) {
                return Ok(c);
            }
        }
        Err(ScanError::new(
            escape_start,
            format!("unpaired surrogate escape \\u{high:04x}"),
        ))
    }

    fn scan_hex4(&mut self) -> Result<u32, ScanError> {
        let mut code = 0;
        for _ in 0..4 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => {
                    let found = self
                        .peek()
                        .map_or_else(|| "end of input".to_string(), |c| format!("{c:?}"));
                    return Err(ScanError::new(
                        self.pos,
                        format!("invalid unicode escape character: {found}"),
                    ));
                }
            }
        }
        Ok(code)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn is_separator_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '=' | ':')
}

fn is_whitespace_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}' | '\n' | '\r')
}

fn is_eol_char(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_comment_char(c: char) -> bool {
    matches!(c, '#' | '!')
}
