//! The editable, format-preserving properties document.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

use dotprops_tokenizer::escape::{escape_key, escape_unicode, escape_value, unescape, unescape_unicode};
use dotprops_tokenizer::{Token, TokenKind, Tokenizer};
use indexmap::IndexMap;
use tracing::debug;

use crate::cursor::Cursor;
use crate::error::Error;

/// An ordered map of properties coupled to the token sequence it was read
/// from. Lookups go through the decoded index; every mutation is mirrored
/// into the token sequence so that storing the document reproduces all
/// untouched input bytes exactly.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// Source of truth for formatting. Concatenating all raw texts yields
    /// the serialized document.
    tokens: Vec<Token>,
    /// Decoded keys to decoded values, in key-token order.
    values: IndexMap<String, String>,
    /// Fallback chain for `get_property`; never touched by edits.
    defaults: Option<Box<Properties>>,
}

impl Properties {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty document with a fallback chain for [`Properties::get_property`].
    pub fn with_defaults(defaults: Properties) -> Self {
        Self {
            defaults: Some(Box::new(defaults)),
            ..Self::default()
        }
    }

    /// The fallback document, if any.
    pub fn defaults(&self) -> Option<&Properties> {
        self.defaults.as_deref()
    }

    /// Replace the fallback document.
    pub fn set_defaults(&mut self, defaults: Option<Properties>) {
        self.defaults = defaults.map(Box::new);
    }

    /// Read a document from UTF-8 bytes on a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        source.parse()
    }

    /// Read a document from a UTF-8 file. The handle is released on all
    /// paths, including errors.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        fs::read_to_string(path)?.parse()
    }

    /// Replace this document's contents with the parse of `source`.
    ///
    /// On a scan error the document keeps the tokens accumulated so far and
    /// an empty index; treat a failed load as fatal for the document.
    pub fn load_str(&mut self, source: &str) -> Result<(), Error> {
        self.tokens.clear();
        self.values.clear();
        for token in Tokenizer::new(source) {
            self.tokens.push(token?);
        }
        self.index_values();
        debug!(
            properties = self.values.len(),
            tokens = self.tokens.len(),
            "loaded document"
        );
        Ok(())
    }

    /// Rebuild the decoded index from the token sequence. The last value
    /// wins for duplicate keys; the first key token fixes the order.
    fn index_values(&mut self) {
        self.values.clear();
        let mut key = None;
        for token in &self.tokens {
            match token.kind() {
                TokenKind::Key => key = Some(token.text()),
                TokenKind::Value => {
                    if let Some(key) = key.take() {
                        self.values.insert(key.to_string(), token.text().to_string());
                    }
                }
                _ => {}
            }
        }
    }

    /// Number of properties in this document (defaults excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether this document has no properties (defaults excluded).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this document contains the key (defaults excluded).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The decoded value for a key in this document.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The raw (escaped) value text for a key in this document.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        let pos = self.key_position(key)?;
        Some(self.tokens[pos + 2].raw())
    }

    /// The decoded value for a key, consulting the defaults chain.
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.get(key)
            .or_else(|| self.defaults.as_ref().and_then(|d| d.get_property(key)))
    }

    /// The comment block attached to a key, one line per entry, each with
    /// its `#`/`!` prefix. Empty when the key is missing or uncommented.
    pub fn get_comment(&self, key: &str) -> Vec<String> {
        match self.key_position(key) {
            Some(pos) => comment_block(&self.tokens, pos)
                .into_iter()
                .map(|i| self.tokens[i].text().to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The comment block for a key, consulting the defaults chain.
    pub fn get_property_comment(&self, key: &str) -> Vec<String> {
        if self.values.contains_key(key) {
            self.get_comment(key)
        } else if let Some(defaults) = &self.defaults {
            defaults.get_property_comment(key)
        } else {
            Vec::new()
        }
    }

    /// All keys of this document and its defaults chain; defaults first,
    /// then this document's additions, each key once.
    pub fn string_property_names(&self) -> Vec<String> {
        let mut names = self
            .defaults
            .as_ref()
            .map(|d| d.string_property_names())
            .unwrap_or_default();
        for key in self.values.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        names
    }

    /// Iterate over keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over decoded key/value pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set a property, returning the previous value.
    ///
    /// An existing key keeps its position, separator, and surroundings; only
    /// the value token is rewritten. A new key is appended after the last
    /// property, or after the header comment block (detached by a blank
    /// line) in a document that has no properties yet.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        let raw_key = escape_key(&key).into_owned();
        let raw_value = escape_value(&value).into_owned();
        self.put_tokens(&key, raw_key, raw_value, &value);
        self.values.insert(key, value)
    }

    /// Set a property from pre-escaped text, returning the previous value.
    /// The raw forms are stored verbatim; decoded forms go into the index.
    pub fn put_raw(
        &mut self,
        raw_key: impl Into<String>,
        raw_value: impl Into<String>,
    ) -> Result<Option<String>, Error> {
        let raw_key = raw_key.into();
        let raw_value = raw_value.into();
        let key = unescape(&raw_key)?.into_owned();
        let value = unescape(&raw_value)?.into_owned();
        self.put_tokens(&key, raw_key, raw_value, &value);
        Ok(self.values.insert(key, value))
    }

    /// Set a property and replace its attached comment block in one step.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        comments: &[&str],
    ) {
        let key = key.into();
        self.put(key.clone(), value);
        if let Some(pos) = self.key_position(&key) {
            self.apply_comment(pos, comments);
        }
    }

    /// Replace the comment block attached to a key.
    ///
    /// Lines that already carry a `#`/`!` prefix are kept as given; other
    /// lines take the prefix of the block they join (`"# "` for a fresh
    /// block). Fails with [`Error::KeyNotFound`] when the key is missing.
    pub fn set_comment(&mut self, key: &str, comments: &[&str]) -> Result<(), Error> {
        let pos = self
            .key_position(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        self.apply_comment(pos, comments);
        Ok(())
    }

    /// Remove a property along with its attached comment block and trailing
    /// line terminator, returning the previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.key_position(key)?;
        self.apply_comment(pos, &[]);
        // comment removal shifted positions
        let pos = self.key_position(key)?;
        let mut cur = Cursor::at(&mut self.tokens, pos);
        cur.remove(); // key
        cur.remove(); // separator
        cur.remove(); // value
        if cur.is_eol() {
            cur.remove();
        }
        self.values.shift_remove(key)
    }

    /// Keep only the properties for which `keep` returns true. Removal goes
    /// through [`Properties::remove`], so tokens and comments follow along.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        let doomed: Vec<String> = self
            .values
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in doomed {
            self.remove(&key);
        }
    }

    /// Drop every token and property.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.values.clear();
    }

    /// Write the document as UTF-8 bytes.
    pub fn store<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for token in &self.tokens {
            writer.write_all(token.raw().as_bytes())?;
        }
        Ok(())
    }

    /// Write the document with `header` replacing the current header
    /// comment block, detached from the first property by a blank line.
    pub fn store_with_header<W: Write>(&self, writer: &mut W, header: &[&str]) -> io::Result<()> {
        if header.is_empty() {
            return self.store(writer);
        }
        let nl = self.newline();
        for line in normalize_comments(header, "# ") {
            writer.write_all(line.as_bytes())?;
            writer.write_all(nl.as_bytes())?;
        }
        writer.write_all(nl.as_bytes())?;
        for token in &self.tokens[header_end(&self.tokens)..] {
            writer.write_all(token.raw().as_bytes())?;
        }
        Ok(())
    }

    /// Write the document to a file. The handle is released on all paths.
    pub fn store_path(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_string())
    }

    /// A copy of this document with every character above U+00FF in raw key
    /// and value text replaced by `\uXXXX` escapes. Idempotent; the defaults
    /// chain is converted too. Edits to the copy do not propagate back.
    pub fn escaped(&self) -> Properties {
        self.transform_raw(&|raw| escape_unicode(raw).into_owned())
    }

    /// A copy of this document with every `\uXXXX` escape in raw key and
    /// value text replaced by the literal character. Idempotent; the
    /// defaults chain is converted too.
    pub fn unescaped(&self) -> Properties {
        self.transform_raw(&|raw| unescape_unicode(raw).into_owned())
    }

    fn transform_raw(&self, transform: &dyn Fn(&str) -> String) -> Properties {
        let tokens = self
            .tokens
            .iter()
            .map(|t| match t.kind() {
                TokenKind::Key | TokenKind::Value => {
                    Token::new(t.kind(), transform(t.raw()), Some(t.text().to_string()))
                }
                _ => t.clone(),
            })
            .collect();
        Properties {
            tokens,
            values: self.values.clone(),
            defaults: self
                .defaults
                .as_ref()
                .map(|d| Box::new(d.transform_raw(transform))),
        }
    }

    /// A self-contained document holding every property visible through
    /// this one: defaults first, this document's own entries shadowing
    /// them, comments carried over. The result has no defaults chain.
    pub fn flattened(&self) -> Properties {
        let mut flat = Properties::new();
        for name in self.string_property_names() {
            if let Some(value) = self.get_property(&name) {
                flat.put(name.clone(), value.to_string());
            }
            let comments = self.get_property_comment(&name);
            if !comments.is_empty() {
                let lines: Vec<&str> = comments.iter().map(String::as_str).collect();
                if let Some(pos) = flat.key_position(&name) {
                    flat.apply_comment(pos, &lines);
                }
            }
        }
        flat
    }

    /// Position of the key token whose decoded text is `key`.
    fn key_position(&self, key: &str) -> Option<usize> {
        self.tokens
            .iter()
            .position(|t| t.kind() == TokenKind::Key && t.text() == key)
    }

    /// Rewrite the value of an existing key in place, or append a new
    /// KEY/SEPARATOR/VALUE triple.
    fn put_tokens(&mut self, key: &str, raw_key: String, raw_value: String, value: &str) {
        let value_token = Token::value(raw_value, value);
        if let Some(pos) = self.key_position(key) {
            let mut cur = Cursor::at(&mut self.tokens, pos + 1);
            if cur.raw() == Some("") {
                // the line had no separator at all; give it one so the new
                // value reads back as written
                cur.replace(Token::separator("="));
            }
            cur.next();
            cur.replace(value_token);
        } else {
            let key_token = Token::key(raw_key, key);
            self.append_tokens(key_token, Token::separator("="), value_token);
        }
    }

    fn append_tokens(&mut self, key_token: Token, sep_token: Token, value_token: Token) {
        let nl = self.newline();
        if self.values.is_empty() {
            // nothing but comments and whitespace so far; insert after the
            // header block, detached from it by a blank line
            let pos = header_end(&self.tokens);
            let has_header = self.tokens[..pos]
                .iter()
                .any(|t| t.kind() == TokenKind::Comment);
            let mut pad = 0;
            if has_header {
                let mut eols = 0;
                while eols < pos && self.tokens[pos - 1 - eols].is_eol() {
                    eols += 1;
                }
                pad = 2usize.saturating_sub(eols);
            }
            let mut cur = Cursor::at(&mut self.tokens, pos);
            for _ in 0..pad {
                cur.add_eol(nl);
            }
            Self::finish_append(cur, nl, key_token, sep_token, value_token);
        } else {
            let mut cur = Cursor::last(&mut self.tokens);
            cur.prev_while(|t| matches!(t.kind(), TokenKind::Whitespace | TokenKind::Comment));
            // the cursor sits on the last value; step just past it and make
            // sure the old last line is terminated
            cur.next();
            if cur.is_eol() {
                cur.next();
            } else {
                cur.add_eol(nl);
            }
            Self::finish_append(cur, nl, key_token, sep_token, value_token);
        }
    }

    fn finish_append(
        mut cur: Cursor<'_>,
        nl: &str,
        key_token: Token,
        sep_token: Token,
        value_token: Token,
    ) {
        cur.add(key_token).add(sep_token).add(value_token);
        // never glue the new property onto trailing comments or whitespace
        if cur.has_token() && !cur.is_eol() {
            cur.add_eol(nl);
        }
    }

    /// Rewrite the comment block attached to the key at `key_pos`.
    fn apply_comment(&mut self, key_pos: usize, comments: &[&str]) {
        let block = comment_block(&self.tokens, key_pos);
        // the block's prefix comes from the comment nearest the key
        let prefix = block
            .last()
            .map(|&i| comment_prefix(self.tokens[i].raw()))
            .unwrap_or("# ");
        let lines = normalize_comments(comments, prefix);
        let keep = block.len().min(lines.len());
        for i in 0..keep {
            self.tokens[block[i]] = Token::comment(lines[i].clone());
        }
        if lines.len() < block.len() {
            // drop the rest of the old block, keeping the terminator of the
            // last kept comment
            let from = if keep == 0 {
                block[0]
            } else {
                let mut from = block[keep - 1] + 1;
                if self.tokens[from].is_eol() {
                    from += 1;
                }
                from
            };
            self.tokens.drain(from..key_pos);
        } else if lines.len() > block.len() {
            let nl = self.newline();
            let mut cur = Cursor::at(&mut self.tokens, key_pos);
            for line in &lines[keep..] {
                cur.add(Token::comment(line.clone()));
                cur.add_eol(nl);
            }
        }
    }

    /// The line terminator for newly synthesized lines: CRLF when the
    /// document uses CRLF exclusively, the platform default when it mixes
    /// CRLF and LF, LF otherwise.
    fn newline(&self) -> &'static str {
        let mut crlf = false;
        let mut lf = false;
        for token in &self.tokens {
            if token.is_eol() {
                if token.raw().ends_with("\r\n") {
                    crlf = true;
                } else if token.raw().ends_with('\n') {
                    lf = true;
                }
            }
        }
        match (crlf, lf) {
            (true, true) => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            (true, false) => "\r\n",
            _ => "\n",
        }
    }
}

impl FromStr for Properties {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut props = Properties::new();
        props.load_str(s)?;
        Ok(props)
    }
}

/// Writes the exact serialized document; for a freshly loaded document this
/// reproduces the input byte for byte.
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(token.raw())?;
        }
        Ok(())
    }
}

/// Positions of the comment block attached to the key at `key_pos`, in
/// document order.
///
/// Walking backward from the key: at most one inline whitespace, at most one
/// line terminator, then a comment, repeated. A blank line (two terminators
/// in a row) detaches any comments above it.
fn comment_block(tokens: &[Token], key_pos: usize) -> Vec<usize> {
    let mut block = Vec::new();
    let mut pos = key_pos;
    loop {
        let mut probe = pos;
        if probe > 0 && tokens[probe - 1].is_ws() {
            probe -= 1;
        }
        if probe > 0 && tokens[probe - 1].is_eol() {
            probe -= 1;
        }
        if probe > 0 && tokens[probe - 1].kind() == TokenKind::Comment {
            block.push(probe - 1);
            pos = probe - 1;
        } else {
            break;
        }
    }
    block.reverse();
    block
}

/// Position of the first content after the header comment block: leading
/// whitespace, comments, and their terminators, plus any trailing blank
/// lines. Returns 0 when the leading comments are attached to the first
/// property (no blank line between them), i.e. there is no header.
fn header_end(tokens: &[Token]) -> usize {
    let mut pos = 0;
    if tokens.get(pos).is_some_and(Token::is_ws) {
        pos += 1;
    }
    while tokens.get(pos).is_some_and(|t| t.kind() == TokenKind::Comment) {
        pos += 1;
        if tokens.get(pos).is_some_and(Token::is_eol) {
            pos += 1;
        }
        if tokens.get(pos).is_some_and(Token::is_ws) {
            pos += 1;
        }
    }
    if tokens.get(pos).is_some_and(|t| t.kind() == TokenKind::Key) {
        return 0;
    }
    while tokens.get(pos).is_some_and(Token::is_eol) {
        pos += 1;
    }
    pos
}

/// The prefix family of a comment line: the comment character plus one
/// space when present.
fn comment_prefix(comment: &str) -> &'static str {
    if comment.starts_with("# ") {
        "# "
    } else if comment.starts_with('#') {
        "#"
    } else if comment.starts_with("! ") {
        "! "
    } else {
        "!"
    }
}

/// Prefix bare lines with the running prefix; lines that already carry a
/// comment prefix keep it and it becomes the running prefix.
fn normalize_comments(lines: &[&str], prefix: &str) -> Vec<String> {
    let mut prefix = prefix.to_string();
    lines
        .iter()
        .map(|line| {
            if line.starts_with('#') || line.starts_with('!') {
                prefix = comment_prefix(line).to_string();
                (*line).to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}
