//! A positional handle over a token sequence.
//!
//! All structural edits to a document go through a [`Cursor`]: it keeps an
//! index into the token vector and offers typed queries, conditional
//! navigation, and insert/replace/remove primitives. The index ranges over
//! `[-1, len]`; `-1` and `len` are the before-start and past-end sentinels.

use dotprops_tokenizer::{Token, TokenKind};

/// A mutable cursor over a token sequence.
pub struct Cursor<'a> {
    tokens: &'a mut Vec<Token>,
    index: isize,
}

impl<'a> Cursor<'a> {
    /// A cursor on the first token (before-start if the sequence is empty).
    pub fn first(tokens: &'a mut Vec<Token>) -> Self {
        let index = if tokens.is_empty() { -1 } else { 0 };
        Self { tokens, index }
    }

    /// A cursor on the last token (before-start if the sequence is empty).
    pub fn last(tokens: &'a mut Vec<Token>) -> Self {
        let index = tokens.len() as isize - 1;
        Self { tokens, index }
    }

    /// A cursor at the given position.
    pub fn at(tokens: &'a mut Vec<Token>, index: usize) -> Self {
        debug_assert!(index <= tokens.len());
        Self {
            tokens,
            index: index as isize,
        }
    }

    /// Whether the cursor sits before the first token.
    pub fn at_start(&self) -> bool {
        self.index < 0
    }

    /// The current position, `-1` for before-start, `len` for past-end.
    pub fn position(&self) -> isize {
        self.index
    }

    /// Whether the cursor is on a token.
    pub fn has_token(&self) -> bool {
        self.index >= 0 && (self.index as usize) < self.tokens.len()
    }

    /// The current token, if the cursor is in bounds.
    pub fn token(&self) -> Option<&Token> {
        if self.has_token() {
            Some(&self.tokens[self.index as usize])
        } else {
            None
        }
    }

    /// Raw text of the current token.
    pub fn raw(&self) -> Option<&str> {
        self.token().map(Token::raw)
    }

    /// Logical text of the current token.
    pub fn text(&self) -> Option<&str> {
        self.token().map(Token::text)
    }

    /// Kind of the current token.
    pub fn kind(&self) -> Option<TokenKind> {
        self.token().map(Token::kind)
    }

    /// Whether the current token has the given kind.
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Whether the current token has one of the given kinds.
    pub fn is_any_kind(&self, kinds: &[TokenKind]) -> bool {
        self.kind().is_some_and(|k| kinds.contains(&k))
    }

    /// Whether the current token is inline whitespace.
    pub fn is_ws(&self) -> bool {
        self.token().is_some_and(Token::is_ws)
    }

    /// Whether the current token is whitespace ending in a line terminator.
    pub fn is_eol(&self) -> bool {
        self.token().is_some_and(Token::is_eol)
    }

    /// Step back one position, saturating at before-start.
    pub fn prev(&mut self) -> &mut Self {
        self.skip(-1)
    }

    /// Step forward one position, saturating at past-end.
    pub fn next(&mut self) -> &mut Self {
        self.skip(1)
    }

    /// Move by the given number of steps, saturating at the sentinels.
    pub fn skip(&mut self, steps: isize) -> &mut Self {
        self.index = (self.index + steps).clamp(-1, self.tokens.len() as isize);
        self
    }

    /// Advance one step iff the current token satisfies `accept`; returns
    /// whether a token is under the cursor afterwards.
    pub fn next_if(&mut self, accept: impl Fn(&Token) -> bool) -> bool {
        if self.token().is_some_and(|t| accept(t)) {
            self.next().has_token()
        } else {
            false
        }
    }

    /// Step back iff the current token satisfies `accept`; returns whether
    /// the step was taken.
    pub fn prev_if(&mut self, accept: impl Fn(&Token) -> bool) -> bool {
        if self.token().is_some_and(|t| accept(t)) {
            self.prev();
            true
        } else {
            false
        }
    }

    /// Advance while tokens satisfy `accept`.
    pub fn next_while(&mut self, accept: impl Fn(&Token) -> bool) -> &mut Self {
        while self.next_if(&accept) {}
        self
    }

    /// Step back while tokens satisfy `accept`.
    pub fn prev_while(&mut self, accept: impl Fn(&Token) -> bool) -> &mut Self {
        while self.prev_if(&accept) {}
        self
    }

    /// Advance while tokens satisfy `accept`, counting the steps taken.
    pub fn next_count(&mut self, accept: impl Fn(&Token) -> bool) -> usize {
        let mut count = 0;
        while self.next_if(&accept) {
            count += 1;
        }
        count
    }

    /// Step back while tokens satisfy `accept`, counting the steps taken.
    pub fn prev_count(&mut self, accept: impl Fn(&Token) -> bool) -> usize {
        let mut count = 0;
        while self.prev_if(&accept) {
            count += 1;
        }
        count
    }

    /// Insert a token before the current position and advance past it, so
    /// repeated calls append in order.
    pub fn add(&mut self, token: Token) -> &mut Self {
        let at = self.index.max(0) as usize;
        if at < self.tokens.len() {
            self.tokens.insert(at, token);
        } else {
            self.tokens.push(token);
        }
        self.index = at as isize + 1;
        self
    }

    /// Insert a line terminator token using the given newline text.
    pub fn add_eol(&mut self, newline: &str) -> &mut Self {
        self.add(Token::whitespace(newline))
    }

    /// Overwrite the current token. Panics if the cursor is out of bounds;
    /// callers position the cursor before editing.
    pub fn replace(&mut self, token: Token) -> &mut Self {
        self.tokens[self.index as usize] = token;
        self
    }

    /// Delete the current token; the cursor then references the token that
    /// followed it.
    pub fn remove(&mut self) -> Token {
        self.tokens.remove(self.index as usize)
    }

    /// A cursor at the same position, usable while this one is set aside.
    pub fn copy(&mut self) -> Cursor<'_> {
        Cursor {
            tokens: &mut *self.tokens,
            index: self.index,
        }
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token() {
            Some(token) => write!(f, "{token:?} @{}", self.index),
            None => write!(f, "@{}", self.index),
        }
    }
}
