//! Command text tokenization.
//!
//! A token is a maximal run of non-whitespace characters, or the content of
//! a quoted block with its quotes stripped. Converters never see a pre-split
//! token list: they work on a [`Remainder`], a cursor over the raw text that
//! yields tokens on demand and exposes the unconsumed substring.
//!
//! Quoting rules:
//! - A token opens a quote only if its first character is an opening quote.
//!   Quote marks inside a word are part of the word.
//! - A closing quote ends the token only when followed by whitespace or the
//!   end of input.
//! - Inside quotes, `\` + closing quote yields the quote and `\\` a single
//!   backslash. `\` + opening quote at the start of a word yields a plain
//!   word beginning with the quote mark.
//! - An unterminated quote runs to the end of the input.

use std::ops::Range;

/// An opening/closing quote pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotePair {
    /// Opening quote character.
    pub open: char,
    /// Closing quote character.
    pub close: char,
}

impl QuotePair {
    /// Creates a quote pair.
    #[must_use]
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

/// Quote pairs recognised by [`Tokenizer::default`].
pub const DEFAULT_QUOTES: [QuotePair; 6] = [
    QuotePair::new('"', '"'),
    QuotePair::new('\'', '\''),
    QuotePair::new('«', '»'),
    QuotePair::new('「', '」'),
    QuotePair::new('“', '”'),
    QuotePair::new('‘', '’'),
];

/// Whether a token was written bare or quoted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of non-whitespace characters.
    Word,
    /// The content of a quoted block.
    Quoted,
}

/// A token from command text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Word or quoted block.
    pub kind: TokenKind,
    /// Token text with quotes and escapes removed.
    pub text: String,
    /// Byte range in the source text, quotes included.
    pub span: Range<usize>,
}

/// Quote-aware tokenizer.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    quotes: Vec<QuotePair>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            quotes: DEFAULT_QUOTES.to_vec(),
        }
    }
}

impl Tokenizer {
    /// Creates a tokenizer recognising the default quote pairs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tokenizer recognising only `quotes`.
    #[must_use]
    pub fn with_quotes(quotes: impl IntoIterator<Item = QuotePair>) -> Self {
        Self {
            quotes: quotes.into_iter().collect(),
        }
    }

    /// Returns the recognised quote pairs.
    #[must_use]
    pub fn quotes(&self) -> &[QuotePair] {
        &self.quotes
    }

    /// Splits `raw` into tokens.
    ///
    /// Leading and trailing whitespace is ignored; empty input yields no tokens.
    #[must_use]
    pub fn tokenize(&self, raw: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0;
        while let Some(token) = self.scan(raw, position) {
            position = token.span.end;
            tokens.push(token);
        }
        tokens
    }

    /// Returns a cursor over `raw`, starting at the beginning.
    #[must_use]
    pub fn cursor<'a>(&'a self, raw: &'a str) -> Remainder<'a> {
        self.remainder_from(raw, 0)
    }

    /// Returns a cursor over `raw` starting at byte `position`.
    ///
    /// `position` is clamped to the input length and moved back to the
    /// nearest character boundary.
    #[must_use]
    pub fn remainder_from<'a>(&'a self, raw: &'a str, position: usize) -> Remainder<'a> {
        let mut position = position.min(raw.len());
        while !raw.is_char_boundary(position) {
            position -= 1;
        }
        Remainder {
            text: raw,
            position,
            tokenizer: self,
        }
    }

    fn closing_quote(&self, open: char) -> Option<char> {
        self.quotes
            .iter()
            .find(|pair| pair.open == open)
            .map(|pair| pair.close)
    }

    /// Reads the token starting at or after byte `from`.
    fn scan(&self, text: &str, from: usize) -> Option<Token> {
        let rest = &text[from..];
        let skipped = rest.len() - rest.trim_start().len();
        let start = from + skipped;
        let mut chars = text[start..].char_indices().peekable();
        let (_, first) = chars.next()?;

        if let Some(close) = self.closing_quote(first) {
            let mut value = String::new();
            while let Some((offset, ch)) = chars.next() {
                let at = start + offset;
                match ch {
                    '\\' => match chars.peek() {
                        Some(&(_, next)) if next == close || next == '\\' => {
                            value.push(next);
                            chars.next();
                        }
                        _ => value.push(ch),
                    },
                    _ if ch == close => {
                        let ends = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
                        if ends {
                            return Some(Token {
                                kind: TokenKind::Quoted,
                                text: value,
                                span: start..at + ch.len_utf8(),
                            });
                        }
                        value.push(ch);
                    }
                    _ => value.push(ch),
                }
            }
            return Some(Token {
                kind: TokenKind::Quoted,
                text: value,
                span: start..text.len(),
            });
        }

        let end = text[start..]
            .find(char::is_whitespace)
            .map_or(text.len(), |offset| start + offset);
        let word = &text[start..end];
        let word = match word.strip_prefix('\\') {
            Some(unescaped)
                if unescaped
                    .chars()
                    .next()
                    .is_some_and(|ch| self.closing_quote(ch).is_some()) =>
            {
                unescaped
            }
            _ => word,
        };
        Some(Token {
            kind: TokenKind::Word,
            text: word.to_string(),
            span: start..end,
        })
    }
}

/// A cursor over unconsumed command text.
///
/// Cloning a remainder is cheap; converters snapshot one before consuming
/// and restore it to undo a partial parse.
#[derive(Clone, Copy, Debug)]
pub struct Remainder<'a> {
    text: &'a str,
    position: usize,
    tokenizer: &'a Tokenizer,
}

impl<'a> Remainder<'a> {
    /// Returns the unconsumed text, leading whitespace removed.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.text[self.position..].trim_start()
    }

    /// Returns true if only whitespace remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Returns the byte offset of the cursor in the source text.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the full source text.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.text
    }

    /// Returns the tokenizer driving this cursor.
    #[must_use]
    pub fn tokenizer(&self) -> &'a Tokenizer {
        self.tokenizer
    }

    /// Returns the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<Token> {
        self.tokenizer.scan(self.text, self.position)
    }

    /// Returns up to `n` upcoming tokens without consuming them.
    ///
    /// The result always has `n` entries; missing tokens are `None`.
    #[must_use]
    pub fn peek_tokens(&self, n: usize) -> Vec<Option<Token>> {
        let mut lookahead = *self;
        (0..n).map(|_| lookahead.next_token()).collect()
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.position = token.span.end;
        Some(token)
    }

    /// Consumes everything that remains and returns it.
    pub fn take_rest(&mut self) -> &'a str {
        let rest = self.as_str().trim_end();
        self.position = self.text.len();
        rest
    }

    /// Consumes `len` bytes of [`Remainder::as_str`].
    ///
    /// Used by manual converters whose consumption is not token-aligned.
    /// `len` is clamped to what remains and to a character boundary.
    pub fn consume(&mut self, len: usize) {
        let rest = self.as_str();
        let mut len = len.min(rest.len());
        while !rest.is_char_boundary(len) {
            len -= 1;
        }
        self.position = self.text.len() - rest.len() + len;
    }

    /// Moves the cursor back to a saved state.
    pub fn restore(&mut self, saved: Remainder<'a>) {
        self.position = saved.position;
    }
}

impl PartialEq for Remainder<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
