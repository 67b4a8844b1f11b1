//! Buffered character cursor with bounded lookahead.
//!
//! The cursor pulls characters from a [`CharacterSource`] into an internal
//! buffer and exposes peek/consume operations over it. Peeking suspends the
//! caller until enough characters are buffered or the source ends; this is
//! the *only* suspension point in the whole parser. The buffer grows
//! monotonically and is never trimmed, so the entire document is retained in
//! memory for the lifetime of the parse.

use crate::{
    error::{ParseError, Position},
    source::CharacterSource,
};

/// A lookahead cursor over an asynchronous character stream.
#[derive(Debug)]
pub struct Cursor<S> {
    source: S,
    /// Characters pulled from the source so far, consumed and unconsumed.
    buffer: Vec<char>,
    /// Read index into `buffer`; everything before it has been consumed.
    /// Invariant: `index <= buffer.len()`.
    index: usize,
    /// Once the source reports end of stream, the buffer never grows again.
    ended: bool,
    line: usize,
    column: usize,
}

impl<S: CharacterSource> Cursor<S> {
    /// Creates a cursor over `source` positioned at line 1, column 1.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            index: 0,
            ended: false,
            line: 1,
            column: 1,
        }
    }

    /// The current position, pointing at the next unconsumed character.
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            offset: self.index,
            line: self.line,
            column: self.column,
        }
    }

    /// Grows the buffer until `n` unconsumed characters are available.
    /// Returns `false` if the source ends first.
    async fn fill(&mut self, n: usize) -> bool {
        while self.buffer.len() - self.index < n {
            if self.ended {
                return false;
            }
            match self.source.pull().await {
                Some(c) => self.buffer.push(c),
                None => self.ended = true,
            }
        }
        true
    }

    /// Returns the next `n` characters without consuming them, suspending
    /// until they are available. `None` if the source ends before `n`
    /// characters exist.
    pub async fn peek(&mut self, n: usize) -> Option<&[char]> {
        if !self.fill(n).await {
            return None;
        }
        Some(&self.buffer[self.index..self.index + n])
    }

    /// [`peek`](Self::peek) for a single character.
    pub async fn peek_char(&mut self) -> Option<char> {
        if !self.fill(1).await {
            return None;
        }
        Some(self.buffer[self.index])
    }

    /// Like [`peek_char`](Self::peek_char), but end of input is a parse
    /// error.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedEndOfInput`] if the source ends first.
    pub async fn peek_char_required(&mut self) -> Result<char, ParseError> {
        let at = self.position();
        self.peek_char()
            .await
            .ok_or(ParseError::UnexpectedEndOfInput { at })
    }

    /// Consumes and returns the next `n` characters, or `None` if the source
    /// ends before `n` characters exist (in which case nothing is consumed).
    pub async fn next(&mut self, n: usize) -> Option<String> {
        if !self.fill(n).await {
            return None;
        }
        let taken: String = self.buffer[self.index..self.index + n].iter().collect();
        self.advance(n);
        Some(taken)
    }

    /// Consumes and returns the next character.
    pub async fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char().await?;
        self.advance(1);
        Some(c)
    }

    /// Like [`next_char`](Self::next_char), but end of input is a parse
    /// error.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedEndOfInput`] if the source ends first.
    pub async fn next_char_required(&mut self) -> Result<char, ParseError> {
        let at = self.position();
        self.next_char()
            .await
            .ok_or(ParseError::UnexpectedEndOfInput { at })
    }

    /// Consumes characters while they are JSON whitespace (space, tab, line
    /// feed, carriage return), stopping at the first significant character.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedEndOfInput`] if the source ends before a
    /// significant character arrives. Callers only skip whitespace where the
    /// grammar requires another token to follow.
    pub async fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_char_required().await? {
                ' ' | '\t' | '\n' | '\r' => {
                    self.advance(1);
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consumes exactly the characters of `literal`.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedToken`] on the first mismatching character
    /// (which is left unconsumed), or [`ParseError::UnexpectedEndOfInput`]
    /// if the source ends mid-literal.
    pub async fn expect(&mut self, literal: &str) -> Result<(), ParseError> {
        for expected in literal.chars() {
            let at = self.position();
            match self.peek_char().await {
                None => return Err(ParseError::UnexpectedEndOfInput { at }),
                Some(found) if found != expected => {
                    return Err(ParseError::UnexpectedToken { found, at });
                }
                Some(_) => self.advance(1),
            }
        }
        Ok(())
    }

    /// Advances the read index past `n` already-buffered characters,
    /// updating line/column accounting.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            let c = self.buffer[self.index];
            self.index += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}
