//! Character sources feeding the parser.
//!
//! A source is an ordered, append-only sequence of characters with an
//! explicit end-of-stream signal. The parser owns the source for the
//! duration of the parse and dequeues from it strictly front-to-back;
//! producers may keep pushing characters at any time while the parse is in
//! flight. Closing the producing side is the "no more characters will ever
//! be pushed" signal.

use std::future::{self, Future};

use tokio::sync::mpsc;

/// An asynchronous, possibly slowly-filling stream of characters.
///
/// `pull` resolves to the next character, or to `None` once the stream is
/// exhausted *and* closed. A source that is merely empty (more characters
/// may still arrive) suspends the caller instead.
pub trait CharacterSource {
    /// Dequeues the next character, suspending while the source is empty but
    /// not yet closed.
    fn pull(&mut self) -> impl Future<Output = Option<char>> + Send;
}

/// The canonical streaming source: an unbounded channel of characters.
/// Dropping (or explicitly closing) the sender ends the stream.
impl CharacterSource for mpsc::UnboundedReceiver<char> {
    fn pull(&mut self) -> impl Future<Output = Option<char>> + Send {
        self.recv()
    }
}

/// Bounded-channel variant for producers that want backpressure.
impl CharacterSource for mpsc::Receiver<char> {
    fn pull(&mut self) -> impl Future<Output = Option<char>> + Send {
        self.recv()
    }
}

/// A source over a document that is already fully in memory. Never
/// suspends.
///
/// # Examples
///
/// ```rust
/// use livejson::{StreamingParser, TextSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let parser = StreamingParser::with_defaults(TextSource::new("[1, 2, 3]"));
/// let value = parser.resolve().await.unwrap();
/// assert_eq!(value.to_string(), "[1,2,3]");
/// # }
/// ```
#[derive(Debug)]
pub struct TextSource {
    chars: std::vec::IntoIter<char>,
}

impl TextSource {
    /// Creates a source yielding every character of `text`, then end of
    /// stream.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect::<Vec<_>>().into_iter(),
        }
    }
}

impl CharacterSource for TextSource {
    fn pull(&mut self) -> impl Future<Output = Option<char>> + Send {
        future::ready(self.chars.next())
    }
}
