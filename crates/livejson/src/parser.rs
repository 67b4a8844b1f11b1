//! The incremental parsing engine.
//!
//! [`StreamingParser`] is the public entry point: constructing one over a
//! [`CharacterSource`] immediately starts a parse task and hands back the
//! root [`PartialNode`], which observers can inspect while characters are
//! still trickling in. [`Parser`] is the recursive-descent core underneath,
//! exposed for callers that manage their own top-level orchestration.
//!
//! The grammar is fully sequential: a container builder finishes its current
//! child before touching the next sibling, and the only suspension points
//! are cursor reads waiting on the source. What makes the structure
//! observably incremental is that every child node is attached to its parent
//! snapshot the moment its type is known, before the child itself has
//! finished parsing.
//!
//! # Examples
//!
//! ```rust
//! use livejson::StreamingParser;
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, rx) = mpsc::unbounded_channel();
//! let parser = StreamingParser::with_defaults(rx);
//! for c in r#"{"key": [null, true, 3.14]}"#.chars() {
//!     tx.send(c).unwrap();
//! }
//! drop(tx);
//! let value = parser.resolve().await.unwrap();
//! assert_eq!(value.to_string(), r#"{"key":[null,true,3.14]}"#);
//! # }
//! ```

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{
    cursor::Cursor,
    error::ParseError,
    escape::{self, HexEscapeBuffer},
    options::ParserOptions,
    partial::{NodeWriter, PartialNode, PartialValue},
    source::CharacterSource,
    value::Value,
};

/// Hook invoked by the dispatcher right after a child node's type is
/// committed, so the enclosing container can attach it before the child is
/// parsed any further.
type Attach<'a> = Box<dyn FnOnce(PartialNode) -> Result<(), ParseError> + Send + 'a>;

/// The recursive-descent grammar over a buffered cursor.
///
/// Most callers want [`StreamingParser`] instead; `Parser` is for advanced
/// use, e.g. parsing several whitespace-separated documents off one source
/// by calling [`parse_value`](Self::parse_value) repeatedly.
#[derive(Debug)]
pub struct Parser<S> {
    cursor: Cursor<S>,
    options: ParserOptions,
}

impl<S: CharacterSource + Send> Parser<S> {
    /// Creates a parser reading from `source`. No characters are consumed
    /// until a parse operation is invoked.
    pub fn new(source: S, options: ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(source),
            options,
        }
    }

    /// Parses the next value at the current cursor position, driving it to
    /// completion, and returns its (settled) node.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] raised by the value's builders; the returned
    /// node's completion carries the same error.
    pub async fn parse_value(&mut self) -> Result<PartialNode, ParseError> {
        let (node, writer) = PartialNode::pending(PartialValue::Null);
        self.parse_value_into(writer, None, true).await?;
        Ok(node)
    }

    /// The value dispatcher: peeks one significant character, commits the
    /// node's initial snapshot for the selected production, runs `attach`,
    /// then runs the production's builder and settles the node.
    fn parse_value_into<'a>(
        &'a mut self,
        writer: NodeWriter,
        attach: Option<Attach<'a>>,
        skip_leading_whitespace: bool,
    ) -> BoxFuture<'a, Result<(), ParseError>> {
        Box::pin(async move {
            if skip_leading_whitespace {
                if let Err(err) = self.cursor.skip_whitespace().await {
                    writer.fail(err.clone());
                    return Err(err);
                }
            }
            let dispatched = match self.cursor.peek_char_required().await {
                Ok(c) => c,
                Err(err) => {
                    writer.fail(err.clone());
                    return Err(err);
                }
            };
            let initial = match dispatched {
                '{' => PartialValue::Object(IndexMap::new()),
                '[' => PartialValue::Array(Vec::new()),
                '"' => PartialValue::String(String::new()),
                't' => PartialValue::Boolean(true),
                'f' => PartialValue::Boolean(false),
                'n' => PartialValue::Null,
                c if c == '-' || c.is_ascii_digit() => PartialValue::Number(0.0),
                found => {
                    let err = ParseError::UnexpectedToken {
                        found,
                        at: self.cursor.position(),
                    };
                    writer.fail(err.clone());
                    return Err(err);
                }
            };
            let built = async {
                writer.replace(initial)?;
                if let Some(attach) = attach {
                    attach(writer.node().clone())?;
                }
                match dispatched {
                    '{' => self.parse_object(&writer).await,
                    '[' => self.parse_array(&writer).await,
                    '"' => self.parse_string(&writer).await,
                    't' => self.cursor.expect("true").await,
                    'f' => self.cursor.expect("false").await,
                    'n' => self.cursor.expect("null").await,
                    _ => self.parse_number(&writer).await,
                }
            }
            .await;
            match built {
                Ok(()) => writer.complete(),
                Err(err) => {
                    writer.fail(err.clone());
                    Err(err)
                }
            }
        })
    }

    /// Object builder. The initial snapshot (an empty ordered map) is
    /// already installed; each member's value node is attached under its key
    /// via a deep update as soon as the value's type is known.
    async fn parse_object(&mut self, writer: &NodeWriter) -> Result<(), ParseError> {
        self.cursor.expect("{").await?;
        loop {
            self.cursor.skip_whitespace().await?;
            if self.cursor.peek_char_required().await? == '}' {
                break;
            }
            let key = self.parse_key().await?;
            self.cursor.skip_whitespace().await?;
            self.cursor.expect(":").await?;

            let (child, child_writer) = PartialNode::pending(PartialValue::Null);
            let slot = writer.clone();
            let attach: Attach<'_> = Box::new(move |node| {
                slot.mutate(|snapshot| match snapshot {
                    PartialValue::Object(entries) => {
                        entries.insert(key, node);
                        Ok(())
                    }
                    _ => Err(ParseError::invalid_update(
                        "deep update on a non-object snapshot",
                    )),
                })
            });
            self.parse_value_into(child_writer, Some(attach), true)
                .await?;
            debug_assert!(child.is_settled());

            self.cursor.skip_whitespace().await?;
            if self.cursor.peek_char_required().await? == '}' {
                break;
            }
            self.cursor.expect(",").await?;
        }
        self.cursor.expect("}").await
    }

    /// Array builder, symmetric to the object builder: each element is
    /// pushed onto the sequence before its own parse continues.
    async fn parse_array(&mut self, writer: &NodeWriter) -> Result<(), ParseError> {
        self.cursor.expect("[").await?;
        loop {
            self.cursor.skip_whitespace().await?;
            if self.cursor.peek_char_required().await? == ']' {
                break;
            }

            let (child, child_writer) = PartialNode::pending(PartialValue::Null);
            let slot = writer.clone();
            let attach: Attach<'_> = Box::new(move |node| {
                slot.mutate(|snapshot| match snapshot {
                    PartialValue::Array(items) => {
                        items.push(node);
                        Ok(())
                    }
                    _ => Err(ParseError::invalid_update(
                        "deep update on a non-array snapshot",
                    )),
                })
            });
            self.parse_value_into(child_writer, Some(attach), false)
                .await?;
            debug_assert!(child.is_settled());

            self.cursor.skip_whitespace().await?;
            if self.cursor.peek_char_required().await? == ']' {
                break;
            }
            self.cursor.expect(",").await?;
        }
        self.cursor.expect("]").await
    }

    /// Parses an object key: a quoted string, or a bare identifier when the
    /// lenient extension is enabled. Keys are fully consumed before the
    /// colon and are never attached as nodes.
    async fn parse_key(&mut self) -> Result<String, ParseError> {
        let c = self.cursor.peek_char_required().await?;
        if c == '"' {
            let mut key = String::new();
            self.parse_string_chars(|c| {
                key.push(c);
                Ok(())
            })
            .await?;
            return Ok(key);
        }
        if self.options.allow_bare_keys && is_identifier_char(c) {
            let mut key = String::new();
            while let Some(c) = self.cursor.peek_char().await {
                if !is_identifier_char(c) {
                    break;
                }
                let _ = self.cursor.next_char().await;
                key.push(c);
            }
            return Ok(key);
        }
        Err(ParseError::UnexpectedToken {
            found: c,
            at: self.cursor.position(),
        })
    }

    /// String builder: the shared scanning loop drives a replace update per
    /// decoded character, so observers see the string grow.
    async fn parse_string(&mut self, writer: &NodeWriter) -> Result<(), ParseError> {
        self.parse_string_chars(|c| {
            writer.replace_with(|old| match old {
                PartialValue::String(mut s) => {
                    s.push(c);
                    PartialValue::String(s)
                }
                other => other,
            })
        })
        .await
    }

    /// Consumes a quoted string, invoking `emit` once per decoded character.
    /// The opening and closing quotes are consumed but not emitted.
    async fn parse_string_chars(
        &mut self,
        mut emit: impl FnMut(char) -> Result<(), ParseError> + Send,
    ) -> Result<(), ParseError> {
        self.cursor.expect("\"").await?;
        loop {
            let c = self.cursor.next_char_required().await?;
            match c {
                '"' => return Ok(()),
                '\\' => {
                    let decoded = self.parse_escape().await?;
                    emit(decoded)?;
                }
                c => emit(c)?,
            }
        }
    }

    /// Decodes one escape sequence; the backslash has already been
    /// consumed.
    async fn parse_escape(&mut self) -> Result<char, ParseError> {
        let at = self.cursor.position();
        let c = self.cursor.next_char_required().await?;
        if let Some(decoded) = escape::single_escape(c) {
            return Ok(decoded);
        }
        match c {
            'u' => self.parse_hex_escape(4).await,
            'U' => self.parse_hex_escape(8).await,
            found => Err(ParseError::InvalidEscapeSequence { found, at }),
        }
    }

    async fn parse_hex_escape(&mut self, digits: u8) -> Result<char, ParseError> {
        let mut buffer = HexEscapeBuffer::new(digits);
        loop {
            let at = self.cursor.position();
            let c = self.cursor.next_char_required().await?;
            match buffer.feed(c) {
                Ok(Some(decoded)) => return Ok(decoded),
                Ok(None) => {}
                Err(_) => return Err(ParseError::InvalidEscapeSequence { found: c, at }),
            }
        }
    }

    /// Number builder: accumulates digits and decimal points into a textual
    /// buffer and re-converts after every character, so the live snapshot is
    /// always the best numeric parse of the text consumed so far. The first
    /// character that is neither a digit nor `.` is left unconsumed for the
    /// enclosing container. Conversion is best-effort: text that does not
    /// parse (a lone `-`, a second `.`) leaves the previous snapshot in
    /// place rather than failing.
    async fn parse_number(&mut self, writer: &NodeWriter) -> Result<(), ParseError> {
        let mut text = String::new();
        if self.cursor.peek_char_required().await? == '-' {
            let _ = self.cursor.next_char().await;
            text.push('-');
        }
        while let Some(c) = self.cursor.peek_char().await {
            if !c.is_ascii_digit() && c != '.' {
                break;
            }
            let _ = self.cursor.next_char().await;
            text.push(c);
            if let Ok(n) = text.parse::<f64>() {
                writer.replace(PartialValue::Number(n))?;
            }
        }
        Ok(())
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Handle over an in-flight parse of one JSON document.
///
/// Construction eagerly starts parsing on a spawned task; the root partial
/// node is available immediately, while still in progress. Callers may
/// inspect the root's live snapshot at any time, or [`resolve`](Self::resolve)
/// the whole document once it completes.
///
/// Until the dispatcher has seen the document's first significant character
/// the root snapshot is `Null`.
///
/// Dropping the handle does not cancel the parse; the task runs to
/// completion, end of stream, or first grammar error on its own.
#[derive(Debug)]
pub struct StreamingParser {
    root: PartialNode,
}

impl StreamingParser {
    /// Starts parsing one document from `source`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, as the parse task is
    /// spawned immediately.
    #[must_use]
    pub fn new<S>(source: S, options: ParserOptions) -> Self
    where
        S: CharacterSource + Send + 'static,
    {
        let (root, writer) = PartialNode::pending(PartialValue::Null);
        let mut parser = Parser::new(source, options);
        tokio::spawn(async move {
            // A failure is already recorded in the failing node and
            // re-raised through every enclosing completion, so the task
            // itself has nothing further to report.
            let _ = parser.parse_value_into(writer, None, true).await;
        });
        Self { root }
    }

    /// [`new`](Self::new) with default [`ParserOptions`].
    #[must_use]
    pub fn with_defaults<S>(source: S) -> Self
    where
        S: CharacterSource + Send + 'static,
    {
        Self::new(source, ParserOptions::default())
    }

    /// The document's root node; live while parsing is in progress.
    #[must_use]
    pub fn root(&self) -> &PartialNode {
        &self.root
    }

    /// Waits for the whole document to finish parsing and materializes it
    /// as a plain [`Value`].
    ///
    /// # Errors
    ///
    /// The first [`ParseError`] raised anywhere in the document.
    pub async fn resolve(&self) -> Result<Value, ParseError> {
        self.root.resolve().await
    }
}
