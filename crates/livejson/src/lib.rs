//! An asynchronous, incremental JSON parser that exposes the partially
//! constructed value tree while parsing is still in progress.
//!
//! The parser consumes a document one character at a time from a possibly
//! slowly-filling [`CharacterSource`] (e.g. tokens arriving from a remote
//! generator). Every value in the document is represented by a
//! [`PartialNode`]: a live snapshot of the best-known value so far, plus a
//! completion future that fires exactly once when that value is fully
//! formed, or rejects when parsing it fails. Children are attached to their
//! containers as soon as their key or index is known, so a consumer can
//! render a growing document instead of waiting for the closing brace.
//!
//! # Examples
//!
//! Watching a value grow while the producer is still sending:
//!
//! ```rust
//! use livejson::StreamingParser;
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, rx) = mpsc::unbounded_channel();
//! let parser = StreamingParser::with_defaults(rx);
//!
//! // The closing quote and brace have not arrived yet.
//! for c in r#"{"title": "hi"#.chars() {
//!     tx.send(c).unwrap();
//! }
//! tokio::task::yield_now().await;
//!
//! let title = parser
//!     .root()
//!     .with_snapshot(|s| s.get("title").cloned())
//!     .unwrap();
//! assert_eq!(title.with_snapshot(|s| s.as_str().map(String::from)), Some("hi".into()));
//! assert!(!title.is_settled());
//!
//! // Finish the document and resolve it to a plain value.
//! for c in "\"}".chars() {
//!     tx.send(c).unwrap();
//! }
//! drop(tx);
//! let value = parser.resolve().await.unwrap();
//! assert_eq!(value.to_string(), r#"{"title":"hi"}"#);
//! # }
//! ```

mod cursor;
mod error;
mod escape;
mod options;
mod parser;
mod partial;
mod source;
mod value;

pub use cursor::Cursor;
pub use error::{ParseError, Position};
pub use options::ParserOptions;
pub use parser::{Parser, StreamingParser};
pub use partial::{PartialNode, PartialValue};
pub use source::{CharacterSource, TextSource};
pub use value::{Array, Map, Value};
