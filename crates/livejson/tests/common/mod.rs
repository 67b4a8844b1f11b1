#![allow(dead_code)]

use livejson::{ParseError, StreamingParser, TextSource, Value};
use tokio::sync::mpsc::{self, UnboundedSender};

/// A document exercising every production: nested objects and arrays,
/// strings with escapes, negative and fractional numbers, literals, and
/// empty containers.
pub const KITCHEN_SINK: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null
    },
    "scores": [-1, 0, 3.25, 100],
    "summary": "line one\nline two\té",
    "flags": {
        "active": true,
        "hidden": false
    },
    "empty_list": [],
    "empty_map": {},
    "mixed": ["s", {"k": "v"}, [1, 2], null, true]
}
"#;

pub const DOCUMENTS: &[&str] = &[
    "null",
    "true",
    "false",
    "-12.5",
    "0",
    r#""""#,
    r#""hello, world""#,
    "[]",
    "{}",
    "[1, [2, [3, [4]]]]",
    r#"{"b": 1, "a": 2}"#,
    r#"{"outer": {"inner": {"leaf": [null, false, "end"]}}}"#,
    KITCHEN_SINK,
];

/// Starts a default parser over a fresh character channel.
pub fn channel_parser() -> (UnboundedSender<char>, StreamingParser) {
    let (tx, rx) = mpsc::unbounded_channel();
    let parser = StreamingParser::with_defaults(rx);
    (tx, parser)
}

pub fn send_str(tx: &UnboundedSender<char>, text: &str) {
    for c in text.chars() {
        tx.send(c).expect("parser dropped its source");
    }
}

/// Lets the parse task drain everything currently buffered in its source.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Parses a fully available document in one go.
pub async fn parse_full(text: &str) -> Result<Value, ParseError> {
    StreamingParser::with_defaults(TextSource::new(text))
        .resolve()
        .await
}

/// Parses a document pushed one character at a time, yielding to the parse
/// task between pushes.
pub async fn parse_char_by_char(text: &str) -> Result<Value, ParseError> {
    let (tx, parser) = channel_parser();
    for c in text.chars() {
        tx.send(c).expect("parser dropped its source");
        tokio::task::yield_now().await;
    }
    drop(tx);
    parser.resolve().await
}
