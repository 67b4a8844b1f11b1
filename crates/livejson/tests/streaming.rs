//! End-to-end parses over full and trickled input.

mod common;

use common::{DOCUMENTS, KITCHEN_SINK, parse_char_by_char, parse_full};
use livejson::{Map, ParseError, Parser, ParserOptions, StreamingParser, TextSource, Value};
use rstest::rstest;

#[rstest]
#[case::null("null")]
#[case::boolean("true")]
#[case::number("-12.5")]
#[case::string(r#""hello, world""#)]
#[case::nested("[1, [2, [3, [4]]]]")]
#[case::object(r#"{"outer": {"inner": {"leaf": [null, false, "end"]}}}"#)]
#[case::kitchen_sink(KITCHEN_SINK)]
#[tokio::test]
async fn full_and_incremental_parses_agree(#[case] doc: &str) {
    let full = parse_full(doc).await.unwrap();
    let trickled = parse_char_by_char(doc).await.unwrap();
    assert_eq!(full, trickled);
}

#[tokio::test]
async fn agrees_with_serde_json() {
    for doc in DOCUMENTS {
        let ours = parse_full(doc).await.unwrap();
        let theirs = from_serde(serde_json::from_str(doc).unwrap());
        assert_eq!(ours, theirs, "document: {doc}");
    }
}

fn from_serde(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap()),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_serde).collect())
        }
        serde_json::Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, from_serde(v)))
                .collect::<Map>(),
        ),
    }
}

#[tokio::test]
async fn empty_containers_resolve_empty() {
    assert_eq!(parse_full("{}").await.unwrap(), Value::Object(Map::new()));
    assert_eq!(parse_full("[]").await.unwrap(), Value::Array(Vec::new()));
    assert_eq!(
        parse_full(" [ ] ").await.unwrap(),
        Value::Array(Vec::new())
    );
}

#[tokio::test]
async fn object_keys_resolve_in_document_order() {
    let value = parse_full(r#"{"b": 1, "a": 2}"#).await.unwrap();
    let Value::Object(map) = value else {
        panic!("expected object, got {value:?}");
    };
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["b", "a"]);
}

#[tokio::test]
async fn escapes_decode_to_their_characters() {
    let value = parse_full(r#""\n\té""#).await.unwrap();
    assert_eq!(value, Value::String("\n\t\u{e9}".into()));

    let value = parse_full(r#""\"\\\/\b\f\r""#).await.unwrap();
    assert_eq!(
        value,
        Value::String("\"\\/\u{8}\u{c}\r".into())
    );

    // The long form takes eight hex digits and reaches beyond the BMP.
    let value = parse_full(r#""\U0001F600""#).await.unwrap();
    assert_eq!(value, Value::String("\u{1F600}".into()));
}

#[tokio::test]
async fn unknown_escape_is_rejected() {
    let err = parse_full(r#""\x""#).await.unwrap_err();
    assert!(matches!(
        err,
        ParseError::InvalidEscapeSequence { found: 'x', .. }
    ));
}

#[tokio::test]
async fn surrogate_escape_is_rejected() {
    let err = parse_full(r#""\ud800""#).await.unwrap_err();
    assert!(matches!(err, ParseError::InvalidEscapeSequence { .. }));
}

#[tokio::test]
async fn malformed_literal_fails_instead_of_resolving() {
    let err = parse_full(r#"{"a":tru}"#).await.unwrap_err();
    match err {
        ParseError::UnexpectedToken { found, .. } => assert_eq!(found, '}'),
        other => panic!("expected UnexpectedToken, got {other:?}"),
    }

    // Same document, but the stream ends mid-literal.
    let err = parse_full(r#"{"a":tru"#).await.unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));
}

#[tokio::test]
async fn garbage_root_reports_character_and_position() {
    let err = parse_full("\n  #").await.unwrap_err();
    match err {
        ParseError::UnexpectedToken { found, at } => {
            assert_eq!(found, '#');
            assert_eq!((at.line, at.column), (2, 3));
        }
        other => panic!("expected UnexpectedToken, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_document_fails_with_end_of_input() {
    let err = parse_full(r#"{"a": [1, 2"#).await.unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEndOfInput { .. }));
}

#[tokio::test]
async fn bare_keys_parse_by_default() {
    let value = parse_full(r#"{key_1: "v", other2: 3}"#).await.unwrap();
    let Value::Object(map) = value else {
        panic!("expected object");
    };
    assert_eq!(map.get("key_1"), Some(&Value::String("v".into())));
    assert_eq!(map.get("other2"), Some(&Value::Number(3.0)));
}

#[tokio::test]
async fn bare_keys_are_rejected_in_strict_mode() {
    let options = ParserOptions {
        allow_bare_keys: false,
    };
    let parser = StreamingParser::new(TextSource::new(r#"{key: 1}"#), options);
    let err = parser.resolve().await.unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedToken { found: 'k', .. }
    ));
}

#[tokio::test]
async fn number_stops_at_the_first_foreign_character() {
    // The terminator is left unconsumed for the container to judge.
    let value = parse_full("[12.5, 3]").await.unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Value::Number(12.5), Value::Number(3.0)])
    );
}

#[tokio::test]
async fn parser_handle_parses_consecutive_values() {
    let mut parser = Parser::new(
        TextSource::new(r#"true  {"n": 1}"#),
        ParserOptions::default(),
    );
    let first = parser.parse_value().await.unwrap();
    assert_eq!(first.resolve().await.unwrap(), Value::Boolean(true));
    let second = parser.parse_value().await.unwrap();
    assert_eq!(
        second.resolve().await.unwrap().to_string(),
        r#"{"n":1}"#
    );
}

#[tokio::test]
async fn display_of_resolved_kitchen_sink_reparses_identically() {
    let value = parse_full(KITCHEN_SINK).await.unwrap();
    let reparsed = parse_full(&value.to_string()).await.unwrap();
    assert_eq!(value, reparsed);
}
