use miette::Diagnostic;
use xjson::{ParseErrorKind, ParseOptions};
use xjson_testhelpers::test;

fn parse_error(input: &str) -> String {
    xjson::parse(input).error().unwrap().to_string()
}

#[test]
fn parse_errors_report_the_byte_offset() {
    insta::assert_snapshot!(parse_error(""), @"xjson: unexpected end of input (pos=0)");
    insta::assert_snapshot!(parse_error("[1,]"), @"xjson: unexpected byte ']' (pos=3)");
    insta::assert_snapshot!(parse_error("[1] x"), @"xjson: unexpected byte 'x' after top-level value (pos=4)");
    insta::assert_snapshot!(parse_error("[\"a\x01\"]"), @"xjson: control character 0x01 in string (pos=3)");
}

#[test]
fn nesting_limit() {
    let options = ParseOptions::new().max_depth(2);
    let doc = xjson::parse_with("[[[1]]]", &options);
    let err = doc.error().unwrap();
    insta::assert_snapshot!(err.to_string(), @"xjson: nesting deeper than 2 levels (pos=2)");
    assert_eq!(
        err.as_parse_error().unwrap().kind,
        ParseErrorKind::TooDeep(2)
    );

    assert!(!xjson::parse_with("[[1]]", &options).is_error());
}

#[test]
fn form_feed_is_opt_in() {
    assert!(xjson::parse("\x0c[1]").is_error());
    let options = ParseOptions::new().form_feed_whitespace();
    assert_eq!(xjson::parse_with("\x0c[1]\x0c", &options).get_index(0).must_i64(), 1);
}

#[test]
fn access_errors_name_the_step() {
    let doc = xjson::parse(r#"{"people": [{"name": "Ada"}]}"#);

    let err = doc.get("people").get_index(0).get("name").as_bool().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"xjson: string is not a json bool (at: $root.people[0].name)");
    insta::assert_snapshot!(err.message(), @"xjson: string is not a json bool");

    let err = doc.get("people").get_index(0).get("age").error().cloned().unwrap();
    insta::assert_snapshot!(err.to_string(), @"xjson: key not found (at: $root.people[0].age)");
    insta::assert_snapshot!(err.container().unwrap().to_string(), @"$root.people[0]");
}

#[test]
fn codes_and_labels() {
    let doc = xjson::parse(r#"{"items": [1, 2]}"#);

    let err = doc.get("items").get_index(5).error().cloned().unwrap();
    assert_eq!(err.code(), "xjson::index_out_of_range");
    assert_eq!(
        Diagnostic::code(&err).unwrap().to_string(),
        "xjson::index_out_of_range"
    );
    insta::assert_snapshot!(err.kind().label(), @"index 5 is past the end of this array (length 2)");

    let doc = xjson::parse("[1, 2");
    let err = doc.error().cloned().unwrap();
    assert_eq!(err.code(), "xjson::parse");
    assert!(err.selector().is_none());
    assert!(err.source_code().is_none());

    let err = doc.diagnostic().unwrap();
    assert!(err.source_code().is_some());
    assert!(err.is_parse());
}

#[test]
fn misspelled_keys_get_a_suggestion() {
    let src = r#"{"username": "ada", "id": 7}"#;
    let doc = xjson::parse(src);

    let value = doc.get("usernme");
    let plain = value.error().unwrap();
    assert!(plain.source_code().is_none());

    let err = value.diagnostic().unwrap();
    assert!(err.source_code().is_some());
    insta::assert_snapshot!(err.help().unwrap().to_string(), @"did you mean `username`?");

    let labels: Vec<_> = err.labels().unwrap().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 0);
    assert_eq!(labels[0].len(), src.len());
    assert_eq!(labels[0].label(), Some("no member `usernme` in this object"));

    let far_off = doc.get("zzz").diagnostic().unwrap();
    assert!(far_off.help().is_none());
}

#[test]
fn key_misses_defer_the_suggestion() {
    let doc = xjson::parse(r#"{"config": {"timeout": 30, "retries": 2}}"#);

    let missing = doc.map_index("config").map_index("timeuot");
    assert!(matches!(
        missing.error().unwrap().kind(),
        xjson::ErrorKind::KeyNotFound { suggestion: None, .. }
    ));
    let err = missing.as_i64().unwrap_err();
    assert!(err.help().is_none());

    let later = missing.map_index("unit").index(0);
    assert!(later.error().unwrap().ptr_eq(missing.error().unwrap()));
    let err = later.diagnostic().unwrap();
    insta::assert_snapshot!(err.help().unwrap().to_string(), @"did you mean `timeout`?");
    insta::assert_snapshot!(err.to_string(), @"xjson: key not found (at: $root.config.timeuot)");

    let conflict = doc.get("config").get("timeout").get("unit");
    assert!(conflict.diagnostic().unwrap().help().is_none());
}

#[test]
fn labels_point_at_the_offending_value() {
    let src = r#"{"a": {"b": "text"}}"#;
    let doc = xjson::parse(src);
    let err = doc.get("a").get("b").as_i64().unwrap_err();

    let span = err.span().unwrap();
    assert_eq!(&src[span.offset..span.offset + span.len], r#""text""#);

    let err = xjson::parse("[1, ?]").error().cloned().unwrap();
    let span = err.span().unwrap();
    assert_eq!((span.offset, span.len), (4, 1));
}

#[test]
fn null_conflicts_explain_themselves() {
    let doc = xjson::parse(r#"{"a": null}"#);
    let err = doc.map_index("a").map_index("b").as_str().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"xjson: null is not a json object (at: $root.a)");
    insta::assert_snapshot!(err.help().unwrap().to_string(), @"the value is null or missing");
}
