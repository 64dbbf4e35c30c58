use xjson::{Ancestors, ErrorKind, Kind, Selector, Step, path};
use xjson_testhelpers::test;

#[test]
fn selectors_render_like_the_walk() {
    let doc = xjson::parse(r#"{"a": [0, {"b c": true}]}"#);
    let v = doc.get("a").get_index(1).get("b c");
    assert!(v.must_bool());
    assert_eq!(v.selector().to_string(), r#"$root.a[1]["b c"]"#);
    assert_eq!(
        v.selector().steps(),
        [
            &Step::Root,
            &Step::Key("a".into()),
            &Step::Index(1),
            &Step::Key("b c".into())
        ]
    );
    assert_eq!(v.selector().depth(), 3);
    assert_eq!(*v.selector(), Selector::root().key("a").index(1).key("b c"));
}

#[test]
fn ancestors_walk_back_to_the_root() {
    let doc = xjson::parse(r#"{"users": [{"größe": 180, "x²": 4}]}"#);
    let user = doc.get("users").get_index(0);

    let spans: Vec<_> = user.get("x²").selector().ancestors().map(|s| s.span()).collect();
    assert_eq!(spans.len(), 4);
    assert!(spans.iter().all(Option::is_some));

    let größe = user.get("größe");
    let ancestors: Ancestors<'_> = größe.selector().ancestors();
    let rendered: Vec<String> = ancestors.map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        ["$root.users[0].größe", "$root.users[0]", "$root.users", "$root"]
    );
    assert_eq!(user.get("x²").selector().to_string(), r#"$root.users[0]["x²"]"#);
}

#[test]
fn member_lookup_ignores_document_order() {
    let doc = xjson::parse(r#"{"z": 1, "a": 2, "m": 3}"#);
    assert_eq!(doc.get("z").must_i64(), 1);
    assert_eq!(doc.get("a").must_i64(), 2);
    assert_eq!(doc.get("m").must_i64(), 3);
    assert_eq!(doc.keys().collect::<Vec<_>>(), ["a", "m", "z"]);

    let err = doc.get("q").as_i64().unwrap_err();
    assert_eq!(err.code(), "xjson::key_not_found");
    assert_eq!(err.selector().unwrap().to_string(), "$root.q");
    assert_eq!(err.container().unwrap().to_string(), "$root");
}

#[test]
fn index_out_of_range() {
    let doc = xjson::parse("[10, 20]");
    assert_eq!(doc.get_index(1).must_i64(), 20);

    let err = doc.get_index(2).as_i64().unwrap_err();
    assert_eq!(err.to_string(), "xjson: index out of range (at: $root[2])");
    assert!(matches!(
        err.kind(),
        ErrorKind::IndexOutOfRange { index: 2, len: 2 }
    ));
    assert_eq!(err.container().unwrap().to_string(), "$root");
}

#[test]
fn wrong_container_kind() {
    let doc = xjson::parse(r#"{"n": 5, "list": [1]}"#);

    let err = doc.get("n").get("x").as_i64().unwrap_err();
    assert_eq!(err.to_string(), "xjson: number is not a json object (at: $root.n)");

    let err = doc.get("list").get("x").error().cloned().unwrap();
    assert_eq!(err.to_string(), "xjson: array is not a json object (at: $root.list)");

    let err = doc.get_index(0).error().cloned().unwrap();
    assert_eq!(err.to_string(), "xjson: object is not a json array (at: $root)");
}

#[test]
fn errors_are_absorbing() {
    let doc = xjson::parse(r#"{"a": {"b": [1, 2]}}"#);
    let first = doc.get("a").get("nope");
    let original = first.error().cloned().unwrap();

    let deep = first.get("x").get_index(4).map_index("y").index(0).get_path(path!["p", 1]);
    assert_eq!(deep.kind(), Kind::Error);
    assert!(deep.error().unwrap().ptr_eq(&original));
    assert_eq!(deep.selector().to_string(), "$root.a.nope.x[4].y[0].p[1]");
    assert_eq!(deep.must_array().count(), 0);
    assert_eq!(deep.len(), 0);
}

#[test]
fn parse_errors_are_absorbing() {
    let doc = xjson::parse(r#"{"a": [1, 2}"#);
    assert!(doc.is_error());
    let deep = doc.get("a").get_index(0);
    let err = deep.as_i64().unwrap_err();
    assert!(err.is_parse());
    assert!(err.ptr_eq(doc.error().unwrap()));
    assert_eq!(err.to_string(), "xjson: unexpected byte '}' (pos=11)");
}

#[test]
fn lenient_steps_through_null() {
    let doc = xjson::parse(r#"{"owner": null, "count": 3}"#);

    let cat = doc.path(path!["owner", "cat", 0]);
    assert!(cat.is_missing());
    assert_eq!(cat.kind(), Kind::Null);
    assert_eq!(cat.maybe_str(), None);
    let err = cat.as_str().unwrap_err();
    assert_eq!(err.to_string(), "xjson: null is not a json object (at: $root.owner)");

    let wrong = doc.map_index("count").map_index("x");
    assert!(wrong.is_error());
    assert_eq!(
        wrong.error().unwrap().to_string(),
        "xjson: number is not a json object (at: $root.count)"
    );
}

#[test]
fn eager_step_after_a_miss_fails() {
    let doc = xjson::parse(r#"{"a": {}}"#);
    let missing = doc.map_index("a").map_index("b");
    assert!(missing.is_missing());

    let failed = missing.get("c");
    assert!(failed.is_error());
    assert_eq!(
        failed.error().unwrap().to_string(),
        "xjson: key not found (at: $root.a.b)"
    );
}

#[test]
fn duplicate_keys_keep_the_last() {
    let doc = xjson::parse(r#"{"k": 1, "other": 0, "k": 2, "k": 3}"#);
    assert_eq!(doc.get("k").must_i64(), 3);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.keys().collect::<Vec<_>>(), ["k", "other"]);
}

#[test]
fn iteration_carries_selectors() {
    let doc = xjson::parse(r#"{"xs": [true, false], "o": {"b": 1, "a": 2}}"#);

    let selectors: Vec<String> = doc
        .get("xs")
        .must_array()
        .map(|v| v.selector().to_string())
        .collect();
    assert_eq!(selectors, ["$root.xs[0]", "$root.xs[1]"]);

    let members: Vec<(String, i64, String)> = doc
        .get("o")
        .must_object()
        .map(|(k, v)| (k.to_owned(), v.must_i64(), v.selector().to_string()))
        .collect();
    assert_eq!(
        members,
        [
            ("a".to_owned(), 2, "$root.o.a".to_owned()),
            ("b".to_owned(), 1, "$root.o.b".to_owned()),
        ]
    );

    assert!(doc.get("o").as_array().is_err());
    assert!(doc.get("xs").maybe_object().is_none());
    assert_eq!(doc.get("xs").must_array().rev().map(|v| v.must_bool()).collect::<Vec<_>>(), [false, true]);
}

#[test]
fn raw_text_and_spans() {
    let src = r#"{"n": 1.50e1, "s": "a\nb"}"#;
    let doc = xjson::parse(src);

    let n = doc.get("n");
    assert_eq!(n.raw(), Some(&b"1.50e1"[..]));
    assert_eq!(n.must_number().unwrap().raw(), "1.50e1");
    assert_eq!(n.must_f64(), 15.0);

    let s = doc.get("s");
    assert_eq!(s.must_str(), "a\nb");
    assert_eq!(s.raw(), Some(&br#""a\nb""#[..]));

    assert_eq!(doc.get("missing").raw(), None);
}
