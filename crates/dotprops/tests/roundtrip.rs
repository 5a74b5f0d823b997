//! Round-trip and decoding behavior on the canonical reference document.

use dotprops::Properties;
use dotprops_tokenizer::escape::unescape;

const INPUT: &str = "#comment1\n\
                     #  comment2   \n\
                     \n\
                     ! comment3\n\
                     one=simple\n\
                     two=value containing spaces\n\
                     # another comment\n\
                     ! and a comment\n\
                     ! block\n\
                     three=and escapes\\n\\t\\r\\f\n\
                     \x20 \\ with\\ spaces   =    everywhere  \n\
                     altsep:value\n\
                     multiline = one \\\n\
                     \x20   two  \\\n\
                     \tthree\n\
                     key.4 = \\u1234\n";

fn load(source: &str) -> Properties {
    source.parse().expect("load failed")
}

#[test]
fn store_reproduces_input() {
    let props = load(INPUT);
    assert_eq!(props.to_string(), INPUT);

    let mut bytes = Vec::new();
    props.store(&mut bytes).unwrap();
    assert_eq!(bytes, INPUT.as_bytes());
}

#[test]
fn store_reproduces_mixed_line_endings() {
    let source = "a=1\r\nb=2\nc=3\rd = 4\r\n# comment\r\n";
    assert_eq!(load(source).to_string(), source);
}

#[test]
fn values_are_decoded() {
    let props = load(INPUT);
    assert_eq!(props.get("one"), Some("simple"));
    assert_eq!(props.get("two"), Some("value containing spaces"));
    assert_eq!(props.get("three"), Some("and escapes\n\t\r\u{c}"));
    assert_eq!(props.get(" with spaces"), Some("everywhere  "));
    assert_eq!(props.get("altsep"), Some("value"));
    assert_eq!(props.get("multiline"), Some("one two  three"));
    assert_eq!(props.get("key.4"), Some("\u{1234}"));
    assert_eq!(props.get("missing"), None);
}

#[test]
fn iteration_follows_document_order() {
    let props = load(INPUT);
    let keys: Vec<&str> = props.keys().collect();
    assert_eq!(
        keys,
        vec![
            "one",
            "two",
            "three",
            " with spaces",
            "altsep",
            "multiline",
            "key.4",
        ]
    );
    assert_eq!(props.len(), 7);
}

#[test]
fn raw_decodes_to_value() {
    let props = load(INPUT);
    assert_eq!(props.get_raw("three"), Some("and escapes\\n\\t\\r\\f"));
    assert_eq!(props.get_raw("one"), Some("simple"));
    for key in props.keys() {
        let raw = props.get_raw(key).unwrap();
        assert_eq!(unescape(raw).unwrap(), props.get(key).unwrap());
    }
}

#[test]
fn comments_attach_to_their_property() {
    let props = load(INPUT);
    assert_eq!(props.get_comment("one"), vec!["! comment3"]);
    assert_eq!(
        props.get_comment("three"),
        vec!["# another comment", "! and a comment", "! block"]
    );
    // a value line right above is not a comment block
    assert_eq!(props.get_comment("two"), Vec::<String>::new());
    // the blank line detaches the document header from `one`
    assert!(!props.get_comment("one").contains(&"#comment1".to_string()));
    assert_eq!(props.get_comment("missing"), Vec::<String>::new());
}

#[test]
fn separator_less_line_has_empty_value() {
    let props = load("bare\nnext=1\n");
    assert_eq!(props.get("bare"), Some(""));
    assert_eq!(props.get_raw("bare"), Some(""));
    assert_eq!(props.to_string(), "bare\nnext=1\n");
}

#[test]
fn malformed_escape_fails_load() {
    assert!("key=\\u12x4\n".parse::<Properties>().is_err());
    assert!("key=\\u12".parse::<Properties>().is_err());
}

#[test]
fn crlf_within_continuation_roundtrips() {
    let source = "multiline = one \\\r\n    two\r\n";
    let props = load(source);
    assert_eq!(props.get("multiline"), Some("one two"));
    assert_eq!(props.to_string(), source);
}
