//! Editing scenarios: minimal-change mutation of a loaded document.

use dotprops::{Error, Properties};

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
fn remove_deletes_property_and_comment_block() {
    let mut props = load(INPUT);
    assert_eq!(props.remove("three"), Some("and escapes\n\t\r\u{c}".to_string()));
    let expected = "#comment1\n\
                    #  comment2   \n\
                    \n\
                    ! comment3\n\
                    one=simple\n\
                    two=value containing spaces\n\
                    \x20 \\ with\\ spaces   =    everywhere  \n\
                    altsep:value\n\
                    multiline = one \\\n\
                    \x20   two  \\\n\
                    \tthree\n\
                    key.4 = \\u1234\n";
    assert_eq!(props.to_string(), expected);
    assert_eq!(props.get("three"), None);
    assert_eq!(props.remove("three"), None);
}

#[test]
fn put_replaces_only_the_value_token() {
    let mut props = load(INPUT);
    assert_eq!(
        props.put("two", "replaced"),
        Some("value containing spaces".to_string())
    );
    let expected = INPUT.replace("two=value containing spaces", "two=replaced");
    assert_eq!(props.to_string(), expected);

    // odd separators survive a value replacement
    let mut props = load(INPUT);
    props.put(" with spaces", "here");
    let expected = INPUT.replace("   =    everywhere  ", "   =    here");
    assert_eq!(props.to_string(), expected);
}

#[test]
fn put_appends_new_property_at_the_end() {
    let mut props = load(INPUT);
    assert_eq!(props.put("five", "5"), None);
    assert_eq!(props.to_string(), format!("{INPUT}five=5"));

    props.put("six", "6");
    assert_eq!(props.to_string(), format!("{INPUT}five=5\nsix=6"));
}

#[test]
fn put_detaches_header_comment_with_blank_line() {
    let mut props = load("# A header comment");
    props.put("first", "dummy");
    assert_eq!(props.to_string(), "# A header comment\n\nfirst=dummy");

    // an already-terminated header only needs one more newline
    let mut props = load("# A header comment\n");
    props.put("first", "dummy");
    assert_eq!(props.to_string(), "# A header comment\n\nfirst=dummy");
}

#[test]
fn put_into_empty_document() {
    let mut props = Properties::new();
    props.put("solo", "1");
    assert_eq!(props.to_string(), "solo=1");
    props.put("next", "2");
    assert_eq!(props.to_string(), "solo=1\nnext=2");
}

#[test]
fn put_escapes_key_and_value() {
    let mut props = Properties::new();
    props.put("spaced key", "line1\nline2\ttab");
    assert_eq!(props.to_string(), "spaced\\ key=line1\\nline2\\ttab");
    assert_eq!(props.get("spaced key"), Some("line1\nline2\ttab"));

    let reloaded = load(&props.to_string());
    assert_eq!(reloaded.get("spaced key"), Some("line1\nline2\ttab"));
}

#[test]
fn put_escapes_separators_in_keys() {
    let mut props = Properties::new();
    props.put("a=b:c", "v");
    assert_eq!(props.to_string(), "a\\=b\\:c=v");
    let reloaded = load(&props.to_string());
    assert_eq!(reloaded.get("a=b:c"), Some("v"));
}

#[test]
fn set_comment_replaces_block_keeping_nearest_prefix() {
    let mut props = load(INPUT);
    props.set_comment("three", &["new1", "new2"]).unwrap();
    let expected = INPUT.replace(
        "# another comment\n! and a comment\n! block\n",
        "! new1\n! new2\n",
    );
    assert_eq!(props.to_string(), expected);
    assert_eq!(props.get_comment("three"), vec!["! new1", "! new2"]);
}

#[test]
fn set_comment_grows_a_fresh_block() {
    let mut props = load("a=1\nb=2\n");
    props.set_comment("b", &["about b", "# and more"]).unwrap();
    assert_eq!(props.to_string(), "a=1\n# about b\n# and more\nb=2\n");
}

#[test]
fn set_comment_clears_a_block() {
    let mut props = load(INPUT);
    props.set_comment("three", &[]).unwrap();
    let expected = INPUT.replace("# another comment\n! and a comment\n! block\n", "");
    assert_eq!(props.to_string(), expected);
}

#[test]
fn set_comment_on_missing_key_fails() {
    let mut props = load(INPUT);
    match props.set_comment("missing", &["x"]) {
        Err(Error::KeyNotFound(key)) => assert_eq!(key, "missing"),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[test]
fn set_comment_roundtrip_is_a_noop() {
    let mut props = load(INPUT);
    for key in ["one", "three", "altsep"] {
        let comments = props.get_comment(key);
        let lines: Vec<&str> = comments.iter().map(String::as_str).collect();
        props.set_comment(key, &lines).unwrap();
    }
    assert_eq!(props.to_string(), INPUT);
}

#[test]
fn set_property_sets_value_and_comments() {
    let mut props = load("a=1\n");
    props.set_property("b", "2", &["the b property"]);
    assert_eq!(props.to_string(), "a=1\n# the b property\nb=2");
    assert_eq!(props.get_comment("b"), vec!["# the b property"]);
}

#[test]
fn remove_then_reinsert_moves_key_to_the_end() {
    let mut props = load("a=1\nb=2\nc=3\n");
    props.remove("b");
    assert_eq!(props.to_string(), "a=1\nc=3\n");
    let keys: Vec<&str> = props.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);

    props.put("b", "2");
    let keys: Vec<&str> = props.keys().collect();
    assert_eq!(keys, vec!["a", "c", "b"]);
    assert_eq!(props.to_string(), "a=1\nc=3\nb=2");
}

#[test]
fn retain_routes_through_remove() {
    let mut props = load("# keep a\na=1\n# drop b\nb=2\nc=3\n");
    props.retain(|_, v| v != "2");
    assert_eq!(props.to_string(), "# keep a\na=1\nc=3\n");
    let keys: Vec<&str> = props.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn clear_empties_everything() {
    let mut props = load(INPUT);
    props.clear();
    assert!(props.is_empty());
    assert_eq!(props.to_string(), "");
}

#[test]
fn put_on_separator_less_key_materializes_a_separator() {
    let mut props = load("bare\n");
    assert_eq!(props.get("bare"), Some(""));
    props.put("bare", "x");
    assert_eq!(props.to_string(), "bare=x\n");
}

#[test]
fn put_raw_keeps_raw_forms_verbatim() {
    let mut props = Properties::new();
    props.put_raw("a\\ b", "1\\n2").unwrap();
    assert_eq!(props.to_string(), "a\\ b=1\\n2");
    assert_eq!(props.get("a b"), Some("1\n2"));
    assert_eq!(props.get_raw("a b"), Some("1\\n2"));
}

#[test]
fn put_raw_rejects_malformed_escapes_without_touching_the_document() {
    let mut props = load("a=1\n");
    assert!(props.put_raw("bad", "\\u12").is_err());
    assert_eq!(props.to_string(), "a=1\n");
}

#[test]
fn new_lines_follow_the_document_convention() {
    let mut props = load("a=1\r\nb=2\r\n");
    props.put("c", "3");
    assert_eq!(props.to_string(), "a=1\r\nb=2\r\nc=3");

    props.set_comment("c", &["windows flavored"]).unwrap();
    assert_eq!(
        props.to_string(),
        "a=1\r\nb=2\r\n# windows flavored\r\nc=3"
    );
}

#[test]
fn append_after_trailing_comment_stays_on_its_own_line() {
    let mut props = load("a=1\n# trailing note");
    props.put("b", "2");
    assert_eq!(props.to_string(), "a=1\nb=2\n# trailing note");
}

#[test]
fn store_with_header_replaces_existing_header() {
    let props = load(INPUT);
    let mut out = Vec::new();
    props.store_with_header(&mut out, &["generated file"]).unwrap();
    let rest = INPUT
        .strip_prefix("#comment1\n#  comment2   \n\n")
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("# generated file\n\n{rest}"));
}

#[test]
fn store_with_header_keeps_prefixed_lines() {
    let props = load("a=1\n");
    let mut out = Vec::new();
    props
        .store_with_header(&mut out, &["! bang header", "second line"])
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "! bang header\n! second line\n\na=1\n"
    );
}

#[test]
fn defaults_chain_resolves_lookups() {
    let mut grandparent = Properties::new();
    grandparent.put("deep", "3");
    let mut parent = Properties::with_defaults(grandparent);
    parent.put("shared", "from parent");
    parent.set_comment("shared", &["# inherited note"]).unwrap();
    let mut props = Properties::with_defaults(parent);
    props.put("own", "1");
    props.put("shared", "from child");

    assert_eq!(props.get("deep"), None);
    assert_eq!(props.get_property("deep"), Some("3"));
    assert_eq!(props.get_property("shared"), Some("from child"));
    assert_eq!(props.get_property("own"), Some("1"));
    assert_eq!(props.get_property("missing"), None);

    // comments fall back only when the key itself does
    assert_eq!(props.get_property_comment("shared"), Vec::<String>::new());
    props.remove("shared");
    assert_eq!(
        props.get_property_comment("shared"),
        vec!["# inherited note"]
    );

    let names = props.string_property_names();
    assert_eq!(names, vec!["deep", "shared", "own"]);
}

#[test]
fn flattened_merges_the_defaults_chain() {
    let mut defaults = Properties::new();
    defaults.put("base", "1");
    defaults.set_comment("base", &["# from defaults"]).unwrap();
    defaults.put("shared", "default");
    let mut props = Properties::with_defaults(defaults);
    props.put("shared", "override");
    props.put("own", "2");

    let flat = props.flattened();
    assert!(flat.defaults().is_none());
    assert_eq!(flat.get("base"), Some("1"));
    assert_eq!(flat.get("shared"), Some("override"));
    assert_eq!(flat.get("own"), Some("2"));
    assert_eq!(flat.get_comment("base"), vec!["# from defaults"]);

    // flattening is semantically idempotent
    assert_eq!(flat.flattened().to_string(), flat.to_string());
}

#[test]
fn escaped_view_encodes_above_latin1() {
    let props = load("nihon=\u{65e5}\u{672c}\nlatin=caf\u{e9}\n");
    let escaped = props.escaped();
    assert_eq!(escaped.to_string(), "nihon=\\u65e5\\u672c\nlatin=caf\u{e9}\n");
    // logical values are untouched
    assert_eq!(escaped.get("nihon"), Some("\u{65e5}\u{672c}"));
    // idempotent
    assert_eq!(escaped.escaped().to_string(), escaped.to_string());
    // the original is unaffected
    assert_eq!(props.to_string(), "nihon=\u{65e5}\u{672c}\nlatin=caf\u{e9}\n");
}

#[test]
fn unescaped_view_decodes_unicode_escapes() {
    let props = load("greek=\\u0391 alpha\nplain=x\\n\n");
    let unescaped = props.unescaped();
    // only \uXXXX is rewritten; other escapes stay
    assert_eq!(unescaped.to_string(), "greek=\u{391} alpha\nplain=x\\n\n");
    assert_eq!(unescaped.get("greek"), Some("\u{391} alpha"));
    assert_eq!(unescaped.unescaped().to_string(), unescaped.to_string());
}

#[test]
fn views_convert_the_defaults_chain() {
    let mut defaults = Properties::new();
    defaults.put("sigma", "\u{3a3}");
    let mut props = Properties::with_defaults(defaults);
    props.put("own", "1");

    let escaped = props.escaped();
    assert_eq!(escaped.defaults().unwrap().get_raw("sigma"), Some("\\u03a3"));
    assert_eq!(escaped.get_property("sigma"), Some("\u{3a3}"));
}
