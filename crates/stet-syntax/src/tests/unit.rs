//! Locate, decode, re-encode and splice literals the way a promotion does.

use std::path::Path;

use rstest::rstest;

use crate::{
    Delimiter, Layout, LineEnding, Located, Position, SyntacticCheck, decode, encode,
    encode_inline, locate,
};

const SOURCE: &str = r###"#[test]
fn ok_oops() {
    let mut t = ExpectTest::default();
    t.println("Ok");
    t.print("Oops");
    t.expect(r#"
        Ok
        Oops
        "#);
}
"###;

// =============================================================================
// Helpers
// =============================================================================

fn splice(content: &str, site: Position, value: &str) -> String {
    let Located::Literal(span) = locate(content, site, "expect") else {
        panic!("literal expected at {site}");
    };
    let replacement = match span.layout {
        Layout::Block => encode(
            value,
            span.indent_column,
            span.delimiter,
            LineEnding::detect(content),
        ),
        Layout::Inline => encode_inline(value, span.delimiter),
    };
    let mut out = content.to_owned();
    out.replace_range(span.range(), &replacement);
    out
}

fn value_at(content: &str, site: Position) -> String {
    let Located::Literal(span) = locate(content, site, "expect") else {
        panic!("literal expected at {site}");
    };
    decode(span.text(content).expect("span in bounds")).expect("decodes")
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn located_block_decodes_to_logical_value() {
    assert_eq!(value_at(SOURCE, Position::new(6, 7)), "Ok\nOops");
}

#[rstest]
#[case("Ok\nOops\n")]
#[case("")]
#[case("contains \"#\" which needs wider delimiters")]
#[case("first\n\n    indented third")]
fn spliced_block_reads_back_and_parses(#[case] value: &str) {
    let updated = splice(SOURCE, Position::new(6, 7), value);
    assert_eq!(value_at(&updated, Position::new(6, 7)), value);
    let failures = SyntacticCheck::new()
        .introduced_errors(Path::new("ok_oops.rs"), SOURCE, &updated)
        .expect("validate");
    assert!(failures.is_empty(), "{failures:?}");
}

#[test]
fn splice_preserves_text_outside_the_literal() {
    let updated = splice(SOURCE, Position::new(6, 7), "Ok");
    let Located::Literal(span) = locate(SOURCE, Position::new(6, 7), "expect") else {
        panic!("literal expected");
    };
    assert!(updated.starts_with(SOURCE.get(..span.start).expect("prefix")));
    assert!(updated.ends_with(SOURCE.get(span.end..).expect("suffix")));
    assert!(updated.contains("    t.expect(r#\"\n        Ok\n        \"#);\n"));
}

#[test]
fn inline_literal_stays_inline() {
    let content = "fn t() {\n    t.expect(\"Ok\");\n}\n";
    let updated = splice(content, Position::new(2, 7), "Oops");
    assert_eq!(updated, "fn t() {\n    t.expect(\"Oops\");\n}\n");
}

#[test]
fn regular_block_escapes_quotes() {
    let content = "fn t() {\n    t.expect(\"\n        old\n        \");\n}\n";
    let updated = splice(content, Position::new(2, 7), "say \"hi\"\\");
    assert_eq!(
        updated,
        "fn t() {\n    t.expect(\"\n        say \\\"hi\\\"\\\\\n        \");\n}\n"
    );
    assert_eq!(value_at(&updated, Position::new(2, 7)), "say \"hi\"\\");
}

#[test]
fn crlf_file_keeps_crlf_line_endings() {
    let content = "fn t() {\r\n    t.expect(r\"\r\n        a\r\n        \");\r\n}\r\n";
    let updated = splice(content, Position::new(2, 7), "a\nb");
    assert_eq!(
        updated,
        "fn t() {\r\n    t.expect(r\"\r\n        a\r\n        b\r\n        \");\r\n}\r\n"
    );
    assert_eq!(
        encode("x", 0, Delimiter::Regular, LineEnding::CrLf),
        "\"\r\nx\r\n\""
    );
}

#[test]
fn promoted_source_snapshot() {
    let updated = splice(SOURCE, Position::new(6, 7), "Ok\n\n  Oops");
    insta::assert_snapshot!(updated, @r###"
    #[test]
    fn ok_oops() {
        let mut t = ExpectTest::default();
        t.println("Ok");
        t.print("Oops");
        t.expect(r#"
            Ok

              Oops
            "#);
    }
    "###);
}
