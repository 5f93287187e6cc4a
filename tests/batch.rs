//! Whole-source reads: ordered decomposition, position tags,
//! all-or-nothing failure, and deterministic premature-EOF.

use sexpr_stream::grammar::SexprGrammar;
use sexpr_stream::lex::Lexer;
use sexpr_stream::pos::Line;
use sexpr_stream::read::{
    parse_file, read_string, ErrorSource, Reader,
};
use std::io::Cursor;
use std::path::Path;

#[test]
fn two_expressions_in_source_order() {
    let exprs = read_string("(+ 1 2) (* 3 4)").unwrap();
    let shown: Vec<String> = exprs.iter().map(|e| format!("{}", e)).collect();
    assert_eq!(shown, vec!["(+ 1 2)", "(* 3 4)"]);
}

#[test]
fn starting_line_of_each_expression() {
    let src = "(a)\n(b\n  c)\n\n(d)";
    let tagged = Reader::new()
        .parse_all(Cursor::new(src), Line::FIRST)
        .unwrap();
    let lines: Vec<Line> = tagged.iter().map(|(_, l)| *l).collect();
    assert_eq!(lines, vec![Line(1), Line(2), Line(5)]);
}

#[test]
fn tagged_and_untagged_reads_agree() {
    let src = ";; header\n(a (b c))\n'(d)\n\"e\"\n12";
    let reader = Reader::new();
    let tagged = reader.parse_all(Cursor::new(src), Line::FIRST).unwrap();
    let untagged = reader.read_all(Cursor::new(src), Line::FIRST).unwrap();
    let stepped = reader.read_str(src, Line::FIRST).unwrap();
    let from_tagged: Vec<_> = tagged.into_iter().map(|(e, _)| e).collect();
    assert_eq!(from_tagged, untagged);
    assert_eq!(untagged, stepped);
}

#[test]
fn structural_error_fails_the_whole_source() {
    // the clean prefix must not come back as a partial result
    let err = read_string("(a) (b) (c ]").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Parser);
    assert!(format!("{}", err).contains("expects ')'"), "{}", err);

    let err = read_string("(a) )").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Parser);
    assert!(format!("{}", err).contains("unexpected closing"), "{}", err);
}

#[test]
fn unterminated_source_is_a_premature_eof_error() {
    let err = read_string("( a b").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Parser);
    assert_eq!(err.line, Some(Line(1)));
    assert!(format!("{}", err).contains("premature EOF"), "{}", err);

    // the error references the last line of the source
    let err = Reader::new()
        .read_all(Cursor::new("(a\nb\nc"), Line::FIRST)
        .unwrap_err();
    assert_eq!(err.line, Some(Line(3)));
}

#[test]
fn unterminated_expression_returns_no_expressions() {
    let err = read_string("(+ 1 2").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Parser);
    assert!(format!("{}", err).contains("premature EOF"), "{}", err);
}

#[test]
fn unterminated_string_is_a_tokenizer_error() {
    let err = read_string("(foo \"bar").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Tokenizer);
    assert!(format!("{}", err).contains("unexpected EOF in string"), "{}", err);
}

#[test]
fn missing_file_is_an_io_error_without_a_line() {
    let err = parse_file(Path::new("no/such/file.scm")).unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Io);
    assert_eq!(err.line, None);
}

#[test]
fn atoms_of_every_kind() {
    let exprs = read_string("#t #f -5 7/3 \"s\" x").unwrap();
    let shown: Vec<String> = exprs.iter().map(|e| format!("{}", e)).collect();
    assert_eq!(shown, vec!["#t", "#f", "-5", "7/3", "\"s\"", "x"]);
}

#[test]
fn nesting_deeper_than_the_fuel_is_an_error() {
    let reader = Reader::with(Lexer, SexprGrammar { depth_fuel: 3 });
    let err = reader.read_str("((((a))))", Line::FIRST).unwrap_err();
    assert!(format!("{}", err).contains("nesting too deep"), "{}", err);
    assert!(reader.read_str("(((a)))", Line::FIRST).is_ok());
}

#[test]
fn invalid_hash_token_is_a_tokenizer_error() {
    let err = read_string("(#q)").unwrap_err();
    assert_eq!(err.origin(), ErrorSource::Tokenizer);
}
