//! Line-oriented interactive reading through `LineSession`.

use sexpr_stream::pos::Line;
use sexpr_stream::read::{
    ErrorSource, LineOutcome, LineSession, LineSource, ReadOutcome, Reader,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A deterministic line source over a fixed script; records the
/// prompts it was shown in a shared log.
struct ScriptLines {
    lines: Vec<String>,
    next: usize,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl ScriptLines {
    fn new(lines: &[&str]) -> Self {
        ScriptLines {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            next: 0,
            prompts: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn prompt_log(&self) -> Rc<RefCell<Vec<String>>> {
        self.prompts.clone()
    }
}

impl LineSource for ScriptLines {
    fn next_line(&mut self, prompt: &str) -> LineOutcome {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.lines.get(self.next) {
            Some(l) => {
                self.next += 1;
                LineOutcome::Line(l.clone())
            }
            None => LineOutcome::Eof,
        }
    }
}

fn session_over(lines: &[&str]) -> LineSession<
    sexpr_stream::lex::Lexer,
    sexpr_stream::grammar::SexprGrammar,
    ScriptLines,
> {
    LineSession::new(Reader::new(), ScriptLines::new(lines))
}

#[test]
fn one_expression_across_several_lines() {
    let mut session = session_over(&["(define x\n", "  42)\n"]);
    match session.read_one("> ") {
        ReadOutcome::Done(expr) => {
            assert_eq!(format!("{}", expr), "(define x 42)")
        }
        other => panic!("expected Done, got {:?}", other),
    }
    // both lines consumed, counter past them
    assert_eq!(session.line(), Line(3));
    assert!(matches!(session.read_one("> "), ReadOutcome::Eof));
}

#[test]
fn leftover_on_the_terminating_line_is_discarded() {
    let mut session = session_over(&["(a) (b)\n"]);
    match session.read_one("> ") {
        ReadOutcome::Done(expr) => assert_eq!(format!("{}", expr), "(a)"),
        other => panic!("expected Done, got {:?}", other),
    }
    // "(b)" is not carried over to the next read
    assert!(matches!(session.read_one("> "), ReadOutcome::Eof));
    assert_eq!(session.line(), Line(2));
}

#[test]
fn input_ending_mid_expression_is_a_premature_eof() {
    let mut session = session_over(&["(a\n"]);
    match session.read_one("> ") {
        ReadOutcome::Error(err) => {
            assert_eq!(err.origin(), ErrorSource::Parser);
            assert!(format!("{}", err).contains("premature EOF"), "{}", err);
        }
        other => panic!("expected Error, got {:?}", other),
    }
    assert!(matches!(session.read_one("> "), ReadOutcome::Eof));
}

#[test]
fn an_error_leaves_the_session_usable() {
    let mut session = session_over(&[")\n", "(ok)\n"]);
    match session.read_one("> ") {
        ReadOutcome::Error(err) => {
            assert_eq!(err.origin(), ErrorSource::Parser)
        }
        other => panic!("expected Error, got {:?}", other),
    }
    match session.read_one("> ") {
        ReadOutcome::Done(expr) => assert_eq!(format!("{}", expr), "(ok)"),
        other => panic!("expected Done, got {:?}", other),
    }
}

#[test]
fn the_prompt_reaches_the_line_source() {
    let source = ScriptLines::new(&["(define x\n", "  1)\n"]);
    let log = source.prompt_log();
    let mut session = LineSession::new(Reader::new(), source);
    assert!(matches!(session.read_one("λ> "), ReadOutcome::Done(_)));
    // one prompt per acquired line
    assert_eq!(*log.borrow(), vec!["λ> ", "λ> "]);
}
