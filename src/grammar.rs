// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Assembling tokens into expressions, one token per call. The state
//! between calls is an explicit value ([GrammarState] for the default
//! [SexprGrammar]), so an expression half-built from the tokens seen
//! so far survives any suspension of the token supply.

use crate::lex::{Token, TokenWithLine};
use crate::pos::Line;
use crate::value::{symbol, Parenkind, SExpr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("unexpected closing character '{}'", .0.closing())]
    UnexpectedClosingParen(Parenkind),
    #[error("'{}' at {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    ParenMismatch(Parenkind, Line, Parenkind),
    #[error("premature EOF while expecting closing character '{}' for '{}'",
            .0.closing(), .0.opening())]
    PrematureEofExpectingClosingParen(Parenkind),
    #[error("premature EOF after quoting character")]
    PrematureEofAfterQuote,
    #[error("quoting character without a following item")]
    QuoteWithoutItem,
    #[error("nesting too deep")]
    NestingTooDeep,
}

#[derive(Error, Debug)]
#[error("{err} at {line}")]
pub struct GrammarErrorAtLine {
    pub err: GrammarError,
    pub line: Line,
}

impl GrammarError {
    fn at(self, line: Line) -> GrammarErrorAtLine {
        GrammarErrorAtLine { err: self, line }
    }
}

/// What the reader feeds the grammar: a real token, or the synthetic
/// end-of-input marker at the last known line, used to resolve an
/// expression left incomplete at the true end of input.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenInput {
    Token(TokenWithLine),
    ForcedEof(Line),
}

/// Outcome of one [Grammar::parse] call. A `Complete` returns no
/// state: a finished expression always starts the next one fresh.
#[derive(Debug)]
pub enum ParseStep<S> {
    Complete(SExpr),
    NeedMore(S),
    Error(GrammarErrorAtLine),
}

/// A resumable token-to-expression parser. State values are pure
/// data; parsing the same state and input twice gives equal results.
pub trait Grammar {
    type State: Default + Clone + std::fmt::Debug;

    fn parse(&self, state: Self::State, input: TokenInput)
             -> ParseStep<Self::State>;

    /// True if the state is mid-expression, i.e. some input was
    /// already consumed toward an expression that has not completed.
    fn is_pending(&self, state: &Self::State) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sugar {
    Quote,
    Quasiquote,
    Unquote,
}

impl Sugar {
    fn name(self) -> &'static str {
        match self {
            Sugar::Quote => "quote",
            Sugar::Quasiquote => "quasiquote",
            Sugar::Unquote => "unquote",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Frame {
    kind: Parenkind,
    /// Line of the opening paren, for mismatch reporting.
    line: Line,
    items: Vec<SExpr>,
    /// Quoting tokens waiting for the next item at this level.
    pending: Vec<Sugar>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarState {
    stack: Vec<Frame>,
    /// Quoting tokens waiting for the next toplevel item.
    pending: Vec<Sugar>,
}

/// The default grammar: matched parens of three kinds, quote sugar
/// expanded to `(quote x)` etc., and a nesting depth limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SexprGrammar {
    /// Maximum list nesting depth.
    pub depth_fuel: u32,
}

impl Default for SexprGrammar {
    fn default() -> Self {
        SexprGrammar { depth_fuel: 500 }
    }
}

fn wrap(s: Sugar, expr: SExpr) -> SExpr {
    SExpr::List(Parenkind::Round, vec![symbol(s.name()), expr])
}

// Hand a finished item to the innermost open list, or complete the
// toplevel expression, applying any waiting quote sugar either way.
fn deliver(mut st: GrammarState, expr: SExpr) -> ParseStep<GrammarState> {
    let mut expr = expr;
    if let Some(frame) = st.stack.last_mut() {
        while let Some(s) = frame.pending.pop() {
            expr = wrap(s, expr);
        }
        frame.items.push(expr);
        ParseStep::NeedMore(st)
    } else {
        while let Some(s) = st.pending.pop() {
            expr = wrap(s, expr);
        }
        ParseStep::Complete(expr)
    }
}

impl Grammar for SexprGrammar {
    type State = GrammarState;

    fn parse(&self, state: GrammarState, input: TokenInput)
             -> ParseStep<GrammarState> {
        let mut st = state;
        let TokenWithLine(t, line) = match input {
            TokenInput::ForcedEof(line) => {
                return if let Some(frame) = st.stack.last() {
                    ParseStep::Error(
                        GrammarError::PrematureEofExpectingClosingParen(
                            frame.kind).at(line))
                } else if !st.pending.is_empty() {
                    ParseStep::Error(
                        GrammarError::PrematureEofAfterQuote.at(line))
                } else {
                    // nothing pending to resolve
                    ParseStep::NeedMore(st)
                };
            }
            TokenInput::Token(tl) => tl,
        };
        match t {
            Token::Open(pk) => {
                if st.stack.len() as u32 >= self.depth_fuel {
                    return ParseStep::Error(
                        GrammarError::NestingTooDeep.at(line));
                }
                st.stack.push(Frame {
                    kind: pk,
                    line,
                    items: Vec::new(),
                    pending: Vec::new(),
                });
                ParseStep::NeedMore(st)
            }
            Token::Close(pk) => match st.stack.pop() {
                None => ParseStep::Error(
                    GrammarError::UnexpectedClosingParen(pk).at(line)),
                Some(frame) => {
                    if frame.kind != pk {
                        return ParseStep::Error(
                            GrammarError::ParenMismatch(
                                frame.kind, frame.line, pk).at(line));
                    }
                    if !frame.pending.is_empty() {
                        return ParseStep::Error(
                            GrammarError::QuoteWithoutItem.at(line));
                    }
                    deliver(st, SExpr::List(frame.kind, frame.items))
                }
            },
            Token::Atom(a) => deliver(st, SExpr::Atom(a)),
            Token::Quote => {
                push_sugar(&mut st, Sugar::Quote);
                ParseStep::NeedMore(st)
            }
            Token::Quasiquote => {
                push_sugar(&mut st, Sugar::Quasiquote);
                ParseStep::NeedMore(st)
            }
            Token::Unquote => {
                push_sugar(&mut st, Sugar::Unquote);
                ParseStep::NeedMore(st)
            }
        }
    }

    fn is_pending(&self, state: &GrammarState) -> bool {
        !state.stack.is_empty() || !state.pending.is_empty()
    }
}

fn push_sugar(st: &mut GrammarState, s: Sugar) {
    if let Some(frame) = st.stack.last_mut() {
        frame.pending.push(s);
    } else {
        st.pending.push(s);
    }
}
