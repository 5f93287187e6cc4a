// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Driving a tokenizer and a grammar together into expressions.
//!
//! [Reader::step] is the chunk-at-a-time primitive: it extracts every
//! token still available from the chunk at hand before suspending, so
//! control returns to the caller only for a finished expression, an
//! error, end of input, or a genuine need for more characters. The
//! suspended state is a [Continuation], a self-contained value; any
//! number of sessions can be interleaved, and abandoning one is just
//! dropping its continuation.
//!
//! On top of it sit [Reader::read_str] (whole-string reads built from
//! `step`), [Reader::parse_all] / [Reader::read_all] (batch reads of a
//! `Read` source via the tokenizer's bulk mode, all-or-nothing, with
//! or without the starting line of each expression), the
//! [parse_file] / [read_file] / [read_string] conveniences, and
//! [LineSession] for prompted line-oriented reading.

use crate::grammar::{
    Grammar, GrammarError, GrammarErrorAtLine, ParseStep, SexprGrammar,
    TokenInput,
};
use crate::lex::{
    Chunk, LexError, LexErrorAtLine, Lexer, TokenStep, Tokenize,
    TokensToEndError,
};
use crate::pos::Line;
use crate::value::SExpr;
use anyhow::anyhow;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Which collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Io,
    Tokenizer,
    Parser,
}

#[derive(Debug)]
pub enum ReadError {
    Io(anyhow::Error),
    Lex(LexError),
    Grammar(GrammarError),
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ReadError::Io(e) => Display::fmt(e, f),
            ReadError::Lex(e) => Display::fmt(e, f),
            ReadError::Grammar(e) => Display::fmt(e, f),
        }
    }
}

/// Any collaborator failure, normalized: the underlying error, and
/// the line it happened on (`None` for I/O failures, where a position
/// is not meaningful). Rendering defers to the owning collaborator's
/// own error text.
#[derive(Debug)]
pub struct ReadErrorAtLine {
    pub err: ReadError,
    pub line: Option<Line>,
}

impl ReadErrorAtLine {
    fn io(e: anyhow::Error) -> ReadErrorAtLine {
        ReadErrorAtLine {
            err: ReadError::Io(e),
            line: None,
        }
    }

    pub fn origin(&self) -> ErrorSource {
        match self.err {
            ReadError::Io(_) => ErrorSource::Io,
            ReadError::Lex(_) => ErrorSource::Tokenizer,
            ReadError::Grammar(_) => ErrorSource::Parser,
        }
    }
}

impl Display for ReadErrorAtLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        if let Some(line) = self.line {
            f.write_fmt(format_args!("{} at {}", self.err, line))
        } else {
            Display::fmt(&self.err, f)
        }
    }
}

impl std::error::Error for ReadErrorAtLine {}

impl From<LexErrorAtLine> for ReadErrorAtLine {
    fn from(e: LexErrorAtLine) -> ReadErrorAtLine {
        ReadErrorAtLine {
            err: ReadError::Lex(e.err),
            line: Some(e.line),
        }
    }
}

impl From<GrammarErrorAtLine> for ReadErrorAtLine {
    fn from(e: GrammarErrorAtLine) -> ReadErrorAtLine {
        ReadErrorAtLine {
            err: ReadError::Grammar(e.err),
            line: Some(e.line),
        }
    }
}

impl From<TokensToEndError> for ReadErrorAtLine {
    fn from(e: TokensToEndError) -> ReadErrorAtLine {
        match e {
            TokensToEndError::Io(e) => ReadErrorAtLine::io(e),
            TokensToEndError::Lex(e) => e.into(),
        }
    }
}

/// The complete resumable state of one reading session: the paired
/// tokenizer and grammar states. Pure data — it holds no file handle,
/// device, or anything shared with another session — so sessions can
/// be interleaved freely and abandoned by dropping the value. Each
/// step replaces the continuation rather than mutating it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Continuation<TS, GS> {
    #[default]
    Empty,
    Partial(TS, GS),
}

/// Outcome of one [Reader::step] call.
#[derive(Debug)]
pub enum Step<'a, TS, GS> {
    /// A complete toplevel expression, the line after it, and the
    /// characters of the chunk it did not consume. The grammar state
    /// is discarded: the next expression starts from a fresh
    /// continuation, fed the leftover first.
    Done {
        expr: SExpr,
        end_line: Line,
        leftover: &'a str,
    },
    Error {
        err: ReadErrorAtLine,
        leftover: &'a str,
    },
    Eof {
        leftover: &'a str,
    },
    /// The chunk is exhausted with no terminal outcome yet.
    More(Continuation<TS, GS>),
}

/// Drives a [Tokenize] and a [Grammar] implementation over input
/// delivered in arbitrarily sized chunks.
#[derive(Debug, Clone, Default)]
pub struct Reader<T: Tokenize, G: Grammar> {
    pub tokenizer: T,
    pub grammar: G,
}

impl Reader<Lexer, SexprGrammar> {
    /// A reader over the default S-expression tokenizer and grammar.
    pub fn new() -> Self {
        Reader::default()
    }
}

impl<T: Tokenize, G: Grammar> Reader<T, G> {
    pub fn with(tokenizer: T, grammar: G) -> Self {
        Reader { tokenizer, grammar }
    }

    /// Advance a session by one chunk. Extracts and parses as many
    /// tokens as the chunk allows: the call suspends with
    /// [Step::More] only once the tokenizer itself needs more
    /// characters, never while tokens are still extractable from the
    /// input already at hand.
    ///
    /// An empty text chunk against an empty continuation is a no-op
    /// that immediately asks for more input. Passing [Chunk::End]
    /// resolves the session deterministically: a pending expression
    /// becomes a premature-EOF error, otherwise the step reports
    /// [Step::Eof].
    pub fn step<'a>(
        &self,
        continuation: Continuation<T::State, G::State>,
        chunk: Chunk<'a>,
        line: Line,
    ) -> Step<'a, T::State, G::State> {
        let (mut ts, mut gs) = match continuation {
            Continuation::Empty => (T::State::default(), G::State::default()),
            Continuation::Partial(ts, gs) => (ts, gs),
        };
        let mut chunk = chunk;
        let mut line = line;
        loop {
            match self.tokenizer.token(ts, chunk, line) {
                TokenStep::More(ts2) => {
                    return Step::More(Continuation::Partial(ts2, gs))
                }
                TokenStep::Error(e, leftover) => {
                    return Step::Error {
                        err: e.into(),
                        leftover,
                    }
                }
                TokenStep::Eof(leftover) => {
                    if self.grammar.is_pending(&gs) {
                        return match self.grammar.parse(
                            gs, TokenInput::ForcedEof(line)) {
                            ParseStep::Error(e) => Step::Error {
                                err: e.into(),
                                leftover,
                            },
                            ParseStep::Complete(expr) => Step::Done {
                                expr,
                                end_line: line,
                                leftover,
                            },
                            ParseStep::NeedMore(_) => Step::Eof { leftover },
                        };
                    }
                    return Step::Eof { leftover };
                }
                TokenStep::Done(token, end_line, rest) => {
                    line = end_line;
                    ts = T::State::default();
                    chunk = match chunk {
                        Chunk::End => Chunk::End,
                        Chunk::Text(_) => Chunk::Text(rest),
                    };
                    match self.grammar.parse(gs, TokenInput::Token(token)) {
                        ParseStep::Complete(expr) => {
                            return Step::Done {
                                expr,
                                end_line: line,
                                leftover: rest,
                            }
                        }
                        ParseStep::Error(e) => {
                            return Step::Error {
                                err: e.into(),
                                leftover: rest,
                            }
                        }
                        ParseStep::NeedMore(gs2) => gs = gs2,
                    }
                }
            }
        }
    }

    /// Read every expression out of a complete string, in order.
    /// Built from [Reader::step]: each `Done` leftover is fed back
    /// against an empty continuation until the string is exhausted.
    pub fn read_str(&self, s: &str, start_line: Line)
                    -> Result<Vec<SExpr>, ReadErrorAtLine> {
        let mut exprs = Vec::new();
        let mut k = Continuation::Empty;
        let mut rest = s;
        let mut line = start_line;
        let mut at_end = false;
        loop {
            let chunk = if at_end { Chunk::End } else { Chunk::Text(rest) };
            match self.step(k, chunk, line) {
                Step::Done {
                    expr,
                    end_line,
                    leftover,
                } => {
                    exprs.push(expr);
                    k = Continuation::Empty;
                    line = end_line;
                    rest = leftover;
                }
                Step::More(k2) => {
                    k = k2;
                    at_end = true;
                }
                Step::Eof { .. } => return Ok(exprs),
                Step::Error { err, .. } => return Err(err),
            }
        }
    }

    /// Read every toplevel expression from a `Read` source, tagged
    /// with the line its first token is on. The whole source is
    /// tokenized first via the tokenizer's bulk mode, then split into
    /// expressions. All-or-nothing: any I/O, lexical or structural
    /// error fails the whole call with no partial results, and a
    /// source ending mid-expression fails with the deterministic
    /// premature-EOF error.
    pub fn parse_all(&self, source: impl Read, start_line: Line)
                     -> Result<Vec<(SExpr, Line)>, ReadErrorAtLine> {
        let (tokens, end_line) =
            self.tokenizer.tokens_to_end(source, start_line)?;
        trace!(tokens = tokens.len(), "tokenized source");
        let mut exprs = Vec::new();
        let mut gs = G::State::default();
        let mut start: Option<Line> = None;
        for t in tokens {
            let at = *start.get_or_insert(t.1);
            match self.grammar.parse(gs, TokenInput::Token(t)) {
                ParseStep::Complete(expr) => {
                    exprs.push((expr, at));
                    start = None;
                    gs = G::State::default();
                }
                ParseStep::NeedMore(gs2) => gs = gs2,
                ParseStep::Error(e) => return Err(e.into()),
            }
        }
        if self.grammar.is_pending(&gs) {
            match self.grammar.parse(gs, TokenInput::ForcedEof(end_line)) {
                ParseStep::Error(e) => return Err(e.into()),
                ParseStep::Complete(expr) => {
                    exprs.push((expr, start.unwrap_or(end_line)));
                }
                ParseStep::NeedMore(_) => {}
            }
        }
        Ok(exprs)
    }

    /// [Reader::parse_all] without the position tags.
    pub fn read_all(&self, source: impl Read, start_line: Line)
                    -> Result<Vec<SExpr>, ReadErrorAtLine> {
        Ok(self
            .parse_all(source, start_line)?
            .into_iter()
            .map(|(expr, _)| expr)
            .collect())
    }
}

/// Read every expression out of a complete string with the default
/// tokenizer and grammar, starting at line 1.
pub fn read_string(s: &str) -> Result<Vec<SExpr>, ReadErrorAtLine> {
    Reader::new().read_str(s, Line::FIRST)
}

/// Read a whole file into its expressions, each tagged with its
/// starting line. The file handle is owned by this call and released
/// on every exit path.
pub fn parse_file(path: &Path) -> Result<Vec<(SExpr, Line)>, ReadErrorAtLine> {
    debug!(path = ?path, "reading file");
    let fh = File::open(path)
        .map_err(|e| ReadErrorAtLine::io(anyhow!("opening {:?}: {}", path, e)))?;
    Reader::new().parse_all(fh, Line::FIRST)
}

/// [parse_file] without the position tags.
pub fn read_file(path: &Path) -> Result<Vec<SExpr>, ReadErrorAtLine> {
    debug!(path = ?path, "reading file");
    let fh = File::open(path)
        .map_err(|e| ReadErrorAtLine::io(anyhow!("opening {:?}: {}", path, e)))?;
    Reader::new().read_all(fh, Line::FIRST)
}

/// One acquired line, or the end of the line source, or its failure.
#[derive(Debug)]
pub enum LineOutcome {
    Line(String),
    Eof,
    Error(anyhow::Error),
}

/// A source of prompted lines. Prompt display and history recording
/// are the implementation's concern, not the reader's.
pub trait LineSource {
    fn next_line(&mut self, prompt: &str) -> LineOutcome;
}

/// A [LineSource] over any buffered reader, writing the prompt to the
/// given sink first. Lines keep their trailing newline so that line
/// counting and token separation work unchanged.
#[derive(Debug)]
pub struct PromptedLines<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptedLines<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptedLines { input, output }
    }
}

impl<R: BufRead, W: Write> LineSource for PromptedLines<R, W> {
    fn next_line(&mut self, prompt: &str) -> LineOutcome {
        if let Err(e) = self
            .output
            .write_all(prompt.as_bytes())
            .and_then(|()| self.output.flush())
        {
            return LineOutcome::Error(e.into());
        }
        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => LineOutcome::Eof,
            Ok(_) => LineOutcome::Line(buf),
            Err(e) => LineOutcome::Error(e.into()),
        }
    }
}

/// Outcome of [LineSession::read_one].
#[derive(Debug)]
pub enum ReadOutcome {
    Done(SExpr),
    Error(ReadErrorAtLine),
    Eof,
}

/// Line-oriented reading for interactive use: acquires one line at a
/// time from a [LineSource] and feeds it through [Reader::step] until
/// an expression completes or the input ends.
///
/// Characters left on the line that completed an expression are
/// discarded, not carried into the next read; only their newlines are
/// counted so the running line stays accurate. After an error the
/// session stays usable for a fresh expression.
#[derive(Debug)]
pub struct LineSession<T: Tokenize, G: Grammar, L: LineSource> {
    reader: Reader<T, G>,
    source: L,
    line: Line,
}

impl<T: Tokenize, G: Grammar, L: LineSource> LineSession<T, G, L> {
    pub fn new(reader: Reader<T, G>, source: L) -> Self {
        LineSession {
            reader,
            source,
            line: Line::FIRST,
        }
    }

    /// The current line counter, advanced as lines are consumed.
    pub fn line(&self) -> Line {
        self.line
    }

    fn settle(&mut self, leftover: &str) {
        self.line = self.line.advance(
            leftover.chars().filter(|c| *c == '\n').count() as u32);
    }

    pub fn read_one(&mut self, prompt: &str) -> ReadOutcome {
        let mut k = Continuation::Empty;
        loop {
            let text = match self.source.next_line(prompt) {
                LineOutcome::Error(e) => {
                    return ReadOutcome::Error(ReadErrorAtLine::io(e))
                }
                LineOutcome::Eof => {
                    // resolve a half-read expression deterministically
                    return match self.reader.step(k, Chunk::End, self.line) {
                        Step::Done { expr, end_line, .. } => {
                            self.line = end_line;
                            ReadOutcome::Done(expr)
                        }
                        Step::Error { err, .. } => ReadOutcome::Error(err),
                        Step::Eof { .. } | Step::More(_) => ReadOutcome::Eof,
                    };
                }
                LineOutcome::Line(text) => text,
            };
            trace!(line = %self.line, "acquired line");
            match self.reader.step(k, Chunk::Text(&text), self.line) {
                Step::Done {
                    expr,
                    end_line,
                    leftover,
                } => {
                    self.line = end_line;
                    self.settle(leftover);
                    return ReadOutcome::Done(expr);
                }
                Step::Error { err, leftover } => {
                    if let Some(line) = err.line {
                        self.line = self.line.max(line);
                    }
                    self.settle(leftover);
                    return ReadOutcome::Error(err);
                }
                Step::Eof { .. } => return ReadOutcome::Eof,
                Step::More(k2) => k = k2,
            }
        }
    }
}
