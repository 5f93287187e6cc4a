// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating characters to tokens, one token per call, resumable at
//! any chunk boundary. The scanner fully parses atoms (strings,
//! numbers, booleans, symbols); the only tokens that denote nesting
//! are [Token::Open] and [Token::Close]. See [read](crate::read) if
//! interested in trees rather than atoms / tokens.
//!
//! The scanner is driven through the [Tokenize] trait so that the
//! reader can be tested against fakes; [Lexer] is the default
//! implementation. Its resumable state is [LexState], plain data: a
//! scan suspended in the middle of a token (or of a run of whitespace
//! spanning several lines) carries everything needed to continue in
//! the state value itself.

use crate::number::Number;
use crate::pos::Line;
use crate::value::{Atom, Parenkind};
use anyhow::anyhow;
use kstring::KString;
use num::{rational::Ratio, BigInt, Zero};
use std::io::{BufReader, Read};
use thiserror::Error;
use utf8::BufReadDecoder;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("unexpected EOF in string delimited by '{0}'")]
    UnexpectedEofInString(char),
    #[error("invalid escaped character '{0}'")]
    InvalidEscapedChar(char),
    #[error("invalid '#' token \"#{0}\"")]
    InvalidHashToken(KString),
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

#[derive(Error, Debug)]
#[error("{err} at {line}")]
pub struct LexErrorAtLine {
    pub err: LexError,
    pub line: Line,
}

impl LexError {
    fn at(self, line: Line) -> LexErrorAtLine {
        LexErrorAtLine { err: self, line }
    }
}

/// One delivery of input characters, or the marker that the input has
/// truly ended. `End` is what flushes a trailing atom (which is only
/// known to be complete once nothing can follow it) and what makes
/// suspended readers resolve instead of asking for more input forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    Text(&'a str),
    End,
}

impl<'a> Chunk<'a> {
    pub fn text(self) -> &'a str {
        match self {
            Chunk::Text(s) => s,
            Chunk::End => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Atom(Atom),
    Quote,
    Quasiquote,
    Unquote,
    Open(Parenkind),
    Close(Parenkind),
}

/// A token together with the line its first character is on.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithLine(pub Token, pub Line);

/// Outcome of one [Tokenize::token] call.
#[derive(Debug)]
pub enum TokenStep<'a, S> {
    /// One token, the line after it, and the unconsumed rest of the
    /// chunk. A delimiter that merely ended a token (whitespace, a
    /// paren) is left in the rest.
    Done(TokenWithLine, Line, &'a str),
    /// The input ended with no token pending.
    Eof(&'a str),
    Error(LexErrorAtLine, &'a str),
    /// The chunk is exhausted; resume with the returned state and the
    /// next chunk.
    More(S),
}

#[derive(Error, Debug)]
pub enum TokensToEndError {
    #[error("{0}")]
    Io(anyhow::Error),
    #[error("{0}")]
    Lex(#[from] LexErrorAtLine),
}

/// A resumable character-to-token scanner.
///
/// `token` never consumes more of the chunk than the one token it
/// returns; everything after that token comes back verbatim as the
/// rest, so that a caller interleaving scanning with parsing can stop
/// at any token. State values are pure data: calling `token` twice
/// with equal states, chunks and lines gives equal results.
pub trait Tokenize {
    type State: Default + Clone + std::fmt::Debug;

    fn token<'a>(&self, state: Self::State, chunk: Chunk<'a>, line: Line)
                 -> TokenStep<'a, Self::State>;

    /// Bulk mode: drain a whole `Read` source into its ordered token
    /// list and the line after the final token. Provided in terms of
    /// `token`, feeding it the decoded chunks exactly as the buffered
    /// reader delivers them, then `Chunk::End`.
    fn tokens_to_end(&self, source: impl Read, start_line: Line)
                     -> Result<(Vec<TokenWithLine>, Line), TokensToEndError> {
        let mut inp = BufReadDecoder::new(BufReader::new(source));
        let mut tokens = Vec::new();
        let mut state = Self::State::default();
        let mut line = start_line;
        while let Some(r) = inp.next_strict() {
            let mut text = match r {
                Ok(s) => s,
                Err(e) => {
                    return Err(TokensToEndError::Io(
                        anyhow!("decoding input: {}", e)))
                }
            };
            loop {
                match self.token(state, Chunk::Text(text), line) {
                    TokenStep::Done(t, l, rest) => {
                        tokens.push(t);
                        line = l;
                        state = Self::State::default();
                        text = rest;
                    }
                    TokenStep::More(s) => {
                        state = s;
                        break;
                    }
                    TokenStep::Error(e, _) => return Err(e.into()),
                    TokenStep::Eof(_) => {
                        state = Self::State::default();
                        break;
                    }
                }
            }
        }
        loop {
            match self.token(state, Chunk::End, line) {
                TokenStep::Done(t, l, _) => {
                    tokens.push(t);
                    line = l;
                    state = Self::State::default();
                }
                TokenStep::Eof(_) => return Ok((tokens, line)),
                TokenStep::Error(e, _) => return Err(e.into()),
                TokenStep::More(_) => {
                    return Err(TokensToEndError::Io(anyhow!(
                        "tokenizer requested more input at end of input")))
                }
            }
        }
    }
}

pub fn maybe_open_close(c: char) -> Option<Token> {
    match c {
        '(' => Some(Token::Open(Parenkind::Round)),
        '[' => Some(Token::Open(Parenkind::Square)),
        '{' => Some(Token::Open(Parenkind::Curly)),
        ')' => Some(Token::Close(Parenkind::Round)),
        ']' => Some(Token::Close(Parenkind::Square)),
        '}' => Some(Token::Close(Parenkind::Curly)),
        _ => None,
    }
}

fn char2special_token(c: char) -> Option<Token> {
    match c {
        '\'' => Some(Token::Quote),
        '`' => Some(Token::Quasiquote),
        ',' => Some(Token::Unquote),
        _ => None,
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace()
        && char2special_token(c).is_none()
        && maybe_open_close(c).is_none()
        && c != '"'
        && c != ';'
        && c != '\\'
}

fn unescape(c: char) -> Option<char> {
    match c {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'v' => Some('\x0B'),
        'f' => Some('\x0C'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        _ => None,
    }
}

fn read_number(is_neg: bool, s: &str) -> Option<Number> {
    let mut n: BigInt = 0.into();
    let mut cs = s.chars();
    while let Some(c) = cs.next() {
        if c.is_ascii_digit() {
            n = n * 10 + c.to_digit(10).unwrap();
        } else if c == '/' {
            let numer = n;
            let mut n: BigInt = 0.into();
            let mut seen_digit = false;
            for c in cs.by_ref() {
                if c.is_ascii_digit() {
                    n = n * 10 + c.to_digit(10).unwrap();
                    seen_digit = true;
                } else {
                    return None;
                }
            }
            let denom = n;
            if !seen_digit || denom.is_zero() {
                return None;
            }
            let n = Ratio::<BigInt>::new(numer, denom);
            return Some(Number::Rational(Box::new(if is_neg { -n } else { n })));
        } else {
            // XXX: floating point and the mixes.
            return None;
        }
    }
    Some(Number::Integer(if is_neg { -n } else { n }))
}

fn classify_word(s: &str) -> Option<Number> {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) if c.is_ascii_digit() => read_number(false, s),
        Some('-') if s.len() > 1 => read_number(true, &s[1..]),
        _ => None,
    }
}

/// Resumable scanner state. `lines` counts the newlines consumed
/// under this state, relative to the line the caller passed in when
/// the state was fresh; the caller's counter does not move until a
/// token (or a terminal outcome) comes back with an updated line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexState {
    lines: u32,
    mode: Mode,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Mode {
    #[default]
    Idle,
    Comment,
    /// A symbol, number or boolean word in progress. Words cannot
    /// contain newlines, so the word starts on the current line.
    Word { buf: String },
    /// After `#`, accumulating the hash word.
    Hash { buf: String },
    /// Inside a string literal; `at` is the `lines` value at the
    /// opening quote (strings may span lines).
    Str { buf: String, at: u32, escaped: bool },
}

/// The default tokenizer: parens `()[]{}`, `;` line comments, `"`
/// strings with the common escapes (and escaped newline as line
/// continuation), `#t`/`#f`, quoting characters, integers and
/// rationals, symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer;

fn word_token(buf: &str, line: Line) -> TokenWithLine {
    let t = if let Some(n) = classify_word(buf) {
        Token::Atom(Atom::Number(n))
    } else {
        Token::Atom(Atom::Symbol(KString::from_ref(buf)))
    };
    TokenWithLine(t, line)
}

fn hash_token<'a>(buf: &str, line: Line, rest: &'a str)
                  -> TokenStep<'a, LexState> {
    match buf {
        "t" => TokenStep::Done(
            TokenWithLine(Token::Atom(Atom::Bool(true)), line), line, rest),
        "f" => TokenStep::Done(
            TokenWithLine(Token::Atom(Atom::Bool(false)), line), line, rest),
        _ => TokenStep::Error(
            LexError::InvalidHashToken(KString::from_ref(buf)).at(line), rest),
    }
}

// The token pending at true end of input, if any.
fn flush_at_end(mode: Mode, lines: u32, line: Line) -> TokenStep<'static, LexState> {
    match mode {
        Mode::Idle | Mode::Comment => TokenStep::Eof(""),
        Mode::Word { buf } => {
            let at = line.advance(lines);
            TokenStep::Done(word_token(&buf, at), at, "")
        }
        Mode::Hash { buf } => hash_token(&buf, line.advance(lines), ""),
        Mode::Str { at, .. } => TokenStep::Error(
            LexError::UnexpectedEofInString('"').at(line.advance(at)), ""),
    }
}

impl Tokenize for Lexer {
    type State = LexState;

    fn token<'a>(&self, state: LexState, chunk: Chunk<'a>, line: Line)
                 -> TokenStep<'a, LexState> {
        let LexState { mut lines, mut mode } = state;
        let text = match chunk {
            Chunk::Text(t) => t,
            Chunk::End => return flush_at_end(mode, lines, line),
        };
        let mut chars = text.char_indices();
        while let Some((i, c)) = chars.next() {
            let after = &text[i + c.len_utf8()..];
            match &mut mode {
                Mode::Idle => {
                    if c == '\n' {
                        lines += 1;
                    }
                    if c.is_whitespace() {
                        continue;
                    }
                    let at = line.advance(lines);
                    if let Some(t) = maybe_open_close(c) {
                        return TokenStep::Done(TokenWithLine(t, at), at, after);
                    }
                    if let Some(t) = char2special_token(c) {
                        return TokenStep::Done(TokenWithLine(t, at), at, after);
                    }
                    match c {
                        ';' => mode = Mode::Comment,
                        '"' => {
                            mode = Mode::Str {
                                buf: String::new(),
                                at: lines,
                                escaped: false,
                            }
                        }
                        '#' => mode = Mode::Hash { buf: String::new() },
                        '\\' => {
                            return TokenStep::Error(
                                LexError::UnexpectedChar(c).at(at), after)
                        }
                        _ => mode = Mode::Word { buf: String::from(c) },
                    }
                }
                Mode::Comment => {
                    if c == '\n' {
                        lines += 1;
                        mode = Mode::Idle;
                    }
                }
                Mode::Word { buf } => {
                    if is_word_char(c) {
                        buf.push(c);
                    } else {
                        // the delimiter is not consumed
                        let at = line.advance(lines);
                        return TokenStep::Done(word_token(buf, at), at, &text[i..]);
                    }
                }
                Mode::Hash { buf } => {
                    if is_word_char(c) {
                        buf.push(c);
                    } else {
                        return hash_token(buf, line.advance(lines), &text[i..]);
                    }
                }
                Mode::Str { buf, at, escaped } => {
                    if c == '\n' {
                        lines += 1;
                    }
                    if *escaped {
                        *escaped = false;
                        if c == '\n' {
                            // line continuation, contributes nothing
                        } else if let Some(r) = unescape(c) {
                            buf.push(r);
                        } else {
                            return TokenStep::Error(
                                LexError::InvalidEscapedChar(c)
                                    .at(line.advance(lines)),
                                after);
                        }
                    } else if c == '\\' {
                        *escaped = true;
                    } else if c == '"' {
                        let tok_line = line.advance(*at);
                        return TokenStep::Done(
                            TokenWithLine(
                                Token::Atom(Atom::String(
                                    KString::from_ref(buf))),
                                tok_line),
                            line.advance(lines),
                            after);
                    } else {
                        buf.push(c);
                    }
                }
            }
        }
        TokenStep::More(LexState { lines, mode })
    }
}
