// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The in-memory representation of a read expression: [Atom] for the
//! leaves, [SExpr] adding nested lists. Once a reader returns an
//! [SExpr] it is owned by the caller and shares nothing with the
//! session it came from.

use crate::number::Number;
use kstring::KString;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parenkind {
    Round,
    Square,
    Curly,
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{',
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Bool(bool),
    Number(Number),
    String(KString),
    Symbol(KString),
}

fn fmt_string(f: &mut std::fmt::Formatter<'_>, s: &KString)
              -> Result<(), std::fmt::Error> {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Atom::Bool(b) => f.write_str(if *b { "#t" } else { "#f" }),
            Atom::Number(n) => n.fmt(f),
            Atom::String(s) => fmt_string(f, s),
            Atom::Symbol(s) => f.write_str(s),
        }
    }
}

/// A structured symbolic expression: an atom, or an ordered collection
/// of expressions between a pair of parens.
#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    Atom(Atom),
    List(Parenkind, Vec<SExpr>),
}

impl std::fmt::Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            SExpr::Atom(a) => a.fmt(f),
            SExpr::List(pk, items) => {
                f.write_char(pk.opening())?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    item.fmt(f)?;
                }
                f.write_char(pk.closing())
            }
        }
    }
}

/// Easily create a symbol
pub fn symbol(s: &str) -> SExpr {
    SExpr::Atom(Atom::Symbol(KString::from_ref(s)))
}

/// Easily create a round-paren list
pub fn list(items: Vec<SExpr>) -> SExpr {
    SExpr::List(Parenkind::Round, items)
}
