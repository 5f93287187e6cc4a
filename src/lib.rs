// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An incremental S-expression reader with the following goals:
//!
//! * Accept input in arbitrarily sized chunks: the same logical input
//!   parses to the same expressions no matter how it is split up. The
//!   resumable state between chunks is an explicit [Continuation](read::Continuation)
//!   value, plain data that can be stored, compared and dropped freely,
//!   rather than state captured implicitly in a generator or a call
//!   stack.
//!
//! * Serve interactive sessions ([LineSession](read::LineSession),
//!   feeding one prompted line at a time through the same stepping
//!   machinery) as well as batch reads of whole files
//!   ([read_file](read::read_file), [parse_file](read::parse_file),
//!   which decompose a source into all of its toplevel expressions,
//!   all-or-nothing, with optional starting lines).
//!
//! * Good error reporting: every lexical or structural error carries
//!   the line it happened on, and an input that ends in the middle of
//!   an expression is resolved deterministically into a premature-EOF
//!   error instead of hanging on more input that will never come.
//!
//! * Keep the tokenizer and the grammar behind traits
//!   ([Tokenize](lex::Tokenize), [Grammar](grammar::Grammar)) so the
//!   driving logic in [read] can be exercised against deterministic
//!   fakes, and callers with a different lexical syntax can reuse the
//!   orchestration unchanged.

pub mod grammar;
pub mod lex;
pub mod number;
pub mod pos;
pub mod read;
pub mod value;
