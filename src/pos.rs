// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// A 1-based line counter. It is threaded explicitly through every
/// tokenizing and parsing operation and only ever increases within a
/// session; a brand-new session starts at [Line::FIRST] unless the
/// caller resumes mid-source with a different value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Line(pub u32);

impl Line {
    pub const FIRST: Line = Line(1);

    pub fn advance(self, lines: u32) -> Line {
        Line(self.0 + lines)
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("line {}", self.0))
    }
}
