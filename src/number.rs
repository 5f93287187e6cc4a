// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use num::{rational::Ratio, BigInt};

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(BigInt),
    // Boxed since a Ratio is two BigInts and would dominate the size
    // of every Atom otherwise.
    Rational(Box<Ratio<BigInt>>),
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Number::Integer(n) => f.write_fmt(format_args!("{}", n)),
            Number::Rational(r) => f.write_fmt(format_args!("{}", r)),
        }
    }
}
