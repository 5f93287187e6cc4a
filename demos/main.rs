// Copyright 2026 the sexpr-stream authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{bail, Result};
use clap::Parser as ClapParser;
use sexpr_stream::read::{
    parse_file, LineSession, PromptedLines, ReadOutcome, Reader,
};
use std::io;
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Read expressions interactively from stdin instead of a file
    #[clap(short, long, value_parser)]
    repl: bool,
    /// Show the starting line of each expression
    #[clap(long, value_parser)]
    pos: bool,
    /// Path to the input file
    #[clap(value_parser)]
    input_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.repl {
        let mut session = LineSession::new(
            Reader::new(),
            PromptedLines::new(io::stdin().lock(), io::stderr()),
        );
        loop {
            match session.read_one("> ") {
                ReadOutcome::Done(expr) => println!("{}", expr),
                // the session stays usable after an error
                ReadOutcome::Error(e) => eprintln!("read error: {}", e),
                ReadOutcome::Eof => return Ok(()),
            }
        }
    } else if let Some(path) = args.input_path {
        for (expr, line) in parse_file(&path)? {
            if args.pos {
                println!("{}: {}", line, expr);
            } else {
                println!("{}", expr);
            }
        }
        Ok(())
    } else {
        bail!("expecting an input path, or --repl")
    }
}
