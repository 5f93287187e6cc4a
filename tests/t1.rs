use anyhow::Result;
use sexpr_stream::read::{read_file, read_string};
use std::path::Path;

const INPUT: &str = include_str!("t-input.scm");
const EXPECTED: &str = include_str!("t-expected.scm");

fn render(vals: &[sexpr_stream::value::SExpr]) -> String {
    let mut out = String::new();
    for v in vals {
        out.push_str(&format!("{}\n", v));
    }
    out
}

#[test]
fn t1() -> Result<()> {
    let vals = read_string(INPUT)?;
    assert_eq!(render(&vals), EXPECTED);
    Ok(())
}

#[test]
fn t1_from_file() -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/t-input.scm");
    let vals = read_file(&path)?;
    assert_eq!(render(&vals), EXPECTED);
    Ok(())
}
