/*! Parse the textual quad format into control-flow graphs.
 *
 * Hand-written quad files make analyses easy to exercise without a bytecode front end.
 * `parse` and `check` only look at syntax; `parse_program` also resolves blocks, operand
 * shapes and quad ids and yields one `ControlFlowGraph` per method.
 */

use pest::Parser;
use pest_derive::Parser;
use quadflow_core::ControlFlowGraph;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod lower;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct QuadParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    #[error("Line {line}: unknown opcode {opcode}")]
    UnknownOpcode { line: usize, opcode: String },
    #[error("Line {line}: {opcode} {message}")]
    BadOperands {
        line: usize,
        opcode: String,
        message: String,
    },
    #[error("Line {line}: number out of range: {text}")]
    InvalidNumber { line: usize, text: String },
    #[error("Method {method}: block {block} is not declared")]
    UnknownBlock { method: String, block: String },
    #[error("Method {method}: block {block} declared twice")]
    DuplicateBlock { method: String, block: String },
    #[error("Method {method}: block {block} branches conditionally but lists no fallthrough")]
    MissingFallthrough { method: String, block: String },
    #[error("Method {method}: quad id {id} used twice")]
    DuplicateQuad { method: String, id: u32 },
    #[error("Method {method}: {source}")]
    Graph {
        method: String,
        source: quadflow_core::FlowError,
    },
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    QuadParser::parse(Rule::program, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_program(input: &str) -> Result<Vec<ControlFlowGraph>, ParseError> {
    let mut graphs = Vec::new();
    for program in parse(input)? {
        for pair in program.into_inner() {
            if pair.as_rule() == Rule::method {
                graphs.push(lower::lower_method(pair)?);
            }
        }
    }
    Ok(graphs)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<ControlFlowGraph>, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program() {
        assert!(check(""));
        assert!(check("# nothing here\n"));
    }

    #[test]
    fn test_simple_method() {
        let input = r"
method main(0) static {
  entry -> bb2:
  bb2 -> exit:
    1: MOVE R0, 5
    2: RETURN R0
}
";
        assert!(check(input));
    }

    #[test]
    fn test_operand_free_quads_before_labels() {
        let input = r"
method f(1) {
  entry -> bb2:
  bb2 -> bb3:
    1: NOP
  bb3 -> exit:
    2: RETURN
    3: RETURN
}
";
        match parse(input) {
            Ok(_) => {}
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn test_lowercase_opcode_rejected() {
        let input = "method f(0) { entry -> bb2: bb2: 1: move R0, 1 }";
        assert!(!check(input));
    }

    #[test]
    fn test_missing_brace_rejected() {
        assert!(!check("method f(0) { entry:"));
    }
}
