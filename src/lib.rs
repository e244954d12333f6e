//! # winter
//!
//! Winter is a small, embeddable, dynamically typed scripting language.
//! Source text is tokenized, parsed into a tree by precedence climbing, and
//! reduced in place by a tree-walking evaluator against a table of global
//! bindings. Every allocation the interpreter makes is charged to a
//! pluggable allocator owned by the interpreter state.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    ast::Node,
    interpreter::{state::State, value::core::Object},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Node` enum and the `Tree` handle that represent
/// the syntactic structure of source code as a tree. The tree is built by the
/// parser and rewritten in place by the evaluator.
///
/// # Responsibilities
/// - Defines node types for all language constructs.
/// - Attaches source lines to nodes for error reporting.
/// - Charges every node to the state's allocator.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during parsing or
/// evaluating code. Script errors travel inside ERROR nodes; allocation
/// failure is the only error returned as `Err`.
///
/// # Responsibilities
/// - Defines error kinds for all failure modes (syntax, type, name,
///   arithmetic, allocation).
/// - Attaches line numbers and detailed messages for context.
/// - Supports integration with standard error handling traits and reporting
///   utilities.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations and the allocator hook to provide a complete runtime for
/// source code evaluation. It exposes the public API for interpreting and
/// embedding.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities shared by several phases.
///
/// # Responsibilities
/// - Safely convert between `i64` and `f64`.
/// - Hash byte strings with djb2.
/// - Grow the stack on deep recursion.
pub mod util;

/// Returns the final evaluation result after execution.
///
/// This function parses and executes all statements in the provided source
/// string in a fresh interpreter state. If execution succeeds, it returns the
/// value of the last statement with any reference resolved; otherwise, it
/// returns an error with details about the failure.
///
/// # Parameters
/// - `source`: The script.
/// - `auto_print`: Print the final value to stdout.
///
/// # Returns
/// The final value, or `None` if the script holds no statements.
///
/// # Errors
/// Returns the [`ScriptError`](error::ScriptError) of the first failing
/// statement, or an [`AllocError`](error::AllocError) if the allocator refused a request.
///
/// # Examples
/// ```
/// use winter::get_result;
///
/// // Simple expression: the result will be calculated and no error should occur.
/// let source = "let result = 2 + 2; result * 10;";
/// let value = get_result(source, false).unwrap().unwrap();
/// assert_eq!(value.as_int(), Some(40));
///
/// // Example with an intentional error (unknown variable).
/// let source = "let y = x + 1;"; // 'x' is not defined
/// let res = get_result(source, false);
/// assert!(res.is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<Option<Object>, Box<dyn std::error::Error>> {
    let state = State::new()?;
    run(&state, source, auto_print)
}

/// Executes `source` in an existing state and resolves the final value.
///
/// This is [`get_result`] for callers that pick their own allocator or
/// configuration.
///
/// # Errors
/// Returns the [`ScriptError`](error::ScriptError) of the first failing
/// statement, or an [`AllocError`](error::AllocError) if the allocator refused a request.
pub fn run(state: &State, source: &str, auto_print: bool) -> Result<Option<Object>, Box<dyn std::error::Error>> {
    let Some(tree) = state.execute(source)? else {
        return Ok(None);
    };

    match tree.into_node() {
        Node::Error(e) => Err(Box::new(e)),
        node => {
            let value = match node {
                Node::Value(object) => object.dereferenced(),
                _ => Object::Unknown,
            };
            if auto_print {
                println!("{value}");
            }
            Ok(Some(value))
        },
    }
}
