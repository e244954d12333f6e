/// Binary operator evaluation logic.
///
/// Evaluates both operands, looks the operator up in the operator table and
/// applies its primitive, dereferencing operands or passing the raw target
/// as the table entry asks.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements the prefix operators: arithmetic negation and logical NOT.
pub mod unary;

/// Core evaluation logic.
///
/// Contains the dispatch over node kinds and the helpers that rewrite a node
/// in place into its VALUE or ERROR result.
pub mod core;

/// Evaluation of statements and names.
///
/// Covers blocks, `let` declarations and identifier resolution against the
/// global table.
pub mod statement;
