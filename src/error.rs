/// Script errors.
///
/// Defines the error carried by ERROR nodes. Syntax, type, name and
/// arithmetic failures are never raised; the parser and evaluator return them
/// as ordinary tree nodes so the embedding caller decides how to report them.
pub mod script_error;
/// Operator failures.
///
/// Contains the error type returned by the object model primitives
/// (arithmetic, comparison, assignment). The evaluator turns these into
/// script errors tagged with the operator and the source line.
pub mod op_error;
/// Allocation failures.
///
/// The one fatal error: raised when the state's allocator refuses a nonzero
/// request. It is propagated with `?` through parsing and evaluation.
pub mod alloc_error;

pub use alloc_error::AllocError;
pub use op_error::OpError;
pub use script_error::{ErrorKind, ScriptError};
