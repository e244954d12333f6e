/// The allocation hook.
///
/// Every object, tree node, table entry and bucket array is charged to an
/// `Allocator` owned by the interpreter state. The hook has `realloc`
/// semantics: it is told the old and new size of every request and may
/// refuse any request that is not a free.
///
/// # Responsibilities
/// - Defines the `Allocator` trait and the `SystemAllocator` and
///   `CountingAllocator` implementations.
/// - Provides `Charge`, which releases what it accounts for when dropped.
pub mod alloc;
/// The evaluator module reduces trees to values.
///
/// The evaluator walks the tree produced by the parser, evaluating children
/// before their parents, and rewrites each node in place into its result.
/// Failures become ERROR nodes rather than Rust errors.
///
/// # Responsibilities
/// - Evaluates operators through the operator table.
/// - Declares and resolves bindings in the global table.
/// - Reports type, name and arithmetic errors with their source line.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer (tokenizer) reads the raw source text and produces a stream of
/// tokens, each corresponding to meaningful language elements such as numbers,
/// identifiers, operators, delimiters, and keywords. This is the first stage of
/// interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with type and source
///   location.
/// - Decodes numeric, character and string literals.
/// - Turns unrecognized input into `Unknown` tokens so scanning always moves
///   forward.
pub mod lexer;
/// The static operator table.
///
/// Gives every binary operator its precedence, associativity and primitive,
/// and every prefix operator its primitive. Operators recognised by the
/// parser but not implemented have no primitive.
pub mod operator;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// a tree that represents the structure of the source's statements. Syntax
/// errors become ERROR nodes carrying a message and a line number.
///
/// # Responsibilities
/// - Places binary operators by precedence climbing.
/// - Parses `let` declarations and statement sequences.
/// - Validates grammar, reporting errors with location info.
pub mod parser;
/// The interpreter state.
///
/// Ties the allocator, the global table, the parser and the evaluator
/// together behind the embedding API.
pub mod state;
/// The value module defines the runtime object model.
///
/// This module declares the `Object` type every Winter value is represented
/// as, the reference-counted handle heap objects live behind, strings,
/// tables, native functions and the operator primitives.
///
/// # Responsibilities
/// - Defines the `Object` enum and all supported variants.
/// - Implements arithmetic, comparison and assignment primitives.
/// - Provides the chained hash table used for bindings.
pub mod value;
