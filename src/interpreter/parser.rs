/// Core parsing machinery.
///
/// Holds the token stream shared by every parsing function, the internal
/// failure type and the expression entry point.
pub mod core;

/// Unary operators and primary expressions.
///
/// Parses literals, identifiers, parenthesized expressions and chains of
/// prefix operators. A prefix chain together with its primary is an atom as
/// far as binary operators are concerned.
pub mod unary;

/// Binary operator placement.
///
/// Inserts each new binary operator into the right spine of the tree built
/// so far, according to precedence and associativity.
pub mod binary;

/// Block parsing.
///
/// Parses a whole source text as a sequence of statements and turns the first
/// syntax failure into an ERROR node.
pub mod block;

/// Statement parsing.
///
/// Implements expression statements, empty statements and `let`
/// declarations.
pub mod statement;
