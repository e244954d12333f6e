/// Numeric conversion helpers.
///
/// Winter promotes integers to floats and rounds float results back to
/// integers with the same semantics as a C cast. These helpers keep the
/// necessary `as` casts in one audited place.
pub mod num;

/// String and object hashing.
///
/// Provides the djb2 hasher used for table keys and the reserved-zero rule
/// for cached string hashes.
pub mod hash;

/// Stack growth for deep recursion.
///
/// The parser and evaluator recurse once per nesting level of the source.
/// Wrapping those recursive calls keeps adversarial input from overflowing
/// the native stack.
pub mod stack;
