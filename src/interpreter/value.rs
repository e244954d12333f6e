/// The runtime object.
///
/// Declares `Object`, the tagged union every Winter value is represented as,
/// its `ObjectType` tag, and `Reference`, the lvalue produced by evaluating an
/// identifier. Provides dereferencing, structural equality and hashing.
pub mod core;
/// Reference-counted handles.
///
/// `Shared` is the count header every heap object carries: cloning adds a
/// reference, dropping removes one, and persistent objects are never counted.
pub mod shared;
/// Winter strings.
///
/// Immutable byte strings with a lazily cached djb2 hash.
pub mod string;
/// The fixed-capacity chained hash table.
///
/// Used both as the global binding store and as a first-class table object.
pub mod table;
/// Native functions.
pub mod function;
/// Operator primitives.
///
/// Arithmetic, comparison and assignment over objects. These are the
/// functions the operator table points at.
pub mod arith;
