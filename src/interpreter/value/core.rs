use std::{
    cell::RefCell,
    fmt,
    hash::{Hash, Hasher},
    rc::{Rc, Weak},
};

use ordered_float::OrderedFloat;

use crate::{
    interpreter::value::{function::Function, shared::Shared, string::WString, table::Table},
    util::hash::Djb2,
};

/// A table value slot. References point at slots; tables own them.
pub type Slot = Rc<RefCell<Object>>;

/// The type tag of an [`Object`].
///
/// The declaration order is significant: every type from `String` on is heap
/// allocated and reference counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectType {
    /// The result of reading through a dangling reference.
    Unknown,
    /// The absence of a value.
    Null,
    /// An lvalue pointing at a binding.
    Reference,
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit float.
    Float,
    /// An immutable byte string.
    String,
    /// A hash table.
    Table,
    /// A native function.
    Function,
}

impl ObjectType {
    /// Whether objects of this type are heap allocated and reference counted.
    ///
    /// ## Example
    /// ```
    /// use winter::interpreter::value::core::ObjectType;
    ///
    /// assert!(ObjectType::String.is_managed());
    /// assert!(!ObjectType::Float.is_managed());
    /// assert!(!ObjectType::Reference.is_managed());
    /// ```
    #[must_use]
    pub fn is_managed(self) -> bool {
        self >= Self::String
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Null => "null",
            Self::Reference => "reference",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Table => "table",
            Self::Function => "function",
        };
        write!(f, "{name}")
    }
}

/// A non-owning pointer to a binding's value slot.
///
/// References are produced by evaluating an identifier and consumed by the
/// assignment operators. They never keep the binding alive, and they are never
/// stored inside a slot.
#[derive(Debug, Clone)]
pub struct Reference(Weak<RefCell<Object>>);

impl Reference {
    /// Creates a reference to `slot`.
    #[must_use]
    pub fn to(slot: &Slot) -> Self {
        Self(Rc::downgrade(slot))
    }

    /// The slot this reference points at, if the binding is still alive.
    #[must_use]
    pub fn slot(&self) -> Option<Slot> {
        self.0.upgrade()
    }

    /// Whether two references point at the same slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

/// A Winter runtime value.
///
/// Ints and floats are stored inline. Strings, tables and functions are
/// reference counted through [`Shared`]: cloning an `Object` adds a reference
/// and dropping it removes one.
#[derive(Debug, Clone, Default)]
pub enum Object {
    /// The result of reading through a dangling reference.
    #[default]
    Unknown,
    /// The absence of a value. Declarations without an initializer bind it.
    Null,
    /// An lvalue. See [`Reference`].
    Reference(Reference),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// An immutable byte string.
    String(Shared<WString>),
    /// A hash table.
    Table(Shared<RefCell<Table>>),
    /// A native function.
    Function(Shared<Function>),
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Shared<WString>> for Object {
    fn from(s: Shared<WString>) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Self::Int(i64::from(b))
    }
}

impl Object {
    /// The type tag of this object.
    #[must_use]
    pub const fn type_of(&self) -> ObjectType {
        match self {
            Self::Unknown => ObjectType::Unknown,
            Self::Null => ObjectType::Null,
            Self::Reference(_) => ObjectType::Reference,
            Self::Int(_) => ObjectType::Int,
            Self::Float(_) => ObjectType::Float,
            Self::String(_) => ObjectType::String,
            Self::Table(_) => ObjectType::Table,
            Self::Function(_) => ObjectType::Function,
        }
    }

    /// Resolves one level of reference.
    ///
    /// A reference yields a new handle to the value in its slot, or `Unknown`
    /// if the binding is gone. Any other object yields a new handle to itself.
    #[must_use]
    pub fn dereference(&self) -> Self {
        match self {
            Self::Reference(r) => r.slot().map_or(Self::Unknown, |slot| slot.borrow().clone()),
            other => other.clone(),
        }
    }

    /// Consuming form of [`dereference`](Self::dereference).
    #[must_use]
    pub fn dereferenced(self) -> Self {
        match self {
            Self::Reference(_) => self.dereference(),
            other => other,
        }
    }

    /// Structural equality used for table keys and `==`.
    ///
    /// Numbers compare across Int and Float; strings compare by hash then
    /// bytes; floats use a total order so `NaN` equals itself; tables and
    /// functions compare by identity. Objects of unrelated types are unequal.
    ///
    /// ## Example
    /// ```
    /// use winter::interpreter::value::core::Object;
    ///
    /// assert!(Object::Int(2).equals(&Object::Float(2.0)));
    /// assert!(Object::Float(f64::NAN).equals(&Object::Float(f64::NAN)));
    /// assert!(!Object::Int(2).equals(&Object::Null));
    /// ```
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unknown, Self::Unknown) | (Self::Null, Self::Null) => true,
            (Self::Reference(a), Self::Reference(b)) => a.same_slot(b),
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                int_equals_float(*a, *b)
            },
            (Self::String(a), Self::String(b)) => **a == **b,
            (Self::Table(a), Self::Table(b)) => Shared::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }

    /// A hash consistent with [`equals`](Self::equals).
    ///
    /// Integral floats hash like the matching Int so that `1` and `1.0` select
    /// the same table entry.
    #[must_use]
    pub fn hash_key(&self) -> u64 {
        let mut hasher = Djb2::default();
        match self {
            Self::Unknown | Self::Null => self.type_of().hash(&mut hasher),
            Self::Reference(r) => {
                ObjectType::Reference.hash(&mut hasher);
                r.0.as_ptr().hash(&mut hasher);
            },
            Self::Int(i) => i.hash(&mut hasher),
            Self::Float(f) => match float_as_exact_int(*f) {
                Some(i) => i.hash(&mut hasher),
                None => OrderedFloat(*f).hash(&mut hasher),
            },
            Self::String(s) => return s.hash_value(),
            Self::Table(t) => std::ptr::from_ref::<RefCell<Table>>(t).hash(&mut hasher),
            Self::Function(func) => std::ptr::from_ref::<Function>(func).hash(&mut hasher),
        }
        hasher.finish()
    }

    /// The integer payload, if this is an Int.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(i) = self { Some(*i) } else { None }
    }

    /// The float payload, if this is a Float.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        if let Self::Float(f) = self { Some(*f) } else { None }
    }

    /// The string payload, if this is a String.
    #[must_use]
    pub fn as_string(&self) -> Option<&WString> {
        if let Self::String(s) = self { Some(&**s) } else { None }
    }

    /// The reference payload, if this is a Reference.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        if let Self::Reference(r) = self { Some(r) } else { None }
    }
}

/// Compares an Int and a Float by value without rounding the Int.
fn int_equals_float(i: i64, f: f64) -> bool {
    float_as_exact_int(f) == Some(i)
}

/// The Int equal to `f`, if `f` is integral and in range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_as_exact_int(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Null => write!(f, "null"),
            Self::Reference(_) => write!(f, "{}", self.dereference()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{}", **s),
            Self::Table(t) => match t.try_borrow() {
                Ok(table) => write!(f, "<table of {}>", table.len()),
                Err(_) => write!(f, "<table>"),
            },
            Self::Function(func) => write!(f, "<function {}>", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dereference_resolves_one_level() {
        let slot: Slot = Rc::new(RefCell::new(Object::Int(6)));
        let r = Object::Reference(Reference::to(&slot));
        assert_eq!(r.dereference().as_int(), Some(6));

        *slot.borrow_mut() = Object::Int(7);
        assert_eq!(r.dereference().as_int(), Some(7));

        drop(slot);
        assert_eq!(r.dereference().type_of(), ObjectType::Unknown);
    }

    #[test]
    fn equal_numbers_hash_alike() {
        let pairs = [(Object::Int(1), Object::Float(1.0)),
                     (Object::Int(-40), Object::Float(-40.0)),
                     (Object::Float(0.5), Object::Float(0.5))];
        for (a, b) in pairs {
            assert!(a.equals(&b));
            assert_eq!(a.hash_key(), b.hash_key());
        }
        assert!(!Object::Int(1).equals(&Object::Float(1.5)));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Object::Int(7).to_string(), "7");
        assert_eq!(Object::Float(2.0).to_string(), "2.0");
        assert_eq!(Object::Null.to_string(), "null");
        assert_eq!(Object::Unknown.to_string(), "unknown");
    }
}
