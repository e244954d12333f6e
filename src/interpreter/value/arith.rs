use std::cmp::Ordering;

use crate::{
    error::OpError,
    interpreter::{
        alloc::AllocRef,
        value::{core::Object, string::WString},
    },
    util::num::{int_to_float, round_to_int},
};

/// A pair of numeric operands after promotion.
enum Numbers {
    /// Both operands were Ints.
    Ints(i64, i64),
    /// At least one operand was a Float.
    Floats(f64, f64),
}

/// Promotes two operands to a common numeric type.
///
/// Float wins if either side is a Float. Anything that is not a number is
/// rejected with both operand types.
fn numbers(left: &Object, right: &Object) -> Result<Numbers, OpError> {
    match (left, right) {
        (Object::Int(a), Object::Int(b)) => Ok(Numbers::Ints(*a, *b)),
        (Object::Int(a), Object::Float(b)) => Ok(Numbers::Floats(int_to_float(*a), *b)),
        (Object::Float(a), Object::Int(b)) => Ok(Numbers::Floats(*a, int_to_float(*b))),
        (Object::Float(a), Object::Float(b)) => Ok(Numbers::Floats(*a, *b)),
        _ => Err(OpError::Operands { left:  left.type_of(),
                                     right: right.type_of(), }),
    }
}

/// `+`: numeric addition, or concatenation of two strings.
///
/// Int addition wraps. Concatenation allocates a new string; the operands'
/// handles are released when they go out of scope here.
///
/// # Errors
/// Returns [`OpError::Operands`] for any other operand pair and
/// [`OpError::Alloc`] if the concatenation cannot be allocated.
///
/// # Example
/// ```
/// use std::rc::Rc;
///
/// use winter::interpreter::{
///     alloc::{AllocRef, SystemAllocator},
///     value::{arith::add, core::Object, string::WString},
/// };
///
/// let alloc: AllocRef = Rc::new(SystemAllocator);
/// assert_eq!(add(&alloc, Object::Int(2), Object::Float(0.5)).unwrap().as_float(), Some(2.5));
///
/// let a = Object::String(WString::allocate(&alloc, b"a").unwrap());
/// let b = Object::String(WString::allocate(&alloc, b"b").unwrap());
/// let ab = add(&alloc, a, b).unwrap();
/// assert_eq!(ab.as_string().map(|s| s.as_bytes()), Some(&b"ab"[..]));
/// ```
pub fn add(alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    if let (Object::String(a), Object::String(b)) = (&left, &right) {
        return Ok(Object::String(WString::concat(alloc, a, b)?));
    }

    Ok(match numbers(&left, &right)? {
        Numbers::Ints(a, b) => Object::Int(a.wrapping_add(b)),
        Numbers::Floats(a, b) => Object::Float(a + b),
    })
}

/// `-`: numeric subtraction. Int subtraction wraps.
///
/// # Errors
/// Returns [`OpError::Operands`] unless both operands are numbers.
pub fn subtract(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(match numbers(&left, &right)? {
        Numbers::Ints(a, b) => Object::Int(a.wrapping_sub(b)),
        Numbers::Floats(a, b) => Object::Float(a - b),
    })
}

/// `*`: numeric multiplication. Int multiplication wraps.
///
/// # Errors
/// Returns [`OpError::Operands`] unless both operands are numbers.
pub fn multiply(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(match numbers(&left, &right)? {
        Numbers::Ints(a, b) => Object::Int(a.wrapping_mul(b)),
        Numbers::Floats(a, b) => Object::Float(a * b),
    })
}

/// `/`: numeric division. Int division truncates; Float division follows
/// IEEE 754.
///
/// # Errors
/// Returns [`OpError::DivisionByZero`] for an Int zero divisor and
/// [`OpError::Operands`] unless both operands are numbers.
pub fn divide(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    match numbers(&left, &right)? {
        Numbers::Ints(_, 0) => Err(OpError::DivisionByZero),
        Numbers::Ints(a, b) => Ok(Object::Int(a.wrapping_div(b))),
        Numbers::Floats(a, b) => Ok(Object::Float(a / b)),
    }
}

/// `%`: Int remainder, truncating toward zero.
///
/// A Float operand on either side yields `0.0`.
///
/// # Errors
/// Returns [`OpError::DivisionByZero`] for an Int zero divisor and
/// [`OpError::Operands`] unless both operands are numbers.
pub fn remainder(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    match numbers(&left, &right)? {
        Numbers::Ints(_, 0) => Err(OpError::DivisionByZero),
        Numbers::Ints(a, b) => Ok(Object::Int(a.wrapping_rem(b))),
        Numbers::Floats(..) => Ok(Object::Float(0.0)),
    }
}

/// `**`: exponentiation.
///
/// Two Ints give the rounded Int of the floating-point power; otherwise the
/// result is a Float.
///
/// # Errors
/// Returns [`OpError::Operands`] unless both operands are numbers.
pub fn power(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(match numbers(&left, &right)? {
        Numbers::Ints(a, b) => Object::Int(round_to_int(int_to_float(a).powf(int_to_float(b)))),
        Numbers::Floats(a, b) => Object::Float(a.powf(b)),
    })
}

/// Unary `-`.
///
/// # Errors
/// Returns [`OpError::Operand`] unless the operand is a number.
pub fn negate(_alloc: &AllocRef, operand: Object) -> Result<Object, OpError> {
    match operand {
        Object::Int(i) => Ok(Object::Int(i.wrapping_neg())),
        Object::Float(f) => Ok(Object::Float(-f)),
        other => Err(OpError::Operand(other.type_of())),
    }
}

/// Unary `!`: Int `1` if the operand is zero, else `0`.
///
/// # Errors
/// Returns [`OpError::Operand`] unless the operand is a number.
pub fn not(_alloc: &AllocRef, operand: Object) -> Result<Object, OpError> {
    match operand {
        Object::Int(i) => Ok(Object::from(i == 0)),
        Object::Float(f) => Ok(Object::from(f == 0.0)),
        other => Err(OpError::Operand(other.type_of())),
    }
}

/// `==`. Defined for every pair of objects; see [`Object::equals`].
///
/// Floats compare as table keys do, so NaN is equal to NaN and `0.0 / 0.0 ==
/// 0.0 / 0.0` is `1`. The ordering comparisons still treat NaN as unordered.
///
/// # Errors
/// Never fails.
pub fn equal(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(left.equals(&right)))
}

/// `!=`. The negation of [`equal`].
///
/// # Errors
/// Never fails.
pub fn not_equal(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(!left.equals(&right)))
}

/// Orders two numbers numerically or two strings bytewise.
///
/// `None` means the operands are unordered (a `NaN` is involved).
fn compare(left: &Object, right: &Object) -> Result<Option<Ordering>, OpError> {
    if let (Object::String(a), Object::String(b)) = (left, right) {
        return Ok(Some(a.as_bytes().cmp(b.as_bytes())));
    }

    Ok(match numbers(left, right)? {
        Numbers::Ints(a, b) => Some(a.cmp(&b)),
        Numbers::Floats(a, b) => a.partial_cmp(&b),
    })
}

/// `<`.
///
/// # Errors
/// Returns [`OpError::Operands`] unless both operands are numbers or both are
/// strings.
pub fn less(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(compare(&left, &right)?.is_some_and(Ordering::is_lt)))
}

/// `>`.
///
/// # Errors
/// As [`less`].
pub fn greater(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(compare(&left, &right)?.is_some_and(Ordering::is_gt)))
}

/// `<=`.
///
/// # Errors
/// As [`less`].
pub fn less_equal(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(compare(&left, &right)?.is_some_and(Ordering::is_le)))
}

/// `>=`.
///
/// # Errors
/// As [`less`].
pub fn greater_equal(_alloc: &AllocRef, left: Object, right: Object) -> Result<Object, OpError> {
    Ok(Object::from(compare(&left, &right)?.is_some_and(Ordering::is_ge)))
}

/// `=`: stores `value` in the slot `target` refers to.
///
/// The target is taken as is, not dereferenced, and must be a Reference. The
/// old value is released, the dereferenced new value is stored, and the same
/// Reference is returned so assignments chain.
///
/// # Errors
/// Returns [`OpError::NotAssignable`] if the target is not a Reference and
/// [`OpError::Dangling`] if its binding is gone.
///
/// # Example
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use winter::interpreter::{
///     alloc::{AllocRef, SystemAllocator},
///     value::{arith::assign, core::{Object, Reference}},
/// };
///
/// let alloc: AllocRef = Rc::new(SystemAllocator);
/// let slot = Rc::new(RefCell::new(Object::Int(1)));
///
/// let result = assign(&alloc, Object::Reference(Reference::to(&slot)), Object::Int(6)).unwrap();
/// assert_eq!(slot.borrow().as_int(), Some(6));
/// assert_eq!(result.dereference().as_int(), Some(6));
///
/// assert!(assign(&alloc, Object::Int(1), Object::Int(2)).is_err());
/// ```
pub fn assign(_alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    let reference = match target {
        Object::Reference(reference) => reference,
        other => return Err(OpError::NotAssignable(other.type_of())),
    };
    let slot = reference.slot().ok_or(OpError::Dangling)?;
    let value = value.dereferenced();

    drop(slot.replace(value));
    Ok(Object::Reference(reference))
}

/// Reads the referent of `target`, combines it with `value` through `op`
/// and stores the result back.
fn compound(alloc: &AllocRef,
            target: Object,
            value: Object,
            op: fn(&AllocRef, Object, Object) -> Result<Object, OpError>)
            -> Result<Object, OpError> {
    let Object::Reference(reference) = &target else {
        return Err(OpError::NotAssignable(target.type_of()));
    };
    let current = reference.slot().ok_or(OpError::Dangling)?.borrow().clone();
    let result = op(alloc, current, value.dereferenced())?;
    assign(alloc, target, result)
}

/// `+=`.
///
/// # Errors
/// As [`assign`] and [`add`].
pub fn add_assign(alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    compound(alloc, target, value, add)
}

/// `-=`.
///
/// # Errors
/// As [`assign`] and [`subtract`].
pub fn subtract_assign(alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    compound(alloc, target, value, subtract)
}

/// `*=`.
///
/// # Errors
/// As [`assign`] and [`multiply`].
pub fn multiply_assign(alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    compound(alloc, target, value, multiply)
}

/// `/=`.
///
/// # Errors
/// As [`assign`] and [`divide`].
pub fn divide_assign(alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    compound(alloc, target, value, divide)
}

/// `%=`.
///
/// # Errors
/// As [`assign`] and [`remainder`].
pub fn remainder_assign(alloc: &AllocRef, target: Object, value: Object) -> Result<Object, OpError> {
    compound(alloc, target, value, remainder)
}
