use crate::{
    error::{AllocError, ErrorKind},
    interpreter::value::core::ObjectType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents every way an object model primitive can fail.
pub enum OpError {
    /// A binary operator does not accept this pair of operand types.
    Operands {
        /// Type of the left operand, after dereferencing.
        left:  ObjectType,
        /// Type of the right operand, after dereferencing.
        right: ObjectType,
    },
    /// A unary operator does not accept this operand type.
    Operand(ObjectType),
    /// The target of an assignment is not a reference.
    NotAssignable(ObjectType),
    /// A reference outlived the binding it pointed at.
    Dangling,
    /// Integer division or remainder by zero.
    DivisionByZero,
    /// A native function was called with the wrong number of arguments.
    Arity {
        /// The number of parameters the function declares.
        expected: usize,
        /// The number of arguments supplied.
        found:    usize,
    },
    /// The allocator refused to store the result.
    Alloc(AllocError),
}

impl OpError {
    /// The script error category this failure reports as, or `None` for an
    /// allocation failure, which is fatal rather than reportable.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Operands { .. }
            | Self::Operand(_)
            | Self::NotAssignable(_)
            | Self::Dangling
            | Self::Arity { .. } => Some(ErrorKind::Type),
            Self::DivisionByZero => Some(ErrorKind::Arithmetic),
            Self::Alloc(_) => None,
        }
    }

    /// Renders the failure for the operator spelled `symbol`.
    #[must_use]
    pub fn describe(&self, symbol: &str) -> String {
        match self {
            Self::Operands { left, right } => {
                format!("unsupported operand types for '{symbol}': '{left}' and '{right}'")
            },
            Self::Operand(operand) => {
                format!("bad operand type for unary '{symbol}': '{operand}'")
            },
            Self::NotAssignable(target) => {
                format!("cannot assign to a value of type '{target}'")
            },
            Self::Dangling => "reference to a released binding".to_string(),
            Self::DivisionByZero => "integer division by zero".to_string(),
            Self::Arity { expected, found } => {
                format!("'{symbol}' expects {expected} arguments, found {found}")
            },
            Self::Alloc(e) => e.to_string(),
        }
    }
}

impl From<AllocError> for OpError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

impl std::fmt::Display for OpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe("?"))
    }
}

impl std::error::Error for OpError {}
