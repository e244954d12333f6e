use crate::{
    error::AllocError,
    interpreter::{
        alloc::AllocRef,
        value::{shared::Shared, string::WString},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The category of a script error.
pub enum ErrorKind {
    /// A malformed token sequence: missing semicolon, unmatched parenthesis,
    /// malformed `let`.
    Syntax,
    /// Incompatible operand types, assignment to a non-reference, or an
    /// operator that has no implementation.
    Type,
    /// A duplicate declaration or an undeclared identifier.
    Name,
    /// Integer division or remainder by zero.
    Arithmetic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Syntax => "SyntaxError",
            Self::Type => "TypeError",
            Self::Name => "NameError",
            Self::Arithmetic => "ArithmeticError",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
/// The payload of an ERROR node.
///
/// The message is a Winter string object charged to the state's allocator,
/// so it is released together with the node that carries it.
pub struct ScriptError {
    kind:    ErrorKind,
    message: Shared<WString>,
    line:    usize,
}

impl ScriptError {
    /// Allocates the message and builds the error.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the message string cannot be allocated.
    pub fn new(alloc: &AllocRef,
               kind: ErrorKind,
               message: &str,
               line: usize)
               -> Result<Self, AllocError> {
        let message = WString::allocate(alloc, message.as_bytes())?;
        Ok(Self { kind,
                  message,
                  line })
    }

    /// The error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message string object.
    #[must_use]
    pub const fn message(&self) -> &Shared<WString> {
        &self.message
    }

    /// The source line the error was reported on.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on line {}: {}", self.kind, self.line, *self.message)
    }
}

impl std::error::Error for ScriptError {}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::alloc::{CountingAllocator, SystemAllocator};

    #[test]
    fn message_is_a_winter_string() {
        let alloc: AllocRef = Rc::new(SystemAllocator);
        let error = ScriptError::new(&alloc, ErrorKind::Name, "undeclared identifier 'y'", 4).unwrap();

        assert_eq!(error.message().as_bytes(), b"undeclared identifier 'y'");
        assert_eq!(error.message().ref_count(), Some(1));
        assert_eq!(error.to_string(), "NameError on line 4: undeclared identifier 'y'");
    }

    #[test]
    fn message_is_released_with_the_error() {
        let counting = Rc::new(CountingAllocator::new());
        let alloc: AllocRef = counting.clone();

        let error = ScriptError::new(&alloc, ErrorKind::Arithmetic, "integer division by zero", 1).unwrap();
        assert!(counting.stats().live_bytes >= error.message().len());
        drop(error);
        assert_eq!(counting.stats().live_bytes, 0);
    }
}
