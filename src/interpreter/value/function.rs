use std::fmt;

use crate::{
    error::OpError,
    interpreter::{
        alloc::AllocRef,
        value::{core::Object, shared::Shared, string::WString},
    },
};

/// The signature of a host function callable from Winter.
///
/// Arguments arrive dereferenced. The allocator is the calling state's, for
/// functions that need to build strings or tables.
pub type NativeFn = fn(&AllocRef, &[Object]) -> Result<Object, OpError>;

/// A named host function with a fixed arity.
pub struct Function {
    name:   Shared<WString>,
    arity:  usize,
    native: NativeFn,
}

impl Function {
    /// Wraps `native` under `name`.
    #[must_use]
    pub const fn new(name: Shared<WString>, arity: usize, native: NativeFn) -> Self {
        Self { name,
               arity,
               native }
    }

    /// The name the function was registered under.
    #[must_use]
    pub fn name(&self) -> &WString {
        &self.name
    }

    /// The number of arguments the function takes.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Calls the function after checking the argument count.
    ///
    /// # Errors
    /// Returns [`OpError::Arity`] on a count mismatch, or whatever the native
    /// function returns.
    pub fn call(&self, alloc: &AllocRef, args: &[Object]) -> Result<Object, OpError> {
        if args.len() != self.arity {
            return Err(OpError::Arity { expected: self.arity,
                                        found:    args.len(), });
        }
        let args: Vec<Object> = args.iter().map(Object::dereference).collect();
        (self.native)(alloc, &args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
         .field("name", &self.name)
         .field("arity", &self.arity)
         .finish_non_exhaustive()
    }
}
