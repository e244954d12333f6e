use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use tracing::debug;

use crate::{
    ast::{Node, Tree},
    error::{AllocError, ErrorKind, OpError},
    interpreter::{
        alloc::{AllocRef, Charge, SystemAllocator},
        parser::{block::parse_block, core::TokenStream},
        value::{
            core::Object,
            function::{Function, NativeFn},
            shared::Shared,
            string::WString,
            table::Table,
        },
    },
};

/// Default number of bucket chains in the global table.
pub const DEFAULT_GLOBALS_CAPACITY: usize = 64;

/// Settings for a new [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of bucket chains in the global table. The table never grows,
    /// so this bounds how short the chains stay. Zero is raised to one.
    pub globals_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { globals_capacity: DEFAULT_GLOBALS_CAPACITY }
    }
}

/// An interpreter instance.
///
/// Owns the allocator every object, tree and table entry is charged to, and
/// the global table holding every binding. Parsing and evaluation both go
/// through a state. Dropping it releases the global table and the state's
/// own charge; objects and trees handed out earlier keep the allocator alive
/// until they are dropped too.
///
/// ## Example
/// ```
/// use winter::interpreter::state::State;
///
/// let state = State::new().unwrap();
/// state.execute("let x = 5; x = x + 1;").unwrap();
///
/// let x = state.global("x").unwrap().unwrap();
/// assert_eq!(x.as_int(), Some(6));
/// ```
pub struct State {
    pub(crate) alloc:   AllocRef,
    pub(crate) globals: Shared<RefCell<Table>>,
    config:             Config,
    _block:             Charge,
}

impl State {
    /// Creates a state with the [`SystemAllocator`] and default settings.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses a request.
    pub fn new() -> Result<Self, AllocError> {
        Self::with_allocator(Rc::new(SystemAllocator), Config::default())
    }

    /// Creates a state charging everything to `alloc`.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the state block or the
    /// global table.
    pub fn with_allocator(alloc: AllocRef, config: Config) -> Result<Self, AllocError> {
        let block = Charge::new(&alloc, size_of::<Self>())?;
        let table = Table::new(&alloc, config.globals_capacity)?;
        let globals = Shared::new(&alloc, RefCell::new(table), size_of::<RefCell<Table>>())?;

        debug!(globals_capacity = config.globals_capacity, "state created");
        Ok(Self { alloc,
                  globals,
                  config,
                  _block: block })
    }

    /// The allocator this state charges to.
    #[must_use]
    pub const fn allocator(&self) -> &AllocRef {
        &self.alloc
    }

    /// The settings the state was created with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Borrows the global table.
    ///
    /// # Panics
    /// Panics if called while the table is being modified, which cannot
    /// happen from outside an evaluation.
    #[must_use]
    pub fn globals(&self) -> Ref<'_, Table> {
        self.globals.borrow()
    }

    /// Parses `source` into a tree.
    ///
    /// Syntax errors are not `Err`: the tree is then a single ERROR node.
    ///
    /// # Returns
    /// The tree, or `None` if the source holds no statements.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses a request.
    pub fn parse(&self, source: &str) -> Result<Option<Tree>, AllocError> {
        let mut tokens = TokenStream::new(source, &self.alloc);
        parse_block(&mut tokens)
    }

    /// Parses and evaluates `source`.
    ///
    /// # Returns
    /// The result tree (VALUE or ERROR), or `None` if the source holds no
    /// statements.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses a request.
    pub fn execute(&self, source: &str) -> Result<Option<Tree>, AllocError> {
        match self.parse(source)? {
            Some(tree) => self.evaluate(tree).map(Some),
            None => Ok(None),
        }
    }

    /// Allocates a string object.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn string(&self, text: &str) -> Result<Object, AllocError> {
        if text.is_empty() {
            return Ok(Object::String(WString::empty()));
        }
        Ok(Object::String(WString::allocate(&self.alloc, text.as_bytes())?))
    }

    /// Allocates an empty table object with `capacity` bucket chains.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn table(&self, capacity: usize) -> Result<Object, AllocError> {
        let table = Table::new(&self.alloc, capacity)?;
        let shared = Shared::new(&self.alloc, RefCell::new(table), size_of::<RefCell<Table>>())?;
        Ok(Object::Table(shared))
    }

    /// Allocates a native function object.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn function(&self, name: &str, arity: usize, native: NativeFn) -> Result<Object, AllocError> {
        let name = WString::allocate(&self.alloc, name.as_bytes())?;
        let function = Function::new(name, arity, native);
        Ok(Object::Function(Shared::new(&self.alloc, function, size_of::<Function>())?))
    }

    /// Looks up a global binding by name.
    ///
    /// # Returns
    /// A new handle to the bound value, or `None` if the name is unbound.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the lookup key cannot be allocated.
    pub fn global(&self, name: &str) -> Result<Option<Object>, AllocError> {
        let key = self.string(name)?;
        Ok(self.globals.borrow().get(&key))
    }

    /// Binds `name` to `value` in the global table, replacing any existing
    /// binding.
    ///
    /// # Returns
    /// The value previously bound to `name`, if any.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn define(&self, name: &str, value: Object) -> Result<Option<Object>, AllocError> {
        let key = self.string(name)?;
        let (_, previous) = self.globals.borrow_mut().insert(key, value)?;
        Ok(previous)
    }

    /// Calls the native function bound to `name`.
    ///
    /// Failures are reported the way evaluation reports them: as an ERROR
    /// tree.
    ///
    /// # Returns
    /// A VALUE tree with the function's result, or an ERROR tree if `name` is
    /// unbound, is not a function, or the call failed.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses a request.
    ///
    /// # Example
    /// ```
    /// use winter::{
    ///     ast::Node,
    ///     error::OpError,
    ///     interpreter::{alloc::AllocRef, state::State, value::core::Object},
    /// };
    ///
    /// fn twice(_: &AllocRef, args: &[Object]) -> Result<Object, OpError> {
    ///     match args {
    ///         [Object::Int(i)] => Ok(Object::Int(i * 2)),
    ///         [other] => Err(OpError::Operand(other.type_of())),
    ///         _ => unreachable!(),
    ///     }
    /// }
    ///
    /// let state = State::new().unwrap();
    /// let function = state.function("twice", 1, twice).unwrap();
    /// state.define("twice", function).unwrap();
    ///
    /// let result = state.call("twice", &[Object::Int(21)]).unwrap();
    /// assert!(matches!(result.into_node(), Node::Value(Object::Int(42))));
    /// ```
    pub fn call(&self, name: &str, args: &[Object]) -> Result<Tree, AllocError> {
        let tree = Tree::new(&self.alloc, Node::Value(Object::Null))?;

        let Some(callee) = self.global(name)? else {
            let message = format!("undeclared identifier '{name}'");
            return self.fail(tree, ErrorKind::Name, &message, 0);
        };
        let Object::Function(function) = callee else {
            let message = format!("'{name}' is not a function");
            return self.fail(tree, ErrorKind::Type, &message, 0);
        };

        let outcome: Result<Object, OpError> = function.call(&self.alloc, args);
        self.conclude(tree, outcome, name, 0)
    }
}

impl Drop for State {
    fn drop(&mut self) {
        debug!(bindings = self.globals.borrow().len(), "state released");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::alloc::CountingAllocator;

    #[test]
    fn teardown_balances_the_allocator() {
        let counting = Rc::new(CountingAllocator::new());
        {
            let state = State::with_allocator(counting.clone(), Config { globals_capacity: 3 }).unwrap();
            let result = state.execute(r#"let a = "x", b = a + "y", c = 1.5; a = b + b;"#).unwrap();
            drop(result);
            assert!(counting.stats().live_bytes > 0);
        }
        let stats = counting.stats();
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn define_and_read_back() {
        let state = State::new().unwrap();
        assert_eq!(state.define("n", Object::Int(1)).unwrap().map(|o| o.type_of()), None);
        let previous = state.define("n", Object::Int(2)).unwrap();
        assert_eq!(previous.and_then(|o| o.as_int()), Some(1));
        assert_eq!(state.global("n").unwrap().and_then(|o| o.as_int()), Some(2));
        assert!(state.global("m").unwrap().is_none());
    }

    #[test]
    fn config_and_host_objects() {
        fn pair(_: &AllocRef, _: &[Object]) -> Result<Object, OpError> {
            Ok(Object::Null)
        }

        let state = State::with_allocator(Rc::new(SystemAllocator), Config { globals_capacity: 0 }).unwrap();
        assert_eq!(state.config(), Config { globals_capacity: 0 });
        assert_eq!(state.globals().capacity(), 1);
        assert_eq!(State::new().unwrap().config().globals_capacity, DEFAULT_GLOBALS_CAPACITY);

        let Object::Function(function) = state.function("pair", 2, pair).unwrap() else {
            panic!("expected a function");
        };
        assert_eq!(function.arity(), 2);
        assert_eq!(function.name().as_bytes(), b"pair");
    }

    #[test]
    fn call_reports_errors_as_nodes() {
        fn unit(_: &AllocRef, _: &[Object]) -> Result<Object, OpError> {
            Ok(Object::Null)
        }

        let state = State::new().unwrap();
        let function = state.function("unit", 0, unit).unwrap();
        state.define("unit", function).unwrap();
        state.define("n", Object::Int(0)).unwrap();

        let result = state.call("unit", &[Object::Int(1)]).unwrap();
        assert_eq!(result.to_string(),
                   "(error \"TypeError on line 0: 'unit' expects 0 arguments, found 1\")");

        let result = state.call("n", &[]).unwrap();
        assert_eq!(result.to_string(), "(error \"TypeError on line 0: 'n' is not a function\")");

        let result = state.call("missing", &[]).unwrap();
        assert_eq!(result.to_string(),
                   "(error \"NameError on line 0: undeclared identifier 'missing'\")");

        assert_eq!(state.call("unit", &[]).unwrap().to_string(), "null");
    }
}
