use tracing::debug;

use crate::{
    ast::{Node, Tree},
    error::{AllocError, ErrorKind},
    interpreter::{
        evaluator::core::{into_object, is_error},
        operator::BinaryOperator,
        state::State,
        value::{
            core::{Object, Reference},
            shared::Shared,
            string::WString,
        },
    },
};

impl State {
    /// Evaluates a sequence of statements.
    ///
    /// Each statement's result is released when the next one is evaluated.
    /// The block evaluates to its last statement's result, or stops at the
    /// first ERROR and evaluates to that.
    ///
    /// # Parameters
    /// - `tree`: The block's node. Used for the result only when the block is
    ///   empty.
    /// - `statements`: The statements, in order.
    pub(crate) fn eval_block(&self, tree: Tree, statements: Vec<Tree>) -> Result<Tree, AllocError> {
        let mut last = None;

        for (index, statement) in statements.into_iter().enumerate() {
            let line = statement.line();
            let result = self.evaluate(statement)?;
            if is_error(&result) {
                debug!(statement = index, line, "statement failed");
                return Ok(result);
            }
            debug!(statement = index, line, "statement evaluated");
            last = Some(result);
        }

        match last {
            Some(result) => Ok(result),
            None => self.settle(tree, Object::Null),
        }
    }

    /// Evaluates a `let` declaration.
    ///
    /// Each binding is declared in order. Declaring a name that is already
    /// bound is an error, checked before the initializer runs; bindings made
    /// earlier in the same declaration stay in place. A binding without an
    /// initializer is bound to Null.
    ///
    /// # Returns
    /// A Null VALUE, or the first ERROR.
    pub(crate) fn eval_let(&self, tree: Tree, bindings: Vec<Tree>, line: usize) -> Result<Tree, AllocError> {
        for binding in bindings {
            let (name, initializer, at) = match binding.into_node() {
                Node::Ident { name, line } => (name, None, line),
                Node::Binary { op: BinaryOperator::Assign,
                               operands: [target, initializer],
                               line, } => match target.into_node() {
                    Node::Ident { name, .. } => (name, Some(initializer), line),
                    _ => return self.fail(tree, ErrorKind::Syntax, "expected an identifier", line),
                },
                _ => return self.fail(tree, ErrorKind::Syntax, "expected an identifier", line),
            };

            let key = Object::String(name.clone());
            if self.globals.borrow().contains(&key) {
                let message = format!("multiple declarations of '{}'", *name);
                return self.fail(tree, ErrorKind::Name, &message, at);
            }

            let value = match initializer {
                None => Object::Null,
                Some(initializer) => {
                    let result = self.evaluate(initializer)?;
                    if is_error(&result) {
                        return Ok(result);
                    }
                    into_object(result)
                },
            };

            debug!(name = %*name, "declared");
            let (_, previous) = self.globals.borrow_mut().insert(key, value)?;
            drop(previous);
        }

        self.settle(tree, Object::Null)
    }

    /// Evaluates an identifier into a Reference to its binding.
    ///
    /// # Returns
    /// A VALUE holding the Reference, or a NameError if the name is unbound.
    pub(crate) fn eval_ident(&self, tree: Tree, name: &Shared<WString>, line: usize) -> Result<Tree, AllocError> {
        let slot = self.globals.borrow().slot(&Object::String(name.clone()));

        match slot {
            Some(slot) => self.settle(tree, Object::Reference(Reference::to(&slot))),
            None => {
                let message = format!("undeclared identifier '{}'", **name);
                self.fail(tree, ErrorKind::Name, &message, line)
            },
        }
    }
}
