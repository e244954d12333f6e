use crate::{
    ast::Tree,
    error::{AllocError, ErrorKind},
    interpreter::{
        evaluator::core::{into_object, is_error},
        operator::{BinaryOperator, Operation},
        state::State,
    },
};

impl State {
    /// Evaluates a binary operator.
    ///
    /// Both operands are evaluated, left first. If either produces an ERROR
    /// node that node is the result and the other operand is released. The
    /// operator's table entry then decides how the primitive is called:
    /// `Operation::Value` primitives receive dereferenced operands, while
    /// `Operation::Store` primitives receive the left operand as is so an
    /// assignment can reach the binding through its Reference.
    ///
    /// # Parameters
    /// - `tree`: The operator's node, rewritten into the result.
    /// - `op`: The operator.
    /// - `operands`: Left and right subtrees.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// A VALUE tree, or an ERROR tree if an operand failed, the operator has
    /// no implementation, or the primitive rejected its operands.
    pub(crate) fn eval_binary(&self,
                              tree: Tree,
                              op: BinaryOperator,
                              [left, right]: [Tree; 2],
                              line: usize)
                              -> Result<Tree, AllocError> {
        let left = self.evaluate(left)?;
        if is_error(&left) {
            return Ok(left);
        }

        let right = self.evaluate(right)?;
        if is_error(&right) {
            return Ok(right);
        }

        let Some(operation) = op.info().function else {
            let message = format!("operator '{op}' is not supported");
            return self.fail(tree, ErrorKind::Type, &message, line);
        };

        let left = into_object(left);
        let right = into_object(right).dereferenced();
        let outcome = match operation {
            Operation::Value(function) => function(&self.alloc, left.dereferenced(), right),
            Operation::Store(function) => function(&self.alloc, left, right),
        };

        self.conclude(tree, outcome, op.symbol(), line)
    }
}
