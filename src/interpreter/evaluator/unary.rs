use crate::{
    ast::Tree,
    error::{AllocError, ErrorKind},
    interpreter::{
        evaluator::core::{into_object, is_error},
        operator::UnaryOperator,
        state::State,
    },
};

impl State {
    /// Evaluates a prefix operator.
    ///
    /// The operand is evaluated and dereferenced, then handed to the
    /// operator's primitive.
    ///
    /// # Parameters
    /// - `tree`: The operator's node, rewritten into the result.
    /// - `op`: The operator.
    /// - `operand`: The operand subtree.
    /// - `line`: Line number for error reporting.
    pub(crate) fn eval_unary(&self,
                             tree: Tree,
                             op: UnaryOperator,
                             operand: Tree,
                             line: usize)
                             -> Result<Tree, AllocError> {
        let operand = self.evaluate(operand)?;
        if is_error(&operand) {
            return Ok(operand);
        }

        let Some(function) = op.function() else {
            let message = format!("operator '{op}' is not supported");
            return self.fail(tree, ErrorKind::Type, &message, line);
        };

        let outcome = function(&self.alloc, into_object(operand).dereferenced());
        self.conclude(tree, outcome, op.symbol(), line)
    }
}
