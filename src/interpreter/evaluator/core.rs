use crate::{
    ast::{Node, NodeKind, Tree},
    error::{AllocError, ErrorKind, OpError, ScriptError},
    interpreter::{state::State, value::core::Object},
    util::stack::ensure_sufficient_stack,
};

impl State {
    /// Evaluates a tree and returns its result.
    ///
    /// This is the main entry point for evaluation. Children are evaluated
    /// left to right before their parent, and each node is rewritten in its
    /// own box into a `Node::Value` holding its result, or a `Node::Error`
    /// describing why it failed. An ERROR produced below is handed up
    /// unchanged and everything around it is released.
    ///
    /// # Parameters
    /// - `tree`: The tree to evaluate. It is consumed.
    ///
    /// # Returns
    /// A VALUE or ERROR tree.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses a request. Nothing else
    /// is an `Err`.
    ///
    /// # Example
    /// ```
    /// use winter::{ast::Node, interpreter::state::State};
    ///
    /// let state = State::new().unwrap();
    /// let tree = state.parse("let x = 4; x * 2 + 1;").unwrap().unwrap();
    /// let result = state.evaluate(tree).unwrap();
    ///
    /// match result.into_node() {
    ///     Node::Value(object) => assert_eq!(object.as_int(), Some(9)),
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// ```
    pub fn evaluate(&self, tree: Tree) -> Result<Tree, AllocError> {
        ensure_sufficient_stack(|| self.eval_tree(tree))
    }

    /// Dispatches on the node kind.
    fn eval_tree(&self, mut tree: Tree) -> Result<Tree, AllocError> {
        match tree.take() {
            node @ (Node::Value(_) | Node::Error(_)) => {
                tree.rewrite(node)?;
                Ok(tree)
            },
            Node::Pass(child) => self.evaluate(child),
            Node::Ident { name, line } => self.eval_ident(tree, &name, line),
            Node::Block(statements) => self.eval_block(tree, statements),
            Node::Let { bindings, line } => self.eval_let(tree, bindings, line),
            Node::Unary { op, operand, line } => self.eval_unary(tree, op, operand, line),
            Node::Binary { op, operands, line } => self.eval_binary(tree, op, operands, line),
        }
    }

    /// Rewrites `tree` into a VALUE node holding `object`.
    pub(crate) fn settle(&self, mut tree: Tree, object: Object) -> Result<Tree, AllocError> {
        tree.rewrite(Node::Value(object))?;
        Ok(tree)
    }

    /// Rewrites `tree` into an ERROR node.
    pub(crate) fn fail(&self,
                       mut tree: Tree,
                       kind: ErrorKind,
                       message: &str,
                       line: usize)
                       -> Result<Tree, AllocError> {
        let error = ScriptError::new(&self.alloc, kind, message, line)?;
        tree.rewrite(Node::Error(error))?;
        Ok(tree)
    }

    /// Rewrites `tree` with the outcome of an operator primitive.
    ///
    /// Failures are reported against the operator spelled `symbol`. An
    /// allocation failure is not reportable and is returned as `Err`.
    pub(crate) fn conclude(&self,
                           tree: Tree,
                           outcome: Result<Object, OpError>,
                           symbol: &str,
                           line: usize)
                           -> Result<Tree, AllocError> {
        match outcome {
            Ok(object) => self.settle(tree, object),
            Err(OpError::Alloc(e)) => Err(e),
            Err(e) => {
                let kind = e.kind().unwrap_or(ErrorKind::Type);
                self.fail(tree, kind, &e.describe(symbol), line)
            },
        }
    }
}

/// Whether an evaluated tree is an ERROR node.
pub(crate) fn is_error(tree: &Tree) -> bool {
    tree.kind() == NodeKind::Error
}

/// Takes the object out of an evaluated, non-error tree, releasing the tree.
pub(crate) fn into_object(tree: Tree) -> Object {
    match tree.into_node() {
        Node::Value(object) => object,
        _ => Object::Unknown,
    }
}
