use crate::{
    ast::{Node, Tree},
    error::AllocError,
    interpreter::{alloc::AllocRef, operator::BinaryOperator},
    util::stack::ensure_sufficient_stack,
};

/// Places a binary operator into an expression tree.
///
/// Starting at `tree`, the operator descends the right spine for as long as
/// it nests under the operator found there: a tighter binding, or an equal
/// one when right associative. Where it stops, the new node takes that
/// position and the subtree previously there becomes its left operand.
/// Atoms (values, identifiers, parenthesized and unary expressions) never
/// take a right operand, so the descent stops at them.
///
/// Used at the root, this makes the new operator the root whenever it binds
/// no tighter than the current one, which gives left associativity for
/// `+ - * / %` and right associativity for `**` and assignment.
///
/// # Parameters
/// - `alloc`: Allocator to charge the new node to.
/// - `tree`: The expression built so far.
/// - `op`: The operator just read.
/// - `operand`: The atom following it.
/// - `line`: Line number of the operator.
///
/// # Returns
/// The tree with the operator in place.
pub fn graft(alloc: &AllocRef,
             mut tree: Tree,
             op: BinaryOperator,
             operand: Tree,
             line: usize)
             -> Result<Tree, AllocError> {
    match tree.take() {
        Node::Binary { op: existing,
                       operands: [left, right],
                       line: existing_line, } if op.info().nests_under(&existing.info()) => {
            let right = ensure_sufficient_stack(|| graft(alloc, right, op, operand, line))?;
            tree.rewrite(Node::Binary { op:       existing,
                                        operands: [left, right],
                                        line:     existing_line, })?;
            Ok(tree)
        },
        node => {
            tree.rewrite(node)?;
            Tree::new(alloc,
                      Node::Binary { op,
                                     operands: [tree, operand],
                                     line })
        },
    }
}
