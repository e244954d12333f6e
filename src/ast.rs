use std::{fmt, ops::Deref};

use crate::{
    error::{AllocError, ScriptError},
    interpreter::{
        alloc::{AllocRef, Charge},
        operator::{BinaryOperator, UnaryOperator},
        value::{core::Object, shared::Shared, string::WString},
    },
    util::stack::ensure_sufficient_stack,
};

/// Represents a node in the abstract syntax tree (AST).
///
/// The number of children is fixed by the variant: leaves have none, `Pass`
/// and `Unary` have one, `Binary` has two, and `Block` and `Let` have any
/// number. Nodes own their children.
#[derive(Debug)]
pub enum Node {
    /// A literal, or the result of evaluating a subtree.
    Value(Object),
    /// A syntax or evaluation failure.
    Error(ScriptError),
    /// A variable name.
    Ident {
        /// The name as a string object, ready to use as a table key.
        name: Shared<WString>,
        /// Line number in the source code.
        line: usize,
    },
    /// A parenthesized expression. Shields its child from operator
    /// regrouping.
    Pass(Tree),
    /// A sequence of statements.
    Block(Vec<Tree>),
    /// A `let` declaration. Each binding is a bare `Ident` or an `Assign`
    /// binary node pairing an `Ident` with its initializer.
    Let {
        /// The declared bindings, in source order.
        bindings: Vec<Tree>,
        /// Line number in the source code.
        line:     usize,
    },
    /// A prefix operator applied to an operand.
    Unary {
        /// The operator.
        op:      UnaryOperator,
        /// The operand.
        operand: Tree,
        /// Line number in the source code.
        line:    usize,
    },
    /// A binary operator applied to two operands.
    Binary {
        /// The operator.
        op:       BinaryOperator,
        /// Left and right operands.
        operands: [Tree; 2],
        /// Line number in the source code.
        line:     usize,
    },
}

impl Default for Node {
    fn default() -> Self {
        Self::Value(Object::Unknown)
    }
}

/// The tag of a [`Node`], with one tag per operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `Node::Value`
    Value,
    /// `Node::Ident`
    Ident,
    /// `Node::Pass`
    Pass,
    /// `Node::Error`
    Error,
    /// `Node::Block`
    Block,
    /// `Node::Let`
    Let,
    /// `Node::Unary`
    Unary(UnaryOperator),
    /// `Node::Binary`
    Binary(BinaryOperator),
}

impl Node {
    /// The node's tag.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Value(_) => NodeKind::Value,
            Self::Error(_) => NodeKind::Error,
            Self::Ident { .. } => NodeKind::Ident,
            Self::Pass(_) => NodeKind::Pass,
            Self::Block(_) => NodeKind::Block,
            Self::Let { .. } => NodeKind::Let,
            Self::Unary { op, .. } => NodeKind::Unary(*op),
            Self::Binary { op, .. } => NodeKind::Binary(*op),
        }
    }

    /// The source line of the node, if it records one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Error(e) => Some(e.line()),
            Self::Ident { line, .. }
            | Self::Let { line, .. }
            | Self::Unary { line, .. }
            | Self::Binary { line, .. } => Some(*line),
            Self::Pass(child) => child.line(),
            Self::Block(children) => children.first().and_then(|c| c.line()),
            Self::Value(_) => None,
        }
    }

    /// The bytes charged for a node with this shape.
    fn footprint(&self) -> usize {
        let children = match self {
            Self::Block(children) | Self::Let { bindings: children, .. } => children.len(),
            _ => 0,
        };
        size_of::<Self>() + children * size_of::<Tree>()
    }
}

/// An owned, allocator-charged tree node.
///
/// The charge covers the node and, for `Block` and `Let`, its child list. It
/// is adjusted whenever the node is rewritten or grows, and released when the
/// tree is dropped.
pub struct Tree {
    node:   Box<Node>,
    charge: Charge,
}

impl Tree {
    /// Charges and boxes a node.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the charge.
    pub fn new(alloc: &AllocRef, node: Node) -> Result<Self, AllocError> {
        let charge = Charge::new(alloc, node.footprint())?;
        Ok(Self { node: Box::new(node),
                  charge })
    }

    /// The allocator the tree is charged to.
    #[must_use]
    pub const fn allocator(&self) -> &AllocRef {
        self.charge.allocator()
    }

    /// Moves the node out, leaving an `Unknown` value in its place.
    ///
    /// The box and its charge stay with the tree so the node can be rewritten
    /// in place with [`rewrite`](Self::rewrite).
    pub fn take(&mut self) -> Node {
        std::mem::take(&mut *self.node)
    }

    /// Stores `node` in this tree's box, adjusting the charge to its shape.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the adjusted charge.
    pub fn rewrite(&mut self, node: Node) -> Result<(), AllocError> {
        self.charge.resize(node.footprint())?;
        *self.node = node;
        Ok(())
    }

    /// Appends a child to a `Block` or `Let` node, growing the charge.
    ///
    /// Other nodes have a fixed number of children and are left unchanged.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the larger charge.
    pub fn push_child(&mut self, child: Self) -> Result<(), AllocError> {
        if let Node::Block(children) | Node::Let { bindings: children, .. } = &mut *self.node {
            self.charge.resize(self.charge.size() + size_of::<Self>())?;
            children.push(child);
        }
        Ok(())
    }

    /// Consumes the tree and returns its node.
    #[must_use]
    pub fn into_node(mut self) -> Node {
        self.take()
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let node = self.take();
        ensure_sufficient_stack(|| drop(node));
    }
}

impl Deref for Tree {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.node, f)
    }
}

/// Writes children separated by spaces, each preceded by one.
fn write_children(f: &mut fmt::Formatter<'_>, children: &[Tree]) -> fmt::Result {
    for child in children {
        write!(f, " {child}")?;
    }
    Ok(())
}

impl fmt::Display for Tree {
    /// Renders the tree as an S-expression, e.g. `(+ 1 (* 2 3))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match &*self.node {
            Node::Value(Object::String(s)) => write!(f, "{:?}", **s),
            Node::Value(object) => write!(f, "{object}"),
            Node::Error(e) => write!(f, "(error {:?})", e.to_string()),
            Node::Ident { name, .. } => write!(f, "{}", **name),
            Node::Pass(child) => write!(f, "(pass {child})"),
            Node::Block(children) => {
                write!(f, "(block")?;
                write_children(f, children)?;
                write!(f, ")")
            },
            Node::Let { bindings, .. } => {
                write!(f, "(let")?;
                write_children(f, bindings)?;
                write!(f, ")")
            },
            Node::Unary { op, operand, .. } => write!(f, "({op} {operand})"),
            Node::Binary { op, operands: [left, right], .. } => {
                write!(f, "({op} {left} {right})")
            },
        })
    }
}
