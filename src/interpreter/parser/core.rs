use crate::{
    ast::{Node, Tree},
    error::{AllocError, ErrorKind, ScriptError},
    interpreter::{
        alloc::AllocRef,
        lexer::{Lexeme, Lexer},
        parser::{binary::graft, unary::parse_unary},
        operator::BinaryOperator,
    },
};

/// Why a parsing function gave up.
#[derive(Debug)]
pub enum ParseFailure {
    /// Malformed input. Becomes an ERROR node at the statement boundary.
    Syntax(ScriptError),
    /// The allocator refused a request. Aborts the whole parse.
    Alloc(AllocError),
}

impl From<AllocError> for ParseFailure {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

pub type ParseResult<T> = Result<T, ParseFailure>;

/// The lexer plus the allocator every tree node and string is charged to.
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    alloc: AllocRef,
}

impl<'src> TokenStream<'src> {
    /// Starts reading `source`.
    #[must_use]
    pub fn new(source: &'src str, alloc: &AllocRef) -> Self {
        Self { lexer: Lexer::new(source),
               alloc: AllocRef::clone(alloc), }
    }

    /// The next lexeme, without consuming it.
    #[must_use]
    pub const fn peek(&self) -> &Lexeme {
        self.lexer.peek()
    }

    /// Consumes and returns the next lexeme.
    pub fn next(&mut self) -> Lexeme {
        self.lexer.next()
    }

    /// The source text of a lexeme.
    #[must_use]
    pub fn text(&self, lexeme: &Lexeme) -> &'src str {
        self.lexer.text(lexeme)
    }

    /// The allocator parsed nodes are charged to.
    #[must_use]
    pub const fn alloc(&self) -> &AllocRef {
        &self.alloc
    }

    /// Charges and boxes a node.
    pub fn tree(&self, node: Node) -> Result<Tree, AllocError> {
        Tree::new(&self.alloc, node)
    }

    /// Builds a syntax failure reported on `line`.
    ///
    /// If the message itself cannot be allocated the failure is an allocation
    /// failure instead.
    #[must_use]
    pub fn syntax_error(&self, message: &str, line: usize) -> ParseFailure {
        match ScriptError::new(&self.alloc, ErrorKind::Syntax, message, line) {
            Ok(e) => ParseFailure::Syntax(e),
            Err(e) => ParseFailure::Alloc(e),
        }
    }
}

/// Parses a full expression.
///
/// Reads an atom, then as long as a binary operator follows, reads the next
/// atom and places the operator into the tree built so far.
///
/// Grammar: `expression := unary (binary_operator unary)*`
///
/// # Parameters
/// - `tokens`: Token stream positioned at the start of the expression.
///
/// # Returns
/// The parsed expression tree.
///
/// # Errors
/// - `Syntax` with "expected an expression" if an operand is missing.
/// - Propagates any errors from sub-expression parsing.
pub fn parse_expression(tokens: &mut TokenStream<'_>) -> ParseResult<Tree> {
    let mut root = parse_unary(tokens)?;

    while let Some(op) = BinaryOperator::from_token(&tokens.peek().token) {
        let line = tokens.next().line;
        let operand = parse_unary(tokens)?;
        root = graft(tokens.alloc(), root, op, operand, line)?;
    }

    Ok(root)
}
