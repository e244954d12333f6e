use crate::{
    ast::{Node, Tree},
    interpreter::{
        lexer::Token,
        operator::UnaryOperator,
        parser::core::{ParseResult, TokenStream, parse_expression},
        value::{core::Object, string::WString},
    },
    util::stack::ensure_sufficient_stack,
};

/// Whether `token` can begin a primary expression.
#[must_use]
pub const fn starts_primary(token: &Token) -> bool {
    matches!(token,
             Token::Int(_) | Token::Float(_) | Token::Char(_) | Token::Str(_) | Token::Ident | Token::LParen)
}

/// Whether `token` can begin an expression.
#[must_use]
pub const fn starts_expression(token: &Token) -> bool {
    starts_primary(token) || UnaryOperator::from_token(token).is_some()
}

/// Parses a chain of prefix operators and the primary they apply to.
///
/// Prefix operators apply directly to what follows without consulting the
/// operator table, so `-2 ** 2` squares `-2`.
///
/// Grammar: `unary := ("-" | "!" | "~") unary | primary`
///
/// # Parameters
/// - `tokens`: Token stream positioned at the start of the operand.
///
/// # Returns
/// A `Node::Unary` chain or the primary itself.
pub fn parse_unary(tokens: &mut TokenStream<'_>) -> ParseResult<Tree> {
    let Some(op) = UnaryOperator::from_token(&tokens.peek().token) else {
        return parse_primary(tokens);
    };

    let line = tokens.next().line;
    let operand = ensure_sufficient_stack(|| parse_unary(tokens))?;
    Ok(tokens.tree(Node::Unary { op, operand, line })?)
}

/// Parses a primary expression.
///
/// Literals become values right away: integers and characters as Ints,
/// floats as Floats and string literals as String objects (the empty literal
/// shares the persistent empty string). Identifiers become `Node::Ident`
/// carrying their name, and parentheses a `Node::Pass`.
///
/// # Errors
/// - `Syntax` with "expected an expression" if no primary starts here.
pub fn parse_primary(tokens: &mut TokenStream<'_>) -> ParseResult<Tree> {
    let lexeme = tokens.peek();
    if !starts_primary(&lexeme.token) {
        return Err(tokens.syntax_error("expected an expression", lexeme.line));
    }

    let lexeme = tokens.next();
    let node = match lexeme.token {
        Token::Int(i) | Token::Char(i) => Node::Value(Object::Int(i)),
        Token::Float(f) => Node::Value(Object::Float(f)),
        Token::Str(ref bytes) if bytes.is_empty() => Node::Value(Object::String(WString::empty())),
        Token::Str(ref bytes) => Node::Value(Object::String(WString::allocate(tokens.alloc(), bytes)?)),
        Token::Ident => {
            let name = tokens.text(&lexeme);
            Node::Ident { name: WString::allocate(tokens.alloc(), name.as_bytes())?,
                          line: lexeme.line, }
        },
        // Only `(` is left.
        _ => return parse_parenthesized(tokens),
    };

    Ok(tokens.tree(node)?)
}

/// Parses the rest of a parenthesized expression after its `(`.
///
/// Grammar: `parenthesized := "(" expression ")"`
///
/// # Errors
/// - `Syntax` with "expected an expression" for `()`.
/// - `Syntax` with "expected closing parenthesis" if `)` is missing.
fn parse_parenthesized(tokens: &mut TokenStream<'_>) -> ParseResult<Tree> {
    let inner = ensure_sufficient_stack(|| parse_expression(tokens))?;

    let close = tokens.peek();
    if close.token != Token::RParen {
        return Err(tokens.syntax_error("expected closing parenthesis", close.line));
    }
    tokens.next();

    Ok(tokens.tree(Node::Pass(inner))?)
}
