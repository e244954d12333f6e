use crate::{
    ast::{Node, Tree},
    interpreter::{
        lexer::Token,
        operator::BinaryOperator,
        parser::{
            core::{ParseResult, TokenStream, parse_expression},
            unary::starts_expression,
        },
        value::string::WString,
    },
};

/// Parses a single statement.
///
/// A statement is a `let` declaration or an expression, terminated by `;`.
/// A lone `;` is an empty statement.
///
/// Grammar: `statement := (declaration | expression)? ";"`
///
/// # Parameters
/// - `tokens`: Token stream positioned at the start of the statement.
///
/// # Returns
/// The statement's tree, or `None` for an empty statement.
///
/// # Errors
/// - `Syntax` with "unexpected token '…'" if nothing can start here.
/// - `Syntax` with "expected a semicolon" if the terminator is missing.
/// - Propagates any errors from sub-expression parsing.
pub fn parse_statement(tokens: &mut TokenStream<'_>) -> ParseResult<Option<Tree>> {
    let lexeme = tokens.peek();
    if !matches!(lexeme.token, Token::Semicolon | Token::Let) && !starts_expression(&lexeme.token) {
        let message = format!("unexpected token '{}'", tokens.text(lexeme));
        return Err(tokens.syntax_error(&message, lexeme.line));
    }

    let statement = match tokens.peek().token {
        Token::Semicolon => {
            tokens.next();
            return Ok(None);
        },
        Token::Let => parse_declaration(tokens)?,
        _ => parse_expression(tokens)?,
    };

    let end = tokens.peek();
    if end.token != Token::Semicolon {
        return Err(tokens.syntax_error("expected a semicolon", end.line));
    }
    tokens.next();

    Ok(Some(statement))
}

/// Parses a `let` declaration.
///
/// Declares one or more comma-separated names, each optionally initialized.
/// The result is a `Node::Let` whose children are bare `Node::Ident`s or
/// `=` nodes pairing the identifier with its initializer.
///
/// Grammar: `declaration := "let" binding ("," binding)*`
/// where `binding := identifier ("=" expression)?`
///
/// # Errors
/// - `Syntax` with "expected an identifier" if a name is missing.
/// - `Syntax` with "expected an expression" if an initializer is missing.
pub fn parse_declaration(tokens: &mut TokenStream<'_>) -> ParseResult<Tree> {
    let line = tokens.next().line;
    let mut declaration = tokens.tree(Node::Let { bindings: Vec::new(),
                                                  line })?;

    loop {
        let lexeme = tokens.peek();
        if lexeme.token != Token::Ident {
            return Err(tokens.syntax_error("expected an identifier", lexeme.line));
        }

        let lexeme = tokens.next();
        let name = WString::allocate(tokens.alloc(), tokens.text(&lexeme).as_bytes())?;
        let ident = tokens.tree(Node::Ident { name,
                                              line: lexeme.line })?;

        let binding = if tokens.peek().token == Token::Equals {
            let line = tokens.next().line;
            let initializer = parse_expression(tokens)?;
            tokens.tree(Node::Binary { op: BinaryOperator::Assign,
                                       operands: [ident, initializer],
                                       line })?
        } else {
            ident
        };
        declaration.push_child(binding)?;

        if tokens.peek().token != Token::Comma {
            return Ok(declaration);
        }
        tokens.next();
    }
}
