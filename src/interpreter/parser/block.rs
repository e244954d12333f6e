use tracing::debug;

use crate::{
    ast::{Node, Tree},
    error::AllocError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseFailure, TokenStream},
            statement::parse_statement,
        },
    },
};

/// Parses statements until the end of input.
///
/// Empty statements are skipped. The statements are collected into a
/// `Node::Block`. The first statement that fails to parse discards
/// everything parsed so far and the block becomes that statement's ERROR
/// node.
///
/// Grammar: `block := statement*`
///
/// # Parameters
/// - `tokens`: Token stream positioned at the start of the source.
///
/// # Returns
/// - `Ok(Some(tree))`: A block, or an ERROR node.
/// - `Ok(None)`: The source held no statements.
///
/// # Errors
/// Returns [`AllocError`] if the allocator refuses a request.
pub fn parse_block(tokens: &mut TokenStream<'_>) -> Result<Option<Tree>, AllocError> {
    let mut block: Option<Tree> = None;

    while tokens.peek().token != Token::Eof {
        match parse_statement(tokens) {
            Ok(None) => {},
            Ok(Some(statement)) => match &mut block {
                Some(block) => block.push_child(statement)?,
                None => {
                    let mut first = tokens.tree(Node::Block(Vec::new()))?;
                    first.push_child(statement)?;
                    block = Some(first);
                },
            },
            Err(ParseFailure::Syntax(e)) => {
                debug!(line = e.line(), "syntax error: {e}");
                return Ok(Some(tokens.tree(Node::Error(e))?));
            },
            Err(ParseFailure::Alloc(e)) => return Err(e),
        }
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::alloc::{AllocRef, SystemAllocator};

    fn dump(source: &str) -> String {
        let alloc: AllocRef = Rc::new(SystemAllocator);
        let mut tokens = TokenStream::new(source, &alloc);
        parse_block(&mut tokens).unwrap().map(|t| t.to_string()).unwrap_or_default()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(dump("1 + 2 * 3;"), "(block (+ 1 (* 2 3)))");
        assert_eq!(dump("1 * 2 + 3;"), "(block (+ (* 1 2) 3))");
        assert_eq!(dump("10 - 3 - 2;"), "(block (- (- 10 3) 2))");
        assert_eq!(dump("2 ** 3 ** 2;"), "(block (** 2 (** 3 2)))");
        assert_eq!(dump("a = b = 1;"), "(block (= a (= b 1)))");
        assert_eq!(dump("1 + 2 * 3 ** 2 - 4;"), "(block (- (+ 1 (* 2 (** 3 2))) 4))");
        assert_eq!(dump("x += 1 < 2 == 1;"), "(block (+= x (== (< 1 2) 1)))");
    }

    #[test]
    fn parentheses_and_unary_are_atoms() {
        assert_eq!(dump("(1 + 2) * 3;"), "(block (* (pass (+ 1 2)) 3))");
        assert_eq!(dump("--5;"), "(block (- (- 5)))");
        assert_eq!(dump("-2 ** 2;"), "(block (** (- 2) 2))");
        assert_eq!(dump("!x + 1;"), "(block (+ (! x) 1))");
    }

    #[test]
    fn literals() {
        assert_eq!(dump(r#"'a'; 0x10; 1.5; ""; "hi";"#),
                   r#"(block 97 16 1.5 "" "hi")"#);
    }

    #[test]
    fn declarations() {
        assert_eq!(dump("let x, y = 2, z = y + 1;"),
                   "(block (let x (= y 2) (= z (+ y 1))))");
    }

    #[test]
    fn empty_statements_are_skipped() {
        assert_eq!(dump(""), "");
        assert_eq!(dump(";;"), "");
        assert_eq!(dump("; 1; ;"), "(block 1)");
    }

    #[test]
    fn syntax_errors() {
        let cases = [("1 + ;", "expected an expression"),
                     ("();", "expected an expression"),
                     ("(1 + 2;", "expected closing parenthesis"),
                     ("let ;", "expected an identifier"),
                     ("let x = ;", "expected an expression"),
                     ("1 + 2", "expected a semicolon"),
                     ("1; ) 2;", "unexpected token ')'"),
                     ("1 2;", "expected a semicolon")];
        for (source, message) in cases {
            assert_eq!(dump(source),
                       format!("(error \"SyntaxError on line 1: {message}\")"),
                       "{source}");
        }
    }

    #[test]
    fn errors_report_their_line() {
        assert_eq!(dump("1;\n2;\n3 +;"),
                   "(error \"SyntaxError on line 3: expected an expression\")");
    }

    #[test]
    fn nodes_record_their_line() {
        let alloc: AllocRef = Rc::new(SystemAllocator);
        let mut tokens = TokenStream::new("(1 +\n 2);\n\nlet a;\n-a;\n7;", &alloc);
        let block = parse_block(&mut tokens).unwrap().unwrap();
        assert_eq!(block.line(), Some(1));

        let Node::Block(statements) = &*block else {
            panic!("expected a block, got {block}");
        };
        let lines: Vec<Option<usize>> = statements.iter().map(|s| s.line()).collect();
        assert_eq!(lines, vec![Some(1), Some(4), Some(5), None]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let source = "let a = 1, b; a = (a + 2) * -b ** 2 % 7;";
        assert_eq!(dump(source), dump(source));
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 20_000;
        let source = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));
        assert!(dump(&source).starts_with("(block (pass (pass"));
    }
}
