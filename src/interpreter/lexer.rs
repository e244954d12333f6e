use std::ops::Range;

use logos::Logos;

use crate::util::num::char_code;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Float literal tokens, such as `3.14`, `2.` or `6e-3`.
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    Float(f64),
    /// Integer literal tokens: `42`, `0x2A`, `0b101010` or `052`.
    #[regex(r"[1-9][0-9]*|0", |lex| parse_radix(lex.slice(), 10))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| parse_radix(&lex.slice()[2..], 16))]
    #[regex(r"0[bB][01]+", |lex| parse_radix(&lex.slice()[2..], 2))]
    #[regex(r"0[0-7]+", |lex| parse_radix(&lex.slice()[1..], 8))]
    Int(i64),
    /// Character literal tokens such as `'a'` or `'\n'`, carrying the
    /// character code.
    #[token("'", lex_char)]
    Char(i64),
    /// String literal tokens such as `"snow\n"`, carrying the decoded bytes.
    #[token("\"", lex_string)]
    Str(Vec<u8>),
    /// Identifier tokens; binding names such as `x` or `total_2`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// `let`
    #[token("let")]
    Let,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `for`
    #[token("for")]
    For,
    /// `do`
    #[token("do")]
    Do,
    /// `while`
    #[token("while")]
    While,
    /// `break`
    #[token("break")]
    Break,
    /// `return`
    #[token("return")]
    Return,

    /// `<<=`
    #[token("<<=")]
    ShlAssign,
    /// `>>=`
    #[token(">>=")]
    ShrAssign,
    /// `**`
    #[token("**")]
    StarStar,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `%=`
    #[token("%=")]
    PercentAssign,
    /// `|=`
    #[token("|=")]
    PipeAssign,
    /// `&=`
    #[token("&=")]
    AmpersandAssign,
    /// `^=`
    #[token("^=")]
    CaretAssign,
    /// `||`
    #[token("||")]
    DoublePipe,
    /// `&&`
    #[token("&&")]
    DoubleAmpersand,
    /// `<<`
    #[token("<<")]
    Shl,
    /// `>>`
    #[token(">>")]
    Shr,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `=`
    #[token("=")]
    Equals,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `|`
    #[token("|")]
    Pipe,
    /// `!`
    #[token("!")]
    Bang,
    /// `^`
    #[token("^")]
    Caret,
    /// `~`
    #[token("~")]
    Tilde,

    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,

    /// `// Comments.`
    #[token("//", skip_line_comment)]
    Comment,
    /// ```text
    /// /* Multi line comments. */
    /// ```
    #[token("/*", skip_block_comment)]
    MultiLineComment,
    /// Line breaks.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs and feeds.
    #[regex(r"[ \t\r\x0B\x0C]+", logos::skip)]
    Ignored,

    /// Input no rule recognizes.
    Unknown,
    /// End of input.
    Eof,
}

/// The broad class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Number, character, string literals and identifiers.
    Literal,
    /// Arithmetic, comparison, logical, bitwise and assignment operators.
    Operator,
    /// Reserved words.
    Keyword,
    /// Punctuation.
    Symbol,
    /// End of input.
    Eof,
    /// Unrecognized input.
    Unknown,
}

impl Token {
    /// Classifies the token.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Float(_) | Self::Int(_) | Self::Char(_) | Self::Str(_) | Self::Ident => {
                TokenKind::Literal
            },
            Self::Let
            | Self::If
            | Self::Else
            | Self::For
            | Self::Do
            | Self::While
            | Self::Break
            | Self::Return => TokenKind::Keyword,
            Self::Dot
            | Self::Comma
            | Self::Semicolon
            | Self::LParen
            | Self::RParen
            | Self::LBrace
            | Self::RBrace
            | Self::LBracket
            | Self::RBracket => TokenKind::Symbol,
            Self::Eof => TokenKind::Eof,
            Self::Unknown | Self::Comment | Self::MultiLineComment | Self::NewLine | Self::Ignored => {
                TokenKind::Unknown
            },
            _ => TokenKind::Operator,
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset where that line starts,
/// so every token can report a line and column.
#[derive(Debug, Clone, Copy)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized, from 1.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// A token together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token.
    pub token:  Token,
    /// Byte range in the source.
    pub span:   Range<usize>,
    /// Line number, from 1.
    pub line:   usize,
    /// Column number, from 1, counted in bytes.
    pub column: usize,
}

/// A token stream with one token of lookahead.
///
/// Wraps the generated logos lexer. Unrecognized input becomes an
/// [`Token::Unknown`] lexeme so the stream always makes progress, and the end
/// of input is reported as [`Token::Eof`] as often as it is asked for.
///
/// ## Example
/// ```
/// use winter::interpreter::lexer::{Lexer, Token};
///
/// let mut lexer = Lexer::new("let x = 0x10;");
/// assert_eq!(lexer.peek().token, Token::Let);
/// assert_eq!(lexer.next().token, Token::Let);
///
/// let ident = lexer.next();
/// assert_eq!(ident.token, Token::Ident);
/// assert_eq!(lexer.text(&ident), "x");
/// assert_eq!(ident.column, 5);
///
/// assert_eq!(lexer.next().token, Token::Equals);
/// assert_eq!(lexer.next().token, Token::Int(16));
/// assert_eq!(lexer.next().token, Token::Semicolon);
/// assert_eq!(lexer.next().token, Token::Eof);
/// ```
pub struct Lexer<'src> {
    source:    &'src str,
    inner:     logos::Lexer<'src, Token>,
    current:   Option<Lexeme>,
    lookahead: Lexeme,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `source` and reads the first token.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut inner = Token::lexer_with_extras(source, LexerExtras::default());
        let lookahead = Self::scan(&mut inner);
        Self { source,
               inner,
               current: None,
               lookahead }
    }

    /// Reads one lexeme from the generated lexer.
    fn scan(inner: &mut logos::Lexer<'src, Token>) -> Lexeme {
        let token = match inner.next() {
            Some(Ok(token)) => token,
            Some(Err(())) => Token::Unknown,
            None => {
                let end = inner.source().len();
                let extras = inner.extras;
                return Lexeme { token:  Token::Eof,
                                span:   end..end,
                                line:   extras.line,
                                column: end - extras.line_start + 1, };
            },
        };

        let span = inner.span();
        let extras = inner.extras;
        Lexeme { column: span.start.saturating_sub(extras.line_start) + 1,
                 token,
                 span,
                 line: extras.line }
    }

    /// Consumes the lookahead token and returns it.
    pub fn next(&mut self) -> Lexeme {
        let following = Self::scan(&mut self.inner);
        let consumed = std::mem::replace(&mut self.lookahead, following);
        self.current = Some(consumed.clone());
        consumed
    }

    /// The next token, without consuming it.
    #[must_use]
    pub const fn peek(&self) -> &Lexeme {
        &self.lookahead
    }

    /// The last token consumed.
    #[must_use]
    pub const fn current(&self) -> Option<&Lexeme> {
        self.current.as_ref()
    }

    /// The source text a lexeme spans.
    #[must_use]
    pub fn text(&self, lexeme: &Lexeme) -> &'src str {
        self.source.get(lexeme.span.clone()).unwrap_or_default()
    }
}

/// Parses a floating-point literal from the current token slice.
///
/// # Parameters
/// - `lex`: Reference to the Logos lexer at the current token.
///
/// # Returns
/// - `Some(f64)`: The parsed floating-point value if successful.
/// - `None`: If the token slice is not a valid float.
fn parse_float(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses the digits of an integer literal in the given radix.
///
/// Digits are folded with wrapping arithmetic, so a literal wider than 64
/// bits keeps its low 64 bits instead of being rejected.
///
/// # Returns
/// - `Some(i64)`: The parsed integer value.
/// - `None`: If a digit is not valid in `radix`.
fn parse_radix(digits: &str, radix: u32) -> Option<i64> {
    digits.chars().try_fold(0i64, |value, c| {
                      let digit = c.to_digit(radix)?;
                      Some(value.wrapping_mul(i64::from(radix)).wrapping_add(i64::from(digit)))
                  })
}

/// Skips a `//` comment up to, but not including, the line break.
fn skip_line_comment(lex: &mut logos::Lexer<Token>) -> logos::Skip {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    logos::Skip
}

/// Skips a `/* */` comment, counting the lines it spans. An unterminated
/// comment runs to the end of input.
fn skip_block_comment(lex: &mut logos::Lexer<Token>) -> logos::Skip {
    let rest = lex.remainder();
    let length = rest.find("*/").map_or(rest.len(), |end| end + 2);
    let start = lex.span().end;

    for (offset, _) in rest[..length].match_indices('\n') {
        lex.extras.line += 1;
        lex.extras.line_start = start + offset + 1;
    }
    lex.bump(length);
    logos::Skip
}

/// Finds the closing `quote` of a literal at the start of `rest`, honouring
/// backslash escapes. Literals do not span lines.
fn find_closing(rest: &str, quote: u8) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\\' => i += 2,
            b'\n' => return None,
            _ if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Lexes the body of a string literal after its opening quote.
///
/// # Returns
/// - `Some(Vec<u8>)`: The bytes with escapes decoded.
/// - `None`: If the literal is not terminated on the same line.
fn lex_string(lex: &mut logos::Lexer<Token>) -> Option<Vec<u8>> {
    let rest = lex.remainder();
    let end = find_closing(rest, b'"')?;
    let decoded = unescape(&rest.as_bytes()[..end]);
    lex.bump(end + 1);
    Some(decoded)
}

/// Lexes the body of a character literal after its opening quote.
///
/// # Returns
/// - `Some(i64)`: The code of the single (possibly escaped) character.
/// - `None`: If the literal is unterminated, empty, or holds more than one
///   character.
fn lex_char(lex: &mut logos::Lexer<Token>) -> Option<i64> {
    let rest = lex.remainder();
    let end = find_closing(rest, b'\'')?;
    let body = &rest[..end];

    let code = if body.starts_with('\\') {
        match unescape(body.as_bytes()).as_slice() {
            [byte] => i64::from(*byte),
            _ => return None,
        }
    } else {
        let mut chars = body.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => char_code(c),
            _ => return None,
        }
    };

    lex.bump(end + 1);
    Some(code)
}

/// The value of one hexadecimal digit.
const fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decodes backslash escapes.
///
/// Supports the single-character escapes `\n \t \r \v \f \a \b \\ \" \' \?`,
/// octal escapes of one to three digits and hex escapes of one or two digits.
/// Any other escaped character stands for itself.
///
/// ## Example
/// ```text
/// unescape(br"a\tb\101\x42") == b"a\tbAB"
/// ```
fn unescape(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(escape) = bytes.next() else {
            break;
        };

        let decoded = match escape {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'v' => 0x0B,
            b'f' => 0x0C,
            b'a' => 0x07,
            b'b' => 0x08,
            b'0'..=b'7' => {
                let mut value = escape - b'0';
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(&d @ b'0'..=b'7') => {
                            value = value.wrapping_mul(8).wrapping_add(d - b'0');
                            bytes.next();
                        },
                        _ => break,
                    }
                }
                value
            },
            b'x' => {
                let mut value = None::<u8>;
                for _ in 0..2 {
                    match bytes.peek().copied().and_then(hex_value) {
                        Some(d) => {
                            value = Some(value.unwrap_or(0) * 16 + d);
                            bytes.next();
                        },
                        None => break,
                    }
                }
                value.unwrap_or(b'x')
            },
            other => other,
        };
        out.push(decoded);
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let lexeme = lexer.next();
            if lexeme.token == Token::Eof {
                return out;
            }
            out.push(lexeme.token);
        }
    }

    #[test]
    fn numbers_in_every_radix() {
        assert_eq!(tokens("10 0x1f 0B101 017 0 2.5 3. 1e3"),
                   vec![Token::Int(10),
                        Token::Int(31),
                        Token::Int(5),
                        Token::Int(15),
                        Token::Int(0),
                        Token::Float(2.5),
                        Token::Float(3.0),
                        Token::Float(1000.0)]);
    }

    #[test]
    fn oversized_literals_wrap() {
        #[allow(clippy::cast_possible_truncation)]
        let wrapped = 99_999_999_999_999_999_999_u128 as i64;
        assert_eq!(tokens("99999999999999999999"), vec![Token::Int(wrapped)]);
        assert_eq!(tokens("0x10000000000000001"), vec![Token::Int(1)]);
        assert_eq!(tokens("18446744073709551615"), vec![Token::Int(-1)]);
    }

    #[test]
    fn tokens_are_classified() {
        let kinds: Vec<TokenKind> = tokens("7 2.5 'c' \"s\" name let while += ** ! ; ( ] @")
            .iter()
            .map(Token::kind)
            .collect();
        assert_eq!(kinds,
                   vec![TokenKind::Literal,
                        TokenKind::Literal,
                        TokenKind::Literal,
                        TokenKind::Literal,
                        TokenKind::Literal,
                        TokenKind::Keyword,
                        TokenKind::Keyword,
                        TokenKind::Operator,
                        TokenKind::Operator,
                        TokenKind::Operator,
                        TokenKind::Symbol,
                        TokenKind::Symbol,
                        TokenKind::Symbol,
                        TokenKind::Unknown]);
        assert_eq!(Token::Eof.kind(), TokenKind::Eof);
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(tokens("a <<= b ** c >= d"),
                   vec![Token::Ident,
                        Token::ShlAssign,
                        Token::Ident,
                        Token::StarStar,
                        Token::Ident,
                        Token::GreaterEqual,
                        Token::Ident]);
        assert_eq!(tokens("--5"), vec![Token::Minus, Token::Minus, Token::Int(5)]);
    }

    #[test]
    fn keywords_respect_word_boundaries() {
        assert_eq!(tokens("let letter iffy if"),
                   vec![Token::Let, Token::Ident, Token::Ident, Token::If]);
    }

    #[test]
    fn string_and_char_escapes() {
        assert_eq!(tokens(r#""a\tb\101\x42\"" '\n' 'z' '\0'"#),
                   vec![Token::Str(b"a\tbAB\"".to_vec()),
                        Token::Char(10),
                        Token::Char(122),
                        Token::Char(0)]);
    }

    #[test]
    fn unterminated_string_is_unknown() {
        let mut lexer = Lexer::new("\"abc");
        let first = lexer.next();
        assert_eq!(first.token, Token::Unknown);
        assert_eq!(first.span, 0..1);
    }

    #[test]
    fn unknown_input_makes_progress() {
        assert_eq!(tokens("1 @ 2"), vec![Token::Int(1), Token::Unknown, Token::Int(2)]);
    }

    #[test]
    fn comments_and_positions() {
        let mut lexer = Lexer::new("1 // one\n/* two\nthree */ x");
        assert_eq!(lexer.next().token, Token::Int(1));

        let x = lexer.next();
        assert_eq!(x.token, Token::Ident);
        assert_eq!(x.line, 3);
        assert_eq!(x.column, 10);
        assert_eq!(lexer.current().map(|l| l.line), Some(3));
        assert_eq!(lexer.next().token, Token::Eof);
        assert_eq!(lexer.next().token, Token::Eof);
    }

    #[test]
    fn unterminated_block_comment_runs_to_the_end() {
        assert_eq!(tokens("1 /* 2 3"), vec![Token::Int(1)]);
    }
}
