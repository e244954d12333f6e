use std::fmt;

use crate::{
    error::OpError,
    interpreter::{
        alloc::AllocRef,
        lexer::Token,
        value::{arith, core::Object},
    },
};

/// A binary operator primitive.
pub type BinaryFn = fn(&AllocRef, Object, Object) -> Result<Object, OpError>;
/// A unary operator primitive.
pub type UnaryFn = fn(&AllocRef, Object) -> Result<Object, OpError>;

/// How a binary operator chains with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a = b = c` is `a = (b = c)`.
    Right,
}

/// How a binary operator's primitive receives its operands.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Both operands are dereferenced first.
    Value(BinaryFn),
    /// The left operand is passed as is, so a Reference reaches the
    /// primitive.
    Store(BinaryFn),
}

/// One row of the operator table.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    /// Binding strength; higher binds tighter.
    pub precedence:    u8,
    /// How the operator chains with operators of the same precedence.
    pub associativity: Associativity,
    /// The primitive, or `None` if the operator is recognised but has no
    /// implementation.
    pub function:      Option<Operation>,
}

impl OpInfo {
    const fn left(precedence: u8, function: Option<Operation>) -> Self {
        Self { precedence,
               associativity: Associativity::Left,
               function }
    }

    const fn right(precedence: u8, function: Option<Operation>) -> Self {
        Self { precedence,
               associativity: Associativity::Right,
               function }
    }

    /// Whether an operator described by `self`, arriving after a node
    /// built from `existing`, becomes that node's right operand.
    ///
    /// That is the case when it binds tighter, or equally tight and it is
    /// right associative.
    #[must_use]
    pub fn nests_under(&self, existing: &Self) -> bool {
        self.precedence > existing.precedence
        || (self.precedence == existing.precedence && self.associativity == Associativity::Right)
    }
}

/// Every binary operator the parser recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    RemAssign,
    /// `<<=`
    ShlAssign,
    /// `>>=`
    ShrAssign,
    /// `&=`
    AndAssign,
    /// `|=`
    OrAssign,
    /// `^=`
    XorAssign,
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `**`
    Pow,
}

impl BinaryOperator {
    /// Maps a token to the binary operator it spells, if any.
    #[must_use]
    pub const fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Equals => Self::Assign,
            Token::PlusAssign => Self::AddAssign,
            Token::MinusAssign => Self::SubAssign,
            Token::StarAssign => Self::MulAssign,
            Token::SlashAssign => Self::DivAssign,
            Token::PercentAssign => Self::RemAssign,
            Token::ShlAssign => Self::ShlAssign,
            Token::ShrAssign => Self::ShrAssign,
            Token::AmpersandAssign => Self::AndAssign,
            Token::PipeAssign => Self::OrAssign,
            Token::CaretAssign => Self::XorAssign,
            Token::DoublePipe => Self::LogicalOr,
            Token::DoubleAmpersand => Self::LogicalAnd,
            Token::Pipe => Self::BitOr,
            Token::Caret => Self::BitXor,
            Token::Ampersand => Self::BitAnd,
            Token::EqualEqual => Self::Equal,
            Token::BangEqual => Self::NotEqual,
            Token::Less => Self::Less,
            Token::Greater => Self::Greater,
            Token::LessEqual => Self::LessEqual,
            Token::GreaterEqual => Self::GreaterEqual,
            Token::Shl => Self::Shl,
            Token::Shr => Self::Shr,
            Token::Plus => Self::Add,
            Token::Minus => Self::Sub,
            Token::Star => Self::Mul,
            Token::Slash => Self::Div,
            Token::Percent => Self::Rem,
            Token::StarStar => Self::Pow,
            _ => return None,
        })
    }

    /// The operator's source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::RemAssign => "%=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
            Self::LogicalOr => "||",
            Self::LogicalAnd => "&&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "**",
        }
    }

    /// The operator's row in the operator table.
    ///
    /// ## Example
    /// ```
    /// use winter::interpreter::operator::{Associativity, BinaryOperator};
    ///
    /// let pow = BinaryOperator::Pow.info();
    /// assert_eq!(pow.associativity, Associativity::Right);
    /// assert!(pow.precedence > BinaryOperator::Mul.info().precedence);
    /// assert!(BinaryOperator::Shl.info().function.is_none());
    /// ```
    #[must_use]
    pub const fn info(self) -> OpInfo {
        use Operation::{Store, Value};

        match self {
            Self::Assign => OpInfo::right(1, Some(Store(arith::assign))),
            Self::AddAssign => OpInfo::right(1, Some(Store(arith::add_assign))),
            Self::SubAssign => OpInfo::right(1, Some(Store(arith::subtract_assign))),
            Self::MulAssign => OpInfo::right(1, Some(Store(arith::multiply_assign))),
            Self::DivAssign => OpInfo::right(1, Some(Store(arith::divide_assign))),
            Self::RemAssign => OpInfo::right(1, Some(Store(arith::remainder_assign))),
            Self::ShlAssign | Self::ShrAssign | Self::AndAssign | Self::OrAssign | Self::XorAssign => {
                OpInfo::right(1, None)
            },
            Self::LogicalOr => OpInfo::left(2, None),
            Self::LogicalAnd => OpInfo::left(3, None),
            Self::BitOr => OpInfo::left(4, None),
            Self::BitXor => OpInfo::left(5, None),
            Self::BitAnd => OpInfo::left(6, None),
            Self::Equal => OpInfo::left(7, Some(Value(arith::equal))),
            Self::NotEqual => OpInfo::left(7, Some(Value(arith::not_equal))),
            Self::Less => OpInfo::left(8, Some(Value(arith::less))),
            Self::Greater => OpInfo::left(8, Some(Value(arith::greater))),
            Self::LessEqual => OpInfo::left(8, Some(Value(arith::less_equal))),
            Self::GreaterEqual => OpInfo::left(8, Some(Value(arith::greater_equal))),
            Self::Shl | Self::Shr => OpInfo::left(9, None),
            Self::Add => OpInfo::left(10, Some(Value(arith::add))),
            Self::Sub => OpInfo::left(10, Some(Value(arith::subtract))),
            Self::Mul => OpInfo::left(11, Some(Value(arith::multiply))),
            Self::Div => OpInfo::left(11, Some(Value(arith::divide))),
            Self::Rem => OpInfo::left(11, Some(Value(arith::remainder))),
            Self::Pow => OpInfo::right(12, Some(Value(arith::power))),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Every prefix operator the parser recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `!`
    Not,
    /// `~`
    BitNot,
}

impl UnaryOperator {
    /// Maps a token to the prefix operator it spells, if any.
    #[must_use]
    pub const fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Minus => Some(Self::Negate),
            Token::Bang => Some(Self::Not),
            Token::Tilde => Some(Self::BitNot),
            _ => None,
        }
    }

    /// The operator's source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }

    /// The primitive, or `None` if the operator has no implementation.
    #[must_use]
    pub const fn function(self) -> Option<UnaryFn> {
        match self {
            Self::Negate => Some(arith::negate),
            Self::Not => Some(arith::not),
            Self::BitNot => None,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::Lexer;

    #[test]
    fn nesting_follows_precedence_and_associativity() {
        let add = BinaryOperator::Add.info();
        let mul = BinaryOperator::Mul.info();
        let pow = BinaryOperator::Pow.info();
        let assign = BinaryOperator::Assign.info();

        assert!(mul.nests_under(&add));
        assert!(!add.nests_under(&mul));
        assert!(!add.nests_under(&add));
        assert!(pow.nests_under(&pow));
        assert!(assign.nests_under(&assign));
    }

    #[test]
    fn symbols_lex_back_to_their_operator() {
        use BinaryOperator::*;

        let ops = [Assign, AddAssign, SubAssign, MulAssign, DivAssign, RemAssign, ShlAssign,
                   ShrAssign, AndAssign, OrAssign, XorAssign, LogicalOr, LogicalAnd, BitOr,
                   BitXor, BitAnd, Equal, NotEqual, Less, Greater, LessEqual, GreaterEqual, Shl,
                   Shr, Add, Sub, Mul, Div, Rem, Pow];
        for op in ops {
            let token = Lexer::new(op.symbol()).next().token;
            assert_eq!(BinaryOperator::from_token(&token), Some(op), "{op}");
        }

        for op in [UnaryOperator::Negate, UnaryOperator::Not, UnaryOperator::BitNot] {
            let token = Lexer::new(op.symbol()).next().token;
            assert_eq!(UnaryOperator::from_token(&token), Some(op));
        }
        assert_eq!(BinaryOperator::from_token(&Token::Bang), None);
    }
}
