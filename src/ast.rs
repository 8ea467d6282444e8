use crate::{Int, NonEmpty};
use std::fmt::{self, Write};

/// Additive operators, lowest precedence level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AddOp {
    Add,
    Sub,
}

impl fmt::Display for AddOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MulOp {
    Mul,
    Div,
}

impl fmt::Display for MulOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

/// A comparison written in a die modifier, e.g. the `<` of `ro<2`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Cmp {
    Less,
    Equal,
    Greater,
}

impl Cmp {
    pub fn matches(self, lhs: Int, rhs: Int) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::Equal => lhs == rhs,
            Self::Greater => lhs > rhs,
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Less => '<',
            Self::Equal => '=',
            Self::Greater => '>',
        };
        f.write_char(c)
    }
}

/// A full expression: a chain of terms joined by `+`/`-` in written order,
/// evaluated left to right.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Expr {
    pub first: Term,
    pub rest: Vec<(AddOp, Term)>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Term {
    pub first: Func,
    pub rest: Vec<(MulOp, Func)>,
}

/// A unary function application. `"id"` is the canonical no-function
/// marker: it is written by the parser when no function name appears and
/// is invisible when printing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Func {
    pub name: String,
    pub arg: Negation,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Negation {
    pub negated: bool,
    pub value: Expo,
}

/// Right-associative exponentiation: `2^3^2` is `2^(3^2)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Expo {
    pub base: Base,
    pub exponent: Option<Box<Expo>>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Base {
    Num(NumBase),
    Dice(Box<Dice>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NumBase {
    Paren(Box<Expr>),
    Value(Int),
}

/// The die half of a dice expression: `d6`, `d(2+4)`, or `d{-1,0,1}`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Die {
    Faces(NumBase),
    Custom(NonEmpty<Int>),
}

/// A rolled pool: `count` dice of `die`, with modifiers applied in
/// written order. Consecutive dice fold left, so the count of `2d6d4`
/// is the inner `2d6`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Dice {
    pub count: Base,
    pub die: Die,
    pub ops: Vec<DieOp>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DieOp {
    Reroll { once: bool, cmp: Cmp, limit: Int },
    Keep(Selector),
    Drop(Selector),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Selector {
    Low(Int),
    High(Int),
    Where(Cmp, Int),
}

impl Expr {
    pub fn number(n: Int) -> Self {
        NumBase::Value(n).into()
    }
}

impl From<Base> for Expr {
    fn from(base: Base) -> Self {
        Expr {
            first: Term {
                first: Func {
                    name: "id".to_owned(),
                    arg: Negation {
                        negated: false,
                        value: Expo {
                            base,
                            exponent: None,
                        },
                    },
                },
                rest: Vec::new(),
            },
            rest: Vec::new(),
        }
    }
}

impl From<NumBase> for Expr {
    fn from(nb: NumBase) -> Self {
        Base::Num(nb).into()
    }
}

impl From<Dice> for Expr {
    fn from(dice: Dice) -> Self {
        Base::Dice(Box::new(dice)).into()
    }
}

impl std::str::FromStr for Expr {
    type Err = crate::parse::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.first, f)?;
        for (op, term) in &self.rest {
            write!(f, " {} {}", op, term)?;
        }
        Ok(())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.first, f)?;
        for (op, func) in &self.rest {
            write!(f, " {} {}", op, func)?;
        }
        Ok(())
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name != "id" {
            write!(f, "{} ", self.name)?;
        }
        fmt::Display::fmt(&self.arg, f)
    }
}

impl fmt::Display for Negation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_char('-')?;
        }
        fmt::Display::fmt(&self.value, f)
    }
}

impl fmt::Display for Expo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)?;
        if let Some(exponent) = &self.exponent {
            write!(f, " ^ {}", exponent)?;
        }
        Ok(())
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(nb) => fmt::Display::fmt(nb, f),
            Self::Dice(dice) => fmt::Display::fmt(dice, f),
        }
    }
}

impl fmt::Display for NumBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paren(expr) => write!(f, "({})", expr),
            Self::Value(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Faces(nb) => write!(f, "d{}", nb),
            Self::Custom(faces) => {
                f.write_str("d{")?;
                for (i, face) in faces.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    fmt::Display::fmt(face, f)?;
                }
                f.write_char('}')
            }
        }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)?;
        for op in &self.ops {
            fmt::Display::fmt(op, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for DieOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reroll { once, cmp, limit } => {
                f.write_str(if *once { "ro" } else { "rr" })?;
                write!(f, "{}{}", cmp, limit)
            }
            Self::Keep(sel) => write!(f, "k{}", sel),
            Self::Drop(sel) => write!(f, "d{}", sel),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low(n) => write!(f, "l{}", n),
            Self::High(n) => write!(f, "h{}", n),
            Self::Where(cmp, n) => write!(f, "w{}{}", cmp, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::test_strategies::expr_strategy;
    use proptest::prelude::*;
    use vec1::vec1;

    fn simple_dice(count: Int, sides: Int, ops: Vec<DieOp>) -> Dice {
        Dice {
            count: Base::Num(NumBase::Value(count)),
            die: Die::Faces(NumBase::Value(sides)),
            ops,
        }
    }

    #[test]
    fn test_display_dice() {
        assert_eq!(simple_dice(3, 6, vec![]).to_string(), "3d6");
        assert_eq!(
            simple_dice(4, 6, vec![DieOp::Keep(Selector::High(3))]).to_string(),
            "4d6kh3"
        );
        assert_eq!(
            simple_dice(
                10,
                4,
                vec![
                    DieOp::Reroll {
                        once: true,
                        cmp: Cmp::Less,
                        limit: 2
                    },
                    DieOp::Drop(Selector::Where(Cmp::Equal, 4)),
                ]
            )
            .to_string(),
            "10d4ro<2dw=4"
        );
    }

    #[test]
    fn test_display_custom_die() {
        let dice = Dice {
            count: Base::Num(NumBase::Value(2)),
            die: Die::Custom(vec1![-1, 0, 1]),
            ops: vec![],
        };
        assert_eq!(dice.to_string(), "2d{-1,0,1}");
    }

    #[test]
    fn test_display_folded_dice() {
        let inner = simple_dice(2, 6, vec![]);
        let outer = Dice {
            count: Base::Dice(Box::new(inner)),
            die: Die::Faces(NumBase::Value(4)),
            ops: vec![],
        };
        assert_eq!(outer.to_string(), "2d6d4");
    }

    #[test]
    fn test_display_func_id_invisible() {
        assert_eq!(Expr::number(5).to_string(), "5");

        let fact = Expr {
            first: Term {
                first: Func {
                    name: "fact".to_owned(),
                    arg: Negation {
                        negated: false,
                        value: Expo {
                            base: Base::Num(NumBase::Value(5)),
                            exponent: None,
                        },
                    },
                },
                rest: vec![],
            },
            rest: vec![],
        };
        assert_eq!(fact.to_string(), "fact 5");
    }

    #[test]
    fn test_display_chains() {
        let expr = parse("2+3*4").unwrap();
        assert_eq!(expr.to_string(), "2 + 3 * 4");

        let expr = parse("(2+3)*4").unwrap();
        assert_eq!(expr.to_string(), "(2 + 3) * 4");

        let expr = parse("2^3^2").unwrap();
        assert_eq!(expr.to_string(), "2 ^ 3 ^ 2");

        let expr = parse("- 2d4").unwrap();
        assert_eq!(expr.to_string(), "-2d4");
    }

    proptest! {
        /// Printing an expression and parsing the result must reach a
        /// fixed point: the reparsed tree prints identically.
        #[test]
        fn test_print_parse_round_trip(expr in expr_strategy()) {
            let printed = expr.to_string();
            let reparsed = parse(&printed).unwrap();
            prop_assert_eq!(reparsed.to_string(), printed);
        }
    }
}
