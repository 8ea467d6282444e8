use super::cursor::Cursor;
use super::ParseError;
use crate::ast::{
    AddOp, Base, Cmp, Dice, Die, DieOp, Expo, Expr, Func, MulOp, Negation, NumBase, Selector, Term,
};
use crate::functions;
use crate::{Int, NonEmpty};

type PResult<T> = Result<T, ParseError>;

/// Parses a dice expression.
///
/// # Examples
/// ```
/// let expr = dice_lang::parse("4d6kh3 + 2").unwrap();
/// assert_eq!(expr.to_string(), "4d6kh3 + 2");
/// ```
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    Parser::new(input).parse()
}

/// Recursive descent over [`Cursor`] with ordered alternatives: each
/// failed alternative restores the input position before the next one is
/// tried. No partial tree survives a failure.
struct Parser<'a> {
    cur: Cursor<'a>,
    deepest: Option<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            cur: Cursor::new(input),
            deepest: None,
        }
    }

    fn parse(mut self) -> Result<Expr, ParseError> {
        self.cur.skip_space();
        let expr = match self.expr() {
            Ok(expr) => expr,
            Err(err) => return Err(self.deepest.take().unwrap_or(err)),
        };
        self.cur.skip_space();
        if self.cur.at_end() {
            Ok(expr)
        } else {
            let err = self.error("end of input");
            Err(self.deepest.take().unwrap_or(err))
        }
    }

    fn error(&mut self, expected: &'static str) -> ParseError {
        let err = ParseError {
            position: self.cur.pos(),
            expected,
            found: self.cur.rest().chars().take(12).collect(),
        };
        let further = self
            .deepest
            .as_ref()
            .map_or(true, |d| err.position >= d.position);
        if further {
            self.deepest = Some(err.clone());
        }
        err
    }

    fn fail<T>(&mut self, expected: &'static str) -> PResult<T> {
        Err(self.error(expected))
    }

    fn expr(&mut self) -> PResult<Expr> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let save = self.cur.pos();
            self.cur.skip_space();
            let op = if self.cur.eat('+') {
                AddOp::Add
            } else if self.cur.eat('-') {
                AddOp::Sub
            } else {
                self.cur.restore(save);
                break;
            };
            self.cur.skip_space();
            rest.push((op, self.term()?));
        }
        Ok(Expr { first, rest })
    }

    fn term(&mut self) -> PResult<Term> {
        let first = self.func()?;
        let mut rest = Vec::new();
        loop {
            let save = self.cur.pos();
            self.cur.skip_space();
            let op = if self.cur.eat('*') {
                MulOp::Mul
            } else if self.cur.eat('/') {
                MulOp::Div
            } else {
                self.cur.restore(save);
                break;
            };
            self.cur.skip_space();
            rest.push((op, self.func()?));
        }
        Ok(Term { first, rest })
    }

    // A function name only counts when it is a known name followed by at
    // least one whitespace character; `absd6` never calls `abs`.
    fn func(&mut self) -> PResult<Func> {
        let save = self.cur.pos();
        if let Some(word) = self.cur.word() {
            if functions::lookup(word).is_some() && self.cur.skip_space1() {
                let arg = self.negation()?;
                return Ok(Func {
                    name: word.to_owned(),
                    arg,
                });
            }
            self.cur.restore(save);
        }
        let arg = self.negation()?;
        Ok(Func {
            name: "id".to_owned(),
            arg,
        })
    }

    fn negation(&mut self) -> PResult<Negation> {
        let negated = self.cur.eat('-');
        if negated {
            self.cur.skip_space();
        }
        let value = self.expo()?;
        Ok(Negation { negated, value })
    }

    fn expo(&mut self) -> PResult<Expo> {
        let base = self.base()?;
        let save = self.cur.pos();
        self.cur.skip_space();
        if self.cur.eat('^') {
            self.cur.skip_space();
            let exponent = self.expo()?;
            Ok(Expo {
                base,
                exponent: Some(Box::new(exponent)),
            })
        } else {
            self.cur.restore(save);
            Ok(Expo {
                base,
                exponent: None,
            })
        }
    }

    // `dice` first: `3d6` is one roll, while a bare `3` falls through to
    // the numeric alternative once no die tail shows up.
    fn base(&mut self) -> PResult<Base> {
        let save = self.cur.pos();
        if let Ok(dice) = self.dice() {
            return Ok(Base::Dice(Box::new(dice)));
        }
        self.cur.restore(save);
        self.nbase().map(Base::Num)
    }

    fn dice(&mut self) -> PResult<Dice> {
        let save = self.cur.pos();
        let count = match self.nbase() {
            Ok(nb) => Some(nb),
            Err(_) => {
                self.cur.restore(save);
                None
            }
        };
        let (die, ops) = self.die_tail()?;
        let count = count.map_or(Base::Num(NumBase::Value(1)), Base::Num);
        let mut dice = Dice { count, die, ops };

        // Consecutive dice fold left: the dice so far become the count
        // of the next die, as in `2d6d4`.
        loop {
            let save = self.cur.pos();
            match self.die_tail() {
                Ok((die, ops)) => {
                    dice = Dice {
                        count: Base::Dice(Box::new(dice)),
                        die,
                        ops,
                    };
                }
                Err(_) => {
                    self.cur.restore(save);
                    break;
                }
            }
        }
        Ok(dice)
    }

    fn die_tail(&mut self) -> PResult<(Die, Vec<DieOp>)> {
        let die = self.die()?;
        let ops = self.die_ops();
        Ok((die, ops))
    }

    fn die(&mut self) -> PResult<Die> {
        if !self.cur.eat('d') {
            return self.fail("die");
        }
        if self.cur.eat('{') {
            self.cur.skip_space();
            let mut faces = NonEmpty::new(self.integer()?);
            loop {
                let save = self.cur.pos();
                self.cur.skip_space();
                if !self.cur.eat(',') {
                    self.cur.restore(save);
                    break;
                }
                self.cur.skip_space();
                faces.push(self.integer()?);
            }
            self.cur.skip_space();
            if !self.cur.eat('}') {
                return self.fail("'}'");
            }
            Ok(Die::Custom(faces))
        } else {
            Ok(Die::Faces(self.nbase()?))
        }
    }

    fn die_ops(&mut self) -> Vec<DieOp> {
        let mut ops = Vec::new();
        loop {
            let save = self.cur.pos();
            match self.die_op() {
                Ok(op) => ops.push(op),
                Err(_) => {
                    self.cur.restore(save);
                    break;
                }
            }
        }
        ops
    }

    fn die_op(&mut self) -> PResult<DieOp> {
        if self.cur.eat('r') {
            let once = if self.cur.eat('o') {
                true
            } else if self.cur.eat('r') {
                false
            } else {
                return self.fail("die operator");
            };
            let cmp = self.cmp()?;
            let limit = self.integer()?;
            Ok(DieOp::Reroll { once, cmp, limit })
        } else if self.cur.eat('k') {
            Ok(DieOp::Keep(self.selector()?))
        } else if self.cur.eat('d') {
            Ok(DieOp::Drop(self.selector()?))
        } else {
            self.fail("die operator")
        }
    }

    fn selector(&mut self) -> PResult<Selector> {
        if self.cur.eat('h') {
            Ok(Selector::High(self.integer()?))
        } else if self.cur.eat('l') {
            Ok(Selector::Low(self.integer()?))
        } else if self.cur.eat('w') {
            let cmp = self.cmp()?;
            Ok(Selector::Where(cmp, self.integer()?))
        } else {
            self.fail("selector")
        }
    }

    fn cmp(&mut self) -> PResult<Cmp> {
        if self.cur.eat('<') {
            Ok(Cmp::Less)
        } else if self.cur.eat('=') {
            Ok(Cmp::Equal)
        } else if self.cur.eat('>') {
            Ok(Cmp::Greater)
        } else {
            self.fail("comparison")
        }
    }

    fn nbase(&mut self) -> PResult<NumBase> {
        let save = self.cur.pos();
        self.cur.skip_space();
        if self.cur.eat('(') {
            self.cur.skip_space();
            let expr = self.expr()?;
            self.cur.skip_space();
            if !self.cur.eat(')') {
                return self.fail("')'");
            }
            return Ok(NumBase::Paren(Box::new(expr)));
        }
        self.cur.restore(save);
        self.pos_integer().map(NumBase::Value)
    }

    fn pos_integer(&mut self) -> PResult<Int> {
        let start = self.cur.pos();
        match self.cur.digits() {
            None => self.fail("number"),
            Some(digits) => match digits.parse() {
                Ok(n) => Ok(n),
                Err(_) => {
                    self.cur.restore(start);
                    self.fail("integer within range")
                }
            },
        }
    }

    fn integer(&mut self) -> PResult<Int> {
        let start = self.cur.pos();
        self.cur.eat('-');
        if self.cur.digits().is_none() {
            self.cur.restore(start);
            return self.fail("integer");
        }
        match self.cur.slice_from(start).parse() {
            Ok(n) => Ok(n),
            Err(_) => {
                self.cur.restore(start);
                self.fail("integer within range")
            }
        }
    }
}
