use super::error::EvalError;
use super::rng::DiceRng;
use super::EResult;
use crate::ast::{AddOp, Base, Dice, Die, DieOp, Expo, Expr, Func, MulOp, Negation, NumBase, Selector, Term};
use crate::functions;
use crate::{Int, NonEmpty, FACT_LIMIT, MAX_RNG};
use std::collections::HashSet;

/// The outcome of an evaluation: the numeric result, the annotated
/// trace, and the number of primitive random draws performed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Rolled {
    pub value: Int,
    pub trace: String,
    pub rolls: Int,
}

struct Outcome {
    value: Int,
    trace: String,
}

/// The evaluation context: the RNG plus the running draw count checked
/// against the budget. One context evaluates one expression at a time;
/// the draw count resets on each call to [`eval`](Self::eval).
pub struct Evaluator<R> {
    rng: R,
    max_draws: Int,
    draws: Int,
}

impl<R: DiceRng> Evaluator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_budget(rng, MAX_RNG)
    }

    pub fn with_budget(rng: R, max_draws: Int) -> Self {
        Self {
            rng,
            max_draws,
            draws: 0,
        }
    }

    pub fn eval(&mut self, expr: &Expr) -> EResult<Rolled> {
        self.draws = 0;
        let out = self.eval_expr(expr)?;
        Ok(Rolled {
            value: out.value,
            trace: out.trace,
            rolls: self.draws,
        })
    }

    fn count_draw(&mut self) -> EResult<()> {
        self.draws += 1;
        if self.draws > self.max_draws {
            Err(EvalError::RngBudgetExceeded {
                limit: self.max_draws,
                observed: self.draws,
            })
        } else {
            Ok(())
        }
    }

    // Chains evaluate left to right: `10 - 3 + 2` is `(10 - 3) + 2`.
    fn eval_expr(&mut self, expr: &Expr) -> EResult<Outcome> {
        let mut acc = self.eval_term(&expr.first)?;
        for (op, term) in &expr.rest {
            let rhs = self.eval_term(term)?;
            acc.value = match op {
                AddOp::Add => acc.value.saturating_add(rhs.value),
                AddOp::Sub => acc.value.saturating_sub(rhs.value),
            };
            acc.trace.push_str(&format!(" {} {}", op, rhs.trace));
        }
        Ok(acc)
    }

    fn eval_term(&mut self, term: &Term) -> EResult<Outcome> {
        let mut acc = self.eval_func(&term.first)?;
        for (op, func) in &term.rest {
            let rhs = self.eval_func(func)?;
            acc.value = match op {
                MulOp::Mul => acc.value.saturating_mul(rhs.value),
                MulOp::Div => {
                    if rhs.value == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    acc.value.checked_div(rhs.value).unwrap_or(Int::MAX)
                }
            };
            acc.trace.push_str(&format!(" {} {}", op, rhs.trace));
        }
        Ok(acc)
    }

    fn eval_func(&mut self, func: &Func) -> EResult<Outcome> {
        let arg = self.eval_negation(&func.arg)?;
        let f = functions::lookup(&func.name)
            .ok_or_else(|| EvalError::UnknownFunction(func.name.clone()))?;
        if f.name() == "fact" && arg.value > FACT_LIMIT {
            return Err(EvalError::FactorialInputTooLarge {
                input: arg.value,
                limit: FACT_LIMIT,
            });
        }
        let value = f.apply(arg.value);
        let trace = if f.name() == "id" {
            arg.trace
        } else {
            format!("{} {}", f.name(), arg.trace)
        };
        Ok(Outcome { value, trace })
    }

    fn eval_negation(&mut self, neg: &Negation) -> EResult<Outcome> {
        let mut out = self.eval_expo(&neg.value)?;
        if neg.negated {
            out.value = out.value.saturating_neg();
            out.trace.insert(0, '-');
        }
        Ok(out)
    }

    fn eval_expo(&mut self, expo: &Expo) -> EResult<Outcome> {
        let base = self.eval_base(&expo.base)?;
        let exponent = match &expo.exponent {
            None => return Ok(base),
            Some(exponent) => self.eval_expo(exponent)?,
        };
        if exponent.value < 0 {
            return Err(EvalError::NegativeExponent);
        }
        let value = match u32::try_from(exponent.value) {
            Ok(e) => base.value.saturating_pow(e),
            // Exponents past u32 saturate unless the base is in -1..=1.
            Err(_) => match base.value {
                0 => 0,
                1 => 1,
                -1 if exponent.value % 2 == 0 => 1,
                -1 => -1,
                b if b > 1 => Int::MAX,
                _ if exponent.value % 2 == 0 => Int::MAX,
                _ => Int::MIN,
            },
        };
        Ok(Outcome {
            value,
            trace: format!("{} ^ {}", base.trace, exponent.trace),
        })
    }

    fn eval_base(&mut self, base: &Base) -> EResult<Outcome> {
        match base {
            Base::Num(nb) => self.eval_numbase(nb),
            Base::Dice(dice) => self.eval_dice(dice),
        }
    }

    fn eval_numbase(&mut self, nb: &NumBase) -> EResult<Outcome> {
        match nb {
            NumBase::Value(n) => Ok(Outcome {
                value: *n,
                trace: n.to_string(),
            }),
            NumBase::Paren(expr) => {
                let inner = self.eval_expr(expr)?;
                Ok(Outcome {
                    value: inner.value,
                    trace: format!("({})", inner.trace),
                })
            }
        }
    }

    fn eval_dice(&mut self, dice: &Dice) -> EResult<Outcome> {
        let n = self.eval_base(&dice.count)?.value;
        if n >= self.max_draws {
            return Err(EvalError::RngBudgetExceeded {
                limit: self.max_draws,
                observed: n,
            });
        }
        if n < 0 {
            return Err(EvalError::NegativeDiceCount(n));
        }

        let die = self.condense(&dice.die)?;
        let mut rolls = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let value = self.roll_die(&die)?;
            rolls.push(RollState {
                history: NonEmpty::new(value),
                kept: true,
            });
        }
        for op in &dice.ops {
            self.apply_op(op, &die, &mut rolls)?;
        }

        // Final display order loses the roll order: dice sort by value,
        // dropped before kept on ties.
        rolls.sort_by_key(|roll| (roll.value(), roll.kept));
        let value = rolls
            .iter()
            .filter(|roll| roll.kept)
            .map(RollState::value)
            .fold(0, Int::saturating_add);
        let trace = format!("{} [{}]", dice, render_rolls(&rolls, &die)?);
        Ok(Outcome { value, trace })
    }

    /// Pre-evaluates the die's bound so every roll of the pool shares
    /// the same concrete range, even when the bound expression itself
    /// rolled dice.
    fn condense(&mut self, die: &Die) -> EResult<CondensedDie> {
        match die {
            Die::Faces(bound) => {
                let out = self.eval_numbase(bound)?;
                if out.value < 1 {
                    return Err(EvalError::InvalidDieBound {
                        base: bound.to_string(),
                        bound: out.value,
                    });
                }
                Ok(CondensedDie::Faces(out.value))
            }
            Die::Custom(faces) => Ok(CondensedDie::Custom(faces.clone())),
        }
    }

    fn roll_die(&mut self, die: &CondensedDie) -> EResult<Int> {
        self.count_draw()?;
        Ok(match die {
            CondensedDie::Faces(sides) => self.rng.uniform_inclusive(1, *sides),
            CondensedDie::Custom(faces) => self.rng.choose_one(faces.as_slice()),
        })
    }

    fn apply_op(
        &mut self,
        op: &DieOp,
        die: &CondensedDie,
        rolls: &mut [RollState],
    ) -> EResult<()> {
        match op {
            // Dropped dice are never rerolled.
            DieOp::Reroll { once, cmp, limit } => {
                for roll in rolls.iter_mut() {
                    if !roll.kept {
                        continue;
                    }
                    while cmp.matches(roll.value(), *limit) {
                        roll.history.push(self.roll_die(die)?);
                        if *once {
                            break;
                        }
                    }
                }
            }
            DieOp::Keep(Selector::Where(cmp, limit)) => {
                for roll in rolls.iter_mut() {
                    roll.kept = roll.kept && cmp.matches(roll.value(), *limit);
                }
            }
            DieOp::Drop(Selector::Where(cmp, limit)) => {
                for roll in rolls.iter_mut() {
                    roll.kept = roll.kept && !cmp.matches(roll.value(), *limit);
                }
            }
            DieOp::Keep(sel) => {
                let selected = ranked_selection(rolls, sel);
                for (i, roll) in rolls.iter_mut().enumerate() {
                    if roll.kept && !selected.contains(&i) {
                        roll.kept = false;
                    }
                }
            }
            DieOp::Drop(sel) => {
                let selected = ranked_selection(rolls, sel);
                for (i, roll) in rolls.iter_mut().enumerate() {
                    if selected.contains(&i) {
                        roll.kept = false;
                    }
                }
            }
        }
        Ok(())
    }
}

/// One die of a pool: its reroll history (most recent value last) and
/// whether it still counts toward the sum.
struct RollState {
    history: NonEmpty<Int>,
    kept: bool,
}

impl RollState {
    fn value(&self) -> Int {
        *self.history.last()
    }
}

enum CondensedDie {
    Faces(Int),
    Custom(NonEmpty<Int>),
}

impl CondensedDie {
    /// The (low, high) critical pair used for bold highlighting.
    fn critical(&self) -> (Int, Int) {
        match self {
            Self::Faces(sides) => (1, *sides),
            Self::Custom(faces) => {
                let first = *faces.first();
                faces
                    .iter()
                    .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)))
            }
        }
    }
}

/// Indices of the `n` lowest or highest currently-kept dice. Already
/// dropped dice are not candidates; `n` past the kept count selects
/// them all.
fn ranked_selection(rolls: &[RollState], sel: &Selector) -> HashSet<usize> {
    let mut kept: Vec<usize> = (0..rolls.len()).filter(|&i| rolls[i].kept).collect();
    let n = match sel {
        Selector::Low(n) => {
            kept.sort_by_key(|&i| rolls[i].value());
            *n
        }
        Selector::High(n) => {
            kept.sort_by_key(|&i| std::cmp::Reverse(rolls[i].value()));
            *n
        }
        Selector::Where(..) => unreachable!("where-selectors do not rank"),
    };
    kept.truncate(usize::try_from(n).unwrap_or(0));
    kept.into_iter().collect()
}

fn render_rolls(rolls: &[RollState], die: &CondensedDie) -> EResult<String> {
    if rolls.is_empty() {
        return Err(EvalError::EmptyResultSet);
    }
    let (lo, hi) = die.critical();
    let mut tokens = Vec::new();
    for roll in rolls {
        let last = roll.history.len() - 1;
        for (i, &value) in roll.history.iter().enumerate() {
            let mut token = if value == lo || value == hi {
                format!("**{}**", value)
            } else {
                value.to_string()
            };
            if i < last {
                token = format!("~~{}~~", token);
            } else if !roll.kept {
                token = format!("~~__{}__~~", token);
            }
            tokens.push(token);
        }
    }
    Ok(tokens.join(", "))
}
