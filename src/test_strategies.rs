//! Proptest strategies producing well-formed expression trees: literal
//! values are non-negative, function names come from the registry, and
//! custom dice always have at least one face.

use crate::ast::{
    AddOp, Base, Cmp, Dice, Die, DieOp, Expo, Expr, Func, MulOp, Negation, NumBase, Selector, Term,
};
use crate::NonEmpty;
use proptest::collection::vec;
use proptest::prelude::*;

fn add_op_strategy() -> impl Strategy<Value = AddOp> + Clone {
    prop_oneof![Just(AddOp::Add), Just(AddOp::Sub)]
}

fn mul_op_strategy() -> impl Strategy<Value = MulOp> + Clone {
    prop_oneof![Just(MulOp::Mul), Just(MulOp::Div)]
}

fn cmp_strategy() -> impl Strategy<Value = Cmp> + Clone {
    prop_oneof![Just(Cmp::Less), Just(Cmp::Equal), Just(Cmp::Greater)]
}

fn selector_strategy() -> impl Strategy<Value = Selector> + Clone {
    prop_oneof![
        (0..5i64).prop_map(Selector::Low),
        (0..5i64).prop_map(Selector::High),
        (cmp_strategy(), 1..7i64).prop_map(|(cmp, n)| Selector::Where(cmp, n)),
    ]
}

fn die_op_strategy() -> impl Strategy<Value = DieOp> + Clone {
    prop_oneof![
        (any::<bool>(), cmp_strategy(), 1..4i64)
            .prop_map(|(once, cmp, limit)| DieOp::Reroll { once, cmp, limit }),
        selector_strategy().prop_map(DieOp::Keep),
        selector_strategy().prop_map(DieOp::Drop),
    ]
}

fn die_strategy() -> impl Strategy<Value = Die> + Clone {
    prop_oneof![
        (1..=20i64).prop_map(|sides| Die::Faces(NumBase::Value(sides))),
        vec(-5..=20i64, 1..4)
            .prop_map(|faces| Die::Custom(NonEmpty::try_from_vec(faces).unwrap())),
    ]
}

fn atom_strategy() -> impl Strategy<Value = Base> + Clone {
    let simple_dice = (1..5i64, die_strategy(), vec(die_op_strategy(), 0..3)).prop_map(
        |(count, die, ops)| Dice {
            count: Base::Num(NumBase::Value(count)),
            die,
            ops,
        },
    );
    prop_oneof![
        (0..100i64).prop_map(|n| Base::Num(NumBase::Value(n))),
        simple_dice.prop_map(|dice| Base::Dice(Box::new(dice))),
    ]
}

pub(crate) fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = atom_strategy().prop_map(Expr::from);
    leaf.prop_recursive(3, 24, 4, |inner| {
        let base = prop_oneof![
            atom_strategy(),
            inner
                .clone()
                .prop_map(|e| Base::Num(NumBase::Paren(Box::new(e)))),
            // A pool whose count is itself a parenthesized expression.
            (inner, die_strategy(), vec(die_op_strategy(), 0..2)).prop_map(|(e, die, ops)| {
                Base::Dice(Box::new(Dice {
                    count: Base::Num(NumBase::Paren(Box::new(e))),
                    die,
                    ops,
                }))
            }),
        ];
        let negation = (any::<bool>(), base, proptest::option::of(0..4i64)).prop_map(
            |(negated, base, exponent)| Negation {
                negated,
                value: Expo {
                    base,
                    exponent: exponent.map(|e| {
                        Box::new(Expo {
                            base: Base::Num(NumBase::Value(e)),
                            exponent: None,
                        })
                    }),
                },
            },
        );
        let func = (
            prop_oneof![Just("id"), Just("abs"), Just("negate"), Just("fact")],
            negation,
        )
            .prop_map(|(name, arg)| Func {
                name: name.to_owned(),
                arg,
            });
        let term = (func.clone(), vec((mul_op_strategy(), func), 0..3))
            .prop_map(|(first, rest)| Term { first, rest });
        (term.clone(), vec((add_op_strategy(), term), 0..3))
            .prop_map(|(first, rest)| Expr { first, rest })
    })
}
