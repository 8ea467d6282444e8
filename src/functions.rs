use crate::{Int, FACT_LIMIT};

/// A named unary integer function usable in expressions, e.g. `abs 1d6`.
///
/// The registry is fixed; the parser only admits names that appear here.
#[derive(Debug, Copy, Clone)]
pub struct DiceFunction {
    name: &'static str,
    apply: fn(Int) -> Int,
}

impl DiceFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, x: Int) -> Int {
        (self.apply)(x)
    }
}

const REGISTRY: &[DiceFunction] = &[
    DiceFunction {
        name: "abs",
        apply: abs,
    },
    DiceFunction {
        name: "id",
        apply: id,
    },
    DiceFunction {
        name: "fact",
        apply: fact,
    },
    DiceFunction {
        name: "negate",
        apply: negate,
    },
];

const NAMES: [&str; 4] = ["abs", "id", "fact", "negate"];

/// The function names accepted by the parser, in registry order.
pub fn supported_functions() -> &'static [&'static str] {
    &NAMES
}

pub fn lookup(name: &str) -> Option<&'static DiceFunction> {
    REGISTRY.iter().find(|f| f.name == name)
}

fn id(x: Int) -> Int {
    x
}

fn negate(x: Int) -> Int {
    x.saturating_neg()
}

fn abs(x: Int) -> Int {
    x.saturating_abs()
}

// Total on all inputs: negatives collapse to 0, and inputs past
// FACT_LIMIT behave as fact(FACT_LIMIT). The evaluator rejects inputs
// above the limit before ever calling this; the clamp is a floor for
// direct callers.
fn fact(x: Int) -> Int {
    if x < 0 {
        return 0;
    }
    (2..=x.min(FACT_LIMIT)).fold(1, Int::saturating_mul)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let names: Vec<_> = REGISTRY.iter().map(|f| f.name()).collect();
        assert_eq!(names, supported_functions());
        assert_eq!(supported_functions(), ["abs", "id", "fact", "negate"]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("fact").unwrap().name(), "fact");
        assert!(lookup("sqrt").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_apply() {
        assert_eq!(lookup("id").unwrap().apply(-3), -3);
        assert_eq!(lookup("negate").unwrap().apply(7), -7);
        assert_eq!(lookup("abs").unwrap().apply(-7), 7);
        assert_eq!(lookup("abs").unwrap().apply(7), 7);
    }

    #[test]
    fn test_fact() {
        let fact = lookup("fact").unwrap();
        assert_eq!(fact.apply(-5), 0);
        assert_eq!(fact.apply(0), 1);
        assert_eq!(fact.apply(1), 1);
        assert_eq!(fact.apply(5), 120);
        assert_eq!(fact.apply(20), 2_432_902_008_176_640_000);
        // 21! overflows i64 and saturates.
        assert_eq!(fact.apply(21), Int::MAX);
        // Inputs past the limit clamp to fact(FACT_LIMIT).
        assert_eq!(fact.apply(FACT_LIMIT + 1), fact.apply(FACT_LIMIT));
        assert_eq!(fact.apply(Int::MAX), fact.apply(FACT_LIMIT));
    }
}
