use std::str::FromStr;

use thiserror::Error;

use crate::world::{Attributes, Conditions};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredicateError {
    #[error("empty predicate")]
    Empty,
    #[error("unknown operator '{0}'")]
    InvalidOperator(char),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Less,
    Greater,
}

/// `=5`, `<2.5`, `>0`: one operator character followed by a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Predicate {
    pub comparison: Comparison,
    pub threshold: f64,
}

/// Split `"<op><number>"` into its operator and value.
pub(crate) fn split_operator(raw: &str) -> Result<(char, f64), PredicateError> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let op = chars.next().ok_or(PredicateError::Empty)?;
    let rest = chars.as_str().trim();
    let value = rest
        .parse::<f64>()
        .map_err(|_| PredicateError::InvalidNumber(rest.to_string()))?;
    Ok((op, value))
}

impl FromStr for Predicate {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, threshold) = split_operator(s)?;
        let comparison = match op {
            '=' => Comparison::Equal,
            '<' => Comparison::Less,
            '>' => Comparison::Greater,
            other => return Err(PredicateError::InvalidOperator(other)),
        };
        Ok(Predicate {
            comparison,
            threshold,
        })
    }
}

impl Predicate {
    /// A missing attribute satisfies `<` and nothing else.
    pub fn holds(&self, value: Option<f64>) -> bool {
        match (self.comparison, value) {
            (Comparison::Equal, Some(v)) => v == self.threshold,
            (Comparison::Less, Some(v)) => v < self.threshold,
            (Comparison::Less, None) => true,
            (Comparison::Greater, Some(v)) => v > self.threshold,
            (_, None) => false,
        }
    }
}

/// True when every condition holds against `attributes`. Unparseable
/// predicates count as false.
pub fn conditions_met(conditions: &Conditions, attributes: &Attributes) -> bool {
    conditions.iter().all(|(attribute, raw)| match raw.parse::<Predicate>() {
        Ok(predicate) => predicate.holds(attributes.get(attribute).copied()),
        Err(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn conds(pairs: &[(&str, &str)]) -> Conditions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn attrs(pairs: &[(&str, f64)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn absence_satisfies_less_than_only() {
        let empty = Attributes::new();
        assert!(conditions_met(&conds(&[("hp", "<5")]), &empty));
        assert!(!conditions_met(&conds(&[("hp", ">5")]), &empty));
        assert!(!conditions_met(&conds(&[("hp", "=5")]), &empty));
    }

    #[test]
    fn present_attribute_compares_numerically() {
        let a = attrs(&[("gold", 10.0)]);
        assert!(conditions_met(&conds(&[("gold", "=10")]), &a));
        assert!(conditions_met(&conds(&[("gold", "=10.0")]), &a));
        assert!(conditions_met(&conds(&[("gold", ">9.5")]), &a));
        assert!(!conditions_met(&conds(&[("gold", ">10")]), &a));
        assert!(!conditions_met(&conds(&[("gold", "<10")]), &a));
    }

    #[test]
    fn zero_is_a_present_value() {
        let a = attrs(&[("key", 0.0)]);
        assert!(conditions_met(&conds(&[("key", "=0")]), &a));
        assert!(conditions_met(&conds(&[("key", "<1")]), &a));
    }

    #[test]
    fn entries_are_anded() {
        let a = attrs(&[("gold", 3.0), ("hp", 7.0)]);
        assert!(conditions_met(&conds(&[("gold", "=3"), ("hp", ">5")]), &a));
        assert!(!conditions_met(&conds(&[("gold", "=3"), ("hp", "<5")]), &a));
    }

    #[test]
    fn unknown_operator_is_false() {
        let a = attrs(&[("gold", 3.0)]);
        assert!(!conditions_met(&conds(&[("gold", "!3")]), &a));
        assert!(!conditions_met(&conds(&[("gold", "")]), &a));
        assert_eq!(
            "~4".parse::<Predicate>(),
            Err(PredicateError::InvalidOperator('~'))
        );
        assert!(matches!(
            "=abc".parse::<Predicate>(),
            Err(PredicateError::InvalidNumber(_))
        ));
    }

    proptest! {
        #[test]
        fn empty_conditions_always_hold(values in proptest::collection::hash_map("[a-z]{1,6}", -1e6f64..1e6, 0..8)) {
            prop_assert!(conditions_met(&Conditions::new(), &values));
        }

        #[test]
        fn evaluation_is_repeatable(value in -100.0f64..100.0, threshold in -100i32..100) {
            let predicate = format!(">{threshold}");
            let c = conds(&[("x", predicate.as_str())]);
            let a = attrs(&[("x", value)]);
            let first = conditions_met(&c, &a);
            prop_assert_eq!(first, conditions_met(&c, &a));
            prop_assert_eq!(first, value > threshold as f64);
        }
    }
}
