//! Rule abstractions for entity updates.
//!
//! A rule computes one entity's next bit from the full current state. Rules
//! never see a partially updated state: the network hands every rule the
//! same snapshot for a given step.

use std::fmt;
use std::sync::Arc;

use crate::error::NetworkResult;
use crate::expr::Expr;
use crate::state::State;

/// Update capability for a single entity.
pub trait Rule: Send + Sync {
    /// Next value of entity `entity` given the full current state.
    fn evaluate(&self, state: &State, entity: usize) -> bool;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Symbolic form of this rule over `names`, if it has one.
    ///
    /// Rules without a formula (closures, for instance) return `None`; callers
    /// that need a symbolic form can synthesize one from the transition table.
    fn formula(&self, names: &[String], entity: usize) -> Option<String> {
        let _ = (names, entity);
        None
    }
}

/// Shared handle to a rule, as stored in rule slots.
pub type SharedRule = Arc<dyn Rule>;

/// A rule that holds the entity's current value.
///
/// This is what an unset rule slot means.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityRule;

impl Rule for IdentityRule {
    fn evaluate(&self, state: &State, entity: usize) -> bool {
        state.get(entity).unwrap_or(false)
    }

    fn description(&self) -> &str {
        "Identity rule that holds the current value"
    }

    fn formula(&self, names: &[String], entity: usize) -> Option<String> {
        names.get(entity).cloned()
    }
}

/// A rule that always produces the same bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantRule(pub bool);

impl Rule for ConstantRule {
    fn evaluate(&self, _state: &State, _entity: usize) -> bool {
        self.0
    }

    fn description(&self) -> &str {
        if self.0 {
            "Constant 1"
        } else {
            "Constant 0"
        }
    }

    fn formula(&self, _names: &[String], _entity: usize) -> Option<String> {
        Some(if self.0 { "1" } else { "0" }.to_string())
    }
}

type RuleFn = dyn Fn(&State, usize) -> bool + Send + Sync;

/// A rule backed by a closure.
pub struct FnRule {
    description: String,
    func: Box<RuleFn>,
}

impl FnRule {
    /// Wrap a closure as a rule.
    pub fn new<F>(description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&State, usize) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            func: Box::new(func),
        }
    }
}

impl Rule for FnRule {
    fn evaluate(&self, state: &State, entity: usize) -> bool {
        (self.func)(state, entity)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A rule defined by a Boolean formula.
#[derive(Debug, Clone)]
pub struct ExprRule {
    source: String,
    expr: Expr,
}

impl ExprRule {
    /// Parse `formula` against the entity names.
    pub fn parse<S: AsRef<str>>(formula: &str, names: &[S]) -> NetworkResult<Self> {
        let expr = Expr::parse(formula, names)?;
        Ok(Self {
            source: formula.trim().to_string(),
            expr,
        })
    }

    /// The parsed formula.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Rule for ExprRule {
    fn evaluate(&self, state: &State, _entity: usize) -> bool {
        self.expr.eval(state)
    }

    fn description(&self) -> &str {
        &self.source
    }

    fn formula(&self, names: &[String], _entity: usize) -> Option<String> {
        Some(self.expr.render(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: &str) -> State {
        s.parse().unwrap()
    }

    #[test]
    fn test_identity_rule_holds_value() {
        let rule = IdentityRule;
        let s = state("0110");
        for i in 0..4 {
            assert_eq!(rule.evaluate(&s, i), s[i]);
        }
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(rule.formula(&names, 1), Some("B".to_string()));
    }

    #[test]
    fn test_constant_rule() {
        assert!(ConstantRule(true).evaluate(&state("00"), 0));
        assert!(!ConstantRule(false).evaluate(&state("11"), 1));
        assert_eq!(ConstantRule(false).formula(&[], 0), Some("0".to_string()));
    }

    #[test]
    fn test_fn_rule_reads_full_state() {
        let rule = FnRule::new("xor of neighbours", |s, i| {
            let n = s.len();
            s[(i + n - 1) % n] ^ s[(i + 1) % n]
        });
        assert!(rule.evaluate(&state("100"), 1));
        assert!(!rule.evaluate(&state("101"), 1));
        assert_eq!(rule.description(), "xor of neighbours");
        assert_eq!(rule.formula(&[], 1), None);
    }

    #[test]
    fn test_expr_rule() {
        let names = vec!["A".to_string(), "B".to_string()];
        let rule = ExprRule::parse("A & !B", &names).unwrap();
        assert!(rule.evaluate(&state("10"), 0));
        assert!(!rule.evaluate(&state("11"), 0));
        assert_eq!(rule.description(), "A & !B");
        assert_eq!(rule.formula(&names, 0), Some("A AND NOT B".to_string()));
    }
}
