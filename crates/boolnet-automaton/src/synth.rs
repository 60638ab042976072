//! Sum-of-Products rule synthesis from an observed truth table.
//!
//! For every entity the synthesizer emits one minterm per input state whose
//! next bit for that entity is 1, and ORs them together. No minimization is
//! attempted: the result reproduces the table exactly and reads back as the
//! table it came from.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::expr::Expr;
use crate::rule::{Rule, SharedRule};
use crate::rule_store::RuleStore;
use crate::state::State;
use crate::truth_table::TruthTable;

/// A possibly negated reference to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub entity: usize,
    pub name: String,
    pub positive: bool,
}

impl Literal {
    fn holds(&self, state: &State) -> bool {
        state.get(self.entity).unwrap_or(false) == self.positive
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            f.write_str(&self.name)
        } else {
            write!(f, "NOT {}", self.name)
        }
    }
}

/// A disjunction of conjunctions of literals.
///
/// An empty disjunction is the constant `0`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SumOfProducts {
    terms: Vec<Vec<Literal>>,
}

impl SumOfProducts {
    /// The AND-terms, in canonical input-state order.
    pub fn terms(&self) -> &[Vec<Literal>] {
        &self.terms
    }

    /// Check if this is the constant `0`.
    pub fn is_false(&self) -> bool {
        self.terms.is_empty()
    }

    /// Build the minterm for `state`.
    fn push_minterm(&mut self, state: &State, names: &[String]) {
        let term = state
            .bits()
            .iter()
            .zip(names)
            .enumerate()
            .map(|(entity, (&bit, name))| Literal {
                entity,
                name: name.clone(),
                positive: bit,
            })
            .collect();
        self.terms.push(term);
    }

    /// Equivalent expression tree.
    pub fn to_expr(&self) -> Expr {
        let products = self
            .terms
            .iter()
            .map(|term| {
                let literals: Vec<Expr> = term
                    .iter()
                    .map(|lit| {
                        if lit.positive {
                            Expr::Var(lit.entity)
                        } else {
                            Expr::Not(Box::new(Expr::Var(lit.entity)))
                        }
                    })
                    .collect();
                match literals.len() {
                    0 => Expr::Const(true),
                    1 => literals.into_iter().next().unwrap_or(Expr::Const(true)),
                    _ => Expr::And(literals),
                }
            })
            .collect::<Vec<_>>();
        match products.len() {
            0 => Expr::Const(false),
            1 => products.into_iter().next().unwrap_or(Expr::Const(false)),
            _ => Expr::Or(products),
        }
    }
}

impl fmt::Display for SumOfProducts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            if term.is_empty() {
                f.write_str("1")?;
            }
            for (j, literal) in term.iter().enumerate() {
                if j > 0 {
                    f.write_str(" AND ")?;
                }
                write!(f, "{literal}")?;
            }
        }
        Ok(())
    }
}

impl Rule for SumOfProducts {
    fn evaluate(&self, state: &State, _entity: usize) -> bool {
        self.terms
            .iter()
            .any(|term| term.iter().all(|lit| lit.holds(state)))
    }

    fn description(&self) -> &str {
        "Sum-of-Products synthesized from a truth table"
    }

    fn formula(&self, _names: &[String], _entity: usize) -> Option<String> {
        Some(self.to_string())
    }
}

/// Produce one Sum-of-Products formula per entity reproducing `table`.
///
/// Fails with [`NetworkError::LengthMismatch`] if any row's width differs
/// from `names.len()`, and with [`NetworkError::IncompleteTruthTable`] if any
/// of the `2^N` input states has no row.
pub fn synthesize(table: &TruthTable, names: &[String]) -> NetworkResult<Vec<SumOfProducts>> {
    table.validate(names.len())?;

    let mut formulas = vec![SumOfProducts::default(); names.len()];
    for (input, next) in table.iter() {
        for (entity, _) in next.iter().enumerate().filter(|&(_, &bit)| bit) {
            formulas[entity].push_minterm(input, names);
        }
    }

    debug!(
        entities = names.len(),
        minterms = formulas.iter().map(|f| f.terms.len()).sum::<usize>(),
        "rules_synthesized"
    );
    Ok(formulas)
}

/// Synthesize formulas and place them in a fully populated rule store.
pub fn synthesize_rules(table: &TruthTable, names: &[String]) -> NetworkResult<RuleStore> {
    let slots = synthesize(table, names)?
        .into_iter()
        .map(|sop| Some(Arc::new(sop) as SharedRule))
        .collect();
    Ok(RuleStore::from_slots(slots))
}

/// Render one `name' = formula` line per entity.
pub fn describe(formulas: &[SumOfProducts], names: &[String]) -> NetworkResult<Vec<String>> {
    if formulas.len() != names.len() {
        return Err(NetworkError::length_mismatch(
            "formula list",
            names.len(),
            formulas.len(),
        ));
    }
    Ok(names
        .iter()
        .zip(formulas)
        .map(|(name, sop)| format!("{name}' = {sop}"))
        .collect())
}
