//! Built-in four-entity scenarios.

use boolnet_automaton::{RuleSet, RuleSetRegistry};

/// Preset used when no network is selected.
pub const DEFAULT_PRESET: &str = "poster";

const ABCD: [&str; 4] = ["A", "B", "C", "D"];

/// Registry holding every bundled scenario, in listing order.
pub fn registry() -> RuleSetRegistry {
    RuleSetRegistry::new()
        .with_rule_set(
            RuleSet::new("original", ABCD)
                .with_description("Shift with two gated inputs; everything decays to 0000")
                .with_formulas(["B", "C", "A AND D", "A AND NOT B"]),
        )
        .with_rule_set(
            RuleSet::new("feedback_loop", ABCD)
                .with_description("Ring shift A <- B <- C <- D <- A")
                .with_formulas(["B", "C", "D", "A"]),
        )
        .with_rule_set(
            RuleSet::new("majority_vote", ABCD)
                .with_description("Each entity takes the majority of the other three")
                .with_formulas([
                    "(B AND C) OR (B AND D) OR (C AND D)",
                    "(A AND C) OR (A AND D) OR (C AND D)",
                    "(A AND B) OR (A AND D) OR (B AND D)",
                    "(A AND B) OR (A AND C) OR (B AND C)",
                ]),
        )
        .with_rule_set(
            RuleSet::new("random", ABCD)
                .with_description("Hand-picked irregular rules with two fixed points")
                .with_formulas([
                    "(A AND NOT C) OR C",
                    "NOT C OR (C AND D)",
                    "B OR NOT D",
                    "A AND B",
                ]),
        )
        .with_rule_set(
            RuleSet::new("poster", ABCD)
                .with_description("Shift register closed by D' = A OR C")
                .with_formulas(["B", "C", "D", "A OR C"]),
        )
}

/// Print the registry.
pub fn list() {
    for set in registry().iter() {
        println!("{:<14} {}", set.name, set.description);
    }
}
