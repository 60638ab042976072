//! Integration tests for boolnet-automaton on the bundled four-entity
//! scenarios and on randomly generated transition tables.

use std::collections::BTreeSet;
use std::sync::Arc;

use boolnet_automaton::{
    canonical_rotation, describe, synthesize, AnalysisConfig, Attractor, AttractorDetector,
    BooleanNetwork, FnRule, NetworkError, NetworkRecord, NetworkStore, RuleSet, RuleSetRegistry,
    State, TransitionTable, TruthTable, WiringDiagram,
};
use proptest::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Scenario Builders
// ============================================================================

const ABCD: [&str; 4] = ["A", "B", "C", "D"];

fn scenarios() -> RuleSetRegistry {
    RuleSetRegistry::new()
        .with_rule_set(
            RuleSet::new("original", ABCD).with_formulas(["B", "C", "A AND D", "A AND NOT B"]),
        )
        .with_rule_set(RuleSet::new("feedback_loop", ABCD).with_formulas(["B", "C", "D", "A"]))
        .with_rule_set(RuleSet::new("majority_vote", ABCD).with_formulas([
            "B AND C OR B AND D OR C AND D",
            "A AND C OR A AND D OR C AND D",
            "A AND B OR A AND D OR B AND D",
            "A AND B OR A AND C OR B AND C",
        ]))
        .with_rule_set(RuleSet::new("random", ABCD).with_formulas([
            "(A AND NOT C) OR C",
            "NOT C OR (C AND D)",
            "B OR NOT D",
            "A AND B",
        ]))
        .with_rule_set(
            RuleSet::new("poster", ABCD).with_formulas(["B", "C", "D", "A OR C"]),
        )
}

fn build(name: &str) -> BooleanNetwork {
    scenarios()
        .get(name)
        .unwrap()
        .build(AnalysisConfig::default())
        .unwrap()
}

fn rendered(attractors: &[Attractor]) -> Vec<String> {
    attractors.iter().map(ToString::to_string).collect()
}

fn state(s: &str) -> State {
    s.parse().unwrap()
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_poster_attractors_and_basins() {
    let net = build("poster");
    let analysis = net.attractors().unwrap();

    assert_eq!(
        rendered(analysis.attractors()),
        vec!["0000", "0101 → 1010", "1111"]
    );
    assert_eq!(analysis.basin_sizes(), vec![1, 6, 9]);

    // 1000 -> 0001 -> 0010 -> 0101 <-> 1010
    let orbit = analysis.attractor_of(&state("1000")).unwrap();
    assert!(orbit.contains(&state("0101")));
    assert_eq!(net.get_next_state(&state("1000")).unwrap(), state("0001"));
}

#[test]
fn test_original_scenario_collapses_to_zero() {
    let analysis = build("original").attractors().unwrap();
    assert_eq!(rendered(analysis.attractors()), vec!["0000"]);
    assert_eq!(analysis.basin_sizes(), vec![16]);
}

#[test]
fn test_feedback_loop_is_a_rotation() {
    let analysis = build("feedback_loop").attractors().unwrap();
    let periods: Vec<usize> = analysis.attractors().iter().map(Attractor::period).collect();
    assert_eq!(periods, vec![1, 4, 4, 2, 4, 1]);
    assert_eq!(analysis.basin_sizes(), vec![1, 4, 4, 2, 4, 1]);
    assert_eq!(
        analysis.attractors()[1].to_string(),
        "0001 → 0010 → 0100 → 1000"
    );
}

#[test]
fn test_majority_vote() {
    let analysis = build("majority_vote").attractors().unwrap();
    assert_eq!(
        rendered(analysis.attractors()),
        vec!["0000", "0011 → 1100", "0101 → 1010", "0110 → 1001", "1111"]
    );
    assert_eq!(analysis.basin_sizes(), vec![5, 2, 2, 2, 5]);
}

#[test]
fn test_random_scenario() {
    let analysis = build("random").attractors().unwrap();
    assert_eq!(rendered(analysis.attractors()), vec!["1010", "1111"]);
    assert_eq!(analysis.basin_sizes(), vec![7, 9]);
    assert_eq!(analysis.fixed_points().count(), 2);
}

#[test]
fn test_parallel_scan_matches_sequential_as_a_set() {
    let registry = scenarios();
    for name in registry.names() {
        let net = build(name);
        let sequential = AttractorDetector::new()
            .detect(net.get_state_transition())
            .unwrap();
        let parallel = AttractorDetector::with_config(AnalysisConfig {
            parallel: true,
            workers: 3,
            ..AnalysisConfig::default()
        })
        .detect(net.get_state_transition())
        .unwrap();

        let mut sorted = sequential.clone();
        sorted.sort();
        assert_eq!(sorted, parallel, "scenario {name}");
    }
}

#[test]
fn test_identity_network_has_every_state_fixed() {
    let net = BooleanNetwork::identity(BooleanNetwork::default_names(3)).unwrap();
    let analysis = net.attractors().unwrap();
    assert_eq!(analysis.attractors().len(), 8);
    assert!(analysis.attractors().iter().all(Attractor::is_fixed_point));
}

#[test]
fn test_mutation_invalidates_cached_transitions() {
    let mut net = build("poster");
    assert_eq!(net.attractors().unwrap().attractors().len(), 3);

    net.set_formula(3, "A AND C").unwrap();
    assert_eq!(
        net.get_next_state(&state("1000")).unwrap(),
        state("0000")
    );

    net.set_rule(0, Arc::new(FnRule::new("always on", |_, _| true)))
        .unwrap();
    let analysis = net.attractors().unwrap();
    assert!(analysis
        .attractors()
        .iter()
        .all(|a| a.states().iter().all(|s| s[0])));
}

#[test]
fn test_rule_index_out_of_range() {
    let mut net = build("poster");
    assert!(matches!(
        net.set_formula(4, "A"),
        Err(NetworkError::IndexOutOfRange { len: 4, .. })
    ));
    assert!(matches!(
        net.set_formula(-1i64, "A"),
        Err(NetworkError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_entity_ceiling() {
    let config = AnalysisConfig {
        max_entities: 3,
        ..AnalysisConfig::default()
    };
    let err = scenarios().get("poster").unwrap().build(config).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::TooManyEntities { entities: 4, limit: 3 }
    ));
}

// ============================================================================
// Synthesis and Wiring
// ============================================================================

#[test]
fn test_poster_synthesis_reproduces_table() {
    let net = build("poster");
    let table = net.get_state_transition().to_truth_table();
    let formulas = synthesize(&table, net.entity_names()).unwrap();

    let lines = describe(&formulas, net.entity_names()).unwrap();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("A' = "));

    let names = net.entity_names().to_vec();
    let rebuilt =
        BooleanNetwork::from_truth_table(names, &table, AnalysisConfig::default()).unwrap();
    assert_eq!(rebuilt.get_state_transition(), net.get_state_transition());
    assert_eq!(rebuilt.attractors().unwrap(), net.attractors().unwrap());
}

#[test]
fn test_incomplete_table_is_rejected() {
    let mut table = build("poster").get_state_transition().to_truth_table();
    table.remove(&state("0110"));
    let err = synthesize(&table, &ABCD.map(String::from)).unwrap_err();
    assert!(matches!(err, NetworkError::IncompleteTruthTable { .. }));
}

#[test]
fn test_poster_wiring() {
    let net = build("poster");
    let wiring = WiringDiagram::analyze(net.get_state_transition()).unwrap();
    assert_eq!(
        wiring.edges(false),
        vec![(1, 0), (2, 1), (3, 2), (0, 3), (2, 3)]
    );
    assert_eq!(
        wiring.regulators(3).unwrap(),
        &BTreeSet::from([0, 2])
    );
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_store_round_trip() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = NetworkStore::new(temp_dir.path());

    let net = build("majority_vote");
    net.save_to(&store, "majority_vote", "v1")?;

    let loaded =
        BooleanNetwork::load_from(&store, "majority_vote", "v1", AnalysisConfig::default())?;
    assert_eq!(loaded.attractors()?, net.attractors()?);
    assert_eq!(loaded.formulas()?, net.formulas()?);
    Ok(())
}

#[test]
fn test_csv_import_to_attractors() {
    let temp_dir = TempDir::new().unwrap();
    let store = NetworkStore::new(temp_dir.path());

    let mut csv = String::from("A,B,C,D,A',B',C',D'\n");
    for (current, next) in build("poster").get_state_transition().iter() {
        let cells: Vec<String> = current
            .bits()
            .iter()
            .chain(next.bits())
            .map(|&b| u8::from(b).to_string())
            .collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    let path = temp_dir.path().join("poster.csv");
    std::fs::write(&path, csv).unwrap();

    let (entities, table) = store.import_csv(&path).unwrap();
    assert_eq!(entities, ABCD.map(String::from).to_vec());

    let record = NetworkRecord::from_truth_table(entities, table);
    store.save("imported", "observed", &record).unwrap();
    let net = store
        .load("imported", "observed")
        .unwrap()
        .into_network(AnalysisConfig::default())
        .unwrap();
    assert_eq!(net.attractors().unwrap().basin_sizes(), vec![1, 6, 9]);
}

#[test]
fn test_flipped_entry_changes_attractors() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = NetworkStore::new(temp_dir.path());

    // 0000 now steps to 1000 and drains into the 2-cycle.
    let mutated = build("poster").with_flipped_entry(&state("0000"), 0)?;
    mutated.save_to(&store, "poster", "flipped")?;

    let loaded =
        BooleanNetwork::load_from(&store, "poster", "flipped", AnalysisConfig::default())?;
    let analysis = loaded.attractors()?;
    assert_eq!(rendered(analysis.attractors()), vec!["0101 → 1010", "1111"]);
    assert_eq!(analysis.basin_sizes(), vec![7, 9]);
    Ok(())
}

#[test]
fn test_entity_names_survive_the_store_only_if_unambiguous() {
    let temp_dir = TempDir::new().unwrap();
    let store = NetworkStore::new(temp_dir.path());
    let path = temp_dir.path().join("genes.csv");

    for (header, accepted) in [
        ("gene_a,gene_b,gene_a',gene_b'", true),
        ("gene-a,gene-b,gene-a',gene-b'", false),
        ("gene a,gene b,gene a',gene b'", false),
        ("A,A,A',A'", false),
        ("and,B,and',B'", false),
    ] {
        let rows = "0,0,0,0\n0,1,1,0\n1,0,0,1\n1,1,1,1\n";
        std::fs::write(&path, format!("{header}\n{rows}")).unwrap();
        let (entities, table) = store.import_csv(&path).unwrap();
        let built = BooleanNetwork::from_truth_table(entities, &table, AnalysisConfig::default());

        match built {
            Ok(net) => {
                assert!(accepted, "{header}");
                net.save_to(&store, "genes", "v1").unwrap();
                let loaded =
                    BooleanNetwork::load_from(&store, "genes", "v1", AnalysisConfig::default())
                        .unwrap();
                assert_eq!(loaded.get_state_transition(), net.get_state_transition());
            }
            Err(err) => {
                assert!(!accepted, "{header}: {err}");
                assert!(matches!(err, NetworkError::InvalidEntityName { .. }));
            }
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

/// A random successor table over 1 to 4 entities.
fn arb_table() -> impl Strategy<Value = TransitionTable> {
    (1usize..=4).prop_flat_map(|n| {
        let states = 1usize << n;
        prop::collection::vec(0..states, states)
            .prop_map(move |successors| TransitionTable::from_successors(n, successors).unwrap())
    })
}

proptest! {
    /// Every state belongs to exactly one basin and every attractor is closed
    /// under the transition function.
    #[test]
    fn attractors_cover_the_state_space(table in arb_table()) {
        let analysis = AttractorDetector::new().analyze(&table).unwrap();
        prop_assert_eq!(analysis.basin_sizes().iter().sum::<usize>(), table.len());

        for attractor in analysis.attractors() {
            for s in attractor.states() {
                let next = table.get(s).unwrap();
                prop_assert!(attractor.contains(&next));
            }
        }

        let unique: BTreeSet<&Attractor> = analysis.attractors().iter().collect();
        prop_assert_eq!(unique.len(), analysis.attractors().len());
    }

    /// Repeated scans return the same attractors in the same order.
    #[test]
    fn detection_is_deterministic(table in arb_table()) {
        let detector = AttractorDetector::new();
        prop_assert_eq!(detector.detect(&table).unwrap(), detector.detect(&table).unwrap());
    }

    /// Synthesized rules reproduce the table they came from.
    #[test]
    fn synthesis_round_trips(table in arb_table()) {
        let names = BooleanNetwork::default_names(table.len().trailing_zeros() as usize);
        let truth: TruthTable = table.to_truth_table();
        let net =
            BooleanNetwork::from_truth_table(names, &truth, AnalysisConfig::default()).unwrap();
        prop_assert_eq!(net.get_state_transition(), &table);
    }

    /// Every rotation of a cycle canonicalizes to the same sequence.
    #[test]
    fn canonical_rotation_ignores_entry_point(
        cycle in prop::collection::vec(0usize..16, 1..8),
        shift in 0usize..8,
    ) {
        let states: Vec<State> = cycle.iter().map(|&i| State::from_index(4, i)).collect();
        let mut rotated = states.clone();
        rotated.rotate_left(shift % states.len());
        prop_assert_eq!(canonical_rotation(states), canonical_rotation(rotated));
    }
}
