//! Observed state → next-state mappings and the tabular import format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::state::{State, StateSpace};

/// Mapping from input state to the observed next-state bit vector.
///
/// Serializes as a JSON object keyed by state strings with `0`/`1` lists as
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<State, Vec<u8>>", into = "BTreeMap<State, Vec<u8>>")]
pub struct TruthTable {
    rows: BTreeMap<State, Vec<bool>>,
}

impl TruthTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the row for `input`.
    pub fn insert(&mut self, input: State, next: Vec<bool>) -> Option<Vec<bool>> {
        self.rows.insert(input, next)
    }

    /// Remove the row for `input`.
    pub fn remove(&mut self, input: &State) -> Option<Vec<bool>> {
        self.rows.remove(input)
    }

    /// Observed next bits for `input`.
    pub fn get(&self, input: &State) -> Option<&[bool]> {
        self.rows.get(input).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Invert the next-state bit of `entity` in the row for `input` and
    /// return its new value.
    pub fn flip(&mut self, input: &State, entity: usize) -> NetworkResult<bool> {
        let Some(next) = self.rows.get_mut(input) else {
            return Err(NetworkError::InvalidState {
                input: input.to_string(),
                message: "no row for this state".to_string(),
            });
        };
        let len = next.len();
        let bit = next.get_mut(entity).ok_or(NetworkError::IndexOutOfRange {
            index: entity.to_string(),
            len,
        })?;
        *bit = !*bit;
        debug!(state = %input, entity, value = *bit, "truth_table_entry_flipped");
        Ok(*bit)
    }

    /// Rows in canonical state order.
    pub fn iter(&self) -> impl Iterator<Item = (&State, &[bool])> {
        self.rows.iter().map(|(s, n)| (s, n.as_slice()))
    }

    /// Check that every row has `width` input and output bits and that every
    /// state of `{0,1}^width` has a row.
    pub fn validate(&self, width: usize) -> NetworkResult<()> {
        for (input, next) in &self.rows {
            if input.len() != width {
                return Err(NetworkError::length_mismatch(
                    "truth table input state",
                    width,
                    input.len(),
                ));
            }
            if next.len() != width {
                return Err(NetworkError::length_mismatch(
                    "truth table next-state vector",
                    width,
                    next.len(),
                ));
            }
        }

        let space = StateSpace::new(width)?;
        let expected = space.len();
        for state in space {
            if !self.rows.contains_key(&state) {
                return Err(NetworkError::IncompleteTruthTable {
                    missing: state,
                    present: self.rows.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Parse the tabular import format.
    ///
    /// The first non-empty line is a comma-separated header. The first
    /// `columns / 2` (rounded down) columns are inputs, the rest outputs; the
    /// output headers, with any trailing `'` removed, are returned as the
    /// entity names. Every cell must be `0` or `1`.
    pub fn from_csv_str(text: &str) -> NetworkResult<(Vec<String>, TruthTable)> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let Some((header_line, header)) = lines.next() else {
            return Err(NetworkError::InvalidTable {
                line: 1,
                message: "missing header row".to_string(),
            });
        };

        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        if columns.len() < 2 {
            return Err(NetworkError::InvalidTable {
                line: header_line,
                message: format!("need at least 2 columns, found {}", columns.len()),
            });
        }
        let split = columns.len() / 2;
        let entities: Vec<String> = columns[split..]
            .iter()
            .map(|c| c.trim_end_matches('\'').to_string())
            .collect();

        let mut table = TruthTable::new();
        for (line, row) in lines {
            let cells: Vec<&str> = row.split(',').map(str::trim).collect();
            if cells.len() != columns.len() {
                return Err(NetworkError::InvalidTable {
                    line,
                    message: format!("expected {} cells, found {}", columns.len(), cells.len()),
                });
            }
            let bits = cells
                .iter()
                .map(|cell| match *cell {
                    "0" => Ok(false),
                    "1" => Ok(true),
                    other => Err(NetworkError::InvalidTable {
                        line,
                        message: format!("expected 0 or 1, found {other:?}"),
                    }),
                })
                .collect::<NetworkResult<Vec<bool>>>()?;

            let (input, output) = bits.split_at(split);
            if table
                .insert(State::new(input.to_vec()), output.to_vec())
                .is_some()
            {
                debug!(line, "duplicate input row replaced");
            }
        }

        debug!(
            entities = entities.len(),
            rows = table.len(),
            "truth_table_imported"
        );
        Ok((entities, table))
    }
}

impl FromIterator<(State, Vec<bool>)> for TruthTable {
    fn from_iter<T: IntoIterator<Item = (State, Vec<bool>)>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<BTreeMap<State, Vec<u8>>> for TruthTable {
    type Error = String;

    fn try_from(raw: BTreeMap<State, Vec<u8>>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(state, ints)| {
                let bits = ints
                    .into_iter()
                    .map(|v| match v {
                        0 => Ok(false),
                        1 => Ok(true),
                        other => Err(format!("row {state}: expected 0 or 1, got {other}")),
                    })
                    .collect::<Result<Vec<bool>, String>>()?;
                Ok((state, bits))
            })
            .collect()
    }
}

impl From<TruthTable> for BTreeMap<State, Vec<u8>> {
    fn from(table: TruthTable) -> Self {
        table
            .rows
            .into_iter()
            .map(|(state, bits)| (state, bits.into_iter().map(u8::from).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOT_SWAP: &str = "\
A,B,A',B'
0,0,1,1
0,1,0,1
1,0,1,0
1,1,0,0
";

    #[test]
    fn test_csv_import() {
        let (entities, table) = TruthTable::from_csv_str(NOT_SWAP).unwrap();
        assert_eq!(entities, vec!["A", "B"]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(&"01".parse().unwrap()), Some(&[false, true][..]));
        table.validate(2).unwrap();
    }

    #[test]
    fn test_csv_odd_columns_split_down() {
        let (entities, table) = TruthTable::from_csv_str("A,X,Y\n0,1,1\n1,0,0\n").unwrap();
        assert_eq!(entities, vec!["X", "Y"]);
        assert_eq!(table.get(&"0".parse().unwrap()), Some(&[true, true][..]));
        // One input column cannot describe two entities.
        assert!(matches!(
            table.validate(2),
            Err(NetworkError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_csv_rejects_bad_cells() {
        let err = TruthTable::from_csv_str("A,A'\n0,2\n").unwrap_err();
        assert!(matches!(err, NetworkError::InvalidTable { line: 2, .. }));

        let err = TruthTable::from_csv_str("A,A'\n0\n").unwrap_err();
        assert!(matches!(err, NetworkError::InvalidTable { line: 2, .. }));

        let err = TruthTable::from_csv_str("\n\n").unwrap_err();
        assert!(matches!(err, NetworkError::InvalidTable { .. }));
    }

    #[test]
    fn test_validate_reports_missing_row() {
        let (_, mut table) = TruthTable::from_csv_str(NOT_SWAP).unwrap();
        table.remove(&"10".parse().unwrap());
        match table.validate(2).unwrap_err() {
            NetworkError::IncompleteTruthTable {
                missing,
                present,
                expected,
            } => {
                assert_eq!(missing.to_string(), "10");
                assert_eq!(present, 3);
                assert_eq!(expected, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_flip_one_entry() {
        let (_, mut table) = TruthTable::from_csv_str(NOT_SWAP).unwrap();
        let row: State = "01".parse().unwrap();

        assert!(table.flip(&row, 0).unwrap());
        assert_eq!(table.get(&row), Some(&[true, true][..]));
        assert!(!table.flip(&row, 0).unwrap());

        assert!(matches!(
            table.flip(&row, 2),
            Err(NetworkError::IndexOutOfRange { len: 2, .. })
        ));
        assert!(matches!(
            table.flip(&"011".parse().unwrap(), 0),
            Err(NetworkError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_json_shape() {
        let (_, table) = TruthTable::from_csv_str(NOT_SWAP).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["00"], serde_json::json!([1, 1]));
        let back: TruthTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);

        let bad = serde_json::json!({"0": [2]});
        assert!(serde_json::from_value::<TruthTable>(bad).is_err());
    }
}
