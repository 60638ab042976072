//! Network states and the canonical enumeration of the state space.
//!
//! A [`State`] assigns one bit to every entity, in entity-index order. Its
//! canonical text form is a string of `'0'`/`'1'` with entity 0 leftmost, and
//! the state space `{0,1}^N` is always enumerated in increasing binary order
//! of that string:
//!
//! ```text
//! N = 3:  000, 001, 010, 011, 100, 101, 110, 111
//! ```

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NetworkError, NetworkResult};

/// One complete assignment of a bit to every entity.
///
/// Ordering is lexicographic over the bits, which for equal lengths is the
/// same as comparing the canonical strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct State {
    bits: Vec<bool>,
}

impl State {
    /// Create a state from explicit bits (entity 0 first).
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// The all-zero state over `len` entities.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// The state at position `index` of the canonical enumeration over `len`
    /// entities. Entity 0 is the most significant bit.
    pub fn from_index(len: usize, index: usize) -> Self {
        let bits = (0..len)
            .map(|i| {
                let shift = len - 1 - i;
                shift < usize::BITS as usize && (index >> shift) & 1 == 1
            })
            .collect();
        Self { bits }
    }

    /// Position of this state in the canonical enumeration.
    pub fn index(&self) -> usize {
        self.bits
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit))
    }

    /// Number of entities covered by this state.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the state covers no entities.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit of entity `index`, if present.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// All bits in entity order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Consume the state, returning its bits.
    pub fn into_bits(self) -> Vec<bool> {
        self.bits
    }

    /// Copy of this state with the bit of entity `index` inverted.
    pub fn with_flipped(&self, index: usize) -> Self {
        let mut bits = self.bits.clone();
        if let Some(bit) = bits.get_mut(index) {
            *bit = !*bit;
        }
        Self { bits }
    }

    /// Number of entities set to 1.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

impl Index<usize> for State {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        &self.bits[index]
    }
}

impl From<Vec<bool>> for State {
    fn from(bits: Vec<bool>) -> Self {
        Self::new(bits)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for State {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(NetworkError::InvalidState {
                    input: s.to_string(),
                    message: format!("unexpected character {other:?}"),
                }),
            })
            .collect::<NetworkResult<Vec<_>>>()?;
        Ok(Self { bits })
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Iterator over `{0,1}^N` in canonical order.
#[derive(Debug, Clone)]
pub struct StateSpace {
    entities: usize,
    next: usize,
    end: usize,
}

impl StateSpace {
    /// Enumerate every state over `entities` entities.
    ///
    /// Fails with [`NetworkError::TooManyEntities`] if `2^entities` does not
    /// fit in a `usize`.
    pub fn new(entities: usize) -> NetworkResult<Self> {
        let end = state_count(entities)?;
        Ok(Self {
            entities,
            next: 0,
            end,
        })
    }

    /// Number of entities per state.
    pub fn entities(&self) -> usize {
        self.entities
    }
}

impl Iterator for StateSpace {
    type Item = State;

    fn next(&mut self) -> Option<State> {
        if self.next >= self.end {
            return None;
        }
        let state = State::from_index(self.entities, self.next);
        self.next += 1;
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StateSpace {}

/// `2^entities`, or [`NetworkError::TooManyEntities`] on overflow.
pub fn state_count(entities: usize) -> NetworkResult<usize> {
    u32::try_from(entities)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .ok_or(NetworkError::TooManyEntities {
            entities,
            limit: usize::BITS as usize - 1,
        })
}
