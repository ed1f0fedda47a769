/*
    This module supplies the decisions the expander makes. Every choice goes
    through a `Selector`, so a generation can be recorded as a list of small
    integers and driven again from that list.
*/

use rand::Rng;
use rand::RngCore;
use tracing::trace;

use crate::generator::{GenResult, GenerateError};

/// Values drawn while recording fall in `0..DEFAULT_CHOICE_RANGE`.
pub const DEFAULT_CHOICE_RANGE: u32 = 10;

/// A selection policy: picks an index in `0..len` for a list of candidates.
pub trait Selector {
    fn next_index(&mut self, len: usize) -> GenResult<usize>;
}

/// Draws uniformly at random. Nothing is recorded, so the run cannot be
/// replayed.
pub struct UniformSelector<R> {
    rng: R,
}

impl<R: Rng> UniformSelector<R> {
    pub fn new(rng: R) -> Self {
        UniformSelector { rng }
    }
}

impl<R: Rng> Selector for UniformSelector<R> {
    fn next_index(&mut self, len: usize) -> GenResult<usize> {
        if len == 0 {
            return Err(GenerateError::EmptyChoice);
        }
        Ok(self.rng.gen_range(0..len))
    }
}

enum Mode<'r> {
    Record { rng: &'r mut dyn RngCore, range: u32 },
    Replay,
}

/// The integer trace of a generation plus a cursor into it.
///
/// In record mode each decision draws a fresh value and appends it. In replay
/// mode the values are fixed and reading past the end is
/// [`GenerateError::Exhausted`].
pub struct ChoiceSequence<'r> {
    values: Vec<u32>,
    position: usize,
    mode: Mode<'r>,
}

impl<'r> ChoiceSequence<'r> {
    pub fn record(rng: &'r mut dyn RngCore) -> Self {
        Self::record_in_range(rng, DEFAULT_CHOICE_RANGE)
    }

    pub fn record_in_range(rng: &'r mut dyn RngCore, range: u32) -> Self {
        ChoiceSequence {
            values: Vec::new(),
            position: 0,
            mode: Mode::Record { rng, range: range.max(1) },
        }
    }

    pub fn replay(values: Vec<u32>) -> ChoiceSequence<'static> {
        ChoiceSequence {
            values,
            position: 0,
            mode: Mode::Replay,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.mode, Mode::Record { .. })
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u32> {
        self.values
    }

    /// Number of decisions made so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Values left to replay; always 0 while recording.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }

    pub fn next_value(&mut self) -> GenResult<u32> {
        let value = match &mut self.mode {
            Mode::Record { rng, range } => {
                let value = rng.gen_range(0..*range);
                self.values.push(value);
                value
            }
            Mode::Replay => *self
                .values
                .get(self.position)
                .ok_or(GenerateError::Exhausted { position: self.position })?,
        };
        self.position += 1;
        Ok(value)
    }
}

impl Selector for ChoiceSequence<'_> {
    fn next_index(&mut self, len: usize) -> GenResult<usize> {
        if len == 0 {
            return Err(GenerateError::EmptyChoice);
        }
        let value = self.next_value()?;
        trace!(position = self.position, value, len, "choice");
        Ok(value as usize % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn replay_reads_values_in_order() {
        let mut choices = ChoiceSequence::replay(vec![3, 7, 4]);

        assert_eq!(choices.next_index(2).unwrap(), 1);
        assert_eq!(choices.next_index(5).unwrap(), 2);
        assert_eq!(choices.next_index(10).unwrap(), 4);
        assert_eq!(choices.position(), 3);
        assert_eq!(choices.remaining(), 0);
    }

    #[test]
    fn replay_past_end_is_exhaustion() {
        let mut choices = ChoiceSequence::replay(vec![1]);
        choices.next_index(3).unwrap();

        assert_eq!(choices.next_index(3), Err(GenerateError::Exhausted { position: 1 }));
        assert_eq!(ChoiceSequence::replay(vec![]).next_index(1), Err(GenerateError::Exhausted { position: 0 }));
    }

    #[test]
    fn record_appends_values_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut choices = ChoiceSequence::record(&mut rng);
        for len in 1..=20 {
            let index = choices.next_index(len).unwrap();
            assert!(index < len);
        }

        assert!(choices.is_recording());
        assert_eq!(choices.values().len(), 20);
        assert!(choices.values().iter().all(|&v| v < DEFAULT_CHOICE_RANGE));
    }

    #[test]
    fn recorded_values_replay_to_same_indices() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut recorder = ChoiceSequence::record(&mut rng);
        let lens = [2, 5, 3, 1, 7, 26];
        let recorded: Vec<usize> = lens.iter().map(|&len| recorder.next_index(len).unwrap()).collect();

        let mut replayer = ChoiceSequence::replay(recorder.into_values());
        let replayed: Vec<usize> = lens.iter().map(|&len| replayer.next_index(len).unwrap()).collect();

        assert_eq!(recorded, replayed);
    }

    #[test]
    fn empty_candidate_list_draws_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut choices = ChoiceSequence::record(&mut rng);

        assert_eq!(choices.next_index(0), Err(GenerateError::EmptyChoice));
        assert!(choices.values().is_empty());
        assert_eq!(UniformSelector::new(ChaCha8Rng::seed_from_u64(0)).next_index(0), Err(GenerateError::EmptyChoice));
    }

    #[test]
    fn uniform_stays_in_bounds() {
        let mut selector = UniformSelector::new(ChaCha8Rng::seed_from_u64(3));
        for len in 1..50 {
            assert!(selector.next_index(len).unwrap() < len);
        }
    }
}
