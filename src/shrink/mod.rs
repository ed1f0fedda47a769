/*
    Delta debugging over choice sequences. `ddmin` removes contiguous chunks,
    coarse to fine, while a causality oracle keeps holding; its result is only
    1-minimal, so `shrink_to_fixpoint` reruns it until the length stops
    decreasing. `Shrinker` builds the oracle for a grammar by replaying each
    candidate trace and handing the sentence to a string predicate.
*/

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::generator::{Expander, GenerateError};

// Tries removing each `chunk_len`-long chunk from `start` on and returns the
// first reduction that stays causal, with the offset it was removed at.
fn remove_first_causal_chunk<T, F>(sequence: &[T], start: usize, chunk_len: usize, is_causal: &mut F) -> Option<(usize, Vec<T>)>
where
    T: Clone,
    F: FnMut(&[T]) -> bool,
{
    (start..sequence.len()).step_by(chunk_len).find_map(|i| {
        let end = (i + chunk_len).min(sequence.len());
        let stitched = [&sequence[..i], &sequence[end..]].concat();
        is_causal(&stitched).then_some((i, stitched))
    })
}

/// Removes chunks of `sequence` while `is_causal` holds.
///
/// After a successful removal the scan resumes at the same offset and chunk
/// length on the shorter sequence; when a whole pass fails the chunk length
/// is halved and the scan restarts at 0. The result is 1-minimal.
pub fn ddmin<T, F>(sequence: &[T], mut is_causal: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&[T]) -> bool,
{
    let mut current = sequence.to_vec();
    let mut start = 0;
    let mut chunk_len = current.len() / 2;

    while chunk_len >= 1 {
        match remove_first_causal_chunk(&current, start, chunk_len, &mut is_causal) {
            Some((at, reduced)) => {
                trace!(at, chunk_len, remaining = reduced.len(), "removed chunk");
                if reduced.is_empty() {
                    return reduced;
                }
                start = at;
                current = reduced;
            }
            None => {
                start = 0;
                chunk_len /= 2;
            }
        }
    }

    current
}

/// Reruns [`ddmin`] on its own output until the length stops decreasing.
pub fn shrink_to_fixpoint<T, F>(sequence: &[T], mut is_causal: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&[T]) -> bool,
{
    let mut current = sequence.to_vec();
    loop {
        let reduced = ddmin(&current, &mut is_causal);
        if reduced.len() >= current.len() {
            return current;
        }
        current = reduced;
    }
}

/// Counters for the most recent `shrink` call; all of them reset when the
/// next one starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShrinkStats {
    /// Length of the trace handed to the last `shrink` call
    pub original_len: usize,
    /// Length of the trace it returned
    pub minimized_len: usize,
    /// Replays actually performed
    pub evaluations: usize,
    /// Oracle queries answered from the cache
    pub cache_hits: usize,
    /// ddmin passes run by the fixed-point loop
    pub rounds: usize,
    /// Replays that ran out of choices
    pub exhausted: usize,
}

/// Shrinks choice sequences of one grammar against a string predicate.
///
/// Verdicts are cached for the lifetime of the shrinker, so a later `shrink`
/// call answers repeated candidates from the cache.
pub struct Shrinker<'e, 'g, P> {
    expander: &'e Expander<'g>,
    start: String,
    predicate: P,
    verdicts: HashMap<Vec<u32>, bool>,
    stats: ShrinkStats,
}

impl<'e, 'g, P> Shrinker<'e, 'g, P>
where
    P: Fn(&str) -> bool,
{
    pub fn new(expander: &'e Expander<'g>, start: impl Into<String>, predicate: P) -> Self {
        Shrinker {
            expander,
            start: start.into(),
            predicate,
            verdicts: HashMap::new(),
            stats: ShrinkStats::default(),
        }
    }

    pub fn stats(&self) -> &ShrinkStats {
        &self.stats
    }

    /// The causality oracle: replays `choices` and tests the sentence. Any
    /// generation error counts as "not causal".
    pub fn is_causal(&mut self, choices: &[u32]) -> bool {
        if let Some(&verdict) = self.verdicts.get(choices) {
            self.stats.cache_hits += 1;
            return verdict;
        }

        self.stats.evaluations += 1;
        let verdict = match self.expander.replay(&self.start, choices) {
            Ok(sentence) => (self.predicate)(&sentence),
            Err(GenerateError::Exhausted { position }) => {
                trace!(position, len = choices.len(), "replay exhausted");
                self.stats.exhausted += 1;
                false
            }
            Err(error) => {
                debug!(%error, "replay failed");
                false
            }
        };
        self.verdicts.insert(choices.to_vec(), verdict);
        verdict
    }

    /// Shrinks `choices` to a fixed point of [`ddmin`]. Never fails; if no
    /// reduction is causal the input comes back unchanged.
    pub fn shrink(&mut self, choices: &[u32]) -> Vec<u32> {
        self.stats = ShrinkStats {
            original_len: choices.len(),
            ..ShrinkStats::default()
        };

        let mut current = choices.to_vec();
        loop {
            self.stats.rounds += 1;
            let reduced = ddmin(&current, |candidate: &[u32]| self.is_causal(candidate));
            debug!(round = self.stats.rounds, from = current.len(), to = reduced.len(), "ddmin pass");
            if reduced.len() >= current.len() {
                break;
            }
            current = reduced;
        }

        self.stats.minimized_len = current.len();
        info!(
            original = self.stats.original_len,
            minimized = self.stats.minimized_len,
            evaluations = self.stats.evaluations,
            cache_hits = self.stats.cache_hits,
            "shrink complete"
        );
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorConfig;
    use crate::grammar::{alt, Grammar};

    #[test]
    fn empty_input_is_a_fixed_point() {
        let mut calls = 0;
        let result = ddmin(&[] as &[u32], |_| {
            calls += 1;
            true
        });

        assert!(result.is_empty());
        assert_eq!(calls, 0);
        assert!(shrink_to_fixpoint(&[] as &[u32], |_| false).is_empty());
    }

    #[test]
    fn always_causal_shrinks_to_empty() {
        assert!(ddmin(&[1, 2, 3, 4, 5], |_| true).is_empty());
    }

    #[test]
    fn never_causal_returns_input() {
        assert_eq!(ddmin(&[1, 2, 3, 4, 5], |_| false), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn keeps_the_elements_the_oracle_needs() {
        let input: Vec<u32> = (0..16).collect();
        let result = ddmin(&input, |s| s.contains(&3) && s.contains(&11));
        assert_eq!(result, vec![3, 11]);
    }

    #[test]
    fn first_pass_removes_the_coarsest_chunk() {
        let mut tried = Vec::new();
        ddmin(&[1, 2, 3, 4], |s| {
            tried.push(s.to_vec());
            s.contains(&4)
        });

        assert_eq!(tried[0], vec![3, 4]);
    }

    #[test]
    fn resumes_at_the_removed_offset() {
        let mut tried = Vec::new();
        let result = ddmin(&[1, 2, 3, 4, 5, 6, 7, 8], |s| {
            tried.push(s.to_vec());
            s.contains(&1) && s.contains(&8)
        });

        // [3, 4] goes at offset 2; the next attempt stays at offset 2.
        assert_eq!(tried[3], vec![1, 2, 5, 6, 7, 8]);
        assert_eq!(tried[4], vec![1, 2, 7, 8]);
        assert_eq!(result, vec![1, 8]);
    }

    #[test]
    fn fixpoint_never_grows() {
        let input: Vec<u32> = (0..40).collect();
        let oracle = |s: &[u32]| s.iter().filter(|&&v| v % 7 == 0).count() >= 3;
        let once = ddmin(&input, oracle);
        let fixed = shrink_to_fixpoint(&input, oracle);

        assert!(fixed.len() <= once.len());
        assert!(oracle(&fixed));
        assert_eq!(shrink_to_fixpoint(&fixed, oracle), fixed);
    }

    fn digits() -> Grammar {
        Grammar::new("<s>")
            .rule("<s>", vec![alt(&["<d>"]), alt(&["<d>", "<s>"])])
            .rule("<d>", vec![alt(&["0"]), alt(&["1"]), alt(&["7"])])
    }

    #[test]
    fn shrinker_treats_exhaustion_as_not_causal() {
        let grammar = digits();
        let expander = Expander::new(&grammar);
        let mut shrinker = Shrinker::new(&expander, "<s>", |s: &str| s.contains('7'));

        assert!(!shrinker.is_causal(&[1, 0]));
        assert_eq!(shrinker.stats().exhausted, 1);
        assert!(shrinker.is_causal(&[0, 2]));
    }

    #[test]
    fn shrinker_caches_verdicts() {
        let grammar = digits();
        let expander = Expander::new(&grammar);
        let mut shrinker = Shrinker::new(&expander, "<s>", |s: &str| s.contains('7'));

        shrinker.is_causal(&[0, 2]);
        shrinker.is_causal(&[0, 2]);
        assert_eq!(shrinker.stats().evaluations, 1);
        assert_eq!(shrinker.stats().cache_hits, 1);
    }

    #[test]
    fn shrinker_result_is_one_minimal() {
        let grammar = digits();
        let expander = Expander::with_config(&grammar, GeneratorConfig::new().with_max_depth(20));
        // "0" "1" "7" "0": <s>=1 <d>=0, <s>=1 <d>=1, <s>=1 <d>=2, <s>=0 <d>=0
        let trace = vec![1, 0, 1, 1, 1, 2, 0, 0];
        assert_eq!(expander.replay("<s>", &trace).unwrap(), "0170");

        let mut shrinker = Shrinker::new(&expander, "<s>", |s: &str| s.contains('7'));
        let minimal = shrinker.shrink(&trace);

        // Dropping the first half leaves "70"; no single chunk of that can go
        // without losing the 7 or running out of choices.
        assert_eq!(minimal, vec![1, 2, 0, 0]);
        assert_eq!(expander.replay("<s>", &minimal).unwrap(), "70");
        assert_eq!(shrinker.stats().original_len, 8);
        assert_eq!(shrinker.stats().minimized_len, 4);
        assert_eq!(shrinker.stats().rounds, 2);
    }

    #[test]
    fn stats_cover_only_the_latest_shrink() {
        let grammar = digits();
        let expander = Expander::with_config(&grammar, GeneratorConfig::new().with_max_depth(20));
        let trace = vec![1, 0, 1, 1, 1, 2, 0, 0];
        let mut shrinker = Shrinker::new(&expander, "<s>", |s: &str| s.contains('7'));

        let first = shrinker.shrink(&trace);
        let first_stats = shrinker.stats().clone();
        assert!(first_stats.evaluations > 0);

        // Same input again: every candidate is already cached.
        let second = shrinker.shrink(&trace);
        let second_stats = shrinker.stats();
        assert_eq!(second, first);
        assert_eq!(second_stats.evaluations, 0);
        assert_eq!(second_stats.exhausted, 0);
        assert_eq!(second_stats.cache_hits, first_stats.evaluations + first_stats.cache_hits);
        assert_eq!(second_stats.rounds, first_stats.rounds);
        assert_eq!(second_stats.original_len, 8);
    }

    #[test]
    fn shrinker_returns_input_when_nothing_is_causal() {
        let grammar = digits();
        let expander = Expander::new(&grammar);
        let mut shrinker = Shrinker::new(&expander, "<s>", |s: &str| s.contains('9'));

        assert_eq!(shrinker.shrink(&[0, 1]), vec![0, 1]);
    }
}
