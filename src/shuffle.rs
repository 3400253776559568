//! Answer-option shuffling.
//!
//! Two modes:
//!   - seeded: the permutation is a pure function of the seed and the option
//!     count, so re-rendering the same question never reshuffles under the
//!     user mid-answer
//!   - fresh: uniform shuffle from the thread RNG for "always fresh" callers
//!
//! Both return a new ordering and leave the input untouched. The seeded mode
//! keys off the question's stable id; downstream selection handling maps a
//! displayed option back to its index in the ORIGINAL order via
//! [`original_index`], which is the contract consumers that record answers
//! positionally rely on.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::{AnswerOption, NormalizedQuestion};

/// Integer seed derived from a string by summing char scalar values.
pub fn string_seed(seed: &str) -> u64 {
    seed.chars().map(|c| c as u64).sum()
}

/// Deterministic Fisher-Yates: same seed and option count, same permutation.
pub fn shuffle_seeded(options: &[AnswerOption], seed: u64) -> Vec<AnswerOption> {
    let mut shuffled = options.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);
    shuffled
}

/// Non-reproducible uniform shuffle.
pub fn shuffle_fresh(options: &[AnswerOption]) -> Vec<AnswerOption> {
    let mut shuffled = options.to_vec();
    shuffled.shuffle(&mut rand::thread_rng());
    shuffled
}

/// Options in the order the question should be displayed: seeded by the
/// question id when shuffling is enabled, untouched otherwise.
pub fn display_order(question: &NormalizedQuestion, fresh: bool) -> Vec<AnswerOption> {
    if !question.shuffle_answers {
        question.answer_options.clone()
    } else if fresh {
        shuffle_fresh(&question.answer_options)
    } else {
        shuffle_seeded(&question.answer_options, string_seed(&question.id))
    }
}

/// Translate a displayed option back to its index in the original (unshuffled)
/// order, matching on id first and text as a fallback for id-less data.
#[allow(dead_code)]
pub fn original_index(options: &[AnswerOption], chosen: &AnswerOption) -> Option<usize> {
    options
        .iter()
        .position(|o| o.id == chosen.id)
        .or_else(|| options.iter().position(|o| o.text == chosen.text))
}

/// Same translation when only the option id is known (the usual API case).
pub fn original_index_of_id(options: &[AnswerOption], id: &str) -> Option<usize> {
    options.iter().position(|o| o.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<AnswerOption> {
        (0..n)
            .map(|i| AnswerOption {
                id: format!("opt-{i}"),
                text: format!("Answer {i}"),
                is_correct: i == 0,
                explanation: None,
            })
            .collect()
    }

    fn ids(opts: &[AnswerOption]) -> Vec<&str> {
        opts.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn seeded_shuffle_is_deterministic() {
        let opts = options(6);
        let a = shuffle_seeded(&opts, 42);
        let b = shuffle_seeded(&opts, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_shuffle_varies_across_seeds() {
        let opts = options(8);
        let first = shuffle_seeded(&opts, 0);
        let any_different = (1..50).any(|seed| shuffle_seeded(&opts, seed) != first);
        assert!(any_different, "fifty seeds produced identical permutations");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let opts = options(7);
        for seed in [0, 1, 17, 9999] {
            let shuffled = shuffle_seeded(&opts, seed);
            let mut left = ids(&opts);
            let mut right = ids(&shuffled);
            left.sort();
            right.sort();
            assert_eq!(left, right);
        }

        let fresh = shuffle_fresh(&opts);
        assert_eq!(fresh.len(), opts.len());
    }

    #[test]
    fn shuffle_handles_degenerate_sizes() {
        assert!(shuffle_seeded(&[], 5).is_empty());
        assert!(shuffle_fresh(&[]).is_empty());
        let one = options(1);
        assert_eq!(shuffle_seeded(&one, 123), one);
    }

    #[test]
    fn input_is_never_mutated() {
        let opts = options(5);
        let before = opts.clone();
        let _ = shuffle_seeded(&opts, 99);
        let _ = shuffle_fresh(&opts);
        assert_eq!(opts, before);
    }

    #[test]
    fn string_seed_sums_char_codes() {
        assert_eq!(string_seed(""), 0);
        assert_eq!(string_seed("ab"), 97 + 98);
        assert_eq!(string_seed("ba"), string_seed("ab"));
    }

    #[test]
    fn display_order_respects_shuffle_flag() {
        let q = NormalizedQuestion {
            id: "q-1".into(),
            question_text: "?".into(),
            answer_options: options(5),
            shuffle_answers: false,
            multiple_correct: false,
            has_explanations: false,
        };
        assert_eq!(display_order(&q, false), q.answer_options);

        let shuffled = NormalizedQuestion { shuffle_answers: true, ..q.clone() };
        assert_eq!(display_order(&shuffled, false), display_order(&shuffled, false));
    }

    #[test]
    fn every_shuffled_position_maps_back_to_its_original_index() {
        let opts = options(6);
        let shuffled = shuffle_seeded(&opts, 7);
        for shown in &shuffled {
            let idx = original_index(&opts, shown).expect("option must map back");
            assert_eq!(&opts[idx], shown);
        }
    }

    #[test]
    fn original_index_falls_back_to_text_when_id_is_unknown() {
        let opts = options(3);
        let ghost = AnswerOption {
            id: "missing".into(),
            text: "Answer 2".into(),
            is_correct: false,
            explanation: None,
        };
        assert_eq!(original_index(&opts, &ghost), Some(2));
        assert_eq!(original_index_of_id(&opts, "opt-1"), Some(1));
        assert_eq!(original_index_of_id(&opts, "nope"), None);
    }
}
