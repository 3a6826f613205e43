use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{Question, QuestionKind};

/// Uniformly random permutation of `0..n`; `perm[new_position] = old_index`
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

fn new_position(perm: &[usize], old: usize) -> Option<usize> {
    perm.iter().position(|&p| p == old)
}

/// Reorder choices by `perm` and remap answer indices so they keep pointing at the same content
pub fn apply_permutation(question: &Question, perm: &[usize]) -> Question {
    let kind = match &question.kind {
        QuestionKind::Single { choices, answer } => QuestionKind::Single {
            choices: perm.iter().filter_map(|&p| choices.get(p).cloned()).collect(),
            answer: answer.and_then(|old| new_position(perm, old)),
        },
        QuestionKind::Multi { choices, answers } => QuestionKind::Multi {
            choices: perm.iter().filter_map(|&p| choices.get(p).cloned()).collect(),
            answers: answers
                .iter()
                .filter_map(|&old| new_position(perm, old))
                .collect(),
        },
        other => other.clone(),
    };

    Question {
        kind,
        ..question.clone()
    }
}

/// Shuffled copy of a question; text question types come back unchanged
pub fn shuffle_choices<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    match &question.kind {
        QuestionKind::Single { choices, .. } | QuestionKind::Multi { choices, .. } => {
            let perm = permutation(choices.len(), rng);
            apply_permutation(question, &perm)
        }
        QuestionKind::Text { .. } | QuestionKind::MultiText { .. } => question.clone(),
    }
}
