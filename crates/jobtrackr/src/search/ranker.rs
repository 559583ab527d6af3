use std::cmp::Ordering;

use super::catalog::{JobTitle, RankedJobTitle};
use super::normalize::normalize;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

const EXACT_SCORE: u8 = 100;
const PREFIX_SCORE: u8 = 90;
const CONTAINS_SCORE: u8 = 80;
const ALL_WORDS_BASE: u8 = 50;
const ALL_WORDS_COVERAGE: u8 = 30;
const WORD_ORDER_BONUS: u8 = 15;

/// Resolve a requested result count into `1..=MAX_LIMIT`, defaulting when absent.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Score an already-normalized query against normalized label fields. Zero means no match.
pub fn score_normalized(query: &str, label: &str, short_label: &str) -> u8 {
    if query.is_empty() {
        return 0;
    }
    if label == query || short_label == query {
        return EXACT_SCORE;
    }
    if label.starts_with(query) || short_label.starts_with(query) {
        return PREFIX_SCORE;
    }
    if label.contains(query) || short_label.contains(query) {
        return CONTAINS_SCORE;
    }

    let words: Vec<&str> = query.split(' ').filter(|word| !word.is_empty()).collect();
    let matched = words
        .iter()
        .filter(|word| label.contains(*word) || short_label.contains(*word))
        .count();
    // Partial word matches never score; the coverage term only ever sees full coverage.
    if words.is_empty() || matched < words.len() {
        return 0;
    }

    let coverage = (usize::from(ALL_WORDS_COVERAGE) * matched / words.len()) as u8;
    let mut score = ALL_WORDS_BASE + coverage;
    if words_in_order(&words, label, short_label) {
        score += WORD_ORDER_BONUS;
    }
    score
}

/// Forward scan over `label short_label`; each word must start after the previous match.
fn words_in_order(words: &[&str], label: &str, short_label: &str) -> bool {
    let haystack = format!("{label} {short_label}");
    let mut position = 0;

    for word in words {
        match haystack[position..].find(word) {
            Some(offset) => position += offset + word.len(),
            None => return false,
        }
    }

    true
}

/// Score a raw query against one catalog entry.
pub fn score_title(query: &str, title: &JobTitle) -> u8 {
    score_normalized(
        &normalize(query),
        &normalize(&title.label),
        &normalize(&title.short_label),
    )
}

struct Scored<'a> {
    title: &'a JobTitle,
    sort_key: String,
    score: u8,
}

/// Rank candidates for a query and keep the best `limit`.
///
/// A query that normalizes to nothing returns the leading candidates unscored, in catalog order.
pub fn rank(query: &str, candidates: &[JobTitle], limit: usize) -> Vec<RankedJobTitle> {
    let query = normalize(query);
    if query.is_empty() {
        return candidates
            .iter()
            .take(limit)
            .map(RankedJobTitle::from)
            .collect();
    }

    let mut scored: Vec<Scored<'_>> = candidates
        .iter()
        .filter_map(|title| {
            let label = normalize(&title.label);
            let score = score_normalized(&query, &label, &normalize(&title.short_label));
            (score > 0).then_some(Scored {
                title,
                sort_key: label,
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| compare_labels(a, b))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|entry| RankedJobTitle::from(entry.title))
        .collect()
}

fn compare_labels(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    a.sort_key
        .cmp(&b.sort_key)
        .then_with(|| a.title.label.cmp(&b.title.label))
}
