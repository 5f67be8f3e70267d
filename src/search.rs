//! Relevance ranking for public recipe search.
//!
//! The candidate set is already restricted to public recipes by the store
//! query; this module only scores and orders it. Scores are plain word-match
//! counts, with title matches worth more than body or caption matches.

use crate::state::Recipe;

const TITLE_WEIGHT: usize = 3;

/// Rank candidates against a search term, best match first. Recipes that do
/// not contain any of the term's words are dropped, not ranked last. Ties
/// resolve newest-first, which is stable for a given data set.
pub(crate) fn rank(term: &str, candidates: Vec<Recipe>) -> Vec<Recipe> {
    let words = tokenize(term);

    let mut scored: Vec<(usize, Recipe)> = candidates
        .into_iter()
        .filter_map(|recipe| {
            let score = score(&words, &recipe);
            if score == 0 {
                None
            } else {
                Some((score, recipe))
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.created_at.cmp(&a.1.created_at))
    });

    scored.into_iter().map(|(_, recipe)| recipe).collect()
}

fn score(words: &[String], recipe: &Recipe) -> usize {
    words
        .iter()
        .map(|word| {
            count_matches(&recipe.title, word) * TITLE_WEIGHT
                + recipe
                    .body
                    .as_deref()
                    .map_or(0, |body| count_matches(body, word))
                + recipe
                    .image_caption
                    .as_deref()
                    .map_or(0, |caption| count_matches(caption, word))
        })
        .sum()
}

fn count_matches(text: &str, word: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|candidate| candidate.eq_ignore_ascii_case(word))
        .count()
}

fn tokenize(term: &str) -> Vec<String> {
    term.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
