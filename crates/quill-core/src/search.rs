//! Weighted full-text relevance scoring.
//!
//! Mirrors PostgreSQL's `ts_rank` over
//! `setweight(to_tsvector(title), 'A') || setweight(to_tsvector(body), 'B')`
//! queried with `plainto_tsquery`. A one-term query uses the weighted
//! occurrence sum of `ts_rank`'s OR path; a query of several terms uses the
//! pairwise proximity formula PostgreSQL applies to the resulting AND query.
//!
//! Tokens are lower-cased alphanumeric runs with no stemming and no stop-word
//! list, so positions and scores can still differ from the database when the
//! text holds stop words or inflected forms. PostgreSQL reports `1e-20` where
//! this returns 0.0.

/// Weight of a title occurrence (label A).
pub const TITLE_WEIGHT: f32 = 1.0;
/// Weight of a body occurrence (label B).
pub const BODY_WEIGHT: f32 = 0.4;
/// Results scoring below this are dropped.
pub const RANK_THRESHOLD: f32 = 0.3;

/// Limit of Σ 1/i² used by `ts_rank` to normalise per-term scores.
const POSITION_NORM: f32 = 1.644_934_1;

/// Split text into lower-cased alphanumeric tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// A parsed free-text query: its distinct terms in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Parse raw input. Returns `None` when it holds no searchable term.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut terms: Vec<String> = Vec::new();
        for token in tokenize(raw) {
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
        (!terms.is_empty()).then_some(Self { terms })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Largest word position a tsvector stores; later words share it.
const MAX_POSITION: u32 = 16_383;
/// Positions a tsvector keeps per lexeme.
const MAX_OCCURRENCES: usize = 256;

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    position: u32,
    weight: f32,
}

/// Relevance of a document to `query`.
///
/// A single term is scored from its weighted occurrences. Several terms are
/// scored from the proximity of every pair of occurrences of distinct terms,
/// so a document matching only one of them scores 0.0.
pub fn rank(title: &str, body: &str, query: &SearchQuery) -> f32 {
    let title_len = (tokenize(title).count() as u32).min(MAX_POSITION);
    let document: Vec<(String, Occurrence)> = tokenize(title)
        .enumerate()
        .map(|(i, token)| (token, occurrence(i as u32 + 1, TITLE_WEIGHT)))
        .chain(
            tokenize(body)
                .enumerate()
                .map(|(i, token)| (token, occurrence(title_len + i as u32 + 1, BODY_WEIGHT))),
        )
        .collect();

    let matches: Vec<Vec<Occurrence>> = query
        .terms
        .iter()
        .map(|term| {
            document
                .iter()
                .filter(|(token, _)| token == term)
                .take(MAX_OCCURRENCES)
                .map(|(_, occurrence)| *occurrence)
                .collect()
        })
        .collect();

    match matches.as_slice() {
        [single] => term_score(single),
        terms => proximity_score(terms),
    }
}

fn occurrence(position: u32, weight: f32) -> Occurrence {
    Occurrence {
        position: position.min(MAX_POSITION),
        weight,
    }
}

/// Score of one term from its occurrences in document order.
fn term_score(occurrences: &[Occurrence]) -> f32 {
    if occurrences.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut best_weight = -1.0;
    let mut best_index = 0usize;
    for (index, o) in occurrences.iter().enumerate() {
        sum += o.weight / position_decay(index);
        if o.weight > best_weight {
            best_weight = o.weight;
            best_index = index;
        }
    }

    (best_weight + sum - best_weight / position_decay(best_index)) / POSITION_NORM
}

fn position_decay(index: usize) -> f32 {
    let n = (index + 1) as f32;
    n * n
}

/// Combined closeness of every pair of occurrences of two different terms.
fn proximity_score(terms: &[Vec<Occurrence>]) -> f32 {
    let mut score: Option<f32> = None;
    for (i, later) in terms.iter().enumerate() {
        for earlier in &terms[..i] {
            for a in later {
                for b in earlier {
                    let distance = a.position.abs_diff(b.position);
                    if distance == 0 {
                        continue;
                    }
                    let pair = (a.weight * b.weight * word_distance(distance)).sqrt();
                    score = Some(match score {
                        Some(s) => 1.0 - (1.0 - s) * (1.0 - pair),
                        None => pair,
                    });
                }
            }
        }
    }
    score.unwrap_or(0.0)
}

fn word_distance(distance: u32) -> f32 {
    if distance > 100 {
        return 1e-30;
    }
    1.0 / (1.005 + 0.05 * (distance as f32 / 2.0 - 4.0).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> SearchQuery {
        SearchQuery::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_dedups_and_lowercases() {
        assert_eq!(query("Django, django TIPS").terms(), ["django", "tips"]);
        assert!(SearchQuery::parse("  ?! ").is_none());
    }

    #[test]
    fn test_single_title_match_clears_threshold() {
        let score = rank("Django Tips", "Nothing relevant here.", &query("django"));
        assert!((score - 0.6079).abs() < 1e-3, "score was {score}");
        assert!(score >= RANK_THRESHOLD);
    }

    #[test]
    fn test_single_body_match_falls_below_threshold() {
        let score = rank("Weekend", "I read about django today.", &query("django"));
        assert!((score - 0.2432).abs() < 1e-3, "score was {score}");
        assert!(score < RANK_THRESHOLD);
    }

    #[test]
    fn test_title_match_outranks_body_match() {
        let q = query("rust");
        let title = rank("Rust ownership", "Borrowing explained.", &q);
        let body = rank("Ownership", "Rust rust rust everywhere.", &q);
        assert!(title > body);
    }

    #[test]
    fn test_repeated_body_matches_accumulate() {
        let score = rank("Weekend", "django and more django", &query("django"));
        assert!(score >= RANK_THRESHOLD, "score was {score}");
    }

    #[test]
    fn test_terms_missing_from_document_score_zero() {
        assert_eq!(rank("Django Tips", "", &query("django flask")), 0.0);
        assert_eq!(rank("Weekend", "", &query("django")), 0.0);
    }

    #[test]
    fn test_adjacent_title_terms_score_near_one() {
        let score = rank("Django Tips", "", &query("django tips"));
        assert!((score - 0.9968).abs() < 1e-3, "score was {score}");
    }

    #[test]
    fn test_multi_term_score_follows_weight_and_distance() {
        let q = query("django tips");
        let across = rank("Django", "tips for beginners", &q);
        assert!((across - 0.6304).abs() < 1e-3, "score was {across}");

        let apart = rank("Django", "one two three four five six seven tips", &q);
        assert!((apart - 0.6157).abs() < 1e-3, "score was {apart}");

        let far = format!("{} tips", "word ".repeat(120));
        assert!(rank("Django", &far, &q) < RANK_THRESHOLD);
    }

    #[test]
    fn test_two_of_three_terms_still_score() {
        let score = rank("Django Tips", "", &query("django tips flask"));
        assert!(score >= RANK_THRESHOLD, "score was {score}");
    }
}
