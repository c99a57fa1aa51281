//! Scoring and filtering of raw search candidates.
//!
//! Third-party search feeds are noisy: accessory listings, padded titles,
//! adjacent models. Each candidate is scored against the query with an
//! additive heuristic clipped to `[0, 1]`, then a per-search-type policy
//! decides what survives.

use crate::domain::foundation::ValidationError;
use crate::domain::vocab;

use super::hit::{ScoredCandidate, SearchHit};
use super::policy::{SearchPolicy, SearchType};

// Words too generic to carry relevance signal.
static STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "your", "our",
    "you", "a", "an", "of", "in", "on", "at", "to", "or", "is", "are",
    "by", "it", "its",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|s| *s == word)
}

/// Pre-analyzed query, computed once per filter call.
struct QueryView {
    normalized: String,
    tokens: Vec<String>,
    brand: Option<&'static str>,
    /// Digit-bearing tokens, treated as model numbers.
    model_tokens: Vec<String>,
}

impl QueryView {
    fn analyze(query: &str) -> Self {
        let tokens = vocab::tokens(query);
        let model_tokens = tokens
            .iter()
            .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
            .cloned()
            .collect();
        Self {
            normalized: query.trim().to_lowercase(),
            brand: vocab::find_brand(query),
            tokens,
            model_tokens,
        }
    }
}

/// Scores one candidate title against the query.
fn score_title(query: &QueryView, title: &str) -> f64 {
    let title_normalized = title.to_lowercase();
    let title_tokens = vocab::tokens(title);
    let mut score: f64 = 0.0;

    // Full query phrase inside the title is the strongest signal.
    if !query.normalized.is_empty() && title_normalized.contains(&query.normalized) {
        score += 1.0;
    }

    // Every query word present, in any order.
    let word_in_title = |word: &str| title_tokens.iter().any(|t| t == word);
    if !query.tokens.is_empty() && query.tokens.iter().all(|w| word_in_title(w)) {
        score += 0.8;
    }

    // Coverage of the non-trivial query words.
    let significant: Vec<&String> = query
        .tokens
        .iter()
        .filter(|w| w.len() > 2 && !is_stop_word(w))
        .collect();
    if !significant.is_empty() {
        let matched = significant.iter().filter(|w| word_in_title(w)).count();
        score += 0.5 * matched as f64 / significant.len() as f64;
    }

    // Relative word order of adjacent query-word pairs.
    if query.tokens.len() >= 2 {
        let first_position =
            |word: &str| title_tokens.iter().position(|t| t == word);
        let mut ordered_pairs = 0usize;
        for pair in query.tokens.windows(2) {
            if let (Some(a), Some(b)) = (first_position(&pair[0]), first_position(&pair[1])) {
                if a < b {
                    ordered_pairs += 1;
                }
            }
        }
        score += 0.3 * ordered_pairs as f64 / (query.tokens.len() - 1) as f64;
    }

    // Shared brand token.
    if let Some(brand) = query.brand {
        if title_tokens.iter().any(|t| t == brand) {
            score += 0.4;
        }
    }

    // Model numbers must match verbatim; a query with model numbers that
    // the title fails to carry is probably an adjacent model or accessory.
    if !query.model_tokens.is_empty() {
        if query.model_tokens.iter().any(|m| word_in_title(m)) {
            score += 0.5;
        } else {
            score -= 0.3;
        }
    }

    // Penalize titles padded with terms the query never asked about.
    let corresponds = |title_word: &str| {
        query
            .tokens
            .iter()
            .any(|q| q == title_word || q.contains(title_word) || title_word.contains(q.as_str()))
    };
    let off_query = title_tokens
        .iter()
        .filter(|t| t.len() > 3 && !is_stop_word(t) && !corresponds(t))
        .count();
    score -= 0.05 * off_query as f64;

    score.clamp(0.0, 1.0)
}

/// Outcome of one relevance evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceVerdict {
    /// Candidates that passed the policy, best first.
    pub kept: Vec<ScoredCandidate>,
    /// Mean score of the top `min(3, kept)` candidates.
    pub overall_score: f64,
    /// Whether the kept set is good enough to show.
    pub is_relevant: bool,
    /// Fallback suggestion when nothing relevant was kept.
    pub alternative_hint: Option<String>,
}

/// Scores raw search candidates and filters them by search-type policy.
pub struct RelevanceEngine {
    exact: SearchPolicy,
    parameters: SearchPolicy,
    category: SearchPolicy,
}

impl RelevanceEngine {
    /// Creates an engine with the default policy table.
    pub fn new() -> Self {
        Self {
            exact: SearchPolicy::default_for(SearchType::Exact),
            parameters: SearchPolicy::default_for(SearchType::Parameters),
            category: SearchPolicy::default_for(SearchType::Category),
        }
    }

    /// Overrides the policy for one search type.
    ///
    /// # Errors
    ///
    /// - propagates the policy's own validation errors
    pub fn with_policy(
        mut self,
        search_type: SearchType,
        threshold: f64,
        max_results: usize,
    ) -> Result<Self, ValidationError> {
        let policy = SearchPolicy::new(threshold, max_results)?;
        match search_type {
            SearchType::Exact => self.exact = policy,
            SearchType::Parameters => self.parameters = policy,
            SearchType::Category => self.category = policy,
        }
        Ok(self)
    }

    /// Returns the policy applied for a search type.
    pub fn policy(&self, search_type: SearchType) -> SearchPolicy {
        match search_type {
            SearchType::Exact => self.exact,
            SearchType::Parameters => self.parameters,
            SearchType::Category => self.category,
        }
    }

    /// Scores a single candidate against a query.
    pub fn score(&self, query: &str, candidate: &SearchHit) -> f64 {
        score_title(&QueryView::analyze(query), &candidate.title)
    }

    /// Scores, sorts, and filters a batch of raw candidates.
    ///
    /// Every input produces a verdict; there is no error path. An empty
    /// candidate list is never relevant.
    pub fn filter(
        &self,
        query: &str,
        candidates: Vec<SearchHit>,
        search_type: SearchType,
    ) -> RelevanceVerdict {
        if candidates.is_empty() {
            return RelevanceVerdict {
                kept: Vec::new(),
                overall_score: 0.0,
                is_relevant: false,
                alternative_hint: Some(format!("No products found for \"{}\"", query)),
            };
        }

        let view = QueryView::analyze(query);
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let score = score_title(&view, &candidate.title);
                ScoredCandidate { candidate, score }
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let policy = self.policy(search_type);
        let best_raw = scored[0].candidate.title.clone();

        let kept: Vec<ScoredCandidate> = scored
            .into_iter()
            .filter(|c| c.score >= policy.threshold)
            .take(policy.max_results)
            .collect();

        let top = kept.len().min(3);
        let overall_score = if top == 0 {
            0.0
        } else {
            kept[..top].iter().map(|c| c.score).sum::<f64>() / top as f64
        };
        let is_relevant = !kept.is_empty() && overall_score >= policy.threshold;

        let alternative_hint = if is_relevant {
            None
        } else {
            Some(format!("Closest available match: \"{}\"", best_raw))
        };

        RelevanceVerdict {
            kept,
            overall_score,
            is_relevant,
            alternative_hint,
        }
    }
}

impl Default for RelevanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
