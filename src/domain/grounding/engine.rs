//! The grounding decision cascade.
//!
//! Classifies one user message (plus recent turns) into a ground/no-ground
//! verdict. Like the depth optimizer, the cascade is an ordered rule list
//! evaluated first-match-wins; each branch fixes the verdict, reason, and
//! confidence, so priority between signals is explicit and every rule can
//! be tested on its own.

use chrono::{Datelike, Utc};

use crate::domain::cycle::{ChatRole, CycleEntry};
use crate::domain::vocab;

use super::decision::{GroundingDecision, GroundingReason};
use super::mode::GroundingMode;

// Curated brand+model phrases that always count as a specific model.
static MODEL_PHRASES: &[&str] = &[
    "iphone 14", "iphone 15", "iphone 16", "iphone 17",
    "galaxy s23", "galaxy s24", "galaxy s25", "galaxy z fold", "galaxy z flip",
    "pixel 8", "pixel 9", "pixel 10",
    "macbook air", "macbook pro", "ipad pro", "ipad air", "apple watch",
    "airpods pro", "airpods max",
    "playstation 5", "ps5", "xbox series x", "xbox series s", "nintendo switch",
    "surface pro", "surface laptop",
    "thinkpad x1", "legion 5",
];

// Model-line suffixes: "galaxy ultra", "airpods pro", "iphone plus".
static MODEL_SUFFIXES: &[&str] = &[
    "pro", "ultra", "plus", "max", "mini", "air", "lite", "se", "fold", "flip",
];

static VERIFICATION_PHRASES: &[&str] = &[
    "is there", "are there", "already out", "out yet", "in stock", "available",
    "can i buy", "can i get", "does it exist", "has it launched", "released yet",
    "still sold", "on sale",
];

static RECENCY_WORDS: &[&str] = &["new", "newest", "latest", "upcoming", "recent"];

static GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "good morning", "good afternoon", "good evening",
    "thanks", "thank you", "bye", "goodbye",
];

static SHORT_REPLY_TOKENS: &[&str] = &["yes", "no", "ok", "okay", "sure", "yep", "nope"];

static GENERIC_ASK_PHRASES: &[&str] = &["looking for", "i need", "i want"];

static TECH_SPEC_WORDS: &[&str] = &[
    "specs", "specifications", "processor", "cpu", "gpu", "ram", "battery",
    "display", "screen", "resolution", "storage", "chipset", "benchmark",
    "megapixel", "refresh",
];

/// Pre-analyzed view of one message against its recent history.
struct GroundingInput<'a> {
    normalized: String,
    tokens: Vec<String>,
    history: &'a [CycleEntry],
    min_words_for_product: usize,
    technical_spec_enabled: bool,
    advanced_stage_lookback: usize,
}

impl<'a> GroundingInput<'a> {
    fn analyze(message: &str, history: &'a [CycleEntry], mode: GroundingMode) -> Self {
        Self {
            normalized: message.trim().to_lowercase(),
            tokens: vocab::tokens(message),
            history,
            min_words_for_product: mode.min_words_for_product(),
            technical_spec_enabled: mode.technical_spec_enabled(),
            advanced_stage_lookback: mode.advanced_stage_lookback(),
        }
    }

    fn word_count(&self) -> usize {
        self.tokens.len()
    }

    fn has_any_token(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.tokens.iter().any(|t| t == w))
    }

    fn contains_any_phrase(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.normalized.contains(p))
    }
}

/// True when the phrase's tokens appear as a contiguous run in `tokens`.
///
/// Token-bounded, so "pixel 9" matches "the pixel 9 please" but not
/// "pixel 9a" or "pixel 90".
fn contains_token_run(tokens: &[String], phrase: &str) -> bool {
    let phrase_tokens = vocab::tokens(phrase);
    !phrase_tokens.is_empty()
        && tokens
            .windows(phrase_tokens.len())
            .any(|run| run.iter().zip(&phrase_tokens).all(|(a, b)| a == b))
}

/// Checks a single piece of text against the specific-model pattern.
///
/// Matches a curated brand+model phrase on whole-token boundaries, or a
/// digit-bearing token with a brand indicator in a query of
/// `min_words..=10` words, or a model-line suffix word in a query of at
/// least two words.
fn text_matches_specific_model(text: &str, min_words: usize) -> bool {
    let normalized = text.trim().to_lowercase();
    let tokens = vocab::tokens(text);
    if MODEL_PHRASES.iter().any(|p| contains_token_run(&tokens, p)) {
        return true;
    }

    let word_count = tokens.len();
    let has_digit_token = tokens.iter().any(|t| t.chars().any(|c| c.is_ascii_digit()));
    if has_digit_token
        && word_count >= min_words
        && word_count <= 10
        && vocab::find_brand(&normalized).is_some()
    {
        return true;
    }

    word_count >= 2
        && tokens
            .iter()
            .any(|t| MODEL_SUFFIXES.iter().any(|s| t == s))
}

fn matches_brand_selection(input: &GroundingInput) -> bool {
    if vocab::find_brand(&input.normalized).is_none() {
        return false;
    }
    // The most recent assistant turn must have asked which brand/model.
    input
        .history
        .iter()
        .rev()
        .find(|entry| entry.role == ChatRole::Assistant)
        .map(|entry| {
            let asked = entry.content.to_lowercase();
            asked.contains("which") && (asked.contains("brand") || asked.contains("model"))
        })
        .unwrap_or(false)
}

fn matches_specific_model(input: &GroundingInput) -> bool {
    text_matches_specific_model(&input.normalized, input.min_words_for_product)
}

fn matches_verification_intent(input: &GroundingInput) -> bool {
    input.contains_any_phrase(VERIFICATION_PHRASES)
}

fn matches_recency_intent(input: &GroundingInput) -> bool {
    if input.has_any_token(RECENCY_WORDS) {
        return true;
    }
    let current_year = Utc::now().year();
    let years = [current_year.to_string(), (current_year + 1).to_string()];
    input.tokens.iter().any(|t| years.iter().any(|y| t == y))
}

fn matches_simple_dialogue(input: &GroundingInput) -> bool {
    if GREETINGS.iter().any(|g| input.normalized == *g) {
        return true;
    }
    if input.word_count() <= 2 && input.has_any_token(SHORT_REPLY_TOKENS) {
        return true;
    }
    // A generic opening ask stays simple only while it names no model.
    input.contains_any_phrase(GENERIC_ASK_PHRASES)
        && input.word_count() <= 6
        && !matches_specific_model(input)
}

fn matches_advanced_stage(input: &GroundingInput) -> bool {
    if input.history.len() < input.advanced_stage_lookback {
        return false;
    }
    let start = input.history.len().saturating_sub(4);
    input.history[start..]
        .iter()
        .any(|entry| text_matches_specific_model(&entry.content, input.min_words_for_product))
}

fn matches_technical_specs(input: &GroundingInput) -> bool {
    input.technical_spec_enabled && input.has_any_token(TECH_SPEC_WORDS)
}

/// One step of the cascade.
struct GroundingRule {
    name: &'static str,
    decision: GroundingDecision,
    applies: fn(&GroundingInput) -> bool,
}

/// Decides, per message, whether the AI reply should be search-grounded.
pub struct GroundingEngine {
    mode: GroundingMode,
    rules: Vec<GroundingRule>,
}

impl GroundingEngine {
    /// Creates an engine with the standard cascade under the given mode.
    pub fn new(mode: GroundingMode) -> Self {
        Self {
            mode,
            rules: vec![
                GroundingRule {
                    name: "brand_selection",
                    decision: GroundingDecision::ground(
                        GroundingReason::BrandSelectionLatestModels,
                        0.98,
                    ),
                    applies: matches_brand_selection,
                },
                GroundingRule {
                    name: "specific_model",
                    decision: GroundingDecision::ground(
                        GroundingReason::SpecificProductVerification,
                        0.95,
                    ),
                    applies: matches_specific_model,
                },
                GroundingRule {
                    name: "verification_intent",
                    decision: GroundingDecision::ground(GroundingReason::VerificationIntent, 0.9),
                    applies: matches_verification_intent,
                },
                GroundingRule {
                    name: "recency_intent",
                    decision: GroundingDecision::ground(GroundingReason::RecencyIntent, 0.85),
                    applies: matches_recency_intent,
                },
                GroundingRule {
                    name: "simple_dialogue",
                    decision: GroundingDecision::skip(GroundingReason::SimpleDialogue, 0.95),
                    applies: matches_simple_dialogue,
                },
                GroundingRule {
                    name: "advanced_stage",
                    decision: GroundingDecision::ground(
                        GroundingReason::AdvancedDialogueStage,
                        0.7,
                    ),
                    applies: matches_advanced_stage,
                },
                GroundingRule {
                    name: "technical_specs",
                    decision: GroundingDecision::ground(GroundingReason::TechnicalSpecs, 0.6),
                    applies: matches_technical_specs,
                },
            ],
        }
    }

    /// Returns the configured mode.
    pub fn mode(&self) -> GroundingMode {
        self.mode
    }

    /// Classifies one message against its recent history.
    ///
    /// Every input produces a decision; there is no error path. Unmatched
    /// messages fall back to no-ground with moderate confidence.
    pub fn decide(&self, message: &str, recent_history: &[CycleEntry]) -> GroundingDecision {
        let input = GroundingInput::analyze(message, recent_history, self.mode);
        self.rules
            .iter()
            .find(|rule| (rule.applies)(&input))
            .map(|rule| rule.decision)
            .unwrap_or_else(|| GroundingDecision::skip(GroundingReason::GeneralQuery, 0.75))
    }

    /// Returns the cascade's rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

impl Default for GroundingEngine {
    fn default() -> Self {
        Self::new(GroundingMode::default())
    }
}
