//! Context depth selection for each chat turn.
//!
//! Decides how much conversation history and preference detail gets
//! packaged into the AI request. The cascade is an ordered rule list,
//! first match wins, so the priority between rules is explicit and each
//! rule stays independently testable.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::cycle::DEFAULT_MAX_ITERATIONS;
use crate::domain::foundation::ValidationError;
use crate::domain::session::Session;
use crate::domain::vocab;

/// A context summary older than this (relative to the session's last
/// update) is considered stale.
pub const SUMMARY_STALE_AFTER_SECS: i64 = 300;

/// How much context to package into an AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDepth {
    /// Last exchange only; the message is a small refinement.
    Minimal,
    /// Bounded recent history.
    Medium,
    /// Bounded history plus full rendered session state.
    Full,
}

impl ContextDepth {
    /// Returns the string representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextDepth::Minimal => "minimal",
            ContextDepth::Medium => "medium",
            ContextDepth::Full => "full",
        }
    }
}

impl std::fmt::Display for ContextDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Simple refinement phrases: direction changes on price, size/storage,
// color/variant, or quantity. Matching any of these on a short message
// means the previous context already says what the user is refining.
static MODIFIER_PHRASES: &[&str] = &[
    "cheaper", "cheapest", "more expensive", "less expensive", "lower price", "higher price",
    "bigger", "smaller", "larger", "more storage", "less storage", "more memory",
    "different color", "other color", "another color", "in black", "in white",
    "other model", "another one", "more options", "show more", "show another",
];

static CONFIRMATION_TOKENS: &[&str] = &[
    "yes", "no", "ok", "okay", "sure", "show", "this", "that",
    "first", "second", "third", "1st", "2nd", "3rd",
];

static CLARIFICATION_WORDS: &[&str] = &["what", "which", "how", "why", "when", "where", "who"];

static CLARIFICATION_PHRASES: &[&str] = &[
    "looking for", "i need", "i want", "help me", "prefer", "recommend", "suggest",
];

static PRICE_WORDS: &[&str] = &["price", "budget", "under", "cheap", "cheaper", "expensive", "cost", "afford"];

static FEATURE_WORDS: &[&str] = &[
    "waterproof", "wireless", "battery", "screen", "display", "storage", "memory",
    "ram", "camera", "sleeve", "capacity", "lightweight", "bluetooth", "portable",
    "rechargeable", "noise", "zoom", "resolution",
];

static CONDITION_WORDS: &[&str] = &["new", "used", "refurbished", "sealed", "unopened"];

/// Category keyword table for coarse category detection.
static CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("smartphones", &["phone", "smartphone", "iphone", "galaxy", "pixel"]),
    ("laptops", &["laptop", "notebook", "macbook", "ultrabook", "chromebook"]),
    ("tablets", &["tablet", "ipad"]),
    ("headphones", &["headphones", "earbuds", "airpods", "headset"]),
    ("tvs", &["tv", "television", "oled"]),
    ("cameras", &["camera", "dslr", "gopro"]),
    ("monitors", &["monitor"]),
    ("wearables", &["smartwatch", "watch", "fitbit"]),
    ("consoles", &["console", "playstation", "xbox", "switch"]),
    ("appliances", &["vacuum", "fridge", "refrigerator", "washer", "microwave", "kettle"]),
    ("bags", &["backpack", "bag", "suitcase", "luggage"]),
    ("shoes", &["shoes", "sneakers", "boots", "sandals"]),
    ("clothing", &["jacket", "shirt", "jeans", "dress", "hoodie"]),
];

/// Categories that belong to the same coarse shopping group.
static COARSE_GROUPS: &[(&str, &[&str])] = &[
    (
        "electronics",
        &[
            "smartphones", "laptops", "tablets", "headphones", "tvs",
            "cameras", "monitors", "wearables", "consoles",
        ],
    ),
    ("fashion", &["shoes", "bags", "clothing"]),
    ("home", &["appliances"]),
];

/// Pre-analyzed view of one user message against its session.
struct DepthInput<'a> {
    raw: &'a str,
    normalized: String,
    tokens: Vec<String>,
    session_category: Option<&'a str>,
    detected_category: Option<&'static str>,
}

impl<'a> DepthInput<'a> {
    fn analyze(message: &'a str, session: &'a Session) -> Self {
        let tokens = vocab::tokens(message);
        let detected_category = detect_category(&tokens);
        Self {
            raw: message,
            normalized: message.trim().to_lowercase(),
            tokens,
            session_category: session.current_category(),
            detected_category,
        }
    }

    fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    fn has_any_token(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has_token(w))
    }
}

/// Detects the first category whose keywords appear in the tokens.
fn detect_category(tokens: &[String]) -> Option<&'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| tokens.iter().any(|t| t == k)))
        .map(|(category, _)| *category)
}

/// Two categories are related when one name contains the other or both
/// fall in the same coarse group.
fn categories_related(current: &str, detected: &str) -> bool {
    let current = current.to_lowercase();
    if current.contains(detected) || detected.contains(current.as_str()) {
        return true;
    }
    COARSE_GROUPS.iter().any(|(_, members)| {
        members.iter().any(|m| *m == current)
            && members.iter().any(|m| *m == detected)
    })
}

fn matches_simple_modifier(input: &DepthInput) -> bool {
    input.tokens.len() <= 6
        && MODIFIER_PHRASES.iter().any(|p| input.normalized.contains(p))
}

fn matches_short_confirmation(input: &DepthInput) -> bool {
    input.raw.trim().chars().count() <= 30 && input.has_any_token(CONFIRMATION_TOKENS)
}

fn matches_category_shift(input: &DepthInput) -> bool {
    let current = match input.session_category {
        None => return true,
        Some(current) => current,
    };
    match input.detected_category {
        Some(detected) => !categories_related(current, detected),
        None => false,
    }
}

fn matches_requirement_details(input: &DepthInput) -> bool {
    let mut signals = 0;
    if input.normalized.contains('$')
        || input.normalized.contains('€')
        || input.has_any_token(PRICE_WORDS)
    {
        signals += 1;
    }
    if input.has_any_token(FEATURE_WORDS) {
        signals += 1;
    }
    if vocab::find_brand(&input.normalized).is_some() {
        signals += 1;
    }
    if input.has_any_token(CONDITION_WORDS) || input.normalized.contains("open box") {
        signals += 1;
    }
    if signals >= 3 {
        return true;
    }
    input.raw.chars().count() > 100 && input.raw.matches(',').count() >= 2
}

fn matches_clarification(input: &DepthInput) -> bool {
    input.has_any_token(CLARIFICATION_WORDS)
        || CLARIFICATION_PHRASES.iter().any(|p| input.normalized.contains(p))
}

/// One step of the cascade.
struct DepthRule {
    name: &'static str,
    depth: ContextDepth,
    applies: fn(&DepthInput) -> bool,
}

/// Decides the context depth for each turn and when the rolling summary
/// needs refreshing.
pub struct ContextDepthOptimizer {
    rules: Vec<DepthRule>,
    max_iterations: u32,
}

impl ContextDepthOptimizer {
    /// Creates an optimizer with the standard cascade.
    pub fn new() -> Self {
        Self {
            rules: vec![
                DepthRule {
                    name: "simple_modifier",
                    depth: ContextDepth::Minimal,
                    applies: matches_simple_modifier,
                },
                DepthRule {
                    name: "short_confirmation",
                    depth: ContextDepth::Minimal,
                    applies: matches_short_confirmation,
                },
                DepthRule {
                    name: "category_shift",
                    depth: ContextDepth::Full,
                    applies: matches_category_shift,
                },
                DepthRule {
                    name: "requirement_details",
                    depth: ContextDepth::Full,
                    applies: matches_requirement_details,
                },
                DepthRule {
                    name: "clarification",
                    depth: ContextDepth::Medium,
                    applies: matches_clarification,
                },
            ],
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Overrides the window bound used by the refresh policy.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `max_iterations` is zero
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self, ValidationError> {
        if max_iterations == 0 {
            return Err(ValidationError::out_of_range(
                "max_iterations",
                1,
                i32::MAX,
                0,
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    /// Picks the context depth for one user message.
    ///
    /// Every input produces a tier; there is no error path. Unmatched
    /// messages default to `Medium`.
    pub fn decide(&self, message: &str, session: &Session) -> ContextDepth {
        let input = DepthInput::analyze(message, session);
        self.rules
            .iter()
            .find(|rule| (rule.applies)(&input))
            .map(|rule| rule.depth)
            .unwrap_or(ContextDepth::Medium)
    }

    /// Checks whether the rolling summary should be refreshed this turn.
    ///
    /// True every third iteration, at the end of the window, when no
    /// summary exists yet, or when the stored summary has fallen more
    /// than five minutes behind the session's last update.
    pub fn should_refresh_summary(&self, session: &Session) -> bool {
        let iteration = session.cycle().iteration();
        if iteration % 3 == 0 || iteration >= self.max_iterations {
            return true;
        }
        match session.context_summary() {
            None => true,
            Some(summary) => {
                summary.age_relative_to(session.updated_at())
                    > Duration::seconds(SUMMARY_STALE_AFTER_SECS)
            }
        }
    }

    /// Returns the cascade's rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

impl Default for ContextDepthOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
