//! Cycle state: the bounded conversation window embedded in a session.
//!
//! A cycle is a window of up to `max_iterations` turns. When the window
//! is exhausted the cycle rolls over: a compact snapshot of the ending
//! cycle is retained and the turn history starts fresh. The confirmed
//! product shortlist survives rollover.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// User input.
    User,
    /// Assistant reply.
    Assistant,
}

impl ChatRole {
    /// Returns the string representation used in rendered context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded turn within the active cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEntry {
    /// Who authored the turn.
    pub role: ChatRole,
    /// The turn text.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: Timestamp,
}

impl CycleEntry {
    /// Creates a user entry stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Creates an assistant entry stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }
}

/// A product reference captured in a cycle snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product name as shown to the user.
    pub name: String,
    /// Price if one was known at capture time.
    pub price: Option<f64>,
}

impl ProductRef {
    /// Creates a product reference.
    pub fn new(name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.price {
            Some(price) => write!(f, "{} (${})", self.name, price),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Snapshot of a finished cycle, captured at rollover.
///
/// Only the immediately previous cycle matters, so at most one snapshot
/// is retained per session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// Product groups discussed in the finished cycle.
    pub groups: Vec<String>,
    /// Product subgroups discussed in the finished cycle.
    pub subgroups: Vec<String>,
    /// Products surfaced to the user in the finished cycle.
    pub products: Vec<ProductRef>,
    /// The final search request or user ask of the finished cycle.
    pub last_request: String,
}

impl CycleSnapshot {
    /// Renders a one-line summary for inclusion in state context.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.last_request.is_empty() {
            parts.push(format!("last request \"{}\"", self.last_request));
        }
        if !self.groups.is_empty() {
            parts.push(format!("groups: {}", self.groups.join(", ")));
        }
        if !self.subgroups.is_empty() {
            parts.push(format!("subgroups: {}", self.subgroups.join(", ")));
        }
        if !self.products.is_empty() {
            let products: Vec<String> = self.products.iter().map(|p| p.to_string()).collect();
            parts.push(format!("products shown: {}", products.join(", ")));
        }
        if parts.is_empty() {
            "no details captured".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Conversation state for one session, bounded by the cycle window.
///
/// # Invariants
///
/// - `cycle_id` starts at 1 and only increases
/// - `iteration` stays within `[1, max_iterations]`; the bound is
///   enforced by [`CycleManager`](super::CycleManager)
/// - `cycle_history` is append-only within a cycle and cleared at rollover
/// - `last_defined` is an ordered set: no duplicate names, insertion order kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    cycle_id: u64,
    iteration: u32,
    cycle_history: Vec<CycleEntry>,
    last_cycle_context: Option<CycleSnapshot>,
    last_defined: Vec<String>,
    prompt_id: String,
    prompt_hash: String,
}

impl CycleState {
    /// Creates the state for a brand-new session.
    pub(crate) fn initial(prompt_id: String, prompt_hash: String) -> Self {
        Self {
            cycle_id: 1,
            iteration: 1,
            cycle_history: Vec::new(),
            last_cycle_context: None,
            last_defined: Vec::new(),
            prompt_id,
            prompt_hash,
        }
    }

    /// Reconstitute cycle state from persistence (no validation).
    pub fn reconstitute(
        cycle_id: u64,
        iteration: u32,
        cycle_history: Vec<CycleEntry>,
        last_cycle_context: Option<CycleSnapshot>,
        last_defined: Vec<String>,
        prompt_id: String,
        prompt_hash: String,
    ) -> Self {
        Self {
            cycle_id,
            iteration,
            cycle_history,
            last_cycle_context,
            last_defined,
            prompt_id,
            prompt_hash,
        }
    }

    /// Returns the current cycle number.
    pub fn cycle_id(&self) -> u64 {
        self.cycle_id
    }

    /// Returns the turn counter within the current cycle.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Returns the full recorded history of the current cycle.
    pub fn history(&self) -> &[CycleEntry] {
        &self.cycle_history
    }

    /// Returns the snapshot of the previous cycle, if one finished.
    pub fn last_cycle_context(&self) -> Option<&CycleSnapshot> {
        self.last_cycle_context.as_ref()
    }

    /// Returns the confirmed product shortlist.
    pub fn last_defined(&self) -> &[String] {
        &self.last_defined
    }

    /// Returns the identifier of the instruction text in use.
    pub fn prompt_id(&self) -> &str {
        &self.prompt_id
    }

    /// Returns the fingerprint of the instruction text in use.
    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    /// Appends a timestamped turn to the current cycle.
    ///
    /// Has no effect on `iteration` or `cycle_id`.
    pub fn record(&mut self, role: ChatRole, content: impl Into<String>) {
        self.cycle_history.push(CycleEntry {
            role,
            content: content.into(),
            timestamp: Timestamp::now(),
        });
    }

    /// Adds a product name to the confirmed shortlist.
    ///
    /// Duplicates are ignored so the shortlist stays an ordered set.
    /// Returns `true` if the name was newly added.
    pub fn confirm_product(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() || self.last_defined.contains(&name) {
            return false;
        }
        self.last_defined.push(name);
        true
    }

    /// Advances the iteration counter without bound checking.
    ///
    /// The bound lives in `CycleManager::increment_iteration`.
    pub(crate) fn advance(&mut self) {
        self.iteration += 1;
    }

    /// Rolls the window over: retains the snapshot, starts cycle N+1.
    ///
    /// `last_defined` is intentionally left untouched.
    pub(crate) fn roll_over(&mut self, snapshot: CycleSnapshot) {
        self.last_cycle_context = Some(snapshot);
        self.cycle_id += 1;
        self.iteration = 1;
        self.cycle_history.clear();
    }
}
