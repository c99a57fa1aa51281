//! AI backend port - request/reply shapes and the generation contract.
//!
//! This core never issues the AI call itself; it packages the bounded
//! context and the grounding flag into a request, and parses the typed
//! reply shape out of whatever the concrete client returns.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cycle::ChatRole;
use crate::domain::relevance::SearchType;
use crate::domain::session::Locale;

/// One conversation message forwarded to the AI backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl TurnMessage {
    /// Creates a message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request to the AI backend for one turn.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    /// Conversation messages, oldest first, ending with the user's turn.
    pub messages: Vec<TurnMessage>,
    /// Rendered session-state block, present only at full context depth.
    pub state_context: Option<String>,
    /// Whether the reply should be augmented with live search.
    pub grounding: bool,
    /// Language and market of the shopper.
    pub locale: Locale,
}

impl AssistantRequest {
    /// Creates an empty request for a locale.
    pub fn new(locale: Locale) -> Self {
        Self {
            messages: Vec::new(),
            state_context: None,
            grounding: false,
            locale,
        }
    }

    /// Appends a conversation message.
    pub fn with_message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(TurnMessage::new(role, content));
        self
    }

    /// Attaches the rendered state block.
    pub fn with_state_context(mut self, context: impl Into<String>) -> Self {
        self.state_context = Some(context.into());
        self
    }

    /// Sets the grounding flag.
    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }
}

/// What kind of reply the AI produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Plain conversational reply.
    Chat,
    /// The AI wants a product search run before answering fully.
    Search,
}

/// Typed reply parsed out of the AI backend's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Reply kind.
    pub response_type: ResponseType,
    /// Conversational text to show the user.
    pub output: String,
    /// Search phrase, when the reply requests a search.
    pub search_phrase: Option<String>,
    /// Search type policy hint, when the reply requests a search.
    pub search_type: Option<SearchType>,
    /// Product category the AI identified, if any.
    pub category: Option<String>,
}

impl AssistantReply {
    /// Creates a plain chat reply.
    pub fn chat(output: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Chat,
            output: output.into(),
            search_phrase: None,
            search_type: None,
            category: None,
        }
    }

    /// Creates a reply requesting a product search.
    pub fn search(
        output: impl Into<String>,
        phrase: impl Into<String>,
        search_type: SearchType,
    ) -> Self {
        Self {
            response_type: ResponseType::Search,
            output: output.into(),
            search_phrase: Some(phrase.into()),
            search_type: Some(search_type),
            category: None,
        }
    }

    /// Sets the identified category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Errors from the AI backend.
#[derive(Debug, Clone, Error)]
pub enum AssistantError {
    /// The backend could not be reached or returned a server error.
    #[error("AI backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the call for quota reasons.
    #[error("AI backend rate limited")]
    RateLimited,

    /// The backend answered but the reply shape could not be parsed.
    #[error("Failed to parse AI reply: {0}")]
    Parse(String),

    /// The call did not finish in time.
    #[error("AI call timed out")]
    Timeout,
}

impl AssistantError {
    /// Whether a retry with the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssistantError::Unavailable(_)
            | AssistantError::RateLimited
            | AssistantError::Timeout => true,
            AssistantError::Parse(_) => false,
        }
    }
}

/// Port for the generative AI backend.
///
/// The credential is passed per call so the rotator governs which pool
/// key each outbound request uses.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Generates one reply for the packaged turn.
    async fn generate(
        &self,
        request: &AssistantRequest,
        credential: &SecretString,
    ) -> Result<AssistantReply, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale() -> Locale {
        Locale::new("en", "US").unwrap()
    }

    #[test]
    fn builder_accumulates_messages() {
        let request = AssistantRequest::new(locale())
            .with_message(ChatRole::User, "hi")
            .with_message(ChatRole::Assistant, "hello!")
            .with_message(ChatRole::User, "show me laptops")
            .with_grounding(true)
            .with_state_context("Cycle 1, iteration 2 of 6.");

        assert_eq!(request.messages.len(), 3);
        assert!(request.grounding);
        assert!(request.state_context.unwrap().contains("Cycle 1"));
    }

    #[test]
    fn reply_parses_from_wire_json() {
        let json = r#"{
            "response_type": "search",
            "output": "Let me look that up.",
            "search_phrase": "iphone 15",
            "search_type": "exact",
            "category": "smartphones"
        }"#;

        let reply: AssistantReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.response_type, ResponseType::Search);
        assert_eq!(reply.search_phrase.as_deref(), Some("iphone 15"));
        assert_eq!(reply.search_type, Some(SearchType::Exact));
        assert_eq!(reply.category.as_deref(), Some("smartphones"));
    }

    #[test]
    fn chat_constructor_leaves_search_fields_empty() {
        let reply = AssistantReply::chat("Happy to help!");
        assert_eq!(reply.response_type, ResponseType::Chat);
        assert!(reply.search_phrase.is_none());
        assert!(reply.search_type.is_none());
    }

    #[test]
    fn retryability_excludes_parse_failures() {
        assert!(AssistantError::Unavailable("502".into()).is_retryable());
        assert!(AssistantError::RateLimited.is_retryable());
        assert!(AssistantError::Timeout.is_retryable());
        assert!(!AssistantError::Parse("bad json".into()).is_retryable());
    }
}
