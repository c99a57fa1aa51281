//! ChatTurn command handler.
//!
//! Orchestrates one full turn: load the session, pick a context depth,
//! decide grounding, call the AI backend with a rotated credential, run
//! and filter the product search when the reply asks for one, then fold
//! everything back into the session and save it with optimistic
//! concurrency.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, instrument, warn};

use crate::adapters::{CredentialRotator, RotationError};
use crate::domain::cycle::{ChatRole, CycleManager, ProductRef};
use crate::domain::depth::{ContextDepth, ContextDepthOptimizer};
use crate::domain::foundation::SessionId;
use crate::domain::grounding::{GroundingDecision, GroundingEngine, GroundingStats};
use crate::domain::relevance::{RelevanceEngine, RelevanceVerdict, ScoredCandidate, SearchType};
use crate::domain::session::Session;
use crate::ports::{
    AssistantClient, AssistantReply, AssistantRequest, ProductSearchClient, ResponseType,
    SearchError, SessionStore, SessionStoreError,
};

/// Attempts made against the AI backend before giving up on the turn.
const MAX_AI_ATTEMPTS: u32 = 3;

/// Base delay between AI retries; multiplied by the attempt number.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Reply shown when the AI backend stays down for the whole turn.
const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble answering right now. Please try again in a moment.";

/// History entries packaged at minimal depth.
const MINIMAL_WINDOW: usize = 2;

/// Command to process one user message in a session.
#[derive(Debug, Clone)]
pub struct ChatTurnCommand {
    /// The session this turn belongs to.
    pub session_id: SessionId,
    /// The user's message.
    pub message: String,
}

impl ChatTurnCommand {
    /// Creates a new chat turn command.
    pub fn new(session_id: SessionId, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
        }
    }
}

/// Errors that can occur while processing a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Message content is empty or whitespace only.
    #[error("Validation error: message cannot be empty")]
    EmptyMessage,

    /// No session exists under the given id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The session store rejected the read or write.
    #[error(transparent)]
    Store(#[from] SessionStoreError),

    /// The search provider failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Credential rotation failed.
    #[error(transparent)]
    Rotation(#[from] RotationError),
}

/// Result of one processed turn.
#[derive(Debug, Clone)]
pub struct ChatTurnResult {
    /// Final reply text shown to the user.
    pub reply: String,
    /// How much context was packaged for the AI call.
    pub depth: ContextDepth,
    /// The grounding verdict for this turn.
    pub grounding: GroundingDecision,
    /// Relevance verdict, when a product search ran.
    pub verdict: Option<RelevanceVerdict>,
    /// True when this turn exhausted the cycle window.
    pub cycle_rolled_over: bool,
    /// True when the rolling summary should be regenerated.
    pub summary_refresh_due: bool,
}

/// The decision engines a handler drives.
///
/// Grouped so the handler constructor stays readable; all four are built
/// once at startup from configuration.
pub struct TurnEngines {
    /// Cycle lifecycle policy.
    pub cycles: CycleManager,
    /// Context depth selection.
    pub depth: ContextDepthOptimizer,
    /// Ground/no-ground cascade.
    pub grounding: GroundingEngine,
    /// Search candidate scoring and filtering.
    pub relevance: RelevanceEngine,
}

/// Handler for chat turn commands.
pub struct ChatTurnHandler {
    assistant: Arc<dyn AssistantClient>,
    search: Arc<dyn ProductSearchClient>,
    sessions: Arc<dyn SessionStore>,
    assistant_credentials: Arc<CredentialRotator>,
    search_credentials: Arc<CredentialRotator>,
    engines: TurnEngines,
    stats: Arc<GroundingStats>,
}

impl ChatTurnHandler {
    /// Creates a handler with the given dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        assistant: Arc<dyn AssistantClient>,
        search: Arc<dyn ProductSearchClient>,
        sessions: Arc<dyn SessionStore>,
        assistant_credentials: Arc<CredentialRotator>,
        search_credentials: Arc<CredentialRotator>,
        engines: TurnEngines,
        stats: Arc<GroundingStats>,
    ) -> Self {
        Self {
            assistant,
            search,
            sessions,
            assistant_credentials,
            search_credentials,
            engines,
            stats,
        }
    }

    /// Processes one user message.
    #[instrument(skip(self, cmd), fields(session_id = %cmd.session_id))]
    pub async fn handle(&self, cmd: ChatTurnCommand) -> Result<ChatTurnResult, TurnError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let mut session = self
            .sessions
            .load(&cmd.session_id)
            .await?
            .ok_or(TurnError::SessionNotFound(cmd.session_id))?;

        let depth = self.engines.depth.decide(message, &session);
        let grounding = self
            .engines
            .grounding
            .decide(message, session.cycle().history());
        self.stats.record(&grounding);

        debug!(
            depth = %depth,
            should_ground = grounding.should_ground,
            reason = %grounding.reason,
            confidence = grounding.confidence,
            "turn analyzed"
        );

        let request = self.package_request(message, &session, depth, grounding.should_ground);
        let reply = self.call_assistant(&request).await?;

        let mut final_output = reply.output.clone();
        let mut verdict = None;
        let mut shown_products: Vec<ProductRef> = Vec::new();
        let mut search_phrase = None;

        if reply.response_type == ResponseType::Search {
            if let Some(phrase) = reply.search_phrase.as_deref() {
                let search_type = reply.search_type.unwrap_or(SearchType::Exact);
                let v = self.run_search(phrase, search_type).await?;

                if v.is_relevant {
                    final_output.push_str("\n\n");
                    final_output.push_str(&render_candidates(&v.kept));
                    shown_products = v
                        .kept
                        .iter()
                        .map(|c| ProductRef::new(c.candidate.title.clone(), c.candidate.price))
                        .collect();
                } else if let Some(hint) = &v.alternative_hint {
                    final_output.push_str("\n\n");
                    final_output.push_str(hint);
                }

                verdict = Some(v);
                search_phrase = Some(phrase.to_string());
            }
        }

        if let Some(category) = &reply.category {
            session.set_category(category.clone());
        }

        session.cycle_mut().record(ChatRole::User, message);
        session
            .cycle_mut()
            .record(ChatRole::Assistant, final_output.clone());

        let summary_refresh_due = self.engines.depth.should_refresh_summary(&session);

        let advanced = self.engines.cycles.increment_iteration(session.cycle_mut());
        let cycle_rolled_over = !advanced;
        if cycle_rolled_over {
            let last_request = search_phrase
                .clone()
                .unwrap_or_else(|| message.to_string());
            self.engines
                .cycles
                .start_new_cycle(session.cycle_mut(), last_request, shown_products);
            info!(cycle_id = session.cycle().cycle_id(), "cycle rolled over");
        }

        self.sessions.save(&mut session).await?;

        Ok(ChatTurnResult {
            reply: final_output,
            depth,
            grounding,
            verdict,
            cycle_rolled_over,
            summary_refresh_due,
        })
    }

    /// Packages the bounded context for one AI call.
    ///
    /// Minimal depth carries only the last exchange; medium carries the
    /// window of recent history; full additionally renders the session
    /// state block.
    fn package_request(
        &self,
        message: &str,
        session: &Session,
        depth: ContextDepth,
        grounding: bool,
    ) -> AssistantRequest {
        let history = session.cycle().history();
        let window = match depth {
            ContextDepth::Minimal => MINIMAL_WINDOW,
            ContextDepth::Medium | ContextDepth::Full => {
                self.engines.cycles.max_iterations() as usize
            }
        };
        let start = history.len().saturating_sub(window);

        let mut request =
            AssistantRequest::new(session.locale().clone()).with_grounding(grounding);
        for entry in &history[start..] {
            request = request.with_message(entry.role, entry.content.clone());
        }
        request = request.with_message(ChatRole::User, message);

        if depth == ContextDepth::Full {
            request = request.with_state_context(
                self.engines
                    .cycles
                    .render_state_context(session.cycle(), session.current_category()),
            );
        }

        request
    }

    /// Calls the AI backend with rotation, retry, and usage accounting.
    ///
    /// Each attempt draws a fresh credential. Retryable failures back off
    /// linearly; a non-retryable failure or exhausted attempts degrade to
    /// the fixed fallback reply so the turn still completes.
    async fn call_assistant(&self, request: &AssistantRequest) -> Result<AssistantReply, TurnError> {
        for attempt in 1..=MAX_AI_ATTEMPTS {
            let issued = self.assistant_credentials.next().await?;
            let started = Instant::now();

            match self.assistant.generate(request, &issued.secret).await {
                Ok(reply) => {
                    self.assistant_credentials
                        .record_usage(issued.index, true, started.elapsed());
                    return Ok(reply);
                }
                Err(e) => {
                    self.assistant_credentials
                        .record_usage(issued.index, false, started.elapsed());
                    warn!(attempt, error = %e, "AI call failed");
                    if !e.is_retryable() {
                        break;
                    }
                    if attempt < MAX_AI_ATTEMPTS {
                        sleep(RETRY_BASE_DELAY * attempt).await;
                    }
                }
            }
        }

        Ok(AssistantReply::chat(FALLBACK_REPLY))
    }

    /// Runs one product search and filters the raw candidates.
    async fn run_search(
        &self,
        phrase: &str,
        search_type: SearchType,
    ) -> Result<RelevanceVerdict, TurnError> {
        let issued = self.search_credentials.next().await?;
        let started = Instant::now();

        let result = self.search.search(phrase, &issued.secret).await;
        self.search_credentials
            .record_usage(issued.index, result.is_ok(), started.elapsed());

        let hits = result?;
        let verdict = self.engines.relevance.filter(phrase, hits, search_type);
        debug!(
            phrase,
            search_type = %search_type,
            kept = verdict.kept.len(),
            overall_score = verdict.overall_score,
            is_relevant = verdict.is_relevant,
            "search candidates filtered"
        );
        Ok(verdict)
    }
}

/// Renders the kept candidates as a product list appended to the reply.
fn render_candidates(kept: &[ScoredCandidate]) -> String {
    kept.iter()
        .map(|c| {
            let hit = &c.candidate;
            let mut line = format!("- {}", hit.title);
            if let Some(price) = hit.price {
                line.push_str(&format!(" ({:.2})", price));
            }
            if let Some(merchant) = &hit.merchant {
                line.push_str(&format!(" at {}", merchant));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
