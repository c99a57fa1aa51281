//! Integration tests for the full chat turn flow.
//!
//! These tests wire the real decision engines (depth, grounding,
//! relevance, cycle lifecycle) and the real credential rotator against
//! in-memory adapters and scripted AI/search clients, then drive whole
//! conversations through the handler:
//! 1. Depth and grounding are decided per message
//! 2. The AI call is made with a rotated credential
//! 3. Search replies are filtered and folded into the answer
//! 4. The session is saved with optimistic concurrency
//! 5. The cycle rolls over when the window is exhausted

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use shopguide::adapters::{CredentialRotator, InMemorySessionStore, InMemorySharedCounter};
use shopguide::application::{ChatTurnCommand, ChatTurnHandler, TurnEngines};
use shopguide::domain::cycle::{CycleManager, PromptVersion};
use shopguide::domain::depth::{ContextDepth, ContextDepthOptimizer};
use shopguide::domain::foundation::SessionId;
use shopguide::domain::grounding::{GroundingEngine, GroundingMode, GroundingStats};
use shopguide::domain::relevance::{RelevanceEngine, SearchHit, SearchType};
use shopguide::domain::session::{Locale, Session};
use shopguide::ports::{
    AssistantClient, AssistantError, AssistantReply, AssistantRequest, ProductSearchClient,
    SearchError, SessionStore,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Installs a test subscriber so `RUST_LOG` surfaces handler tracing.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// AI client that replays a fixed script of replies.
struct ScriptedAssistant {
    replies: Mutex<VecDeque<AssistantReply>>,
    credentials_seen: Mutex<Vec<String>>,
}

impl ScriptedAssistant {
    fn with(replies: Vec<AssistantReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            credentials_seen: Mutex::new(Vec::new()),
        }
    }

    fn credentials_seen(&self) -> Vec<String> {
        self.credentials_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantClient for ScriptedAssistant {
    async fn generate(
        &self,
        _request: &AssistantRequest,
        credential: &SecretString,
    ) -> Result<AssistantReply, AssistantError> {
        self.credentials_seen
            .lock()
            .unwrap()
            .push(credential.expose_secret().to_string());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| AssistantReply::chat("Anything else?")))
    }
}

/// Search client returning a fixed candidate list.
struct FixedSearch {
    hits: Vec<SearchHit>,
}

#[async_trait]
impl ProductSearchClient for FixedSearch {
    async fn search(
        &self,
        _phrase: &str,
        _credential: &SecretString,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(self.hits.clone())
    }
}

fn rotator(service: &str, keys: &[&str]) -> Arc<CredentialRotator> {
    let pool = keys
        .iter()
        .map(|k| SecretString::from(k.to_string()))
        .collect();
    Arc::new(CredentialRotator::new(
        service,
        pool,
        Arc::new(InMemorySharedCounter::new()),
    ))
}

fn engines() -> TurnEngines {
    TurnEngines {
        cycles: CycleManager::new(PromptVersion::fingerprint("v1", "shopping instructions")),
        depth: ContextDepthOptimizer::new(),
        grounding: GroundingEngine::new(GroundingMode::Balanced),
        relevance: RelevanceEngine::new(),
    }
}

fn seeded_session(store: &InMemorySessionStore) -> SessionId {
    let manager = CycleManager::new(PromptVersion::fingerprint("v1", "shopping instructions"));
    let session = Session::new(
        SessionId::new(),
        Locale::new("en", "US").unwrap(),
        manager.initialize(),
    );
    let id = *session.id();
    store.seed(session);
    id
}

fn build_handler(
    assistant: Arc<ScriptedAssistant>,
    hits: Vec<SearchHit>,
    store: Arc<InMemorySessionStore>,
    stats: Arc<GroundingStats>,
) -> ChatTurnHandler {
    ChatTurnHandler::new(
        assistant,
        Arc::new(FixedSearch { hits }),
        store,
        rotator("assistant", &["ak-1", "ak-2", "ak-3"]),
        rotator("search", &["sk-1"]),
        engines(),
        stats,
    )
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn multi_turn_conversation_flows_end_to_end() {
    init_tracing();
    let store = Arc::new(InMemorySessionStore::new());
    let id = seeded_session(&store);
    let stats = Arc::new(GroundingStats::new());

    let assistant = Arc::new(ScriptedAssistant::with(vec![
        AssistantReply::chat("Hi! What are you shopping for today?"),
        AssistantReply::search(
            "Let me check current prices.",
            "iphone 15",
            SearchType::Exact,
        )
        .with_category("smartphones"),
        AssistantReply::chat("The 128GB model should be enough for photos."),
    ]));

    let hits = vec![
        SearchHit::new("Apple iPhone 15 128GB")
            .with_price(799.0)
            .with_merchant("TechStore"),
        SearchHit::new("Apple iPhone 15 256GB").with_price(899.0),
        SearchHit::new("iPhone 13 Case Pink").with_price(9.99),
    ];

    let handler = build_handler(
        Arc::clone(&assistant),
        hits,
        Arc::clone(&store),
        Arc::clone(&stats),
    );

    // Turn 1: greeting, no grounding, nothing searched.
    let turn1 = handler
        .handle(ChatTurnCommand::new(id, "hello"))
        .await
        .unwrap();
    assert!(!turn1.grounding.should_ground);
    assert!(turn1.verdict.is_none());

    // Turn 2: specific model, grounded, search runs and filters the case.
    let turn2 = handler
        .handle(ChatTurnCommand::new(id, "show me the iphone 15"))
        .await
        .unwrap();
    assert!(turn2.grounding.should_ground);
    let verdict = turn2.verdict.unwrap();
    assert!(verdict.is_relevant);
    assert!(verdict.kept.len() >= 2);
    assert!(verdict
        .kept
        .iter()
        .all(|c| !c.candidate.title.contains("Case")));
    assert!(turn2.reply.contains("Apple iPhone 15 128GB"));

    // Turn 3: follow-up question rides the recorded context.
    let turn3 = handler
        .handle(ChatTurnCommand::new(id, "which storage size should I get"))
        .await
        .unwrap();
    assert_eq!(turn3.depth, ContextDepth::Medium);

    // Session state reflects all three turns.
    let saved = store.load(&id).await.unwrap().unwrap();
    assert_eq!(saved.cycle().iteration(), 4);
    assert_eq!(saved.cycle().history().len(), 6);
    assert_eq!(saved.current_category(), Some("smartphones"));
    assert_eq!(saved.version(), 4);

    // Every turn recorded a grounding decision.
    assert_eq!(stats.snapshot().total_decisions, 3);

    // Rotation walked the assistant pool in order.
    assert_eq!(assistant.credentials_seen(), vec!["ak-1", "ak-2", "ak-3"]);
}

#[tokio::test]
async fn window_exhaustion_rolls_over_and_preserves_the_snapshot() {
    init_tracing();
    let store = Arc::new(InMemorySessionStore::new());
    let id = seeded_session(&store);

    let replies: Vec<AssistantReply> = (0..7)
        .map(|i| AssistantReply::chat(format!("Reply {}", i)).with_category("laptops"))
        .collect();
    let handler = build_handler(
        Arc::new(ScriptedAssistant::with(replies)),
        Vec::new(),
        Arc::clone(&store),
        Arc::new(GroundingStats::new()),
    );

    // Five turns fill the window without rolling over.
    for i in 0..5 {
        let result = handler
            .handle(ChatTurnCommand::new(id, format!("question number {}", i)))
            .await
            .unwrap();
        assert!(!result.cycle_rolled_over, "turn {} rolled early", i);
    }

    // The sixth turn lands on the bound and rolls the cycle.
    let result = handler
        .handle(ChatTurnCommand::new(id, "final question of this cycle"))
        .await
        .unwrap();
    assert!(result.cycle_rolled_over);

    let saved = store.load(&id).await.unwrap().unwrap();
    assert_eq!(saved.cycle().cycle_id(), 2);
    assert_eq!(saved.cycle().iteration(), 1);
    assert!(saved.cycle().history().is_empty());
    assert_eq!(
        saved.cycle().last_cycle_context().unwrap().last_request,
        "final question of this cycle"
    );

    // A seventh turn starts filling the fresh window.
    let result = handler
        .handle(ChatTurnCommand::new(id, "okay new topic, monitors"))
        .await
        .unwrap();
    assert!(!result.cycle_rolled_over);
    let saved = store.load(&id).await.unwrap().unwrap();
    assert_eq!(saved.cycle().iteration(), 2);
    assert_eq!(saved.cycle().history().len(), 2);
}

#[tokio::test]
async fn concurrent_turns_cannot_silently_overwrite_each_other() {
    init_tracing();
    let store = Arc::new(InMemorySessionStore::new());
    let id = seeded_session(&store);

    // Two racing turns each read version 1. The loser must get a
    // version conflict instead of clobbering the winner's write.
    let mut first = store.load(&id).await.unwrap().unwrap();
    let mut second = store.load(&id).await.unwrap().unwrap();

    store.save(&mut first).await.unwrap();
    let conflict = store.save(&mut second).await;

    assert!(conflict.is_err());
    let saved = store.load(&id).await.unwrap().unwrap();
    assert_eq!(saved.version(), 2);
}

#[tokio::test]
async fn summary_refresh_fires_on_the_third_iteration() {
    init_tracing();
    let store = Arc::new(InMemorySessionStore::new());
    let id = seeded_session(&store);

    let replies: Vec<AssistantReply> = (0..3)
        .map(|i| AssistantReply::chat(format!("Reply {}", i)).with_category("laptops"))
        .collect();
    let handler = build_handler(
        Arc::new(ScriptedAssistant::with(replies)),
        Vec::new(),
        Arc::clone(&store),
        Arc::new(GroundingStats::new()),
    );

    // Refresh is checked after the turn is recorded but before the
    // iteration advances, so the flag fires on the third turn.
    let mut due_at = Vec::new();
    for i in 0..3 {
        let mut session = store.load(&id).await.unwrap().unwrap();
        if i > 0 {
            // Pretend a summarizer ran between turns.
            session.refresh_summary(format!("summary after turn {}", i));
            store.save(&mut session).await.unwrap();
        }
        let result = handler
            .handle(ChatTurnCommand::new(id, format!("question {}", i)))
            .await
            .unwrap();
        due_at.push(result.summary_refresh_due);
    }

    assert!(!due_at[1]);
    assert!(due_at[2]);
}
