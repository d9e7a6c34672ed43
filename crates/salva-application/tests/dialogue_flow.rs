use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use salva_application::engine::{APOLOGY, MANUAL_RESET_NOTE};
use salva_application::{Advance, ChatApp};
use salva_core::chat::{ChatOption, OptionAction, Speaker};
use salva_core::config::SalvaConfig;
use salva_core::dialogue::{DialogueTable, MAX_HOPS, NodeId};
use salva_core::{Result, SalvaError};
use salva_interaction::{
    ChatRequest, ConversationService, FileProductCatalog, LogPayload, LogSink,
};
use tokio::sync::Notify;

// ============================================================================
// Test doubles
// ============================================================================

struct MockConversation {
    reply: Result<String>,
    calls: Mutex<usize>,
    gate: Option<Arc<Notify>>,
}

impl MockConversation {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(0),
            gate: None,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(SalvaError::transport("conversation", "connection refused")),
            calls: Mutex::new(0),
            gate: None,
        })
    }

    /// Replies only after the gate is opened.
    fn gated(text: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(0),
            gate: Some(gate),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ConversationService for MockConversation {
    async fn reply(&self, _request: &ChatRequest) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

#[derive(Default)]
struct MockLogSink {
    payloads: Mutex<Vec<LogPayload>>,
}

#[async_trait]
impl LogSink for MockLogSink {
    async fn submit(&self, payload: &LogPayload) -> Result<()> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

/// Never finishes a submission.
struct StuckLogSink;

#[async_trait]
impl LogSink for StuckLogSink {
    async fn submit(&self, _payload: &LogPayload) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn app(conversation: Arc<MockConversation>, sink: Option<Arc<dyn LogSink>>) -> ChatApp {
    let mut config = SalvaConfig::default();
    config.dialogue.typing_delay_ms = 0;
    ChatApp::with_services(
        &config,
        conversation,
        sink,
        Arc::new(FileProductCatalog::new("products.json")),
    )
    .expect("app should build")
}

fn option_to(app: &ChatApp, action: &str) -> ChatOption {
    app.session
        .transcript()
        .last()
        .and_then(|msg| {
            msg.choices()
                .iter()
                .find(|opt| opt.action.as_deref() == Some(action))
                .cloned()
        })
        .unwrap_or_else(|| panic!("no option leading to '{}'", action))
}

// ============================================================================
// Dialogue table
// ============================================================================

#[test]
fn test_every_path_terminates_within_max_hops() {
    let table = DialogueTable::dating().unwrap();
    assert!(table.validate().is_empty());

    let paths = table.paths();
    assert!(!paths.is_empty());
    for path in &paths {
        assert!(path.len() <= MAX_HOPS, "path too long: {:?}", path);
        let last = table.get(path.last().unwrap().as_str()).unwrap();
        assert!(last.is_terminal());
        assert!(last.ending_note().is_some());
    }
}

#[test]
fn test_every_scripted_option_resolves() {
    let table = DialogueTable::dating().unwrap();
    for node in table.iter() {
        for option in &node.next_options {
            match option.parsed_action() {
                OptionAction::Scripted(id) => assert!(table.contains(id.as_str())),
                OptionAction::Reset => {}
                other => panic!("{} offers a non-scripted option {:?}", node.id, other),
            }
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

#[tokio::test]
async fn test_every_path_plays_without_conversational_calls() {
    let table = DialogueTable::dating().unwrap();

    for path in table.paths() {
        let conversation = MockConversation::replying("unused");
        let app = app(conversation.clone(), None);

        app.engine
            .advance(option_to(&app, "dating_start"))
            .await
            .unwrap();
        for node in path.iter().skip(1) {
            let outcome = app.engine.advance(option_to(&app, node.as_str())).await.unwrap();
            assert_eq!(outcome, Advance::Scripted { node: node.clone() });
            assert!(app.session.is_dating_flow());
        }

        let ending = table.get(path.last().unwrap().as_str()).unwrap();
        let outcome = app.engine.advance(option_to(&app, "reset")).await.unwrap();
        assert_eq!(
            outcome,
            Advance::Reset {
                note: ending.ending_note().unwrap().to_string()
            }
        );

        assert!(app.session.transcript().is_initial());
        assert!(!app.session.is_dating_flow());
        assert_eq!(conversation.calls(), 0);
    }
}

#[tokio::test]
async fn test_bad_end_scenario_is_logged() {
    let sink = Arc::new(MockLogSink::default());
    let app = app(MockConversation::replying("unused"), Some(sink.clone()));

    app.engine
        .advance(option_to(&app, "dating_start"))
        .await
        .unwrap();
    let surprised = app.session.transcript().last().unwrap().clone();
    assert_eq!(surprised.speaker, Speaker::Character);
    assert!(surprised.text.starts_with("えっ…？"));
    assert_eq!(surprised.options.as_ref().map(Vec::len), Some(2));

    app.engine
        .advance(option_to(&app, "dating_1_confess"))
        .await
        .unwrap();
    assert_eq!(
        app.session.transcript().messages()[3].text,
        "好きです！"
    );
    let workaholic = app.session.transcript().last().unwrap().clone();
    assert_eq!(
        workaholic.text,
        "いきなりだね…。でも、ごめん。僕は店とコーヒーのことで頭がいっぱいなんだ。恋愛してる暇なんてないんだよ。"
    );
    assert_eq!(workaholic.options.as_ref().map(Vec::len), Some(2));

    app.engine
        .advance(option_to(&app, "dating_2_rest"))
        .await
        .unwrap();
    let bad_end = app.session.transcript().last().unwrap().clone();
    assert_eq!(
        bad_end.text,
        "休みたくないんだ。コーヒーは僕の人生だからね。君とは価値観が合わないみたいだ。"
    );
    let choices = bad_end.options.unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].parsed_action(), OptionAction::Reset);
    assert_eq!(choices[0].note.as_deref(), Some("BAD END: 価値観"));

    let outcome = app.engine.advance(option_to(&app, "reset")).await.unwrap();
    assert_eq!(
        outcome,
        Advance::Reset {
            note: "BAD END: 価値観".to_string()
        }
    );
    assert!(app.session.transcript().is_initial());

    app.shutdown().await;
    let payloads = sink.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].note, "BAD END: 価値観");
    assert!(payloads[0].user_id.starts_with("user_"));

    let last = payloads[0].history.last().unwrap();
    assert_eq!(last.speaker, Speaker::User);
    assert_eq!(last.text, "そうですか…");
}

#[tokio::test]
async fn test_failure_yields_exactly_one_apology() {
    let conversation = MockConversation::failing();
    let app = app(conversation.clone(), None);

    let outcome = app.engine.send_text("おすすめは？").await.unwrap();
    assert_eq!(outcome, Advance::Fallback);
    assert_eq!(conversation.calls(), 1);

    let transcript = app.session.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(
        transcript
            .messages()
            .iter()
            .filter(|m| m.text == APOLOGY)
            .count(),
        1
    );
    assert!(transcript.last().unwrap().options.is_none());
    assert!(!app.session.is_awaiting());
}

#[tokio::test]
async fn test_stuck_log_sink_does_not_delay_reset() {
    let app = app(
        MockConversation::replying("unused"),
        Some(Arc::new(StuckLogSink)),
    );

    app.engine
        .advance(option_to(&app, "dating_start"))
        .await
        .unwrap();
    app.engine
        .advance(option_to(&app, "dating_end_shy"))
        .await
        .unwrap();

    let reset = tokio::time::timeout(
        Duration::from_secs(1),
        app.engine.advance(option_to(&app, "reset")),
    )
    .await
    .expect("reset must not wait for the log sink")
    .unwrap();

    assert_eq!(
        reset,
        Advance::Reset {
            note: "Shy End".to_string()
        }
    );
    assert!(app.session.transcript().is_initial());
}

#[tokio::test]
async fn test_second_turn_is_rejected_while_busy() {
    let gate = Arc::new(Notify::new());
    let app = app(MockConversation::gated("パカマラがおすすめ", gate.clone()), None);

    let engine = Arc::clone(&app.engine);
    let first = tokio::spawn(async move { engine.send_text("おすすめは？").await });

    let mut awaiting = app.session.subscribe_awaiting();
    awaiting.wait_for(|busy| *busy).await.unwrap();

    let before = app.session.transcript();
    assert_eq!(app.engine.send_text("まだ？").await.unwrap(), Advance::Busy);
    assert_eq!(
        app.engine
            .advance(ChatOption::new("4. ときめき…", "…", "dating_start"))
            .await
            .unwrap(),
        Advance::Busy
    );
    assert_eq!(app.session.transcript(), before);

    gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, Advance::Replied { .. }));
    assert_eq!(app.session.highlight().product_id, Some(13));
    assert!(!app.session.is_awaiting());
}

#[tokio::test]
async fn test_manual_reset_discards_late_reply() {
    let gate = Arc::new(Notify::new());
    let sink = Arc::new(MockLogSink::default());
    let app = app(
        MockConversation::gated("遅れてごめん", gate.clone()),
        Some(sink.clone()),
    );

    let engine = Arc::clone(&app.engine);
    let first = tokio::spawn(async move { engine.send_text("こんにちは").await });
    let mut awaiting = app.session.subscribe_awaiting();
    awaiting.wait_for(|busy| *busy).await.unwrap();

    assert_eq!(
        app.engine.reset_manual(),
        Advance::Reset {
            note: MANUAL_RESET_NOTE.to_string()
        }
    );
    assert!(!app.session.is_awaiting());

    gate.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), Advance::Discarded);
    assert!(app.session.transcript().is_initial());

    app.shutdown().await;
    let payloads = sink.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].note, "Manual Reset");
}

#[tokio::test]
async fn test_menu_actions_never_offer_options() {
    for action in ["recommend", "blend", "chat"] {
        let conversation = MockConversation::replying("何にしましょう？");
        let app = app(conversation.clone(), None);

        let outcome = app.engine.advance(option_to(&app, action)).await.unwrap();
        let Advance::Replied { message } = outcome else {
            panic!("expected a reply for {}", action);
        };
        assert!(message.options.is_none());
        assert_eq!(conversation.calls(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_scripted_line_waits_for_typing_delay() {
    let config = SalvaConfig::default();
    let app = ChatApp::with_services(
        &config,
        MockConversation::replying("unused"),
        None,
        Arc::new(FileProductCatalog::new("products.json")),
    )
    .unwrap();

    let engine = Arc::clone(&app.engine);
    let option = option_to(&app, "dating_start");
    let turn = tokio::spawn(async move { engine.advance(option).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(app.session.is_awaiting());
    assert_eq!(app.session.transcript().len(), 2);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        turn.await.unwrap().unwrap(),
        Advance::Scripted {
            node: NodeId::new("dating_start")
        }
    );
    assert_eq!(app.session.transcript().len(), 3);
    assert!(!app.session.is_awaiting());
}
