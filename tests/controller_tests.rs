//! Integration tests for the page controller.
//!
//! The controller is driven against in-memory fakes: a [`View`] that records
//! what was rendered, a scripted [`Transport`], and a clipboard that keeps
//! everything written to it. Timing-sensitive tests use short revert delays
//! and generous sleeps.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use ragjudge::controller::render::{AnswerSlot, EMPTY_TABLE_MESSAGE, ScoreTable};
use ragjudge::controller::transport::Transport;
use ragjudge::controller::{
    COPIED_LABEL, Clipboard, Controller, EMPTY_INPUT_MESSAGE, Key, KeyOutcome, KeyPress,
    REQUEST_FAILED_MESSAGE, SubmitOutcome, View,
};

// ===========================================================================
// Fakes
// ===========================================================================

const INITIAL_COPY_LABEL: &str = "Copy JSON";

#[derive(Debug, Default)]
struct ViewState {
    input: String,
    alerts: Vec<String>,
    loading: bool,
    results_visible: bool,
    submit_enabled: bool,
    answers: Option<(String, String, usize)>,
    table: Option<ScoreTable>,
    justifications: Vec<(AnswerSlot, String)>,
    winner: Option<(String, String)>,
    json: String,
    copy_label: String,
}

/// Records every render call into shared state the test can inspect after
/// the controller is gone.
#[derive(Clone)]
struct FakeView(Arc<Mutex<ViewState>>);

impl FakeView {
    fn new(input: &str) -> Self {
        Self(Arc::new(Mutex::new(ViewState {
            input: input.to_string(),
            submit_enabled: true,
            copy_label: INITIAL_COPY_LABEL.to_string(),
            ..ViewState::default()
        })))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.0.lock().unwrap()
    }
}

impl View for FakeView {
    fn question_input(&self) -> String {
        self.state().input.clone()
    }
    fn alert(&mut self, message: &str) {
        self.state().alerts.push(message.to_string());
    }
    fn set_loading(&mut self, visible: bool) {
        self.state().loading = visible;
    }
    fn set_results_visible(&mut self, visible: bool) {
        self.state().results_visible = visible;
    }
    fn set_submit_enabled(&mut self, enabled: bool) {
        self.state().submit_enabled = enabled;
    }
    fn show_answers(&mut self, non_rag: &str, rag: &str, docs_used: usize) {
        self.state().answers = Some((non_rag.to_string(), rag.to_string(), docs_used));
    }
    fn show_scores(&mut self, table: &ScoreTable) {
        self.state().table = Some(table.clone());
    }
    fn show_justification(&mut self, slot: AnswerSlot, text: &str) {
        self.state().justifications.push((slot, text.to_string()));
    }
    fn show_winner(&mut self, name: &str, reason: &str) {
        self.state().winner = Some((name.to_string(), reason.to_string()));
    }
    fn set_json_output(&mut self, text: &str) {
        self.state().json = text.to_string();
    }
    fn json_output(&self) -> String {
        self.state().json.clone()
    }
    fn copy_label(&self) -> String {
        self.state().copy_label.clone()
    }
    fn set_copy_label(&mut self, label: &str) {
        self.state().copy_label = label.to_string();
    }
}

/// Answers every request with the same scripted result and counts calls.
struct ScriptedTransport {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    questions: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn ok(body: &str) -> Self {
        Self {
            reply: Ok(body.to_string()),
            calls: AtomicUsize::new(0),
            questions: Mutex::new(Vec::new()),
        }
    }

    fn err(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::ok("")
        }
    }
}

impl Transport for ScriptedTransport {
    fn evaluate(&self, question: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.questions.lock().unwrap().push(question.to_string());
        match &self.reply {
            Ok(body) => Ok(body.clone()),
            Err(msg) => Err(anyhow::anyhow!("{msg}")),
        }
    }
}

#[derive(Clone, Default)]
struct FakeClipboard {
    writes: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl Clipboard for FakeClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("clipboard unavailable");
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn response_body(non_rag: &str, rag: &str) -> String {
    serde_json::json!({
        "question": "What is RAG?",
        "answers": { "non_rag": non_rag, "rag": rag, "docs_used": 2 },
        "evaluation": {
            "evaluation": [
                {
                    "model": "Non-RAG",
                    "scores": { "accuracy": 4, "completeness": 3, "relevance": 4, "clarity": 4, "grounding": "N/A" },
                    "average_score": 3.75,
                    "justification": "Generic but correct."
                },
                {
                    "model": "RAG",
                    "scores": { "accuracy": 5, "completeness": 5, "relevance": 5, "clarity": 4, "grounding": 5 },
                    "average_score": 8,
                    "justification": "Grounded in the documents."
                }
            ],
            "final_winner": "RAG",
            "reason": "The RAG answer cites the retrieved context."
        },
        "server_timing_ms": 1234
    })
    .to_string()
}

// ===========================================================================
// submit
// ===========================================================================

#[test]
fn blank_input_alerts_without_a_request() {
    let view = FakeView::new("   \n  ");
    let transport = Arc::new(ScriptedTransport::ok("{}"));
    let controller = Controller::new(view.clone(), Arc::clone(&transport), FakeClipboard::default());

    assert_eq!(controller.submit(), SubmitOutcome::EmptyInput);

    let state = view.state();
    assert_eq!(state.alerts, [EMPTY_INPUT_MESSAGE]);
    assert!(!state.loading);
    assert!(state.submit_enabled);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.generation(), 0);
}

#[test]
fn success_renders_every_target() {
    let view = FakeView::new("  What is RAG?  ");
    let transport = Arc::new(ScriptedTransport::ok(&response_body("plain", "grounded")));
    let controller = Controller::new(view.clone(), Arc::clone(&transport), FakeClipboard::default());

    assert_eq!(controller.submit(), SubmitOutcome::Rendered);
    assert_eq!(*transport.questions.lock().unwrap(), ["What is RAG?"]);

    let state = view.state();
    assert!(state.alerts.is_empty());
    assert!(!state.loading);
    assert!(state.results_visible);
    assert!(state.submit_enabled);
    assert_eq!(
        state.answers,
        Some(("plain".to_string(), "grounded".to_string(), 2))
    );

    let Some(ScoreTable::Rows(rows)) = &state.table else {
        panic!("expected score rows, got {:?}", state.table);
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].model, "Non-RAG");
    assert_eq!(rows[0].grounding, "N/A");
    assert_eq!(rows[0].average, "3.8");
    assert!(!rows[0].winner);
    assert_eq!(rows[1].model, "RAG");
    assert_eq!(rows[1].grounding, "5");
    assert_eq!(rows[1].average, "8.0");
    assert!(rows[1].winner);

    assert_eq!(
        state.justifications,
        [
            (AnswerSlot::NonRag, "Generic but correct.".to_string()),
            (AnswerSlot::Rag, "Grounded in the documents.".to_string()),
        ]
    );
    assert_eq!(
        state.winner,
        Some((
            "RAG".to_string(),
            "The RAG answer cites the retrieved context.".to_string()
        ))
    );
}

#[test]
fn json_preview_is_reduced_and_indented() {
    let view = FakeView::new("What is RAG?");
    let controller = Controller::new(
        view.clone(),
        ScriptedTransport::ok(&response_body("a", "b")),
        FakeClipboard::default(),
    );
    controller.submit();

    let json = view.state().json.clone();
    assert!(json.starts_with("{\n  \"question\": \"What is RAG?\",\n  \"answers\": {"));
    assert!(!json.contains("server_timing_ms"));

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["question", "answers", "evaluation"]);
    assert_eq!(parsed["evaluation"]["evaluation"][0]["scores"]["grounding"], "N/A");
}

#[test]
fn request_failure_alerts_and_hides_results() {
    let view = FakeView::new("What is RAG?");
    let controller = Controller::new(
        view.clone(),
        ScriptedTransport::err("connection refused"),
        FakeClipboard::default(),
    );

    assert_eq!(controller.submit(), SubmitOutcome::Failed);

    let state = view.state();
    assert_eq!(state.alerts, [REQUEST_FAILED_MESSAGE]);
    assert!(!state.loading);
    assert!(!state.results_visible);
    assert!(state.submit_enabled);
    assert!(state.answers.is_none());
    assert!(state.table.is_none());
}

#[test]
fn malformed_body_is_a_request_failure() {
    for body in ["<html>Bad Gateway</html>", "[1, 2]", r#"{"error": "boom"}"#] {
        let view = FakeView::new("What is RAG?");
        let controller = Controller::new(view.clone(), ScriptedTransport::ok(body), FakeClipboard::default());

        assert_eq!(controller.submit(), SubmitOutcome::Failed, "body: {body}");
        let state = view.state();
        assert_eq!(state.alerts, [REQUEST_FAILED_MESSAGE]);
        assert!(state.json.is_empty());
        assert!(!state.results_visible);
    }
}

#[test]
fn empty_evaluation_list_renders_placeholder() {
    let body = serde_json::json!({
        "question": "Q",
        "answers": { "non_rag": "a", "rag": "b", "docs_used": 0 },
        "evaluation": { "evaluation": [], "final_winner": "Unknown", "reason": "judge failed" }
    })
    .to_string();
    let view = FakeView::new("Q");
    let controller = Controller::new(view.clone(), ScriptedTransport::ok(&body), FakeClipboard::default());

    assert_eq!(controller.submit(), SubmitOutcome::Rendered);
    let state = view.state();
    assert_eq!(state.table, Some(ScoreTable::Empty(EMPTY_TABLE_MESSAGE)));
    assert!(state.justifications.is_empty());
    assert_eq!(state.winner.as_ref().map(|w| w.0.as_str()), Some("Unknown"));
}

// ===========================================================================
// key press
// ===========================================================================

#[test]
fn bare_enter_submits() {
    let view = FakeView::new("What is RAG?");
    let transport = Arc::new(ScriptedTransport::ok(&response_body("a", "b")));
    let controller = Controller::new(view.clone(), Arc::clone(&transport), FakeClipboard::default());

    assert_eq!(
        controller.on_key(KeyPress::plain(Key::Enter)),
        KeyOutcome::Submitted(SubmitOutcome::Rendered)
    );
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn modified_enter_and_other_keys_do_nothing() {
    let view = FakeView::new("What is RAG?");
    let transport = Arc::new(ScriptedTransport::ok(&response_body("a", "b")));
    let controller = Controller::new(view.clone(), Arc::clone(&transport), FakeClipboard::default());

    let presses = [
        KeyPress { key: Key::Enter, shift: true, ctrl: false },
        KeyPress { key: Key::Enter, shift: false, ctrl: true },
        KeyPress { key: Key::Enter, shift: true, ctrl: true },
        KeyPress::plain(Key::Char('x')),
        KeyPress::plain(Key::Other),
    ];
    for press in presses {
        assert_eq!(controller.on_key(press), KeyOutcome::Default, "{press:?}");
    }
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!view.state().loading);
}

#[test]
fn enter_on_blank_input_alerts() {
    let view = FakeView::new("");
    let controller = Controller::new(view.clone(), ScriptedTransport::ok("{}"), FakeClipboard::default());

    assert_eq!(
        controller.on_key(KeyPress::plain(Key::Enter)),
        KeyOutcome::Submitted(SubmitOutcome::EmptyInput)
    );
    assert_eq!(view.state().alerts, [EMPTY_INPUT_MESSAGE]);
}

// ===========================================================================
// copy
// ===========================================================================

fn rendered_controller(
    revert: Duration,
    clipboard: FakeClipboard,
) -> (FakeView, Controller<FakeView, ScriptedTransport, FakeClipboard>) {
    let view = FakeView::new("What is RAG?");
    let controller = Controller::new(
        view.clone(),
        ScriptedTransport::ok(&response_body("a", "b")),
        clipboard,
    )
    .with_copy_revert(revert);
    assert_eq!(controller.submit(), SubmitOutcome::Rendered);
    (view, controller)
}

#[test]
fn copy_writes_preview_and_reverts_label() {
    let clipboard = FakeClipboard::default();
    let (view, controller) = rendered_controller(Duration::from_millis(50), clipboard.clone());

    controller.copy().unwrap();
    assert_eq!(view.state().copy_label, COPIED_LABEL);
    assert_eq!(*clipboard.writes.lock().unwrap(), [view.state().json.clone()]);

    thread::sleep(Duration::from_millis(400));
    assert_eq!(view.state().copy_label, INITIAL_COPY_LABEL);
    assert!(!controller.revert_pending());
}

#[test]
fn copy_before_any_result_copies_empty_text() {
    let clipboard = FakeClipboard::default();
    let view = FakeView::new("");
    let controller = Controller::new(view.clone(), ScriptedTransport::ok("{}"), clipboard.clone())
        .with_copy_revert(Duration::from_secs(30));

    controller.copy().unwrap();
    assert_eq!(*clipboard.writes.lock().unwrap(), [String::new()]);
    assert_eq!(view.state().copy_label, COPIED_LABEL);
}

#[test]
fn repeated_copy_keeps_original_label() {
    let (view, controller) =
        rendered_controller(Duration::from_millis(150), FakeClipboard::default());

    controller.copy().unwrap();
    thread::sleep(Duration::from_millis(20));
    controller.copy().unwrap();
    assert_eq!(view.state().copy_label, COPIED_LABEL);
    assert!(controller.revert_pending());

    thread::sleep(Duration::from_millis(600));
    assert_eq!(view.state().copy_label, INITIAL_COPY_LABEL);
}

#[test]
fn dropping_controller_cancels_pending_revert() {
    let (view, controller) = rendered_controller(Duration::from_millis(100), FakeClipboard::default());

    controller.copy().unwrap();
    drop(controller);

    thread::sleep(Duration::from_millis(300));
    assert_eq!(view.state().copy_label, COPIED_LABEL);
}

#[test]
fn clipboard_failure_leaves_label_alone() {
    let clipboard = FakeClipboard {
        fail: true,
        ..FakeClipboard::default()
    };
    let (view, controller) = rendered_controller(Duration::from_millis(50), clipboard);

    assert!(controller.copy().is_err());
    assert_eq!(view.state().copy_label, INITIAL_COPY_LABEL);
    assert!(!controller.revert_pending());
}

// ===========================================================================
// overlapping submissions
// ===========================================================================

/// Blocks requests for "slow" until released; answers everything else
/// immediately.
struct GatedTransport {
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl Transport for GatedTransport {
    fn evaluate(&self, question: &str) -> Result<String> {
        if question == "slow" {
            self.started.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(response_body("stale non-rag", "stale rag"))
        } else {
            Ok(response_body("fresh non-rag", "fresh rag"))
        }
    }
}

#[test]
fn last_submission_wins() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let view = FakeView::new("slow");
    let controller = Arc::new(Controller::new(
        view.clone(),
        GatedTransport {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        },
        FakeClipboard::default(),
    ));

    let first = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.submit())
    };
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(view.state().loading);

    view.state().input = "fast".to_string();
    assert_eq!(controller.submit(), SubmitOutcome::Rendered);
    assert_eq!(controller.generation(), 2);

    release_tx.send(()).unwrap();
    assert_eq!(first.join().unwrap(), SubmitOutcome::Superseded);

    let state = view.state();
    assert_eq!(
        state.answers,
        Some(("fresh non-rag".to_string(), "fresh rag".to_string(), 2))
    );
    assert!(!state.loading);
    assert!(state.results_visible);
    assert!(state.submit_enabled);
    assert!(state.alerts.is_empty());
}

#[test]
fn superseded_failure_is_silent() {
    struct FailSlow {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl Transport for FailSlow {
        fn evaluate(&self, question: &str) -> Result<String> {
            if question == "slow" {
                self.started.lock().unwrap().send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
                anyhow::bail!("timed out");
            }
            Ok(response_body("fresh non-rag", "fresh rag"))
        }
    }

    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let view = FakeView::new("slow");
    let controller = Arc::new(Controller::new(
        view.clone(),
        FailSlow {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        },
        FakeClipboard::default(),
    ));

    let first = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.submit())
    };
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    view.state().input = "fast".to_string();
    assert_eq!(controller.submit(), SubmitOutcome::Rendered);

    release_tx.send(()).unwrap();
    assert_eq!(first.join().unwrap(), SubmitOutcome::Superseded);

    let state = view.state();
    assert!(state.alerts.is_empty());
    assert!(state.results_visible);
}
