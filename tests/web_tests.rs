//! End-to-end tests for the HTTP server.
//!
//! Each test binds a real `tiny_http` listener on an ephemeral port, serves
//! it from a background thread with a scripted model behind the pipeline,
//! and talks to it with `ureq` or with the controller's [`HttpTransport`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use ragjudge::config::RagJudgeConfig;
use ragjudge::controller::render::{AnswerSlot, ScoreTable};
use ragjudge::controller::transport::{HttpTransport, Transport};
use ragjudge::controller::{Clipboard, Controller, SubmitOutcome, View};
use ragjudge::evaluation::pipeline::{Pipeline, QUESTION_REQUIRED};
use ragjudge::llm::LanguageModel;
use ragjudge::rag::{Document, RagEngine};
use ragjudge::web::{self, AppState};

const VERDICT: &str = r#"{
  "evaluation": [
    {"model": "Non-RAG", "scores": {"accuracy": 3, "completeness": 3, "relevance": 4, "clarity": 4, "grounding": 0},
     "average_score": 3.5, "justification": "No sources."},
    {"model": "RAG", "scores": {"accuracy": 5, "completeness": 5, "relevance": 5, "clarity": 4, "grounding": 5},
     "average_score": 4.8, "justification": "Uses the documents."}
  ],
  "final_winner": "RAG",
  "reason": "Grounded answer."
}"#;

struct StubModel {
    verdict: &'static str,
}

impl LanguageModel for StubModel {
    fn complete(&self, prompt: &str, _system: &str) -> Result<String> {
        Ok(if prompt.starts_with("Context:") {
            "RAG answer".to_string()
        } else {
            "Non-RAG answer".to_string()
        })
    }

    fn complete_json(&self, _prompt: &str, _system: &str) -> Result<String> {
        Ok(self.verdict.to_string())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Start a server in the background and return its base URL.
fn start_server(verdict: &'static str) -> String {
    let engine = RagEngine::from_documents(vec![Document::new(
        "rag.txt",
        "RAG retrieves external documents to ground answers.",
    )]);
    let pipeline = Pipeline::new(Arc::new(StubModel { verdict }), engine, 2);
    let state = AppState::new(pipeline, RagJudgeConfig::default());

    let server = web::bind("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || web::run(&server, &state));

    format!("http://{addr}")
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(10))
        .build()
}

fn status_of(result: std::result::Result<ureq::Response, ureq::Error>) -> (u16, String) {
    match result {
        Ok(resp) => (resp.status(), resp.into_string().unwrap()),
        Err(ureq::Error::Status(code, resp)) => (code, resp.into_string().unwrap()),
        Err(e) => panic!("transport error: {e}"),
    }
}

// ===========================================================================
// Routes
// ===========================================================================

#[test]
fn index_serves_the_page() {
    let base = start_server(VERDICT);

    for path in ["/", "/index.html"] {
        let resp = agent().get(&format!("{base}{path}")).call().unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.content_type().starts_with("text/html"));
        let body = resp.into_string().unwrap();
        assert!(body.contains("id=\"questionInput\""));
        assert!(body.contains("id=\"copyBtn\""));
    }
}

#[test]
fn evaluate_returns_full_response() {
    let base = start_server(VERDICT);

    let resp = agent()
        .post(&format!("{base}/evaluate"))
        .send_json(serde_json::json!({ "question": "  What does RAG retrieve?  " }))
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.into_json().unwrap();
    assert_eq!(body["question"], "What does RAG retrieve?");
    assert_eq!(body["answers"]["non_rag"], "Non-RAG answer");
    assert_eq!(body["answers"]["rag"], "RAG answer");
    assert_eq!(body["answers"]["docs_used"], 1);
    assert_eq!(body["evaluation"]["final_winner"], "RAG");
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["question", "answers", "evaluation"]);
}

#[test]
fn evaluate_passes_judge_json_through_unchanged() {
    const LOOSE_VERDICT: &str = r#"{"evaluation": [
        {"model": "Non-RAG", "scores": {"accuracy": 4, "completeness": 3, "relevance": 4, "clarity": 4, "grounding": "N/A"},
         "average_score": 3.75, "justification": "j"}],
        "final_winner": "Non-RAG", "reason": "r", "confidence": "high"}"#;
    let base = start_server(LOOSE_VERDICT);

    let body = agent()
        .post(&format!("{base}/evaluate"))
        .send_json(serde_json::json!({ "question": "What is RAG?" }))
        .unwrap()
        .into_string()
        .unwrap();

    assert!(body.contains(r#""accuracy":4,"#), "body: {body}");
    assert!(body.contains(r#""grounding":"N/A""#), "body: {body}");
    assert!(body.contains(r#""confidence":"high""#), "body: {body}");

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let judge: serde_json::Value = serde_json::from_str(LOOSE_VERDICT).unwrap();
    assert_eq!(json["evaluation"], judge);
}

#[test]
fn evaluate_without_question_is_400() {
    let base = start_server(VERDICT);

    for body in [r#"{"question": "   "}"#, "{}", "not json"] {
        let (status, text) = status_of(
            agent()
                .post(&format!("{base}/evaluate"))
                .set("Content-Type", "application/json")
                .send_string(body),
        );
        assert_eq!(status, 400, "body: {body}");
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["error"], QUESTION_REQUIRED);
    }
}

#[test]
fn pipeline_failure_is_500_with_error() {
    let base = start_server("the judge rambled without JSON");

    let (status, text) = status_of(
        agent()
            .post(&format!("{base}/evaluate"))
            .send_json(serde_json::json!({ "question": "What is RAG?" })),
    );
    assert_eq!(status, 500);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(json["error"].as_str().unwrap().contains("failed to parse JSON from judge"));
}

#[test]
fn unknown_routes_are_404() {
    let base = start_server(VERDICT);

    let (status, _) = status_of(agent().get(&format!("{base}/nope")).call());
    assert_eq!(status, 404);
    let (status, _) = status_of(agent().get(&format!("{base}/evaluate")).call());
    assert_eq!(status, 404);
}

#[test]
fn health_and_config_endpoints() {
    let base = start_server(VERDICT);

    let health: serde_json::Value = agent()
        .get(&format!("{base}/api/health"))
        .call()
        .unwrap()
        .into_json()
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["documents"], 1);
    assert_eq!(health["api_key_env"], "OPENAI_API_KEY");

    let config: serde_json::Value = agent()
        .get(&format!("{base}/api/config"))
        .call()
        .unwrap()
        .into_json()
        .unwrap();
    assert_eq!(config["config"]["retrieval"]["top_k"], 2);
    assert!(config["toml_text"].as_str().unwrap().contains("[server]"));
}

// ===========================================================================
// Controller over HTTP
// ===========================================================================

#[derive(Default)]
struct RecordingView {
    input: String,
    alerts: Vec<String>,
    rendered: Option<ScoreTable>,
    justifications: Vec<AnswerSlot>,
    json: String,
    label: String,
    loading: bool,
}

impl View for RecordingView {
    fn question_input(&self) -> String {
        self.input.clone()
    }
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
    fn set_loading(&mut self, visible: bool) {
        self.loading = visible;
    }
    fn set_results_visible(&mut self, _visible: bool) {}
    fn set_submit_enabled(&mut self, _enabled: bool) {}
    fn show_answers(&mut self, _non_rag: &str, _rag: &str, _docs_used: usize) {}
    fn show_scores(&mut self, table: &ScoreTable) {
        self.rendered = Some(table.clone());
    }
    fn show_justification(&mut self, slot: AnswerSlot, _text: &str) {
        self.justifications.push(slot);
    }
    fn show_winner(&mut self, _name: &str, _reason: &str) {}
    fn set_json_output(&mut self, text: &str) {
        self.json = text.to_string();
    }
    fn json_output(&self) -> String {
        self.json.clone()
    }
    fn copy_label(&self) -> String {
        self.label.clone()
    }
    fn set_copy_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[test]
fn controller_renders_server_response() {
    let base = start_server(VERDICT);
    let transport = HttpTransport::new(format!("{base}/evaluate"), Duration::from_secs(10));
    assert!(transport.endpoint().ends_with("/evaluate"));

    let controller = Controller::new(
        RecordingView {
            input: "What does RAG retrieve?".to_string(),
            ..RecordingView::default()
        },
        transport,
        NoClipboard,
    );

    assert_eq!(controller.submit(), SubmitOutcome::Rendered);
    controller.with_view(|view| {
        assert!(view.alerts.is_empty());
        assert!(!view.loading);
        let Some(ScoreTable::Rows(rows)) = &view.rendered else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].grounding, "N/A");
        assert_eq!(rows[1].average, "4.8");
        assert!(rows[1].winner && !rows[0].winner);
        assert_eq!(view.justifications, [AnswerSlot::NonRag, AnswerSlot::Rag]);
        assert!(view.json.starts_with("{\n  \"question\": \"What does RAG retrieve?\""));
    });
}

#[test]
fn http_errors_surface_as_transport_errors() {
    let base = start_server(VERDICT);
    let transport = HttpTransport::new(format!("{base}/evaluate"), Duration::ZERO);

    assert!(transport.evaluate("   ").is_err());
    assert!(transport.evaluate("What is RAG?").is_ok());

    let unreachable = HttpTransport::new("http://127.0.0.1:9/evaluate", Duration::from_secs(2));
    assert!(unreachable.evaluate("What is RAG?").is_err());
}
