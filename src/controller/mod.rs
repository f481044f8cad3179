//! Evaluation page controller.
//!
//! Wires three user actions to two behaviors:
//!
//! - **submit** (button or Enter) — validate the input, issue one evaluation
//!   request, render the response into the view;
//! - **copy** — put the JSON preview on the clipboard and flash a
//!   confirmation label.
//!
//! The controller owns its render targets (a [`View`]) instead of looking
//! them up globally, and is safe to share across threads. Overlapping
//! submissions are ordered by a generation counter: only the most recent
//! submission may touch the view once its response arrives, so the last
//! submission always wins regardless of response order.

pub mod render;
pub mod terminal;
pub mod timer;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};

use render::{AnswerSlot, ParsedResponse, ScoreTable};
use timer::ScheduledTask;
use transport::Transport;

/// Alert shown when the input is blank.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a question!";

/// Alert shown for every request failure.
pub const REQUEST_FAILED_MESSAGE: &str = "Error: Evaluation failed";

/// Copy button label while the confirmation is showing.
pub const COPIED_LABEL: &str = "COPIED";

/// Default delay before the copy label reverts.
pub const DEFAULT_COPY_REVERT: Duration = Duration::from_millis(2000);

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The render targets the controller drives.
///
/// Implementations decide how each target is presented (DOM-like state for
/// tests, colored terminal output for `ragjudge ask`).
pub trait View: Send + 'static {
    /// Current content of the question input.
    fn question_input(&self) -> String;

    /// Blocking user notification.
    fn alert(&mut self, message: &str);

    fn set_loading(&mut self, visible: bool);
    fn set_results_visible(&mut self, visible: bool);
    fn set_submit_enabled(&mut self, enabled: bool);

    fn show_answers(&mut self, non_rag: &str, rag: &str, docs_used: usize);
    fn show_scores(&mut self, table: &ScoreTable);
    fn show_justification(&mut self, slot: AnswerSlot, text: &str);
    fn show_winner(&mut self, name: &str, reason: &str);

    fn set_json_output(&mut self, text: &str);
    fn json_output(&self) -> String;

    fn copy_label(&self) -> String;
    fn set_copy_label(&mut self, label: &str);
}

/// Plain-text system clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Inputs and outcomes
// ---------------------------------------------------------------------------

/// Key identity for [`Controller::on_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

/// A key press in the question input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
}

impl KeyPress {
    /// A key with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
        }
    }

    /// Enter with no modifiers is the submit shortcut.
    pub fn is_submit(&self) -> bool {
        self.key == Key::Enter && !self.shift && !self.ctrl
    }
}

/// What a submission ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; no request was issued.
    EmptyInput,
    /// The response was rendered.
    Rendered,
    /// The request failed; the failure alert was shown.
    Failed,
    /// A newer submission started first; the response was discarded.
    Superseded,
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not the shortcut: the input keeps its default behavior.
    Default,
    /// The shortcut fired (default newline suppressed).
    Submitted(SubmitOutcome),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Pending copy-label revert plus the label to restore.
struct PendingRevert {
    original: String,
    task: ScheduledTask,
}

pub struct Controller<V: View, T: Transport, C: Clipboard> {
    view: Arc<Mutex<V>>,
    transport: T,
    clipboard: C,
    generation: AtomicU64,
    copy_revert: Duration,
    pending_revert: Mutex<Option<PendingRevert>>,
}

impl<V: View, T: Transport, C: Clipboard> Controller<V, T, C> {
    pub fn new(view: V, transport: T, clipboard: C) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
            transport,
            clipboard,
            generation: AtomicU64::new(0),
            copy_revert: DEFAULT_COPY_REVERT,
            pending_revert: Mutex::new(None),
        }
    }

    /// Override the copy-label revert delay.
    pub fn with_copy_revert(mut self, delay: Duration) -> Self {
        self.copy_revert = delay;
        self
    }

    /// Run `f` with exclusive access to the view.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut *self.view())
    }

    /// Generation of the most recent submission (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a copy-label revert is scheduled and has not fired yet.
    pub fn revert_pending(&self) -> bool {
        lock(&self.pending_revert)
            .as_ref()
            .is_some_and(|p| !p.task.is_finished())
    }

    fn view(&self) -> MutexGuard<'_, V> {
        lock(&self.view)
    }

    /// Submit the current input.
    ///
    /// Blocks for the duration of the request. Safe to call concurrently
    /// from several threads; see [`SubmitOutcome::Superseded`].
    pub fn submit(&self) -> SubmitOutcome {
        let question = self.view().question_input().trim().to_string();
        if question.is_empty() {
            self.view().alert(EMPTY_INPUT_MESSAGE);
            return SubmitOutcome::EmptyInput;
        }

        let generation = {
            let mut view = self.view();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            view.set_loading(true);
            view.set_results_visible(false);
            view.set_submit_enabled(false);
            generation
        };
        tracing::debug!(generation, "evaluation submitted");

        let result = self
            .transport
            .evaluate(&question)
            .and_then(|body| render::parse_response(&body));

        // Hold the view while checking so a newer submission cannot slip in
        // between the check and the render.
        let mut view = self.view();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded evaluation response");
            return SubmitOutcome::Superseded;
        }

        let outcome = match result.and_then(|parsed| render_into(&mut *view, &parsed)) {
            Ok(()) => SubmitOutcome::Rendered,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "evaluation request failed");
                view.alert(REQUEST_FAILED_MESSAGE);
                view.set_loading(false);
                view.set_results_visible(false);
                SubmitOutcome::Failed
            }
        };
        view.set_submit_enabled(true);
        outcome
    }

    /// Handle a key press in the question input.
    pub fn on_key(&self, key: KeyPress) -> KeyOutcome {
        if key.is_submit() {
            KeyOutcome::Submitted(self.submit())
        } else {
            KeyOutcome::Default
        }
    }

    /// Copy the JSON preview to the clipboard and flash [`COPIED_LABEL`].
    ///
    /// A copy while a revert is pending restarts the delay and keeps the
    /// label from before the first copy.
    pub fn copy(&self) -> Result<()> {
        let text = self.view().json_output();
        self.clipboard
            .write_text(&text)
            .context("failed to write to clipboard")?;

        let mut pending = lock(&self.pending_revert);
        let original = match pending.take() {
            Some(previous) => {
                previous.task.cancel();
                previous.original
            }
            None => self.view().copy_label(),
        };

        self.view().set_copy_label(COPIED_LABEL);

        let view = Arc::clone(&self.view);
        let label = original.clone();
        let task = ScheduledTask::spawn(self.copy_revert, move || {
            lock(&view).set_copy_label(&label);
        });
        *pending = Some(PendingRevert { original, task });

        Ok(())
    }
}

impl<V: View, T: Transport, C: Clipboard> Drop for Controller<V, T, C> {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.pending_revert).take() {
            pending.task.cancel();
        }
    }
}

/// Render a parsed response. Nothing is written unless the JSON preview
/// could be built, so a failure never leaves a half-rendered page.
fn render_into<V: View>(view: &mut V, parsed: &ParsedResponse) -> Result<()> {
    let preview = render::json_preview(&parsed.raw)?;
    let response = &parsed.response;

    view.set_loading(false);
    view.set_results_visible(true);

    view.show_answers(
        &response.answers.non_rag,
        &response.answers.rag,
        response.answers.docs_used,
    );
    view.show_scores(&render::score_table(&response.evaluation));
    for (slot, text) in render::justifications(&response.evaluation) {
        view.show_justification(slot, text);
    }
    view.show_winner(&response.evaluation.final_winner, &response.evaluation.reason);
    view.set_json_output(&preview);

    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
