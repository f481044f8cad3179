//! Embedded HTML/CSS/JS frontend for the evaluation page.
//!
//! The whole page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.
//!
//! The script mirrors `crate::controller`: the controller is created with
//! its render targets passed in, every submission takes a generation number
//! and stale responses are dropped, and the copy-label revert is a single
//! cancellable timer.

/// The complete single-page evaluation UI.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>ragjudge: RAG vs Non-RAG</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1200px;
  margin: 0 auto;
  padding: 24px;
}

header {
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}

.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 12px; }
.card h3 { font-size: 14px; font-weight: 600; margin: 12px 0 6px; color: var(--text-muted); }

textarea {
  width: 100%;
  min-height: 90px;
  padding: 10px;
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  font-family: var(--font);
  font-size: 14px;
  resize: vertical;
}

textarea:focus { outline: none; border-color: var(--accent); }

.actions { display: flex; align-items: center; gap: 12px; margin-top: 12px; }
.hint { color: var(--text-muted); font-size: 12px; }

.btn {
  padding: 8px 16px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--accent);
  color: #fff;
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
}

.btn:disabled { opacity: 0.5; cursor: not-allowed; }
.btn.secondary { background: transparent; color: var(--text); }

.loading {
  display: none;
  color: var(--text-muted);
  padding: 20px;
  text-align: center;
}

.loading.show { display: block; }

.results { display: none; }
.results.show { display: block; }

.answers {
  display: grid;
  grid-template-columns: 1fr 1fr;
  gap: 16px;
}

.answer {
  white-space: pre-wrap;
  font-size: 13px;
}

.answer-title.non-rag { color: var(--accent); }
.answer-title.rag { color: var(--purple); }

.justification { color: var(--text-muted); font-size: 12px; font-style: italic; }
.meta { color: var(--text-muted); font-size: 12px; margin-top: 8px; }

table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px 12px; text-align: left; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-size: 12px; font-weight: 600; text-transform: uppercase; }
td.num, th.num { text-align: right; font-family: var(--mono); }
tr.winner td { background: rgba(63,185,80,0.12); color: var(--green); }
td.empty { text-align: center; color: var(--text-muted); }

.verdict .name { font-size: 20px; font-weight: 700; color: var(--green); }
.verdict .reason { margin-top: 6px; }

pre.json {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 12px;
  font-family: var(--mono);
  font-size: 12px;
  overflow-x: auto;
  max-height: 420px;
}

.json-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 8px; }

@media (max-width: 800px) {
  .answers { grid-template-columns: 1fr; }
}
</style>
</head>
<body>
<div class="app">

  <header>
    <h1><span class="logo">ragjudge</span> RAG vs Non-RAG</h1>
    <div class="subtitle">Answer a question with and without retrieval, then let the judge score both.</div>
  </header>

  <div class="card">
    <h2>Question</h2>
    <textarea id="questionInput" placeholder="Ask something about AI..."></textarea>
    <div class="actions">
      <button class="btn" id="submitBtn">Evaluate</button>
      <span class="hint">Enter to submit, Shift+Enter for a new line</span>
    </div>
  </div>

  <div class="loading" id="loading">Generating answers and judging...</div>

  <div class="results" id="results">
    <div class="answers">
      <div class="card">
        <h2 class="answer-title non-rag">Non-RAG Answer</h2>
        <div class="answer" id="nonRagAnswer"></div>
        <h3>Judge</h3>
        <div class="justification" id="nonRagJustification"></div>
      </div>
      <div class="card">
        <h2 class="answer-title rag">RAG Answer</h2>
        <div class="answer" id="ragAnswer"></div>
        <div class="meta">Docs used: <span id="docsUsed">0</span></div>
        <h3>Judge</h3>
        <div class="justification" id="ragJustification"></div>
      </div>
    </div>

    <div class="card">
      <h2>Scores</h2>
      <table>
        <thead>
          <tr>
            <th>Model</th>
            <th class="num">Accuracy</th>
            <th class="num">Completeness</th>
            <th class="num">Relevance</th>
            <th class="num">Clarity</th>
            <th class="num">Grounding</th>
            <th class="num">Avg Score</th>
          </tr>
        </thead>
        <tbody id="scoreTableBody"></tbody>
      </table>
    </div>

    <div class="card verdict">
      <h2>Final Verdict</h2>
      <div class="name" id="winnerName"></div>
      <div class="reason" id="winnerReason"></div>
    </div>

    <div class="card">
      <div class="json-header">
        <h2>Programmatic Output (JSON)</h2>
        <button class="btn secondary" id="copyBtn">Copy JSON</button>
      </div>
      <pre class="json" id="jsonOutput"></pre>
    </div>
  </div>

</div>

<script>
// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------
const EMPTY_INPUT_MESSAGE = 'Please enter a question!';
const REQUEST_FAILED_MESSAGE = 'Error: Evaluation failed';
const EMPTY_TABLE_MESSAGE = 'No evaluation entries';
const COPIED_LABEL = 'COPIED';
const COPY_REVERT_MS = 2000;

function score(v, placeholder) {
  if (v === undefined || v === null || v === 0 || v === '' || v === 'N/A') return placeholder;
  return String(v);
}

function average(entry) {
  let avg = Number(entry.average_score);
  if (entry.average_score === undefined || entry.average_score === null || Number.isNaN(avg)) {
    const s = entry.scores || {};
    const vals = ['accuracy', 'completeness', 'relevance', 'clarity', 'grounding']
      .map(k => Number(s[k]))
      .filter(n => !Number.isNaN(n) && n !== 0);
    if (vals.length === 0) return '-';
    avg = vals.reduce((a, b) => a + b, 0) / vals.length;
  }
  // Round halves away from zero, always one decimal
  const r = Math.sign(avg) * Math.round(Math.abs(avg) * 10) / 10;
  return r.toFixed(1);
}

function escapeHtml(s) {
  return String(s)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;')
    .replace(/"/g, '&quot;');
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------
function createController(el, opts) {
  const revertMs = (opts && opts.revertMs) || COPY_REVERT_MS;
  let generation = 0;
  let revertTimer = null;
  let originalLabel = null;

  function setLoading(on) {
    el.loading.classList.toggle('show', on);
  }

  function setResults(on) {
    el.results.classList.toggle('show', on);
  }

  function renderTable(evaluation) {
    const entries = evaluation.evaluation || [];
    if (entries.length === 0) {
      el.scoreTableBody.innerHTML =
        `<tr><td class="empty" colspan="7">${EMPTY_TABLE_MESSAGE}</td></tr>`;
      return;
    }
    el.scoreTableBody.innerHTML = entries.map(e => {
      const s = e.scores || {};
      const cls = e.model === evaluation.final_winner ? ' class="winner"' : '';
      return `<tr${cls}>
        <td>${escapeHtml(e.model)}</td>
        <td class="num">${escapeHtml(score(s.accuracy, '-'))}</td>
        <td class="num">${escapeHtml(score(s.completeness, '-'))}</td>
        <td class="num">${escapeHtml(score(s.relevance, '-'))}</td>
        <td class="num">${escapeHtml(score(s.clarity, '-'))}</td>
        <td class="num">${escapeHtml(score(s.grounding, 'N/A'))}</td>
        <td class="num"><strong>${average(e)}</strong></td>
      </tr>`;
    }).join('');
  }

  function render(data) {
    const evaluation = data.evaluation || {};
    const preview = JSON.stringify({
      question: data.question,
      answers: data.answers,
      evaluation: data.evaluation,
    }, null, 2);

    setLoading(false);
    setResults(true);

    el.nonRagAnswer.textContent = data.answers.non_rag;
    el.ragAnswer.textContent = data.answers.rag;
    el.docsUsed.textContent = data.answers.docs_used;

    renderTable(evaluation);

    el.nonRagJustification.textContent = '';
    el.ragJustification.textContent = '';
    (evaluation.evaluation || []).forEach(e => {
      const target = e.model === 'Non-RAG' ? el.nonRagJustification : el.ragJustification;
      target.textContent = e.justification || '';
    });

    el.winnerName.textContent = evaluation.final_winner || 'Unknown';
    el.winnerReason.textContent = evaluation.reason || 'No reason provided.';
    el.jsonOutput.textContent = preview;
  }

  async function submit() {
    const question = el.questionInput.value.trim();
    if (!question) {
      alert(EMPTY_INPUT_MESSAGE);
      return;
    }

    const mine = ++generation;
    setResults(false);
    setLoading(true);
    el.submitBtn.disabled = true;

    try {
      const res = await fetch('/evaluate', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ question }),
      });
      if (!res.ok) throw new Error('HTTP ' + res.status);
      const data = await res.json();
      if (mine !== generation) return;
      render(data);
    } catch (e) {
      if (mine !== generation) return;
      console.error('evaluation failed', e);
      alert(REQUEST_FAILED_MESSAGE);
      setLoading(false);
      setResults(false);
    }
    el.submitBtn.disabled = false;
  }

  function onKey(e) {
    if (e.key === 'Enter' && !e.shiftKey && !e.ctrlKey) {
      e.preventDefault();
      submit();
    }
  }

  async function copy() {
    await navigator.clipboard.writeText(el.jsonOutput.textContent);
    if (revertTimer !== null) {
      clearTimeout(revertTimer);
    } else {
      originalLabel = el.copyBtn.textContent;
    }
    el.copyBtn.textContent = COPIED_LABEL;
    revertTimer = setTimeout(() => {
      el.copyBtn.textContent = originalLabel;
      revertTimer = null;
    }, revertMs);
  }

  function dispose() {
    if (revertTimer !== null) clearTimeout(revertTimer);
    revertTimer = null;
  }

  el.submitBtn.addEventListener('click', submit);
  el.questionInput.addEventListener('keydown', onKey);
  el.copyBtn.addEventListener('click', () => {
    copy().catch(e => console.error('copy failed', e));
  });

  return { submit, copy, dispose };
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
const ids = [
  'questionInput', 'submitBtn', 'loading', 'results', 'nonRagAnswer', 'ragAnswer',
  'docsUsed', 'scoreTableBody', 'nonRagJustification', 'ragJustification',
  'winnerName', 'winnerReason', 'jsonOutput', 'copyBtn',
];
const elements = Object.fromEntries(ids.map(id => [id, document.getElementById(id)]));
const controller = createController(elements, { revertMs: COPY_REVERT_MS });
window.addEventListener('pagehide', () => controller.dispose());
</script>
</body>
</html>
"##;
