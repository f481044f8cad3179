//! Prompt templates for answer generation and judging.
//!
//! The judge prompt pins the exact JSON structure the rest of the system
//! deserializes into [`crate::evaluation::Verdict`], including the model
//! labels `Non-RAG` and `RAG` used for winner matching.

/// Appended to the system prompt of every JSON completion.
pub const JSON_ONLY_SUFFIX: &str = "\nIMPORTANT: Return ONLY valid JSON.";

/// Prompt for the answer generated without retrieved context.
pub fn non_rag_prompt(question: &str) -> String {
    format!("Question: {question}\nAnswer the question concisely.")
}

/// Prompt for the answer generated from retrieved context.
pub fn rag_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}\nUsing the context above, answer the question.")
}

/// System prompt for the judge.
pub const JUDGE_SYSTEM_PROMPT: &str = "You are an expert LLM-as-a-Judge. Your task is to evaluate two answers to a question:
1. A Non-RAG answer (generated without external context).
2. A RAG answer (generated using retrieved context).

You must evaluate them on:
- Accuracy (1-5)
- Completeness (1-5)
- Relevance (1-5)
- Clarity (1-5)
- Grounding (1-5, only applicable for RAG)

Provide a JSON response with scores, justification, and a final winner.
";

/// User prompt for the judge: both answers, the RAG context and the
/// required output structure.
pub fn judge_user_prompt(question: &str, context: &str, non_rag: &str, rag: &str) -> String {
    format!(
        r#"
QUESTION: {question}

---
CONTEXT USED FOR RAG:
{context}
---

ANSWER 1 (Non-RAG):
{non_rag}

ANSWER 2 (RAG):
{rag}

---

Evaluate both answers.
For "Grounding" in Non-RAG, put "N/A" or 0.
Determine a Final Winner based on which answer is objectively better given the question and context.

Output format MUST be valid JSON matching this structure:
{{
  "evaluation": [
    {{
      "model": "Non-RAG",
      "scores": {{
        "accuracy": <int>,
        "completeness": <int>,
        "relevance": <int>,
        "clarity": <int>
      }},
      "average_score": <float>,
      "justification": "<string>"
    }},
    {{
      "model": "RAG",
      "scores": {{
        "accuracy": <int>,
        "completeness": <int>,
        "relevance": <int>,
        "clarity": <int>,
        "grounding": <int>
      }},
      "average_score": <float>,
      "justification": "<string>"
    }}
  ],
  "final_winner": "Non-RAG" or "RAG",
  "reason": "<string>"
}}
"#
    )
}
