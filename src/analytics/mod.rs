//! Evaluation history: the JSONL log written by the server and the
//! aggregation behind `ragjudge stats`.

pub mod logger;
pub mod reporter;
