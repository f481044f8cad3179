//! ragjudge: LLM-as-a-judge comparison of RAG and Non-RAG answers.
//!
//! The binary (`src/main.rs`) is a thin clap front end over these modules;
//! integration tests under `tests/` use them directly.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod controller;
pub mod evaluation;
pub mod judge;
pub mod llm;
pub mod rag;
pub mod web;
