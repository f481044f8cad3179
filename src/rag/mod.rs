//! Keyword retrieval over a directory of plain-text documents.
//!
//! Every `*.txt` file in the documents directory becomes one [`Document`].
//! Retrieval is a bag-of-words overlap: a document scores one point for each
//! distinct query word that appears anywhere in its lowercased content.
//! Documents with no overlap are never returned.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File written into a freshly created documents directory.
pub const SAMPLE_DOCUMENT_NAME: &str = "sample_ai_knowledge.txt";

const SAMPLE_DOCUMENT: &str = "RAG (Retrieval-Augmented Generation) is a technique that enhances LLM accuracy by retrieving external data. Non-RAG models rely solely on training data.";

/// Default number of documents handed to the RAG prompt.
pub const DEFAULT_TOP_K: usize = 2;

/// A loaded text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name the document was loaded from.
    pub source: String,
    pub content: String,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// In-memory document store with keyword retrieval.
#[derive(Debug, Clone, Default)]
pub struct RagEngine {
    docs_path: Option<PathBuf>,
    documents: Vec<Document>,
}

impl RagEngine {
    /// Load all `*.txt` documents from `docs_path`.
    ///
    /// A missing directory is created and seeded with a sample document so
    /// a fresh install has something to retrieve.
    pub fn load(docs_path: impl AsRef<Path>) -> Result<Self> {
        let mut engine = Self {
            docs_path: Some(docs_path.as_ref().to_path_buf()),
            documents: Vec::new(),
        };
        engine.reload()?;
        Ok(engine)
    }

    /// Build an engine from documents already in memory.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            docs_path: None,
            documents,
        }
    }

    /// Re-read the documents directory. No-op for in-memory engines.
    pub fn reload(&mut self) -> Result<()> {
        let Some(dir) = self.docs_path.clone() else {
            return Ok(());
        };

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create documents directory {}", dir.display()))?;
            fs::write(dir.join(SAMPLE_DOCUMENT_NAME), SAMPLE_DOCUMENT)
                .context("failed to write sample document")?;
            tracing::info!(path = %dir.display(), "created documents directory with a sample document");
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("failed to read documents directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        self.documents = paths
            .into_iter()
            .filter_map(|path| {
                let source = path.file_name()?.to_string_lossy().to_string();
                match fs::read_to_string(&path) {
                    Ok(content) => Some(Document { source, content }),
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "skipping unreadable document");
                        None
                    }
                }
            })
            .collect();

        tracing::debug!(count = self.documents.len(), "documents loaded");
        Ok(())
    }

    /// All loaded documents.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Return up to `k` documents ranked by keyword overlap with `query`.
    ///
    /// Ties keep load order (file name order for directory-backed engines).
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<&Document> {
        let query_lower = query.to_lowercase();
        let words: HashSet<&str> = query_lower.split_whitespace().collect();

        let mut scored: Vec<(usize, &Document)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let content = doc.content.to_lowercase();
                let score = words.iter().filter(|w| content.contains(*w)).count();
                (score > 0).then_some((score, doc))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, doc)| doc).collect()
    }
}

/// Render retrieved documents as the context block of the RAG prompt.
pub fn format_context(docs: &[&Document]) -> String {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| format!("Document {} ({}):\n{}\n\n", i + 1, doc.source, doc.content))
        .collect()
}
