//! Domain types shared by the loader, embedder, index, and query service.

use serde::{Deserialize, Serialize};

pub type DocId = String;

/// The atomic retrievable unit produced by the corpus builder.
///
/// - `id`: unique within a corpus build, namespaced by source
///   (`"ATTACK:<code>"` or `"SIGMA:<n>"`)
/// - `title`: short human-readable label
/// - `content`: free text body (technique description + detection guidance,
///   or the raw rule-block text)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
}

impl Document {
    /// Text representation submitted to the embedding model. The title line
    /// is embedded together with the body so that rule names and technique
    /// codes contribute to the vector.
    pub fn embed_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// One ATT&CK-style technique entry from the structured knowledge source.
/// All four fields are required; a record missing any of them fails the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueRecord {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub detection: String,
}

/// One raw rule block split out of the `---`-delimited rule file.
/// `parsed_title` is the value of the first case-insensitive `title:` line,
/// if the block has one with a non-empty value.
#[derive(Debug, Clone)]
pub struct RuleBlock {
    pub raw_text: String,
    pub parsed_title: Option<String>,
}

/// A scored document returned by the query service.
///
/// `score` is cosine similarity in [-1, 1]; higher is more similar. `id` is
/// the document's string id, never the index's internal numeric handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    pub id: DocId,
    pub title: String,
    pub content: String,
}
