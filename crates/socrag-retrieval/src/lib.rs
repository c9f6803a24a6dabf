//! Query service: bulk-embeds a corpus into the vector index and answers
//! top-k text queries against it.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use socrag_core::traits::Embedder;
use socrag_core::types::{Document, SearchHit};
use socrag_index::{VectorIndex, DEFAULT_TOP_K};

/// Documents embedded per `embed_batch` call during the bulk load.
const EMBED_BATCH_SIZE: usize = 32;

/// Owns the embedder and the index for the life of the process. Built once,
/// read-only afterwards.
pub struct Retriever {
    embedder: Box<dyn Embedder>,
    index: VectorIndex,
}

impl Retriever {
    /// Embed the whole corpus and bulk-load the index, preserving corpus
    /// order so index positions line up with document positions.
    pub fn build(embedder: Box<dyn Embedder>, corpus: &[Document]) -> Result<Self> {
        if corpus.is_empty() {
            println!("No documents to index");
            let index = VectorIndex::build(Vec::new())?;
            return Ok(Self { embedder, index });
        }

        println!("Indexing {} documents into the in-memory vector index", corpus.len());
        let pb = ProgressBar::new(corpus.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs ({percent}%) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut entries = Vec::with_capacity(corpus.len());
        for batch in corpus.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(Document::embed_text).collect();
            let vectors = embedder.embed_batch(&texts)?;
            anyhow::ensure!(
                vectors.len() == batch.len(),
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            );
            for (document, vector) in batch.iter().zip(vectors) {
                entries.push((vector, document.clone()));
            }
            pb.set_position(entries.len() as u64);
        }
        pb.finish_with_message("✅ Indexing completed");

        let index = VectorIndex::build(entries)?;
        Ok(Self { embedder, index })
    }

    /// Embed `text` and return the top-k hits. Query vectors go through the
    /// same provider as indexed documents, so scores are directly
    /// comparable. Empty text is not special-cased.
    pub fn search(&self, text: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let query = self.embedder.embed_one(text)?;
        let points = self.index.search(&query, top_k)?;
        Ok(points
            .into_iter()
            .map(|p| SearchHit {
                score: p.score,
                id: p.document.id,
                title: p.document.title,
                content: p.document.content,
            })
            .collect())
    }

    pub fn search_default(&self, text: &str) -> Result<Vec<SearchHit>> {
        self.search(text, DEFAULT_TOP_K)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.index.dim()
    }
}
