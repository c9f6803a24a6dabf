//! Merges loader outputs into one ordered document collection.

use crate::types::{Document, RuleBlock, TechniqueRecord};

/// Technique documents first, then rule documents, each source keeping its
/// internal order. A document's position in the returned list is the numeric
/// handle the vector index assigns it, so this order is load-bearing.
pub fn build(records: &[TechniqueRecord], blocks: &[RuleBlock]) -> Vec<Document> {
    let mut corpus = Vec::with_capacity(records.len() + blocks.len());
    for record in records {
        corpus.push(Document {
            id: format!("ATTACK:{}", record.id),
            title: format!("{} - {}", record.id, record.name),
            content: format!("{} Detection: {}", record.desc, record.detection),
        });
    }
    for (i, block) in blocks.iter().enumerate() {
        let n = i + 1;
        corpus.push(Document {
            id: format!("SIGMA:{}", n),
            title: block
                .parsed_title
                .clone()
                .unwrap_or_else(|| format!("Sigma {}", n)),
            content: block.raw_text.clone(),
        });
    }
    corpus
}
