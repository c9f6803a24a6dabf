//! Parsers for the two knowledge sources: a JSON list of technique records
//! and a separator-delimited file of detection-rule blocks.

use crate::error::{Error, Result};
use crate::types::{RuleBlock, TechniqueRecord};
use std::fs;
use std::path::Path;

/// Separator token between rule blocks. Matches the document marker used by
/// multi-rule Sigma files.
pub const RULE_BLOCK_SEPARATOR: &str = "---";

pub fn load_technique_records(path: &Path) -> Result<Vec<TechniqueRecord>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::MalformedSource(format!("cannot read {}: {}", path.display(), e)))?;
    parse_technique_records(&raw)
}

/// Strict parse: the source must be a JSON list and every record must carry
/// all four fields. An empty list is fine.
pub fn parse_technique_records(raw: &str) -> Result<Vec<TechniqueRecord>> {
    serde_json::from_str(raw)
        .map_err(|e| Error::MalformedSource(format!("technique records: {}", e)))
}

pub fn load_rule_blocks(path: &Path) -> Result<Vec<RuleBlock>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::MalformedSource(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(parse_rule_blocks(&raw))
}

/// Split on the separator token and keep every block with content left after
/// trimming. The title is taken from the first line whose key is `title`
/// (case-insensitive); a title line with an empty value counts as no title.
pub fn parse_rule_blocks(raw: &str) -> Vec<RuleBlock> {
    raw.split(RULE_BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| RuleBlock {
            raw_text: block.to_string(),
            parsed_title: extract_title(block),
        })
        .collect()
}

fn extract_title(block: &str) -> Option<String> {
    for line in block.lines() {
        let matches_key = line
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("title:"));
        if matches_key {
            let value = line[6..].trim();
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}
