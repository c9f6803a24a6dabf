//! Scores model verdict/TTP outputs against gold-labeled examples.
//!
//! Gold and prediction files are JSONL. Rows are paired positionally; a row
//! whose report cannot be parsed drops its pair from the numerators while
//! `n` stays fixed at the gold row count. Two metrics come out: exact
//! verdict accuracy and the rate of pairs whose technique-id sets intersect.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One gold row: the labeled answer is a JSON-encoded report string under
/// `output`. Extra fields (prompt, input, metadata) are ignored. A missing
/// or non-string `output` still loads; it can never parse into a report, so
/// the row only ever skips its pair.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldRow {
    #[serde(default)]
    pub output: serde_json::Value,
}

/// One prediction row. Model logs come in two shapes: wrapped like gold, or
/// already the bare report object. Both normalize to a [`VerdictReport`]
/// before any comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredRow {
    Wrapped { output: String },
    Bare(VerdictReport),
}

/// Canonical report shape both sides are normalized into.
#[derive(Debug, Clone, Deserialize)]
pub struct VerdictReport {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub ttp_mapping: Vec<TtpMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtpMapping {
    #[serde(default)]
    pub technique_id: Option<String>,
}

impl VerdictReport {
    /// Distinct non-empty technique ids.
    fn technique_ids(&self) -> HashSet<&str> {
        self.ttp_mapping
            .iter()
            .filter_map(|t| t.technique_id.as_deref())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub n: usize,
    pub verdict_acc: f64,
    pub ttp_overlap_rate: f64,
}

/// Read a JSONL file into typed rows. Blank lines are skipped; a line that
/// is not valid JSON for `T` is a hard error naming the line, since an
/// unreadable input file should stop the run rather than skew the metrics.
pub fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let row: T = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON record at line {}", idx + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

fn normalize_gold(row: &GoldRow) -> Option<VerdictReport> {
    row.output
        .as_str()
        .and_then(|s| serde_json::from_str(s).ok())
}

fn normalize_pred(row: &PredRow) -> Option<VerdictReport> {
    match row {
        PredRow::Wrapped { output } => serde_json::from_str(output).ok(),
        PredRow::Bare(report) => Some(report.clone()),
    }
}

/// Pair rows positionally and compute the summary. The shorter side
/// truncates the pairing; `n` is always the gold row count. Absent verdicts
/// compare equal, so two reports that both omit the field count as a match.
pub fn score(gold: &[GoldRow], pred: &[PredRow]) -> EvalSummary {
    let total = gold.len();
    let mut correct_verdict = 0usize;
    let mut ttp_hits = 0usize;

    for (g, p) in gold.iter().zip(pred.iter()) {
        let (gjs, pjs) = match (normalize_gold(g), normalize_pred(p)) {
            (Some(gjs), Some(pjs)) => (gjs, pjs),
            _ => continue,
        };
        if gjs.verdict == pjs.verdict {
            correct_verdict += 1;
        }
        if !gjs.technique_ids().is_disjoint(&pjs.technique_ids()) {
            ttp_hits += 1;
        }
    }

    EvalSummary {
        n: total,
        verdict_acc: ratio(correct_verdict, total),
        ttp_overlap_rate: ratio(ttp_hits, total),
    }
}

/// Self-score: every gold row echoed back as its own prediction. This only
/// demonstrates the expected format; parseable rows trivially score 1.0.
pub fn score_echo(gold: &[GoldRow]) -> EvalSummary {
    let pred: Vec<PredRow> = gold
        .iter()
        .map(|g| PredRow::Wrapped {
            output: g.output.as_str().unwrap_or("").to_string(),
        })
        .collect();
    score(gold, &pred)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round3(numerator as f64 / denominator as f64)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
