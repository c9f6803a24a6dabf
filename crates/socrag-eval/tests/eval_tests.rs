use std::fs;
use tempfile::TempDir;

use socrag_eval::{load_rows, score, score_echo, EvalSummary, GoldRow, PredRow};

fn gold_row(output: &str) -> GoldRow {
    serde_json::from_str(&format!("{{\"output\": {}}}", serde_json::json!(output)))
        .expect("gold row")
}

fn wrapped_pred(output: &str) -> PredRow {
    serde_json::from_str(&format!("{{\"output\": {}}}", serde_json::json!(output)))
        .expect("pred row")
}

const MALICIOUS_T1003: &str =
    r#"{"verdict":"malicious","ttp_mapping":[{"technique_id":"T1003"}]}"#;

#[test]
fn identical_rows_score_perfectly() {
    let gold = vec![gold_row(MALICIOUS_T1003)];
    let pred = vec![wrapped_pred(MALICIOUS_T1003)];
    assert_eq!(
        score(&gold, &pred),
        EvalSummary {
            n: 1,
            verdict_acc: 1.0,
            ttp_overlap_rate: 1.0
        }
    );
}

#[test]
fn verdict_mismatch_with_shared_ttps() {
    let gold = vec![gold_row(MALICIOUS_T1003)];
    let pred = vec![wrapped_pred(
        r#"{"verdict":"benign","ttp_mapping":[{"technique_id":"T1003"}]}"#,
    )];
    let summary = score(&gold, &pred);
    assert_eq!(summary.verdict_acc, 0.0);
    assert_eq!(summary.ttp_overlap_rate, 1.0);
}

#[test]
fn empty_gold_scores_zero_without_error() {
    let summary = score(&[], &[]);
    assert_eq!(
        summary,
        EvalSummary {
            n: 0,
            verdict_acc: 0.0,
            ttp_overlap_rate: 0.0
        }
    );
}

#[test]
fn unparseable_pair_is_skipped_but_n_is_fixed() {
    let gold = vec![gold_row(MALICIOUS_T1003), gold_row(MALICIOUS_T1003)];
    let pred = vec![
        wrapped_pred("not json at all"),
        wrapped_pred(MALICIOUS_T1003),
    ];
    let summary = score(&gold, &pred);
    assert_eq!(summary.n, 2, "n counts gold rows, not parsed pairs");
    assert_eq!(summary.verdict_acc, 0.5);
    assert_eq!(summary.ttp_overlap_rate, 0.5);
}

#[test]
fn gold_row_without_output_still_loads_and_skips_its_pair() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("gold.jsonl");
    fs::write(
        &path,
        format!(
            "{{\"output\": {}}}\n{{\"prompt\": \"row with no labeled answer\"}}\n",
            serde_json::json!(MALICIOUS_T1003),
        ),
    )
    .unwrap();

    let gold: Vec<GoldRow> = load_rows(&path).expect("load");
    assert_eq!(gold.len(), 2);

    let pred = vec![wrapped_pred(MALICIOUS_T1003), wrapped_pred(MALICIOUS_T1003)];
    let summary = score(&gold, &pred);
    assert_eq!(summary.n, 2, "n counts gold rows, not parsed pairs");
    assert_eq!(summary.verdict_acc, 0.5);
    assert_eq!(summary.ttp_overlap_rate, 0.5);
}

#[test]
fn gold_row_with_non_string_output_is_skipped() {
    let gold: Vec<GoldRow> = vec![
        serde_json::from_str(r#"{"output": 42}"#).expect("gold row"),
        gold_row(MALICIOUS_T1003),
    ];
    let pred = vec![wrapped_pred(MALICIOUS_T1003), wrapped_pred(MALICIOUS_T1003)];
    let summary = score(&gold, &pred);
    assert_eq!(summary.n, 2);
    assert_eq!(summary.verdict_acc, 0.5);
    assert_eq!(summary.ttp_overlap_rate, 0.5);
}

#[test]
fn shorter_pred_side_truncates_pairing() {
    let gold = vec![gold_row(MALICIOUS_T1003), gold_row(MALICIOUS_T1003)];
    let pred = vec![wrapped_pred(MALICIOUS_T1003)];
    let summary = score(&gold, &pred);
    assert_eq!(summary.n, 2);
    assert_eq!(summary.verdict_acc, 0.5);
}

#[test]
fn wrapped_and_bare_predictions_score_identically() {
    let gold = vec![gold_row(MALICIOUS_T1003)];
    let wrapped = vec![wrapped_pred(MALICIOUS_T1003)];
    let bare: Vec<PredRow> = vec![serde_json::from_str(MALICIOUS_T1003).expect("bare row")];
    assert_eq!(score(&gold, &wrapped), score(&gold, &bare));
}

#[test]
fn absent_verdicts_compare_equal() {
    let gold = vec![gold_row(r#"{"ttp_mapping":[{"technique_id":"T1059"}]}"#)];
    let pred = vec![wrapped_pred(r#"{"ttp_mapping":[{"technique_id":"T1059"}]}"#)];
    let summary = score(&gold, &pred);
    assert_eq!(summary.verdict_acc, 1.0);
    assert_eq!(summary.ttp_overlap_rate, 1.0);
}

#[test]
fn empty_technique_ids_never_overlap() {
    let gold = vec![gold_row(
        r#"{"verdict":"malicious","ttp_mapping":[{"technique_id":""},{}]}"#,
    )];
    let pred = vec![wrapped_pred(
        r#"{"verdict":"malicious","ttp_mapping":[{"technique_id":""}]}"#,
    )];
    let summary = score(&gold, &pred);
    assert_eq!(summary.verdict_acc, 1.0);
    assert_eq!(summary.ttp_overlap_rate, 0.0, "blank ids are filtered out");
}

#[test]
fn thirds_round_to_three_decimals() {
    let gold = vec![
        gold_row(MALICIOUS_T1003),
        gold_row(MALICIOUS_T1003),
        gold_row(MALICIOUS_T1003),
    ];
    let pred = vec![
        wrapped_pred(MALICIOUS_T1003),
        wrapped_pred(r#"{"verdict":"benign","ttp_mapping":[]}"#),
        wrapped_pred(r#"{"verdict":"benign","ttp_mapping":[]}"#),
    ];
    let summary = score(&gold, &pred);
    assert_eq!(summary.verdict_acc, 0.333);
    assert_eq!(summary.ttp_overlap_rate, 0.333);
}

#[test]
fn echo_mode_scores_perfectly() {
    let gold = vec![gold_row(MALICIOUS_T1003), gold_row(MALICIOUS_T1003)];
    assert_eq!(
        score_echo(&gold),
        EvalSummary {
            n: 2,
            verdict_acc: 1.0,
            ttp_overlap_rate: 1.0
        }
    );
}

#[test]
fn echo_mode_skips_rows_without_a_parseable_output() {
    let gold: Vec<GoldRow> = vec![
        serde_json::from_str(r#"{"prompt": "unlabeled"}"#).expect("gold row"),
        gold_row(MALICIOUS_T1003),
    ];
    let summary = score_echo(&gold);
    assert_eq!(summary.n, 2);
    assert_eq!(summary.verdict_acc, 0.5);
    assert_eq!(summary.ttp_overlap_rate, 0.5);
}

#[test]
fn load_rows_skips_blank_lines_and_ignores_extra_fields() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("gold.jsonl");
    fs::write(
        &path,
        format!(
            "{{\"instruction\": \"triage this\", \"output\": {}}}\n\n  \n{{\"output\": {}}}\n",
            serde_json::json!(MALICIOUS_T1003),
            serde_json::json!(MALICIOUS_T1003),
        ),
    )
    .unwrap();

    let rows: Vec<GoldRow> = load_rows(&path).expect("load");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].output, MALICIOUS_T1003);
}

#[test]
fn load_rows_reports_the_offending_line() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("gold.jsonl");
    fs::write(&path, "{\"output\": \"{}\"}\nnot-json\n").unwrap();

    let err = load_rows::<GoldRow>(&path).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"), "err was: {err:#}");
}

#[test]
fn summary_serializes_with_metric_names() {
    let summary = score(&[], &[]);
    let json = serde_json::to_string(&summary).expect("serialize");
    assert!(json.contains("\"n\":0"));
    assert!(json.contains("\"verdict_acc\":0.0"));
    assert!(json.contains("\"ttp_overlap_rate\":0.0"));
}
