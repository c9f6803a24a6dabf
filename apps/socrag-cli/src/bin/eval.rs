use std::env;
use std::path::PathBuf;

use socrag_eval::{load_rows, score, score_echo, GoldRow, PredRow};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut gold_path = PathBuf::from("data/val.jsonl");
    let mut pred_path: Option<PathBuf> = None;
    let mut echo = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--gold" => {
                if i + 1 < args.len() {
                    gold_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                } else {
                    eprintln!("Error: --gold requires a path");
                    std::process::exit(1);
                }
            }
            "--pred" => {
                if i + 1 < args.len() {
                    pred_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --pred requires a path");
                    std::process::exit(1);
                }
            }
            "--echo" => echo = true,
            _ => {
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if echo && pred_path.is_some() {
        eprintln!("Error: --echo and --pred are mutually exclusive");
        std::process::exit(1);
    }
    if !echo && pred_path.is_none() {
        eprintln!("Error: pass --pred <file> for a real run, or --echo to self-score the gold file");
        print_usage();
        std::process::exit(1);
    }

    let gold: Vec<GoldRow> = load_rows(&gold_path)?;
    let summary = if let Some(pred_path) = pred_path {
        let pred: Vec<PredRow> = load_rows(&pred_path)?;
        score(&gold, &pred)
    } else {
        eprintln!("⚠️  Echo mode: scoring gold against itself to show the expected format");
        score_echo(&gold)
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: socrag-eval --pred <predictions.jsonl> [--gold <gold.jsonl>]");
    eprintln!("       socrag-eval --echo [--gold <gold.jsonl>]");
    eprintln!("Scores verdict accuracy and TTP overlap against gold labels (default gold: data/val.jsonl).");
}
