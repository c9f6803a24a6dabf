use std::env;

use socrag_core::config::{expand_path, Config};
use socrag_core::corpus;
use socrag_core::loader::{load_rule_blocks, load_technique_records};
use socrag_embed::get_default_embedder;
use socrag_index::DEFAULT_TOP_K;
use socrag_retrieval::Retriever;

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut query: Option<String> = None;
    let mut top_k = DEFAULT_TOP_K;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" | "-k" => {
                if i + 1 < args.len() {
                    if let Ok(k) = args[i + 1].parse::<usize>() {
                        top_k = k;
                        i += 1;
                    } else {
                        eprintln!("Error: --top-k requires a number");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("Error: --top-k requires a number");
                    std::process::exit(1);
                }
            }
            _ if !args[i].starts_with('-') => query = Some(args[i].clone()),
            _ => {
                eprintln!("Usage: socrag-ingest [query] [--top-k N]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let query = query.unwrap_or_else(|| {
        config
            .get("search.demo_query")
            .unwrap_or_else(|_| "suspicious access to lsass.exe handle".to_string())
    });
    let attack_path = expand_path(
        config
            .get::<String>("data.attack_path")
            .unwrap_or_else(|_| "data/knowledge/attack.json".to_string()),
    );
    let sigma_path = expand_path(
        config
            .get::<String>("data.sigma_path")
            .unwrap_or_else(|_| "data/knowledge/sigma_rules.yml".to_string()),
    );

    println!("SOC Knowledge Ingest\n====================");
    println!("Technique source: {}", attack_path.display());
    println!("Rule source: {}", sigma_path.display());

    let records = load_technique_records(&attack_path)?;
    let blocks = load_rule_blocks(&sigma_path)?;
    let corpus = corpus::build(&records, &blocks);
    println!(
        "📚 Corpus: {} technique records + {} rule blocks = {} documents",
        records.len(),
        blocks.len(),
        corpus.len()
    );

    let embedder = get_default_embedder()?;
    let retriever = Retriever::build(embedder, &corpus)?;
    println!(
        "🧮 Vector index ready: {} documents, {} dims",
        retriever.len(),
        retriever.dim()
    );

    println!("\nTop results for: {}", query);
    let hits = retriever.search(&query, top_k)?;
    for hit in &hits {
        println!("- ({:.3}) {} -> {}", hit.score, hit.title, hit.id);
    }
    Ok(())
}
