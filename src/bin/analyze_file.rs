use anyhow::{anyhow, Context};
use authorship_lens::init_logging;
use authorship_lens::models::AnalysisResult;
use authorship_lens::services::config_store::{AppConfig, ConfigStore, OracleBackend};
use authorship_lens::services::detection::Analyzer;
use authorship_lens::services::file_reader::read_document;
use authorship_lens::services::oracle::ConfiguredOracle;
use std::path::Path;

const USAGE: &str = "Usage:
  analyze_file <path.pdf|path.docx|path.txt> [--out <json_path>] [--oracle-url <url>] [--quiet]
  analyze_file --text \"<inline text>\" [--out <json_path>] [--oracle-url <url>] [--quiet]
  analyze_file --save-config [--oracle-url <url>]

Notes:
  - Without an oracle URL (flag, config or AUTHORSHIP_LENS_ORACLE_URL) the offline heuristic scorer is used.
  - `--save-config` writes the config file (with `--oracle-url` applied), backing up the previous one.
  - `--quiet` prints only the verdict line.";

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn use_oracle_url(config: &mut AppConfig, url: &str) {
    config.oracle.base_url = url.to_string();
    config.oracle.backend = OracleBackend::Http;
}

/// Effective config: file, then environment, then `--oracle-url`.
/// With `save`, the file config plus `--oracle-url` is written back first.
fn load_config(oracle_url: Option<&str>, save: bool) -> anyhow::Result<AppConfig> {
    let store = ConfigStore::default_config_dir().map(ConfigStore::new);
    let mut file_config = match &store {
        Some(store) => store.load().map_err(|e| anyhow!(e))?,
        None => AppConfig::default(),
    };

    if save {
        let store = store
            .as_ref()
            .ok_or_else(|| anyhow!("no config directory available on this platform"))?;
        if let Some(url) = oracle_url {
            use_oracle_url(&mut file_config, url);
        }
        let backup = store.save(&file_config).map_err(|e| anyhow!(e))?;
        println!("Saved config: {}", store.config_file().display());
        if let Some(backup) = backup {
            println!("Previous config backed up to: {}", backup.display());
        }
    }

    let mut config = file_config.with_env_overrides();
    if let Some(url) = oracle_url {
        use_oracle_url(&mut config, url);
    }
    Ok(config)
}

fn print_summary(result: &AnalysisResult, quiet: bool) {
    let Some(report) = result.report.as_ref() else {
        println!("Error: {}", result.error.as_deref().unwrap_or("unknown"));
        return;
    };
    let verdict = &report.verdict;
    println!(
        "Verdict: {} ({}% AI / {}% human, {} confidence)",
        verdict.classification.label(),
        verdict.ai_percentage,
        verdict.human_percentage,
        verdict.confidence.label()
    );
    if quiet {
        return;
    }
    if report.truncated {
        println!("(input truncated before analysis)");
    }
    println!();

    let m = &report.metrics;
    println!("Metrics:");
    println!("  perplexity           {:.2}", m.perplexity);
    println!("  lexical diversity    {:.4}", m.lexical_diversity);
    println!("  repetition score     {:.4}", m.repetition_score);
    println!("  burstiness           {:.2}", m.burstiness);
    println!(
        "  sentences            {} (avg {:.2} words, std {:.2})",
        m.sentences, m.avg_sentence_length, m.std_sentence_length
    );
    println!();

    println!("Reasons:");
    for reason in &verdict.reasons {
        println!("  - {}", reason);
    }
    println!();

    let flagged = report.sentences.iter().filter(|s| s.ai_like).count();
    println!("Sentences scored: {} ({} AI-like)", report.sentences.len(), flagged);
    for (i, s) in report.sentences.iter().enumerate() {
        println!(
            "[S{:04}] ppl={:>7.2} {}  {}",
            i,
            s.perplexity,
            if s.ai_like { "AI " } else { "   " },
            preview(&s.text, 100)
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let inline_text = parse_arg_value(&args, "--text");
    let path = args.get(1).filter(|a| !a.starts_with("--")).cloned();
    let save_config = has_flag(&args, "--save-config");
    if path.is_none() && inline_text.is_none() && !save_config {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    init_logging();

    let out_path = parse_arg_value(&args, "--out");
    let quiet = has_flag(&args, "--quiet");
    let oracle_url = parse_arg_value(&args, "--oracle-url");
    let config = load_config(oracle_url.as_deref(), save_config)?;
    if path.is_none() && inline_text.is_none() {
        return Ok(());
    }

    let text = match (inline_text, &path) {
        (Some(text), _) => text,
        (None, Some(path)) => read_document(Path::new(path))
            .with_context(|| format!("failed to read {}", path))?,
        (None, None) => return Err(anyhow!("no input given")),
    };

    let oracle = ConfiguredOracle::from_config(&config.oracle);
    if !quiet {
        println!("Source: {}", path.as_deref().unwrap_or("(inline text)"));
        println!("Extracted: {} chars", text.chars().count());
        println!("Oracle: {}", oracle.describe());
        if let ConfiguredOracle::Http(http) = &oracle {
            if !http.is_available().await {
                println!("Warning: scoring service at {} did not answer its health check", http.base_url());
            }
        }
        println!();
    }

    let analyzer = Analyzer::from_config(&oracle, &config);
    let result = analyzer
        .analyze(&text)
        .await
        .context("perplexity scoring failed")?;

    print_summary(&result, quiet);

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        if !quiet {
            println!();
            println!("Wrote JSON: {}", out_path);
        }
    }

    Ok(())
}
