use anyhow::{Context, Result};
use emr_bridge::{load_bridge_config, FieldKey, PageDocument, StrategyManager};
use serde_json::json;

/// Usage: emr-inspect <snapshot.html> [page-url] [field...]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("Usage: emr-inspect <snapshot.html> [page-url] [field...]");
        std::process::exit(2);
    };

    let html =
        std::fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path))?;
    let url = args.get(1).filter(|a| a.contains("://"));
    let doc = match url {
        Some(url) => PageDocument::parse_with_url(&html, url),
        None => PageDocument::parse(&html),
    };
    let fields: Vec<&String> = args.iter().skip(if url.is_some() { 2 } else { 1 }).collect();

    let manager = StrategyManager::from_config(&load_bridge_config());
    let ctx = manager.context(&doc);

    let lookups: Vec<_> = fields
        .iter()
        .map(|name| {
            let known = FieldKey::parse_str(name).is_some();
            json!({ "field": name, "known": known, "result": ctx.extract_field(name) })
        })
        .collect();

    let report = json!({
        "detection": ctx.detect_emr(),
        "parsing": ctx.parse_patient_data(),
        "fields": lookups,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
