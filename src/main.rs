//! Parkinson's Screening - command-line driver
//!
//! Reads one questionnaire as JSON (from a file, or stdin when the path is
//! `-` or omitted), runs the screening model, and prints the assessment.
//!
//! Usage: parkinsons-screening [QUESTIONNAIRE.json|-] [CONFIG.toml]

use anyhow::{Context, Result};
use parkinsons_screening::config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH};
use parkinsons_screening::{InferenceEngine, Questionnaire};
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parkinsons_screening={}", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_questionnaire(source: &str) -> Result<Questionnaire> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read questionnaire from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read questionnaire from {}", source))?
    };

    serde_json::from_str(&raw).context("Failed to parse questionnaire")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let source = args.get(1).map(|s| s.as_str()).unwrap_or("-");
    let config_path = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);

    let config = AppConfig::load_from_path(config_path)?;
    init_logging(&config.logging);

    info!(
        model = %config.model.path,
        threshold = config.assessment.threshold,
        "Configuration loaded"
    );

    let engine = InferenceEngine::new(&config);

    // Warm-up runs concurrently with reading the input.
    let (loaded, questionnaire) = tokio::join!(engine.load(), read_questionnaire(source));
    if let Err(e) = &loaded {
        error!(error = %e, "Model warm-up failed");
    }
    let questionnaire = questionnaire?;

    let assessment = engine.assess(&questionnaire).await.map_err(|e| {
        error!(error = %e, "Analysis failed");
        e
    })?;

    info!(
        probability = assessment.probability,
        outcome = ?assessment.outcome,
        confidence_pct = assessment.confidence_pct,
        "Assessment complete"
    );

    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}
