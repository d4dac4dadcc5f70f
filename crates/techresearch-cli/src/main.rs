//! Manual smoke-test tool for the research agent handler.
//!
//! Loads a local environment file, builds the handler in-process, and runs a
//! few hand-picked requests, printing outcomes for human inspection. This is
//! a developer convenience, not an automated test suite.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use techresearch_lambda_agent::{bootstrap, ResearchHandler};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Smoke-test the research agent handler without deploying"
)]
struct Cli {
    /// Local environment file with crew endpoint and secret store settings.
    #[arg(long, default_value = ".env.agentcore")]
    env_file: PathBuf,

    /// Topic to research; may be repeated.
    #[arg(long = "topic")]
    topics: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if !cli.env_file.exists() {
        eprintln!("WARNING: {} not found!", cli.env_file.display());
        eprintln!("Create it with your API keys before testing.");
        process::exit(1);
    }

    dotenv::from_path(&cli.env_file)
        .with_context(|| format!("failed to load {}", cli.env_file.display()))?;

    let handler = bootstrap().context("failed to build the research handler")?;

    let topics = if cli.topics.is_empty() {
        vec!["Quantum Computing".to_string()]
    } else {
        cli.topics.clone()
    };

    for (index, topic) in topics.iter().enumerate() {
        banner(&format!("TEST {}: Research Request", index + 1));
        run_topic(&handler, topic, index + 1);
    }

    banner("TEST: Missing Topic (Error Handling)");
    run_missing_topic(&handler);

    banner("Smoke test completed!");
    Ok(())
}

fn run_topic(handler: &ResearchHandler, topic: &str, index: usize) {
    let event = json!({ "topic": topic });
    println!("Input: {}", event);

    let envelope = handler.handle(&event, &format!("smoke-{}", index));
    println!("Status Code: {}", envelope.status_code);

    match envelope.body_json() {
        Ok(body) => describe_body(&body),
        Err(e) => println!("Unreadable body: {}", e),
    }
}

fn describe_body(body: &Value) {
    let success = body["success"].as_bool().unwrap_or(false);
    println!("Success: {}", success);

    if success {
        match &body["report"] {
            Value::Object(report) => {
                if let Some(title) = report.get("title").and_then(Value::as_str) {
                    println!("Report Title: {}", title);
                }
                let sections = report
                    .get("sections")
                    .and_then(Value::as_array)
                    .map(|sections| sections.len())
                    .unwrap_or(0);
                println!("Sections: {}", sections);
            }
            Value::String(text) => println!("Report: {} characters of text", text.chars().count()),
            _ => {}
        }
    } else {
        println!("Error: {}", body["error"].as_str().unwrap_or("<unknown>"));
    }
}

fn run_missing_topic(handler: &ResearchHandler) {
    let event = json!({});
    println!("Input: {}", event);

    let envelope = handler.handle(&event, "smoke-missing-topic");
    println!("Status Code: {}", envelope.status_code);

    if envelope.status_code == 400 {
        println!("PASS: correctly handled the missing parameter");
    } else {
        println!("FAIL: expected a 400 status code");
    }
}

fn banner(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
