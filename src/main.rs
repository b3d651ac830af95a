// Roundtable - multi-persona LLM debates
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use roundtable::config::{load_config, DebateConfig};
use roundtable::debate::events::{self, DebateEvent};
use roundtable::debate::DebateSession;
use roundtable::generators::ModelGateway;

#[derive(Parser)]
#[command(name = "roundtable")]
#[command(about = "Stage a multi-round debate between generated personas")]
struct Cli {
    /// Debate topic
    #[arg(long)]
    topic: String,

    /// Config file (default: ~/.roundtable/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of debate rounds
    #[arg(long)]
    rounds: Option<u32>,

    /// Number of personas to generate
    #[arg(long)]
    personas: Option<u32>,

    /// Carry history turn by turn instead of round by round
    #[arg(long)]
    continuous: bool,

    /// Model name (gpt-* or gemini-*)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut DebateConfig) {
        if let Some(rounds) = self.rounds {
            config.debate_params.num_debate_rounds = rounds;
        }
        if let Some(personas) = self.personas {
            config.debate_params.num_personas = personas;
        }
        if self.continuous {
            config.debate_params.enable_continuous_mode = true;
        }
        if let Some(model) = &self.model {
            config.llm_params.model_name = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.llm_params.temperature = temperature;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the debate
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roundtable=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .context("Invalid command-line overrides")?;

    let gateway = ModelGateway::from_api_keys(&config.api_keys)?;
    let (tx, mut rx) = events::channel();
    let mut session =
        DebateSession::new(cli.topic.clone(), config, Arc::new(gateway)).with_events(tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                DebateEvent::RoundStarted { round, .. } => {
                    println!("\n=== Round {} ===\n", round + 1);
                }
                DebateEvent::StatementProduced { statement, .. } => {
                    println!("{} {}:\n{}\n", statement.icon, statement.persona, statement.argument);
                }
                DebateEvent::Warning(warning) => {
                    eprintln!("Warning: {}", warning);
                }
                _ => {}
            }
        }
    });

    if let Err(e) = session.generate_personas().await {
        if let Some(raw) = e.raw_response() {
            eprintln!("Raw model response:\n{}", raw);
        }
        return Err(e).context("Persona generation failed");
    }

    println!("Topic: {}\n", session.topic());
    for persona in session.personas().iter() {
        println!("{} {} - {}", persona.display_icon(), persona.title, persona.description);
    }

    let outcomes = session.run_debate().await.context("Debate failed")?;
    drop(session);
    printer.await.context("Output task failed")?;

    println!("Debate finished after {} round(s).", outcomes.len());
    Ok(())
}
