use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use studymate::{config::Config, Assistant, Mode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studymate")]
#[command(about = "Study assistant that answers questions about your PDF notes")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to config/settings.toml or ~/.config/studymate/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the on-disk index (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    index_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a PDF and answer a single question
    Ask {
        /// PDF with your notes
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
        /// Question to answer
        #[arg(value_name = "QUESTION")]
        question: String,
        /// Response style: General, Teacher or ExamPrep
        #[arg(short, long, default_value = "General")]
        mode: Mode,
    },
    /// Index a PDF and ask questions interactively
    Chat {
        /// PDF with your notes
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
    },
    /// Index a PDF and generate a multiple-choice quiz from it
    Quiz {
        /// PDF with your notes
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studymate=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().context("Invalid settings file")?,
    };
    if let Some(dir) = cli.index_dir {
        config.index.persist_dir = Some(dir);
    }

    let assistant = Assistant::from_config(&config)
        .await
        .context("Failed to initialize assistant")?;

    match cli.command {
        Commands::Ask { pdf, question, mode } => {
            ingest(&assistant, &pdf).await?;
            let response = assistant.answer(&question, mode).await?;
            println!("\n### Assistant Response ({} Mode)\n", mode);
            println!("{}", response);
        }
        Commands::Chat { pdf } => {
            ingest(&assistant, &pdf).await?;
            chat(&assistant).await?;
        }
        Commands::Quiz { pdf } => {
            ingest(&assistant, &pdf).await?;
            let quiz = assistant.generate_quiz().await?;
            println!("\n{}", quiz);
        }
    }

    Ok(())
}

/// Index the PDF behind a spinner
async fn ingest(assistant: &Assistant, pdf: &Path) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Processing PDF...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = assistant.ingest(pdf).await;
    pb.finish_and_clear();

    let report = result.with_context(|| format!("❌ Error processing PDF: {}", pdf.display()))?;
    println!(
        "✅ Notes indexed successfully! ({} pages, {} chunks)",
        report.pages, report.chunks
    );
    Ok(())
}

/// Interactive loop: pick a mode (or the quiz), then ask; an empty question returns to the menu
async fn chat(assistant: &Assistant) -> Result<()> {
    let mut items: Vec<String> = Mode::ALL.iter().map(|m| format!("{} mode", m)).collect();
    items.push("Generate a quiz from my notes".to_string());
    items.push("Quit".to_string());
    let quiz_item = Mode::ALL.len();

    loop {
        let choice = Select::new()
            .with_prompt("Choose your assistant mode")
            .items(&items)
            .default(0)
            .interact()
            .context("Failed to read user input")?;

        if choice == quiz_item {
            let quiz = assistant.generate_quiz().await?;
            println!("\n{}\n", quiz);
            continue;
        }
        let Some(&mode) = Mode::ALL.get(choice) else {
            break;
        };

        loop {
            let question: String = Input::new()
                .with_prompt("What would you like to learn today?")
                .allow_empty(true)
                .interact_text()
                .context("Failed to read user input")?;

            if question.trim().is_empty() {
                break;
            }

            match assistant.answer(&question, mode).await {
                Ok(response) => {
                    println!("\n### Assistant Response ({} Mode)\n", mode);
                    println!("{}\n", response);
                }
                Err(e) => eprintln!("❌ {:#}", anyhow::Error::from(e)),
            }
        }
    }

    Ok(())
}
