use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use compass_core::{College, ComparisonAnalysis};
use events::EventBus;
use orchestrator::prompts::format_usd;
use orchestrator::{QueryOrchestrator, SearchForm, StateStore, ViewController};
use server::config::{AppConfig, CONFIG_FILE};
use server::{create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "college-compass")]
#[command(about = "Find and compare colleges for a career", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default college-compass.toml in the current directory
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Static web app to serve alongside the API
        #[arg(long)]
        app_dir: Option<PathBuf>,

        #[arg(long)]
        no_browser: bool,
    },
    /// Run one search in the terminal
    Search {
        job: String,
        location: String,

        /// Save a college from the results by name (repeatable)
        #[arg(long = "save", value_name = "NAME")]
        save: Vec<String>,

        /// Compare the saved colleges after searching
        #[arg(long)]
        compare: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force }) => init_config(force).await,
        Some(Commands::Serve {
            port,
            app_dir,
            no_browser,
        }) => serve(port, app_dir, !no_browser).await,
        Some(Commands::Search {
            job,
            location,
            save,
            compare,
        }) => search(job, location, save, compare).await,
        None => serve(cli.port, None, true).await,
    }
}

async fn init_config(force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE);

    if config_path.exists() && !force {
        println!("Config already exists at {}", config_path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    let path = AppConfig::default()
        .write(&cwd)
        .await
        .context("Failed to write config file")?;

    println!();
    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set gemini.api_key in {} or export GEMINI_API_KEY",
        CONFIG_FILE
    );
    println!("  2. Run 'college-compass serve' to start the server");

    Ok(())
}

async fn load_config(dir: &Path) -> Result<AppConfig> {
    let config = AppConfig::read(dir)
        .await
        .with_context(|| format!("Failed to load {}", CONFIG_FILE))?;
    Ok(config.with_env_overrides())
}

async fn serve(port: Option<u16>, app_dir: Option<PathBuf>, open_browser: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd).await?;

    init_tracing();

    let client = config
        .gemini_client()
        .context("Cannot start the server")?;
    let port = port.unwrap_or(config.server.port);
    let app_dir = app_dir.or_else(|| config.server.app_dir.clone());

    tracing::info!("Gemini model: {}", client.model());

    let mut state = AppState::new(Arc::new(client)).context("Failed to prepare query state")?;
    if let Some(dir) = app_dir.clone() {
        tracing::info!("Serving app from {}", dir.display());
        state = state.with_app_dir(dir);
    }
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    let app_url = if app_dir.is_some() {
        format!("http://localhost:{}", port)
    } else {
        format!("http://localhost:{}/swagger-ui", port)
    };

    println!();
    println!("{}", "College Compass".bold());
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!("  Events:      http://localhost:{}/api/events", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    if open_browser {
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&app_url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        });
    }

    axum::serve(listener, app).await?;

    Ok(())
}

async fn search(job: String, location: String, save: Vec<String>, compare: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd).await?;

    init_tracing();

    let client = config.gemini_client()?;
    let store = StateStore::new(EventBus::new());
    let orchestrator = QueryOrchestrator::new(Arc::new(client), store)?;
    let controller = ViewController::new(Arc::new(orchestrator));
    controller.set_form(SearchForm::new(job, location));

    let form = controller.form();
    println!(
        "Searching for {} programs near {}...",
        form.job.trim().cyan(),
        form.location.trim().cyan()
    );

    let colleges = match controller.on_search().await {
        None => bail!("Both job and location are required"),
        Some(Err(_)) => return Err(store_error(&controller)),
        Some(Ok(colleges)) => colleges,
    };

    println!();
    if colleges.is_empty() {
        println!("No colleges found.");
        return Ok(());
    }
    for college in &colleges {
        print_college(college);
    }

    for name in &save {
        match colleges
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        {
            Some(college) => {
                controller.on_toggle_save(college.clone());
                println!("{} {}", "Saved".green(), college.name);
            }
            None => println!("{} no result named '{}'", "Skipped:".yellow(), name),
        }
    }

    if compare {
        println!();
        match controller.on_compare().await {
            None => println!("Save at least two colleges (--save NAME) to compare."),
            Some(Err(_)) => return Err(store_error(&controller)),
            Some(Ok(analysis)) => print_comparison(&analysis),
        }
    }

    Ok(())
}

/// The user-facing message the last failed request left in the store
fn store_error(controller: &ViewController) -> anyhow::Error {
    let message = controller
        .store()
        .error()
        .unwrap_or_else(|| "Request failed".to_string());
    anyhow!("{}", message)
}

fn print_college(college: &College) {
    println!("{}  ({})", college.name.bold(), college.location());
    println!(
        "  Acceptance rate: {}%   Annual cost: ${}",
        college.acceptance_rate,
        format_usd(college.annual_cost)
    );
    if !college.description.is_empty() {
        println!("  {}", college.description);
    }
    if !college.reason_for_fit.is_empty() {
        println!("  {} {}", "Why:".dimmed(), college.reason_for_fit);
    }
    println!();
}

fn print_comparison(analysis: &ComparisonAnalysis) {
    for entry in &analysis.comparison {
        println!("{}", entry.name.bold());
        for pro in &entry.pros {
            println!("  {} {}", "+".green(), pro);
        }
        for con in &entry.cons {
            println!("  {} {}", "-".red(), con);
        }
        println!();
    }
    println!("{} {}", "Recommendation:".bold(), analysis.recommendation);
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "college_compass=info,server=info,orchestrator=info,gemini=info,tower_http=info"
                    .into()
            }),
        )
        .init();
}
